use std::collections::BTreeMap;

use tracing::debug;

use crate::config::DiagramSettings;
use crate::layout::{FrameGeometry, ValueReference, node_height, node_width, resolve_anchor};
use crate::scene::connector::build_connector;
use crate::scene::{DisplayMode, DrawElement, ElementStyle, KeyGenerator, ScenePoint};
use crate::snapshot::{EnvironmentIndex, FunctionValue};
use crate::text::{TextArtifacts, format_function_text};

pub const GLYPH_BASE_LAYER: i32 = 40;
pub const GLYPH_HOVER_LAYER: i32 = 200;
pub const LABEL_LAYER: i32 = 220;

const GLYPH_STROKE: &str = "#2b4964";
const GLYPH_FILL: &str = "#4d7d9e";
const GLYPH_STROKE_WIDTH_PX: u32 = 2;
const INNER_RING_SCALE: f64 = 0.6;

const LABEL_LIGHT_BACKGROUND: &str = "#e9f5ff";
const LABEL_LIGHT_TEXT: &str = "#274262";
const LABEL_DARK_BACKGROUND: &str = "#274262";
const LABEL_DARK_TEXT: &str = "#ffffff";

/// Transient per-node pointer state; idle <-> hovered only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HoverState {
    #[default]
    Idle,
    Hovered,
}

/// In printable mode the label is always shown and pointer events must not
/// disturb it; in interactive mode it is revealed only while hovered.
pub fn label_visible(state: HoverState, mode: DisplayMode) -> bool {
    mode.is_printable() || state == HoverState::Hovered
}

/// The drawn representation of one function value: fixed geometry, derived
/// text artifacts, and hover-driven label visibility. Geometry is fixed at
/// construction; only hover state mutates afterward.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueNode {
    value: FunctionValue,
    x: f64,
    /// Vertical center of the two lobes, not the bounding box top.
    y: f64,
    width: f64,
    height: f64,
    center_x: f64,
    text: TextArtifacts,
    enclosing_env_id: Option<String>,
    enclosing_frame: Option<FrameGeometry>,
    label_padding: f64,
    hover: HoverState,
    layer: i32,
}

impl ValueNode {
    /// Callers guarantee a non-empty reference list. The enclosing
    /// environment is resolved here, once; an unresolved lookup or a
    /// frame-less environment degrades to "no connector".
    fn new(
        value: FunctionValue,
        references: &[ValueReference],
        env_index: &EnvironmentIndex,
        settings: &DiagramSettings,
    ) -> Self {
        let anchor = resolve_anchor(references, settings.node_radius, settings.frame_margin_x);
        let text = format_function_text(&value.params, &value.body, settings.font_advance_width);
        let enclosing = env_index.lookup(&value.env_id);

        Self {
            x: anchor.x,
            y: anchor.y,
            width: node_width(settings.node_radius),
            height: node_height(settings.node_radius),
            center_x: anchor.center_x,
            text,
            enclosing_env_id: enclosing.map(|node| node.id.clone()),
            enclosing_frame: enclosing.and_then(|node| node.frame),
            label_padding: settings.label_padding,
            hover: HoverState::Idle,
            layer: GLYPH_BASE_LAYER,
            value,
        }
    }

    pub fn value(&self) -> &FunctionValue {
        &self.value
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn center_x(&self) -> f64 {
        self.center_x
    }

    pub fn text(&self) -> &TextArtifacts {
        &self.text
    }

    pub fn enclosing_env_id(&self) -> Option<&str> {
        self.enclosing_env_id.as_deref()
    }

    pub fn hover_state(&self) -> HoverState {
        self.hover
    }

    pub fn layer(&self) -> i32 {
        self.layer
    }

    pub fn hover_enter(&mut self, mode: DisplayMode) {
        if mode.is_printable() {
            return;
        }
        self.hover = HoverState::Hovered;
        self.layer = GLYPH_HOVER_LAYER;
    }

    pub fn hover_leave(&mut self, mode: DisplayMode) {
        if mode.is_printable() {
            return;
        }
        self.hover = HoverState::Idle;
        self.layer = GLYPH_BASE_LAYER;
    }

    /// Emits the two-lobe glyph, exactly one mode-selected label, and the
    /// connector to the enclosing frame when that frame exists. Mode is read
    /// here, per draw, never cached from construction.
    pub fn draw(&self, mode: DisplayMode, keys: &mut KeyGenerator) -> Vec<DrawElement> {
        let radius = self.height / 2.0;
        let mut elements = Vec::with_capacity(6);

        for lobe_x in [self.center_x - radius, self.center_x + radius] {
            let center = ScenePoint {
                x: lobe_x,
                y: self.y,
            };
            elements.push(DrawElement::Ring {
                key: keys.next_key(),
                layer: self.layer,
                center,
                radius,
                style: ElementStyle {
                    fill_color: None,
                    stroke_color: Some(GLYPH_STROKE.to_owned()),
                    stroke_width_px: Some(GLYPH_STROKE_WIDTH_PX),
                    text_color: None,
                },
            });
            elements.push(DrawElement::Ring {
                key: keys.next_key(),
                layer: self.layer,
                center,
                radius: radius * INNER_RING_SCALE,
                style: ElementStyle {
                    fill_color: Some(GLYPH_FILL.to_owned()),
                    stroke_color: None,
                    stroke_width_px: None,
                    text_color: None,
                },
            });
        }

        elements.push(self.label_element(mode, keys.next_key()));

        if let Some(frame) = &self.enclosing_frame {
            elements.push(build_connector(
                keys.next_key(),
                ScenePoint {
                    x: self.center_x,
                    y: self.y,
                },
                frame,
            ));
        }

        elements
    }

    fn label_element(&self, mode: DisplayMode, key: u64) -> DrawElement {
        let position = ScenePoint {
            x: self.x + self.width + self.label_padding,
            y: self.y - self.height / 2.0 - self.label_padding,
        };

        let (text, background, text_color) = if mode.is_printable() {
            (
                self.text.export_tooltip.clone(),
                LABEL_LIGHT_BACKGROUND,
                LABEL_LIGHT_TEXT,
            )
        } else {
            (
                self.text.tooltip.clone(),
                LABEL_DARK_BACKGROUND,
                LABEL_DARK_TEXT,
            )
        };

        DrawElement::Label {
            key,
            layer: LABEL_LAYER,
            position,
            text,
            visible: label_visible(self.hover, mode),
            style: ElementStyle {
                fill_color: Some(background.to_owned()),
                stroke_color: None,
                stroke_width_px: None,
                text_color: Some(text_color.to_owned()),
            },
        }
    }
}

/// Build-scoped memoization table: at most one `ValueNode` per function value
/// per diagram build. Mutated only during the construction phase; `clear`
/// must be called before reusing it for the next build.
#[derive(Debug, Default)]
pub struct ValueNodeRegistry {
    nodes: Vec<ValueNode>,
    index_by_value: BTreeMap<String, usize>,
}

/// Stable handle into a registry for the lifetime of one build.
pub type NodeId = usize;

impl ValueNodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a value node, reusing the existing node when the function
    /// value was already seen. Reuse skips construction entirely so the
    /// environment lookup and text formatting run once per value.
    pub fn register(
        &mut self,
        value: FunctionValue,
        references: &[ValueReference],
        env_index: &EnvironmentIndex,
        settings: &DiagramSettings,
    ) -> NodeId {
        if let Some(&existing) = self.index_by_value.get(&value.id) {
            debug!(function_id = %value.id, "reusing memoized value node");
            return existing;
        }

        let node_id = self.nodes.len();
        self.index_by_value.insert(value.id.clone(), node_id);
        self.nodes
            .push(ValueNode::new(value, references, env_index, settings));
        node_id
    }

    pub fn get(&self, node_id: NodeId) -> &ValueNode {
        &self.nodes[node_id]
    }

    pub fn get_mut(&mut self, node_id: NodeId) -> &mut ValueNode {
        &mut self.nodes[node_id]
    }

    pub fn nodes(&self) -> &[ValueNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index_by_value.clear();
    }
}

#[cfg(test)]
mod tests {
    use crate::config::DiagramSettings;
    use crate::layout::{FrameGeometry, ValueReference, node_height, node_width};
    use crate::scene::{DisplayMode, DrawElement, KeyGenerator};
    use crate::snapshot::{EnvironmentIndex, EnvironmentNode, FunctionValue, RuntimeSnapshot};

    use super::{GLYPH_BASE_LAYER, GLYPH_HOVER_LAYER, HoverState, ValueNodeRegistry, label_visible};

    fn settings() -> DiagramSettings {
        DiagramSettings::default()
    }

    fn env_index() -> EnvironmentIndex {
        EnvironmentIndex::from_snapshot(&RuntimeSnapshot {
            revision: 1,
            environments: vec![
                EnvironmentNode {
                    id: "env:global".to_owned(),
                    frame: None,
                },
                EnvironmentNode {
                    id: "env:f".to_owned(),
                    frame: Some(FrameGeometry {
                        x: 100.0,
                        y: 50.0,
                        width: 40.0,
                        height: 80.0,
                    }),
                },
            ],
            functions: Vec::new(),
        })
    }

    fn function_value(id: &str, env_id: &str) -> FunctionValue {
        FunctionValue {
            id: id.to_owned(),
            name: "add".to_owned(),
            params: vec!["x".to_owned(), "y".to_owned()],
            body: "x + y".to_owned(),
            env_id: env_id.to_owned(),
        }
    }

    fn binding_reference() -> ValueReference {
        ValueReference::Binding {
            frame_x: 100.0,
            frame_width: 40.0,
            anchor_y: 50.0,
        }
    }

    fn labels(elements: &[DrawElement]) -> Vec<&DrawElement> {
        elements
            .iter()
            .filter(|element| matches!(element, DrawElement::Label { .. }))
            .collect()
    }

    #[test]
    fn registering_the_same_value_twice_reuses_one_node() {
        let settings = settings();
        let index = env_index();
        let mut registry = ValueNodeRegistry::new();

        let first = registry.register(
            function_value("fn:add", "env:f"),
            &[binding_reference()],
            &index,
            &settings,
        );
        let second = registry.register(
            function_value("fn:add", "env:f"),
            &[ValueReference::Slot {
                x: 10.0,
                y: 10.0,
                width: 20.0,
                height: 20.0,
                is_last_slot: true,
                parent_height: 0.0,
            }],
            &index,
            &settings,
        );

        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn clear_resets_registry_between_builds() {
        let settings = settings();
        let index = env_index();
        let mut registry = ValueNodeRegistry::new();
        registry.register(
            function_value("fn:add", "env:f"),
            &[binding_reference()],
            &index,
            &settings,
        );

        registry.clear();
        assert!(registry.is_empty());

        let reassigned = registry.register(
            function_value("fn:other", "env:f"),
            &[binding_reference()],
            &index,
            &settings,
        );
        assert_eq!(reassigned, 0);
    }

    #[test]
    fn node_footprint_is_four_by_two_radii() {
        let settings = settings();
        let index = env_index();
        let mut registry = ValueNodeRegistry::new();
        let node_id = registry.register(
            function_value("fn:add", "env:f"),
            &[binding_reference()],
            &index,
            &settings,
        );

        let node = registry.get(node_id);
        assert_eq!(node.width(), node_width(settings.node_radius));
        assert_eq!(node.height(), node_height(settings.node_radius));
    }

    #[test]
    fn binding_scenario_matches_expected_geometry_and_tooltip() {
        let settings = settings();
        let index = env_index();
        let mut registry = ValueNodeRegistry::new();
        let node_id = registry.register(
            function_value("fn:add", "env:f"),
            &[binding_reference()],
            &index,
            &settings,
        );

        let node = registry.get(node_id);
        assert_eq!(node.x(), 140.0 + settings.frame_margin_x / 4.0);
        assert_eq!(node.center_x(), node.x() + 2.0 * settings.node_radius);
        assert_eq!(node.text().tooltip, "params: (x, y)\nbody: x + y");
        assert_eq!(node.text().export_tooltip, node.text().tooltip);
    }

    #[test]
    fn hover_is_ignored_in_printable_mode() {
        let settings = settings();
        let index = env_index();
        let mut registry = ValueNodeRegistry::new();
        let node_id = registry.register(
            function_value("fn:add", "env:f"),
            &[binding_reference()],
            &index,
            &settings,
        );

        let node = registry.get_mut(node_id);
        for _ in 0..3 {
            node.hover_enter(DisplayMode::Printable);
            node.hover_leave(DisplayMode::Printable);
        }
        assert_eq!(node.hover_state(), HoverState::Idle);
        assert_eq!(node.layer(), GLYPH_BASE_LAYER);
        assert!(label_visible(node.hover_state(), DisplayMode::Printable));
    }

    #[test]
    fn hover_toggles_visibility_and_layer_in_interactive_mode() {
        let settings = settings();
        let index = env_index();
        let mut registry = ValueNodeRegistry::new();
        let node_id = registry.register(
            function_value("fn:add", "env:f"),
            &[binding_reference()],
            &index,
            &settings,
        );

        let node = registry.get_mut(node_id);
        assert!(!label_visible(node.hover_state(), DisplayMode::Interactive));

        node.hover_enter(DisplayMode::Interactive);
        assert_eq!(node.hover_state(), HoverState::Hovered);
        assert_eq!(node.layer(), GLYPH_HOVER_LAYER);
        assert!(label_visible(node.hover_state(), DisplayMode::Interactive));

        node.hover_leave(DisplayMode::Interactive);
        assert_eq!(node.hover_state(), HoverState::Idle);
        assert_eq!(node.layer(), GLYPH_BASE_LAYER);
    }

    #[test]
    fn draw_emits_two_lobe_pairs_and_exactly_one_label() {
        let settings = settings();
        let index = env_index();
        let mut registry = ValueNodeRegistry::new();
        let node_id = registry.register(
            function_value("fn:add", "env:f"),
            &[binding_reference()],
            &index,
            &settings,
        );

        let node = registry.get(node_id);
        let radius = settings.node_radius;
        for mode in [DisplayMode::Interactive, DisplayMode::Printable] {
            let elements = node.draw(mode, &mut KeyGenerator::new());

            let ring_centers = elements
                .iter()
                .filter_map(|element| match element {
                    DrawElement::Ring { center, .. } => Some((center.x, center.y)),
                    _ => None,
                })
                .collect::<Vec<_>>();
            assert_eq!(ring_centers.len(), 4);
            assert!(
                ring_centers
                    .iter()
                    .all(|&(x, y)| y == node.y()
                        && (x == node.center_x() - radius || x == node.center_x() + radius))
            );

            assert_eq!(labels(&elements).len(), 1, "exactly one label per draw");
        }
    }

    #[test]
    fn label_variant_follows_mode_at_draw_time() {
        let settings = settings();
        let index = env_index();
        let mut registry = ValueNodeRegistry::new();
        let long_body = FunctionValue {
            body: "return x * x + y * y + z * z;".to_owned(),
            ..function_value("fn:long", "env:f")
        };
        let node_id = registry.register(long_body, &[binding_reference()], &index, &settings);

        let node = registry.get(node_id);
        let interactive = node.draw(DisplayMode::Interactive, &mut KeyGenerator::new());
        let DrawElement::Label { text, visible, .. } = labels(&interactive)[0] else {
            unreachable!();
        };
        assert_eq!(text, &node.text().tooltip);
        assert!(!*visible, "interactive label starts hidden");

        // Same node, different mode at draw time: the export variant wins.
        let printable = node.draw(DisplayMode::Printable, &mut KeyGenerator::new());
        let DrawElement::Label { text, visible, .. } = labels(&printable)[0] else {
            unreachable!();
        };
        assert_eq!(text, &node.text().export_tooltip);
        assert!(text.ends_with(" ..."));
        assert!(*visible, "printable label is always visible");
    }

    #[test]
    fn connector_is_present_only_when_enclosing_frame_exists() {
        let settings = settings();
        let index = env_index();
        let mut registry = ValueNodeRegistry::new();

        let framed = registry.register(
            function_value("fn:framed", "env:f"),
            &[binding_reference()],
            &index,
            &settings,
        );
        let global = registry.register(
            function_value("fn:global", "env:global"),
            &[binding_reference()],
            &index,
            &settings,
        );
        let unresolved = registry.register(
            function_value("fn:lost", "env:missing"),
            &[binding_reference()],
            &index,
            &settings,
        );

        let count_connectors = |elements: &[DrawElement]| {
            elements
                .iter()
                .filter(|element| matches!(element, DrawElement::Connector { .. }))
                .count()
        };

        let framed_elements = registry
            .get(framed)
            .draw(DisplayMode::Interactive, &mut KeyGenerator::new());
        assert_eq!(count_connectors(&framed_elements), 1);

        let global_elements = registry
            .get(global)
            .draw(DisplayMode::Interactive, &mut KeyGenerator::new());
        assert_eq!(count_connectors(&global_elements), 0);
        assert_eq!(registry.get(global).enclosing_env_id(), Some("env:global"));

        let unresolved_elements = registry
            .get(unresolved)
            .draw(DisplayMode::Interactive, &mut KeyGenerator::new());
        assert_eq!(count_connectors(&unresolved_elements), 0);
        assert_eq!(registry.get(unresolved).enclosing_env_id(), None);
    }

    #[test]
    fn hovered_node_draws_glyph_on_the_hover_layer() {
        let settings = settings();
        let index = env_index();
        let mut registry = ValueNodeRegistry::new();
        let node_id = registry.register(
            function_value("fn:add", "env:f"),
            &[binding_reference()],
            &index,
            &settings,
        );

        registry.get_mut(node_id).hover_enter(DisplayMode::Interactive);
        let elements = registry
            .get(node_id)
            .draw(DisplayMode::Interactive, &mut KeyGenerator::new());

        assert!(
            elements
                .iter()
                .filter(|element| matches!(element, DrawElement::Ring { .. }))
                .all(|element| element.layer() == GLYPH_HOVER_LAYER)
        );
    }
}
