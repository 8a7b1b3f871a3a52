use serde::{Deserialize, Serialize};

/// Drawn frame of one environment, as positioned by the upstream layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameGeometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// One location that holds/displays a function value. The two kinds carry
/// their own geometry and each has its own anchor-point formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueReference {
    /// A named slot inside an environment frame.
    Binding {
        frame_x: f64,
        frame_width: f64,
        anchor_y: f64,
    },
    /// A position inside an aggregate data structure's visual representation.
    Slot {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        is_last_slot: bool,
        /// Height of the containing structure; only read for interior slots.
        #[serde(default)]
        parent_height: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeAnchor {
    pub x: f64,
    pub y: f64,
    pub center_x: f64,
}

pub fn node_width(radius: f64) -> f64 {
    4.0 * radius
}

pub fn node_height(radius: f64) -> f64 {
    2.0 * radius
}

/// Derives the node's top-left position and glyph center from the primary
/// (first) reference. Callers guarantee a non-empty reference list; secondary
/// references are visual aliases and do not move the node.
///
/// The returned `y` already includes the `+radius` shift that moves the
/// anchor to the node's vertical center, where the two lobes are drawn.
pub fn resolve_anchor(
    references: &[ValueReference],
    radius: f64,
    frame_margin_x: f64,
) -> NodeAnchor {
    match references[0] {
        ValueReference::Binding {
            frame_x,
            frame_width,
            anchor_y,
        } => {
            let x = frame_x + frame_width + frame_margin_x / 4.0;
            NodeAnchor {
                x,
                y: anchor_y + radius,
                center_x: x + 2.0 * radius,
            }
        }
        ValueReference::Slot {
            x,
            y,
            width,
            height,
            is_last_slot,
            parent_height,
        } => {
            let (branch_x, branch_y) = if is_last_slot {
                // Node floats right of the last slot, vertically centered on it.
                (x + 2.0 * width, y + height / 2.0 - radius)
            } else {
                // Node stacks directly below the owning structure.
                (x, y + parent_height + height)
            };
            let center_x = branch_x + width / 2.0;
            NodeAnchor {
                x: center_x - 2.0 * radius,
                y: branch_y + radius,
                center_x,
            }
        }
    }
}
