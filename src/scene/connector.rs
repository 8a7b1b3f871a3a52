use crate::layout::FrameGeometry;

use super::{DrawElement, ElementStyle, ScenePoint};

pub const CONNECTOR_LAYER: i32 = 20;

const CONNECTOR_STROKE: &str = "#8ea0b8";
const CONNECTOR_STROKE_WIDTH_PX: u32 = 1;

/// Directed line from a value node's glyph center to the frame of the
/// environment it closes over. Attaches to the frame edge facing the node.
pub fn build_connector(key: u64, from: ScenePoint, frame: &FrameGeometry) -> DrawElement {
    let target = attachment_point(from, frame);

    DrawElement::Connector {
        key,
        layer: CONNECTOR_LAYER,
        points: vec![from, target],
        arrow_end: true,
        style: ElementStyle {
            fill_color: None,
            stroke_color: Some(CONNECTOR_STROKE.to_owned()),
            stroke_width_px: Some(CONNECTOR_STROKE_WIDTH_PX),
            text_color: None,
        },
    }
}

fn attachment_point(from: ScenePoint, frame: &FrameGeometry) -> ScenePoint {
    if from.x > frame.x + frame.width {
        ScenePoint {
            x: frame.x + frame.width,
            y: frame.y + frame.height / 2.0,
        }
    } else if from.x < frame.x {
        ScenePoint {
            x: frame.x,
            y: frame.y + frame.height / 2.0,
        }
    } else if from.y > frame.y + frame.height {
        ScenePoint {
            x: from.x,
            y: frame.y + frame.height,
        }
    } else {
        ScenePoint {
            x: from.x,
            y: frame.y,
        }
    }
}
