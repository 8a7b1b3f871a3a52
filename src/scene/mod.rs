use serde::{Deserialize, Serialize};

use crate::config::DefaultDisplayMode;

pub mod connector;

/// Global display mode, read at hover-handling time and at draw time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayMode {
    Interactive,
    Printable,
}

impl DisplayMode {
    pub fn is_printable(self) -> bool {
        matches!(self, Self::Printable)
    }
}

impl From<DefaultDisplayMode> for DisplayMode {
    fn from(mode: DefaultDisplayMode) -> Self {
        match mode {
            DefaultDisplayMode::Interactive => Self::Interactive,
            DefaultDisplayMode::Printable => Self::Printable,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenePoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementStyle {
    pub fill_color: Option<String>,
    pub stroke_color: Option<String>,
    pub stroke_width_px: Option<u32>,
    pub text_color: Option<String>,
}

/// One drawn element of the visual tree handed to the host renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawElement {
    Ring {
        key: u64,
        layer: i32,
        center: ScenePoint,
        radius: f64,
        style: ElementStyle,
    },
    Label {
        key: u64,
        layer: i32,
        position: ScenePoint,
        text: String,
        visible: bool,
        style: ElementStyle,
    },
    Connector {
        key: u64,
        layer: i32,
        points: Vec<ScenePoint>,
        arrow_end: bool,
        style: ElementStyle,
    },
}

impl DrawElement {
    pub fn key(&self) -> u64 {
        match self {
            Self::Ring { key, .. } | Self::Label { key, .. } | Self::Connector { key, .. } => *key,
        }
    }

    pub fn layer(&self) -> i32 {
        match self {
            Self::Ring { layer, .. }
            | Self::Label { layer, .. }
            | Self::Connector { layer, .. } => *layer,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawBatch {
    pub sequence: u64,
    pub elements: Vec<DrawElement>,
}

/// Monotonically increasing element keys. A fresh generator is used per draw
/// cycle so identical scenes produce identical keys across redraws, keeping
/// the host renderer's reconciliation stable.
#[derive(Debug, Default)]
pub struct KeyGenerator {
    next: u64,
}

impl KeyGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_key(&mut self) -> u64 {
        let key = self.next;
        self.next += 1;
        key
    }
}
