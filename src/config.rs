use std::env;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, ensure};

pub const DEFAULT_NODE_RADIUS: f64 = 15.0;
pub const DEFAULT_FRAME_MARGIN_X: f64 = 32.0;
pub const DEFAULT_LABEL_PADDING: f64 = 10.0;
pub const DEFAULT_FONT_ADVANCE_WIDTH: f64 = 7.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultDisplayMode {
    Interactive,
    Printable,
}

impl DefaultDisplayMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Interactive => "interactive",
            Self::Printable => "printable",
        }
    }
}

impl Display for DefaultDisplayMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DefaultDisplayMode {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "interactive" => Ok(Self::Interactive),
            "printable" => Ok(Self::Printable),
            other => Err(anyhow!(
                "invalid DIAGRAM_DISPLAY_MODE `{other}`; expected `interactive` or `printable`"
            )),
        }
    }
}

/// Geometry and text-metric settings shared by one diagram build.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramSettings {
    pub node_radius: f64,
    pub frame_margin_x: f64,
    pub label_padding: f64,
    pub font_advance_width: f64,
    pub default_display_mode: DefaultDisplayMode,
}

impl DiagramSettings {
    pub fn from_env() -> Result<Self> {
        // Load .env if present, but do not fail if file does not exist.
        let _ = dotenvy::dotenv();

        let node_radius = parse_f64_env("DIAGRAM_NODE_RADIUS", DEFAULT_NODE_RADIUS)?;
        ensure!(
            node_radius > 0.0,
            "DIAGRAM_NODE_RADIUS must be greater than 0"
        );

        let frame_margin_x = parse_f64_env("DIAGRAM_FRAME_MARGIN_X", DEFAULT_FRAME_MARGIN_X)?;
        ensure!(
            frame_margin_x >= 0.0,
            "DIAGRAM_FRAME_MARGIN_X cannot be negative"
        );

        let label_padding = parse_f64_env("DIAGRAM_LABEL_PADDING", DEFAULT_LABEL_PADDING)?;
        ensure!(
            label_padding >= 0.0,
            "DIAGRAM_LABEL_PADDING cannot be negative"
        );

        let font_advance_width =
            parse_f64_env("DIAGRAM_FONT_ADVANCE_WIDTH", DEFAULT_FONT_ADVANCE_WIDTH)?;
        ensure!(
            font_advance_width > 0.0,
            "DIAGRAM_FONT_ADVANCE_WIDTH must be greater than 0"
        );

        let default_display_mode = env::var("DIAGRAM_DISPLAY_MODE")
            .unwrap_or_else(|_| DefaultDisplayMode::Interactive.as_str().to_owned())
            .parse::<DefaultDisplayMode>()
            .context("failed to parse DIAGRAM_DISPLAY_MODE")?;

        Ok(Self {
            node_radius,
            frame_margin_x,
            label_padding,
            font_advance_width,
            default_display_mode,
        })
    }
}

impl Default for DiagramSettings {
    fn default() -> Self {
        Self {
            node_radius: DEFAULT_NODE_RADIUS,
            frame_margin_x: DEFAULT_FRAME_MARGIN_X,
            label_padding: DEFAULT_LABEL_PADDING,
            font_advance_width: DEFAULT_FONT_ADVANCE_WIDTH,
            default_display_mode: DefaultDisplayMode::Interactive,
        }
    }
}

fn parse_f64_env(name: &str, default: f64) -> Result<f64> {
    match env::var(name) {
        Ok(raw) => raw
            .parse::<f64>()
            .with_context(|| format!("failed to parse {name} as f64")),
        Err(_) => Ok(default),
    }
}
