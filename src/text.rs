/// Body lines longer than this (prefix included) get an export excerpt.
pub const BODY_TRUNCATE_THRESHOLD: usize = 23;
pub const BODY_EXCERPT_CHAR_LIMIT: usize = 20;
pub const BODY_EXCERPT_SUFFIX: &str = " ...";

/// Label/tooltip strings derived from one function value, plus measured
/// widths for label box sizing in the drawing layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TextArtifacts {
    pub params_text: String,
    pub body_text: String,
    /// Shortened body used only by the export tooltip; absent when the body
    /// line is under the truncation threshold.
    pub export_body_text: Option<String>,
    pub tooltip: String,
    pub export_tooltip: String,
    pub tooltip_width: f64,
    pub export_tooltip_width: f64,
}

pub fn format_function_text(params: &[String], body: &str, font_advance_width: f64) -> TextArtifacts {
    let params_text = format!("params: ({})", params.join(", "));
    let body_text = format!("body: {body}");

    let export_body_text = if body_text.chars().count() > BODY_TRUNCATE_THRESHOLD {
        Some(excerpt(&body_text))
    } else {
        None
    };

    let tooltip = format!("{params_text}\n{body_text}");
    let export_tooltip = format!(
        "{params_text}\n{}",
        export_body_text.as_deref().unwrap_or(&body_text)
    );

    let tooltip_width = measure_text_width(&tooltip, font_advance_width);
    let export_tooltip_width = measure_text_width(&export_tooltip, font_advance_width);

    TextArtifacts {
        params_text,
        body_text,
        export_body_text,
        tooltip,
        export_tooltip,
        tooltip_width,
        export_tooltip_width,
    }
}

/// First 20 chars of the body line, restricted to its first two
/// newline-delimited lines, ellipsis-suffixed.
fn excerpt(body_text: &str) -> String {
    let head = body_text
        .chars()
        .take(BODY_EXCERPT_CHAR_LIMIT)
        .collect::<String>();
    let kept = head.split('\n').take(2).collect::<Vec<_>>().join("\n");
    format!("{kept}{BODY_EXCERPT_SUFFIX}")
}

/// Maximum rendered width across a string's lines, using the fixed per-char
/// advance metric from settings. The host's real measurer replaces this at
/// draw time; the exposed widths still drive label box sizing.
pub fn measure_text_width(text: &str, font_advance_width: f64) -> f64 {
    text.lines()
        .map(|line| line.chars().count() as f64 * font_advance_width)
        .fold(0.0, f64::max)
}
