//! Text measurement for the builtin Helvetica faces.
//!
//! Invoices are rendered with the PDF base-14 fonts only, so there is nothing
//! to embed or parse. Widths use an average-advance heuristic which is close
//! enough for alignment and wrapping of short invoice strings.

/// Metrics for one builtin font family, in units of the font size.
#[derive(Debug, Clone, Copy)]
pub struct FontMetrics {
    pub regular_advance: f32,
    pub bold_advance: f32,
    pub ascender: f32,
    pub descender: f32,
}

impl FontMetrics {
    pub const HELVETICA: FontMetrics = FontMetrics {
        regular_advance: 0.5,
        // Bold is ~10 % wider.
        bold_advance: 0.55,
        ascender: 0.75,
        descender: -0.25,
    };

    /// Width of `text` in points.
    pub fn measure_text_width(&self, text: &str, font_size: f32, bold: bool) -> f32 {
        let avg = if bold {
            self.bold_advance
        } else {
            self.regular_advance
        };
        text.chars().count() as f32 * font_size * avg
    }

    pub fn line_height(&self, font_size: f32, leading: f32) -> f32 {
        font_size * leading
    }

    /// Distance from the top of a line to its baseline.
    pub fn ascender_pt(&self, font_size: f32) -> f32 {
        font_size * self.ascender
    }
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self::HELVETICA
    }
}

/// Word-wrap text to fit within `max_width` points. Returns at least one line.
///
/// Breaks only at single spaces and keeps every other space as written, so
/// unwrapped text comes back verbatim. A single word wider than `max_width`
/// is kept whole on its own line.
pub fn wrap_text(
    text: &str,
    font_size: f32,
    bold: bool,
    max_width: f32,
    metrics: &FontMetrics,
) -> Vec<String> {
    if max_width <= 0.0 || text.is_empty() {
        return vec![text.to_string()];
    }

    let mut lines: Vec<String> = Vec::new();
    for paragraph in text.split('\n') {
        let mut current_line: Option<String> = None;
        for word in paragraph.split(' ') {
            current_line = Some(match current_line {
                None => word.to_string(),
                Some(line) => {
                    let candidate = format!("{} {}", line, word);
                    let w = metrics.measure_text_width(&candidate, font_size, bold);
                    if w > max_width && !line.trim().is_empty() && !word.is_empty() {
                        lines.push(line);
                        word.to_string()
                    } else {
                        candidate
                    }
                }
            });
        }
        lines.push(current_line.unwrap_or_default());
    }
    lines
}
