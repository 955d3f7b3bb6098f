//! Style presets – named colours, text style records and the two paragraph
//! presets shared by every invoice section.

use serde::{Deserialize, Serialize};

use crate::document::Paragraph;

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Components scaled to `0.0..=1.0`, as PDF colour operators expect.
    pub fn to_unit(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

pub const BLACK: Color = Color::rgb(0, 0, 0);
pub const WHITE: Color = Color::rgb(255, 255, 255);
/// Captions and secondary text.
pub const LIGHT_GRAY: Color = Color::rgb(166, 166, 166);
/// Dividers and cell borders.
pub const RULE_GRAY: Color = Color::rgb(204, 204, 204);
/// Product row text, softer than pure black.
pub const DARK_GRAY: Color = Color::rgb(64, 64, 64);
/// Pay button background.
pub const ACCENT_BLUE: Color = Color::rgb(0, 92, 230);

pub const LIGHT_FONT_SIZE: f32 = 12.0;
pub const BOLD_FONT_SIZE: f32 = 16.0;
pub const TITLE_FONT_SIZE: f32 = 32.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VerticalAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// Immutable text formatting record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_size: f32,
    pub color: Color,
    pub align: TextAlign,
    pub weight: FontWeight,
    pub vertical_align: VerticalAlign,
}

impl TextStyle {
    pub const LIGHT: TextStyle = TextStyle {
        font_size: LIGHT_FONT_SIZE,
        color: LIGHT_GRAY,
        align: TextAlign::Left,
        weight: FontWeight::Normal,
        vertical_align: VerticalAlign::Top,
    };

    /// Bold preset in the given colour.
    pub const fn bold(color: Color) -> TextStyle {
        TextStyle {
            font_size: BOLD_FONT_SIZE,
            color,
            align: TextAlign::Left,
            weight: FontWeight::Bold,
            vertical_align: VerticalAlign::Middle,
        }
    }

    pub const fn with_align(self, align: TextAlign) -> TextStyle {
        TextStyle { align, ..self }
    }

    pub const fn with_size(self, font_size: f32) -> TextStyle {
        TextStyle { font_size, ..self }
    }

    pub const fn with_color(self, color: Color) -> TextStyle {
        TextStyle { color, ..self }
    }

    pub const fn with_vertical_align(self, vertical_align: VerticalAlign) -> TextStyle {
        TextStyle {
            vertical_align,
            ..self
        }
    }

    pub fn is_bold(&self) -> bool {
        self.weight == FontWeight::Bold
    }
}

/// Secondary/caption text: 12pt, light gray.
pub fn light_text(value: &str) -> Paragraph {
    Paragraph::new(value, TextStyle::LIGHT)
}

/// Primary text: 16pt bold in `color`, vertically centered.
pub fn bold_text(value: &str, color: Color) -> Paragraph {
    Paragraph::new(value, TextStyle::bold(color))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn light_preset_values() {
        let p = light_text("From");
        assert_eq!(p.text, "From");
        assert_eq!(p.style.font_size, 12.0);
        assert_eq!(p.style.color, Color::rgb(166, 166, 166));
        assert_eq!(p.style.align, TextAlign::Left);
    }

    #[test]
    fn bold_preset_uses_caller_color() {
        let p = bold_text("Logo Design", DARK_GRAY);
        assert_eq!(p.style.font_size, 16.0);
        assert_eq!(p.style.color, DARK_GRAY);
        assert!(p.style.is_bold());
        assert_eq!(p.style.vertical_align, VerticalAlign::Middle);
    }

    #[test]
    fn alignment_override_leaves_preset_untouched() {
        let right = light_text("To").aligned(TextAlign::Right);
        let left = light_text("From");
        assert_eq!(right.style.align, TextAlign::Right);
        assert_eq!(left.style.align, TextAlign::Left);
        assert_eq!(TextStyle::LIGHT.align, TextAlign::Left);
    }
}
