//! Document tree – the transient structure the layout builder hands to a
//! [`DocumentSink`](crate::sink::DocumentSink).
//!
//! Nothing here is positioned yet. Tables hold a flat, ordered list of cells;
//! rows are formed by filling `columns` slots left to right, each cell taking
//! `col_span` of them.

use serde::{Deserialize, Serialize};

use crate::style::{Color, TextAlign, TextStyle, VerticalAlign};

/// A complete unpositioned document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub page: PageSetup,
    pub blocks: Vec<Block>,
}

/// Page geometry shared by every page of a document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSetup {
    /// Page width in points.
    pub width: f32,
    /// Page height in points.
    pub height: f32,
    pub margins: Margins,
    /// Line height as a multiple of the font size.
    pub leading: f32,
}

impl PageSetup {
    /// The fixed invoice canvas: 650×700 pt, margins 50/13/13/13, leading 1.
    pub const INVOICE: PageSetup = PageSetup {
        width: 650.0,
        height: 700.0,
        margins: Margins {
            top: 50.0,
            right: 13.0,
            bottom: 13.0,
            left: 13.0,
        },
        leading: 1.0,
    };

    /// Width between the left and right page margins.
    pub fn content_width(&self) -> f32 {
        self.width - self.margins.left - self.margins.right
    }

    /// Height between the top and bottom page margins.
    pub fn content_height(&self) -> f32 {
        self.height - self.margins.top - self.margins.bottom
    }
}

impl Default for PageSetup {
    fn default() -> Self {
        Self::INVOICE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

/// Top-level, vertically stacked element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Block {
    Table(Table),
    Divider(Divider),
}

/// Horizontal rule spanning the content width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Divider {
    pub color: Color,
    pub thickness: f32,
    pub margin_top: f32,
}

/// Fixed-layout table with equal-width columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: usize,
    /// Explicit width; `None` fills the space between the insets.
    pub width: Option<f32>,
    pub margin_top: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub cells: Vec<Cell>,
}

impl Table {
    pub fn new(columns: usize) -> Self {
        Self {
            columns: columns.max(1),
            width: None,
            margin_top: 0.0,
            margin_left: 0.0,
            margin_right: 0.0,
            cells: Vec::new(),
        }
    }

    pub fn add_cell(&mut self, cell: Cell) {
        self.cells.push(cell);
    }

    /// Group cells into rows by filling column slots in insertion order.
    /// A cell that does not fit in the remaining slots starts a new row.
    pub fn rows(&self) -> Vec<Vec<&Cell>> {
        let mut rows: Vec<Vec<&Cell>> = Vec::new();
        let mut current: Vec<&Cell> = Vec::new();
        let mut used = 0usize;

        for cell in &self.cells {
            let span = cell.span_in(self.columns);
            if used + span > self.columns && !current.is_empty() {
                rows.push(std::mem::take(&mut current));
                used = 0;
            }
            current.push(cell);
            used += span;
            if used == self.columns {
                rows.push(std::mem::take(&mut current));
                used = 0;
            }
        }
        if !current.is_empty() {
            rows.push(current);
        }
        rows
    }
}

/// Padding in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Padding {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Padding {
    pub const fn uniform(v: f32) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }
}

/// Solid border line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Border {
    pub color: Color,
    pub width: f32,
}

/// Default cell padding on every side.
pub const CELL_PADDING: f32 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub col_span: usize,
    pub content: CellContent,
    pub padding: Padding,
    /// Only bottom borders are used by the invoice template.
    pub border_bottom: Option<Border>,
    pub vertical_align: VerticalAlign,
}

impl Cell {
    /// Borderless single-column cell. Vertical alignment follows the
    /// paragraph's style.
    pub fn text(paragraph: Paragraph) -> Self {
        let vertical_align = paragraph.style.vertical_align;
        Self {
            col_span: 1,
            content: CellContent::Text(paragraph),
            padding: Padding::uniform(CELL_PADDING),
            border_bottom: None,
            vertical_align,
        }
    }

    pub fn image(image: ImageBlock) -> Self {
        Self {
            col_span: 1,
            content: CellContent::Image(image),
            padding: Padding::uniform(CELL_PADDING),
            border_bottom: None,
            vertical_align: VerticalAlign::Top,
        }
    }

    pub fn spanning(self, col_span: usize) -> Self {
        Self { col_span, ..self }
    }

    pub fn with_padding_top(mut self, top: f32) -> Self {
        self.padding.top = top;
        self
    }

    pub fn with_padding_bottom(mut self, bottom: f32) -> Self {
        self.padding.bottom = bottom;
        self
    }

    pub fn with_border_bottom(self, color: Color, width: f32) -> Self {
        Self {
            border_bottom: Some(Border { color, width }),
            ..self
        }
    }

    pub fn with_vertical_align(self, vertical_align: VerticalAlign) -> Self {
        Self {
            vertical_align,
            ..self
        }
    }

    /// Span clamped to `1..=columns`.
    pub fn span_in(&self, columns: usize) -> usize {
        self.col_span.clamp(1, columns.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellContent {
    Text(Paragraph),
    Image(ImageBlock),
}

/// A run of text with one style, optionally boxed and linked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub text: String,
    pub style: TextStyle,
    /// URI opened when the paragraph box is clicked.
    pub link: Option<String>,
    pub background: Option<Color>,
    /// Inner padding of the paragraph box on every side.
    pub padding: f32,
    /// Fixed box width; `None` fills the cell.
    pub width: Option<f32>,
    /// Placement of a fixed-width box within its cell.
    pub box_align: TextAlign,
}

impl Paragraph {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
            link: None,
            background: None,
            padding: 0.0,
            width: None,
            box_align: TextAlign::Left,
        }
    }

    /// Copy with a different text alignment.
    pub fn aligned(self, align: TextAlign) -> Self {
        Self {
            style: self.style.with_align(align),
            ..self
        }
    }

    pub fn linked(self, uri: impl Into<String>) -> Self {
        Self {
            link: Some(uri.into()),
            ..self
        }
    }

    /// Give the paragraph its own filled box.
    pub fn boxed(self, background: Color, padding: f32, width: f32, box_align: TextAlign) -> Self {
        Self {
            background: Some(background),
            padding,
            width: Some(width),
            box_align,
            ..self
        }
    }
}

/// A resolved raster image scaled to a fixed footprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageBlock {
    /// `data:image/...;base64,` URI holding the encoded bytes.
    pub src: String,
    pub width: f32,
    pub height: f32,
    pub align: TextAlign,
}
