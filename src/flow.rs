//! Flow placement – uses Taffy to position the blocks of a [`Document`] on an
//! endless vertical strip the width of the page content box.
//!
//! Tables become flex columns of flex rows. Each cell grows in proportion to
//! its column span from a zero basis, which gives fixed, equal-width columns
//! regardless of content. Text is wrapped at build time against the column
//! width so Taffy only ever sees fixed-size leaves.

use std::collections::{HashMap, HashSet};

use taffy::prelude::*;

use crate::document::{Block, Cell, CellContent, Divider, Document, ImageBlock, Padding, Paragraph, Table};
use crate::error::Result;
use crate::fonts::{wrap_text, FontMetrics};
use crate::layout_config::BorderStyle;
use crate::style::{self, TextAlign, TextStyle, VerticalAlign};

// ---------------------------------------------------------------------------
// Positioned tree (pre-pagination)
// ---------------------------------------------------------------------------

/// A positioned box in document coordinates (before page splitting).
#[derive(Debug, Clone)]
pub struct PositionedBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub content: BoxContent,
    pub background: Option<style::Color>,
    pub border_bottom: Option<BorderStyle>,
    pub children: Vec<PositionedBox>,
    /// Children are table rows and may be split across pages.
    pub splittable: bool,
}

#[derive(Debug, Clone)]
pub enum BoxContent {
    None,
    Text {
        lines: Vec<String>,
        style: TextStyle,
        padding: f32,
        line_height: f32,
        link: Option<String>,
    },
    Image {
        src: String,
    },
}

#[derive(Debug, Clone, Copy, Default)]
struct Decoration {
    background: Option<style::Color>,
    border_bottom: Option<BorderStyle>,
}

// ---------------------------------------------------------------------------
// Build Taffy tree from document blocks
// ---------------------------------------------------------------------------

struct FlowBuilder<'a> {
    taffy: TaffyTree<()>,
    metrics: &'a FontMetrics,
    leading: f32,
    node_content: HashMap<NodeId, BoxContent>,
    node_decoration: HashMap<NodeId, Decoration>,
    splittable: HashSet<NodeId>,
}

fn margin(top: f32, right: f32, bottom: f32, left: f32) -> Rect<LengthPercentageAuto> {
    Rect {
        top: LengthPercentageAuto::Length(top),
        right: LengthPercentageAuto::Length(right),
        bottom: LengthPercentageAuto::Length(bottom),
        left: LengthPercentageAuto::Length(left),
    }
}

fn padding(p: &Padding) -> Rect<LengthPercentage> {
    Rect {
        top: LengthPercentage::Length(p.top),
        right: LengthPercentage::Length(p.right),
        bottom: LengthPercentage::Length(p.bottom),
        left: LengthPercentage::Length(p.left),
    }
}

fn align_self(align: TextAlign) -> Option<taffy::AlignSelf> {
    Some(match align {
        TextAlign::Left => taffy::AlignSelf::Start,
        TextAlign::Center => taffy::AlignSelf::Center,
        TextAlign::Right => taffy::AlignSelf::End,
    })
}

impl<'a> FlowBuilder<'a> {
    fn new(metrics: &'a FontMetrics, leading: f32) -> Self {
        Self {
            taffy: TaffyTree::new(),
            metrics,
            leading,
            node_content: HashMap::new(),
            node_decoration: HashMap::new(),
            splittable: HashSet::new(),
        }
    }

    fn build_block(&mut self, block: &Block, available_width: f32) -> Result<NodeId> {
        match block {
            Block::Table(table) => self.build_table(table, available_width),
            Block::Divider(divider) => self.build_divider(divider, available_width),
        }
    }

    fn build_divider(&mut self, divider: &Divider, available_width: f32) -> Result<NodeId> {
        let style = Style {
            size: Size {
                width: taffy::Dimension::Length(available_width),
                height: taffy::Dimension::Length(divider.thickness),
            },
            margin: margin(divider.margin_top, 0.0, 0.0, 0.0),
            flex_shrink: 0.0,
            ..Default::default()
        };
        let node = self.taffy.new_leaf(style)?;
        self.node_decoration.insert(
            node,
            Decoration {
                background: Some(divider.color),
                border_bottom: None,
            },
        );
        Ok(node)
    }

    fn build_table(&mut self, table: &Table, available_width: f32) -> Result<NodeId> {
        let table_width = table
            .width
            .unwrap_or(available_width - table.margin_left - table.margin_right)
            .max(0.0);
        let column_width = table_width / table.columns as f32;

        let mut row_nodes = Vec::new();
        for row in table.rows() {
            let mut cell_nodes = Vec::new();
            let mut used = 0usize;
            for cell in row {
                let span = cell.span_in(table.columns);
                used += span;
                cell_nodes.push(self.build_cell(cell, span, column_width * span as f32)?);
            }
            // Keep the spans of a short row at their column width.
            if used < table.columns {
                let filler = self.taffy.new_leaf(Style {
                    flex_grow: (table.columns - used) as f32,
                    flex_basis: taffy::Dimension::Length(0.0),
                    ..Default::default()
                })?;
                cell_nodes.push(filler);
            }

            let row_style = Style {
                display: taffy::Display::Flex,
                flex_direction: taffy::FlexDirection::Row,
                align_items: Some(taffy::AlignItems::Stretch),
                size: Size {
                    width: taffy::Dimension::Percent(1.0),
                    height: taffy::Dimension::Auto,
                },
                flex_shrink: 0.0,
                ..Default::default()
            };
            row_nodes.push(self.taffy.new_with_children(row_style, &cell_nodes)?);
        }

        let table_style = Style {
            display: taffy::Display::Flex,
            flex_direction: taffy::FlexDirection::Column,
            size: Size {
                width: taffy::Dimension::Length(table_width),
                height: taffy::Dimension::Auto,
            },
            margin: margin(table.margin_top, table.margin_right, 0.0, table.margin_left),
            flex_shrink: 0.0,
            ..Default::default()
        };
        let node = self.taffy.new_with_children(table_style, &row_nodes)?;
        self.splittable.insert(node);
        Ok(node)
    }

    fn build_cell(&mut self, cell: &Cell, span: usize, cell_width: f32) -> Result<NodeId> {
        let inner_width = (cell_width - cell.padding.left - cell.padding.right).max(0.0);
        let child = match &cell.content {
            CellContent::Text(paragraph) => self.build_paragraph(paragraph, inner_width)?,
            CellContent::Image(image) => self.build_image(image, inner_width)?,
        };

        let border_bottom = cell.border_bottom.map(|b| b.width).unwrap_or(0.0);
        let style = Style {
            display: taffy::Display::Flex,
            flex_direction: taffy::FlexDirection::Column,
            flex_grow: span as f32,
            flex_shrink: 1.0,
            flex_basis: taffy::Dimension::Length(0.0), // equal columns
            min_size: Size {
                width: taffy::Dimension::Length(0.0),
                height: taffy::Dimension::Auto,
            },
            justify_content: Some(match cell.vertical_align {
                VerticalAlign::Top => taffy::JustifyContent::Start,
                VerticalAlign::Middle => taffy::JustifyContent::Center,
                VerticalAlign::Bottom => taffy::JustifyContent::End,
            }),
            padding: padding(&cell.padding),
            border: Rect {
                top: LengthPercentage::Length(0.0),
                right: LengthPercentage::Length(0.0),
                bottom: LengthPercentage::Length(border_bottom),
                left: LengthPercentage::Length(0.0),
            },
            ..Default::default()
        };
        let node = self.taffy.new_with_children(style, &[child])?;
        if let Some(border) = cell.border_bottom {
            self.node_decoration.insert(
                node,
                Decoration {
                    background: None,
                    border_bottom: Some(BorderStyle {
                        width: border.width,
                        color: border.color,
                    }),
                },
            );
        }
        Ok(node)
    }

    fn build_paragraph(&mut self, paragraph: &Paragraph, available_width: f32) -> Result<NodeId> {
        let box_width = paragraph
            .width
            .map(|w| w.min(available_width))
            .unwrap_or(available_width)
            .max(0.0);
        let text_width = (box_width - 2.0 * paragraph.padding).max(0.0);
        let font_size = paragraph.style.font_size;

        let lines = wrap_text(
            &paragraph.text,
            font_size,
            paragraph.style.is_bold(),
            text_width,
            self.metrics,
        );
        let line_height = self.metrics.line_height(font_size, self.leading);
        let height = lines.len() as f32 * line_height + 2.0 * paragraph.padding;

        let style = Style {
            size: Size {
                width: taffy::Dimension::Length(box_width),
                height: taffy::Dimension::Length(height),
            },
            flex_shrink: 0.0,
            align_self: align_self(paragraph.box_align),
            ..Default::default()
        };
        let node = self.taffy.new_leaf(style)?;
        self.node_content.insert(
            node,
            BoxContent::Text {
                lines,
                style: paragraph.style,
                padding: paragraph.padding,
                line_height,
                link: paragraph.link.clone(),
            },
        );
        if paragraph.background.is_some() {
            self.node_decoration.insert(
                node,
                Decoration {
                    background: paragraph.background,
                    border_bottom: None,
                },
            );
        }
        Ok(node)
    }

    fn build_image(&mut self, image: &ImageBlock, available_width: f32) -> Result<NodeId> {
        let style = Style {
            size: Size {
                width: taffy::Dimension::Length(image.width.min(available_width)),
                height: taffy::Dimension::Length(image.height),
            },
            flex_shrink: 0.0,
            align_self: align_self(image.align),
            ..Default::default()
        };
        let node = self.taffy.new_leaf(style)?;
        self.node_content.insert(
            node,
            BoxContent::Image {
                src: image.src.clone(),
            },
        );
        Ok(node)
    }

    /// Extract positioned boxes after layout computation.
    fn extract(&self, node: NodeId, offset_x: f32, offset_y: f32) -> Result<PositionedBox> {
        let layout = self.taffy.layout(node)?;
        let x = offset_x + layout.location.x;
        let y = offset_y + layout.location.y;
        let (width, height) = (layout.size.width, layout.size.height);

        let content = self
            .node_content
            .get(&node)
            .cloned()
            .unwrap_or(BoxContent::None);
        let decoration = self.node_decoration.get(&node).copied().unwrap_or_default();

        let children = self
            .taffy
            .children(node)?
            .iter()
            .map(|&child| self.extract(child, x, y))
            .collect::<Result<Vec<_>>>()?;

        Ok(PositionedBox {
            x,
            y,
            width,
            height,
            content,
            background: decoration.background,
            border_bottom: decoration.border_bottom,
            children,
            splittable: self.splittable.contains(&node),
        })
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Place every block of `document`, returning one positioned box per block in
/// document coordinates: x is page-absolute, y starts at the top of the
/// content box.
pub fn compute_flow(document: &Document, metrics: &FontMetrics) -> Result<Vec<PositionedBox>> {
    let page = &document.page;
    let content_width = page.content_width();
    let mut builder = FlowBuilder::new(metrics, page.leading);

    let mut child_ids = Vec::with_capacity(document.blocks.len());
    for block in &document.blocks {
        child_ids.push(builder.build_block(block, content_width)?);
    }

    let root_style = Style {
        display: taffy::Display::Flex,
        flex_direction: taffy::FlexDirection::Column,
        size: Size {
            width: taffy::Dimension::Length(content_width),
            height: taffy::Dimension::Auto,
        },
        ..Default::default()
    };
    let root = builder.taffy.new_with_children(root_style, &child_ids)?;

    builder.taffy.compute_layout(
        root,
        Size {
            width: AvailableSpace::Definite(content_width),
            height: AvailableSpace::MaxContent,
        },
    )?;

    let root_box = builder.extract(root, page.margins.left, 0.0)?;
    Ok(root_box.children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::PageSetup;
    use crate::layout::{build_document, SignatureLayout};
    use crate::model::Invoice;

    fn sample_flow() -> Vec<PositionedBox> {
        let doc = build_document(
            &Invoice::sample(),
            &SignatureLayout::WithoutSignature,
            "flow",
            PageSetup::INVOICE,
        );
        compute_flow(&doc, &FontMetrics::HELVETICA).unwrap()
    }

    #[test]
    fn one_box_per_block() {
        let boxes = sample_flow();
        assert_eq!(boxes.len(), 4);
        assert!(boxes[0].splittable);
        assert!(!boxes[1].splittable);
        assert!(boxes[1].background.is_some());
    }

    #[test]
    fn blocks_stack_with_fixed_spacing() {
        let boxes = sample_flow();
        let header = &boxes[0];
        let divider = &boxes[1];
        let parties = &boxes[2];
        assert!((divider.y - (header.y + header.height + 20.0)).abs() < 0.5);
        assert!((parties.y - (divider.y + divider.height + 50.0)).abs() < 0.5);
    }

    #[test]
    fn tables_are_inset() {
        let boxes = sample_flow();
        for idx in [0, 2, 3] {
            let table = &boxes[idx];
            assert!((table.x - (13.0 + 15.0)).abs() < 0.5, "x = {}", table.x);
            assert!((table.width - 594.0).abs() < 0.5, "w = {}", table.width);
        }
    }

    #[test]
    fn product_columns_are_equal_width() {
        let boxes = sample_flow();
        let header_row = &boxes[3].children[0];
        assert_eq!(header_row.children.len(), 4);
        let w0 = header_row.children[0].width;
        for cell in &header_row.children {
            assert!((cell.width - w0).abs() < 0.5);
        }
    }

    #[test]
    fn bordered_cells_carry_decoration() {
        let boxes = sample_flow();
        let first_product_row = &boxes[3].children[1];
        assert!(first_product_row
            .children
            .iter()
            .all(|c| c.border_bottom.map(|b| b.width) == Some(1.0)));
    }

    #[test]
    fn pay_button_is_right_aligned_in_its_cell() {
        let boxes = sample_flow();
        let pay_cell = &boxes[0].children[0].children[1];
        let button = &pay_cell.children[0];
        assert!((button.width - 100.0).abs() < 0.5);
        let cell_inner_right = pay_cell.x + pay_cell.width - 2.0;
        assert!((button.x + button.width - cell_inner_right).abs() < 0.5);
        assert!(button.background.is_some());
        assert!(matches!(button.content, BoxContent::Text { link: Some(_), .. }));
    }

    #[test]
    fn date_row_keeps_column_width() {
        let boxes = sample_flow();
        let date_row = &boxes[0].children[1];
        // date cell + filler
        assert_eq!(date_row.children.len(), 2);
        assert!(date_row.children[0].width < boxes[0].width * 0.6);
    }

    #[test]
    fn party_names_keep_their_spacing() {
        let mut invoice = Invoice::sample();
        invoice.from.name = "  Leslie   Alexander ".to_string();
        let doc = build_document(
            &invoice,
            &SignatureLayout::WithoutSignature,
            "flow",
            PageSetup::INVOICE,
        );
        let boxes = compute_flow(&doc, &FontMetrics::HELVETICA).unwrap();
        let name_cell = &boxes[2].children[1].children[0];
        match &name_cell.children[0].content {
            BoxContent::Text { lines, .. } => {
                assert_eq!(lines, &vec!["  Leslie   Alexander ".to_string()]);
            }
            other => panic!("expected text, got {other:?}"),
        }
    }
}
