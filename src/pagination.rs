//! Pagination – splits the flowed blocks into pages and converts them to the
//! page-absolute [`LayoutConfig`].
//!
//! The invoice template is designed to fit one page. When it does not, tables
//! break between rows and any other block moves whole to the next page.

use crate::document::Document;
use crate::flow::{BoxContent, PositionedBox};
use crate::fonts::FontMetrics;
use crate::layout_config::*;
use crate::style::TextAlign;

/// Convert flowed boxes into a paginated LayoutConfig.
pub fn paginate(boxes: &[PositionedBox], document: &Document, metrics: &FontMetrics) -> LayoutConfig {
    let page = &document.page;
    let mut config = LayoutConfig::new(&document.title, page.width, page.height);
    let content_height = page.content_height();
    let top = page.margins.top;

    let mut current_page = PageLayout {
        page_index: 0,
        boxes: Vec::new(),
    };

    // Document-space y at which the current page begins.
    let mut page_start_doc_y = 0.0f32;

    for pbox in boxes {
        let y_on_page = (pbox.y - page_start_doc_y).max(0.0);
        let box_bottom = y_on_page + pbox.height;

        if box_bottom > content_height {
            if pbox.splittable {
                split_table_box(
                    pbox,
                    &mut config,
                    &mut current_page,
                    &mut page_start_doc_y,
                    content_height,
                    top,
                    metrics,
                );
                continue;
            } else if !current_page.boxes.is_empty() {
                log::debug!("block at y={} moves to page {}", pbox.y, config.pages.len() + 1);
                config.pages.push(std::mem::replace(
                    &mut current_page,
                    PageLayout {
                        page_index: config.pages.len() + 1,
                        boxes: Vec::new(),
                    },
                ));
                page_start_doc_y = pbox.y;
            }
        }

        let y_on_page = (pbox.y - page_start_doc_y).max(0.0);
        current_page
            .boxes
            .push(build_layout_box(pbox, pbox.x, top + y_on_page, metrics));
    }

    if !current_page.boxes.is_empty() || config.pages.is_empty() {
        config.pages.push(current_page);
    }
    config
}

fn split_table_box(
    pbox: &PositionedBox,
    config: &mut LayoutConfig,
    current_page: &mut PageLayout,
    page_start_doc_y: &mut f32,
    content_height: f32,
    top: f32,
    metrics: &FontMetrics,
) {
    for row in &pbox.children {
        let y_on_page = (row.y - *page_start_doc_y).max(0.0);
        if y_on_page + row.height > content_height && !current_page.boxes.is_empty() {
            log::debug!("table row at y={} breaks to page {}", row.y, config.pages.len() + 1);
            config.pages.push(std::mem::replace(
                current_page,
                PageLayout {
                    page_index: config.pages.len() + 1,
                    boxes: Vec::new(),
                },
            ));
            *page_start_doc_y = row.y;
        }
        let y = (row.y - *page_start_doc_y).max(0.0);
        current_page
            .boxes
            .push(build_layout_box(row, row.x, top + y, metrics));
    }
}

/// Recursively build a LayoutBox tree where every box carries page-absolute
/// x/y coordinates (origin = top-left of the physical page).
///
/// Positioned x values are already page-absolute; a child's y is its parent's
/// page y plus the document-space distance between the two.
fn build_layout_box(pbox: &PositionedBox, abs_x: f32, abs_y: f32, metrics: &FontMetrics) -> LayoutBox {
    let mut lb = LayoutBox::new(abs_x, abs_y, pbox.width, pbox.height);
    lb.background_color = pbox.background;
    lb.border_bottom = pbox.border_bottom;

    match &pbox.content {
        BoxContent::Text {
            lines,
            style,
            padding,
            line_height,
            link,
        } => {
            let bold = style.is_bold();
            let inner_width = (pbox.width - 2.0 * padding).max(0.0);
            let text_lines = lines
                .iter()
                .enumerate()
                .map(|(i, line)| {
                    let slack =
                        (inner_width - metrics.measure_text_width(line, style.font_size, bold))
                            .max(0.0);
                    let align_offset = match style.align {
                        TextAlign::Left => 0.0,
                        TextAlign::Center => slack / 2.0,
                        TextAlign::Right => slack,
                    };
                    TextLine {
                        text: line.clone(),
                        x_offset: padding + align_offset,
                        y_offset: padding + i as f32 * line_height,
                    }
                })
                .collect();

            lb.text = Some(TextContent {
                lines: text_lines,
                font_size: style.font_size,
                bold,
                color: style.color,
                line_height: *line_height,
            });
            lb.link = link.clone();
        }
        BoxContent::Image { src } => {
            lb.image = Some(ImageContent {
                src: src.clone(),
                width: pbox.width,
                height: pbox.height,
            });
        }
        BoxContent::None => {}
    }

    for child in &pbox.children {
        let child_abs_y = abs_y + (child.y - pbox.y);
        lb.children
            .push(build_layout_box(child, child.x, child_abs_y, metrics));
    }

    lb
}
