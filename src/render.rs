//! PDF renderer – takes a [`LayoutConfig`] and produces PDF bytes using
//! `printpdf` (v0.8 ops-based API).

use std::collections::{HashMap, HashSet};

use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};
use printpdf::*;

use crate::error::{RenderError, Result};
use crate::fonts::FontMetrics;
use crate::layout_config::{LayoutBox, LayoutConfig};
use crate::style;

/// A printpdf XObject together with the pixel dimensions of the source image.
struct ImageResource {
    xobj_id: XObjectId,
    px_width: u32,
    px_height: u32,
}

/// Render a LayoutConfig into PDF bytes.
///
/// Images whose `src` is not a base64 data URI, or whose bytes cannot be
/// decoded, are skipped with a `log::warn`.
pub fn render_pdf(config: &LayoutConfig) -> Result<Vec<u8>> {
    if config.page_width_pt <= 0.0 || config.page_height_pt <= 0.0 {
        return Err(RenderError::Encode(format!(
            "invalid page size {}x{}",
            config.page_width_pt, config.page_height_pt
        )));
    }
    let page_w = Mm(config.page_width_pt * 0.352778); // pt → mm
    let page_h = Mm(config.page_height_pt * 0.352778);

    let mut doc = PdfDocument::new(&config.title);

    // ── Pre-register all images ────────────────────────────────────────────
    let mut all_srcs: HashSet<String> = HashSet::new();
    config.visit(&mut |lbox| {
        if let Some(img) = &lbox.image {
            all_srcs.insert(img.src.clone());
        }
    });

    let mut image_resources: HashMap<String, ImageResource> = HashMap::new();
    let mut img_warnings: Vec<PdfWarnMsg> = Vec::new();

    for src in &all_srcs {
        let bytes = match parse_data_uri(src) {
            Ok(b) => b,
            Err(e) => {
                log::warn!("Skipping image: {e}");
                continue;
            }
        };

        let dyn_img = match ::image::load_from_memory(&bytes) {
            Ok(img) => img,
            Err(e) => {
                log::warn!("Skipping image: decode error: {e}");
                continue;
            }
        };
        let (px_width, px_height) = (dyn_img.width(), dyn_img.height());

        let raw = match RawImage::decode_from_bytes(&bytes, &mut img_warnings) {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Skipping image: PDF encode error: {e}");
                continue;
            }
        };
        let xobj_id = doc.add_image(&raw);

        image_resources.insert(
            src.clone(),
            ImageResource {
                xobj_id,
                px_width,
                px_height,
            },
        );
    }

    // ── Render pages ──────────────────────────────────────────────────────
    let metrics = FontMetrics::HELVETICA;
    let mut pages = Vec::new();

    for page_layout in &config.pages {
        let mut ops = Vec::new();
        for lbox in &page_layout.boxes {
            render_box(&mut ops, lbox, config.page_height_pt, &image_resources, &metrics);
        }
        pages.push(PdfPage::new(page_w, page_h, ops));
    }

    if pages.is_empty() {
        pages.push(PdfPage::new(page_w, page_h, Vec::new()));
    }

    doc.with_pages(pages);
    let bytes = doc.save(&PdfSaveOptions::default(), &mut Vec::new());

    Ok(bytes)
}

/// Parse a `data:<mime>;base64,<data>` URI and return the raw decoded bytes.
pub(crate) fn parse_data_uri(src: &str) -> std::result::Result<Vec<u8>, String> {
    let rest = src.strip_prefix("data:").ok_or_else(|| {
        let preview: String = src.chars().take(80).collect();
        format!("image src must be a base64 data URI, got {preview:?}")
    })?;
    let (header, data) = rest
        .split_once(',')
        .ok_or_else(|| "missing `,` separator between header and data".to_string())?;
    if !header.contains(";base64") {
        return Err("only base64-encoded data URIs are supported".to_string());
    }
    BASE64_STD
        .decode(data.trim())
        .map_err(|e| format!("base64 decode error: {e}"))
}

fn pdf_color(c: style::Color) -> Color {
    let [r, g, b] = c.to_unit();
    Color::Rgb(Rgb {
        r,
        g,
        b,
        icc_profile: None,
    })
}

fn point(x: f32, y: f32) -> LinePoint {
    LinePoint {
        p: Point { x: Pt(x), y: Pt(y) },
        bezier: false,
    }
}

/// Recursively render a LayoutBox and its children into PDF ops.
fn render_box(
    ops: &mut Vec<Op>,
    lbox: &LayoutBox,
    page_height: f32,
    images: &HashMap<String, ImageResource>,
    metrics: &FontMetrics,
) {
    // PDF origin is bottom-left; layout origin is top-left.
    let pdf_top = page_height - lbox.y;
    let pdf_bottom = pdf_top - lbox.height;
    let (x1, x2) = (lbox.x, lbox.x + lbox.width);

    if let Some(bg) = lbox.background_color {
        ops.push(Op::SetFillColor { col: pdf_color(bg) });
        ops.push(Op::DrawPolygon {
            polygon: Polygon {
                rings: vec![PolygonRing {
                    points: vec![
                        point(x1, pdf_bottom),
                        point(x2, pdf_bottom),
                        point(x2, pdf_top),
                        point(x1, pdf_top),
                    ],
                }],
                mode: PaintMode::Fill,
                winding_order: WindingOrder::NonZero,
            },
        });
    }

    if let Some(border) = lbox.border_bottom {
        // Centre the stroke inside the border band at the bottom of the box.
        let y = pdf_bottom + border.width / 2.0;
        ops.push(Op::SetOutlineColor {
            col: pdf_color(border.color),
        });
        ops.push(Op::SetOutlineThickness {
            pt: Pt(border.width),
        });
        ops.push(Op::DrawLine {
            line: Line {
                points: vec![point(x1, y), point(x2, y)],
                is_closed: false,
            },
        });
    }

    if let Some(text) = &lbox.text {
        let font = if text.bold {
            BuiltinFont::HelveticaBold
        } else {
            BuiltinFont::Helvetica
        };

        for tline in &text.lines {
            if tline.text.is_empty() {
                continue;
            }
            let text_x = lbox.x + tline.x_offset;
            let text_y = pdf_top - tline.y_offset - metrics.ascender_pt(text.font_size);

            ops.push(Op::StartTextSection);
            ops.push(Op::SetTextCursor {
                pos: Point {
                    x: Pt(text_x),
                    y: Pt(text_y),
                },
            });
            ops.push(Op::SetFontSizeBuiltinFont {
                size: Pt(text.font_size),
                font,
            });
            ops.push(Op::SetLineHeight {
                lh: Pt(text.line_height),
            });
            ops.push(Op::SetFillColor {
                col: pdf_color(text.color),
            });
            ops.push(Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(tline.text.clone())],
                font,
            });
            ops.push(Op::EndTextSection);
        }
    }

    if let Some(uri) = &lbox.link {
        ops.push(Op::LinkAnnotation {
            link: LinkAnnotation::new(
                Rect {
                    x: Pt(x1),
                    y: Pt(pdf_bottom),
                    width: Pt(lbox.width),
                    height: Pt(lbox.height),
                },
                Actions::Uri(uri.clone()),
                None,
                None,
                None,
            ),
        });
    }

    if let Some(img) = &lbox.image {
        if let Some(res) = images.get(&img.src) {
            let img_bottom_y = page_height - lbox.y - img.height;

            // At dpi=72 printpdf renders 1 px = 1 pt, so
            // scale = desired_pt / px_dim.
            let scale_x = if res.px_width > 0 {
                img.width / res.px_width as f32
            } else {
                1.0
            };
            let scale_y = if res.px_height > 0 {
                img.height / res.px_height as f32
            } else {
                1.0
            };

            ops.push(Op::UseXobject {
                id: res.xobj_id.clone(),
                transform: XObjectTransform {
                    translate_x: Some(Pt(lbox.x)),
                    translate_y: Some(Pt(img_bottom_y)),
                    dpi: Some(72.0),
                    scale_x: Some(scale_x),
                    scale_y: Some(scale_y),
                    rotate: None,
                },
            });
        }
    }

    for child in &lbox.children {
        render_box(ops, child, page_height, images, metrics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout_config::{ImageContent, PageLayout, TextContent, TextLine};

    #[test]
    fn render_empty_page() {
        let config = LayoutConfig::new("empty", 650.0, 700.0);
        let bytes = render_pdf(&config).unwrap();
        assert!(bytes.len() > 100, "PDF should have content");
        assert_eq!(&bytes[0..5], b"%PDF-");
    }

    #[test]
    fn rejects_degenerate_page() {
        let config = LayoutConfig::new("bad", 0.0, 700.0);
        assert!(matches!(render_pdf(&config), Err(RenderError::Encode(_))));
    }

    #[test]
    fn data_uri_parsing() {
        assert_eq!(parse_data_uri("data:image/png;base64,AAEC").unwrap(), vec![0, 1, 2]);
        assert!(parse_data_uri("https://example.com/a.png").is_err());
        assert!(parse_data_uri("data:image/png,AAEC").is_err());
        assert!(parse_data_uri("data:image/png;base64").is_err());
    }

    #[test]
    fn undecodable_image_is_skipped() {
        let mut config = LayoutConfig::new("img", 650.0, 700.0);
        let mut lbox = LayoutBox::new(10.0, 10.0, 50.0, 50.0);
        lbox.image = Some(ImageContent {
            src: "data:image/png;base64,AAEC".to_string(),
            width: 50.0,
            height: 50.0,
        });
        config.pages.push(PageLayout {
            page_index: 0,
            boxes: vec![lbox],
        });
        let bytes = render_pdf(&config).unwrap();
        assert_eq!(&bytes[0..5], b"%PDF-");
    }

    #[test]
    fn linked_box_renders_with_annotation() {
        let mut config = LayoutConfig::new("link", 650.0, 700.0);
        let mut lbox = LayoutBox::new(500.0, 50.0, 100.0, 36.0);
        lbox.background_color = Some(style::ACCENT_BLUE);
        lbox.text = Some(TextContent {
            lines: vec![TextLine {
                text: "Pay $885.00".to_string(),
                x_offset: 17.0,
                y_offset: 12.0,
            }],
            font_size: 12.0,
            bold: false,
            color: style::WHITE,
            line_height: 12.0,
        });
        lbox.link = Some("https://www.google.com".to_string());
        config.pages.push(PageLayout {
            page_index: 0,
            boxes: vec![lbox],
        });
        let bytes = render_pdf(&config).unwrap();
        assert_eq!(&bytes[0..5], b"%PDF-");
    }

    #[test]
    fn non_ascii_text_renders() {
        let mut config = LayoutConfig::new("latin", 650.0, 700.0);
        let mut lbox = LayoutBox::new(10.0, 10.0, 200.0, 12.0);
        lbox.text = Some(TextContent {
            lines: vec![TextLine {
                text: "Café – 5€ …".to_string(),
                x_offset: 0.0,
                y_offset: 0.0,
            }],
            font_size: 12.0,
            bold: true,
            color: style::BLACK,
            line_height: 12.0,
        });
        config.pages.push(PageLayout {
            page_index: 0,
            boxes: vec![lbox],
        });
        assert_eq!(&render_pdf(&config).unwrap()[0..5], b"%PDF-");
    }
}
