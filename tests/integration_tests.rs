//! Integration tests for the invoice-forge pipeline.
//!
//! These tests validate:
//! - The invoice template has the expected sections, rows and spans
//! - Layout is deterministic and stays inside the page
//! - PDF output exists and has valid format
//! - Signature failures and output failures behave as documented

use std::io::{self, Cursor, Write};

use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};
use sha2::{Digest, Sha256};

use invoice_forge::document::{Block, CellContent, Table};
use invoice_forge::layout::SignatureLayout;
use invoice_forge::layout_config::LayoutConfig;
use invoice_forge::pipeline::{
    compute_layout_config, layout_invoice, render_invoice, render_invoice_to_vec,
    resolve_signature_layout, RenderConfig,
};
use invoice_forge::render::render_pdf;
use invoice_forge::{Invoice, Product, RenderError};

// =====================================================================
// Helpers
// =====================================================================

fn offline_config() -> RenderConfig {
    RenderConfig {
        fetch_signature: false,
        ..RenderConfig::default()
    }
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 100, "PDF too small: {} bytes", bytes.len());
    assert_eq!(&bytes[0..5], b"%PDF-", "Missing PDF header");
}

fn signature_data_uri() -> String {
    let img = image::ImageBuffer::from_pixel(8, 8, image::Rgba([0u8, 0, 0, 255]));
    let mut png = Cursor::new(Vec::new());
    img.write_to(&mut png, image::ImageFormat::Png).unwrap();
    format!(
        "data:image/png;base64,{}",
        BASE64_STD.encode(png.into_inner())
    )
}

fn signed_invoice() -> Invoice {
    Invoice {
        signature_url: Some(signature_data_uri()),
        ..Invoice::sample()
    }
}

fn product_table(invoice: &Invoice, signature: &SignatureLayout) -> Table {
    let doc = layout_invoice(invoice, signature, &offline_config());
    match doc.blocks.last() {
        Some(Block::Table(t)) => t.clone(),
        other => panic!("expected product table last, got {other:?}"),
    }
}

fn layout_hash(config: &LayoutConfig) -> String {
    let digest = Sha256::digest(config.to_json().as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

// =====================================================================
// Template structure
// =====================================================================

#[test]
fn product_rows_are_n_plus_three() {
    for n in [0usize, 1, 3, 12] {
        let mut invoice = Invoice::sample();
        invoice.products = (0..n)
            .map(|i| Product {
                description: format!("Line {i}"),
                rate: 10.0,
                quantity: 1,
            })
            .collect();
        let table = product_table(&invoice, &SignatureLayout::WithoutSignature);
        assert_eq!(table.rows().len(), n + 3, "for {n} products");
    }
}

#[test]
fn totals_row_without_signature_spans_all_columns() {
    let table = product_table(&Invoice::sample(), &SignatureLayout::WithoutSignature);
    let rows = table.rows();
    let totals = rows.last().unwrap();
    assert_eq!(totals.len(), 1);
    assert_eq!(totals[0].col_span, 4);
    match &totals[0].content {
        CellContent::Text(p) => assert_eq!(p.text, "$1015.04"),
        CellContent::Image(_) => panic!("total must be text"),
    }
}

#[test]
fn totals_row_with_signature_splits_two_and_two() {
    let invoice = signed_invoice();
    let signature = resolve_signature_layout(&invoice, &RenderConfig::default());
    assert!(matches!(signature, SignatureLayout::WithSignature(_)));

    let table = product_table(&invoice, &signature);
    let rows = table.rows();
    let totals = rows.last().unwrap();
    assert_eq!(totals.len(), 2);
    assert_eq!(totals[0].col_span, 2);
    assert!(matches!(totals[0].content, CellContent::Image(_)));
    assert_eq!(totals[1].col_span, 2);
}

#[test]
fn empty_invoice_totals_zero() {
    let invoice = Invoice {
        products: Vec::new(),
        ..Invoice::sample()
    };
    assert_eq!(invoice.grand_total(), 0.0);
    let table = product_table(&invoice, &SignatureLayout::WithoutSignature);
    let rows = table.rows();
    assert_eq!(rows.len(), 3);
    match &rows[2][0].content {
        CellContent::Text(p) => assert_eq!(p.text, "$0.00"),
        CellContent::Image(_) => panic!("total must be text"),
    }
}

// =====================================================================
// Layout config
// =====================================================================

#[test]
fn layout_is_deterministic() {
    let invoice = Invoice::sample();
    let a = compute_layout_config(&invoice, &offline_config()).unwrap();
    let b = compute_layout_config(&invoice, &offline_config()).unwrap();
    assert_eq!(layout_hash(&a), layout_hash(&b));
}

#[test]
fn boxes_lie_within_page() {
    let config = compute_layout_config(&signed_invoice(), &RenderConfig::default()).unwrap();
    assert_eq!(config.page_width_pt, 650.0);
    assert_eq!(config.page_height_pt, 700.0);
    config.visit(&mut |b| {
        assert!(b.x >= 0.0 && b.y >= 0.0, "box at ({}, {})", b.x, b.y);
        assert!(b.x + b.width <= 650.0 + 0.5, "box overflows right: {b:?}");
        assert!(b.y + b.height <= 700.0 + 0.5, "box overflows bottom: {b:?}");
    });
}

#[test]
fn pay_button_links_to_payment_uri() {
    let config = compute_layout_config(&Invoice::sample(), &offline_config()).unwrap();
    let mut found = false;
    config.visit(&mut |b| {
        if b.text_string().as_deref() == Some("Pay $885.00") {
            assert_eq!(b.link.as_deref(), Some("https://www.google.com"));
            assert!(b.background_color.is_some());
            found = true;
        }
    });
    assert!(found, "pay button not found");
}

#[test]
fn signature_image_is_placed() {
    let config = compute_layout_config(&signed_invoice(), &RenderConfig::default()).unwrap();
    let mut images = Vec::new();
    config.visit(&mut |b| {
        if let Some(img) = &b.image {
            images.push((img.width, img.height));
        }
    });
    assert_eq!(images, vec![(50.0, 50.0)]);
}

#[test]
fn layout_json_roundtrip_and_render() {
    let config = compute_layout_config(&Invoice::sample(), &offline_config()).unwrap();
    let parsed = LayoutConfig::from_json(&config.to_json()).unwrap();
    assert_eq!(parsed, config);
    assert_valid_pdf(&render_pdf(&parsed).unwrap());
}

// =====================================================================
// PDF output
// =====================================================================

#[test]
fn render_sample_into_vec() {
    let mut out = Vec::new();
    render_invoice(&Invoice::sample(), &mut out, &offline_config()).unwrap();
    assert_valid_pdf(&out);
}

#[test]
fn render_with_signature() {
    let bytes = render_invoice_to_vec(&signed_invoice(), &RenderConfig::default()).unwrap();
    assert_valid_pdf(&bytes);
}

#[test]
fn unreachable_signature_still_renders() {
    let invoice = Invoice {
        signature_url: Some("/definitely/not/here/signature.png".to_string()),
        ..Invoice::sample()
    };
    let signature = resolve_signature_layout(&invoice, &RenderConfig::default());
    assert_eq!(signature, SignatureLayout::WithoutSignature);

    let bytes = render_invoice_to_vec(&invoice, &RenderConfig::default()).unwrap();
    assert_valid_pdf(&bytes);
}

#[test]
fn long_invoice_spans_pages() {
    let mut invoice = Invoice::sample();
    invoice.products = (0..60)
        .map(|i| Product {
            description: format!("Consulting hour {i}"),
            rate: 95.0,
            quantity: 1,
        })
        .collect();
    let config = compute_layout_config(&invoice, &offline_config()).unwrap();
    assert!(config.pages.len() > 1);
    assert_valid_pdf(&render_pdf(&config).unwrap());
}

#[test]
fn concurrent_renders() {
    let invoice = Invoice::sample();
    let config = offline_config();
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| render_invoice_to_vec(&invoice, &config)))
            .collect();
        for h in handles {
            let bytes = h.join().unwrap().unwrap();
            assert_valid_pdf(&bytes);
        }
    });
}

struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "disk full"))
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn failing_writer_reports_io_error() {
    let err = render_invoice(&Invoice::sample(), FailingWriter, &offline_config()).unwrap_err();
    assert!(matches!(err, RenderError::Io(_)), "got {err:?}");
}

#[test]
fn invoice_json_roundtrip() {
    let invoice = signed_invoice();
    let parsed = Invoice::from_json(&invoice.to_json()).unwrap();
    assert_eq!(parsed, invoice);
}
