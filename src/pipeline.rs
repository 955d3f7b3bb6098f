//! Pipeline – ties together signature resolution, layout building and the
//! render sink into single function calls.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::document::{Document, PageSetup};
use crate::error::Result;
use crate::layout::{build_document, SignatureLayout};
use crate::layout_config::LayoutConfig;
use crate::model::Invoice;
use crate::signature::{resolve_signature, DEFAULT_TIMEOUT};
use crate::sink::{DocumentSink, PdfSink};

/// Configuration for one invoice render.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Document title embedded in the PDF metadata (default: "Invoice").
    pub title: String,
    /// Page geometry (default: 650×700 pt invoice canvas).
    pub page: PageSetup,
    /// Upper bound on the signature download (default: 10 s).
    pub signature_timeout: Duration,
    /// When false the signature reference is ignored entirely.
    pub fetch_signature: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            title: "Invoice".to_string(),
            page: PageSetup::INVOICE,
            signature_timeout: DEFAULT_TIMEOUT,
            fetch_signature: true,
        }
    }
}

/// Decide the totals-row shape, loading the signature if enabled.
pub fn resolve_signature_layout(invoice: &Invoice, config: &RenderConfig) -> SignatureLayout {
    if !config.fetch_signature {
        return SignatureLayout::WithoutSignature;
    }
    resolve_signature(invoice.signature_url.as_deref(), config.signature_timeout)
}

/// Pure layout step: same inputs, same document.
pub fn layout_invoice(
    invoice: &Invoice,
    signature: &SignatureLayout,
    config: &RenderConfig,
) -> Document {
    build_document(invoice, signature, &config.title, config.page)
}

/// Feed a document into a sink and close it onto `out`.
pub fn write_document<S: DocumentSink, W: Write>(document: Document, mut sink: S, out: W) -> Result<()> {
    feed(document, &mut sink);
    sink.close(out)
}

fn feed<S: DocumentSink>(document: Document, sink: &mut S) {
    let page = document.page;
    sink.set_title(&document.title);
    sink.set_page_size(page.width, page.height);
    sink.set_margins(page.margins);
    sink.set_leading(page.leading);
    for block in document.blocks {
        sink.add(block);
    }
}

/// Full pipeline: invoice → PDF bytes written to `out`.
pub fn render_invoice<W: Write>(invoice: &Invoice, out: W, config: &RenderConfig) -> Result<()> {
    let signature = resolve_signature_layout(invoice, config);
    render_invoice_with(invoice, &signature, out, config)
}

/// Render with an already resolved signature. No I/O besides `out`.
pub fn render_invoice_with<W: Write>(
    invoice: &Invoice,
    signature: &SignatureLayout,
    out: W,
    config: &RenderConfig,
) -> Result<()> {
    let document = layout_invoice(invoice, signature, config);
    write_document(document, PdfSink::new(), out)?;
    log::info!(
        "rendered invoice #{} ({} products, signature: {})",
        invoice.number,
        invoice.products.len(),
        matches!(signature, SignatureLayout::WithSignature(_))
    );
    Ok(())
}

/// Convenience: render into an in-memory buffer.
pub fn render_invoice_to_vec(invoice: &Invoice, config: &RenderConfig) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    render_invoice(invoice, &mut bytes, config)?;
    Ok(bytes)
}

/// Generate only the layout config (no PDF encoding) – useful for testing.
pub fn compute_layout_config(invoice: &Invoice, config: &RenderConfig) -> Result<LayoutConfig> {
    let signature = resolve_signature_layout(invoice, config);
    compute_layout_config_with(invoice, &signature, config)
}

/// Layout config for an already resolved signature.
pub fn compute_layout_config_with(
    invoice: &Invoice,
    signature: &SignatureLayout,
    config: &RenderConfig,
) -> Result<LayoutConfig> {
    let document = layout_invoice(invoice, signature, config);
    let mut sink = PdfSink::new();
    feed(document, &mut sink);
    sink.layout_config()
}

/// Render to a file. Bytes go to a sibling `*.part` file that is renamed
/// into place on success and removed on failure.
pub fn render_invoice_file(invoice: &Invoice, path: impl AsRef<Path>, config: &RenderConfig) -> Result<()> {
    let signature = resolve_signature_layout(invoice, config);
    render_invoice_file_with(invoice, &signature, path, config)
}

/// [`render_invoice_file`] with an already resolved signature.
pub fn render_invoice_file_with(
    invoice: &Invoice,
    signature: &SignatureLayout,
    path: impl AsRef<Path>,
    config: &RenderConfig,
) -> Result<()> {
    let path = path.as_ref();
    let part = part_path(path);

    let result = File::create(&part)
        .map_err(Into::into)
        .and_then(|file| render_invoice_with(invoice, signature, BufWriter::new(file), config))
        .and_then(|()| fs::rename(&part, path).map_err(Into::into));

    if result.is_err() {
        if let Err(e) = fs::remove_file(&part) {
            log::debug!("could not remove {}: {e}", part.display());
        }
    } else {
        log::info!("wrote {}", path.display());
    }
    result
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;

    fn offline() -> RenderConfig {
        RenderConfig {
            fetch_signature: false,
            ..RenderConfig::default()
        }
    }

    #[test]
    fn default_config() {
        let config = RenderConfig::default();
        assert_eq!(config.page, PageSetup::INVOICE);
        assert_eq!(config.signature_timeout, Duration::from_secs(10));
        assert!(config.fetch_signature);
    }

    #[test]
    fn disabled_fetch_skips_signature() {
        let layout = resolve_signature_layout(&Invoice::sample(), &offline());
        assert_eq!(layout, SignatureLayout::WithoutSignature);
    }

    #[test]
    fn layout_is_deterministic() {
        let invoice = Invoice::sample();
        let config = offline();
        let a = layout_invoice(&invoice, &SignatureLayout::WithoutSignature, &config);
        let b = layout_invoice(&invoice, &SignatureLayout::WithoutSignature, &config);
        assert_eq!(a, b);
    }

    #[test]
    fn render_to_vec_is_pdf() {
        let bytes = render_invoice_to_vec(&Invoice::sample(), &offline()).unwrap();
        assert_eq!(&bytes[0..5], b"%PDF-");
    }

    #[test]
    fn layout_config_carries_title() {
        let config = RenderConfig {
            title: "Invoice 1".to_string(),
            ..offline()
        };
        let layout = compute_layout_config(&Invoice::sample(), &config).unwrap();
        assert_eq!(layout.title, "Invoice 1");
        assert_eq!(layout.pages.len(), 1);
    }

    #[test]
    fn file_render_renames_part_file() {
        let dir = std::env::temp_dir().join(format!("ifg-pipeline-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("invoice.pdf");

        render_invoice_file(&Invoice::sample(), &path, &offline()).unwrap();
        assert!(path.exists());
        assert!(!part_path(&path).exists());
        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[0..5], b"%PDF-");

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn file_render_into_missing_dir_fails_cleanly() {
        let path = std::env::temp_dir()
            .join("ifg-no-such-dir")
            .join("nested")
            .join("invoice.pdf");
        let err = render_invoice_file(&Invoice::sample(), &path, &offline()).unwrap_err();
        assert!(matches!(err, RenderError::Io(_)));
        assert!(!part_path(&path).exists());
    }

    #[test]
    fn resolved_signature_is_not_loaded_again() {
        let signature = SignatureLayout::WithSignature(crate::document::ImageBlock {
            src: "data:image/png;base64,AAAA".to_string(),
            width: 50.0,
            height: 50.0,
            align: crate::style::TextAlign::Left,
        });
        // A reference that would fail if it were resolved a second time.
        let invoice = Invoice {
            signature_url: Some("/nonexistent/signature.png".to_string()),
            ..Invoice::sample()
        };
        let config = RenderConfig::default();

        let layout = compute_layout_config_with(&invoice, &signature, &config).unwrap();
        let mut images = 0;
        layout.visit(&mut |b| {
            if b.image.is_some() {
                images += 1;
            }
        });
        assert_eq!(images, 1);

        let mut out = Vec::new();
        render_invoice_with(&invoice, &signature, &mut out, &config).unwrap();
        assert_eq!(&out[0..5], b"%PDF-");
    }
}
