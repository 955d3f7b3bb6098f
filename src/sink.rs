//! Render sink – the one boundary between the layout builder and the PDF
//! backend.
//!
//! A sink accepts page setup and blocks in order and produces the finished
//! bytes on [`DocumentSink::close`]. [`PdfSink`] is the only implementation;
//! it runs flow placement, pagination and encoding in one go at close time.

use std::io::Write;

use crate::document::{Block, Document, Margins, PageSetup};
use crate::error::Result;
use crate::flow::compute_flow;
use crate::fonts::FontMetrics;
use crate::layout_config::LayoutConfig;
use crate::pagination::paginate;
use crate::render::render_pdf;

/// Destination for an unpositioned document.
pub trait DocumentSink {
    fn set_page_size(&mut self, width: f32, height: f32);
    fn set_margins(&mut self, margins: Margins);
    /// Line height as a multiple of the font size.
    fn set_leading(&mut self, leading: f32);
    fn set_title(&mut self, title: &str);
    /// Append a block below everything added so far.
    fn add(&mut self, block: Block);
    /// Finalise the document and write it to `out` in one piece.
    fn close<W: Write>(self, out: W) -> Result<()>
    where
        Self: Sized;
}

/// Sink producing a PDF through taffy placement and printpdf encoding.
#[derive(Debug, Clone)]
pub struct PdfSink {
    document: Document,
    metrics: FontMetrics,
}

impl PdfSink {
    pub fn new() -> Self {
        Self {
            document: Document {
                title: String::new(),
                page: PageSetup::default(),
                blocks: Vec::new(),
            },
            metrics: FontMetrics::HELVETICA,
        }
    }

    /// The document accumulated so far.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Place and paginate the accumulated blocks without encoding.
    pub fn layout_config(&self) -> Result<LayoutConfig> {
        let boxes = compute_flow(&self.document, &self.metrics)?;
        let config = paginate(&boxes, &self.document, &self.metrics);
        log::debug!(
            "laid out {} blocks on {} page(s)",
            self.document.blocks.len(),
            config.pages.len()
        );
        Ok(config)
    }
}

impl Default for PdfSink {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentSink for PdfSink {
    fn set_page_size(&mut self, width: f32, height: f32) {
        self.document.page.width = width;
        self.document.page.height = height;
    }

    fn set_margins(&mut self, margins: Margins) {
        self.document.page.margins = margins;
    }

    fn set_leading(&mut self, leading: f32) {
        self.document.page.leading = leading;
    }

    fn set_title(&mut self, title: &str) {
        self.document.title = title.to_string();
    }

    fn add(&mut self, block: Block) {
        self.document.blocks.push(block);
    }

    fn close<W: Write>(self, mut out: W) -> Result<()> {
        let config = self.layout_config()?;
        let bytes = render_pdf(&config)?;
        out.write_all(&bytes)?;
        out.flush()?;
        log::debug!("wrote {} PDF bytes", bytes.len());
        Ok(())
    }
}
