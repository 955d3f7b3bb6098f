//! # invoice-forge – fixed-layout invoice → PDF renderer
//!
//! An [`Invoice`] is turned into a single-template PDF in a few stages:
//!
//! 1. **Signature** – resolve the optional signature image up front
//!    ([`signature`])
//! 2. **Layout** – build the unpositioned invoice document from style
//!    presets ([`layout`], [`document`], [`style`])
//! 3. **Flow** – place blocks with Taffy flexbox ([`flow`])
//! 4. **Paginate** – convert to page-absolute boxes ([`pagination`],
//!    [`layout_config`])
//! 5. **Render** – emit PDF bytes via printpdf ([`render`])
//!
//! Stages 3–5 sit behind the [`DocumentSink`] trait ([`sink`]); the
//! [`pipeline`] module wires everything to an output writer.
//! A C-compatible FFI surface is exposed via the [`ffi`] module.

pub mod document;
pub mod error;
pub mod ffi;
pub mod flow;
pub mod fonts;
pub mod layout;
pub mod layout_config;
pub mod model;
pub mod pagination;
pub mod pipeline;
pub mod render;
pub mod signature;
pub mod sink;
pub mod style;

// Re-exports for convenience
pub use error::{RenderError, Result, SignatureError};
pub use layout::SignatureLayout;
pub use model::{format_amount, Invoice, PersonInfo, Product};
pub use pipeline::{
    compute_layout_config, layout_invoice, render_invoice, render_invoice_file,
    render_invoice_to_vec, render_invoice_with, RenderConfig,
};
pub use sink::{DocumentSink, PdfSink};
