//! invoice-forge – command-line invoice → PDF renderer.
//!
//! Usage:
//!   invoice-forge [invoice.json] [-o invoice.pdf] [--title "Invoice"]
//!                 [--timeout SECS] [--no-signature] [--layout-json layout.json]
//!
//! Without an input file the built-in sample invoice is rendered.

use std::{fs, path::PathBuf, process, time::Duration};

use clap::Parser;

use invoice_forge::pipeline::{
    compute_layout_config_with, render_invoice_file_with, resolve_signature_layout, RenderConfig,
};
use invoice_forge::Invoice;

#[derive(Parser)]
#[command(name = "invoice-forge", version, about = "Render an invoice to a fixed-layout PDF")]
struct Cli {
    /// Invoice JSON file (renders the sample invoice when omitted)
    input: Option<PathBuf>,

    /// Output PDF path
    #[arg(short, long, default_value = "invoice.pdf")]
    output: PathBuf,

    /// Document title in PDF metadata
    #[arg(short, long)]
    title: Option<String>,

    /// Signature download timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Ignore the invoice's signature reference
    #[arg(long)]
    no_signature: bool,

    /// Also write the positioned layout as JSON to this path
    #[arg(long)]
    layout_json: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let invoice = match &cli.input {
        Some(path) => {
            let json = match fs::read_to_string(path) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Error reading '{}': {e}", path.display());
                    process::exit(1);
                }
            };
            match Invoice::from_json(&json) {
                Ok(invoice) => invoice,
                Err(e) => {
                    eprintln!("Error parsing '{}': {e}", path.display());
                    process::exit(1);
                }
            }
        }
        None => Invoice::sample(),
    };

    let config = RenderConfig {
        title: cli
            .title
            .unwrap_or_else(|| format!("Invoice #{}", invoice.number)),
        signature_timeout: Duration::from_secs(cli.timeout),
        fetch_signature: !cli.no_signature,
        ..RenderConfig::default()
    };

    if let Some(parent) = cli.output.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = fs::create_dir_all(parent) {
                eprintln!("Error creating output directory: {e}");
                process::exit(1);
            }
        }
    }

    // Resolved once; the PDF and the layout JSON share it.
    let signature = resolve_signature_layout(&invoice, &config);

    if let Err(e) = render_invoice_file_with(&invoice, &signature, &cli.output, &config) {
        eprintln!("Error rendering invoice: {e}");
        process::exit(1);
    }
    eprintln!("Wrote '{}'", cli.output.display());

    if let Some(layout_path) = &cli.layout_json {
        let layout = match compute_layout_config_with(&invoice, &signature, &config) {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Error computing layout: {e}");
                process::exit(1);
            }
        };
        if let Err(e) = fs::write(layout_path, layout.to_json()) {
            eprintln!("Error writing '{}': {e}", layout_path.display());
            process::exit(1);
        }
        let pages = layout.pages.len();
        eprintln!(
            "Wrote '{}' ({} page{})",
            layout_path.display(),
            pages,
            if pages == 1 { "" } else { "s" }
        );
    }
}
