//! Layout builder – turns an [`Invoice`] into the fixed invoice template as
//! an unpositioned [`Document`].
//!
//! Everything here is pure: the signature image is resolved beforehand and
//! arrives as a [`SignatureLayout`], so the same inputs always give the same
//! tree.

use log::debug;

use crate::document::{Block, Cell, Divider, Document, ImageBlock, PageSetup, Paragraph, Table};
use crate::model::{format_amount, Invoice};
use crate::style::{
    bold_text, light_text, Color, TextAlign, TextStyle, VerticalAlign, ACCENT_BLUE, BLACK,
    BOLD_FONT_SIZE, DARK_GRAY, LIGHT_GRAY, RULE_GRAY, TITLE_FONT_SIZE, WHITE,
};

/// Horizontal inset of every section table, on top of the page margins.
pub const SECTION_INSET: f32 = 15.0;
/// Space above the parties and product sections.
pub const SECTION_SPACING: f32 = 50.0;
/// Space above the header divider.
pub const DIVIDER_SPACING: f32 = 20.0;

pub const PRODUCT_COLUMNS: usize = 4;
pub const SIGNATURE_SPAN: usize = 2;
/// Side of the square signature footprint.
pub const SIGNATURE_SIZE: f32 = 50.0;

const PAY_BUTTON_WIDTH: f32 = 100.0;
const PAY_BUTTON_PADDING: f32 = 12.0;

/// Totals-row shape, decided once before the product table is built.
#[derive(Debug, Clone, PartialEq)]
pub enum SignatureLayout {
    /// A 2-column signature image followed by a 2-column total.
    WithSignature(ImageBlock),
    /// A single full-width total.
    WithoutSignature,
}

impl SignatureLayout {
    /// Columns spanned by the total-amount cell.
    pub fn total_span(&self) -> usize {
        match self {
            SignatureLayout::WithSignature(_) => PRODUCT_COLUMNS - SIGNATURE_SPAN,
            SignatureLayout::WithoutSignature => PRODUCT_COLUMNS,
        }
    }
}

/// Build the whole invoice: header, divider, parties, products.
pub fn build_document(
    invoice: &Invoice,
    signature: &SignatureLayout,
    title: &str,
    page: PageSetup,
) -> Document {
    let blocks = vec![
        Block::Table(header_section(invoice, &page)),
        Block::Divider(header_divider()),
        Block::Table(parties_section(invoice)),
        Block::Table(product_table(invoice, signature)),
    ];
    Document {
        title: title.to_string(),
        page,
        blocks,
    }
}

fn inset_table(columns: usize) -> Table {
    Table {
        margin_left: SECTION_INSET,
        margin_right: SECTION_INSET,
        ..Table::new(columns)
    }
}

/// Title, pay button and date.
pub fn header_section(invoice: &Invoice, page: &PageSetup) -> Table {
    let title = Paragraph::new(
        format!("Invoice #{}", invoice.number),
        TextStyle::bold(BLACK)
            .with_size(TITLE_FONT_SIZE)
            .with_vertical_align(VerticalAlign::Top),
    );

    let pay = Paragraph::new(
        format!("Pay {}", format_amount(invoice.price)),
        TextStyle::LIGHT.with_color(WHITE).with_align(TextAlign::Center),
    )
    .linked(invoice.link.clone())
    .boxed(ACCENT_BLUE, PAY_BUTTON_PADDING, PAY_BUTTON_WIDTH, TextAlign::Right);

    let mut table = inset_table(2);
    table.width = Some(page.width - 2.0 * SECTION_INSET - page.margins.left - page.margins.right);
    table.add_cell(Cell::text(title));
    table.add_cell(Cell::text(pay));
    table.add_cell(Cell::text(light_text(&invoice.date)));
    table
}

pub fn header_divider() -> Divider {
    Divider {
        color: RULE_GRAY,
        thickness: 1.0,
        margin_top: DIVIDER_SPACING,
    }
}

/// "From"/"To" labels, names and addresses in two mirrored columns.
pub fn parties_section(invoice: &Invoice) -> Table {
    let mut table = inset_table(2);
    table.margin_top = SECTION_SPACING;

    let cells = [
        light_text("From"),
        light_text("To").aligned(TextAlign::Right),
        bold_text(&invoice.from.name, BLACK).aligned(TextAlign::Left),
        bold_text(&invoice.to.name, BLACK).aligned(TextAlign::Right),
        light_text(&invoice.from.address).aligned(TextAlign::Left),
        light_text(&invoice.to.address).aligned(TextAlign::Right),
    ];
    for paragraph in cells {
        table.add_cell(Cell::text(paragraph));
    }
    table
}

fn product_cell(paragraph: Paragraph) -> Cell {
    Cell::text(paragraph)
        .with_padding_top(15.0)
        .with_padding_bottom(20.0)
        .with_border_bottom(RULE_GRAY, 1.0)
}

fn product_text(value: &str, color: Color, align: TextAlign) -> Cell {
    product_cell(bold_text(value, color).aligned(align))
}

/// Column headings, one row per product, the "Grand Total" label and the
/// totals row.
pub fn product_table(invoice: &Invoice, signature: &SignatureLayout) -> Table {
    let mut table = inset_table(PRODUCT_COLUMNS);
    table.margin_top = SECTION_SPACING;

    table.add_cell(product_text("Description", BLACK, TextAlign::Left));
    table.add_cell(product_text("Rate", BLACK, TextAlign::Center));
    table.add_cell(product_text("QTY", BLACK, TextAlign::Center));
    table.add_cell(product_text("SUBTOTAL", BLACK, TextAlign::Right));

    for product in &invoice.products {
        table.add_cell(product_text(&product.description, DARK_GRAY, TextAlign::Left));
        table.add_cell(product_text(
            &format_amount(product.rate),
            DARK_GRAY,
            TextAlign::Center,
        ));
        table.add_cell(product_text(
            &product.quantity.to_string(),
            DARK_GRAY,
            TextAlign::Center,
        ));
        table.add_cell(product_text(
            &format_amount(product.subtotal()),
            DARK_GRAY,
            TextAlign::Right,
        ));
    }
    debug!(
        "product table: {} rows, signature={}",
        invoice.products.len(),
        matches!(signature, SignatureLayout::WithSignature(_))
    );

    let label = Paragraph::new(
        "Grand Total",
        TextStyle::LIGHT
            .with_size(BOLD_FONT_SIZE)
            .with_color(LIGHT_GRAY)
            .with_align(TextAlign::Right),
    );
    table.add_cell(
        Cell::text(label)
            .spanning(PRODUCT_COLUMNS)
            .with_border_bottom(RULE_GRAY, 2.0)
            .with_padding_top(20.0)
            .with_padding_bottom(20.0),
    );

    if let SignatureLayout::WithSignature(image) = signature {
        table.add_cell(
            Cell::image(image.clone())
                .spanning(SIGNATURE_SPAN)
                .with_padding_top(10.0),
        );
    }

    let total = bold_text(&format_amount(invoice.grand_total()), BLACK).aligned(TextAlign::Right);
    table.add_cell(
        Cell::text(total)
            .spanning(signature.total_span())
            .with_padding_top(10.0)
            .with_vertical_align(VerticalAlign::Middle),
    );
    table
}
