//! Invoice model – the immutable input to the render pipeline.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One invoice, as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub number: u64,
    /// Amount due, shown on the pay button.
    pub price: f64,
    /// Payment URI the pay button links to.
    pub link: String,
    /// Pre-formatted display date. Never parsed.
    pub date: String,
    pub from: PersonInfo,
    pub to: PersonInfo,
    #[serde(default)]
    pub products: Vec<Product>,
    /// Signature image reference: `data:` URI, file path or http(s) URL.
    #[serde(default, alias = "signatureUrl")]
    pub signature_url: Option<String>,
}

/// A billing party. Rendered verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonInfo {
    pub name: String,
    pub address: String,
}

/// One line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub description: String,
    pub rate: f64,
    pub quantity: i64,
}

impl Product {
    /// `rate × quantity`.
    pub fn subtotal(&self) -> f64 {
        self.rate * self.quantity as f64
    }
}

impl Invoice {
    /// Sum of all line subtotals, accumulated in product order.
    pub fn grand_total(&self) -> f64 {
        self.products
            .iter()
            .fold(0.0, |total, product| total + product.subtotal())
    }

    /// Parse an invoice from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// The demonstration invoice rendered by the CLI when no input is given.
    pub fn sample() -> Self {
        let address = "2972 Westheimer Rd. Santa Ana, IIlinois 85486";
        Self {
            number: 7877859,
            price: 885.0,
            link: "https://www.google.com".to_string(),
            date: "Tue 4th Aug, 2020".to_string(),
            from: PersonInfo {
                name: "Leslie Alexander".to_string(),
                address: address.to_string(),
            },
            to: PersonInfo {
                name: "Marvin McKinney".to_string(),
                address: address.to_string(),
            },
            products: vec![
                Product {
                    description: "Dashboard Design".to_string(),
                    rate: 779.58,
                    quantity: 1,
                },
                Product {
                    description: "Logo Design".to_string(),
                    rate: 106.58,
                    quantity: 2,
                },
                Product {
                    description: "Thumbnail Design".to_string(),
                    rate: 22.3,
                    quantity: 1,
                },
            ],
            signature_url: Some("https://i.ibb.co/JqN6cFN/download.png".to_string()),
        }
    }
}

/// Format a monetary value as `$<value>` with exactly two decimals.
///
/// Values that round to zero print as `$0.00`, never with a sign.
pub fn format_amount(value: f64) -> String {
    let cents = (value * 100.0).round();
    if cents == 0.0 {
        return "$0.00".to_string();
    }
    let rounded = cents / 100.0;
    if rounded < 0.0 {
        format!("-${:.2}", -rounded)
    } else {
        format!("${:.2}", rounded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grand_total_of_sample() {
        let total = Invoice::sample().grand_total();
        assert!((total - 1015.04).abs() < 1e-9, "got {total}");
        assert_eq!(format_amount(total), "$1015.04");
    }

    #[test]
    fn subtotal_formatting() {
        let p = Product {
            description: "Logo Design".into(),
            rate: 106.58,
            quantity: 2,
        };
        assert_eq!(format_amount(p.subtotal()), "$213.16");
    }

    #[test]
    fn empty_products_total_zero() {
        let mut invoice = Invoice::sample();
        invoice.products.clear();
        assert_eq!(invoice.grand_total(), 0.0);
        assert_eq!(format_amount(invoice.grand_total()), "$0.00");
    }

    #[test]
    fn negative_amounts_keep_sign_before_symbol() {
        assert_eq!(format_amount(-5.0), "-$5.00");
    }

    #[test]
    fn zero_amounts_are_unsigned() {
        let refund = Product {
            description: "Free sample".into(),
            rate: 0.0,
            quantity: -1,
        };
        assert_eq!(format_amount(refund.subtotal()), "$0.00");
        assert_eq!(format_amount(-0.0), "$0.00");
        assert_eq!(format_amount(-0.004), "$0.00");
        assert_eq!(format_amount(-0.005), "-$0.01");
    }

    #[test]
    fn json_accepts_camel_case_signature() {
        let json = r#"{
            "number": 1, "price": 2.5, "link": "https://pay", "date": "today",
            "from": {"name": "A", "address": "a"},
            "to": {"name": "B", "address": "b"},
            "signatureUrl": "sig.png"
        }"#;
        let invoice = Invoice::from_json(json).unwrap();
        assert!(invoice.products.is_empty());
        assert_eq!(invoice.signature_url.as_deref(), Some("sig.png"));
    }

    #[test]
    fn json_rejects_garbage() {
        assert!(Invoice::from_json("{not json").is_err());
    }
}
