use serde::{Deserialize, Serialize};

use crate::models::UNKNOWN;

/// Coarse reading of a stock label, used for log output.
///
/// Change detection never looks at this: two different labels that both read as
/// `InStock` still count as a change.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StockStatus {
    InStock,
    OutOfStock,
    Unknown,
}

const OUT_OF_STOCK_MARKERS: [&str; 6] = [
    "sin stock",
    "agotado",
    "no disponible",
    "out of stock",
    "sold out",
    "unavailable",
];

impl StockStatus {
    pub fn classify(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() || text == UNKNOWN {
            return StockStatus::Unknown;
        }

        let lower = text.to_lowercase();
        if OUT_OF_STOCK_MARKERS.iter().any(|marker| lower.contains(marker)) {
            StockStatus::OutOfStock
        } else if lower.contains("stock") || lower.contains("disponible") || lower.contains("available") {
            StockStatus::InStock
        } else {
            StockStatus::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::InStock => "in_stock",
            StockStatus::OutOfStock => "out_of_stock",
            StockStatus::Unknown => "unknown",
        }
    }
}
