use scraper::{ElementRef, Html, Node, Selector};

use crate::config::ScraperConfig;
use crate::models::{Snapshot, UNKNOWN};
use crate::plugins::trackers::normalize_price;
use crate::utils::error::{AppError, Result};

/// Reads the price and stock signals out of a product page.
///
/// Extraction never fails: a missing node yields the `Desconocido` sentinel and
/// an absent normalized price.
#[derive(Debug, Clone)]
pub struct SignalExtractor {
    price_selector: Selector,
    stock_selector: Selector,
    stock_keyword: String,
}

impl SignalExtractor {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        Ok(Self {
            price_selector: parse_selector(&config.price_selector)?,
            stock_selector: parse_selector(&config.stock_element)?,
            stock_keyword: config.stock_keyword.to_lowercase(),
        })
    }

    pub fn extract(&self, markup: &str) -> Snapshot {
        let document = Html::parse_document(markup);

        let price_raw = self
            .find_price_text(&document)
            .unwrap_or_else(|| UNKNOWN.to_string());
        let price = normalize_price(&price_raw);
        let stock = self
            .find_stock_text(&document)
            .unwrap_or_else(|| UNKNOWN.to_string());

        Snapshot {
            price_raw,
            price,
            stock,
        }
    }

    fn find_price_text(&self, document: &Html) -> Option<String> {
        document
            .select(&self.price_selector)
            .next()
            .map(|element| element.text().collect::<String>().trim().to_string())
    }

    fn find_stock_text(&self, document: &Html) -> Option<String> {
        document
            .select(&self.stock_selector)
            .filter_map(single_string)
            .find(|text| text.to_lowercase().contains(&self.stock_keyword))
            .map(|text| text.trim().to_string())
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| AppError::Parse {
        message: format!("Invalid CSS selector '{}': {:?}", selector, e),
    })
}

/// Text of an element whose content is a single string, following chains of
/// single-child elements (`<span><b>En stock</b></span>`). Elements with mixed
/// or multiple children have no single string.
fn single_string(element: ElementRef<'_>) -> Option<String> {
    let mut children = element.children();
    let only = children.next()?;
    if children.next().is_some() {
        return None;
    }

    match only.value() {
        Node::Text(text) => {
            let content: &str = text;
            Some(content.to_string())
        }
        Node::Element(_) => ElementRef::wrap(only).and_then(single_string),
        _ => None,
    }
}
