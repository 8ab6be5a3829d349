pub mod http_tests;
pub mod scheduler_tests;

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use daily_price_watch::extractor::SignalExtractor;
use daily_price_watch::models::Report;
use daily_price_watch::plugins::NotifierPlugin;
use daily_price_watch::report::ReportBuilder;
use daily_price_watch::scraper::PageFetcher;
use daily_price_watch::state_store::JsonStateStore;
use daily_price_watch::{AppConfig, AppError, ProductManager, Result};

pub const URL_A: &str = "https://nissei.com/py/producto-a";
pub const URL_B: &str = "https://nissei.com/py/producto-b";

pub fn product_page(price: &str, stock: &str) -> String {
    format!(
        r#"<html><body>
            <h1>Producto</h1>
            <span class="price">{price}</span>
            <span class="stock-label">{stock}</span>
        </body></html>"#
    )
}

/// Serves canned pages per URL; a missing URL behaves like a network failure.
#[derive(Clone, Default)]
pub struct MapFetcher {
    pages: Arc<Mutex<HashMap<String, String>>>,
}

impl MapFetcher {
    pub fn set_page(&self, url: &str, markup: String) {
        self.pages.lock().unwrap().insert(url.to_string(), markup);
    }

    pub fn remove_page(&self, url: &str) {
        self.pages.lock().unwrap().remove(url);
    }
}

#[async_trait]
impl PageFetcher for MapFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.pages
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::fetch(url, "connection refused"))
    }
}

/// Keeps every report it is asked to send.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Report>>>,
}

impl RecordingNotifier {
    pub fn reports(&self) -> Vec<Report> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotifierPlugin for RecordingNotifier {
    fn name(&self) -> &str {
        "Recording Notifier"
    }

    fn plugin_type(&self) -> &str {
        "recording"
    }

    async fn send(&self, report: &Report) -> Result<()> {
        self.sent.lock().unwrap().push(report.clone());
        Ok(())
    }
}

pub fn create_test_manager(
    products: &[&str],
    fetcher: &MapFetcher,
    state_path: &Path,
    notifier: &RecordingNotifier,
) -> ProductManager {
    let config = AppConfig::default();
    ProductManager::new(
        products.iter().map(|p| p.to_string()).collect(),
        Box::new(fetcher.clone()),
        SignalExtractor::new(&config.scraper).expect("default selectors parse"),
        Box::new(JsonStateStore::new(state_path)),
        ReportBuilder::default(),
        Box::new(notifier.clone()),
        Duration::from_secs(5),
    )
}
