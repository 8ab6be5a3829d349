use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::change_detector;
use crate::config::AppConfig;
use crate::extractor::SignalExtractor;
use crate::models::{CycleResult, PersistedState, Report};
use crate::plugins::build_notifier;
use crate::plugins::trackers::{format_price, StockStatus};
use crate::plugins::traits::NotifierPlugin;
use crate::report::ReportBuilder;
use crate::scraper::{PageFetcher, WebScraper};
use crate::state_store::{JsonStateStore, StateStore};
use crate::utils::error::{AppError, Result};

/// What one full cycle did.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleSummary {
    pub cycle_id: Uuid,
    pub products_checked: usize,
    pub products_failed: usize,
    pub changes_detected: usize,
    pub results: Vec<CycleResult>,
    pub report: Report,
    pub persisted: bool,
    pub notified: bool,
    pub total_time_ms: u64,
}

/// Runs the fetch, extract, detect, persist, report, notify pipeline over the
/// configured products.
pub struct ProductManager {
    products: Vec<String>,
    fetcher: Box<dyn PageFetcher>,
    extractor: SignalExtractor,
    store: Box<dyn StateStore>,
    report_builder: ReportBuilder,
    notifier: Box<dyn NotifierPlugin>,
    send_timeout: Duration,
}

impl ProductManager {
    pub fn new(
        products: Vec<String>,
        fetcher: Box<dyn PageFetcher>,
        extractor: SignalExtractor,
        store: Box<dyn StateStore>,
        report_builder: ReportBuilder,
        notifier: Box<dyn NotifierPlugin>,
        send_timeout: Duration,
    ) -> Self {
        Self {
            products,
            fetcher,
            extractor,
            store,
            report_builder,
            notifier,
            send_timeout,
        }
    }

    /// Wires the HTTP fetcher, JSON state file and configured notifier.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self::new(
            config.products.clone(),
            Box::new(WebScraper::new(&config.scraper)?),
            SignalExtractor::new(&config.scraper)?,
            Box::new(JsonStateStore::new(config.state_path())),
            ReportBuilder::new(config.report.language),
            build_notifier(&config.notifications)?,
            Duration::from_secs(config.notifications.send_timeout),
        ))
    }

    /// One full cycle.
    ///
    /// A product whose page cannot be fetched is skipped and keeps its stored
    /// value. A failed save is logged and the report is still sent. Only a
    /// failure to load the prior state aborts the cycle.
    pub async fn run_cycle(&self) -> Result<CycleSummary> {
        let cycle_id = Uuid::new_v4();
        let span = tracing::info_span!("cycle", id = %cycle_id);
        self.run_cycle_inner(cycle_id).instrument(span).await
    }

    async fn run_cycle_inner(&self, cycle_id: Uuid) -> Result<CycleSummary> {
        let start_time = Instant::now();
        tracing::info!("Starting check of {} products", self.products.len());

        let mut state = self.store.load().await?;
        let (results, products_failed) = self.check_products(&mut state).await;

        let persisted = match self.store.save(&state).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Failed to save product state: {}", e);
                false
            }
        };

        let report = self.report_builder.build(&results);
        let notified = self.notify(&report).await;

        let changes_detected = results.iter().filter(|r| r.changed).count();
        let summary = CycleSummary {
            cycle_id,
            products_checked: results.len(),
            products_failed,
            changes_detected,
            results,
            report,
            persisted,
            notified,
            total_time_ms: start_time.elapsed().as_millis() as u64,
        };

        tracing::info!(
            checked = summary.products_checked,
            failed = summary.products_failed,
            changes = summary.changes_detected,
            persisted = summary.persisted,
            notified = summary.notified,
            "Cycle finished in {} ms",
            summary.total_time_ms
        );

        Ok(summary)
    }

    /// Checks products one at a time, in configuration order.
    async fn check_products(&self, state: &mut PersistedState) -> (Vec<CycleResult>, usize) {
        let mut results = Vec::with_capacity(self.products.len());
        let mut failed = 0;

        for url in &self.products {
            tracing::info!("Checking product: {}", url);

            let markup = match self.fetcher.fetch(url).await {
                Ok(markup) => markup,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", url, e);
                    failed += 1;
                    continue;
                }
            };

            let snapshot = self.extractor.extract(&markup);
            let prior = state.get(url);
            let changed = change_detector::detect(prior, &snapshot);

            if changed {
                let previous_price = prior
                    .and_then(|p| p.price)
                    .map(format_price)
                    .unwrap_or_else(|| "-".to_string());
                tracing::info!(
                    stock_status = StockStatus::classify(&snapshot.stock).as_str(),
                    "Change detected in {} | Price: {} (was {}) | Stock: {}",
                    url,
                    snapshot.price_raw,
                    previous_price,
                    snapshot.stock
                );
            } else {
                tracing::debug!("No change for {}", url);
            }

            state.record(url, &snapshot);
            results.push(CycleResult {
                url: url.clone(),
                price_raw: snapshot.price_raw,
                stock: snapshot.stock,
                changed,
            });
        }

        (results, failed)
    }

    async fn notify(&self, report: &Report) -> bool {
        let outcome = match tokio::time::timeout(self.send_timeout, self.notifier.send(report)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(AppError::notify(
                self.notifier.plugin_type(),
                format!("send timed out after {}s", self.send_timeout.as_secs()),
            )),
        };

        match outcome {
            Ok(()) => {
                tracing::info!("Report sent via {}: {}", self.notifier.plugin_type(), report.subject);
                true
            }
            Err(e) => {
                tracing::error!("Failed to send report: {}", e);
                false
            }
        }
    }
}
