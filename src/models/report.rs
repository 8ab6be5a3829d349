use serde::{Deserialize, Serialize};

/// Outcome of checking one product during a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleResult {
    pub url: String,
    pub price_raw: String,
    pub stock: String,
    pub changed: bool,
}

/// Consolidated message sent once per cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub subject: String,
    pub body: String,
}
