pub mod change_detector;
pub mod cli;
pub mod config;
pub mod extractor;
pub mod logging;
pub mod models;
pub mod plugins;
pub mod product_manager;
pub mod report;
pub mod scheduler;
pub mod scraper;
pub mod state_store;
pub mod utils;

// Re-export commonly used types
pub use config::AppConfig;
pub use product_manager::{CycleSummary, ProductManager};
pub use scheduler::{CycleStatus, ProductScheduler};
pub use utils::error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;
