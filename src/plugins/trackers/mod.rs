// Signal interpreters
pub mod price;
pub mod stock;

pub use price::{format_price, normalize_price};
pub use stock::StockStatus;
