pub mod report;
pub mod snapshot;

// Re-exports for convenience
pub use report::*;
pub use snapshot::*;
