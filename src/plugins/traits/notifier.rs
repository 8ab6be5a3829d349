use async_trait::async_trait;

use crate::models::Report;
use crate::utils::error::Result;

/// Trait for delivering the cycle report (email, Discord, etc.)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotifierPlugin: Send + Sync {
    /// Plugin metadata
    fn name(&self) -> &str;
    fn plugin_type(&self) -> &str;

    /// Transport failures come back as `AppError::Notify`
    async fn send(&self, report: &Report) -> Result<()>;
}
