// Notifier plugin implementations
pub mod discord;
pub mod email;

pub use discord::DiscordNotifier;
pub use email::EmailNotifier;

use std::time::Duration;

use crate::config::{NotificationsConfig, NotifierKind};
use crate::plugins::traits::NotifierPlugin;
use crate::utils::error::Result;

/// Builds the single notifier selected by `notifications.channel`.
pub fn build_notifier(config: &NotificationsConfig) -> Result<Box<dyn NotifierPlugin>> {
    let timeout = Duration::from_secs(config.send_timeout);

    let notifier: Box<dyn NotifierPlugin> = match config.channel {
        NotifierKind::Email => Box::new(EmailNotifier::new(&config.smtp, timeout)?),
        NotifierKind::Discord => Box::new(DiscordNotifier::new(&config.discord, timeout)?),
    };

    tracing::info!("Using {} for reports", notifier.name());
    Ok(notifier)
}
