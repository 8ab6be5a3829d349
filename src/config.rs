use chrono::NaiveTime;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use url::Url;

use crate::report::ReportLanguage;

/// Product pages watched when nothing else is configured.
const DEFAULT_PRODUCTS: [&str; 2] = [
    "https://nissei.com/py/impresora-3d-bambu-lab-a1-combo-ams-lite-multi-color-500mm-s",
    "https://nissei.com/py/xiaomi-redmi-note-14-5g-dual",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub products: Vec<String>,
    pub scraper: ScraperConfig,
    pub scheduler: SchedulerConfig,
    pub storage: StorageConfig,
    pub notifications: NotificationsConfig,
    pub report: ReportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    pub request_timeout: u64,
    pub user_agent: String,
    pub price_selector: String,
    pub stock_element: String,
    pub stock_keyword: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Local wall-clock time of the daily run, `HH:MM`.
    pub trigger_time: String,
    pub tick_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub state_file: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotifierKind {
    Email,
    Discord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    pub channel: NotifierKind,
    pub send_timeout: u64,
    pub smtp: SmtpConfig,
    pub discord: DiscordConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from_address: Option<String>,
    pub from_name: String,
    pub to_address: Option<String>,
    pub use_tls: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    pub webhook_url: Option<String>,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub language: ReportLanguage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            products: DEFAULT_PRODUCTS.iter().map(|url| url.to_string()).collect(),
            scraper: ScraperConfig {
                request_timeout: 10,
                user_agent: concat!("DailyPriceWatch/", env!("CARGO_PKG_VERSION")).to_string(),
                price_selector: "span.price".to_string(),
                stock_element: "span".to_string(),
                stock_keyword: "stock".to_string(),
            },
            scheduler: SchedulerConfig {
                trigger_time: "12:00".to_string(),
                tick_interval_secs: 60,
            },
            storage: StorageConfig {
                data_dir: PathBuf::from("data"),
                state_file: "productos.json".to_string(),
            },
            notifications: NotificationsConfig {
                channel: NotifierKind::Email,
                send_timeout: 30,
                smtp: SmtpConfig {
                    host: "smtp.gmail.com".to_string(),
                    port: 587,
                    username: None,
                    password: None,
                    from_address: None,
                    from_name: "Daily Price Watch".to_string(),
                    to_address: None,
                    use_tls: true,
                },
                discord: DiscordConfig {
                    webhook_url: None,
                    username: "Daily Price Watch".to_string(),
                },
            },
            report: ReportConfig {
                language: ReportLanguage::Es,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file: "price_tracker.log".to_string(),
            },
        }
    }
}

impl AppConfig {
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        Self::load_with(config_dir, environment(), |key| env::var(key).ok())
    }

    /// `var` resolves `RUN_MODE` and the legacy `EMAIL_*` variables.
    fn load_with(
        config_dir: &Path,
        environment: Environment,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let run_mode = var("RUN_MODE").unwrap_or_else(|| "development".into());

        let s = Config::builder()
            // Start with built-in defaults
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::from(config_dir.join("default")).required(false))
            // Add environment-specific config
            .add_source(File::from(config_dir.join(&run_mode)).required(false))
            // Add local config (ignored by git)
            .add_source(File::from(config_dir.join("local")).required(false))
            .add_source(environment)
            .build()?;

        let mut config: AppConfig = s.try_deserialize()?;

        // Variable names used by earlier deployments
        config.apply_legacy_email(var);

        config.validate()?;
        Ok(config)
    }

    /// Fills SMTP fields still unset after the layered sources.
    fn apply_legacy_email(&mut self, var: impl Fn(&str) -> Option<String>) {
        let smtp = &mut self.notifications.smtp;
        if let Some(sender) = var("EMAIL_SENDER") {
            smtp.username.get_or_insert_with(|| sender.clone());
            smtp.from_address.get_or_insert(sender);
        }
        if let Some(password) = var("EMAIL_PASSWORD") {
            smtp.password.get_or_insert(password);
        }
        if let Some(receiver) = var("EMAIL_RECEIVER") {
            smtp.to_address.get_or_insert(receiver);
        }
    }

    pub fn state_path(&self) -> PathBuf {
        self.storage.data_dir.join(&self.storage.state_file)
    }

    pub fn trigger_time(&self) -> Result<NaiveTime, ConfigError> {
        parse_trigger_time(&self.scheduler.trigger_time)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate products
        if self.products.is_empty() {
            return Err(ConfigError::Message("At least one product URL must be configured".into()));
        }

        for product in &self.products {
            match Url::parse(product) {
                Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
                _ => {
                    return Err(ConfigError::Message(format!("Invalid product URL: {}", product)));
                }
            }
        }

        // Validate scraper configuration
        if self.scraper.request_timeout == 0 {
            return Err(ConfigError::Message("Scraper request_timeout must be greater than 0".into()));
        }

        for selector in [&self.scraper.price_selector, &self.scraper.stock_element] {
            if scraper::Selector::parse(selector).is_err() {
                return Err(ConfigError::Message(format!("Invalid CSS selector: {}", selector)));
            }
        }

        if self.scraper.stock_keyword.trim().is_empty() {
            return Err(ConfigError::Message("Scraper stock_keyword must not be empty".into()));
        }

        // Validate scheduler configuration
        self.trigger_time()?;

        if self.scheduler.tick_interval_secs == 0 {
            return Err(ConfigError::Message("Scheduler tick_interval_secs must be greater than 0".into()));
        }

        // Validate storage configuration
        if self.storage.state_file.trim().is_empty() {
            return Err(ConfigError::Message("Storage state_file must not be empty".into()));
        }

        // Validate notification configuration
        if self.notifications.send_timeout == 0 {
            return Err(ConfigError::Message("Notification send_timeout must be greater than 0".into()));
        }

        match self.notifications.channel {
            NotifierKind::Email => self.validate_smtp()?,
            NotifierKind::Discord => self.validate_discord()?,
        }

        Ok(())
    }

    fn validate_smtp(&self) -> Result<(), ConfigError> {
        let smtp = &self.notifications.smtp;
        if smtp.port == 0 {
            return Err(ConfigError::Message("SMTP port must be greater than 0".into()));
        }

        let required = [
            ("username", &smtp.username),
            ("password", &smtp.password),
            ("from_address", &smtp.from_address),
            ("to_address", &smtp.to_address),
        ];
        for (name, value) in required {
            if value.as_deref().is_none_or(|v| v.trim().is_empty()) {
                return Err(ConfigError::Message(format!("SMTP {} is required for email notifications", name)));
            }
        }

        Ok(())
    }

    fn validate_discord(&self) -> Result<(), ConfigError> {
        let webhook_url = self.notifications.discord.webhook_url.as_deref().ok_or_else(|| {
            ConfigError::Message("Discord webhook_url is required for discord notifications".into())
        })?;

        match Url::parse(webhook_url) {
            Ok(url) if url.scheme() == "https" || url.scheme() == "http" => Ok(()),
            _ => Err(ConfigError::Message("Invalid Discord webhook URL".into())),
        }
    }
}

/// `WATCHER__SECTION__KEY` variables; `WATCHER__PRODUCTS` is a comma-separated list.
fn environment() -> Environment {
    Environment::with_prefix("WATCHER")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("products")
}

pub fn parse_trigger_time(value: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| ConfigError::Message(format!("Invalid trigger_time '{}', expected HH:MM", value)))
}
