use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Fetch error for {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Persistence error at {path}: {message}")]
    Persistence { path: String, message: String },

    #[error("Notification error ({channel}): {message}")]
    Notify { channel: String, message: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parsing error: {message}")]
    Parse { message: String },
}

impl AppError {
    pub fn fetch(url: &str, message: impl ToString) -> Self {
        AppError::Fetch {
            url: url.to_string(),
            message: message.to_string(),
        }
    }

    pub fn persistence(path: &std::path::Path, message: impl ToString) -> Self {
        AppError::Persistence {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }

    pub fn notify(channel: &str, message: impl ToString) -> Self {
        AppError::Notify {
            channel: channel.to_string(),
            message: message.to_string(),
        }
    }
}

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
