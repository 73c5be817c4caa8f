use thiserror::Error;

/// A company page could not be retrieved. Recovered per target, never fatal.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchFailure {
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("request timed out: {url}")]
    Timeout { url: String },

    #[error("transport error for {url}: {message}")]
    Transport { url: String, message: String },
}

impl FetchFailure {
    /// Short label used in logs and run summaries.
    pub fn category(&self) -> &'static str {
        match self {
            FetchFailure::Status { .. } => "status",
            FetchFailure::Timeout { .. } => "timeout",
            FetchFailure::Transport { .. } => "transport",
        }
    }
}

/// A salary cell carried no usable figure. The observation is dropped and counted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseFailure {
    #[error("empty salary text")]
    Empty,

    #[error("no numeric token in {0:?}")]
    NoNumber(String),

    #[error("non-positive salary figure in {0:?}")]
    NonPositive(String),

    #[error("figure in {0:?} is too small to derive distinct bounds")]
    BelowPrecision(String),
}

/// Startup problems. These abort the run before the first request.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("company {0:?} is not in the directory")]
    UnknownCompany(String),

    #[error("company selection is empty")]
    EmptySelection,

    #[error("unusable catalog {path}: {reason}")]
    Catalog { path: String, reason: String },

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}
