use thiserror::Error;

#[derive(Debug, Error)]
pub enum BillDroidError {
    #[error("Device unreachable: {0}")]
    DeviceUnreachable(String),

    /// The pattern did not match the current dump. Polling callers treat this
    /// as "not yet", everyone else as fatal.
    #[error("No match on screen for pattern '{pattern}'")]
    NotFound { pattern: String },

    #[error("Malformed coordinate token: {0}")]
    MalformedToken(String),

    #[error("Reached max retry count of {retries} waiting for '{expected}'")]
    Timeout { expected: String, retries: u32 },

    #[error("Coordinate from dump #{generation} used after the screen was re-captured")]
    StaleCoordinate { generation: u64 },

    #[error("Invoice provider error: {0}")]
    Provider(String),

    #[error("Invalid invoice: {0}")]
    InvalidInvoice(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid pattern '{name}': {reason}")]
    InvalidPattern { name: String, reason: String },

    #[error("Invoice due {due} is before {today}; refusing to schedule")]
    InvoiceOverdue { due: String, today: String },

    #[error("App {package} did not reach the foreground after {retries} retries")]
    AppNotStarted { package: String, retries: u32 },

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type BillDroidResult<T> = Result<T, BillDroidError>;
