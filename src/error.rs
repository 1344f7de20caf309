use thiserror::Error;

/// Failure of a single GET against the API. The `Display` text is what ends
/// up inside the alert node of the panel whose fetch failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Network request failed")]
    Network(String),

    #[error("Network error: {code} - {text}")]
    Status { code: u16, text: String },

    #[error("Invalid response: {0}")]
    Decode(String),
}

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not open {url}: {reason}")]
    Browser { url: String, reason: String },
}

pub type Result<T> = std::result::Result<T, RosterError>;
