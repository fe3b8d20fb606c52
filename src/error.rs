use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoardsubError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Board API error: {0}")]
    Board(String),

    #[error("Required list '{0}' not found on board")]
    MissingList(String),

    #[error("Transcription error: {0}")]
    Transcriber(String),

    #[error("Media processing error: {0}")]
    Media(String),

    #[error("Non-negative timestamp expected, got {0}")]
    NegativeTimestamp(f64),

    #[error("Timestamp too large to format: {0}")]
    TimestampOutOfRange(f64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),
}

pub type Result<T> = std::result::Result<T, BoardsubError>;
