use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("parse error: {0}")]
    ParseError(#[from] bytes_parser::Error),
    #[error("unknown status variable: {0:#04x}")]
    UnknownStatusVariable(u8),
    #[error("malformed decimal: {0}")]
    MalformedDecimal(String),
    #[error("utf8 string error: {0}")]
    Utf8StringError(#[from] std::string::FromUtf8Error),
    #[error("invalid server version: {0}")]
    InvalidServerVersion(String),
    #[error("event size mismatch: expected={expected}, consumed={consumed}")]
    EventSizeMismatch { expected: usize, consumed: usize },
    #[error("invalid event length: {0}")]
    InvalidEventLength(u32),
    #[error("config error: {0}")]
    ConfigError(#[from] toml::de::Error),
    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("binlog event error: {0}")]
    BinlogEventError(String),
}

impl Error {
    /// whether the error is caused by reading past the end of input
    ///
    /// the caller should treat the stream as desynchronized
    pub fn is_underrun(&self) -> bool {
        matches!(
            self,
            Error::ParseError(bytes_parser::Error::InputIncomplete(_))
        )
    }
}
