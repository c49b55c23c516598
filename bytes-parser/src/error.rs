use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("incomplete input: {0:?}")]
    InputIncomplete(Needed),
    #[error("invalid rewind: requested={requested}, consumed={consumed}")]
    InvalidRewind { requested: usize, consumed: usize },
    #[error("constraint error: {0}")]
    ConstraintError(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Needed {
    Unknown,
    Size(usize),
}
