use std::fmt;

use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("malformed history payload: {0}")]
    MalformedHistory(String),

    #[error("operation requires at least one selected row")]
    EmptySelection,

    #[error("selected rows carry no dated history points")]
    NoHistory,

    #[error("row index {index} is out of range for {len} loaded rows")]
    RowOutOfRange { index: usize, len: usize },

    #[error("failed to fetch `{url}`: {kind}")]
    Fetch { url: String, kind: FetchErrorKind },

    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl ChartError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedHistory(message.into())
    }

    pub(crate) fn fetch(url: &str, kind: FetchErrorKind) -> Self {
        Self::Fetch {
            url: url.to_owned(),
            kind,
        }
    }
}

/// Failure class of one image fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchErrorKind {
    Timeout,
    Status(u16),
    Network(String),
    Io(String),
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => f.write_str("request timed out"),
            Self::Status(code) => write!(f, "server answered with status {code}"),
            Self::Network(reason) => write!(f, "network error: {reason}"),
            Self::Io(reason) => write!(f, "i/o error: {reason}"),
        }
    }
}
