use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Usage error: {0}")]
    Usage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("URL parsing error: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Filesystem error on {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The store answered with a non-success status.
    #[error("etcd returned {status}: {message}{}", etcd_detail(.code, .cause))]
    Etcd {
        status: StatusCode,
        code: Option<u64>,
        message: String,
        cause: Option<String>,
    },
}

impl AppError {
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Filesystem {
            path: path.into(),
            source,
        }
    }
}

fn etcd_detail(code: &Option<u64>, cause: &Option<String>) -> String {
    match (code, cause) {
        (Some(code), Some(cause)) => format!(" (code {}, cause {})", code, cause),
        (Some(code), None) => format!(" (code {})", code),
        (None, Some(cause)) => format!(" (cause {})", cause),
        (None, None) => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
