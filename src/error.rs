use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Config file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("No project root found (no .claude/ directory in parent paths)")]
    NoProjectRoot,

    #[error("Could not determine the home directory")]
    NoHomeDir,

    #[error("PaddleOCR is not configured. Run 'paddleocr-cli configure' first.")]
    Unconfigured,

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[source] serde_yaml::Error),

    #[error("Invalid JSON response: {0}")]
    InvalidResponse(#[source] serde_json::Error),

    /// Network-level failure: DNS, refused connection, timeout, truncated body.
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("HTTP {status}: {reason}\n{body}")]
    Http {
        status: u16,
        reason: String,
        body: String,
    },

    #[error("API error ({code}): {message}")]
    Api {
        code: i64,
        message: String,
        log_id: Option<String>,
    },

    #[error("Page {page} not found (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }

    /// Log id reported by the server, if the failure carried one.
    pub fn log_id(&self) -> Option<&str> {
        match self {
            Error::Api { log_id, .. } => log_id.as_deref(),
            _ => None,
        }
    }
}

/// Flatten an error and its sources into one line, e.g.
/// "error sending request: client error (Connect): Connection refused".
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
