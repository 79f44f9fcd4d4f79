//! Error types for fetching pages and writing output files

use std::path::PathBuf;

/// Longest response body kept in an error (in chars)
const BODY_SNIPPET_CHARS: usize = 2048;

/// Failure while fetching one page from a remote source.
///
/// Any variant aborts the task that issued the request; callers never
/// retry and never keep records accumulated before the failure.
#[derive(Debug)]
pub enum FetchError {
    /// Transport failure, or a response with a non-2xx status
    Http {
        status: Option<u16>,
        message: String,
        /// Response body, when the server sent one
        body: Option<String>,
    },
    /// 2xx response whose body is not a valid page
    Decode(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http {
                status: Some(s),
                message,
                ..
            } => write!(f, "HTTP {s}: {message}")?,
            Self::Http {
                status: None,
                message,
                ..
            } => write!(f, "HTTP error: {message}")?,
            Self::Decode(message) => return write!(f, "invalid response: {message}"),
        }
        if let Self::Http {
            body: Some(body), ..
        } = self
        {
            write!(f, " (body: {body})")?;
        }
        Ok(())
    }
}

impl std::error::Error for FetchError {}

impl FetchError {
    /// Create a transport error from reqwest, dropping the URL from the message
    pub fn from_reqwest(e: reqwest::Error) -> Self {
        let status = e.status().map(|s| s.as_u16());
        Self::Http {
            status,
            message: e.without_url().to_string(),
            body: None,
        }
    }

    /// Create an error for a non-2xx response
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let body = body.trim();
        Self::Http {
            status: Some(status.as_u16()),
            message: status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string(),
            body: (!body.is_empty()).then(|| snippet(body)),
        }
    }

    /// HTTP status code, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => *status,
            Self::Decode(_) => None,
        }
    }
}

fn snippet(body: &str) -> String {
    match body.char_indices().nth(BODY_SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

/// Failure while writing an output file
#[derive(Debug)]
pub enum WriteError {
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for WriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreateDir { path, source } => {
                write!(f, "cannot create directory {}: {source}", path.display())
            }
            Self::Serialize { path, source } => {
                write!(f, "cannot serialize {}: {source}", path.display())
            }
            Self::Write { path, source } => write!(f, "cannot write {}: {source}", path.display()),
        }
    }
}

impl std::error::Error for WriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } | Self::Write { source, .. } => Some(source),
            Self::Serialize { source, .. } => Some(source),
        }
    }
}
