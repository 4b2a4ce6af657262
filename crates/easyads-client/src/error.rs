// ABOUTME: Typed failures returned by every easyads API call.
// ABOUTME: Carries HTTP status plus the server's detail message, and classifies errors for UI feedback.

use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

/// Message shown when the server gave no usable detail.
pub const GENERIC_ERROR: &str = "An error occurred";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("no details"))]
    Status { status: u16, message: Option<String> },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("could not read {}: {source}", .path.display())]
    Upload {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Broad category of an [`ApiError`], used to pick the UI reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad credentials or a rejected token (401/403).
    Authentication,
    /// The request never got an HTTP answer.
    Transport,
    NotFound,
    /// The server refused the payload (400/422 and other 4xx).
    Validation,
    Server,
    /// The body could not be decoded.
    InvalidResponse,
    /// Failed before anything was sent.
    Local,
}

impl ApiError {
    /// Build a status error from a non-success response body.
    pub fn from_status(status: u16, body: &str) -> Self {
        ApiError::Status {
            status,
            message: server_detail(body),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The server-provided message, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Status { status, .. } => match *status {
                401 | 403 => ErrorKind::Authentication,
                404 => ErrorKind::NotFound,
                500..=599 => ErrorKind::Server,
                _ => ErrorKind::Validation,
            },
            ApiError::Transport(_) => ErrorKind::Transport,
            ApiError::InvalidResponse(_) => ErrorKind::InvalidResponse,
            ApiError::Upload { .. } | ApiError::InvalidRequest(_) => ErrorKind::Local,
        }
    }

    /// Text for an inline error message: the server detail when available,
    /// a description for local failures, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Status { message: Some(m), .. } => m.clone(),
            ApiError::Upload { .. } | ApiError::InvalidRequest(_) => self.to_string(),
            _ => fallback.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::InvalidResponse(e.to_string())
        } else if e.is_builder() {
            ApiError::InvalidRequest(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

/// Extract the `detail` field of an error body. String details are used
/// verbatim; validation lists are joined by their `msg` entries.
pub fn server_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if msgs.is_empty() {
                None
            } else {
                Some(msgs.join("; "))
            }
        }
        _ => None,
    }
}
