use serde::{Deserialize, Serialize};
use std::io;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PhandomError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Unable to start renderer '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Renderer timed out after {0:?}")]
    Timeout(Duration),

    #[error("Renderer exited with code {code:?}: {stderr}")]
    RendererFailed { code: Option<i32>, stderr: String },

    #[error("Renderer produced no output; this is an internal bug, not a markup problem")]
    EmptyOutput,

    #[error("Renderer output is not well-formed XML: {0}")]
    MalformedOutput(#[source] roxmltree::Error),

    #[error("Invalid URI: {0}")]
    InvalidUri(#[from] url::ParseError),

    #[error("Invalid page path: {0}")]
    InvalidPath(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Blocking call made from inside an async runtime")]
    BlockingInRuntime,
}

impl PhandomError {
    pub fn config(message: impl Into<String>) -> Self {
        PhandomError::Config(message.into())
    }

    pub(crate) fn spawn(command: impl Into<String>, source: io::Error) -> Self {
        PhandomError::Spawn {
            command: command.into(),
            source,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            PhandomError::Io(_) => ErrorCategory::Io,
            PhandomError::Spawn { .. } | PhandomError::Timeout(_) => ErrorCategory::Process,
            PhandomError::RendererFailed { .. } => ErrorCategory::Renderer,
            PhandomError::EmptyOutput | PhandomError::MalformedOutput(_) => ErrorCategory::Output,
            PhandomError::InvalidUri(_)
            | PhandomError::InvalidPath(_)
            | PhandomError::Config(_)
            | PhandomError::BlockingInRuntime => ErrorCategory::Config,
        }
    }

    pub fn to_payload(&self) -> ErrorPayload {
        let remediation = match self {
            PhandomError::Io(_) => "Check temp directory permissions and free space.",
            PhandomError::Spawn { source, .. } if source.kind() == io::ErrorKind::NotFound => {
                "Install phantomjs and ensure it is on PATH, or pass --renderer / set PHANDOM_RENDERER."
            }
            PhandomError::Spawn { .. } => "Ensure the renderer binary is executable.",
            PhandomError::Timeout(_) => {
                "Increase --timeout or make sure the page finishes loading without blocking."
            }
            PhandomError::RendererFailed { .. } => {
                "Inspect the renderer stderr above; page scripts that throw fail the render."
            }
            PhandomError::EmptyOutput => {
                "The renderer printed nothing; re-run with --verbose and file an issue if persistent."
            }
            PhandomError::MalformedOutput(_) => {
                "Re-run with --verbose to see the raw renderer output."
            }
            PhandomError::InvalidUri(_) => "Verify URL/format (e.g., https://example.com).",
            PhandomError::InvalidPath(_) => {
                "Verify the file exists; use an absolute path or run from the working directory."
            }
            PhandomError::Config(_) => "Check --config file contents and CLI flags.",
            PhandomError::BlockingInRuntime => {
                "Await `dom()` / `is_installed()` instead of their `_blocking` variants."
            }
        };
        ErrorPayload::new(self.category(), self.to_string(), remediation)
    }
}

pub type Result<T> = std::result::Result<T, PhandomError>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Io,
    Process,
    Renderer,
    Output,
    Config,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub category: ErrorCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl ErrorPayload {
    pub fn new(category: ErrorCategory, message: String, remediation: impl Into<String>) -> Self {
        Self {
            category,
            message,
            remediation: Some(remediation.into()),
        }
    }
}
