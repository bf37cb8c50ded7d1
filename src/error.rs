use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CorpusError>;

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("OCR invocation failed: {message}")]
    Invocation {
        message: String,
        /// Captured stderr of the OCR process, empty if it never started
        stderr: String,
    },

    #[error("OCR artifact not found: {}", .0.display())]
    ArtifactNotFound(PathBuf),

    #[error("Schema violation at {}: {message}", location(.pointer))]
    Schema { pointer: String, message: String },

    #[error("Malformed JSON: {0}")]
    MalformedJson(#[source] serde_json::Error),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize corpus: {0}")]
    Serialization(#[source] serde_json::Error),
}

/// The empty JSON Pointer names the whole document
fn location(pointer: &str) -> &str {
    if pointer.is_empty() {
        "document root"
    } else {
        pointer
    }
}

/// Machine-readable rendering of a failure, written by the CLI
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl CorpusError {
    pub fn invocation(message: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::Invocation {
            message: message.into(),
            stderr: stderr.into(),
        }
    }

    pub fn schema(pointer: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            pointer: pointer.into(),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            CorpusError::Invocation { .. } => "INVOCATION_ERROR",
            CorpusError::ArtifactNotFound(_) => "ARTIFACT_NOT_FOUND",
            CorpusError::Schema { .. } => "SCHEMA_ERROR",
            CorpusError::MalformedJson(_) => "MALFORMED_JSON",
            CorpusError::Io { .. } => "IO_ERROR",
            CorpusError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Process exit status used by the CLI for this kind of failure
    pub fn exit_code(&self) -> u8 {
        match self {
            CorpusError::Invocation { .. } => 2,
            CorpusError::ArtifactNotFound(_) => 3,
            CorpusError::Schema { .. } => 4,
            CorpusError::MalformedJson(_) => 5,
            CorpusError::Io { .. } => 6,
            CorpusError::Serialization(_) => 7,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        let mut error = self.to_string();
        if let CorpusError::Invocation { stderr, .. } = self {
            let stderr = stderr.trim();
            if !stderr.is_empty() {
                error.push_str(": ");
                error.push_str(stderr);
            }
        }

        ErrorResponse {
            error,
            code: self.code().to_string(),
        }
    }
}
