//! Error taxonomy for a single assessment.

use serde::Serialize;
use thiserror::Error;

pub type AssessResult<T> = Result<T, AssessError>;

/// Caller input rejected before any scan, inference or audit write.
/// Display strings are the user-visible reasons.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("Invalid user input")]
    InvalidField { field: &'static str },

    #[error("Login hour must be between 0 and 23")]
    LoginHourOutOfRange(i64),
}

#[derive(Debug, Error)]
pub enum AssessError {
    #[error(transparent)]
    InvalidInput(#[from] InputError),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("model inference failed: {0}")]
    ModelInference(String),

    /// Label/risk-table drift or unusable artifacts. Not recoverable per request.
    #[error("configuration error: {0}")]
    Configuration(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InputValidation,
    Io,
    ModelInference,
    Configuration,
}

/// Body returned to the caller on a rejected request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub const INTERNAL_ERROR: &str = "Internal error";

impl AssessError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InputValidation,
            Self::Io { .. } => ErrorKind::Io,
            Self::ModelInference(_) => ErrorKind::ModelInference,
            Self::Configuration(_) => ErrorKind::Configuration,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.kind() == ErrorKind::InputValidation
    }

    /// HTTP-equivalent status for whatever transport sits in front of the engine.
    pub fn status_code(&self) -> u16 {
        if self.is_client_error() {
            400
        } else {
            500
        }
    }

    /// Client errors carry their reason; server-side detail (paths, OS errors, model
    /// messages) stays in the log and the caller gets a fixed reason.
    pub fn to_response(&self) -> ErrorResponse {
        let error = if self.is_client_error() {
            self.to_string()
        } else {
            INTERNAL_ERROR.to_string()
        };
        ErrorResponse { error }
    }
}
