use serde::{Deserialize, Serialize};
use std::fmt;

/// A message that does not satisfy the contract.
///
/// `causes` is ordered from the outermost description to the most specific
/// one; diagnostics walk it linearly to find a [`KeywordMismatch`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
    causes: Vec<ValidationCause>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>, causes: Vec<ValidationCause>) -> Self {
        Self {
            message: message.into(),
            causes,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn causes(&self) -> &[ValidationCause] {
        &self.causes
    }

    /// First keyword/constraint mismatch in the cause chain.
    pub fn keyword_mismatch(&self) -> Option<&KeywordMismatch> {
        self.causes.iter().find_map(|cause| match cause {
            ValidationCause::KeywordMismatch(mismatch) => Some(mismatch),
            _ => None,
        })
    }
}

/// Why a message failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationCause {
    #[error("no operation documented for {method} {path}")]
    OperationNotFound { method: String, path: String },
    #[error("status {status} is not documented")]
    StatusNotDocumented { status: u16 },
    #[error("content-type \"{content_type}\" is not documented")]
    UnexpectedContentType { content_type: String },
    #[error("body is required but empty")]
    MissingBody,
    #[error("body is not valid JSON: {message}")]
    BodyNotJson { message: String },
    #[error("schema for {media_type} does not compile: {message}")]
    SchemaCompilation { media_type: String, message: String },
    #[error("body does not match the {media_type} schema ({mismatches} mismatch(es))")]
    BodyMismatch { media_type: String, mismatches: usize },
    #[error(transparent)]
    KeywordMismatch(KeywordMismatch),
}

/// One schema keyword the body violated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordMismatch {
    /// The violated keyword, e.g. `type` or `required`
    pub keyword: String,
    /// Keys and indices leading to the offending value, outermost first
    pub breadcrumb: Vec<String>,
    pub message: String,
}

impl KeywordMismatch {
    pub fn from_schema_error(error: &jsonschema::ValidationError<'_>) -> Self {
        let schema_path = pointer_segments(&error.schema_path.to_string());
        Self {
            keyword: schema_path.last().cloned().unwrap_or_default(),
            breadcrumb: pointer_segments(&error.instance_path.to_string()),
            message: error.to_string(),
        }
    }

    /// `items -> 0 -> id`
    pub fn breadcrumb_chain(&self) -> String {
        self.breadcrumb.join(" -> ")
    }
}

impl fmt::Display for KeywordMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.breadcrumb.is_empty() {
            write!(f, "{} (keyword `{}`)", self.message, self.keyword)
        } else {
            write!(
                f,
                "{} at {} (keyword `{}`)",
                self.message,
                self.breadcrumb_chain(),
                self.keyword
            )
        }
    }
}

impl std::error::Error for KeywordMismatch {}

/// Split a JSON pointer into unescaped segments.
fn pointer_segments(pointer: &str) -> Vec<String> {
    pointer
        .split('/')
        .skip(1)
        .map(|s| s.replace("~1", "/").replace("~0", "~"))
        .collect()
}
