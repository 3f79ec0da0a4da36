use std::path::PathBuf;

/// Failure to turn a spec document into a [`SpecValidator`](crate::validator::SpecValidator).
///
/// Unlike cache faults these are never swallowed: a spec that does not load
/// cannot be validated against, so the caller has to see it.
#[derive(Debug, thiserror::Error)]
pub enum SpecLoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("failed to parse JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path} is not an OpenAPI 3 document: {reason}")]
    NotOpenApi { path: PathBuf, reason: String },
    #[error("cannot resolve $ref `{reference}` from {path}: {reason}")]
    UnresolvedRef {
        path: PathBuf,
        reference: String,
        reason: String,
    },
}
