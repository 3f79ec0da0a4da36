//! # Validator Module
//!
//! [`SpecValidator`] is the compiled form of one OpenAPI document: every
//! operation's request and response body schemas, `$ref`-expanded and
//! normalized to JSON Schema. It is the value the spec cache persists, so it
//! serializes to plain data; compiled schemas and the template router are
//! rebuilt lazily after a load.
//!
//! Only bodies are validated. Parameters, headers and security requirements
//! are out of scope.
//!
//! ```rust,no_run
//! use brrtrouter_contract::exchange::{ContractRequest, ContractResponse};
//! use brrtrouter_contract::validator::SpecValidator;
//! use http::Method;
//! use serde_json::json;
//!
//! let validator = SpecValidator::from_yaml("api-docs/v1/index.yaml")?;
//! let response = ContractResponse::new(200).with_json(&json!({"id": "42", "name": "Foo"}));
//! validator.validate(&response, "/widgets/{id}", &Method::GET)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;

pub use error::{KeywordMismatch, ValidationCause, ValidationError};

use crate::exchange::{Message, MessageKind};
use crate::router::TemplateRouter;
use crate::spec::{
    build_operations, extract_base_paths, is_json_media_type, load_spec, BodyContract,
    DocumentFormat, LoadedSpec, OperationContract, SpecLoadError,
};
use crate::validator_cache::{SchemaKey, ValidatorCache};
use http::Method;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Validates request and response bodies against one OpenAPI document.
#[derive(Debug, Serialize, Deserialize)]
pub struct SpecValidator {
    document: PathBuf,
    title: String,
    base_paths: Vec<String>,
    operations: Vec<OperationContract>,
    #[serde(skip)]
    router: OnceCell<TemplateRouter>,
    #[serde(skip)]
    schemas: ValidatorCache,
}

impl SpecValidator {
    /// Build a validator from a YAML document.
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self, SpecLoadError> {
        Self::load(path.as_ref(), DocumentFormat::Yaml)
    }

    /// Build a validator from a JSON document.
    pub fn from_json(path: impl AsRef<Path>) -> Result<Self, SpecLoadError> {
        Self::load(path.as_ref(), DocumentFormat::Json)
    }

    /// Build a validator, picking the format from the file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SpecLoadError> {
        let path = path.as_ref();
        Self::load(path, DocumentFormat::from_path(path))
    }

    fn load(path: &Path, format: DocumentFormat) -> Result<Self, SpecLoadError> {
        Self::from_loaded(load_spec(path, format)?)
    }

    pub fn from_loaded(spec: LoadedSpec) -> Result<Self, SpecLoadError> {
        let operations = build_operations(&spec)?;
        let base_paths = extract_base_paths(&spec.root);
        info!(
            document = %spec.path.display(),
            title = %spec.title,
            operations = operations.len(),
            "Built OpenAPI validator"
        );
        Ok(Self {
            document: spec.path,
            title: spec.title,
            base_paths,
            operations,
            router: OnceCell::new(),
            schemas: ValidatorCache::default(),
        })
    }

    pub fn document(&self) -> &Path {
        &self.document
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn operations(&self) -> &[OperationContract] {
        &self.operations
    }

    /// Compiled-schema cache, e.g. for [`ValidatorCache::precompile`].
    pub fn schemas(&self) -> &ValidatorCache {
        &self.schemas
    }

    /// Operation documented for `path` (template or concrete) and `method`.
    pub fn find_operation(&self, path: &str, method: &Method) -> Option<&OperationContract> {
        let router = self
            .router
            .get_or_init(|| TemplateRouter::new(&self.operations, &self.base_paths));
        router
            .resolve(method.as_str(), path)
            .and_then(|index| self.operations.get(index))
    }

    /// Validate the body of a request or response.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when no operation matches `path_template`
    /// and `method`, when a response status or content type is not
    /// documented, or when the body violates its schema.
    pub fn validate<'m>(
        &self,
        message: impl Into<Message<'m>>,
        path_template: &str,
        method: &Method,
    ) -> Result<(), ValidationError> {
        let message = message.into();
        let operation = self.find_operation(path_template, method).ok_or_else(|| {
            ValidationError::new(
                format!(
                    "OpenAPI spec contains no such operation [{},{}]",
                    path_template,
                    method.as_str().to_ascii_lowercase()
                ),
                vec![ValidationCause::OperationNotFound {
                    method: method.to_string(),
                    path: path_template.to_string(),
                }],
            )
        })?;

        match message {
            Message::Request(_) => match &operation.request_body {
                Some(body) => self.validate_body(operation, &message, None, body),
                None => Ok(()),
            },
            Message::Response(response) => {
                let (status_key, body) = operation.response_for(response.status).ok_or_else(|| {
                    ValidationError::new(
                        format!(
                            "OpenAPI spec contains no such operation response [{} {}] for status {}",
                            method.as_str().to_ascii_lowercase(),
                            operation.path_template,
                            response.status
                        ),
                        vec![ValidationCause::StatusNotDocumented {
                            status: response.status,
                        }],
                    )
                })?;
                self.validate_body(operation, &message, Some(status_key), body)
            }
        }
    }

    fn validate_body(
        &self,
        operation: &OperationContract,
        message: &Message<'_>,
        status: Option<&str>,
        body: &BodyContract,
    ) -> Result<(), ValidationError> {
        if body.content.is_empty() {
            return Ok(());
        }

        let kind = message.kind();
        let label = match (kind, status) {
            (MessageKind::Response, Some(status)) => format!(
                "Response [{} {} {}]",
                operation.method.to_ascii_lowercase(),
                operation.path_template,
                status
            ),
            _ => format!(
                "Request [{} {}]",
                operation.method.to_ascii_lowercase(),
                operation.path_template
            ),
        };

        let content_type = message.content_type();
        let Some((media_type, schema)) = body.media_type_for(content_type.as_deref()) else {
            let content_type = content_type.unwrap_or_default();
            return Err(ValidationError::new(
                format!("Content-Type \"{content_type}\" is not expected for {label}"),
                vec![ValidationCause::UnexpectedContentType { content_type }],
            ));
        };

        let Some(schema) = schema.filter(|_| is_json_media_type(media_type)) else {
            debug!(%label, media_type, "No JSON schema to validate against");
            return Ok(());
        };

        let raw = message.body();
        if raw.iter().all(u8::is_ascii_whitespace) {
            if kind == MessageKind::Request && !body.required {
                return Ok(());
            }
            return Err(ValidationError::new(
                format!("Body is empty but content-type \"{media_type}\" is documented for {label}"),
                vec![ValidationCause::MissingBody],
            ));
        }

        let instance: Value = serde_json::from_slice(raw).map_err(|e| {
            ValidationError::new(
                format!("Body is not valid JSON for content-type \"{media_type}\" for {label}"),
                vec![ValidationCause::BodyNotJson {
                    message: e.to_string(),
                }],
            )
        })?;

        let key = SchemaKey {
            method: &operation.method,
            path_template: &operation.path_template,
            kind,
            status,
            media_type,
        };
        let compiled = self.schemas.get_or_compile(key, schema).map_err(|message| {
            ValidationError::new(
                format!("Schema for content-type \"{media_type}\" cannot be compiled for {label}"),
                vec![ValidationCause::SchemaCompilation {
                    media_type: media_type.to_string(),
                    message,
                }],
            )
        })?;

        let mismatches: Vec<KeywordMismatch> = match compiled.validate(&instance) {
            Ok(()) => return Ok(()),
            Err(errors) => errors.map(|e| KeywordMismatch::from_schema_error(&e)).collect(),
        };

        let mut causes = vec![ValidationCause::BodyMismatch {
            media_type: media_type.to_string(),
            mismatches: mismatches.len(),
        }];
        causes.extend(mismatches.into_iter().map(ValidationCause::KeywordMismatch));
        Err(ValidationError::new(
            format!("Body does not match schema for content-type \"{media_type}\" for {label}"),
            causes,
        ))
    }
}
