use super::{AssertionSink, FailureReport, PanicSink, SpecDocument, ValidationControls};
use crate::exchange::{ContractRequest, ContractResponse, MessageKind};
use crate::spec::SpecLoadError;
use crate::spec_cache::{self, SpecValidatorCache};
use crate::validator::SpecValidator;
use http::Method;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Why a contract check did not pass.
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    /// The test is set up wrong; distinct from a contract mismatch.
    #[error("contract validation is misconfigured: {0}")]
    Configuration(String),
    #[error("cannot load spec document {}: {source}", path.display())]
    SpecLoad {
        path: PathBuf,
        #[source]
        source: SpecLoadError,
    },
    #[error("{0}")]
    Mismatch(FailureReport),
}

impl ContractError {
    pub fn report(&self) -> Option<&FailureReport> {
        match self {
            ContractError::Mismatch(report) => Some(report),
            _ => None,
        }
    }
}

/// Whatever executes a request for a contract test: an in-process router,
/// a dispatcher, or an HTTP client against a live server.
pub trait HttpKernel {
    fn handle(&mut self, request: &ContractRequest) -> ContractResponse;
}

impl<F> HttpKernel for F
where
    F: FnMut(&ContractRequest) -> ContractResponse,
{
    fn handle(&mut self, request: &ContractRequest) -> ContractResponse {
        self(request)
    }
}

/// Checks executed exchanges against an OpenAPI document.
///
/// ```rust,no_run
/// use brrtrouter_contract::contract::ContractValidator;
/// use brrtrouter_contract::exchange::{ContractRequest, ContractResponse};
/// use http::Method;
/// use serde_json::json;
///
/// let mut contract = ContractValidator::new("api-docs/v1/index.yaml");
/// let request = ContractRequest::new(Method::GET, "/widgets/42").with_route_template("/widgets/{id}");
/// let response = ContractResponse::new(200).with_json(&json!({"id": "42", "name": "Foo"}));
///
/// contract.assert_exchange(&request, &response, &Method::GET)?;
/// contract.skip_next_response_validation().assert_exchange(&request, &response, &Method::GET)?;
/// # Ok::<(), brrtrouter_contract::contract::ContractError>(())
/// ```
#[derive(Debug)]
pub struct ContractValidator<D = PathBuf, S = PanicSink> {
    document: D,
    cache: Arc<SpecValidatorCache>,
    controls: ValidationControls,
    sink: S,
}

impl<D: SpecDocument> ContractValidator<D, PanicSink> {
    /// Validator using the process-wide spec cache and panicking on failure.
    pub fn new(document: D) -> Self {
        Self {
            document,
            cache: spec_cache::global(),
            controls: ValidationControls::default(),
            sink: PanicSink,
        }
    }
}

impl<D: SpecDocument, S: AssertionSink> ContractValidator<D, S> {
    pub fn with_cache(mut self, cache: Arc<SpecValidatorCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_sink<T: AssertionSink>(self, sink: T) -> ContractValidator<D, T> {
        ContractValidator {
            document: self.document,
            cache: self.cache,
            controls: self.controls,
            sink,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn controls(&self) -> &ValidationControls {
        &self.controls
    }

    /// Validate the next exchange against `path` rather than the request's route.
    pub fn force_openapi_path(&mut self, path: impl Into<String>) -> &mut Self {
        self.controls.force_path(path);
        self
    }

    pub fn skip_next_request_validation(&mut self) -> &mut Self {
        self.controls.skip_request();
        self
    }

    pub fn skip_next_response_validation(&mut self) -> &mut Self {
        self.controls.skip_response();
        self
    }

    /// Skip the whole next exchange. The short-circuit clears both skip
    /// flags; a pending forced path is kept for the next validating call.
    pub fn skip_next_validation(&mut self) -> &mut Self {
        self.controls.skip_request();
        self.controls.skip_response();
        self
    }

    /// Path template to validate `request` against.
    ///
    /// A forced path wins and is used up. Otherwise the matched route
    /// template with exactly one leading `/`, otherwise the raw URI.
    pub fn openapi_path_for_request(&mut self, request: &ContractRequest) -> String {
        if let Some(path) = self.controls.take_forced_path() {
            return path;
        }
        match request.route_template.as_deref().filter(|t| !t.is_empty()) {
            Some(template) => format!("/{}", template.trim_start_matches('/')),
            None => request.uri.clone(),
        }
    }

    /// Validator for the configured spec document, through the spec cache.
    ///
    /// # Errors
    ///
    /// [`ContractError::Configuration`] when no document is configured,
    /// [`ContractError::SpecLoad`] when it cannot be built.
    pub fn build_openapi_validator(&self) -> Result<Arc<SpecValidator>, ContractError> {
        let path = self.document.spec_document_path().ok_or_else(|| {
            ContractError::Configuration("no OpenAPI spec document path is configured".to_string())
        })?;
        self.cache
            .get_validator(&path, |p| SpecValidator::from_path(p))
            .map_err(|source| ContractError::SpecLoad { path, source })
    }

    /// Validate the request body, then the response body, of one exchange.
    ///
    /// Pending one-shot controls are applied and used up.
    pub fn validate_exchange(
        &mut self,
        request: &ContractRequest,
        response: &ContractResponse,
        method: &Method,
    ) -> Result<(), ContractError> {
        if self.controls.take_skip_both() {
            debug!(uri = %request.uri, "Skipping request and response validation");
            return Ok(());
        }

        let path_template = self.openapi_path_for_request(request);
        let validator = self.build_openapi_validator()?;

        if self.controls.take_skip_request() {
            debug!(path = %path_template, "Skipping request validation");
        } else {
            validator
                .validate(request, &path_template, method)
                .map_err(|error| {
                    ContractError::Mismatch(FailureReport::new(
                        MessageKind::Request,
                        &path_template,
                        error,
                        &request.body,
                    ))
                })?;
        }

        if self.controls.take_skip_response() {
            debug!(path = %path_template, "Skipping response validation");
        } else {
            validator
                .validate(response, &path_template, method)
                .map_err(|error| {
                    ContractError::Mismatch(FailureReport::new(
                        MessageKind::Response,
                        &path_template,
                        error,
                        &response.body,
                    ))
                })?;
        }

        Ok(())
    }

    /// [`validate_exchange`](Self::validate_exchange), handing a mismatch to
    /// the assertion sink before returning it.
    pub fn assert_exchange(
        &mut self,
        request: &ContractRequest,
        response: &ContractResponse,
        method: &Method,
    ) -> Result<(), ContractError> {
        let result = self.validate_exchange(request, response, method);
        if let Err(ContractError::Mismatch(report)) = &result {
            self.sink.fail(&report.message, &report.content);
        }
        result
    }

    /// Execute `request` through `kernel` and assert the exchange.
    pub fn call<K: HttpKernel>(
        &mut self,
        kernel: &mut K,
        request: ContractRequest,
    ) -> Result<ContractResponse, ContractError> {
        let response = kernel.handle(&request);
        self.assert_exchange(&request, &response, &request.method)?;
        Ok(response)
    }
}
