//! # BRRTRouter Contract
//!
//! **brrtrouter-contract** checks executed HTTP exchanges against an
//! [OpenAPI 3](https://spec.openapis.org/oas/v3.0.3) document, for use from
//! test suites.
//!
//! ## Overview
//!
//! A test executes a request however it likes (an in-process router, a
//! dispatcher, a live server), copies request and response into
//! [`ContractRequest`] / [`ContractResponse`] and hands them to a
//! [`ContractValidator`]. The validator resolves the OpenAPI path template,
//! validates the request body and then the response body, and reports any
//! mismatch with the offending key and the body pretty-printed.
//!
//! Parsing a large spec is the expensive part, so validators come from a
//! [`SpecValidatorCache`]: an in-memory index for the running process backed
//! by durable entries in the temp directory, keyed by spec path and test
//! partition and invalidated by a fingerprint of the spec directory.
//!
//! ## Architecture
//!
//! - **[`spec`]** - Load OpenAPI documents, inline `$ref`s, build body contracts
//! - **[`router`]** - Resolve paths and templates to documented operations
//! - **[`exchange`]** - Request/response messages
//! - **[`validator`]** - [`SpecValidator`] and the typed validation error
//! - **[`validator_cache`]** - Compiled JSON Schemas per operation body
//! - **[`spec_cache`]** - Fingerprinted two-level validator cache
//! - **[`contract`]** - Validation orchestration, one-shot controls, failure reports
//! - **[`runtime_config`]** - Environment configuration
//! - **[`otel`]** - Logging setup for binaries and harnesses
//! - **[`cli`]** - The `brrtrouter-contract` command
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use brrtrouter_contract::{ContractRequest, ContractResponse, ContractValidator};
//! use http::Method;
//! use serde_json::json;
//!
//! let mut contract = ContractValidator::new("api-docs/v1/index.yaml");
//!
//! let request = ContractRequest::new(Method::GET, "/widgets/42")
//!     .with_route_template("/widgets/{id}");
//! let response = ContractResponse::new(200).with_json(&json!({"id": "42", "name": "Foo"}));
//!
//! // Panics with a diagnostic report on mismatch
//! contract.assert_exchange(&request, &response, &Method::GET)?;
//!
//! // One-shot controls apply to the next exchange only
//! contract
//!     .force_openapi_path("/widgets/{id}")
//!     .skip_next_request_validation()
//!     .assert_exchange(&request, &response, &Method::GET)?;
//! # Ok::<(), brrtrouter_contract::ContractError>(())
//! ```
//!
//! ## Parallel Test Runners
//!
//! Give each worker process its own `BRRTR_CONTRACT_PARTITION` (or
//! `TEST_TOKEN`). Workers then never read or write each other's durable
//! entries, even when they share a temp directory.

pub mod cli;
pub mod contract;
pub mod exchange;
pub mod otel;
pub mod router;
pub mod runtime_config;
pub mod spec;
pub mod spec_cache;
pub mod validator;
pub mod validator_cache;

pub use contract::{
    AssertionSink, ContractError, ContractValidator, FailureReport, HttpKernel, SpecDocument,
    ValidationControls,
};
pub use exchange::{ContractRequest, ContractResponse, Message, MessageKind};
pub use runtime_config::ContractConfig;
pub use spec::{load_spec, DocumentFormat, OperationContract, SpecLoadError};
pub use spec_cache::{CacheFault, SpecValidatorCache};
pub use validator::{KeywordMismatch, SpecValidator, ValidationCause, ValidationError};
