//! # Contract Module
//!
//! Drives contract validation of executed HTTP exchanges.
//!
//! For every exchange, [`ContractValidator`]:
//!
//! 1. returns early if both one-shot skips are pending,
//! 2. resolves the path template (forced path, matched route, raw URI),
//! 3. fetches the [`SpecValidator`](crate::validator::SpecValidator) for the
//!    configured document from the spec cache,
//! 4. validates the request body, then the response body, honouring the
//!    per-kind one-shot skips,
//! 5. on mismatch builds a [`FailureReport`] and hands it to the
//!    [`AssertionSink`].
//!
//! A missing spec document is a [`ContractError::Configuration`], never a
//! mismatch.

mod controls;
mod document;
mod orchestrator;
mod report;

pub use controls::ValidationControls;
pub use document::{DocumentFn, SpecDocument};
pub use orchestrator::{ContractError, ContractValidator, HttpKernel};
pub use report::{AssertionSink, FailureReport, PanicSink, RecordingSink};
