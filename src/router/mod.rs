//! # Router Module
//!
//! Resolves the path handed to [`SpecValidator::validate`](crate::validator::SpecValidator::validate)
//! onto a documented operation.
//!
//! ## Overview
//!
//! Callers usually pass the OpenAPI template the application router matched
//! (`/widgets/{id}`), which resolves by string equality. When no template is
//! known the raw request URI (`/widgets/42?expand=owner`) is passed instead;
//! it is matched against regex patterns compiled from every template, the
//! most literal template winning, and retried with each `servers[].url`
//! base path stripped.
//!
//! ## Example
//!
//! ```rust
//! use brrtrouter_contract::router::TemplateRouter;
//! use brrtrouter_contract::spec::OperationContract;
//!
//! let op = |template: &str| OperationContract {
//!     path_template: template.to_string(),
//!     method: "GET".to_string(),
//!     operation_id: None,
//!     request_body: None,
//!     responses: Default::default(),
//! };
//! let router = TemplateRouter::new(&[op("/widgets/{id}"), op("/widgets/mine")], &[]);
//!
//! assert_eq!(router.resolve("GET", "/widgets/{id}"), Some(0));
//! assert_eq!(router.resolve("GET", "/widgets/42"), Some(0));
//! assert_eq!(router.resolve("GET", "/widgets/mine"), Some(1));
//! assert_eq!(router.resolve("POST", "/widgets/42"), None);
//! ```

mod core;

pub use core::TemplateRouter;
