//! # CLI Module
//!
//! Command-line tooling around the spec cache and contract checks, shipped
//! as the `brrtrouter-contract` binary.
//!
//! ## Commands
//!
//! ### `fingerprint`
//!
//! Print the digest of the directory holding a spec document. It changes
//! whenever any file next to (or below) the document changes.
//!
//! ```bash
//! brrtrouter-contract fingerprint --spec api-docs/v1/index.yaml
//! ```
//!
//! ### `cache-path`
//!
//! Print where the durable cache entry for a document lives for the current
//! partition.
//!
//! ### `warm`
//!
//! Build or load the validator and compile every JSON body schema, e.g. as a
//! CI step before fanning out parallel test workers.
//!
//! ### `check`
//!
//! List the operations of a spec with their documented bodies.
//!
//! ### `validate`
//!
//! Validate a recorded exchange. Exits non-zero on a mismatch.
//!
//! ```bash
//! brrtrouter-contract validate --spec api-docs/v1/index.yaml --exchange get_widget.json
//! ```
//!
//! Every command accepts `--cache-dir`, `--partition` and `--no-cache`,
//! which override the `BRRTR_CONTRACT_*` environment variables.

mod commands;


pub use commands::{execute, run_cli, CacheArgs, Cli, Commands};
