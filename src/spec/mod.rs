mod build;
mod dialect;
mod error;
mod load;
mod resolve;
mod types;

pub use build::*;
pub use dialect::normalize_schema;
pub use error::SpecLoadError;
pub use load::*;
pub use resolve::RefResolver;
pub use types::*;
