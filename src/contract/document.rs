use std::path::{Path, PathBuf};

/// Where the spec document of a contract test lives.
///
/// Read at validation time, not at construction, so a test fixture can
/// decide late. `None` or an empty path is a configuration error.
pub trait SpecDocument {
    fn spec_document_path(&self) -> Option<PathBuf>;
}

fn non_empty(path: &Path) -> Option<PathBuf> {
    (!path.as_os_str().is_empty()).then(|| path.to_path_buf())
}

impl SpecDocument for PathBuf {
    fn spec_document_path(&self) -> Option<PathBuf> {
        non_empty(self)
    }
}

impl SpecDocument for &Path {
    fn spec_document_path(&self) -> Option<PathBuf> {
        non_empty(self)
    }
}

impl SpecDocument for &str {
    fn spec_document_path(&self) -> Option<PathBuf> {
        non_empty(Path::new(self))
    }
}

impl SpecDocument for String {
    fn spec_document_path(&self) -> Option<PathBuf> {
        non_empty(Path::new(self))
    }
}

impl<T: SpecDocument> SpecDocument for Option<T> {
    fn spec_document_path(&self) -> Option<PathBuf> {
        self.as_ref().and_then(SpecDocument::spec_document_path)
    }
}

/// Spec document computed by a closure, e.g. from a fixture's environment.
///
/// ```rust
/// use brrtrouter_contract::contract::{DocumentFn, SpecDocument};
///
/// let doc = DocumentFn(|| std::env::var("API_SPEC").ok().map(Into::into));
/// let _ = doc.spec_document_path();
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DocumentFn<F>(pub F);

impl<F: Fn() -> Option<PathBuf>> SpecDocument for DocumentFn<F> {
    fn spec_document_path(&self) -> Option<PathBuf> {
        (self.0)().as_deref().and_then(non_empty)
    }
}
