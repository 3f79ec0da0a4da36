//! `$ref` expansion across the spec document and its sibling files.
//!
//! Contracts are stored fully expanded so a cached validator never has to
//! touch the filesystem again. References are resolved relative to the
//! document that contains them: `#/components/schemas/Widget` stays in the
//! current file, `schemas/widget.yaml#/Widget` is loaded next to it.
//! Recursive schemas are cut at the first repeat and replaced with an empty
//! (accept-anything) schema tagged `x-ref-cycle`.

use super::error::SpecLoadError;
use super::load::{read_document, DocumentFormat};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// Hard stop for pathological reference chains that are not cycles.
const MAX_REF_DEPTH: usize = 64;

pub struct RefResolver {
    documents: HashMap<PathBuf, Value>,
}

impl RefResolver {
    /// Seed the resolver with the already parsed root document.
    pub fn new(root_path: &Path, root: Value) -> Self {
        let mut documents = HashMap::new();
        documents.insert(normalize_path(root_path), root);
        Self { documents }
    }

    /// Replace every `$ref` object inside `value` with its target.
    ///
    /// `doc` is the file `value` was taken from; it anchors relative refs.
    pub fn expand(&mut self, doc: &Path, value: &mut Value) -> Result<(), SpecLoadError> {
        let mut stack = Vec::new();
        self.expand_in(&normalize_path(doc), value, &mut stack)
    }

    fn expand_in(
        &mut self,
        doc: &Path,
        value: &mut Value,
        stack: &mut Vec<String>,
    ) -> Result<(), SpecLoadError> {
        match value {
            Value::Object(obj) => {
                if let Some(reference) = obj.get("$ref").and_then(Value::as_str).map(str::to_owned) {
                    let (target_doc, pointer) = locate(doc, &reference)?;
                    let key = format!("{}#{}", target_doc.display(), pointer);
                    let name = ref_name(&pointer);

                    if stack.contains(&key) {
                        *value = json!({ "x-ref-cycle": reference });
                        return Ok(());
                    }
                    if stack.len() >= MAX_REF_DEPTH {
                        return Err(SpecLoadError::UnresolvedRef {
                            path: doc.to_path_buf(),
                            reference,
                            reason: format!("reference chain deeper than {MAX_REF_DEPTH}"),
                        });
                    }

                    let mut target = self.lookup(doc, &target_doc, &pointer, &reference)?.clone();
                    stack.push(key);
                    self.expand_in(&target_doc, &mut target, stack)?;
                    stack.pop();

                    if let (Some(name), Value::Object(o)) = (name, &mut target) {
                        o.entry("x-ref-name").or_insert(Value::String(name));
                    }
                    *value = target;
                    return Ok(());
                }
                for v in obj.values_mut() {
                    self.expand_in(doc, v, stack)?;
                }
            }
            Value::Array(arr) => {
                for v in arr.iter_mut() {
                    self.expand_in(doc, v, stack)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn lookup(
        &mut self,
        from: &Path,
        target_doc: &Path,
        pointer: &str,
        reference: &str,
    ) -> Result<&Value, SpecLoadError> {
        if !self.documents.contains_key(target_doc) {
            let loaded = read_document(target_doc, DocumentFormat::from_path(target_doc))?;
            self.documents.insert(target_doc.to_path_buf(), loaded);
        }
        let document = self
            .documents
            .get(target_doc)
            .ok_or_else(|| unresolved(from, reference, "document not loaded"))?;
        if pointer.is_empty() {
            return Ok(document);
        }
        document
            .pointer(pointer)
            .ok_or_else(|| unresolved(from, reference, "pointer does not exist"))
    }
}

fn unresolved(from: &Path, reference: &str, reason: &str) -> SpecLoadError {
    SpecLoadError::UnresolvedRef {
        path: from.to_path_buf(),
        reference: reference.to_string(),
        reason: reason.to_string(),
    }
}

/// Split a `$ref` into (document, JSON pointer).
fn locate(doc: &Path, reference: &str) -> Result<(PathBuf, String), SpecLoadError> {
    let (file, fragment) = match reference.split_once('#') {
        Some((file, fragment)) => (file, fragment),
        None => (reference, ""),
    };
    if file.contains("://") {
        return Err(unresolved(doc, reference, "remote references are not supported"));
    }
    let target = if file.is_empty() {
        doc.to_path_buf()
    } else {
        let base = doc.parent().unwrap_or_else(|| Path::new(""));
        normalize_path(&base.join(file))
    };
    Ok((target, fragment.to_string()))
}

/// Last pointer segment of a component ref, e.g. `Widget`.
fn ref_name(pointer: &str) -> Option<String> {
    pointer
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(|s| s.replace("~1", "/").replace("~0", "~"))
}

/// Lexically fold `.` and `..` so the same file always maps to one key.
fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
