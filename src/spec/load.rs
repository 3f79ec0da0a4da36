use super::error::SpecLoadError;
use super::types::HTTP_METHODS;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Serialization format of a spec document or a referenced schema file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
}

impl DocumentFormat {
    /// `.yaml`/`.yml` are YAML, everything else is treated as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                DocumentFormat::Yaml
            }
            _ => DocumentFormat::Json,
        }
    }
}

/// A parsed OpenAPI document, not yet expanded into operation contracts.
#[derive(Debug, Clone)]
pub struct LoadedSpec {
    pub path: PathBuf,
    pub title: String,
    pub root: Value,
}

fn strip_unknown_verbs(val: &mut Value) {
    let Some(Value::Object(paths_map)) = val.get_mut("paths") else {
        return;
    };
    for item in paths_map.values_mut() {
        if let Value::Object(obj) = item {
            obj.retain(|k, _| {
                let lk = k.to_ascii_lowercase();
                match lk.as_str() {
                    "summary" | "description" | "servers" | "parameters" | "$ref" => true,
                    m if HTTP_METHODS.contains(&m) => true,
                    _ => k.starts_with("x-"),
                }
            });
        }
    }
}

/// Read and parse any YAML or JSON document (the spec or a referenced file).
pub fn read_document(path: &Path, format: DocumentFormat) -> Result<Value, SpecLoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| SpecLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&content, path, format)
}

pub fn parse_document(
    content: &str,
    path: &Path,
    format: DocumentFormat,
) -> Result<Value, SpecLoadError> {
    match format {
        DocumentFormat::Yaml => serde_yaml::from_str(content).map_err(|source| SpecLoadError::Yaml {
            path: path.to_path_buf(),
            source,
        }),
        DocumentFormat::Json => serde_json::from_str(content).map_err(|source| SpecLoadError::Json {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Load an OpenAPI 3 document from disk.
///
/// The document must declare `openapi: 3.x` and carry an `info` object that
/// deserializes as [`oas3::spec::Info`]. Unknown keys inside path items are
/// dropped so vendor junk does not end up in operation contracts.
pub fn load_spec(path: &Path, format: DocumentFormat) -> Result<LoadedSpec, SpecLoadError> {
    let mut root = read_document(path, format)?;

    let version = root
        .get("openapi")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    if !version.starts_with("3.") {
        return Err(SpecLoadError::NotOpenApi {
            path: path.to_path_buf(),
            reason: format!("expected `openapi: 3.x`, found {version:?}"),
        });
    }

    let info: oas3::spec::Info = root
        .get("info")
        .cloned()
        .ok_or_else(|| SpecLoadError::NotOpenApi {
            path: path.to_path_buf(),
            reason: "missing `info` object".to_string(),
        })
        .and_then(|info| {
            serde_json::from_value(info).map_err(|e| SpecLoadError::NotOpenApi {
                path: path.to_path_buf(),
                reason: format!("invalid `info` object: {e}"),
            })
        })?;

    strip_unknown_verbs(&mut root);
    debug!(path = %path.display(), title = %info.title, %version, "Loaded OpenAPI document");

    Ok(LoadedSpec {
        path: path.to_path_buf(),
        title: info.title,
        root,
    })
}
