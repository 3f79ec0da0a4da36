//! # Spec Cache Module
//!
//! [`SpecValidatorCache`] hands out one [`SpecValidator`] per spec document
//! path and keeps building them cheap across test runs.
//!
//! ## Two Levels
//!
//! 1. **Memory index**: path to `Arc<SpecValidator>` for the life of the
//!    process. A hit is returned without looking at the filesystem.
//! 2. **Durable store**: one JSON file per (partition, document path) under
//!    the cache directory, holding the serialized validator and the
//!    fingerprint of the spec directory it was built from. An entry is used
//!    only while the fingerprint still matches.
//!
//! ## Failure Policy
//!
//! Cache faults ([`CacheFault`]) never reach the caller. A fault before the
//! durable lookup completes means the validator is built and not written;
//! a fault while writing is logged and the freshly built validator is used.
//! Only the builder's own error is returned.
//!
//! ## Process-Wide Registry
//!
//! Tests usually share one cache per process. [`install`] sets it
//! explicitly; [`global`] returns it, creating one from
//! [`ContractConfig::from_env`] on first use.

mod error;
mod fingerprint;
mod store;

pub use error::CacheFault;
pub use fingerprint::{fingerprint_dir, spec_dir};
pub use store::{CacheEntry, DurableStore, CACHE_NAMESPACE};

use crate::runtime_config::ContractConfig;
use crate::spec::SpecLoadError;
use crate::validator::SpecValidator;
use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Validators by spec document path, backed by an optional durable store.
pub struct SpecValidatorCache<V = SpecValidator> {
    memory: RwLock<HashMap<PathBuf, Arc<V>>>,
    store: Option<DurableStore>,
}

impl<V> fmt::Debug for SpecValidatorCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecValidatorCache")
            .field("store", &self.store)
            .field("entries", &self.len())
            .finish()
    }
}

impl<V> SpecValidatorCache<V> {
    pub fn new(config: &ContractConfig) -> Self {
        match &config.cache_dir {
            Some(dir) => Self::with_store(DurableStore::new(dir, config.partition.as_str())),
            None => Self::memory_only(),
        }
    }

    pub fn with_store(store: DurableStore) -> Self {
        Self {
            memory: RwLock::new(HashMap::new()),
            store: Some(store),
        }
    }

    pub fn memory_only() -> Self {
        Self {
            memory: RwLock::new(HashMap::new()),
            store: None,
        }
    }

    pub fn store(&self) -> Option<&DurableStore> {
        self.store.as_ref()
    }

    /// Durable entry location for `document`, if the durable layer is on.
    pub fn entry_path(&self, document: &Path) -> Option<PathBuf> {
        self.store.as_ref().map(|store| store.entry_path(document))
    }

    /// Number of validators in the memory index
    pub fn len(&self) -> usize {
        self.memory
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every in-memory validator. Durable entries are left alone.
    pub fn clear_memory(&self) {
        self.memory
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl<V: Serialize + DeserializeOwned> SpecValidatorCache<V> {
    /// Validator for `document`, built by `build` only when neither cache
    /// level can supply one.
    ///
    /// # Errors
    ///
    /// Returns the builder's error. Cache faults are logged and recovered.
    pub fn get_validator<E>(
        &self,
        document: &Path,
        build: impl FnOnce(&Path) -> Result<V, E>,
    ) -> Result<Arc<V>, E> {
        if let Some(validator) = self
            .memory
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(document)
        {
            debug!(document = %document.display(), "Spec validator memory hit");
            return Ok(Arc::clone(validator));
        }

        let validator = match &self.store {
            Some(store) => self.load_or_build(store, document, build)?,
            None => build(document)?,
        };

        let mut memory = self.memory.write().unwrap_or_else(PoisonError::into_inner);
        let validator = memory
            .entry(document.to_path_buf())
            .or_insert_with(|| Arc::new(validator));
        Ok(Arc::clone(validator))
    }

    fn load_or_build<E>(
        &self,
        store: &DurableStore,
        document: &Path,
        build: impl FnOnce(&Path) -> Result<V, E>,
    ) -> Result<V, E> {
        let entry_path = store.entry_path(document);
        let lookup = fingerprint_dir(&spec_dir(document)).and_then(|fingerprint| {
            store
                .read::<V>(&entry_path)
                .map(|entry| (fingerprint, entry))
        });

        let fingerprint = match lookup {
            Ok((fingerprint, Some(entry))) if entry.fingerprint == fingerprint => {
                debug!(
                    document = %document.display(),
                    entry = %entry_path.display(),
                    "Spec validator durable hit"
                );
                return Ok(entry.validator);
            }
            Ok((fingerprint, Some(_))) => {
                info!(document = %document.display(), "Spec changed, rebuilding validator");
                fingerprint
            }
            Ok((fingerprint, None)) => {
                info!(document = %document.display(), "No cached validator, building");
                fingerprint
            }
            Err(fault) => {
                warn!(
                    document = %document.display(),
                    error = %fault,
                    "Spec cache unavailable, building without caching"
                );
                return build(document);
            }
        };

        let validator = build(document)?;
        match store.write(&entry_path, &fingerprint, &validator) {
            Ok(()) => info!(
                document = %document.display(),
                entry = %entry_path.display(),
                "Cached spec validator"
            ),
            Err(fault) => warn!(
                document = %document.display(),
                error = %fault,
                "Failed to cache spec validator"
            ),
        }
        Ok(validator)
    }
}

impl SpecValidatorCache<SpecValidator> {
    /// [`get_validator`](Self::get_validator) with a YAML builder.
    pub fn from_yaml(&self, document: impl AsRef<Path>) -> Result<Arc<SpecValidator>, SpecLoadError> {
        self.get_validator(document.as_ref(), |p| SpecValidator::from_yaml(p))
    }

    /// [`get_validator`](Self::get_validator) with a JSON builder.
    pub fn from_json(&self, document: impl AsRef<Path>) -> Result<Arc<SpecValidator>, SpecLoadError> {
        self.get_validator(document.as_ref(), |p| SpecValidator::from_json(p))
    }

    /// [`get_validator`](Self::get_validator), format picked by extension.
    pub fn from_path(&self, document: impl AsRef<Path>) -> Result<Arc<SpecValidator>, SpecLoadError> {
        self.get_validator(document.as_ref(), |p| SpecValidator::from_path(p))
    }
}

static GLOBAL: OnceCell<Arc<SpecValidatorCache>> = OnceCell::new();

/// Install the process-wide cache. Returns `false` if one is already set.
pub fn install(cache: SpecValidatorCache) -> bool {
    GLOBAL.set(Arc::new(cache)).is_ok()
}

/// The process-wide cache, created from the environment if none was installed.
pub fn global() -> Arc<SpecValidatorCache> {
    Arc::clone(GLOBAL.get_or_init(|| Arc::new(SpecValidatorCache::new(&ContractConfig::from_env()))))
}
