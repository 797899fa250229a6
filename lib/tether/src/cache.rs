//! Per-service cache of compiled methods.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tether_core::Result;
use tracing::debug;

use crate::method::CompiledMethod;

/// Compiled methods keyed by name.
///
/// Compilation runs outside the lock. When two callers race on the same
/// name, the first insert wins and every caller receives the stored
/// instance. A failed compilation caches nothing.
#[derive(Debug, Default)]
pub struct MethodCache {
    methods: RwLock<HashMap<String, Arc<CompiledMethod>>>,
}

impl MethodCache {
    /// Empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached method by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<CompiledMethod>> {
        self.methods
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Cached method by name, compiling it with `compile` on a miss.
    ///
    /// # Errors
    ///
    /// Returns the compilation error; nothing is cached in that case.
    pub fn get_or_compile<F>(&self, name: &str, compile: F) -> Result<Arc<CompiledMethod>>
    where
        F: FnOnce() -> Result<CompiledMethod>,
    {
        if let Some(method) = self.get(name) {
            return Ok(method);
        }

        let compiled = Arc::new(compile()?);
        let mut methods = self
            .methods
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let stored = methods.entry(name.to_string()).or_insert_with(|| {
            debug!(method = name, "compiled method");
            compiled
        });
        Ok(Arc::clone(stored))
    }

    /// Number of cached methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.methods
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
