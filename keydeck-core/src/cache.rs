//! Render cache
//!
//! Identical styles always render to identical bytes, so rendered key
//! images are kept for the lifetime of the process. The set of distinct
//! styles is small (icons x colors x labels x rotation), so there is no
//! eviction.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use crate::layout::Rotation;
use crate::style::KeyStyle;

/// Everything that determines a rendered key image
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub style: KeyStyle,
    pub rotation: Rotation,
}

/// Memoizes rendered values by key
#[derive(Debug)]
pub struct RenderCache<K, V> {
    entries: HashMap<K, Arc<V>>,
}

impl<K, V> Default for RenderCache<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, V> RenderCache<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, rendering and storing it first
    /// if absent
    ///
    /// A failed render stores nothing.
    pub fn get_or_render<E>(
        &mut self,
        key: K,
        render: impl FnOnce() -> Result<V, E>,
    ) -> Result<Arc<V>, E> {
        if let Some(value) = self.entries.get(&key) {
            return Ok(Arc::clone(value));
        }

        let value = Arc::new(render()?);
        self.entries.insert(key, Arc::clone(&value));
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
