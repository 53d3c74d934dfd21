//! Compiled-template cache.
//!
//! Entries are keyed by [`CacheKey`], a deterministic 64-bit hash of the
//! template's logical name. The cache is shared by every render, so it sits
//! behind a reader-writer lock. Two threads missing on the same key may both
//! compile; the last insert wins, which is harmless because compilation is a
//! pure function of the template source.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use xxhash_rust::xxh64::xxh64;

use crate::CompiledTemplate;

/// Domain marker mixed into every template-name hash.
const TEMPLATE_DOMAIN: u64 = 0x6a09e667f3bcc908;

/// A deterministic hash identifying a compiled template by name.
///
/// The same name always produces the same key, across runs and processes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct CacheKey(pub u64);

impl CacheKey {
    /// Create a key from a logical template name.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        CacheKey(TEMPLATE_DOMAIN ^ xxh64(name.as_bytes(), 0))
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CacheKey({:016x})", self.0)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Thread-safe map from [`CacheKey`] to compiled templates.
#[derive(Default)]
pub struct CompilationCache {
    entries: RwLock<FxHashMap<CacheKey, Arc<CompiledTemplate>>>,
}

impl CompilationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: CacheKey) -> Option<Arc<CompiledTemplate>> {
        self.entries.read().get(&key).cloned()
    }

    /// Insert an entry, replacing any previous one for the same key.
    pub fn insert(&self, key: CacheKey, compiled: Arc<CompiledTemplate>) {
        self.entries.write().insert(key, compiled);
    }

    pub fn remove(&self, key: CacheKey) -> Option<Arc<CompiledTemplate>> {
        self.entries.write().remove(&key)
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl fmt::Debug for CompilationCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompilationCache")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fith_parser::Template;

    fn compiled(name: &str) -> Arc<CompiledTemplate> {
        Arc::new(CompiledTemplate {
            name: name.to_string(),
            ast: Template::default(),
            dependencies: Vec::new(),
            cache_key: Some(CacheKey::from_name(name)),
            is_optimized: true,
        })
    }

    #[test]
    fn key_is_deterministic() {
        assert_eq!(CacheKey::from_name("page"), CacheKey::from_name("page"));
        assert_ne!(CacheKey::from_name("page"), CacheKey::from_name("Page"));
    }

    #[test]
    fn key_display_is_hex() {
        let key = CacheKey(0xab);
        assert_eq!(key.to_string(), "00000000000000ab");
        assert_eq!(format!("{key:?}"), "CacheKey(00000000000000ab)");
    }

    #[test]
    fn insert_get_remove() {
        let cache = CompilationCache::new();
        let key = CacheKey::from_name("a");
        assert!(cache.get(key).is_none());

        cache.insert(key, compiled("a"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(key).map(|c| c.name.clone()), Some("a".to_string()));

        assert!(cache.remove(key).is_some());
        assert!(cache.is_empty());
    }

    #[test]
    fn last_insert_wins() {
        let cache = CompilationCache::new();
        let key = CacheKey::from_name("a");
        cache.insert(key, compiled("first"));
        cache.insert(key, compiled("second"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(key).map(|c| c.name.clone()), Some("second".to_string()));
    }

    #[test]
    fn clear_empties_cache() {
        let cache = CompilationCache::new();
        cache.insert(CacheKey::from_name("a"), compiled("a"));
        cache.insert(CacheKey::from_name("b"), compiled("b"));
        cache.clear();
        assert!(cache.is_empty());
    }
}
