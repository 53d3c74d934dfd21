use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::trace;

use fith_core::LoadError;
use fith_parser::{Delimiters, Template};

use super::{ParsedCache, TemplateLoader, parse};

/// Serves templates from sources held in memory.
///
/// Sources are parsed on first load. Replacing a source with
/// [`add`](Self::add) drops its memoised parse.
///
/// ```
/// use fith::{MemoryLoader, TemplateLoader};
///
/// let loader = MemoryLoader::default()
///     .with_template("header", "<h1>{{.Title}}</h1>")
///     .with_template("page", r#"{{include "header"}}"#);
/// assert!(loader.exists("header"));
/// assert!(loader.load("page").is_ok());
/// ```
#[derive(Debug, Default)]
pub struct MemoryLoader {
    delimiters: Delimiters,
    sources: RwLock<FxHashMap<String, String>>,
    parsed: ParsedCache,
}

impl MemoryLoader {
    pub fn new(delimiters: Delimiters) -> Self {
        Self {
            delimiters,
            sources: RwLock::default(),
            parsed: ParsedCache::default(),
        }
    }

    pub fn with_template(self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.add(name, source);
        self
    }

    /// Store `source` under `name`, replacing any previous source.
    pub fn add(&self, name: impl Into<String>, source: impl Into<String>) {
        let name = name.into();
        self.parsed.remove(&name);
        self.sources.write().insert(name, source.into());
    }

    pub fn remove(&self, name: &str) -> Option<String> {
        self.parsed.remove(name);
        self.sources.write().remove(name)
    }

    pub fn len(&self) -> usize {
        self.sources.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.read().is_empty()
    }

    /// Number of memoised parses.
    pub fn parsed_len(&self) -> usize {
        self.parsed.len()
    }
}

impl TemplateLoader for MemoryLoader {
    fn load(&self, name: &str) -> Result<Arc<Template>, LoadError> {
        if let Some(template) = self.parsed.get(name) {
            return Ok(template);
        }

        let template = {
            let sources = self.sources.read();
            let source = sources.get(name).ok_or_else(|| LoadError::NotFound {
                name: name.to_string(),
            })?;
            parse(name, source, &self.delimiters)?
        };
        trace!(template = name, "parsed in-memory template");
        self.parsed.insert(name, Arc::clone(&template));
        Ok(template)
    }

    fn exists(&self, name: &str) -> bool {
        self.sources.read().contains_key(name)
    }

    fn clear_cache(&self) {
        self.parsed.clear();
    }
}
