//! Template loaders.
//!
//! Both loaders parse with the delimiters they were built with and memoise
//! the parsed [`Template`] per name, so repeated loads of the same name share
//! one `Arc`.

mod filesystem;
mod memory;

pub use filesystem::FileSystemLoader;
pub use memory::MemoryLoader;

pub use fith_compiler::TemplateLoader;

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use fith_core::LoadError;
use fith_parser::{Delimiters, Parser, Template};

/// Parsed templates by name.
#[derive(Debug, Default)]
struct ParsedCache {
    templates: RwLock<FxHashMap<String, Arc<Template>>>,
}

impl ParsedCache {
    fn get(&self, name: &str) -> Option<Arc<Template>> {
        self.templates.read().get(name).cloned()
    }

    fn insert(&self, name: &str, template: Arc<Template>) {
        self.templates.write().insert(name.to_string(), template);
    }

    fn remove(&self, name: &str) {
        self.templates.write().remove(name);
    }

    fn clear(&self) {
        self.templates.write().clear();
    }

    fn len(&self) -> usize {
        self.templates.read().len()
    }
}

fn parse(name: &str, source: &str, delimiters: &Delimiters) -> Result<Arc<Template>, LoadError> {
    Parser::parse_with(source, delimiters)
        .map(Arc::new)
        .map_err(|source| LoadError::Parse {
            name: name.to_string(),
            source,
        })
}
