use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, trace};

use fith_core::LoadError;
use fith_parser::{Delimiters, Template};

use super::{ParsedCache, TemplateLoader, parse};
use crate::Config;

/// Loads templates from files under a base directory.
///
/// A name such as `layouts/main` is resolved by appending each configured
/// extension in turn (`layouts/main.html`, `layouts/main.tpl`, ...). A name
/// that already ends in one of the extensions is also tried as-is. Names
/// that would leave the base directory never resolve.
#[derive(Debug)]
pub struct FileSystemLoader {
    base_dir: PathBuf,
    extensions: Vec<String>,
    delimiters: Delimiters,
    parsed: ParsedCache,
}

impl FileSystemLoader {
    pub fn new(base_dir: impl Into<PathBuf>, extensions: Vec<String>, delimiters: Delimiters) -> Self {
        Self {
            base_dir: base_dir.into(),
            extensions,
            delimiters,
            parsed: ParsedCache::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.template_dir.clone(),
            config.extensions.clone(),
            config.to_delimiters(),
        )
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// The file `name` resolves to, if any.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let relative = Path::new(name);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return None;
        }

        for ext in &self.extensions {
            let candidate = self.base_dir.join(format!("{name}{ext}"));
            if candidate.is_file() {
                return Some(candidate);
            }
            if name.ends_with(ext.as_str()) {
                let candidate = self.base_dir.join(relative);
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }
        None
    }

    /// Number of memoised parses.
    pub fn parsed_len(&self) -> usize {
        self.parsed.len()
    }
}

impl TemplateLoader for FileSystemLoader {
    fn load(&self, name: &str) -> Result<Arc<Template>, LoadError> {
        if let Some(template) = self.parsed.get(name) {
            return Ok(template);
        }

        let path = self.resolve(name).ok_or_else(|| LoadError::NotFound {
            name: name.to_string(),
        })?;
        let source = fs::read_to_string(&path).map_err(|e| LoadError::Io {
            name: name.to_string(),
            message: e.to_string(),
        })?;
        let template = parse(name, &source, &self.delimiters)?;

        trace!(template = name, path = %path.display(), "parsed template file");
        self.parsed.insert(name, Arc::clone(&template));
        Ok(template)
    }

    fn exists(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    fn clear_cache(&self) {
        debug!(entries = self.parsed.len(), "clearing parsed template cache");
        self.parsed.clear();
    }
}
