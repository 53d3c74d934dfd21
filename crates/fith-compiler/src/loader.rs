//! The template source interface the compiler and runtime consume.

use std::sync::Arc;

use fith_core::LoadError;
use fith_parser::Template;

/// Produces parsed templates by logical name.
///
/// Implementations must be safe to call repeatedly for the same name and
/// from several threads at once; whether they memoise is up to them.
pub trait TemplateLoader: Send + Sync {
    /// Load and parse the template called `name`.
    fn load(&self, name: &str) -> Result<Arc<Template>, LoadError>;

    /// Whether a template called `name` exists.
    fn exists(&self, name: &str) -> bool;

    /// Forget any memoised parse results.
    fn clear_cache(&self) {}
}

impl<L: TemplateLoader + ?Sized> TemplateLoader for Arc<L> {
    fn load(&self, name: &str) -> Result<Arc<Template>, LoadError> {
        (**self).load(name)
    }

    fn exists(&self, name: &str) -> bool {
        (**self).exists(name)
    }

    fn clear_cache(&self) {
        (**self).clear_cache()
    }
}

impl<L: TemplateLoader + ?Sized> TemplateLoader for &L {
    fn load(&self, name: &str) -> Result<Arc<Template>, LoadError> {
        (**self).load(name)
    }

    fn exists(&self, name: &str) -> bool {
        (**self).exists(name)
    }

    fn clear_cache(&self) {
        (**self).clear_cache()
    }
}
