//! Fith Compiler
//!
//! Turns parsed templates into shareable [`CompiledTemplate`]s.
//!
//! ## Pipeline
//!
//! - **Resolution**: discover every template pulled in through `include` and
//!   `extends`, failing on the first missing target
//! - **Optimization**: fold `if` nodes whose condition is a literal boolean
//! - **Caching**: store the result under a [`CacheKey`] derived from the
//!   template's logical name
//!
//! ## Modules
//!
//! - [`cache`]: Compiled-template cache and cache keys
//! - [`loader`]: The [`TemplateLoader`] interface
//! - [`optimizer`]: Constant-condition folding
//! - [`resolver`]: Dependency discovery and the dependency graph

pub mod cache;
mod compiled;
pub mod loader;
pub mod optimizer;
pub mod resolver;

pub use cache::{CacheKey, CompilationCache};
pub use compiled::CompiledTemplate;
pub use loader::TemplateLoader;
pub use optimizer::{optimize, optimize_nodes};
pub use resolver::{Dependencies, DependencyResolver};

pub use fith_core::CompileError;

use std::sync::Arc;

use fith_core::LoadError;
use fith_parser::Template;
use tracing::debug;

/// Compiles templates by name through a loader, caching the results.
pub struct Compiler {
    loader: Arc<dyn TemplateLoader>,
    cache: CompilationCache,
}

impl Compiler {
    pub fn new(loader: Arc<dyn TemplateLoader>) -> Self {
        Self {
            loader,
            cache: CompilationCache::new(),
        }
    }

    pub fn loader(&self) -> &Arc<dyn TemplateLoader> {
        &self.loader
    }

    pub fn cache(&self) -> &CompilationCache {
        &self.cache
    }

    /// Compile the template called `name`, returning the cached artifact if
    /// one exists.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile(&self, name: &str) -> Result<Arc<CompiledTemplate>, CompileError> {
        let key = CacheKey::from_name(name);
        if let Some(compiled) = self.cache.get(key) {
            debug!(template = name, %key, "compilation cache hit");
            return Ok(compiled);
        }
        debug!(template = name, %key, "compilation cache miss");

        let template = self.loader.load(name).map_err(|source| match source {
            LoadError::NotFound { name } => CompileError::TemplateNotFound { name },
            source => CompileError::Load {
                name: name.to_string(),
                source,
            },
        })?;

        let compiled = Arc::new(self.build(name, Template::clone(&template), Some(key))?);
        self.cache.insert(key, Arc::clone(&compiled));
        Ok(compiled)
    }

    /// Compile an already-parsed template without touching the cache.
    ///
    /// Used for one-off templates that have no stable name. Dependencies are
    /// still resolved through the loader.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile_uncached(
        &self,
        name: &str,
        template: Template,
    ) -> Result<Arc<CompiledTemplate>, CompileError> {
        self.build(name, template, None).map(Arc::new)
    }

    /// Drop every cached compilation.
    pub fn clear_cache(&self) {
        debug!(entries = self.cache.len(), "clearing compilation cache");
        self.cache.clear();
    }

    fn build(
        &self,
        name: &str,
        template: Template,
        cache_key: Option<CacheKey>,
    ) -> Result<CompiledTemplate, CompileError> {
        let deps = DependencyResolver::new(self.loader.as_ref()).resolve(name, &template)?;
        Ok(CompiledTemplate {
            name: name.to_string(),
            ast: optimize(template),
            dependencies: deps.order,
            cache_key,
            is_optimized: true,
        })
    }
}

impl std::fmt::Debug for Compiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compiler")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use fith_parser::Parser;
    use parking_lot::Mutex;
    use rustc_hash::FxHashMap;
    use tracing_test::traced_test;

    /// In-memory loader that counts loads per name.
    pub(crate) struct TestLoader {
        sources: FxHashMap<String, String>,
        loads: Mutex<FxHashMap<String, usize>>,
    }

    impl TestLoader {
        pub(crate) fn new(templates: &[(&str, &str)]) -> Self {
            Self {
                sources: templates
                    .iter()
                    .map(|(name, source)| (name.to_string(), source.to_string()))
                    .collect(),
                loads: Mutex::new(FxHashMap::default()),
            }
        }

        pub(crate) fn load_count(&self, name: &str) -> usize {
            self.loads.lock().get(name).copied().unwrap_or(0)
        }
    }

    impl TemplateLoader for TestLoader {
        fn load(&self, name: &str) -> Result<Arc<Template>, LoadError> {
            *self.loads.lock().entry(name.to_string()).or_default() += 1;
            let source = self.sources.get(name).ok_or_else(|| LoadError::NotFound {
                name: name.to_string(),
            })?;
            Parser::parse(source)
                .map(Arc::new)
                .map_err(|source| LoadError::Parse {
                    name: name.to_string(),
                    source,
                })
        }

        fn exists(&self, name: &str) -> bool {
            self.sources.contains_key(name)
        }
    }

    fn compiler(templates: &[(&str, &str)]) -> (Compiler, Arc<TestLoader>) {
        let loader = Arc::new(TestLoader::new(templates));
        (Compiler::new(loader.clone()), loader)
    }

    // =========================================
    // Cached compilation
    // =========================================

    #[test]
    fn compile_resolves_and_optimizes() {
        let (compiler, _) = compiler(&[
            ("page", r#"{{extends "base"}}{{block "body"}}{{if true}}hi{{end}}{{end}}"#),
            ("base", r#"<{{block "body"}}{{end}}>{{include "footer"}}"#),
            ("footer", "bye"),
        ]);
        let compiled = compiler.compile("page").unwrap();
        assert_eq!(compiled.name, "page");
        assert_eq!(compiled.dependencies, ["base", "footer"]);
        assert!(compiled.depends_on("footer"));
        assert!(compiled.is_optimized);
        assert_eq!(compiled.cache_key, Some(CacheKey::from_name("page")));
    }

    #[test]
    fn second_compile_is_a_cache_hit() {
        let (compiler, loader) = compiler(&[("page", "hello")]);
        let first = compiler.compile("page").unwrap();
        let second = compiler.compile("page").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loader.load_count("page"), 1);
        assert_eq!(compiler.cache().len(), 1);
    }

    #[test]
    fn clear_cache_forces_recompilation() {
        let (compiler, loader) = compiler(&[("page", "hello")]);
        compiler.compile("page").unwrap();
        compiler.clear_cache();
        assert!(compiler.cache().is_empty());
        compiler.compile("page").unwrap();
        assert_eq!(loader.load_count("page"), 2);
    }

    #[traced_test]
    #[test]
    fn cache_activity_is_logged() {
        let (compiler, _) = compiler(&[("page", "hello")]);
        compiler.compile("page").unwrap();
        compiler.compile("page").unwrap();
        assert!(logs_contain("compilation cache miss"));
        assert!(logs_contain("compilation cache hit"));
    }

    // =========================================
    // Errors
    // =========================================

    #[test]
    fn missing_root_is_template_not_found() {
        let (compiler, _) = compiler(&[]);
        let err = compiler.compile("nope").unwrap_err();
        assert_eq!(err.to_string(), "template 'nope' not found");
    }

    #[test]
    fn missing_dependency_fails_and_is_not_cached() {
        let (compiler, _) = compiler(&[("page", r#"{{include "missing"}}"#)]);
        let err = compiler.compile("page").unwrap_err();
        assert_eq!(
            err,
            CompileError::TemplateNotFound {
                name: "missing".into()
            }
        );
        assert!(compiler.cache().is_empty());
    }

    #[test]
    fn broken_dependency_reports_load_error() {
        let (compiler, _) = compiler(&[("page", r#"{{include "bad"}}"#), ("bad", "{{if .X}}")]);
        let err = compiler.compile("page").unwrap_err();
        assert!(matches!(err, CompileError::Load { ref name, .. } if name == "bad"));
    }

    #[traced_test]
    #[test]
    fn cyclic_dependencies_compile_with_a_warning() {
        let (compiler, _) = compiler(&[
            ("a", r#"{{include "b"}}"#),
            ("b", r#"{{include "a"}}"#),
        ]);
        let compiled = compiler.compile("a").unwrap();
        assert_eq!(compiled.dependencies, ["b"]);
        assert!(logs_contain("cycle"));
    }

    // =========================================
    // Uncached compilation
    // =========================================

    #[test]
    fn uncached_compile_has_no_key() {
        let (compiler, _) = compiler(&[("part", "x")]);
        let template = Parser::parse(r#"{{include "part"}}{{if false}}gone{{end}}"#).unwrap();
        let compiled = compiler.compile_uncached("inline", template).unwrap();
        assert_eq!(compiled.cache_key, None);
        assert_eq!(compiled.dependencies, ["part"]);
        assert_eq!(compiled.ast.nodes.len(), 1);
        assert!(compiler.cache().is_empty());
    }
}
