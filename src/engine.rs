//! The [`Engine`]: configuration, loader, compiler and functions in one place.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use fith_compiler::{CompiledTemplate, Compiler, TemplateLoader};
use fith_core::{CompileError, FithError, FunctionError, LoadError, Value};
use fith_parser::{Parser, Template};
use fith_registry::FunctionRegistry;
use fith_runtime::{Context, Evaluator};

use crate::{Config, FileSystemLoader};

/// Scope binding holding the name of the template being rendered.
pub const TEMPLATE_NAME: &str = "@template";

/// Name under which [`Engine::render_string`] renders its source.
pub const INLINE_TEMPLATE: &str = "<inline>";

/// Renders templates by name or from source.
///
/// An engine is `Send + Sync`; renders may run concurrently from any number
/// of threads. Each render gets its own [`Context`] and [`Evaluator`]; only
/// the compilation cache and the function registry are shared.
///
/// ```
/// use std::sync::Arc;
/// use fith::{Config, Engine, MemoryLoader, Value};
///
/// let loader = MemoryLoader::default()
///     .with_template("base", r#"<title>{{block "title"}}Untitled{{end}}</title>"#)
///     .with_template("home", r#"{{extends "base"}}{{block "title"}}{{.Title | upper}}{{end}}"#);
/// let engine = Engine::with_loader(Config::default(), loader).unwrap();
///
/// let data: Value = [("Title", "home")].into_iter().collect();
/// assert_eq!(engine.render("home", data).unwrap(), "<title>HOME</title>");
/// ```
pub struct Engine {
    config: Config,
    loader: Arc<dyn TemplateLoader>,
    compiler: Compiler,
    registry: FunctionRegistry,
}

impl Engine {
    /// Create an engine that loads templates from `config.template_dir`.
    pub fn new(config: Config) -> Result<Self, FithError> {
        config.validate()?;
        let loader = FileSystemLoader::from_config(&config);
        Self::build(config, Arc::new(loader))
    }

    /// Create an engine that loads templates through `loader`.
    ///
    /// The loader is responsible for parsing with the configured delimiters.
    pub fn with_loader(config: Config, loader: impl TemplateLoader + 'static) -> Result<Self, FithError> {
        config.validate()?;
        Self::build(config, Arc::new(loader))
    }

    fn build(config: Config, loader: Arc<dyn TemplateLoader>) -> Result<Self, FithError> {
        let registry = FunctionRegistry::new();
        fith_modules::install_builtins(&registry);
        debug!(
            functions = registry.len(),
            cache_enabled = config.cache_enabled,
            "engine created"
        );
        Ok(Self {
            compiler: Compiler::new(Arc::clone(&loader)),
            config,
            loader,
            registry,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn loader(&self) -> &Arc<dyn TemplateLoader> {
        &self.loader
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    /// Register a template function, replacing any function of the same
    /// name, built-ins included.
    pub fn register_function<F>(&self, name: &str, f: F)
    where
        F: Fn(&[Value]) -> Result<Value, FunctionError> + Send + Sync + 'static,
    {
        self.registry.register(name, f);
    }

    pub fn exists(&self, name: &str) -> bool {
        self.loader.exists(name)
    }

    /// Drop every compiled template and every memoised parse.
    pub fn clear_cache(&self) {
        self.compiler.clear_cache();
        self.loader.clear_cache();
    }

    // =========================================================================
    // Compilation
    // =========================================================================

    /// Compile the template called `name`.
    ///
    /// With caching enabled the artifact is shared with later calls;
    /// otherwise every call compiles afresh.
    pub fn compile(&self, name: &str) -> Result<Arc<CompiledTemplate>, FithError> {
        if self.config.cache_enabled {
            return Ok(self.compiler.compile(name)?);
        }

        let template = self.loader.load(name).map_err(|source| match source {
            LoadError::NotFound { name } => CompileError::TemplateNotFound { name },
            source => CompileError::Load {
                name: name.to_string(),
                source,
            },
        })?;
        Ok(self.compiler.compile_uncached(name, Template::clone(&template))?)
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Render the template called `name` against `data`.
    ///
    /// `@template` is bound to `name` for the whole render.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn render(&self, name: &str, data: impl Into<Value>) -> Result<String, FithError> {
        let compiled = self.compile(name)?;
        let mut ctx = Context::new(data);
        ctx.set(TEMPLATE_NAME, name);
        self.execute(&compiled, &mut ctx)
    }

    /// Render `source` directly, without caching.
    ///
    /// `include` and `extends` inside `source` still resolve through the
    /// loader.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn render_string(&self, source: &str, data: impl Into<Value>) -> Result<String, FithError> {
        let template = Parser::parse_with(source, &self.config.to_delimiters())?;
        let compiled = self.compiler.compile_uncached(INLINE_TEMPLATE, template)?;
        let mut ctx = Context::new(data);
        self.execute(&compiled, &mut ctx)
    }

    fn execute(&self, compiled: &CompiledTemplate, ctx: &mut Context) -> Result<String, FithError> {
        let mut evaluator = Evaluator::new(&self.registry, self.loader.as_ref(), self.config.render_options());
        Ok(evaluator.render(compiled, ctx)?)
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("compiler", &self.compiler)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
