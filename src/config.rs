//! Engine configuration.

use std::path::PathBuf;

use fith_core::ConfigError;
use fith_parser::Delimiters;
use fith_runtime::RenderOptions;

/// Extensions tried by the file-system loader when none are configured.
pub const DEFAULT_EXTENSIONS: [&str; 3] = [".html", ".tpl", ".txt"];

/// Configuration for an [`Engine`](crate::Engine).
///
/// Built with chained setters on top of [`Config::default`]:
///
/// ```
/// use fith::Config;
///
/// let config = Config::default()
///     .delimiters("<%", "%>")
///     .strict_variables(false)
///     .max_include_depth(8);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// String that opens an action. Default `{{`.
    pub open_delimiter: String,
    /// String that closes an action. Default `}}`.
    pub close_delimiter: String,
    /// Maximum number of nested includes. Default 100.
    pub max_include_depth: usize,
    /// Reuse compiled templates between renders. Default `true`.
    pub cache_enabled: bool,
    /// Fail on unresolved variables instead of rendering them empty.
    /// Default `true`.
    pub strict_variables: bool,
    /// Base directory of the file-system loader. Default `templates`.
    pub template_dir: PathBuf,
    /// Extensions the file-system loader appends to template names, in
    /// lookup order.
    pub extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            open_delimiter: "{{".to_string(),
            close_delimiter: "}}".to_string(),
            max_include_depth: 100,
            cache_enabled: true,
            strict_variables: true,
            template_dir: PathBuf::from("templates"),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

impl Config {
    pub fn delimiters(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.open_delimiter = open.into();
        self.close_delimiter = close.into();
        self
    }

    pub fn max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    pub fn cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    pub fn strict_variables(mut self, strict: bool) -> Self {
        self.strict_variables = strict;
        self
    }

    pub fn template_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.template_dir = dir.into();
        self
    }

    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Check the configuration for values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.open_delimiter.is_empty() || self.close_delimiter.is_empty() {
            return Err(ConfigError::EmptyDelimiter);
        }
        if self.open_delimiter == self.close_delimiter {
            return Err(ConfigError::IdenticalDelimiters(self.open_delimiter.clone()));
        }
        if self.max_include_depth < 1 {
            return Err(ConfigError::InvalidIncludeDepth(self.max_include_depth));
        }
        if self.extensions.is_empty() {
            return Err(ConfigError::NoExtensions);
        }
        Ok(())
    }

    /// The delimiter pair handed to the parser.
    pub fn to_delimiters(&self) -> Delimiters {
        Delimiters::new(&self.open_delimiter, &self.close_delimiter)
    }

    /// The subset of the configuration a single render needs.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            strict_variables: self.strict_variables,
            max_include_depth: self.max_include_depth,
        }
    }
}
