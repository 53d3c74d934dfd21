use fith_parser::Template;

use crate::CacheKey;

/// The output of compilation: an optimized AST plus its resolved
/// dependencies.
///
/// Immutable once built and shared between concurrent renders behind an
/// `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledTemplate {
    /// Logical name the template was compiled under.
    pub name: String,
    /// The optimized AST.
    pub ast: Template,
    /// Every template reachable through `include`/`extends`, each once, in
    /// first-discovery order.
    pub dependencies: Vec<String>,
    /// Cache key, or `None` for uncached compilations.
    pub cache_key: Option<CacheKey>,
    pub is_optimized: bool,
}

impl CompiledTemplate {
    pub fn depends_on(&self, name: &str) -> bool {
        self.dependencies.iter().any(|d| d == name)
    }
}
