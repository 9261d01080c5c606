use crate::Result;
use crate::ast::Node;
use crate::dialect::Dialect;
use crate::render::{self, RenderOptions, Rendered, VariableBindings};
use crate::resolve::{self, Resolved, SchemaLookup};
use log::{Level, debug, log_enabled};
use std::sync::Arc;
use std::time::Instant;

/// Translates query trees into SQL for one dialect.
///
/// This handles:
/// 1. Resolving property types against the schema lookup
/// 2. Rendering the resolved tree, substituting variables from the bindings
/// 3. Logging the generated SQL and its parameters
#[derive(Clone)]
pub struct QueryEngine {
    dialect: Arc<dyn Dialect>,
    options: RenderOptions,
}

impl QueryEngine {
    pub fn new(dialect: impl Dialect + 'static) -> Self {
        Self {
            dialect: Arc::new(dialect),
            options: RenderOptions::default(),
        }
    }

    pub fn options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    pub fn render_options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn resolve(&self, tree: Node, schema: &dyn SchemaLookup) -> Result<Resolved> {
        resolve::resolve_bounded(tree, schema, self.options.max_depth)
    }

    pub fn render(&self, resolved: Resolved, bindings: &dyn VariableBindings) -> Result<Rendered> {
        render::render(resolved, self.dialect.as_ref(), bindings, &self.options)
    }

    /// Resolves and renders `tree` in one go.
    pub fn translate(
        &self,
        tree: Node,
        schema: &dyn SchemaLookup,
        bindings: &dyn VariableBindings,
    ) -> Result<Rendered> {
        let start = Instant::now();
        let query = log_enabled!(Level::Debug).then(|| tree.to_string());
        let result = self
            .resolve(tree, schema)
            .and_then(|resolved| self.render(resolved, bindings));
        let Some(query) = query else {
            return result;
        };
        let elapsed = start.elapsed().as_micros();

        match &result {
            Ok(rendered) => debug!(
                "Translate: dialect={}, query={}, sql={}, params={:?}, elapsed={}us",
                self.dialect.name(),
                query,
                &rendered.sql,
                &rendered.params,
                elapsed
            ),
            Err(e) => debug!(
                "Translate: dialect={}, query={}, elapsed={}us, error={}",
                self.dialect.name(),
                query,
                elapsed,
                e
            ),
        }

        result
    }
}

impl std::fmt::Debug for QueryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryEngine")
            .field("dialect", &self.dialect.name())
            .field("options", &self.options)
            .finish()
    }
}
