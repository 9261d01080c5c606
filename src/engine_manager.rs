use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::Result;
use crate::engine::QueryEngine;
use crate::error::QueryError;

/// Name under which [`EngineManager::engine`] looks up its engine.
pub const DEFAULT_ENGINE_NAME: &str = "default";

/// The global registry of query engines.
pub static Q: LazyLock<EngineManager> = LazyLock::new(EngineManager::new);

/// A registry of [`QueryEngine`]s keyed by name.
///
/// Engines are shared as `Arc`s, so one registered engine can serve any number of
/// threads translating at the same time.
pub struct EngineManager {
    engines: DashMap<String, Arc<QueryEngine>>,
}

impl Default for EngineManager {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineManager {
    pub fn new() -> Self {
        Self {
            engines: DashMap::new(),
        }
    }

    /// Registers `engine` under the name of its dialect.
    pub fn register(&self, engine: QueryEngine) -> Result<()> {
        let name = engine.dialect().name().to_string();
        self.register_as(name, engine)
    }

    /// Registers `engine` under `name`, replacing any engine of that name except the
    /// default one.
    ///
    /// # Errors
    /// Returns an error if `name` is the default name and an engine is already registered
    /// under it.
    pub fn register_as(&self, name: impl Into<String>, engine: QueryEngine) -> Result<()> {
        match self.engines.entry(name.into()) {
            Entry::Occupied(e) if e.key() == DEFAULT_ENGINE_NAME => Err(
                QueryError::InvalidArgument(format!(
                    "Engine with name '{}' already registered",
                    e.key()
                )),
            ),
            entry => {
                entry.insert(Arc::new(engine));
                Ok(())
            }
        }
    }

    /// The engine registered under the default name.
    pub fn engine(&self) -> Option<Arc<QueryEngine>> {
        self.engine_by_name(DEFAULT_ENGINE_NAME)
    }

    pub fn engine_by_name(&self, name: &str) -> Option<Arc<QueryEngine>> {
        self.engines.get(name).map(|v| v.value().clone())
    }
}
