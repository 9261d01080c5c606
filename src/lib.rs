pub mod ast;
pub mod dialect;
pub mod engine;
pub mod engine_manager;
pub mod error;
pub mod render;
pub mod resolve;
pub mod types;
pub mod value;
pub mod visitor;

pub use ast::{Node, Operator};
pub use engine::QueryEngine;
pub use engine_manager::{EngineManager, Q};
pub use error::QueryError;
pub use render::{RenderOptions, Rendered, VariableBindings};
pub use resolve::{PropertyTypes, Resolved, SchemaLookup};
pub use types::TypeTag;
pub use uquery_macros::Bindings;
pub use value::{ToValue, Value};

pub type Result<T> = std::result::Result<T, QueryError>;
