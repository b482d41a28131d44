pub mod cache;
pub mod config;
pub mod error;
pub mod graph;
pub mod llm;
pub mod qa;
pub mod server;

pub use config::Config;
pub use error::{KgError, Result};
pub use graph::{GraphView, KnowledgeGraph, Relation};
pub use qa::{Assistant, Mode};
