//! Knowledge store adapters.

mod json_file;
mod memory;

pub use json_file::{FORMAT_VERSION, JsonFileKnowledgeStore};
pub use memory::InMemoryKnowledgeStore;
