//! Source editor adapters.

mod local;
mod memory;

pub use local::LocalSourceEditor;
pub use memory::MemorySourceEditor;
