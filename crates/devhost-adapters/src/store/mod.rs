//! Resource store adapters.

mod memory;
mod toml_store;

pub use memory::MemoryResourceStore;
pub use toml_store::TomlResourceStore;
