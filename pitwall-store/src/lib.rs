//! Pitwall record store
//!
//! Provides the in-memory `RecordStore` implementation and the CSV bulk
//! loader that fills it from a directory of flat columnar files.

pub mod loader;
pub mod memory;

pub use loader::{load_dir, LoadStats, TableStats};
pub use memory::{MemoryStore, Table};
