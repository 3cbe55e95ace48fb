//! Record store implementations.

pub mod memory;

pub use memory::MemoryWorkStore;
