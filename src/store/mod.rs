//! Cache backends. Nothing is persisted beyond the running process.
pub mod memory;

pub use memory::MemoryCache;
