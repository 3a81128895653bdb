// Infrastructure bundled with core (no external dependencies)

pub mod memory;

pub use memory::{MemoryPayloadStore, MemoryQueueRegistry};
