// Application Layer - Use Cases and Business Logic

pub mod queue_store;

// Re-exports
pub use queue_store::QueueStore;
