//! In-Memory Store Implementation
//!
//! Memory backend for tests and development

mod pipeline_store;

pub use pipeline_store::InMemoryPipelineStore;
