//! Casegen Persistence Layer
//!
//! Infrastructure implementations of [`casegen_domain::PipelineStore`].
//!
//! ## Features
//!
//! - **In-Memory Store**: Thread-safe in-memory implementation for testing and development
//!
//! ## Usage
//!
//! ```ignore
//! use casegen_persistence::memory::InMemoryPipelineStore;
//! use casegen_domain::PipelineStore;
//! use std::sync::Arc;
//!
//! let store: Arc<dyn PipelineStore> = Arc::new(InMemoryPipelineStore::new());
//! ```

#[cfg(feature = "memory")]
pub mod memory;

#[cfg(feature = "memory")]
pub use memory::InMemoryPipelineStore;
