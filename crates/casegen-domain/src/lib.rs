#![warn(missing_docs)]

//! Casegen domain layer
//!
//! Records that flow through the requirement → feature → test case →
//! evaluation pipeline, and the storage port the pipeline writes through.
//! The storage implementation itself lives outside this crate.

pub mod error;
pub mod models;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use models::*;
pub use store::PipelineStore;
