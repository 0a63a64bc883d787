//! Test case templates
//!
//! A versioned catalog of per-test-type templates and the placeholder
//! engine that renders them.

pub mod catalog;
pub mod engine;
pub mod error;

pub use catalog::{RenderedTemplate, TemplateCatalog, TestTemplate, BUILTIN_CATALOG_VERSION};
pub use engine::{TemplateEngine, TemplateVariables};
pub use error::TemplateError;
