#![warn(missing_docs)]

//! Requirement parsing for casegen
//!
//! Turns free-form seat-control requirement text into structured features.
//! Everything here is keyword and regex driven: sentences are split on
//! terminators, feature categories and priority are detected by substring
//! membership against a [`Taxonomy`], and numeric ranges, measured values and
//! limits are pulled out with regular expressions.

pub mod classifier;
pub mod error;
pub mod extractor;
pub mod parser;
pub mod splitter;
pub mod taxonomy;

pub use classifier::FeatureClassifier;
pub use error::ParseError;
pub use extractor::{ExtractedDuration, ExtractedRange, ExtractedValue, Extraction, ParameterExtractor};
pub use parser::RequirementParser;
pub use splitter::SentenceSplitter;
pub use taxonomy::{FeatureCategory, PriorityKeywords, Taxonomy};
