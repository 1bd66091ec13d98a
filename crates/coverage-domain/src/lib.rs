//! Coverage Domain Layer
//!
//! This crate contains the core domain model for coverage extraction.
//! It has ZERO external dependencies and defines the value types and trait
//! interfaces that the infrastructure and application crates depend upon.
//!
//! ## Key Concepts
//!
//! - **FieldSchema**: The ordered set of plan fields an extraction must produce
//! - **FieldRecord**: One value per schema field, never more, never fewer
//! - **Sentinel**: `"Not Available"`, the value of any field that could not be determined
//! - **ProcedureRecord**: A procedure code with its five frequency attributes
//! - **DecodeQuality**: How confidently a model response was decoded
//!
//! ## Architecture
//!
//! - No external crate dependencies
//! - Pure logic only (schema enforcement lives here)
//! - Model backends are reached through the traits in [`traits`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod procedure;
pub mod quality;
pub mod schema;
pub mod traits;

// Re-exports for convenience
pub use procedure::ProcedureRecord;
pub use quality::{DecodeQuality, Decoded};
pub use schema::{enforce, FieldRecord, FieldSchema, SENTINEL};
pub use traits::{ModelCatalog, ModelClient};
