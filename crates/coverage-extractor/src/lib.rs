//! Coverage Extractor
//!
//! Turns free-form dental plan text into a fixed-schema field record and a
//! list of procedure frequency records using a local LLM.
//!
//! # Architecture
//!
//! ```text
//!          ┌─> field prompt ─────> LLM ─> field parser ─────┐
//! Text ────┤                                                ├─> ExtractionResult
//!          └─> procedure prompt ─> LLM ─> procedure parser ─┘
//! ```
//!
//! The two pipelines are independent and run concurrently. Decoding never
//! fails: malformed model output degrades to a line-based fallback, then to
//! sentinel values, and the result says how it was decoded.
//!
//! # Example Usage
//!
//! ```no_run
//! use coverage_extractor::{Extractor, ExtractorConfig};
//! use coverage_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new("[]");
//! let extractor = Extractor::new(llm, ExtractorConfig::default())?;
//!
//! let result = extractor.run("Cigna Dental PPO\nMember ID: 12345").await?;
//!
//! println!("Populated: {} fields", result.fields.populated());
//! println!("Procedures: {}", result.procedures.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod error;
mod config;
mod types;
mod prompt;
mod parser;
mod extractor;


pub use error::ExtractorError;
pub use config::ExtractorConfig;
pub use types::{ExtractionMetadata, ExtractionResult};
pub use prompt::PromptBuilder;
pub use parser::{parse_field_response, parse_procedure_response};
pub use extractor::Extractor;
