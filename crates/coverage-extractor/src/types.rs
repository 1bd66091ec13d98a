//! Result types for extraction

use coverage_domain::{DecodeQuality, FieldRecord, FieldSchema, ProcedureRecord};

/// Result of one extraction run
///
/// Created fresh per request and never modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    /// One value per schema field
    pub fields: FieldRecord,

    /// Procedure codes in the order the model emitted them
    pub procedures: Vec<ProcedureRecord>,

    /// How the field response was decoded
    pub field_quality: DecodeQuality,

    /// How the procedure response was decoded
    pub procedure_quality: DecodeQuality,

    /// Metadata about the extraction
    pub metadata: ExtractionMetadata,
}

impl ExtractionResult {
    /// All-sentinel fields and no procedures, produced without a model call
    pub fn unavailable(schema: &FieldSchema, model_name: impl Into<String>) -> Self {
        Self {
            fields: FieldRecord::unavailable(schema),
            procedures: Vec::new(),
            field_quality: DecodeQuality::Empty,
            procedure_quality: DecodeQuality::Empty,
            metadata: ExtractionMetadata {
                model_name: model_name.into(),
                processing_time_ms: 0,
            },
        }
    }
}

/// Metadata about an extraction operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionMetadata {
    /// Name of the LLM model used
    pub model_name: String,

    /// Wall-clock processing time in milliseconds
    pub processing_time_ms: u64,
}
