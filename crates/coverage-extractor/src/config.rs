//! Configuration for the Extractor

use coverage_domain::FieldSchema;
use serde::{Deserialize, Serialize};

/// Configuration for the Extractor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Maximum input text length (characters)
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,

    /// Field names to extract; the dental insurance fields when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}

fn default_max_text_length() -> usize {
    50_000
}

impl ExtractorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_text_length == 0 {
            return Err("max_text_length must be greater than 0".to_string());
        }
        self.schema().map(|_| ())
    }

    /// Build the field schema this configuration asks for
    pub fn schema(&self) -> Result<FieldSchema, String> {
        match &self.fields {
            Some(fields) => FieldSchema::new(fields.iter().cloned()),
            None => Ok(FieldSchema::dental_insurance()),
        }
    }

    /// Override the extracted field names
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_text_length: default_max_text_length(),
            fields: None,
        }
    }
}

impl ExtractorConfig {
    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str)
            .map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
