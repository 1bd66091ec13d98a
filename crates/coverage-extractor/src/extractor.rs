//! Core Extractor implementation

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::parser::{parse_field_response, parse_procedure_response};
use crate::prompt::PromptBuilder;
use crate::types::{ExtractionMetadata, ExtractionResult};
use coverage_domain::{
    DecodeQuality, Decoded, FieldRecord, FieldSchema, ModelClient, ProcedureRecord,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// The Extractor turns free-form plan text into a field record and a procedure list
///
/// Both pipelines share the provider read-only; nothing else is shared, so
/// no locking is needed.
pub struct Extractor<L>
where
    L: ModelClient,
{
    llm_provider: Arc<L>,
    schema: FieldSchema,
    config: ExtractorConfig,
}

impl<L> Extractor<L>
where
    L: ModelClient + Send + Sync + 'static,
    L::Error: Into<ExtractorError>,
{
    /// Create a new Extractor
    ///
    /// # Errors
    ///
    /// Returns `ExtractorError::Config` if the configuration is invalid.
    pub fn new(llm_provider: L, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        Self::from_shared(Arc::new(llm_provider), config)
    }

    /// Create a new Extractor around an already shared provider
    pub fn from_shared(
        llm_provider: Arc<L>,
        config: ExtractorConfig,
    ) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;
        let schema = config.schema().map_err(ExtractorError::Config)?;

        Ok(Self {
            llm_provider,
            schema,
            config,
        })
    }

    /// Fields every result carries
    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    /// Name of the model behind the provider
    pub fn model_name(&self) -> &str {
        self.llm_provider.model_name()
    }

    /// Extract fields and procedures from text
    ///
    /// Empty or whitespace-only text short-circuits to an all-sentinel result
    /// without touching the backend. Otherwise both pipelines run concurrently;
    /// the first failure is returned and the other pipeline's result discarded.
    pub async fn run(&self, text: &str) -> Result<ExtractionResult, ExtractorError> {
        if text.trim().is_empty() {
            debug!("Extraction skipped: empty text");
            return Ok(ExtractionResult::unavailable(&self.schema, self.model_name()));
        }
        self.check_length(text)?;

        info!("Starting extraction, text length {}", text.len());
        let start = Instant::now();
        let text: Arc<str> = Arc::from(text);

        let fields_task = self.spawn_fields(Arc::clone(&text));
        let procedures_task = self.spawn_procedures(text);
        let (fields, procedures) = tokio::try_join!(fields_task, procedures_task)?;

        let processing_time_ms = start.elapsed().as_millis() as u64;

        info!(
            "Extraction complete: {}/{} fields ({}), {} procedures ({}) in {} ms",
            fields.value.populated(),
            self.schema.len(),
            fields.quality,
            procedures.value.len(),
            procedures.quality,
            processing_time_ms
        );

        Ok(ExtractionResult {
            fields: fields.value,
            procedures: procedures.value,
            field_quality: fields.quality,
            procedure_quality: procedures.quality,
            metadata: ExtractionMetadata {
                model_name: self.model_name().to_string(),
                processing_time_ms,
            },
        })
    }

    /// Run only the field pipeline, blocking the calling thread
    pub fn extract_fields(&self, text: &str) -> Result<Decoded<FieldRecord>, ExtractorError> {
        if text.trim().is_empty() {
            return Ok(Decoded::new(
                FieldRecord::unavailable(&self.schema),
                DecodeQuality::Empty,
            ));
        }
        self.check_length(text)?;
        field_pipeline(self.llm_provider.as_ref(), text, &self.schema)
    }

    /// Run only the procedure pipeline, blocking the calling thread
    pub fn extract_procedures(
        &self,
        text: &str,
    ) -> Result<Decoded<Vec<ProcedureRecord>>, ExtractorError> {
        if text.trim().is_empty() {
            return Ok(Decoded::new(Vec::new(), DecodeQuality::Empty));
        }
        self.check_length(text)?;
        procedure_pipeline(self.llm_provider.as_ref(), text)
    }

    fn check_length(&self, text: &str) -> Result<(), ExtractorError> {
        let length = text.chars().count();
        if length > self.config.max_text_length {
            return Err(ExtractorError::TextTooLong(length, self.config.max_text_length));
        }
        Ok(())
    }

    /// Launch the field pipeline on the blocking pool
    fn spawn_fields(
        &self,
        text: Arc<str>,
    ) -> impl std::future::Future<Output = Result<Decoded<FieldRecord>, ExtractorError>> {
        let llm = Arc::clone(&self.llm_provider);
        let schema = self.schema.clone();

        // Call in a blocking context since ModelClient is not async
        let handle =
            tokio::task::spawn_blocking(move || field_pipeline(llm.as_ref(), &text, &schema));

        async move {
            handle
                .await
                .map_err(|e| ExtractorError::Task(format!("Field task join error: {}", e)))?
        }
    }

    /// Launch the procedure pipeline on the blocking pool
    fn spawn_procedures(
        &self,
        text: Arc<str>,
    ) -> impl std::future::Future<Output = Result<Decoded<Vec<ProcedureRecord>>, ExtractorError>>
    {
        let llm = Arc::clone(&self.llm_provider);

        let handle = tokio::task::spawn_blocking(move || procedure_pipeline(llm.as_ref(), &text));

        async move {
            handle
                .await
                .map_err(|e| ExtractorError::Task(format!("Procedure task join error: {}", e)))?
        }
    }
}

/// Prompt, complete and decode the field record
fn field_pipeline<L>(
    llm: &L,
    text: &str,
    schema: &FieldSchema,
) -> Result<Decoded<FieldRecord>, ExtractorError>
where
    L: ModelClient + ?Sized,
    L::Error: Into<ExtractorError>,
{
    let start = Instant::now();
    let prompt = PromptBuilder::new(text).field_prompt(schema);
    debug!("Field prompt length: {} chars", prompt.len());

    let llm_start = Instant::now();
    let response = llm.complete(&prompt).map_err(Into::into)?;
    debug!(
        "Field completion: {} chars in {} ms",
        response.len(),
        llm_start.elapsed().as_millis()
    );

    let decoded = parse_field_response(&response, schema);
    debug!(
        "Field pipeline finished in {} ms ({})",
        start.elapsed().as_millis(),
        decoded.quality
    );
    Ok(decoded)
}

/// Prompt, complete and decode the procedure list
fn procedure_pipeline<L>(
    llm: &L,
    text: &str,
) -> Result<Decoded<Vec<ProcedureRecord>>, ExtractorError>
where
    L: ModelClient + ?Sized,
    L::Error: Into<ExtractorError>,
{
    let start = Instant::now();
    let prompt = PromptBuilder::new(text).procedure_prompt();
    debug!("Procedure prompt length: {} chars", prompt.len());

    let response = llm.complete(&prompt).map_err(Into::into)?;
    let decoded = parse_procedure_response(&response);

    debug!(
        "Procedure pipeline finished in {} ms: {} procedures ({})",
        start.elapsed().as_millis(),
        decoded.value.len(),
        decoded.quality
    );
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use coverage_domain::SENTINEL;
    use coverage_llm::{LlmError, MockProvider};

    fn create_test_extractor(llm: MockProvider) -> Extractor<MockProvider> {
        Extractor::new(llm, ExtractorConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_empty_text_skips_backend() {
        let llm = MockProvider::new("{}");
        let extractor = create_test_extractor(llm.clone());

        for text in ["", "   \n\t "] {
            let result = extractor.run(text).await.unwrap();
            assert_eq!(result.fields.len(), 21);
            assert!(result.fields.iter().all(|(_, v)| v == SENTINEL));
            assert!(result.procedures.is_empty());
            assert_eq!(result.field_quality, DecodeQuality::Empty);
        }
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_extract_text_too_long() {
        let extractor = create_test_extractor(MockProvider::new("{}"));

        let long_text = "a".repeat(100_000);
        let result = extractor.run(&long_text).await;
        assert!(matches!(result, Err(ExtractorError::TextTooLong(_, _))));
    }

    #[tokio::test]
    async fn test_long_whitespace_is_empty_not_too_long() {
        let llm = MockProvider::new("{}");
        let extractor = create_test_extractor(llm.clone());
        let blank = " ".repeat(60_000);

        let result = extractor.run(&blank).await.unwrap();
        assert!(result.fields.iter().all(|(_, v)| v == SENTINEL));
        assert_eq!(result.field_quality, DecodeQuality::Empty);

        let fields = extractor.extract_fields(&blank).unwrap();
        assert_eq!(fields.value.populated(), 0);
        let procedures = extractor.extract_procedures(&blank).unwrap();
        assert!(procedures.value.is_empty());

        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_length_limit_counts_characters() {
        let config = ExtractorConfig {
            max_text_length: 10,
            ..ExtractorConfig::default()
        };
        let extractor = Extractor::new(MockProvider::new("[]"), config).unwrap();

        // Ten characters, twenty bytes
        assert!(extractor.run("éééééééééé").await.is_ok());
        assert!(matches!(
            extractor.run("ééééééééééé").await,
            Err(ExtractorError::TextTooLong(11, 10))
        ));
    }

    #[tokio::test]
    async fn test_run_calls_backend_twice() {
        let llm = MockProvider::new("nothing useful");
        let extractor = create_test_extractor(llm.clone());

        let result = extractor.run("Member ID 12345").await.unwrap();
        assert_eq!(llm.call_count(), 2);
        assert_eq!(result.field_quality, DecodeQuality::Empty);
        assert_eq!(result.procedure_quality, DecodeQuality::Empty);
        assert_eq!(result.metadata.model_name, "mock");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ExtractorConfig {
            fields: Some(Vec::new()),
            ..ExtractorConfig::default()
        };
        let result = Extractor::new(MockProvider::default(), config);
        assert!(matches!(result, Err(ExtractorError::Config(_))));
    }

    #[test]
    fn test_extract_fields_blocking() {
        let mut llm = MockProvider::default();
        llm.add_response("FIELDS TO EXTRACT", r#"{"Subscriber ID": "12345"}"#);
        let extractor = create_test_extractor(llm);

        let decoded = extractor.extract_fields("Member ID 12345").unwrap();
        assert_eq!(decoded.quality, DecodeQuality::Exact);
        assert_eq!(decoded.value.get("Subscriber ID"), Some("12345"));
    }

    #[test]
    fn test_extract_procedures_blocking_propagates_errors() {
        let mut llm = MockProvider::default();
        llm.add_error(
            "TEXT TO PARSE",
            LlmError::Backend {
                status: 500,
                body: "boom".to_string(),
            },
        );
        let extractor = create_test_extractor(llm);

        let result = extractor.extract_procedures("D0120 Once Per 6 Months");
        assert!(matches!(result, Err(ExtractorError::Backend { status: 500, .. })));
    }
}
