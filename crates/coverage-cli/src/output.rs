//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use coverage_domain::{DecodeQuality, Decoded, FieldRecord, ProcedureRecord};
use coverage_extractor::ExtractionResult;
use serde::{Serialize, Serializer};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

/// JSON document printed for an extraction; absent parts are omitted
#[derive(Serialize)]
struct ExtractionJson<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    insurance_data: Option<FieldsJson<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    procedures: Option<Vec<ProcedureJson<'a>>>,
    decode: DecodeJson,
}

/// Field record as a JSON object in schema order
struct FieldsJson<'a>(&'a FieldRecord);

impl Serialize for FieldsJson<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter())
    }
}

#[derive(Serialize)]
struct ProcedureJson<'a> {
    code: &'a str,
    frequency: &'a str,
    limited_to: &'a str,
    every: &'a str,
    duration: &'a str,
}

impl<'a> From<&'a ProcedureRecord> for ProcedureJson<'a> {
    fn from(record: &'a ProcedureRecord) -> Self {
        Self {
            code: &record.code,
            frequency: &record.frequency,
            limited_to: &record.limited_to,
            every: &record.every,
            duration: &record.duration,
        }
    }
}

#[derive(Serialize)]
struct DecodeJson {
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    procedures: Option<&'static str>,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a full extraction result.
    pub fn format_result(&self, result: &ExtractionResult) -> Result<String> {
        let fields = Decoded::new(&result.fields, result.field_quality);
        let procedures = Decoded::new(result.procedures.as_slice(), result.procedure_quality);
        self.render(Some(fields), Some(procedures))
    }

    /// Format a field record on its own.
    pub fn format_fields(&self, fields: &Decoded<FieldRecord>) -> Result<String> {
        self.render(Some(Decoded::new(&fields.value, fields.quality)), None)
    }

    /// Format a procedure list on its own.
    pub fn format_procedures(&self, procedures: &Decoded<Vec<ProcedureRecord>>) -> Result<String> {
        self.render(
            None,
            Some(Decoded::new(procedures.value.as_slice(), procedures.quality)),
        )
    }

    fn render(
        &self,
        fields: Option<Decoded<&FieldRecord>>,
        procedures: Option<Decoded<&[ProcedureRecord]>>,
    ) -> Result<String> {
        match self.format {
            OutputFormat::Json => Self::render_json(fields, procedures),
            OutputFormat::Table => Ok(self.render_tables(fields, procedures)),
        }
    }

    fn render_json(
        fields: Option<Decoded<&FieldRecord>>,
        procedures: Option<Decoded<&[ProcedureRecord]>>,
    ) -> Result<String> {
        let document = ExtractionJson {
            decode: DecodeJson {
                fields: fields.as_ref().map(|f| f.quality.as_str()),
                procedures: procedures.as_ref().map(|p| p.quality.as_str()),
            },
            insurance_data: fields.map(|f| FieldsJson(f.value)),
            procedures: procedures.map(|p| p.value.iter().map(ProcedureJson::from).collect()),
        };

        Ok(serde_json::to_string_pretty(&document)?)
    }

    fn render_tables(
        &self,
        fields: Option<Decoded<&FieldRecord>>,
        procedures: Option<Decoded<&[ProcedureRecord]>>,
    ) -> String {
        let mut sections = Vec::new();

        if let Some(fields) = fields {
            sections.push(self.fields_table(fields.value));
            sections.push(self.quality_line("Fields", fields.quality));
        }

        if let Some(procedures) = procedures {
            sections.push(self.procedures_table(procedures.value));
            sections.push(self.quality_line("Procedures", procedures.quality));
        }

        sections.join("\n")
    }

    fn fields_table(&self, fields: &FieldRecord) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);

        for (name, value) in fields.iter() {
            builder.push_record([name, value]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    fn procedures_table(&self, procedures: &[ProcedureRecord]) -> String {
        if procedures.is_empty() {
            return self.colorize("No procedures found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["Code", "Frequency", "Limited To", "Every", "Duration"]);

        for procedure in procedures {
            builder.push_record([
                procedure.code.as_str(),
                procedure.frequency.as_str(),
                procedure.limited_to.as_str(),
                procedure.every.as_str(),
                procedure.duration.as_str(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    fn quality_line(&self, what: &str, quality: DecodeQuality) -> String {
        let message = format!("{} decoded: {}", what, quality);
        match quality {
            DecodeQuality::Exact => self.info(&message),
            DecodeQuality::Heuristic | DecodeQuality::Empty => self.warning(&message),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coverage_domain::{enforce, FieldSchema};
    use coverage_extractor::ExtractionMetadata;
    use std::collections::HashMap;

    fn create_test_result() -> ExtractionResult {
        let schema = FieldSchema::new(["Carrier Name", "Subscriber ID"]).unwrap();
        let partial = HashMap::from([("Carrier Name".to_string(), "Cigna".to_string())]);

        ExtractionResult {
            fields: enforce(&partial, &schema),
            procedures: vec![ProcedureRecord {
                code: "D0120".to_string(),
                frequency: "Once Per 6 Months".to_string(),
                limited_to: "2".to_string(),
                every: "1".to_string(),
                duration: "Months".to_string(),
            }],
            field_quality: DecodeQuality::Exact,
            procedure_quality: DecodeQuality::Heuristic,
            metadata: ExtractionMetadata {
                model_name: "mock".to_string(),
                processing_time_ms: 5,
            },
        }
    }

    #[test]
    fn test_json_format() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_result(&create_test_result()).unwrap();

        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["insurance_data"]["Carrier Name"], "Cigna");
        assert_eq!(json["insurance_data"]["Subscriber ID"], "Not Available");
        assert_eq!(json["procedures"][0]["code"], "D0120");
        assert_eq!(json["decode"]["fields"], "exact");
        assert_eq!(json["decode"]["procedures"], "heuristic");
    }

    #[test]
    fn test_json_keeps_schema_order() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_result(&create_test_result()).unwrap();

        let carrier = output.find("Carrier Name").unwrap();
        let subscriber = output.find("Subscriber ID").unwrap();
        assert!(carrier < subscriber);
    }

    #[test]
    fn test_json_procedures_only() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let result = create_test_result();
        let decoded = Decoded::new(result.procedures, DecodeQuality::Exact);

        let output = formatter.format_procedures(&decoded).unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert!(json.get("insurance_data").is_none());
        assert!(json["decode"].get("fields").is_none());
        assert_eq!(json["procedures"][0]["limited_to"], "2");
    }

    #[test]
    fn test_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_result(&create_test_result()).unwrap();

        assert!(output.contains("Field"));
        assert!(output.contains("Cigna"));
        assert!(output.contains("Limited To"));
        assert!(output.contains("D0120"));
        assert!(output.contains("Procedures decoded: heuristic"));
    }

    #[test]
    fn test_empty_procedures_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let decoded = Decoded::new(Vec::new(), DecodeQuality::Empty);

        let output = formatter.format_procedures(&decoded).unwrap();
        assert!(output.contains("No procedures found."));
        assert!(output.contains("⚠ Procedures decoded: empty"));
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let msg = formatter.success("test");
        assert_eq!(msg, "✓ test");
    }
}
