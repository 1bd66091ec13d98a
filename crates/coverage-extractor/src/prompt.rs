//! LLM prompt engineering for field and procedure extraction
//!
//! Both prompts are pure functions of the source text (and schema); they
//! carry the exact output contract the parsers expect.

use coverage_domain::{FieldSchema, SENTINEL};

/// Fields whose numeric values the model tends to get wrong
const NUMERIC_FIELDS: &[&str] = &[
    "Family Maximum",
    "Family Max. Remaining",
    "Individual Maximum",
    "Individual Max. Remaining",
    "Family Deductible",
    "Family Deductible Remaining",
    "Individual Deductible",
    "Individual Deductible Remaining",
];

/// Rules that only apply when every listed field is requested
const FIELD_RULES: &[(&[&str], &str)] = &[
    (
        &["Carrier Name", "Employer"],
        "For both \"Carrier Name\" and \"Employer\" fields, use the insurance company name found in the text (e.g., if \"Cigna\" is found, use it for both fields).",
    ),
    (
        &["Plan Reset Date"],
        "Return \"Plan Reset Date\" exactly as it appears after \"Plan Renews |\" in the raw text (e.g., \"Every Calendar Year\").",
    ),
    (
        &["Insurance Type"],
        "Default \"Insurance Type\" to \"dental\" if it is not explicitly stated.",
    ),
    (
        &["Plan Name", "Plan Type"],
        "\"Plan Name\" is the group name in the raw text, and \"Plan Type\" is the text after \"Plan Type\".",
    ),
    (
        &["Termination Date"],
        "If the raw text contains \"Coverage To: Present\", use the exact word \"Present\" as the \"Termination Date\".",
    ),
];

/// Builds prompts for the LLM to extract plan data
pub struct PromptBuilder<'a> {
    text: &'a str,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder for a source document
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    /// Build the flat key/value field extraction prompt
    pub fn field_prompt(&self, schema: &FieldSchema) -> String {
        let mut prompt = String::new();

        prompt.push_str(FIELD_PREAMBLE);
        prompt.push_str("\n\nDOCUMENT:\n");
        prompt.push_str(self.text);
        prompt.push_str("\n\nFIELDS TO EXTRACT:\n");
        for name in schema.names() {
            prompt.push_str(&format!("- {}\n", name));
        }

        prompt.push_str("\nINSTRUCTIONS:\n");
        for (idx, rule) in self.field_rules(schema).iter().enumerate() {
            prompt.push_str(&format!("{}. {}\n", idx + 1, rule));
        }

        prompt.push_str("\nJSON OUTPUT:");
        prompt
    }

    /// Build the procedure list extraction prompt
    pub fn procedure_prompt(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(PROCEDURE_INSTRUCTIONS);
        prompt.push_str("\n\nTEXT TO PARSE:\n");
        prompt.push_str(self.text);
        prompt.push_str("\n\nOUTPUT JSON ONLY:\n");
        prompt
    }

    fn field_rules(&self, schema: &FieldSchema) -> Vec<String> {
        let mut rules = vec![
            "Extract ONLY information explicitly stated in the document; do not infer or guess.".to_string(),
            format!(
                "If a field is missing, unclear, or cannot be confidently determined, set its value to the exact string \"{}\".",
                SENTINEL
            ),
            "Ignore irrelevant, ambiguous, or noisy text that may appear.".to_string(),
            "Return ONLY a valid, well-formed JSON object with field names as keys and extracted values as strings.".to_string(),
            "Do NOT add explanations, comments, or any text outside the JSON object.".to_string(),
        ];

        rules.extend(
            FIELD_RULES
                .iter()
                .filter(|(fields, _)| fields.iter().all(|f| schema.contains(f)))
                .map(|(_, rule)| rule.to_string()),
        );

        let numeric: Vec<&str> = NUMERIC_FIELDS
            .iter()
            .copied()
            .filter(|f| schema.contains(f))
            .collect();
        if !numeric.is_empty() {
            let mut rule =
                "Pay special attention to these numeric fields and ensure correctness:".to_string();
            for field in numeric {
                rule.push_str(&format!("\n    - \"{}\"", field));
            }
            rules.push(rule);
        }

        rules.push(
            "Keep values accurate, clean, and consistently formatted, even if the input text is messy or unstructured.".to_string(),
        );
        if schema.contains("Participation Type") {
            rules.push(
                "\"Participation Type\" is not the subscriber relationship; never use the relationship as its value.".to_string(),
            );
        }

        rules
    }
}

const FIELD_PREAMBLE: &str = "You are an expert data extraction assistant specializing in insurance information. Carefully extract the requested fields from the document below.";

const PROCEDURE_INSTRUCTIONS: &str = r#"You are a highly accurate data extraction assistant. From the following dental benefits text, extract all dental procedure codes and their frequency information.

For each procedure code, extract and return these fields:
- "code": the dental procedure code (e.g., D0210)
- "frequency": the full frequency string (e.g., "Twice Per Calendar Year")
- "limited_to": the total allowed usage, from strings like "1 of 2" → "2"
- "every": the amount used or available per period, from "1 of 2" → "1"
- "duration": the time period named in the frequency (e.g., "Calendar Year", "36 Consecutive Months")

IMPORTANT RULES:
- Only extract entries that include frequency information.
- If the phrase "X of Y" appears (e.g., "1 of 2"), then:
    - "every" = X
    - "limited_to" = Y
- If "every" and "duration" are not given by "X of Y", infer them from the "frequency" phrase.
- Each returned object MUST contain all 5 fields as strings, using an empty string for any missing value.
- Do NOT return anything except the JSON array.

Expected output format:
[
  {
    "code": "D0120",
    "frequency": "Once Per 36/60 Consecutive Months",
    "limited_to": "1",
    "every": "1",
    "duration": "Consecutive Months"
  }
]"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(names: &[&str]) -> FieldSchema {
        FieldSchema::new(names.iter().copied()).unwrap()
    }

    #[test]
    fn test_field_prompt_includes_text_and_fields() {
        let schema = schema(&["Subscriber ID", "Carrier Name"]);
        let prompt = PromptBuilder::new("Member ID 12345, Cigna").field_prompt(&schema);

        assert!(prompt.contains("DOCUMENT:\nMember ID 12345, Cigna"));
        assert!(prompt.contains("FIELDS TO EXTRACT:\n- Subscriber ID\n- Carrier Name\n"));
        assert!(prompt.ends_with("JSON OUTPUT:"));
    }

    #[test]
    fn test_field_prompt_contract() {
        let prompt = PromptBuilder::new("text").field_prompt(&FieldSchema::dental_insurance());

        assert!(prompt.contains("do not infer or guess"));
        assert!(prompt.contains("\"Not Available\""));
        assert!(prompt.contains("well-formed JSON object"));
        assert!(prompt.contains("Plan Renews |"));
        assert!(prompt.contains("Default \"Insurance Type\" to \"dental\""));
        assert!(prompt.contains("Coverage To: Present"));
        assert!(prompt.contains("\"Participation Type\" is not the subscriber relationship"));
    }

    #[test]
    fn test_field_prompt_rules_are_numbered() {
        let prompt = PromptBuilder::new("text").field_prompt(&FieldSchema::dental_insurance());
        assert!(prompt.contains("\n1. Extract ONLY"));
        assert!(prompt.contains("\n11. Pay special attention"));
        assert!(prompt.contains("\n13. \"Participation Type\""));
    }

    #[test]
    fn test_numeric_rule_lists_only_schema_fields() {
        let prompt = PromptBuilder::new("text")
            .field_prompt(&schema(&["Family Maximum", "Subscriber ID"]));
        assert!(prompt.contains("    - \"Family Maximum\""));
        assert!(!prompt.contains("    - \"Individual Deductible\""));
    }

    #[test]
    fn test_numeric_rule_omitted_without_numeric_fields() {
        let prompt = PromptBuilder::new("text").field_prompt(&schema(&["Subscriber ID"]));
        assert!(!prompt.contains("numeric fields"));
    }

    #[test]
    fn test_field_rules_follow_schema() {
        let prompt = PromptBuilder::new("text")
            .field_prompt(&schema(&["Subscriber ID", "Plan Reset Date"]));

        assert!(prompt.contains("Plan Renews |"));
        assert!(!prompt.contains("Employer"));
        assert!(!prompt.contains("Insurance Type"));
        assert!(!prompt.contains("Plan Type"));
        assert!(!prompt.contains("Termination Date"));
        assert!(!prompt.contains("Participation Type"));
        assert!(prompt.contains("\n6. Return \"Plan Reset Date\""));
        assert!(prompt.contains("\n7. Keep values accurate"));
    }

    #[test]
    fn test_field_prompt_is_deterministic() {
        let schema = FieldSchema::dental_insurance();
        let a = PromptBuilder::new("same text").field_prompt(&schema);
        let b = PromptBuilder::new("same text").field_prompt(&schema);
        assert_eq!(a, b);
    }

    #[test]
    fn test_procedure_prompt() {
        let prompt = PromptBuilder::new("D0120 Once Per 6 Months 1 of 2").procedure_prompt();

        assert!(prompt.contains("TEXT TO PARSE:\nD0120 Once Per 6 Months 1 of 2"));
        assert!(prompt.contains("\"every\" = X"));
        assert!(prompt.contains("\"limited_to\" = Y"));
        assert!(prompt.contains("Only extract entries that include frequency information"));
        assert!(prompt.contains("Do NOT return anything except the JSON array"));
        assert!(prompt.trim_end().ends_with("OUTPUT JSON ONLY:"));
    }

    #[test]
    fn test_prompts_differ() {
        let builder = PromptBuilder::new("text");
        assert!(builder.field_prompt(&FieldSchema::dental_insurance()).contains("FIELDS TO EXTRACT"));
        assert!(!builder.procedure_prompt().contains("FIELDS TO EXTRACT"));
    }
}
