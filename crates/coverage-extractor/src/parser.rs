//! Parse LLM output into field records and procedure lists
//!
//! Strict JSON decoding is authoritative. When it fails, field responses fall
//! back to line matching and procedure responses degrade to an empty list.
//! Neither path returns an error; the outcome is reported as `DecodeQuality`.

use coverage_domain::{
    enforce, DecodeQuality, Decoded, FieldRecord, FieldSchema, ProcedureRecord,
};
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// First `{` to last `}`, across lines
static OBJECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("object pattern is valid"));

/// Shortest `[ { ... } ]` run, or an empty `[ ]`, across lines
static ARRAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\[\s*(?:\{.*?\}\s*)?\]").expect("array pattern is valid")
});

/// Values the model uses to say "I don't know" (compared lowercase)
const NEGATIVE_TOKENS: &[&str] = &["not available", "n/a", "none", ""];

/// Parse a field extraction response against a schema
///
/// The returned record always holds exactly the schema's fields.
pub fn parse_field_response(response: &str, schema: &FieldSchema) -> Decoded<FieldRecord> {
    if let Some(candidate) = OBJECT_RE.find(response) {
        match serde_json::from_str::<Map<String, Value>>(candidate.as_str()) {
            Ok(object) => {
                let partial = fields_from_object(&object, schema);
                return Decoded::new(enforce(&partial, schema), DecodeQuality::Exact);
            }
            Err(e) => warn!("Field response is not valid JSON, falling back to line matching: {}", e),
        }
    } else {
        debug!("No JSON object in field response, falling back to line matching");
    }

    let partial = fields_from_lines(response, schema);
    let quality = if partial.is_empty() {
        DecodeQuality::Empty
    } else {
        DecodeQuality::Heuristic
    };
    Decoded::new(enforce(&partial, schema), quality)
}

/// Read schema fields out of a decoded JSON object
fn fields_from_object(object: &Map<String, Value>, schema: &FieldSchema) -> HashMap<String, String> {
    schema
        .names()
        .iter()
        .filter_map(|name| {
            let value = match object.get(name)? {
                Value::String(s) if is_negative(s) => return None,
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null | Value::Array(_) | Value::Object(_) => return None,
            };
            Some((name.clone(), value))
        })
        .collect()
}

/// Best-effort `Field Name: value` matching, one line at a time
///
/// A line belongs to the longest field name it contains, so that
/// "Family Deductible Remaining" is never read as "Family Deductible".
/// The first accepted value for a field wins.
fn fields_from_lines(response: &str, schema: &FieldSchema) -> HashMap<String, String> {
    let candidates: Vec<(&str, String)> = schema
        .longest_first()
        .into_iter()
        .map(|name| (name, name.to_lowercase()))
        .collect();

    let mut partial = HashMap::new();
    for line in response.lines() {
        let line = line.trim();
        let Some((_, raw_value)) = line.split_once(':') else {
            continue;
        };

        let lower = line.to_lowercase();
        let Some((field, _)) = candidates
            .iter()
            .find(|(_, lower_name)| lower.contains(lower_name.as_str()))
        else {
            continue;
        };

        if partial.contains_key(*field) {
            continue;
        }
        if let Some(value) = clean_value(raw_value) {
            partial.insert(field.to_string(), value);
        }
    }
    partial
}

/// Strip whitespace, a trailing comma and surrounding quotes; drop "unknown" values
fn clean_value(raw: &str) -> Option<String> {
    let value = raw
        .trim()
        .trim_end_matches(',')
        .trim()
        .trim_matches('"')
        .trim();

    if is_negative(value) {
        None
    } else {
        Some(value.to_string())
    }
}

fn is_negative(value: &str) -> bool {
    NEGATIVE_TOKENS.contains(&value.trim().to_lowercase().as_str())
}

/// Parse a procedure extraction response
///
/// Every decoded element is forced into the five-field shape; missing or
/// null attributes become empty strings and non-object elements are dropped.
/// Anything undecodable yields an empty list.
pub fn parse_procedure_response(response: &str) -> Decoded<Vec<ProcedureRecord>> {
    let Some(candidate) = ARRAY_RE.find(response) else {
        warn!("No JSON array in procedure response");
        return Decoded::new(Vec::new(), DecodeQuality::Empty);
    };

    let elements: Vec<Value> = match serde_json::from_str(candidate.as_str()) {
        Ok(elements) => elements,
        Err(e) => {
            warn!("Procedure response is not valid JSON: {}", e);
            return Decoded::new(Vec::new(), DecodeQuality::Empty);
        }
    };

    let mut repaired = false;
    let mut procedures = Vec::with_capacity(elements.len());
    for (idx, element) in elements.iter().enumerate() {
        match element.as_object() {
            Some(object) => {
                let (record, exact) = procedure_from_object(object);
                if !exact {
                    debug!("Procedure {} needed repair", idx);
                    repaired = true;
                }
                procedures.push(record);
            }
            None => {
                warn!("Procedure {} is not a JSON object, skipping", idx);
                repaired = true;
            }
        }
    }

    let quality = if repaired {
        DecodeQuality::Heuristic
    } else {
        DecodeQuality::Exact
    };
    Decoded::new(procedures, quality)
}

/// Build a record from one array element; `false` if anything was defaulted
fn procedure_from_object(object: &Map<String, Value>) -> (ProcedureRecord, bool) {
    let mut record = ProcedureRecord::default();
    let mut exact = true;

    for field in ProcedureRecord::FIELDS {
        let value = match object.get(field) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => {
                exact = false;
                n.to_string()
            }
            Some(Value::Bool(b)) => {
                exact = false;
                b.to_string()
            }
            _ => {
                exact = false;
                String::new()
            }
        };
        record.set(field, value);
    }

    (record, exact)
}
