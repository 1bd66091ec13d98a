//! Field schema, field records and schema enforcement
//!
//! A [`FieldRecord`] produced by [`enforce`] always carries exactly the names
//! of its [`FieldSchema`], in schema order.

use std::collections::{HashMap, HashSet};

/// Value of a field that could not be confidently determined
pub const SENTINEL: &str = "Not Available";

/// Fields extracted from a dental insurance eligibility page
const DENTAL_INSURANCE_FIELDS: &[&str] = &[
    "Subscriber ID",
    "Effective Date",
    "Termination Date",
    "Carrier Name",
    "Plan Name",
    "Group Number",
    "Insurance Type",
    "Employer",
    "Plan Reset Date",
    "Plan Type",
    "Benefits Coordination Method",
    "Verified Date",
    "Participation Type",
    "Family Maximum",
    "Family Max. Remaining",
    "Individual Maximum",
    "Individual Max. Remaining",
    "Family Deductible",
    "Family Deductible Remaining",
    "Individual Deductible",
    "Individual Deductible Remaining",
];

/// Ordered set of unique field names known before extraction
///
/// Order only affects prompt readability; it never changes which
/// values end up in a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema(Vec<String>);

impl FieldSchema {
    /// Create a schema from field names
    ///
    /// # Errors
    /// Returns error if the schema is empty, a name is blank, or a name repeats
    pub fn new<I, S>(names: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err("Field schema cannot be empty".to_string());
        }

        let mut seen = HashSet::new();
        for name in &names {
            if name.trim().is_empty() {
                return Err("Field name cannot be blank".to_string());
            }
            if !seen.insert(name.as_str()) {
                return Err(format!("Duplicate field name: {}", name));
            }
        }

        Ok(Self(names))
    }

    /// The 21 dental insurance plan fields
    pub fn dental_insurance() -> Self {
        Self(DENTAL_INSURANCE_FIELDS.iter().map(|f| f.to_string()).collect())
    }

    /// Field names in declaration order
    pub fn names(&self) -> &[String] {
        &self.0
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a constructed schema
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check whether a field name belongs to the schema
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    /// Field names ordered longest first, ties kept in declaration order
    ///
    /// Line matching uses this order so that "Family Deductible Remaining"
    /// claims a line before "Family Deductible" can.
    pub fn longest_first(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.0.iter().map(String::as_str).collect();
        names.sort_by(|a, b| b.len().cmp(&a.len()));
        names
    }
}

impl Default for FieldSchema {
    fn default() -> Self {
        Self::dental_insurance()
    }
}

/// One string value per schema field, in schema order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRecord(Vec<(String, String)>);

impl FieldRecord {
    /// A record with every field set to the sentinel
    pub fn unavailable(schema: &FieldSchema) -> Self {
        enforce(&HashMap::new(), schema)
    }

    /// Look up a field value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate `(name, value)` pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Field names in schema order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True only for a record built from nothing
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields holding something other than the sentinel
    pub fn populated(&self) -> usize {
        self.0.iter().filter(|(_, v)| v != SENTINEL).count()
    }

    /// Copy the record into a map
    pub fn to_map(&self) -> HashMap<String, String> {
        self.0.iter().cloned().collect()
    }
}

/// Build a record whose keys are exactly the schema's names
///
/// Values come from `partial` where present; every other field gets the
/// sentinel. Keys of `partial` outside the schema are dropped.
pub fn enforce(partial: &HashMap<String, String>, schema: &FieldSchema) -> FieldRecord {
    FieldRecord(
        schema
            .names()
            .iter()
            .map(|name| {
                let value = partial
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| SENTINEL.to_string());
                (name.clone(), value)
            })
            .collect(),
    )
}
