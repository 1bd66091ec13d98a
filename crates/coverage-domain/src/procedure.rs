//! Procedure code records

/// A procedure code with its frequency limitation
///
/// All five attributes are always present; an attribute the model did
/// not supply is the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcedureRecord {
    /// Procedure code (e.g., "D0120")
    pub code: String,

    /// Full frequency phrase (e.g., "Twice Per Calendar Year")
    pub frequency: String,

    /// Total allowed usage, the Y of "X of Y"
    pub limited_to: String,

    /// Usage per period, the X of "X of Y"
    pub every: String,

    /// Period named in the frequency (e.g., "Calendar Year")
    pub duration: String,
}

impl ProcedureRecord {
    /// Attribute names in the order the model is asked to emit them
    pub const FIELDS: [&'static str; 5] = ["code", "frequency", "limited_to", "every", "duration"];

    /// Look up an attribute by its wire name
    pub fn get(&self, field: &str) -> Option<&str> {
        match field {
            "code" => Some(&self.code),
            "frequency" => Some(&self.frequency),
            "limited_to" => Some(&self.limited_to),
            "every" => Some(&self.every),
            "duration" => Some(&self.duration),
            _ => None,
        }
    }

    /// Set an attribute by its wire name, ignoring unknown names
    pub fn set(&mut self, field: &str, value: String) {
        match field {
            "code" => self.code = value,
            "frequency" => self.frequency = value,
            "limited_to" => self.limited_to = value,
            "every" => self.every = value,
            "duration" => self.duration = value,
            _ => {}
        }
    }
}
