//! Decode quality of a model response

use std::fmt;

/// How a model response was turned into structured data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeQuality {
    /// Strict JSON decode succeeded and matched the expected shape
    Exact,
    /// Best-effort recovery: line matching, or JSON that needed repair
    Heuristic,
    /// Nothing decodable was found
    Empty,
}

impl DecodeQuality {
    /// Stable lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            DecodeQuality::Exact => "exact",
            DecodeQuality::Heuristic => "heuristic",
            DecodeQuality::Empty => "empty",
        }
    }
}

impl fmt::Display for DecodeQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded value together with its decode quality
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded<T> {
    /// The decoded value, always well-formed
    pub value: T,
    /// How the value was obtained
    pub quality: DecodeQuality,
}

impl<T> Decoded<T> {
    /// Wrap a value with its quality
    pub fn new(value: T, quality: DecodeQuality) -> Self {
        Self { value, quality }
    }
}
