use serde::Serialize;
use serde_json::{Map, Value};

/// The body of a write request: a mapping from field name to scalar value,
/// constructed fresh per test. The payload is never read back verbatim; it
/// only drives the inequality and containment checks against the
/// post-mutation read.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MutationPayload {
    fields: Map<String, Value>,
}

impl MutationPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field. Values are scalars (strings or numbers); the backend is
    /// not trusted to preserve field-name casing, so nothing downstream
    /// keys on the names except the literal text-containment check.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The string values submitted. The partial-update check asserts each
    /// appears verbatim in the echoed response text.
    pub fn string_values(&self) -> Vec<&str> {
        self.fields.values().filter_map(Value::as_str).collect()
    }
}
