//! Raw record-type descriptors: one entry per column, matching the JSON config shape.

use serde::{Deserialize, Serialize};

/// Declared column type. Closed set; `Other` accepts any value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Integer,
    Float,
    Boolean,
    Date,
    Json,
    Enum,
    Uuid,
    Text,
    Other,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
            FieldKind::Boolean => "boolean",
            FieldKind::Date => "date",
            FieldKind::Json => "json",
            FieldKind::Enum => "enum",
            FieldKind::Uuid => "uuid",
            FieldKind::Text => "text",
            FieldKind::Other => "other",
        }
    }
}

/// Kind-specific refinements. Only the ones relevant to the field's kind are read.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldConstraints {
    /// Inclusive character-count bound `[min, max]` for string fields.
    #[serde(default)]
    pub length: Option<(u32, u32)>,
    #[serde(default)]
    pub email: bool,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    /// Ordered set of literals accepted by an enum field.
    #[serde(default)]
    pub allowed_values: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    #[serde(default = "default_true")]
    pub nullable: bool,
    #[serde(default)]
    pub primary_key: bool,
    /// Enforced by the store; has no effect on request validation.
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub constraints: FieldConstraints,
}

fn default_true() -> bool {
    true
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        FieldDescriptor {
            name: name.into(),
            kind,
            nullable: true,
            primary_key: false,
            unique: false,
            constraints: FieldConstraints::default(),
        }
    }

    pub fn required(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn length(mut self, min: u32, max: u32) -> Self {
        self.constraints.length = Some((min, max));
        self
    }

    pub fn email(mut self) -> Self {
        self.constraints.email = true;
        self
    }

    pub fn range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.constraints.min = min;
        self.constraints.max = max;
        self
    }

    pub fn allowed<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constraints.allowed_values = values.into_iter().map(Into::into).collect();
        self
    }
}

/// A named entity with a fixed field list, analogous to a table row schema.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordType {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
}

impl RecordType {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        RecordType {
            name: name.into(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn primary_key(&self) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.primary_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_deserializes_with_defaults() {
        let d: FieldDescriptor = serde_json::from_value(serde_json::json!({
            "name": "status",
            "kind": "enum",
            "constraints": { "allowed_values": ["active", "disabled"] }
        }))
        .unwrap();
        assert_eq!(d.kind, FieldKind::Enum);
        assert!(d.nullable);
        assert!(!d.primary_key);
        assert_eq!(d.constraints.allowed_values, vec!["active", "disabled"]);
    }

    #[test]
    fn length_bound_reads_as_pair() {
        let d: FieldDescriptor = serde_json::from_value(serde_json::json!({
            "name": "account",
            "kind": "string",
            "nullable": false,
            "constraints": { "length": [3, 50] }
        }))
        .unwrap();
        assert_eq!(d.constraints.length, Some((3, 50)));
        assert!(!d.nullable);
    }
}
