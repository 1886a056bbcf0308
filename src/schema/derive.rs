//! Field descriptors -> DerivedSchema.
//!
//! Every kind maps to a builder through [`builder_for`]; there is no runtime type
//! inspection and no implicit default branch.

use crate::config::{validate, FieldDescriptor, FieldKind, RecordType};
use crate::error::ConfigError;
use crate::schema::{BaseRule, FieldRule};
use std::collections::HashMap;

type RuleBuilder = fn(&FieldDescriptor) -> BaseRule;

fn builder_for(kind: FieldKind) -> RuleBuilder {
    match kind {
        FieldKind::String => string_rule,
        FieldKind::Integer => integer_rule,
        FieldKind::Float => float_rule,
        FieldKind::Boolean => |_| BaseRule::Boolean,
        FieldKind::Date => |_| BaseRule::Date,
        FieldKind::Json => |_| BaseRule::Json,
        FieldKind::Enum => enum_rule,
        FieldKind::Uuid => |_| BaseRule::Uuid,
        FieldKind::Text => |_| BaseRule::Text,
        FieldKind::Other => |_| BaseRule::Any,
    }
}

fn string_rule(d: &FieldDescriptor) -> BaseRule {
    BaseRule::String {
        length: d.constraints.length,
        email: d.constraints.email,
    }
}

fn integer_rule(d: &FieldDescriptor) -> BaseRule {
    BaseRule::Integer {
        min: d.constraints.min,
        max: d.constraints.max,
    }
}

fn float_rule(d: &FieldDescriptor) -> BaseRule {
    BaseRule::Float {
        min: d.constraints.min,
        max: d.constraints.max,
    }
}

fn enum_rule(d: &FieldDescriptor) -> BaseRule {
    BaseRule::Enum {
        allowed: d.constraints.allowed_values.clone(),
    }
}

fn derive_field(d: &FieldDescriptor) -> FieldRule {
    let mut rule = FieldRule::new(builder_for(d.kind)(d));
    if d.nullable {
        rule.optional = true;
        rule.nullable = true;
    } else if !d.primary_key && rule.base.tightenable() {
        rule.non_empty = true;
    }
    rule
}

/// Compiled, reusable rule set for one record type. Immutable once built.
#[derive(Clone, Debug)]
pub struct DerivedSchema {
    record: String,
    fields: Vec<(String, FieldRule)>,
    index: HashMap<String, usize>,
}

impl DerivedSchema {
    fn from_fields(record: String, fields: Vec<(String, FieldRule)>) -> Self {
        let index = fields
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (name.clone(), i))
            .collect();
        DerivedSchema { record, fields, index }
    }

    pub fn record(&self) -> &str {
        &self.record
    }

    pub fn get(&self, name: &str) -> Option<&FieldRule> {
        self.index.get(name).map(|&i| &self.fields[i].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Rules in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldRule)> {
        self.fields.iter().map(|(n, r)| (n.as_str(), r))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// New schema without the named fields (server-assigned columns, for example).
    pub fn omit(&self, names: &[&str]) -> DerivedSchema {
        let fields = self
            .fields
            .iter()
            .filter(|(n, _)| !names.contains(&n.as_str()))
            .cloned()
            .collect();
        DerivedSchema::from_fields(self.record.clone(), fields)
    }

    /// New schema in which every field may be absent. Present values are still checked in full,
    /// so null stays rejected on fields that are not nullable.
    pub fn partial(&self) -> DerivedSchema {
        let fields = self
            .fields
            .iter()
            .map(|(n, r)| {
                let mut r = r.clone();
                r.optional = true;
                (n.clone(), r)
            })
            .collect();
        DerivedSchema::from_fields(self.record.clone(), fields)
    }
}

/// Build the schema for a record type. Fails on descriptor sets that can never validate anything
/// (empty enums, inverted bounds, duplicate names).
pub fn derive_schema(record: &RecordType) -> Result<DerivedSchema, ConfigError> {
    validate(record)?;
    let fields = record
        .fields
        .iter()
        .map(|d| (d.name.clone(), derive_field(d)))
        .collect();
    tracing::debug!(record = %record.name, fields = record.fields.len(), "derived schema");
    Ok(DerivedSchema::from_fields(record.name.clone(), fields))
}
