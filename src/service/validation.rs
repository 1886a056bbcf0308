//! Request validation against a derived schema.

use crate::error::{FieldIssue, ValidationError};
use crate::schema::{BaseRule, DerivedSchema, FieldRule};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// An input object that passed validation: only schema fields, coercions applied.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidatedInput(Map<String, Value>);

impl ValidatedInput {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub struct RequestValidator;

impl RequestValidator {
    /// Check `input` against every rule in `schema`. Unknown keys are rejected.
    /// All failing fields are reported together, in declaration order, unknown keys last.
    pub fn validate(input: &Value, schema: &DerivedSchema) -> Result<ValidatedInput, ValidationError> {
        let body = input
            .as_object()
            .ok_or_else(|| ValidationError::single("(root)", "body must be a JSON object"))?;

        let mut issues = Vec::new();
        let mut out = Map::new();
        for (name, rule) in schema.iter() {
            match check_field(name, body.get(name), rule) {
                Ok(Some(v)) => {
                    out.insert(name.to_string(), v);
                }
                Ok(None) => {}
                Err(reason) => issues.push(FieldIssue::new(name, reason)),
            }
        }
        for key in body.keys() {
            if !schema.contains(key) {
                issues.push(FieldIssue::new(key.as_str(), format!("unrecognized key '{}'", key)));
            }
        }

        if issues.is_empty() {
            Ok(ValidatedInput(out))
        } else {
            Err(ValidationError { issues })
        }
    }
}

/// `Ok(None)` means the field is absent and allowed to be.
fn check_field(name: &str, value: Option<&Value>, rule: &FieldRule) -> Result<Option<Value>, String> {
    let v = match value {
        None if rule.optional => return Ok(None),
        None => return Err(format!("{} is required", name)),
        Some(Value::Null) if rule.nullable => return Ok(Some(Value::Null)),
        Some(Value::Null) => return Err(format!("{} must not be null", name)),
        Some(v) => v,
    };

    match &rule.base {
        BaseRule::String { length, email } => {
            let s = expect_str(name, v)?;
            let n = s.chars().count();
            if rule.non_empty && n == 0 {
                return Err(format!("{} must not be empty", name));
            }
            if let Some((min, max)) = length {
                if n < *min as usize {
                    return Err(format!("{} must be at least {} characters", name, min));
                }
                if n > *max as usize {
                    return Err(format!("{} must be at most {} characters", name, max));
                }
            }
            if *email && !email_pattern().is_match(s) {
                return Err(format!("{} must be a valid email", name));
            }
            Ok(Some(v.clone()))
        }
        BaseRule::Text => {
            let s = expect_str(name, v)?;
            if rule.non_empty && s.is_empty() {
                return Err(format!("{} must not be empty", name));
            }
            Ok(Some(v.clone()))
        }
        BaseRule::Integer { min, max } => {
            let n = as_integer(v).ok_or_else(|| format!("{} must be an integer", name))?;
            check_range(name, n as f64, *min, *max, rule.non_empty)?;
            Ok(Some(Value::from(n)))
        }
        BaseRule::Float { min, max } => {
            let n = v.as_f64().ok_or_else(|| format!("{} must be a number", name))?;
            check_range(name, n, *min, *max, rule.non_empty)?;
            Ok(Some(v.clone()))
        }
        BaseRule::Boolean => match v {
            Value::Bool(_) => Ok(Some(v.clone())),
            _ => Err(format!("{} must be a boolean", name)),
        },
        BaseRule::Date => {
            let s = expect_str(name, v)?;
            if rule.non_empty && s.is_empty() {
                return Err(format!("{} must not be empty", name));
            }
            chrono::DateTime::parse_from_rfc3339(s)
                .map_err(|_| format!("{} must be an RFC 3339 date-time", name))?;
            Ok(Some(v.clone()))
        }
        BaseRule::Json => match v {
            Value::Object(_) => Ok(Some(v.clone())),
            _ => Err(format!("{} must be a JSON object", name)),
        },
        BaseRule::Enum { allowed } => {
            let s = v.as_str().unwrap_or_default();
            if v.is_string() && allowed.iter().any(|a| a == s) {
                Ok(Some(v.clone()))
            } else {
                Err(format!("{} must be one of: {}", name, allowed.join(", ")))
            }
        }
        BaseRule::Uuid => {
            let s = expect_str(name, v)?;
            if rule.non_empty && s.is_empty() {
                return Err(format!("{} must not be empty", name));
            }
            if s.len() != 36 || uuid::Uuid::parse_str(s).is_err() {
                return Err(format!("{} must be a valid UUID", name));
            }
            Ok(Some(v.clone()))
        }
        BaseRule::Any => Ok(Some(v.clone())),
    }
}

fn expect_str<'a>(name: &str, v: &'a Value) -> Result<&'a str, String> {
    v.as_str().ok_or_else(|| format!("{} must be a string", name))
}

/// Whole numbers only; integral floats such as `3.0` are coerced.
fn as_integer(v: &Value) -> Option<i64> {
    let Value::Number(n) = v else {
        return None;
    };
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    let f = n.as_f64()?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn check_range(name: &str, n: f64, min: Option<f64>, max: Option<f64>, non_empty: bool) -> Result<(), String> {
    let floor = match (min, non_empty) {
        (Some(m), true) => Some(m.max(1.0)),
        (None, true) => Some(1.0),
        (m, false) => m,
    };
    if let Some(m) = floor {
        if n < m {
            return Err(format!("{} must be at least {}", name, display_number(m)));
        }
    }
    if let Some(m) = max {
        if n > m {
            return Err(format!("{} must be at most {}", name, display_number(m)));
        }
    }
    Ok(())
}

fn display_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"))
}
