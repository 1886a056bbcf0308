//! Record-type validation: rejects descriptor sets that cannot yield a usable schema.

use crate::config::{FieldKind, RecordType};
use crate::error::ConfigError;
use std::collections::HashSet;

pub fn validate(record: &RecordType) -> Result<(), ConfigError> {
    let mut names = HashSet::new();
    for f in &record.fields {
        if !names.insert(f.name.as_str()) {
            return Err(ConfigError::DuplicateField {
                record: record.name.clone(),
                field: f.name.clone(),
            });
        }

        match f.kind {
            FieldKind::Enum if f.constraints.allowed_values.is_empty() => {
                return Err(ConfigError::EmptyEnum(f.name.clone()));
            }
            FieldKind::String => {
                if let Some((min, max)) = f.constraints.length {
                    if min > max {
                        return Err(ConfigError::InvalidLength {
                            field: f.name.clone(),
                            min,
                            max,
                        });
                    }
                }
            }
            FieldKind::Integer | FieldKind::Float => {
                if let (Some(min), Some(max)) = (f.constraints.min, f.constraints.max) {
                    if min > max {
                        return Err(ConfigError::InvalidRange {
                            field: f.name.clone(),
                            min,
                            max,
                        });
                    }
                }
            }
            _ => {}
        }
    }
    Ok(())
}
