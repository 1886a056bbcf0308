//! Per-field validation rules produced by the deriver.

/// Kind-specific check applied to a present, non-null value.
#[derive(Clone, Debug, PartialEq)]
pub enum BaseRule {
    String {
        length: Option<(u32, u32)>,
        email: bool,
    },
    Integer {
        min: Option<f64>,
        max: Option<f64>,
    },
    Float {
        min: Option<f64>,
        max: Option<f64>,
    },
    Boolean,
    /// RFC 3339 date-time string.
    Date,
    /// Any JSON object.
    Json,
    Enum {
        allowed: Vec<String>,
    },
    /// Canonical hyphenated UUID string.
    Uuid,
    /// Any string, no length bound.
    Text,
    /// Accepts every value.
    Any,
}

impl BaseRule {
    /// Whether a non-null, non-key field of this rule gets the presence tightening.
    pub fn tightenable(&self) -> bool {
        matches!(
            self,
            BaseRule::String { .. }
                | BaseRule::Text
                | BaseRule::Date
                | BaseRule::Uuid
                | BaseRule::Integer { .. }
                | BaseRule::Float { .. }
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldRule {
    pub base: BaseRule,
    /// Absence passes without consulting `base`.
    pub optional: bool,
    /// Explicit null passes without consulting `base`. Only nullable fields.
    pub nullable: bool,
    /// Strings must be non-empty, numbers at least 1.
    pub non_empty: bool,
}

impl FieldRule {
    pub fn new(base: BaseRule) -> Self {
        FieldRule {
            base,
            optional: false,
            nullable: false,
            non_empty: false,
        }
    }
}
