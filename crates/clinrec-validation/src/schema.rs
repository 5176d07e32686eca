//! Record field schema.
//!
//! One static table describes every accepted field: its name, its value
//! kind with range constraints, whether it is required on create, and
//! whether it is free text that must be sanitized first. A single evaluator
//! walks the table and aggregates every violation instead of stopping at
//! the first, so the caller can correct a whole payload in one round.

use clinrec_core::{FieldViolation, id::{PATIENT_ID_MAX, PATIENT_ID_MIN}};
use serde_json::{Map, Number, Value};

use crate::sanitize::sanitize;

/// The value kind and range constraints of one field.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// A whole number within an inclusive range.
    Integer { min: i64, max: i64 },
    /// A numeric value within a range; `exclusive_min` makes the lower
    /// bound strict.
    Float {
        min: f64,
        max: f64,
        exclusive_min: bool,
    },
    /// A `{0, 1}` flag, accepted as an integer or its string form.
    Flag,
    /// A categorical field restricted to a fixed set of spellings.
    OneOf { choices: &'static [&'static str] },
}

/// One entry of the record schema.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Required on create. Every field is optional in a patch.
    pub required: bool,
    /// Free text: run the sanitizer before checking the value.
    pub sanitize: bool,
}

/// Name of the immutable identifier field.
pub const IDENTIFIER_FIELD: &str = "patient_id";

/// The full record schema, identifier included.
pub const RECORD_SCHEMA: &[FieldSpec] = &[
    FieldSpec {
        name: IDENTIFIER_FIELD,
        kind: FieldKind::Integer {
            min: PATIENT_ID_MIN,
            max: PATIENT_ID_MAX,
        },
        required: true,
        sanitize: false,
    },
    FieldSpec {
        name: "gender",
        kind: FieldKind::OneOf {
            choices: &["Male", "Female", "Other"],
        },
        required: true,
        sanitize: true,
    },
    FieldSpec {
        name: "age",
        kind: FieldKind::Float {
            min: 0.0,
            max: 120.0,
            exclusive_min: false,
        },
        required: true,
        sanitize: false,
    },
    FieldSpec {
        name: "hypertension",
        kind: FieldKind::Flag,
        required: true,
        sanitize: false,
    },
    FieldSpec {
        name: "heart_disease",
        kind: FieldKind::Flag,
        required: true,
        sanitize: false,
    },
    FieldSpec {
        name: "ever_married",
        kind: FieldKind::OneOf {
            choices: &["Yes", "No"],
        },
        required: true,
        sanitize: true,
    },
    FieldSpec {
        name: "work_type",
        kind: FieldKind::OneOf {
            choices: &[
                "Private",
                "Self-employed",
                "Govt_job",
                "children",
                "Never_worked",
            ],
        },
        required: true,
        sanitize: true,
    },
    FieldSpec {
        name: "residence_type",
        kind: FieldKind::OneOf {
            choices: &["Urban", "Rural"],
        },
        required: true,
        sanitize: true,
    },
    FieldSpec {
        name: "avg_glucose_level",
        kind: FieldKind::Float {
            min: 0.0,
            max: 500.0,
            exclusive_min: true,
        },
        required: true,
        sanitize: false,
    },
    FieldSpec {
        name: "bmi",
        kind: FieldKind::Float {
            min: 10.0,
            max: 100.0,
            exclusive_min: false,
        },
        required: false,
        sanitize: false,
    },
    FieldSpec {
        name: "smoking_status",
        kind: FieldKind::OneOf {
            choices: &["formerly smoked", "never smoked", "smokes", "Unknown"],
        },
        required: true,
        sanitize: true,
    },
    FieldSpec {
        name: "stroke",
        kind: FieldKind::Flag,
        required: true,
        sanitize: false,
    },
];

/// Evaluates a raw payload against the schema.
///
/// Returns the normalized field map alongside every violation found. The
/// caller decides whether missing fields are violations (`require_all` is
/// set on create, cleared on patch).
pub(crate) fn evaluate(
    raw: &Map<String, Value>,
    specs: &[FieldSpec],
    require_all: bool,
) -> (Map<String, Value>, Vec<FieldViolation>) {
    let mut normalized = Map::new();
    let mut violations = Vec::new();

    for spec in specs {
        match raw.get(spec.name) {
            None => {
                if require_all && spec.required {
                    violations.push(FieldViolation::new(spec.name, "is required"));
                }
            }
            Some(Value::Null) => {
                // Only optional fields may be explicitly null. On create,
                // null means "not recorded" and the field is omitted from
                // the normalized map; in a patch it clears the stored value
                // and is passed through.
                if spec.required {
                    violations.push(FieldViolation::new(spec.name, "must not be null"));
                } else if !require_all {
                    normalized.insert(spec.name.to_string(), Value::Null);
                }
            }
            Some(value) => match check_field(spec, value) {
                Ok(normal) => {
                    normalized.insert(spec.name.to_string(), normal);
                }
                Err(reason) => violations.push(FieldViolation::new(spec.name, reason)),
            },
        }
    }

    for name in raw.keys() {
        if !specs.iter().any(|spec| spec.name == name) {
            violations.push(FieldViolation::new(name.clone(), "unknown field"));
        }
    }

    (normalized, violations)
}

/// Checks one present, non-null value against its spec.
fn check_field(spec: &FieldSpec, value: &Value) -> Result<Value, String> {
    match spec.kind {
        FieldKind::Integer { min, max } => {
            let Some(number) = value.as_i64() else {
                return Err("must be a whole number".to_string());
            };
            if (min..=max).contains(&number) {
                Ok(Value::Number(Number::from(number)))
            } else {
                Err(format!("must be between {min} and {max}"))
            }
        }
        FieldKind::Float {
            min,
            max,
            exclusive_min,
        } => {
            let Some(number) = value.as_f64() else {
                return Err("must be a number".to_string());
            };
            if !number.is_finite() {
                return Err("must be a finite number".to_string());
            }
            let above_min = if exclusive_min {
                number > min
            } else {
                number >= min
            };
            if above_min && number <= max {
                // as_f64 never produces NaN here, so the Number is valid.
                Number::from_f64(number)
                    .map(Value::Number)
                    .ok_or_else(|| "must be a finite number".to_string())
            } else if exclusive_min {
                Err(format!("must be greater than {min} and at most {max}"))
            } else {
                Err(format!("must be between {min} and {max}"))
            }
        }
        FieldKind::Flag => {
            let flag = match value {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => sanitize(s).parse::<i64>().ok(),
                _ => None,
            };
            match flag {
                Some(0) => Ok(Value::Number(Number::from(0))),
                Some(1) => Ok(Value::Number(Number::from(1))),
                _ => Err("must be 0 or 1".to_string()),
            }
        }
        FieldKind::OneOf { choices } => {
            let Some(text) = value.as_str() else {
                return Err("must be a string".to_string());
            };
            let cleaned = if spec.sanitize {
                sanitize(text)
            } else {
                text.to_string()
            };
            if choices.contains(&cleaned.as_str()) {
                Ok(Value::String(cleaned))
            } else {
                Err(format!("must be one of: {}", choices.join(", ")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec_for(name: &str) -> &'static FieldSpec {
        RECORD_SCHEMA
            .iter()
            .find(|spec| spec.name == name)
            .unwrap()
    }

    #[test]
    fn integer_kind_rejects_floats_and_out_of_range() {
        let spec = spec_for("patient_id");
        assert!(check_field(spec, &json!(1001)).is_ok());
        assert!(check_field(spec, &json!(10.5)).is_err());
        assert!(check_field(spec, &json!(0)).is_err());
        assert!(check_field(spec, &json!(1_000_000)).is_err());
    }

    #[test]
    fn glucose_lower_bound_is_strict() {
        let spec = spec_for("avg_glucose_level");
        assert!(check_field(spec, &json!(0.0)).is_err());
        assert!(check_field(spec, &json!(0.1)).is_ok());
        assert!(check_field(spec, &json!(500.0)).is_ok());
        assert!(check_field(spec, &json!(500.1)).is_err());
    }

    #[test]
    fn flags_accept_numeric_and_string_forms() {
        let spec = spec_for("stroke");
        assert_eq!(check_field(spec, &json!(1)).unwrap(), json!(1));
        assert_eq!(check_field(spec, &json!("0")).unwrap(), json!(0));
        assert!(check_field(spec, &json!(2)).is_err());
        assert!(check_field(spec, &json!(true)).is_err());
        assert!(check_field(spec, &json!("yes")).is_err());
    }

    #[test]
    fn categorical_fields_are_sanitized_before_matching() {
        let spec = spec_for("gender");
        assert_eq!(
            check_field(spec, &json!(" Male<script>x</script>")).unwrap(),
            json!("Male")
        );
        assert!(check_field(spec, &json!("male")).is_err());
    }

    #[test]
    fn evaluate_collects_every_violation() {
        let raw = serde_json::from_value::<Map<String, Value>>(json!({
            "patient_id": 0,
            "gender": "Alien",
            "age": 300,
        }))
        .unwrap();
        let (_, violations) = evaluate(&raw, RECORD_SCHEMA, true);
        // Three bad fields plus the nine missing required ones (bmi is
        // optional and not counted).
        let bad: Vec<_> = violations.iter().map(|v| v.field.as_str()).collect();
        assert!(bad.contains(&"patient_id"));
        assert!(bad.contains(&"gender"));
        assert!(bad.contains(&"age"));
        assert!(bad.contains(&"stroke"));
        assert_eq!(violations.len(), 11);
    }

    #[test]
    fn null_is_rejected_for_required_fields_only() {
        let raw = serde_json::from_value::<Map<String, Value>>(json!({
            "age": null,
            "bmi": null,
        }))
        .unwrap();

        let (normalized, violations) = evaluate(&raw, RECORD_SCHEMA, false);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "age");
        // The optional field's null survives into the patch.
        assert_eq!(normalized.get("bmi"), Some(&Value::Null));

        // On create the optional null is simply omitted.
        let raw = serde_json::from_value::<Map<String, Value>>(json!({ "bmi": null })).unwrap();
        let (normalized, violations) = evaluate(&raw, RECORD_SCHEMA, true);
        assert!(violations.iter().all(|v| v.field != "bmi"));
        assert!(normalized.get("bmi").is_none());
    }

    #[test]
    fn evaluate_flags_unknown_fields() {
        let raw = serde_json::from_value::<Map<String, Value>>(json!({
            "age": 40,
            "favourite_colour": "blue",
        }))
        .unwrap();
        let (_, violations) = evaluate(&raw, RECORD_SCHEMA, false);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "favourite_colour");
    }
}
