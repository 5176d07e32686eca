//! # clinrec-validation
//!
//! The sanitize-then-validate pipeline every mutation payload passes
//! through before persistence.
//!
//! Payloads arrive as raw JSON maps. The pipeline sanitizes free-text
//! fields first, then enforces type and range constraints against the
//! static record schema, collecting **all** violations rather than stopping
//! at the first. Create payloads must carry every required field; update
//! payloads may carry any subset, but the immutable identifier must not
//! appear at all.
//!
//! ## Modules
//!
//! - [`sanitize`] - Free-text sanitizer
//! - [`schema`] - The record field schema and its evaluator

pub mod sanitize;
pub mod schema;

pub use schema::{FieldKind, FieldSpec, IDENTIFIER_FIELD, RECORD_SCHEMA};

use clinrec_core::{FieldViolation, NormalizedRecord, RecordPatch};
use serde_json::{Map, Value};
use thiserror::Error;

// Re-exported at the crate root because almost every caller needs it.
pub use sanitize::sanitize;

/// Errors produced by the validation pipeline.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// One or more fields failed validation. Carries every violation found.
    #[error("validation failed with {} violation(s)", violations.len())]
    Invalid {
        /// All collected (field, reason) pairs.
        violations: Vec<FieldViolation>,
    },

    /// An update payload carried the immutable identifier field.
    /// Raised on presence alone, regardless of the supplied value.
    #[error("immutable field present in payload: {field}")]
    ImmutableField {
        /// The offending field name.
        field: String,
    },
}

impl ValidationError {
    /// Creates an `Invalid` error from collected violations.
    #[must_use]
    pub fn invalid(violations: Vec<FieldViolation>) -> Self {
        Self::Invalid { violations }
    }

    /// Returns the collected violations, if any.
    #[must_use]
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            Self::Invalid { violations } => violations,
            Self::ImmutableField { .. } => &[],
        }
    }
}

/// Type alias for validation pipeline results.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a create payload into a [`NormalizedRecord`].
///
/// Sanitizes text fields, then checks every schema constraint. Missing
/// required fields, out-of-range values, unrecognized categories, and
/// unknown fields are all collected into a single `Invalid` error.
///
/// # Errors
///
/// Returns `ValidationError::Invalid` with the full violation list.
pub fn validate_new(raw: &Map<String, Value>) -> ValidationResult<NormalizedRecord> {
    let (normalized, violations) = schema::evaluate(raw, RECORD_SCHEMA, true);
    if !violations.is_empty() {
        return Err(ValidationError::invalid(violations));
    }
    serde_json::from_value(Value::Object(normalized)).map_err(|err| {
        // The evaluator normalizes every field the model declares, so this
        // only fires if the schema and the model drift apart.
        ValidationError::invalid(vec![FieldViolation::new(
            "payload",
            format!("does not form a valid record: {err}"),
        )])
    })
}

/// Validates an update payload into a [`RecordPatch`].
///
/// Every field is optional, but the payload must not be empty and must not
/// carry the immutable identifier.
///
/// # Errors
///
/// Returns `ValidationError::ImmutableField` if the identifier is present
/// (checked before anything else), or `ValidationError::Invalid` with the
/// full violation list otherwise.
pub fn validate_patch(raw: &Map<String, Value>) -> ValidationResult<RecordPatch> {
    if raw.contains_key(IDENTIFIER_FIELD) {
        return Err(ValidationError::ImmutableField {
            field: IDENTIFIER_FIELD.to_string(),
        });
    }

    let patch_specs: Vec<_> = RECORD_SCHEMA
        .iter()
        .filter(|spec| spec.name != IDENTIFIER_FIELD)
        .copied()
        .collect();
    let (normalized, mut violations) = schema::evaluate(raw, &patch_specs, false);

    if violations.is_empty() && normalized.is_empty() {
        violations.push(FieldViolation::new("payload", "no fields to update"));
    }
    if !violations.is_empty() {
        return Err(ValidationError::invalid(violations));
    }

    serde_json::from_value(Value::Object(normalized)).map_err(|err| {
        ValidationError::invalid(vec![FieldViolation::new(
            "payload",
            format!("does not form a valid patch: {err}"),
        )])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinrec_core::{Gender, SmokingStatus};
    use serde_json::json;

    fn raw(value: Value) -> Map<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    fn full_payload() -> Map<String, Value> {
        raw(json!({
            "patient_id": 1001,
            "gender": "Male",
            "age": 45,
            "hypertension": 0,
            "heart_disease": 1,
            "ever_married": "Yes",
            "work_type": "Private",
            "residence_type": "Urban",
            "avg_glucose_level": 105.4,
            "bmi": 27.3,
            "smoking_status": "never smoked",
            "stroke": 0,
        }))
    }

    #[test]
    fn valid_payload_normalizes() {
        let record = validate_new(&full_payload()).unwrap();
        assert_eq!(record.patient_id.value(), 1001);
        assert_eq!(record.gender, Gender::Male);
        assert_eq!(record.age, 45.0);
        assert!(record.heart_disease);
        assert_eq!(record.smoking_status, SmokingStatus::NeverSmoked);
        assert_eq!(record.bmi, Some(27.3));
    }

    #[test]
    fn bmi_may_be_omitted_or_null() {
        let mut payload = full_payload();
        payload.remove("bmi");
        assert_eq!(validate_new(&payload).unwrap().bmi, None);

        let mut payload = full_payload();
        payload.insert("bmi".to_string(), Value::Null);
        assert_eq!(validate_new(&payload).unwrap().bmi, None);
    }

    #[test]
    fn text_fields_are_sanitized_before_storage() {
        let mut payload = full_payload();
        payload.insert(
            "residence_type".to_string(),
            json!("  Urban<script>alert(1)</script>"),
        );
        let record = validate_new(&payload).unwrap();
        assert_eq!(
            serde_json::to_value(record.residence_type).unwrap(),
            json!("Urban")
        );
    }

    #[test]
    fn all_violations_are_reported_together() {
        let mut payload = full_payload();
        payload.insert("age".to_string(), json!(-3));
        payload.insert("avg_glucose_level".to_string(), json!(0));
        payload.insert("smoking_status".to_string(), json!("vapes"));
        let err = validate_new(&payload).unwrap_err();
        assert_eq!(err.violations().len(), 3);
    }

    #[test]
    fn patch_rejects_identifier_regardless_of_value() {
        let err = validate_patch(&raw(json!({ "patient_id": 2000 }))).unwrap_err();
        assert!(matches!(err, ValidationError::ImmutableField { ref field } if field == "patient_id"));

        // Even the record's own id is rejected, and even alongside other
        // invalid fields the immutable check wins.
        let err = validate_patch(&raw(json!({ "patient_id": 1001, "age": -1 }))).unwrap_err();
        assert!(matches!(err, ValidationError::ImmutableField { .. }));
    }

    #[test]
    fn patch_accepts_partial_payloads() {
        let patch = validate_patch(&raw(json!({ "age": 46 }))).unwrap();
        assert_eq!(patch.age, Some(46.0));
        assert_eq!(patch.gender, None);
    }

    #[test]
    fn patch_null_clears_an_optional_field() {
        let patch = validate_patch(&raw(json!({ "bmi": null }))).unwrap();
        assert_eq!(patch.bmi, Some(None));

        // Required fields still refuse null.
        let err = validate_patch(&raw(json!({ "age": null }))).unwrap_err();
        assert_eq!(err.violations().len(), 1);
        assert_eq!(err.violations()[0].field, "age");
    }

    #[test]
    fn empty_patch_is_rejected() {
        let err = validate_patch(&raw(json!({}))).unwrap_err();
        assert_eq!(err.violations().len(), 1);
        assert_eq!(err.violations()[0].field, "payload");
    }
}
