//! Typed patient record model.
//!
//! `NormalizedRecord` is the output of the validation pipeline: every field
//! has been sanitized, type-checked, and range-checked. Categorical fields
//! use enumerations whose serde spellings match the source dataset, so a
//! normalized record round-trips to the same JSON the store persists.

use serde::{Deserialize, Serialize};

use crate::id::PatientId;

/// Patient gender category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// The dataset spelling of this category.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Other => "Other",
        }
    }
}

/// Whether the patient has ever been married.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EverMarried {
    Yes,
    No,
}

/// Patient occupation category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkType {
    Private,
    #[serde(rename = "Self-employed")]
    SelfEmployed,
    #[serde(rename = "Govt_job")]
    GovtJob,
    #[serde(rename = "children")]
    Children,
    #[serde(rename = "Never_worked")]
    NeverWorked,
}

impl WorkType {
    /// The dataset spelling of this category.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "Private",
            Self::SelfEmployed => "Self-employed",
            Self::GovtJob => "Govt_job",
            Self::Children => "children",
            Self::NeverWorked => "Never_worked",
        }
    }
}

/// Patient residence category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResidenceType {
    Urban,
    Rural,
}

/// Patient smoking status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SmokingStatus {
    #[serde(rename = "formerly smoked")]
    FormerlySmoked,
    #[serde(rename = "never smoked")]
    NeverSmoked,
    #[serde(rename = "smokes")]
    Smokes,
    Unknown,
}

impl SmokingStatus {
    /// The dataset spelling of this category.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FormerlySmoked => "formerly smoked",
            Self::NeverSmoked => "never smoked",
            Self::Smokes => "smokes",
            Self::Unknown => "Unknown",
        }
    }
}

/// A fully validated patient record.
///
/// Flag fields (`hypertension`, `heart_disease`, `stroke`) accept `{0, 1}`
/// on input and are serialized back as `0`/`1` integers to stay faithful to
/// the dataset encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// Immutable record identifier, unique within the record store.
    pub patient_id: PatientId,
    pub gender: Gender,
    /// Age in years, 0 to 120. Fractional ages are allowed for infants.
    pub age: f64,
    #[serde(with = "flag")]
    pub hypertension: bool,
    #[serde(with = "flag")]
    pub heart_disease: bool,
    pub ever_married: EverMarried,
    pub work_type: WorkType,
    pub residence_type: ResidenceType,
    /// Average glucose level in mg/dL, strictly positive.
    pub avg_glucose_level: f64,
    /// Body-mass index; optional because the source dataset has gaps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bmi: Option<f64>,
    pub smoking_status: SmokingStatus,
    /// Recorded outcome flag.
    #[serde(with = "flag")]
    pub stroke: bool,
}

/// A partial update to a patient record.
///
/// The identifier is deliberately absent: it is immutable, and its presence
/// in an update payload is rejected upstream by the validation pipeline.
/// `None` fields are left untouched by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<f64>,
    #[serde(default, with = "flag_opt", skip_serializing_if = "Option::is_none")]
    pub hypertension: Option<bool>,
    #[serde(default, with = "flag_opt", skip_serializing_if = "Option::is_none")]
    pub heart_disease: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ever_married: Option<EverMarried>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_type: Option<WorkType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub residence_type: Option<ResidenceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_glucose_level: Option<f64>,
    /// Outer `None` leaves the stored value untouched; `Some(None)` (an
    /// explicit JSON null) clears it back to "not recorded".
    #[serde(
        default,
        deserialize_with = "nullable::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub bmi: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smoking_status: Option<SmokingStatus>,
    #[serde(default, with = "flag_opt", skip_serializing_if = "Option::is_none")]
    pub stroke: Option<bool>,
}

impl RecordPatch {
    /// Returns `true` if the patch carries no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Applies this patch to a record, returning the updated record.
    ///
    /// Last-write-wins: every present field overwrites the stored value.
    #[must_use]
    pub fn apply(&self, record: &NormalizedRecord) -> NormalizedRecord {
        let mut updated = record.clone();
        if let Some(gender) = self.gender {
            updated.gender = gender;
        }
        if let Some(age) = self.age {
            updated.age = age;
        }
        if let Some(hypertension) = self.hypertension {
            updated.hypertension = hypertension;
        }
        if let Some(heart_disease) = self.heart_disease {
            updated.heart_disease = heart_disease;
        }
        if let Some(ever_married) = self.ever_married {
            updated.ever_married = ever_married;
        }
        if let Some(work_type) = self.work_type {
            updated.work_type = work_type;
        }
        if let Some(residence_type) = self.residence_type {
            updated.residence_type = residence_type;
        }
        if let Some(avg_glucose_level) = self.avg_glucose_level {
            updated.avg_glucose_level = avg_glucose_level;
        }
        if let Some(bmi) = self.bmi {
            updated.bmi = bmi;
        }
        if let Some(smoking_status) = self.smoking_status {
            updated.smoking_status = smoking_status;
        }
        if let Some(stroke) = self.stroke {
            updated.stroke = stroke;
        }
        updated
    }
}

/// Serde adapter distinguishing an absent optional field from an explicit
/// null. Absent deserializes to `None` via `#[serde(default)]`; a present
/// value, null included, lands in `Some`.
mod nullable {
    use serde::de::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Option<f64>>, D::Error> {
        Option::<f64>::deserialize(deserializer).map(Some)
    }
}

/// Serde adapter for `{0, 1}` flag fields stored as integers.
mod flag {
    use serde::de::{self, Deserialize, Deserializer};
    use serde::ser::Serializer;

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(de::Error::custom(format!(
                "flag must be 0 or 1, got {other}"
            ))),
        }
    }
}

/// Serde adapter for optional `{0, 1}` flag fields.
mod flag_opt {
    use serde::de::{Deserialize, Deserializer};
    use serde::ser::Serializer;

    pub fn serialize<S: Serializer>(value: &Option<bool>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(flag) => serializer.serialize_u8(u8::from(*flag)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<bool>, D::Error> {
        let value: Option<u8> = Option::deserialize(deserializer)?;
        match value {
            None => Ok(None),
            Some(0) => Ok(Some(false)),
            Some(1) => Ok(Some(true)),
            Some(other) => Err(serde::de::Error::custom(format!(
                "flag must be 0 or 1, got {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> NormalizedRecord {
        NormalizedRecord {
            patient_id: PatientId::new(1001).unwrap(),
            gender: Gender::Male,
            age: 45.0,
            hypertension: false,
            heart_disease: true,
            ever_married: EverMarried::Yes,
            work_type: WorkType::Private,
            residence_type: ResidenceType::Urban,
            avg_glucose_level: 105.4,
            bmi: Some(27.3),
            smoking_status: SmokingStatus::NeverSmoked,
            stroke: false,
        }
    }

    #[test]
    fn record_serializes_with_dataset_spellings() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["gender"], json!("Male"));
        assert_eq!(value["work_type"], json!("Private"));
        assert_eq!(value["smoking_status"], json!("never smoked"));
        assert_eq!(value["hypertension"], json!(0));
        assert_eq!(value["heart_disease"], json!(1));
    }

    #[test]
    fn record_round_trips() {
        let record = sample();
        let value = serde_json::to_value(&record).unwrap();
        let back: NormalizedRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn flag_rejects_values_outside_zero_one() {
        let mut value = serde_json::to_value(sample()).unwrap();
        value["stroke"] = json!(2);
        assert!(serde_json::from_value::<NormalizedRecord>(value).is_err());
    }

    #[test]
    fn patch_apply_overwrites_present_fields_only() {
        let record = sample();
        let patch = RecordPatch {
            age: Some(46.0),
            ..RecordPatch::default()
        };
        let updated = patch.apply(&record);
        assert_eq!(updated.age, 46.0);
        assert_eq!(updated.gender, record.gender);
        assert_eq!(updated.patient_id, record.patient_id);
    }

    #[test]
    fn explicit_null_bmi_clears_the_stored_value() {
        let record = sample();
        assert_eq!(record.bmi, Some(27.3));

        let patch: RecordPatch = serde_json::from_value(json!({ "bmi": null })).unwrap();
        assert_eq!(patch.bmi, Some(None));
        assert!(!patch.is_empty());
        assert_eq!(patch.apply(&record).bmi, None);

        // An absent bmi leaves the stored value untouched.
        let patch: RecordPatch = serde_json::from_value(json!({ "age": 46 })).unwrap();
        assert_eq!(patch.bmi, None);
        assert_eq!(patch.apply(&record).bmi, Some(27.3));
    }

    #[test]
    fn categorical_spellings_match_serialization() {
        assert_eq!(WorkType::SelfEmployed.as_str(), "Self-employed");
        assert_eq!(
            serde_json::to_value(WorkType::SelfEmployed).unwrap(),
            json!(WorkType::SelfEmployed.as_str())
        );
        assert_eq!(SmokingStatus::FormerlySmoked.as_str(), "formerly smoked");
        assert_eq!(Gender::Other.as_str(), "Other");
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(RecordPatch::default().is_empty());
        let patch = RecordPatch {
            stroke: Some(true),
            ..RecordPatch::default()
        };
        assert!(!patch.is_empty());
    }
}
