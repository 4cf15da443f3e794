//! Visit record models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Store-assigned row identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(RecordId)
    }
}

/// The editable columns of a visit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisitField {
    FileNumber,
    Name,
    FatherName,
    Doctor,
    CorrectiveDoctor,
    Services,
    WhichTooth,
    ReturnDoctor,
    ReturnReason,
}

impl VisitField {
    /// All editable fields, in form order.
    pub const ALL: [VisitField; 9] = [
        VisitField::FileNumber,
        VisitField::Name,
        VisitField::FatherName,
        VisitField::Doctor,
        VisitField::CorrectiveDoctor,
        VisitField::Services,
        VisitField::WhichTooth,
        VisitField::ReturnDoctor,
        VisitField::ReturnReason,
    ];

    /// Fields tested by the browser's free-text search.
    pub const SEARCHABLE: [VisitField; 6] = [
        VisitField::FileNumber,
        VisitField::Name,
        VisitField::FatherName,
        VisitField::Doctor,
        VisitField::CorrectiveDoctor,
        VisitField::Services,
    ];

    /// Column name in the `users` table.
    pub fn column(&self) -> &'static str {
        match self {
            VisitField::FileNumber => "file_number",
            VisitField::Name => "name",
            VisitField::FatherName => "father_name",
            VisitField::Doctor => "doctor",
            VisitField::CorrectiveDoctor => "corrective_doctor",
            VisitField::Services => "services",
            VisitField::WhichTooth => "which_tooth",
            VisitField::ReturnDoctor => "return_doctor",
            VisitField::ReturnReason => "return_reason",
        }
    }
}

impl fmt::Display for VisitField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for VisitField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        VisitField::ALL
            .into_iter()
            .find(|field| field.column() == normalized)
            .ok_or_else(|| format!("Unknown field: {}", s))
    }
}

/// The user-entered part of a visit record.
///
/// Text columns may be `NULL` in the store; they are read as empty strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VisitFields {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub file_number: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub father_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub doctor: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub corrective_doctor: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub services: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub which_tooth: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub return_doctor: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub return_reason: String,
}

impl VisitFields {
    /// Read one field.
    pub fn get(&self, field: VisitField) -> &str {
        match field {
            VisitField::FileNumber => &self.file_number,
            VisitField::Name => &self.name,
            VisitField::FatherName => &self.father_name,
            VisitField::Doctor => &self.doctor,
            VisitField::CorrectiveDoctor => &self.corrective_doctor,
            VisitField::Services => &self.services,
            VisitField::WhichTooth => &self.which_tooth,
            VisitField::ReturnDoctor => &self.return_doctor,
            VisitField::ReturnReason => &self.return_reason,
        }
    }

    /// Overwrite one field.
    pub fn set(&mut self, field: VisitField, value: impl Into<String>) {
        let slot = match field {
            VisitField::FileNumber => &mut self.file_number,
            VisitField::Name => &mut self.name,
            VisitField::FatherName => &mut self.father_name,
            VisitField::Doctor => &mut self.doctor,
            VisitField::CorrectiveDoctor => &mut self.corrective_doctor,
            VisitField::Services => &mut self.services,
            VisitField::WhichTooth => &mut self.which_tooth,
            VisitField::ReturnDoctor => &mut self.return_doctor,
            VisitField::ReturnReason => &mut self.return_reason,
        };
        *slot = value.into();
    }

    /// Fields whose value differs from `other`.
    pub fn diff(&self, other: &VisitFields) -> Vec<VisitField> {
        VisitField::ALL
            .into_iter()
            .filter(|field| self.get(*field) != other.get(*field))
            .collect()
    }

    /// True when every field is empty.
    pub fn is_blank(&self) -> bool {
        VisitField::ALL.iter().all(|field| self.get(*field).is_empty())
    }
}

/// A row to insert: user fields plus the clinic-local creation time.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewVisit {
    #[serde(flatten)]
    pub fields: VisitFields,
    pub created_at: String,
}

/// A visit record as held by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisitRecord {
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: VisitFields,
    /// Raw stored timestamp; see [`crate::calendar::ClinicClock::parse`].
    #[serde(default, deserialize_with = "null_as_empty")]
    pub created_at: String,
}

impl VisitRecord {
    pub fn file_number(&self) -> &str {
        &self.fields.file_number
    }

    /// Copy of this record with `fields` applied; id and timestamp kept.
    pub fn merged(&self, fields: &VisitFields) -> VisitRecord {
        VisitRecord {
            id: self.id,
            fields: fields.clone(),
            created_at: self.created_at.clone(),
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_fields() -> VisitFields {
        VisitFields {
            file_number: "A1".into(),
            name: "Sara Ahmadi".into(),
            father_name: "Reza".into(),
            doctor: "Dr. Karimi".into(),
            corrective_doctor: String::new(),
            services: "Filling".into(),
            which_tooth: "Lower left 6".into(),
            return_doctor: String::new(),
            return_reason: String::new(),
        }
    }

    #[test]
    fn test_field_round_trip_by_column() {
        for field in VisitField::ALL {
            assert_eq!(field.column().parse::<VisitField>().unwrap(), field);
        }
        assert_eq!("father-name".parse::<VisitField>().unwrap(), VisitField::FatherName);
        assert!("age".parse::<VisitField>().is_err());
    }

    #[test]
    fn test_get_set_and_diff() {
        let original = sample_fields();
        let mut edited = original.clone();
        edited.set(VisitField::Doctor, "Dr. Rahimi");
        edited.set(VisitField::ReturnReason, "Pain");

        assert_eq!(edited.get(VisitField::Doctor), "Dr. Rahimi");
        assert_eq!(
            edited.diff(&original),
            vec![VisitField::Doctor, VisitField::ReturnReason]
        );
        assert!(original.diff(&original).is_empty());
    }

    #[test]
    fn test_record_deserializes_nulls_as_empty() {
        let json = r#"{
            "id": 7,
            "file_number": "B2",
            "name": "Ali",
            "father_name": null,
            "doctor": "Dr. Karimi",
            "corrective_doctor": null,
            "services": "Cleaning",
            "created_at": "2026-10-18T10:00:00"
        }"#;
        let record: VisitRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, RecordId(7));
        assert_eq!(record.fields.father_name, "");
        assert_eq!(record.fields.which_tooth, "");
        assert_eq!(record.file_number(), "B2");
    }

    #[test]
    fn test_new_visit_serializes_flat() {
        let visit = NewVisit {
            fields: sample_fields(),
            created_at: "2026-10-18T10:00:00".into(),
        };
        let value = serde_json::to_value(&visit).unwrap();
        assert_eq!(value["file_number"], "A1");
        assert_eq!(value["created_at"], "2026-10-18T10:00:00");
        assert!(value.get("fields").is_none());
    }

    #[test]
    fn test_merged_keeps_identity() {
        let record = VisitRecord {
            id: RecordId(3),
            fields: sample_fields(),
            created_at: "2026-10-18T10:00:00".into(),
        };
        let mut fields = sample_fields();
        fields.name = "Sara A.".into();

        let merged = record.merged(&fields);
        assert_eq!(merged.id, RecordId(3));
        assert_eq!(merged.created_at, record.created_at);
        assert_eq!(merged.fields.name, "Sara A.");
    }
}
