//! Canonical student record and its public projection

use serde::{Deserialize, Serialize};
use std::fmt;

/// Composite identity of a canonical record
///
/// `student_id` alone is not unique; two rows are the same record only when
/// all three parts match.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StudentKey {
    pub student_id: String,
    pub academic_year_key: String,
    pub major_abbreviation_key: String,
}

impl StudentKey {
    pub fn new(
        student_id: impl Into<String>,
        academic_year_key: impl Into<String>,
        major_abbreviation_key: impl Into<String>,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            academic_year_key: academic_year_key.into(),
            major_abbreviation_key: major_abbreviation_key.into(),
        }
    }
}

impl fmt::Display for StudentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.academic_year_key, self.major_abbreviation_key, self.student_id
        )
    }
}

/// Profile fields published in the output directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicProfile {
    pub name: Option<String>,
    /// Raw intake batch text, unnormalized
    pub admit_year: Option<String>,
    pub academic_career: String,
    pub major: Option<String>,
    pub writeup: Option<String>,
    pub picture_url: Option<String>,
    pub notable_achievements: Option<String>,
    pub interests_hobbies: Option<String>,
    pub linkedin_url: Option<String>,
    pub instagram_url: Option<String>,
    pub github_url: Option<String>,
}

/// Raw values kept for traceability; never published
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFields {
    pub raw_course_name: Option<String>,
    pub raw_masters_course: Option<String>,
    pub raw_intake_batch: Option<String>,
    pub email: Option<String>,
    pub raw_ddp_minor: Option<String>,
    pub raw_experience_places: Option<String>,
}

/// One student after key derivation and classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalStudentRecord {
    #[serde(flatten)]
    pub key: StudentKey,
    #[serde(flatten)]
    pub profile: PublicProfile,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl CanonicalStudentRecord {
    /// Name for error and log context, falling back to the student id
    pub fn display_name(&self) -> &str {
        self.profile.name.as_deref().unwrap_or(&self.key.student_id)
    }

    /// Drop identity and audit fields
    pub fn into_public(self) -> (StudentKey, PublicProfile) {
        (self.key, self.profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: Option<&str>) -> CanonicalStudentRecord {
        CanonicalStudentRecord {
            key: StudentKey::new("jane-tan", "ay21-22", "CEG"),
            profile: PublicProfile {
                name: name.map(str::to_string),
                academic_career: "E-Scholars Undergraduate".to_string(),
                ..PublicProfile::default()
            },
            audit: AuditFields {
                email: Some("jane@example.com".to_string()),
                ..AuditFields::default()
            },
        }
    }

    #[test]
    fn test_key_display_is_path_like() {
        let key = StudentKey::new("jane-tan", "ay21-22", "CEG");
        assert_eq!(key.to_string(), "ay21-22/CEG/jane-tan");
    }

    #[test]
    fn test_keys_differing_only_by_year_are_distinct() {
        let a = StudentKey::new("jane-tan", "ay21-22", "CEG");
        let b = StudentKey::new("jane-tan", "ay22-23", "CEG");
        assert_ne!(a, b);
        assert!(a < b);
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        assert_eq!(record(Some("Jane Tan")).display_name(), "Jane Tan");
        assert_eq!(record(None).display_name(), "jane-tan");
    }

    #[test]
    fn test_public_profile_serializes_snake_case_fields_only() {
        let (_, profile) = record(Some("Jane Tan")).into_public();
        let value = serde_json::to_value(&profile).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), 11);
        assert_eq!(object["name"], "Jane Tan");
        assert_eq!(object["academic_career"], "E-Scholars Undergraduate");
        assert!(object["github_url"].is_null());
        assert!(!object.contains_key("email"));
        assert!(!object.contains_key("student_id"));
    }

    #[test]
    fn test_record_serializes_flat() {
        let value = serde_json::to_value(record(Some("Jane Tan"))).unwrap();
        assert_eq!(value["student_id"], "jane-tan");
        assert_eq!(value["academic_year_key"], "ay21-22");
        assert_eq!(value["email"], "jane@example.com");
        assert_eq!(value["name"], "Jane Tan");
    }
}
