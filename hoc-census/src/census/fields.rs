//! Survey field labels and the raw row container
//!
//! Census spreadsheets and single-profile submissions share one vocabulary:
//! the exact survey-question strings below. Keys are compared after
//! whitespace trimming, so exports that drop the trailing non-breaking space
//! on the DDP question still map.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Alternative key accepted for the GitHub link when the survey header is absent
pub const GITHUB_URL_ALT_KEY: &str = "github_url";

/// One known survey question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CensusField {
    FullName,
    Course,
    MastersCourse,
    DdpMinor,
    IntakeBatch,
    Experience,
    Writeup,
    PictureUrl,
    NotableAchievements,
    InterestsHobbies,
    LinkedinUrl,
    PersonalEmail,
    InstagramUrl,
    GithubUrl,
}

impl CensusField {
    pub const ALL: [CensusField; 14] = [
        CensusField::FullName,
        CensusField::Course,
        CensusField::MastersCourse,
        CensusField::DdpMinor,
        CensusField::IntakeBatch,
        CensusField::Experience,
        CensusField::Writeup,
        CensusField::PictureUrl,
        CensusField::NotableAchievements,
        CensusField::InterestsHobbies,
        CensusField::LinkedinUrl,
        CensusField::PersonalEmail,
        CensusField::InstagramUrl,
        CensusField::GithubUrl,
    ];

    /// Exact header text as it appears in the survey export
    pub const fn label(self) -> &'static str {
        match self {
            CensusField::FullName => "Full name (as per NRIC)",
            CensusField::Course => "What course are you from?",
            CensusField::MastersCourse => "If you are doing Masters, what is your masters course?",
            CensusField::DdpMinor => "If you are taking any DDP, Double Major or Minor, please specify: (eg. DDP with Business Administration) \u{a0}",
            CensusField::IntakeBatch => "Which intake batch are you from?",
            CensusField::Experience => "(If applicable) Where did you go (or will be going) for SEP/summer/winter (school), NOC (location and company), internships (company)",
            CensusField::Writeup => "Self write-up (e.g. Yuxuan's self write-up below). It'll be publicly available so you can also use it as a personal showcase page! (Limit: 200 words)",
            CensusField::PictureUrl => "Upload a picture of yourself! Example on the right",
            CensusField::NotableAchievements => "Notable Achievements (if any, up to 3!) Example on the right",
            CensusField::InterestsHobbies => "Any interests/hobbies? (Up to 3!) Example on the right",
            CensusField::LinkedinUrl => "LinkedIn Link (if any)",
            CensusField::PersonalEmail => "Personal Email",
            CensusField::InstagramUrl => "Instagram Link (if any)",
            CensusField::GithubUrl => "Github Link (if any)",
        }
    }

    /// Match a header against the known labels (whitespace-insensitive at the ends)
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = normalize_key(label);
        Self::ALL
            .into_iter()
            .find(|field| normalize_key(field.label()) == wanted)
    }
}

fn normalize_key(key: &str) -> &str {
    key.trim_start_matches('\u{feff}').trim()
}

/// Untyped header -> value mapping for one submitted row
///
/// Produced by the CSV reader or a form body; consumed by the record mapper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow {
    fields: BTreeMap<String, String>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value; the key is stored trimmed
    pub fn insert(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        self.fields
            .insert(normalize_key(key.as_ref()).to_string(), value.into());
    }

    /// Build a row from a flat JSON object (single-profile submission)
    ///
    /// Strings are kept verbatim, numbers and booleans are rendered as text,
    /// nulls are dropped. Nested values are rendered as compact JSON.
    pub fn from_json_object(object: Map<String, Value>) -> Self {
        let mut row = Self::new();
        for (key, value) in object {
            match value {
                Value::Null => {}
                Value::String(s) => row.insert(key, s),
                other => row.insert(key, other.to_string()),
            }
        }
        row
    }

    /// Trimmed value for an arbitrary key, `None` when absent or blank
    pub fn value(&self, key: &str) -> Option<&str> {
        self.fields
            .get(normalize_key(key))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Trimmed value for a survey field, `None` when absent or blank
    pub fn field(&self, field: CensusField) -> Option<&str> {
        self.value(field.label())
    }

    /// True when no survey field (nor the alternate GitHub key) has a value
    ///
    /// Columns outside the survey, such as a form export's timestamp, are
    /// ignored.
    pub fn is_blank(&self) -> bool {
        CensusField::ALL.iter().all(|f| self.field(*f).is_none())
            && self.value(GITHUB_URL_ALT_KEY).is_none()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for RawRow
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (key, value) in iter {
            row.insert(key, value);
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_labels_are_unique() {
        let mut labels: Vec<&str> = CensusField::ALL.iter().map(|f| f.label()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), CensusField::ALL.len());
    }

    #[test]
    fn test_from_label_round_trips_every_field() {
        for field in CensusField::ALL {
            assert_eq!(CensusField::from_label(field.label()), Some(field));
        }
    }

    #[test]
    fn test_ddp_header_matches_without_trailing_nbsp() {
        let stripped = CensusField::DdpMinor.label().trim_end_matches('\u{a0}').trim_end();
        assert_eq!(CensusField::from_label(stripped), Some(CensusField::DdpMinor));

        let row: RawRow = [(stripped, "DDP with Business Administration")]
            .into_iter()
            .collect();
        assert_eq!(
            row.field(CensusField::DdpMinor),
            Some("DDP with Business Administration")
        );
    }

    #[test]
    fn test_bom_prefixed_header_is_recognized() {
        let row: RawRow = [("\u{feff}Full name (as per NRIC)", "Jane Tan")]
            .into_iter()
            .collect();
        assert_eq!(row.field(CensusField::FullName), Some("Jane Tan"));
    }

    #[test]
    fn test_field_trims_and_drops_blank_values() {
        let row: RawRow = [
            (CensusField::FullName.label(), "  Jane Tan \t"),
            (CensusField::Course.label(), "   "),
        ]
        .into_iter()
        .collect();

        assert_eq!(row.field(CensusField::FullName), Some("Jane Tan"));
        assert_eq!(row.field(CensusField::Course), None);
        assert_eq!(row.field(CensusField::Writeup), None);
    }

    #[test]
    fn test_is_blank() {
        assert!(RawRow::new().is_blank());

        let whitespace: RawRow = [
            (CensusField::FullName.label(), " "),
            (CensusField::Writeup.label(), "\t\n"),
        ]
        .into_iter()
        .collect();
        assert!(whitespace.is_blank());

        let filled: RawRow = [
            (CensusField::FullName.label(), " "),
            (CensusField::Writeup.label(), "x"),
        ]
        .into_iter()
        .collect();
        assert!(!filled.is_blank());
    }

    #[test]
    fn test_is_blank_ignores_columns_outside_the_survey() {
        let stamped: RawRow = [("Timestamp", "2024/08/01 12:30:00"), ("Score", "7")]
            .into_iter()
            .collect();
        assert!(stamped.is_blank());

        let github_only: RawRow = [(GITHUB_URL_ALT_KEY, "https://github.com/jt")]
            .into_iter()
            .collect();
        assert!(!github_only.is_blank());
    }

    #[test]
    fn test_from_json_object_renders_scalars() {
        let object = json!({
            "Full name (as per NRIC)": "Jane Tan",
            "Which intake batch are you from?": null,
            "count": 3,
            "flag": true
        });
        let Value::Object(map) = object else { unreachable!() };

        let row = RawRow::from_json_object(map);
        assert_eq!(row.field(CensusField::FullName), Some("Jane Tan"));
        assert_eq!(row.field(CensusField::IntakeBatch), None);
        assert_eq!(row.value("count"), Some("3"));
        assert_eq!(row.value("flag"), Some("true"));
        assert_eq!(row.len(), 3);
    }
}
