//! Nested output directory: academic year -> major -> student id -> profile
//!
//! Rebuilt from the full record set on every run; keys are ordered at
//! every level so the JSON snapshot is stable across runs.

use super::record::{CanonicalStudentRecord, PublicProfile, StudentKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Student id -> profile
pub type MajorGroup = BTreeMap<String, PublicProfile>;

/// Major key -> students
pub type YearGroup = BTreeMap<String, MajorGroup>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputDirectory {
    years: BTreeMap<String, YearGroup>,
}

impl OutputDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a profile at its key path, returning any profile it displaced
    pub fn insert(&mut self, key: StudentKey, profile: PublicProfile) -> Option<PublicProfile> {
        self.years
            .entry(key.academic_year_key)
            .or_default()
            .entry(key.major_abbreviation_key)
            .or_default()
            .insert(key.student_id, profile)
    }

    pub fn get(&self, academic_year_key: &str, major_key: &str, student_id: &str) -> Option<&PublicProfile> {
        self.years
            .get(academic_year_key)?
            .get(major_key)?
            .get(student_id)
    }

    pub fn year(&self, academic_year_key: &str) -> Option<&YearGroup> {
        self.years.get(academic_year_key)
    }

    /// Number of profiles across all years and majors
    pub fn leaf_count(&self) -> usize {
        self.years
            .values()
            .flat_map(|year| year.values())
            .map(|major| major.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn years(&self) -> impl Iterator<Item = (&str, &YearGroup)> {
        self.years.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Fold canonical records into the directory
///
/// Identity and audit fields are stripped. If two records share a key the
/// later one in iteration order wins.
pub fn aggregate<'a, I>(records: I) -> OutputDirectory
where
    I: IntoIterator<Item = &'a CanonicalStudentRecord>,
{
    let mut directory = OutputDirectory::new();
    for record in records {
        directory.insert(record.key.clone(), record.profile.clone());
    }
    directory
}
