//! Raw row -> canonical record
//!
//! Pure apart from the clock read on the unknown-student fallback. Never
//! fails: a completely blank row still yields a well-formed record with
//! sentinel identity fields. Skipping blank rows is the caller's decision.

use super::classify::{academic_career, major_display};
use super::clock::Clock;
use super::fields::{CensusField, RawRow, GITHUB_URL_ALT_KEY};
use super::keys::{generate_student_id, major_abbreviation_key, parse_academic_year_key};
use super::record::{AuditFields, CanonicalStudentRecord, PublicProfile, StudentKey};

pub fn map_row_to_record(row: &RawRow, clock: &dyn Clock) -> CanonicalStudentRecord {
    let text = |field: CensusField| row.field(field).map(str::to_string);

    let full_name = row.field(CensusField::FullName);
    let course = row.field(CensusField::Course);
    let masters_course = row.field(CensusField::MastersCourse);
    let intake_batch = row.field(CensusField::IntakeBatch);

    let major_key = major_abbreviation_key(course, masters_course);
    let key = StudentKey {
        student_id: generate_student_id(full_name, clock),
        academic_year_key: parse_academic_year_key(intake_batch),
        major_abbreviation_key: major_key.to_string(),
    };

    let profile = PublicProfile {
        name: full_name.map(str::to_string),
        admit_year: intake_batch.map(str::to_string),
        academic_career: academic_career(major_key).to_string(),
        major: major_display(course, major_key),
        writeup: text(CensusField::Writeup),
        picture_url: text(CensusField::PictureUrl),
        notable_achievements: text(CensusField::NotableAchievements),
        interests_hobbies: text(CensusField::InterestsHobbies),
        linkedin_url: text(CensusField::LinkedinUrl),
        instagram_url: text(CensusField::InstagramUrl),
        github_url: row
            .field(CensusField::GithubUrl)
            .or_else(|| row.value(GITHUB_URL_ALT_KEY))
            .map(str::to_string),
    };

    let audit = AuditFields {
        raw_course_name: course.map(str::to_string),
        raw_masters_course: masters_course.map(str::to_string),
        raw_intake_batch: intake_batch.map(str::to_string),
        email: text(CensusField::PersonalEmail),
        raw_ddp_minor: text(CensusField::DdpMinor),
        raw_experience_places: text(CensusField::Experience),
    };

    CanonicalStudentRecord { key, profile, audit }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::census::clock::FixedClock;

    const CLOCK: FixedClock = FixedClock(42);

    fn row(pairs: &[(CensusField, &str)]) -> RawRow {
        pairs.iter().map(|(f, v)| (f.label(), *v)).collect()
    }

    fn full_row() -> RawRow {
        row(&[
            (CensusField::FullName, "  Jane Tan "),
            (CensusField::Course, "Computer Engineering"),
            (CensusField::IntakeBatch, "AY21/22"),
            (CensusField::DdpMinor, "Minor in Economics"),
            (CensusField::Experience, "NOC Singapore"),
            (CensusField::Writeup, " Hi! "),
            (CensusField::PictureUrl, "https://img.example/jane.png"),
            (CensusField::NotableAchievements, "Dean's List"),
            (CensusField::InterestsHobbies, "Climbing"),
            (CensusField::LinkedinUrl, "https://linkedin.com/in/jane"),
            (CensusField::PersonalEmail, "jane@example.com"),
            (CensusField::InstagramUrl, "https://instagram.com/jane"),
            (CensusField::GithubUrl, "https://github.com/jane"),
        ])
    }

    #[test]
    fn test_full_row_maps_every_field_trimmed() {
        let record = map_row_to_record(&full_row(), &CLOCK);

        assert_eq!(record.key, StudentKey::new("jane-tan", "ay21-22", "CEG"));
        assert_eq!(record.profile.name.as_deref(), Some("Jane Tan"));
        assert_eq!(record.profile.admit_year.as_deref(), Some("AY21/22"));
        assert_eq!(record.profile.academic_career, "E-Scholars Undergraduate");
        assert_eq!(record.profile.major.as_deref(), Some("Computer Engineering"));
        assert_eq!(record.profile.writeup.as_deref(), Some("Hi!"));
        assert_eq!(record.profile.github_url.as_deref(), Some("https://github.com/jane"));
        assert_eq!(record.audit.email.as_deref(), Some("jane@example.com"));
        assert_eq!(record.audit.raw_ddp_minor.as_deref(), Some("Minor in Economics"));
        assert_eq!(record.audit.raw_experience_places.as_deref(), Some("NOC Singapore"));
        assert_eq!(record.audit.raw_course_name.as_deref(), Some("Computer Engineering"));
        assert_eq!(record.audit.raw_masters_course, None);
    }

    #[test]
    fn test_mapping_is_deterministic() {
        assert_eq!(
            map_row_to_record(&full_row(), &CLOCK),
            map_row_to_record(&full_row(), &CLOCK)
        );
    }

    #[test]
    fn test_blank_row_yields_sentinel_record() {
        let record = map_row_to_record(&RawRow::new(), &CLOCK);

        assert_eq!(record.key.student_id, "unknown-student-42");
        assert_eq!(record.key.academic_year_key, "unknown-ay");
        assert_eq!(record.key.major_abbreviation_key, "UNKNOWN");
        assert_eq!(record.profile.academic_career, "Unknown Academic Career");
        assert_eq!(record.profile.name, None);
        assert_eq!(record.profile.major, None);
    }

    #[test]
    fn test_masters_student_has_no_major_display() {
        let record = map_row_to_record(
            &row(&[
                (CensusField::FullName, "Ravi Kumar"),
                (CensusField::Course, "Mechanical Engineering"),
                (CensusField::MastersCourse, "MSc in Robotics"),
                (CensusField::IntakeBatch, "AY23/24"),
            ]),
            &CLOCK,
        );

        assert_eq!(record.key.major_abbreviation_key, "MS");
        assert_eq!(record.profile.academic_career, "E-Scholars Graduate");
        assert_eq!(record.profile.major, None);
        assert_eq!(record.audit.raw_masters_course.as_deref(), Some("MSc in Robotics"));
    }

    #[test]
    fn test_github_alternative_key() {
        let mut raw = row(&[(CensusField::FullName, "Jane Tan")]);
        raw.insert(GITHUB_URL_ALT_KEY, "https://github.com/jt");

        let record = map_row_to_record(&raw, &CLOCK);
        assert_eq!(record.profile.github_url.as_deref(), Some("https://github.com/jt"));
    }

    #[test]
    fn test_survey_github_header_wins_over_alternative() {
        let mut raw = row(&[(CensusField::GithubUrl, "https://github.com/primary")]);
        raw.insert(GITHUB_URL_ALT_KEY, "https://github.com/other");

        let record = map_row_to_record(&raw, &CLOCK);
        assert_eq!(record.profile.github_url.as_deref(), Some("https://github.com/primary"));
    }

    #[test]
    fn test_unknown_headers_are_ignored() {
        let mut raw = full_row();
        raw.insert("Timestamp", "2024-08-01 10:00");
        assert_eq!(map_row_to_record(&raw, &CLOCK), map_row_to_record(&full_row(), &CLOCK));
    }
}
