//! Key derivation: student id, academic-year key, major abbreviation key
//!
//! All three functions are total. Unrecognized or missing input resolves to
//! a visible sentinel (`unknown-student-<millis>`, `unknown-ay`, `UNKNOWN`)
//! so operators can find and fix the record by hand.

use super::clock::Clock;
use once_cell::sync::Lazy;
use regex::Regex;

/// Prefix of the time-based id used when no usable name is present
pub const UNKNOWN_STUDENT_PREFIX: &str = "unknown-student-";

/// Academic-year sentinel
pub const UNKNOWN_ACADEMIC_YEAR: &str = "unknown-ay";

/// Masters students, regardless of undergraduate course
pub const MASTERS_KEY: &str = "MS";

/// Industrial design (D-Scholars)
pub const DESIGN_KEY: &str = "DS";

/// Major sentinel
pub const UNKNOWN_MAJOR_KEY: &str = "UNKNOWN";

/// Course-name fragments in match order; first hit wins.
///
/// "engineering science" must come after the specific engineering majors
/// and "industrial and systems engineering" before "industrial design".
const COURSE_KEYS: [(&str, &str); 10] = [
    ("biomedical engineering", "BME"),
    ("computer engineering", "CEG"),
    ("chemical engineering", "CHBE"),
    ("electrical engineering", "EEE"),
    ("environmental engineering", "EVE"),
    ("materials science", "MLE"),
    ("mechanical engineering", "MPE"),
    ("engineering science", "ESP"),
    ("industrial and systems engineering", "ISE"),
    ("industrial design", DESIGN_KEY),
];

static ACADEMIC_YEAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)AY([0-9]{2})/([0-9]{2})").expect("academic year pattern is valid"));

/// Derive the student id slug from a full name
///
/// Lowercases, turns each whitespace run into one hyphen, drops anything
/// outside `[a-z0-9_-]` and trims hyphens from both ends. Falls back to
/// `unknown-student-<millis>` when the name is absent or slugs to nothing.
pub fn generate_student_id(full_name: Option<&str>, clock: &dyn Clock) -> String {
    let slug = full_name.map(slugify).unwrap_or_default();
    if slug.is_empty() {
        format!("{}{}", UNKNOWN_STUDENT_PREFIX, clock.now_millis())
    } else {
        slug
    }
}

fn slugify(name: &str) -> String {
    let lowered = name.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut in_whitespace = false;

    for ch in lowered.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
                in_whitespace = true;
            }
            continue;
        }
        in_whitespace = false;
        if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' {
            slug.push(ch);
        }
    }

    slug.trim_matches('-').to_string()
}

/// True for ids produced by the time-based fallback
pub fn is_unknown_student_id(student_id: &str) -> bool {
    student_id
        .strip_prefix(UNKNOWN_STUDENT_PREFIX)
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

/// `"Batch AY22/23"` -> `"ay22-23"`; anything without an `AYnn/nn` token -> `unknown-ay`
pub fn parse_academic_year_key(intake_batch: Option<&str>) -> String {
    intake_batch
        .and_then(|text| ACADEMIC_YEAR_PATTERN.captures(text))
        .map(|caps| format!("ay{}-{}", &caps[1], &caps[2]))
        .unwrap_or_else(|| UNKNOWN_ACADEMIC_YEAR.to_string())
}

/// Classify a course into its abbreviation key
///
/// A masters course, or "master" anywhere in the course name, yields `MS`
/// before any course-table matching is attempted.
pub fn major_abbreviation_key(course_name: Option<&str>, masters_course: Option<&str>) -> &'static str {
    let course = course_name.unwrap_or_default().to_lowercase();
    let has_masters = masters_course.is_some_and(|m| !m.trim().is_empty());

    if has_masters || course.contains("master") {
        return MASTERS_KEY;
    }

    COURSE_KEYS
        .iter()
        .find(|(fragment, _)| course.contains(fragment))
        .map(|(_, key)| *key)
        .unwrap_or(UNKNOWN_MAJOR_KEY)
}
