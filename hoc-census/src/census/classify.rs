//! Classification derived from the major abbreviation key

use super::keys::{DESIGN_KEY, MASTERS_KEY, UNKNOWN_MAJOR_KEY};

pub const GRADUATE_CAREER: &str = "E-Scholars Graduate";
pub const DESIGN_CAREER: &str = "D-Scholars";
pub const UNKNOWN_CAREER: &str = "Unknown Academic Career";
pub const UNDERGRADUATE_CAREER: &str = "E-Scholars Undergraduate";

/// Academic career label for a major key (total)
pub fn academic_career(major_key: &str) -> &'static str {
    match major_key {
        MASTERS_KEY => GRADUATE_CAREER,
        DESIGN_KEY => DESIGN_CAREER,
        UNKNOWN_MAJOR_KEY => UNKNOWN_CAREER,
        _ => UNDERGRADUATE_CAREER,
    }
}

/// Display name for the major, suppressed for `MS`, `DS` and `UNKNOWN`
pub fn major_display(course_name: Option<&str>, major_key: &str) -> Option<String> {
    match major_key {
        MASTERS_KEY | DESIGN_KEY | UNKNOWN_MAJOR_KEY => None,
        _ => course_name.map(str::to_string),
    }
}
