//! Census normalization pipeline
//!
//! Raw survey rows become canonical student records (key derivation and
//! classification), are upserted into a [`CensusStore`](crate::store::CensusStore),
//! and the full record set is folded into the nested output directory.

pub mod classify;
pub mod clock;
pub mod csv_input;
pub mod directory;
pub mod fields;
pub mod keys;
pub mod mapper;
pub mod pipeline;
pub mod record;

pub use classify::{academic_career, major_display};
pub use clock::{Clock, FixedClock, SystemClock};
pub use csv_input::{parse_census_csv, parse_census_str};
pub use directory::{aggregate, OutputDirectory};
pub use fields::{CensusField, RawRow};
pub use keys::{generate_student_id, major_abbreviation_key, parse_academic_year_key};
pub use mapper::map_row_to_record;
pub use pipeline::{CensusPipeline, IngestReport};
pub use record::{AuditFields, CanonicalStudentRecord, PublicProfile, StudentKey};
