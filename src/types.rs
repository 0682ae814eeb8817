//! Core data types for the ratinglens analysis service
//!
//! This module defines the fundamental data structures used throughout
//! ratinglens: the raw sheet payload, header-keyed session records, the
//! de-duplication key for tier unions, and the terminal analysis outcome.

/// Column holding the instructor name
pub const COL_INSTRUCTOR: &str = "Instructor";

/// Column holding the teaching domain (Backend, Frontend, ...)
pub const COL_DOMAIN: &str = "Domain";

/// Column holding the topic code
pub const COL_TOPIC: &str = "Topic Code";

/// Column holding the session date
pub const COL_SESSION_DATE: &str = "Session Date";

/// Column holding the overall average rating for the session
pub const COL_RATING: &str = "Overall Average Rating";

/// Column holding the cohort list (optional in the sheet)
pub const COL_COHORTS: &str = "Cohorts";

/// Columns a usable ratings sheet must carry. `Cohorts` is optional.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    COL_INSTRUCTOR,
    COL_DOMAIN,
    COL_TOPIC,
    COL_SESSION_DATE,
    COL_RATING,
];

/// Raw tabular payload fetched from the spreadsheet service.
///
/// The first row is the header; every later row is interpreted against that
/// header regardless of its length.
#[derive(Debug, Clone)]
pub struct RawSheet {
    /// Name of the tab the rows came from
    pub sheet_name: String,

    /// All rows including the header row
    pub rows: Vec<Vec<String>>,
}

impl RawSheet {
    /// The header row, or an empty slice for a sheet with no rows.
    pub fn headers(&self) -> &[String] {
        self.rows.first().map(|row| row.as_slice()).unwrap_or(&[])
    }

    /// The data rows (everything after the header).
    pub fn data_rows(&self) -> &[Vec<String>] {
        if self.rows.len() > 1 {
            &self.rows[1..]
        } else {
            &[]
        }
    }
}

/// One session record: an ordered mapping from header name to optional cell
/// value. Key order follows header order; built once per sheet and immutable
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    fields: Vec<(String, Option<String>)>,
}

impl Record {
    /// Build a record from already-ordered (header, value) pairs.
    pub fn new(fields: Vec<(String, Option<String>)>) -> Self {
        Self { fields }
    }

    /// Look up a cell by column name. Missing columns and null cells both
    /// read as `None`.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .and_then(|(_, value)| value.as_deref())
    }

    /// The de-duplication identity of this record.
    pub fn entity_key(&self) -> EntityKey {
        EntityKey {
            topic: self.get(COL_TOPIC).map(str::to_owned),
            instructor: self.get(COL_INSTRUCTOR).map(str::to_owned),
            session_date: self.get(COL_SESSION_DATE).map(str::to_owned),
        }
    }
}

/// Ordered collection of records, order preserved from the sheet minus the
/// header row.
pub type RecordSet = Vec<Record>;

/// De-duplication triple identifying one session record. Two records are
/// "the same" iff all three components are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityKey {
    pub topic: Option<String>,
    pub instructor: Option<String>,
    pub session_date: Option<String>,
}

/// Terminal value of one analyze request; never partially populated.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// An answer was produced, by the completion service or the local
    /// fallback.
    Answer(String),

    /// The pipeline failed before any analysis could run (fetch or schema).
    Failed(String),
}

impl AnalysisOutcome {
    /// Whether the request produced an answer.
    pub fn is_success(&self) -> bool {
        matches!(self, AnalysisOutcome::Answer(_))
    }
}
