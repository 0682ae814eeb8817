//! Raw sheet to record conversion
//!
//! Zips each data row against the header row to build header-keyed records.
//! Header validation runs first so schema drift fails loudly instead of
//! leaking nulls into the averaging logic downstream.

use crate::error::{RatinglensError, Result};
use crate::types::{RawSheet, Record, RecordSet, REQUIRED_COLUMNS};

/// Check that every required column is present in the header row.
pub fn validate_headers(headers: &[String]) -> Result<()> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !headers.iter().any(|header| header == *required))
        .copied()
        .collect();

    if !missing.is_empty() {
        return Err(RatinglensError::Schema(format!(
            "Missing required column(s): {}",
            missing.join(", ")
        )));
    }

    Ok(())
}

/// Convert a raw sheet into records.
///
/// Cells beyond a short row's length read as null; cells beyond the header
/// count are dropped. A header-only sheet yields an empty record set.
pub fn structure(sheet: &RawSheet) -> Result<RecordSet> {
    let headers = sheet.headers();
    validate_headers(headers)?;

    Ok(sheet
        .data_rows()
        .iter()
        .map(|row| {
            Record::new(
                headers
                    .iter()
                    .enumerate()
                    .map(|(index, header)| (header.clone(), row.get(index).cloned()))
                    .collect(),
            )
        })
        .collect())
}
