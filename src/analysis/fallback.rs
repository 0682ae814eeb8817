//! Deterministic local analysis fallback
//!
//! Computes the same class of answer the completion service would give for
//! simple aggregate questions: session counts, average ratings, per-group
//! breakdowns. Used whenever the completion service fails, so it never
//! raises past its own boundary; any internal failure is rendered as an
//! explicit error string inside the answer.

use crate::analysis::relevance::vocabulary;
use crate::types::{
    Record, RecordSet, COL_COHORTS, COL_DOMAIN, COL_INSTRUCTOR, COL_RATING, COL_SESSION_DATE,
    COL_TOPIC,
};
use std::fmt::Write;
use tracing::debug;

/// Answer a query from the record set alone.
///
/// First instructor name found in the query wins; otherwise the first
/// domain name; otherwise a fixed could-not-analyze message.
pub fn analyze_locally(query: &str, records: &RecordSet) -> String {
    debug!("Running local analysis for query: {}", query);

    match try_analyze(query, records) {
        Ok(report) => report,
        Err(e) => format!("Error performing analysis: {}", e),
    }
}

fn try_analyze(query: &str, records: &RecordSet) -> Result<String, std::fmt::Error> {
    let lower_query = query.to_lowercase();

    for instructor in vocabulary(records, COL_INSTRUCTOR) {
        if lower_query.contains(&instructor.to_lowercase()) {
            return instructor_report(instructor, records);
        }
    }

    for domain in vocabulary(records, COL_DOMAIN) {
        if lower_query.contains(&domain.to_lowercase()) {
            return domain_report(domain, records);
        }
    }

    Ok(
        "Could not analyze this specific query. Please try asking about a specific instructor or domain."
            .to_string(),
    )
}

/// Mean of the parseable rating values, or `None` when nothing parses.
///
/// Unparseable, non-finite, empty, and missing cells are discarded; a
/// parseable zero still counts. The absent case stays `None` so callers
/// report it explicitly instead of printing a misleading zero.
pub fn average_rating(records: &[&Record]) -> Option<f64> {
    let values: Vec<f64> = records
        .iter()
        .filter_map(|record| record.get(COL_RATING))
        .filter_map(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .collect();

    if values.is_empty() {
        return None;
    }

    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn instructor_report(instructor: &str, records: &RecordSet) -> Result<String, std::fmt::Error> {
    let rows: Vec<&Record> = records
        .iter()
        .filter(|record| record.get(COL_INSTRUCTOR) == Some(instructor))
        .collect();

    let mut report = format!("Information for instructor {}:\n\n", instructor);
    writeln!(report, "Total sessions: {}", rows.len())?;
    match average_rating(&rows) {
        Some(avg) => writeln!(report, "Overall average rating: {:.2}", avg)?,
        None => writeln!(report, "Overall average rating: No valid ratings available")?,
    }

    writeln!(report, "\nSessions by domain:")?;
    for (domain, group) in group_by(&rows, COL_DOMAIN) {
        write!(report, "- {}: {} session(s)", domain, group.len())?;
        if let Some(avg) = average_rating(&group) {
            write!(report, ", Average rating: {:.2}", avg)?;
        }
        report.push('\n');
    }

    writeln!(report, "\nSessions:")?;
    for (index, row) in rows.iter().enumerate() {
        writeln!(
            report,
            "{}. {}",
            index + 1,
            non_empty(row.get(COL_TOPIC)).unwrap_or("Unknown Topic")
        )?;
        writeln!(
            report,
            "   - Domain: {}",
            non_empty(row.get(COL_DOMAIN)).unwrap_or("Not specified")
        )?;
        writeln!(
            report,
            "   - Date: {}",
            non_empty(row.get(COL_SESSION_DATE)).unwrap_or("Not specified")
        )?;
        writeln!(
            report,
            "   - Rating: {}",
            non_empty(row.get(COL_RATING)).unwrap_or("Not rated")
        )?;
        if let Some(cohorts) = non_empty(row.get(COL_COHORTS)) {
            writeln!(report, "   - Cohorts: {}", cohorts)?;
        }
        report.push('\n');
    }

    Ok(report)
}

fn domain_report(domain: &str, records: &RecordSet) -> Result<String, std::fmt::Error> {
    let rows: Vec<&Record> = records
        .iter()
        .filter(|record| record.get(COL_DOMAIN) == Some(domain))
        .collect();

    let mut report = format!("Analysis for {} domain:\n\n", domain);
    writeln!(report, "Total sessions: {}", rows.len())?;
    match average_rating(&rows) {
        Some(avg) => writeln!(report, "Overall average rating: {:.2}", avg)?,
        None => writeln!(report, "Overall average rating: No valid ratings available")?,
    }

    writeln!(report, "\nSessions by instructor:")?;
    for (instructor, group) in group_by(&rows, COL_INSTRUCTOR) {
        write!(report, "- {}: {} session(s)", instructor, group.len())?;
        if let Some(avg) = average_rating(&group) {
            write!(report, ", Average rating: {:.2}", avg)?;
        }
        report.push('\n');
    }

    Ok(report)
}

/// Group rows by a column in first-seen order. Null and empty cells fall
/// into an "Unknown" group.
fn group_by<'a>(rows: &[&'a Record], column: &str) -> Vec<(String, Vec<&'a Record>)> {
    let mut groups: Vec<(String, Vec<&'a Record>)> = Vec::new();

    for row in rows {
        let name = non_empty(row.get(column)).unwrap_or("Unknown").to_string();
        match groups.iter_mut().find(|(group, _)| *group == name) {
            Some((_, members)) => members.push(row),
            None => groups.push((name, vec![row])),
        }
    }

    groups
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
