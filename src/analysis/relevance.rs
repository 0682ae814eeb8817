//! Tiered query relevance filtering
//!
//! Selects the record subset relevant to a free-text query. Matching runs
//! in ordered tiers: instructor mentions, then domain mentions (always
//! unioned), then topic mentions, then intent keywords, with a per
//! instructor sample when nothing matches at all. Tier results merge into
//! a running union de-duplicated by entity key.
//!
//! The tier ordering and the union/short-circuit policy decide which rows
//! the completion service ever sees, so they are part of the observable
//! contract of the system.

use crate::types::{EntityKey, Record, COL_DOMAIN, COL_INSTRUCTOR, COL_RATING, COL_TOPIC};
use std::collections::HashSet;
use tracing::debug;

/// Maximum records sampled per instructor when no tier matches
const SAMPLE_PER_INSTRUCTOR: usize = 3;

/// Select the records relevant to `query`.
///
/// The query is lower-cased once; every tier compares by case-insensitive
/// substring containment against vocabularies derived from the records.
pub fn filter<'a>(query: &str, records: &'a [Record]) -> Vec<&'a Record> {
    let lower_query = query.to_lowercase();

    let instructors = vocabulary(records, COL_INSTRUCTOR);
    let domains = vocabulary(records, COL_DOMAIN);
    let topics = vocabulary(records, COL_TOPIC);

    let mut union = Union::new();

    // Tier 1: instructor mentions
    union.extend(match_by_column(
        &lower_query,
        &instructors,
        COL_INSTRUCTOR,
        records,
    ));

    // Tier 2: domain mentions, unioned even when tier 1 already matched
    union.extend(match_by_column(&lower_query, &domains, COL_DOMAIN, records));

    // Tier 3: topic mentions, only attempted while nothing has matched
    if union.is_empty() {
        union.extend(match_by_column(&lower_query, &topics, COL_TOPIC, records));
    }

    // Tier 4: intent keywords
    if union.is_empty() {
        union.extend(match_intent(&lower_query, records));
    }

    // Last resort: a small sample per instructor
    if union.is_empty() {
        union.extend(sample_per_instructor(&instructors, records));
        debug!(
            "No specific filter applied, using {} sample rows",
            union.len()
        );
    }

    union.into_records()
}

/// Distinct non-empty values of a column, preserving first-seen order.
pub fn vocabulary<'a>(records: &'a [Record], column: &str) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    let mut values = Vec::new();

    for record in records {
        if let Some(value) = record.get(column) {
            if !value.is_empty() && seen.insert(value) {
                values.push(value);
            }
        }
    }

    values
}

/// One substring-containment tier: for every vocabulary value the query
/// mentions, all records whose column equals that value.
fn match_by_column<'a>(
    lower_query: &str,
    vocabulary: &[&str],
    column: &str,
    records: &'a [Record],
) -> Vec<&'a Record> {
    let mut matches = Vec::new();

    for value in vocabulary {
        if lower_query.contains(&value.to_lowercase()) {
            let rows: Vec<&Record> = records
                .iter()
                .filter(|record| record.get(column) == Some(*value))
                .collect();
            debug!("Found {} rows for {}: {}", rows.len(), column, value);
            matches.extend(rows);
        }
    }

    matches
}

/// Fixed intent keyword rules for queries naming no known entity.
fn match_intent<'a>(lower_query: &str, records: &'a [Record]) -> Vec<&'a Record> {
    if lower_query.contains("highest rating") || lower_query.contains("top instructor") {
        let rows: Vec<&Record> = records.iter().filter(|record| has_rating(record)).collect();
        debug!("Added {} rows with ratings for top instructor analysis", rows.len());
        rows
    } else if lower_query.contains("backend") {
        records
            .iter()
            .filter(|record| record.get(COL_DOMAIN) == Some("Backend"))
            .collect()
    } else if lower_query.contains("fullstack") {
        records
            .iter()
            .filter(|record| record.get(COL_DOMAIN) == Some("Fullstack"))
            .collect()
    } else {
        Vec::new()
    }
}

/// Sampling fallback: the first few records of each instructor, flattened
/// in vocabulary order.
fn sample_per_instructor<'a>(instructors: &[&str], records: &'a [Record]) -> Vec<&'a Record> {
    let mut samples = Vec::new();

    for instructor in instructors {
        samples.extend(
            records
                .iter()
                .filter(|record| record.get(COL_INSTRUCTOR) == Some(*instructor))
                .take(SAMPLE_PER_INSTRUCTOR),
        );
    }

    samples
}

/// A rating counts as present when the cell is neither null nor empty.
fn has_rating(record: &Record) -> bool {
    record.get(COL_RATING).is_some_and(|value| !value.is_empty())
}

/// Running union of matched records, de-duplicated by entity key.
struct Union<'a> {
    records: Vec<&'a Record>,
    seen: HashSet<EntityKey>,
}

impl<'a> Union<'a> {
    fn new() -> Self {
        Self {
            records: Vec::new(),
            seen: HashSet::new(),
        }
    }

    fn extend(&mut self, matches: impl IntoIterator<Item = &'a Record>) {
        for record in matches {
            if self.seen.insert(record.entity_key()) {
                self.records.push(record);
            }
        }
    }

    fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    fn into_records(self) -> Vec<&'a Record> {
        self.records
    }
}
