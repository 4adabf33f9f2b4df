//! # Filter Engine
//!
//! Derives the filtered view of the catalog from the current filter state.
//!
//! A record survives only if it passes every active predicate:
//! 1. Text: case-insensitive substring of title, abstract, authors or any tag.
//! 2. Category: its category is selected.
//! 3. Mission: at least one of its missions is selected.
//! 4. Date: its date lies inside the inclusive range.
//!
//! Inactive predicates (empty query, empty selection, unbounded range) pass
//! everything. Filtering is pure and stable: the output keeps source order and
//! nothing is mutated.

use crate::{Category, Mission, Record};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// DATE RANGE
// =============================================================================

/// Parse a date bound from user input.
///
/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (time of day is dropped).
/// Blank or unparseable input yields `None`: the bound is treated as absent.
pub fn parse_date_bound(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Inclusive calendar-date range; either bound may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    #[must_use]
    pub const fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Build a range from raw input strings, see [`parse_date_bound`].
    #[must_use]
    pub fn parse(start: &str, end: &str) -> Self {
        Self {
            start: parse_date_bound(start),
            end: parse_date_bound(end),
        }
    }

    /// True when neither bound is set.
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }
}

// =============================================================================
// FILTER STATE
// =============================================================================

/// The inputs of the filter engine.
///
/// Every field empty means "no filtering". An empty selection never means
/// "exclude all".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub query_text: String,
    pub selected_categories: BTreeSet<Category>,
    pub selected_missions: BTreeSet<Mission>,
    pub date_range: DateRange,
}

impl FilterState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True when every field holds its empty default.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.query_text.is_empty() && !self.has_active_facets()
    }

    /// True when a category, mission or date bound is set.
    #[must_use]
    pub fn has_active_facets(&self) -> bool {
        !self.selected_categories.is_empty()
            || !self.selected_missions.is_empty()
            || !self.date_range.is_unbounded()
    }

    /// The lower-cased needle for the text predicate, if it is active.
    ///
    /// Activation looks at the trimmed query; matching uses the query as
    /// typed, so surrounding spaces are part of the needle.
    #[must_use]
    pub fn text_needle(&self) -> Option<String> {
        if self.query_text.trim().is_empty() {
            None
        } else {
            Some(self.query_text.to_lowercase())
        }
    }

    /// Apply this state to a record slice. See [`apply_filters`].
    #[must_use]
    pub fn apply<'a>(&self, records: &'a [Record]) -> Vec<&'a Record> {
        apply_filters(records, self)
    }
}

// =============================================================================
// PREDICATES
// =============================================================================

fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Text predicate. `needle` must already be lower-cased.
#[must_use]
pub fn matches_text(record: &Record, needle: &str) -> bool {
    contains_folded(&record.title, needle)
        || contains_folded(&record.abstract_text, needle)
        || contains_folded(&record.authors, needle)
        || record.tags.iter().any(|tag| contains_folded(tag, needle))
}

/// Category predicate.
///
/// Category identifiers are the normalized labels, so membership of the enum
/// value is membership of the normalized record type.
#[must_use]
pub fn matches_category(record: &Record, selected: &BTreeSet<Category>) -> bool {
    selected.contains(&record.category)
}

/// Mission predicate: non-empty intersection. A record without missions
/// never matches.
#[must_use]
pub fn matches_mission(record: &Record, selected: &BTreeSet<Mission>) -> bool {
    record.missions.iter().any(|m| selected.contains(m))
}

/// Date predicate.
#[must_use]
pub fn matches_date(record: &Record, range: &DateRange) -> bool {
    range.contains(record.date)
}

/// Derive the filtered view of `records`.
///
/// The result keeps the relative order of `records`. No ranking is applied.
#[must_use]
pub fn apply_filters<'a>(records: &'a [Record], state: &FilterState) -> Vec<&'a Record> {
    let needle = state.text_needle();

    records
        .iter()
        .filter(|r| needle.as_deref().is_none_or(|n| matches_text(r, n)))
        .filter(|r| {
            state.selected_categories.is_empty()
                || matches_category(r, &state.selected_categories)
        })
        .filter(|r| {
            state.selected_missions.is_empty() || matches_mission(r, &state.selected_missions)
        })
        .filter(|r| state.date_range.is_unbounded() || matches_date(r, &state.date_range))
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Catalog, RecordId};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn ids(records: &[&Record]) -> Vec<u64> {
        records.iter().map(|r| r.id.0).collect()
    }

    #[test]
    fn empty_state_returns_everything_in_order() {
        let catalog = Catalog::builtin();
        let state = FilterState::new();

        assert!(state.is_empty());
        assert_eq!(ids(&state.apply(catalog.records())), vec![1, 2, 3]);
    }

    #[test]
    fn whitespace_query_is_inactive() {
        let catalog = Catalog::builtin();
        let state = FilterState {
            query_text: "   ".to_string(),
            ..FilterState::default()
        };
        assert_eq!(state.text_needle(), None);
        assert_eq!(state.apply(catalog.records()).len(), 3);
    }

    #[test]
    fn text_matches_title_case_insensitively() {
        let catalog = Catalog::builtin();
        let state = FilterState {
            query_text: "RADIATION".to_string(),
            ..FilterState::default()
        };
        assert_eq!(ids(&state.apply(catalog.records())), vec![2]);
    }

    #[test]
    fn text_matches_authors_and_tags() {
        let catalog = Catalog::builtin();

        let by_author = FilterState {
            query_text: "torres".to_string(),
            ..FilterState::default()
        };
        assert_eq!(ids(&by_author.apply(catalog.records())), vec![3]);

        let by_tag = FilterState {
            query_text: "plant bio".to_string(),
            ..FilterState::default()
        };
        assert_eq!(ids(&by_tag.apply(catalog.records())), vec![1]);
    }

    #[test]
    fn text_does_not_search_journal() {
        let catalog = Catalog::builtin();
        let state = FilterState {
            query_text: "Task Book".to_string(),
            ..FilterState::default()
        };
        assert!(state.apply(catalog.records()).is_empty());
    }

    #[test]
    fn category_filter_selects_by_type() {
        let catalog = Catalog::builtin();
        let state = FilterState {
            selected_categories: [Category::OsdrData, Category::TaskBookGrants]
                .into_iter()
                .collect(),
            ..FilterState::default()
        };
        assert_eq!(ids(&state.apply(catalog.records())), vec![2, 3]);
    }

    #[test]
    fn mission_filter_needs_intersection() {
        let catalog = Catalog::builtin();
        let state = FilterState {
            selected_missions: [Mission::DeepSpace, Mission::Iss].into_iter().collect(),
            ..FilterState::default()
        };
        assert_eq!(ids(&state.apply(catalog.records())), vec![2, 3]);
    }

    #[test]
    fn record_without_missions_never_matches_mission_filter() {
        let records = vec![Record::new(
            RecordId(9),
            "Orphan",
            Category::ResearchPapers,
            date(2024, 1, 1),
        )];
        let state = FilterState {
            selected_missions: Mission::ALL.into_iter().collect(),
            ..FilterState::default()
        };
        assert!(state.apply(&records).is_empty());
    }

    #[test]
    fn date_range_is_inclusive() {
        let catalog = Catalog::builtin();
        let state = FilterState {
            date_range: DateRange::new(Some(date(2024, 6, 18)), Some(date(2024, 7, 22))),
            ..FilterState::default()
        };
        assert_eq!(ids(&state.apply(catalog.records())), vec![2, 3]);
    }

    #[test]
    fn open_ended_ranges() {
        let catalog = Catalog::builtin();

        let from = FilterState {
            date_range: DateRange::new(Some(date(2024, 7, 1)), None),
            ..FilterState::default()
        };
        assert_eq!(ids(&from.apply(catalog.records())), vec![1, 2]);

        let until = FilterState {
            date_range: DateRange::new(None, Some(date(2024, 7, 1))),
            ..FilterState::default()
        };
        assert_eq!(ids(&until.apply(catalog.records())), vec![3]);
    }

    #[test]
    fn unparseable_bounds_fail_open() {
        let range = DateRange::parse("not-a-date", "2024-13-45");
        assert!(range.is_unbounded());

        let catalog = Catalog::builtin();
        let state = FilterState {
            date_range: range,
            ..FilterState::default()
        };
        assert_eq!(state.apply(catalog.records()).len(), 3);
    }

    #[test]
    fn rfc3339_bound_ignores_time_of_day() {
        assert_eq!(
            parse_date_bound("2024-08-15T23:59:59Z"),
            Some(date(2024, 8, 15))
        );
        assert_eq!(parse_date_bound(" 2024-08-15 "), Some(date(2024, 8, 15)));
    }

    #[test]
    fn predicates_are_conjunctive() {
        let catalog = Catalog::builtin();
        let mut state = FilterState {
            selected_missions: [Mission::Mars].into_iter().collect(),
            ..FilterState::default()
        };
        assert_eq!(ids(&state.apply(catalog.records())), vec![1, 2]);

        state.query_text = "bone".to_string();
        assert!(state.apply(catalog.records()).is_empty());
    }

    #[test]
    fn filtering_does_not_mutate_inputs() {
        let catalog = Catalog::builtin();
        let before = catalog.clone();
        let state = FilterState {
            query_text: "mars".to_string(),
            ..FilterState::default()
        };
        let snapshot = state.clone();

        let first = ids(&state.apply(catalog.records()));
        let second = ids(&state.apply(catalog.records()));

        assert_eq!(first, second);
        assert_eq!(state, snapshot);
        assert_eq!(catalog, before);
    }
}
