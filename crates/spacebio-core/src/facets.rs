//! # Facet Toggle Manager
//!
//! The only writer of [`FilterState`]. Facets toggle by identifier with set
//! XOR semantics; "clear all" swaps in a fresh state in a single assignment,
//! so no partially cleared state is ever observable.

use crate::filter::{FilterState, parse_date_bound};
use crate::{Category, FacetTable, Mission, SpaceBioError};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Add `value` if absent, remove it if present. Returns true if now selected.
fn toggle<T: Ord>(set: &mut BTreeSet<T>, value: T) -> bool {
    if set.remove(&value) {
        false
    } else {
        set.insert(value);
        true
    }
}

// =============================================================================
// ACTIVE FILTER CHIPS
// =============================================================================

/// The mutation that removes a chip from the "Active Filters" list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum ChipKind {
    Category(Category),
    Mission(Mission),
    DateStart,
    DateEnd,
}

/// One entry of the "Active Filters" list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterChip {
    pub kind: ChipKind,
    pub label: String,
}

impl fmt::Display for FilterChip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

// =============================================================================
// FACET MANAGER
// =============================================================================

/// Owns the filter state and every mutation of it.
#[derive(Debug, Clone, Default)]
pub struct FacetManager {
    state: FilterState,
}

impl FacetManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing state (e.g. one decoded from a request).
    #[must_use]
    pub fn with_state(state: FilterState) -> Self {
        Self { state }
    }

    #[must_use]
    pub fn state(&self) -> &FilterState {
        &self.state
    }

    #[must_use]
    pub fn into_state(self) -> FilterState {
        self.state
    }

    pub fn toggle_category(&mut self, category: Category) -> bool {
        toggle(&mut self.state.selected_categories, category)
    }

    pub fn toggle_mission(&mut self, mission: Mission) -> bool {
        toggle(&mut self.state.selected_missions, mission)
    }

    /// Toggle a category by facet identifier ("osdr-data").
    pub fn toggle_category_id(&mut self, id: &str) -> Result<bool, SpaceBioError> {
        let category = id.parse()?;
        Ok(self.toggle_category(category))
    }

    /// Toggle a mission by facet identifier ("deep-space").
    pub fn toggle_mission_id(&mut self, id: &str) -> Result<bool, SpaceBioError> {
        let mission = id.parse()?;
        Ok(self.toggle_mission(mission))
    }

    pub fn set_query(&mut self, text: impl Into<String>) {
        self.state.query_text = text.into();
    }

    pub fn set_date_start(&mut self, start: Option<NaiveDate>) {
        self.state.date_range.start = start;
    }

    pub fn set_date_end(&mut self, end: Option<NaiveDate>) {
        self.state.date_range.end = end;
    }

    /// Set the start bound from raw input; unparseable input clears it.
    pub fn set_date_start_input(&mut self, input: &str) {
        self.set_date_start(parse_date_bound(input));
    }

    /// Set the end bound from raw input; unparseable input clears it.
    pub fn set_date_end_input(&mut self, input: &str) {
        self.set_date_end(parse_date_bound(input));
    }

    pub fn remove_date_start(&mut self) {
        self.state.date_range.start = None;
    }

    pub fn remove_date_end(&mut self) {
        self.state.date_range.end = None;
    }

    /// Reset every field to its empty default.
    pub fn clear_all(&mut self) {
        self.state = FilterState::default();
    }

    /// Apply the mutation a chip stands for.
    pub fn remove_chip(&mut self, kind: ChipKind) {
        match kind {
            ChipKind::Category(c) => {
                self.state.selected_categories.remove(&c);
            }
            ChipKind::Mission(m) => {
                self.state.selected_missions.remove(&m);
            }
            ChipKind::DateStart => self.remove_date_start(),
            ChipKind::DateEnd => self.remove_date_end(),
        }
    }

    /// The "Active Filters" list: selected categories, selected missions,
    /// then the date bounds. The query text is not a chip.
    #[must_use]
    pub fn active_chips(&self, table: &FacetTable) -> Vec<FilterChip> {
        let categories = self.state.selected_categories.iter().map(|&c| FilterChip {
            kind: ChipKind::Category(c),
            label: table.category_label(c).to_string(),
        });
        let missions = self.state.selected_missions.iter().map(|&m| FilterChip {
            kind: ChipKind::Mission(m),
            label: table.mission_label(m).to_string(),
        });
        let range = self.state.date_range;
        let start = range.start.map(|d| FilterChip {
            kind: ChipKind::DateStart,
            label: format!("From: {d}"),
        });
        let end = range.end.map(|d| FilterChip {
            kind: ChipKind::DateEnd,
            label: format!("To: {d}"),
        });

        categories
            .chain(missions)
            .chain(start)
            .chain(end)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn toggle_twice_restores_state() {
        let mut manager = FacetManager::new();
        manager.toggle_mission(Mission::Iss);
        let before = manager.state().clone();

        assert!(manager.toggle_mission(Mission::Mars));
        assert!(!manager.toggle_mission(Mission::Mars));
        assert_eq!(manager.state(), &before);
    }

    #[test]
    fn string_ids_toggle_or_fail() {
        let mut manager = FacetManager::new();
        assert!(manager.toggle_category_id("task-book-grants").expect("known id"));
        assert!(
            manager
                .state()
                .selected_categories
                .contains(&Category::TaskBookGrants)
        );

        assert!(matches!(
            manager.toggle_mission_id("venus"),
            Err(SpaceBioError::UnknownFacet(id)) if id == "venus"
        ));
        assert!(manager.state().selected_missions.is_empty());
    }

    #[test]
    fn clear_all_resets_every_field() {
        let mut manager = FacetManager::new();
        manager.set_query("mars");
        manager.toggle_category(Category::OsdrData);
        manager.toggle_mission(Mission::Moon);
        manager.set_date_start(Some(date(2024, 1, 1)));
        manager.set_date_end(Some(date(2024, 12, 31)));

        manager.clear_all();
        assert!(manager.state().is_empty());
        assert_eq!(manager.state(), &FilterState::default());
    }

    #[test]
    fn unparseable_date_input_clears_bound() {
        let mut manager = FacetManager::new();
        manager.set_date_start_input("2024-06-01");
        assert_eq!(manager.state().date_range.start, Some(date(2024, 6, 1)));

        manager.set_date_start_input("June");
        assert_eq!(manager.state().date_range.start, None);
    }

    #[test]
    fn chips_list_selected_facets_then_dates() {
        let table = FacetTable::standard();
        let mut manager = FacetManager::new();
        manager.set_query("ignored");
        manager.toggle_mission(Mission::DeepSpace);
        manager.toggle_category(Category::ResearchPapers);
        manager.set_date_end(Some(date(2024, 7, 1)));

        let labels: Vec<String> = manager
            .active_chips(&table)
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            labels,
            vec!["Research Papers", "Deep Space Missions", "To: 2024-07-01"]
        );
    }

    #[test]
    fn removing_a_chip_removes_only_that_filter() {
        let table = FacetTable::standard();
        let mut manager = FacetManager::new();
        manager.toggle_mission(Mission::Mars);
        manager.toggle_mission(Mission::Moon);
        manager.set_date_start(Some(date(2024, 1, 1)));

        manager.remove_chip(ChipKind::Mission(Mission::Mars));
        manager.remove_chip(ChipKind::DateStart);

        let chips = manager.active_chips(&table);
        assert_eq!(chips.len(), 1);
        assert_eq!(chips[0].kind, ChipKind::Mission(Mission::Moon));
    }
}
