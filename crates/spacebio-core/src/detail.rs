//! # Detail Overlay
//!
//! Selection state for the record detail overlay.
//!
//! ```text
//!   Closed ──open(r)──▶ Open(r, Summary)
//!   Open(r, X) ──switch_tab(Y)──▶ Open(r, Y)
//!   Open(*) ──close / backdrop click──▶ Closed
//! ```
//!
//! The selected record and the "is open" flag are one state, so they cannot
//! disagree. The tab never survives a close.

use crate::{Record, SpaceBioError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sub-views of the detail overlay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetailTab {
    #[default]
    Summary,
    Overview,
    KnowledgeGraph,
    Data,
}

impl DetailTab {
    pub const ALL: [DetailTab; 4] = [
        DetailTab::Summary,
        DetailTab::Overview,
        DetailTab::KnowledgeGraph,
        DetailTab::Data,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Overview => "overview",
            Self::KnowledgeGraph => "knowledge-graph",
            Self::Data => "data",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Summary => "Summary",
            Self::Overview => "Overview",
            Self::KnowledgeGraph => "Knowledge Graph",
            Self::Data => "Data & Methods",
        }
    }
}

impl fmt::Display for DetailTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetailTab {
    type Err = SpaceBioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| SpaceBioError::UnknownTab(s.to_string()))
    }
}

/// Where a click inside the overlay originated.
///
/// Only a click whose target is the backdrop element itself closes the
/// overlay; clicks bubbling up from the modal content do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Backdrop,
    Content,
}

/// State of the detail overlay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DetailState {
    #[default]
    Closed,
    Open { record: Box<Record>, tab: DetailTab },
}

/// Owns the overlay state and its transitions.
#[derive(Debug, Clone, Default)]
pub struct DetailController {
    state: DetailState,
}

impl DetailController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &DetailState {
        &self.state
    }

    /// Open the overlay on `record`, always on the Summary tab.
    pub fn open(&mut self, record: Record) {
        self.state = DetailState::Open {
            record: Box::new(record),
            tab: DetailTab::default(),
        };
    }

    pub fn close(&mut self) {
        self.state = DetailState::Closed;
    }

    /// Handle a click on the overlay. Returns `true` if it closed.
    pub fn backdrop_click(&mut self, target: ClickTarget) -> bool {
        if target != ClickTarget::Backdrop || !self.is_open() {
            return false;
        }
        self.close();
        true
    }

    /// Replace the active tab. Ignored while closed; returns whether it applied.
    pub fn switch_tab(&mut self, next: DetailTab) -> bool {
        match &mut self.state {
            DetailState::Open { tab, .. } => {
                *tab = next;
                true
            }
            DetailState::Closed => false,
        }
    }

    /// [`DetailController::switch_tab`] by tab name.
    pub fn switch_tab_named(&mut self, name: &str) -> Result<bool, SpaceBioError> {
        let tab = name.parse()?;
        Ok(self.switch_tab(tab))
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self.state, DetailState::Open { .. })
    }

    #[must_use]
    pub fn selected(&self) -> Option<&Record> {
        match &self.state {
            DetailState::Open { record, .. } => Some(record),
            DetailState::Closed => None,
        }
    }

    #[must_use]
    pub fn active_tab(&self) -> Option<DetailTab> {
        match &self.state {
            DetailState::Open { tab, .. } => Some(*tab),
            DetailState::Closed => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Catalog, RecordId};

    fn record(id: u64) -> Record {
        Catalog::builtin()
            .get(RecordId(id))
            .cloned()
            .expect("builtin record")
    }

    #[test]
    fn starts_closed() {
        let controller = DetailController::new();
        assert!(!controller.is_open());
        assert_eq!(controller.selected(), None);
        assert_eq!(controller.active_tab(), None);
    }

    #[test]
    fn open_selects_record_on_summary() {
        let mut controller = DetailController::new();
        controller.open(record(2));

        assert!(controller.is_open());
        assert_eq!(controller.selected().map(|r| r.id), Some(RecordId(2)));
        assert_eq!(controller.active_tab(), Some(DetailTab::Summary));
    }

    #[test]
    fn tab_resets_on_reopen() {
        let mut controller = DetailController::new();
        controller.open(record(1));
        assert!(controller.switch_tab(DetailTab::Data));
        controller.close();

        controller.open(record(1));
        assert_eq!(controller.active_tab(), Some(DetailTab::Summary));
    }

    #[test]
    fn switching_tab_while_closed_is_ignored() {
        let mut controller = DetailController::new();
        assert!(!controller.switch_tab(DetailTab::KnowledgeGraph));
        assert_eq!(controller.state(), &DetailState::Closed);
    }

    #[test]
    fn content_click_keeps_overlay_open() {
        let mut controller = DetailController::new();
        controller.open(record(3));

        assert!(!controller.backdrop_click(ClickTarget::Content));
        assert!(controller.is_open());

        assert!(controller.backdrop_click(ClickTarget::Backdrop));
        assert!(!controller.is_open());
        assert_eq!(controller.selected(), None);
    }

    #[test]
    fn tab_names_parse() {
        let mut controller = DetailController::new();
        controller.open(record(1));
        assert!(controller.switch_tab_named("knowledge-graph").expect("known tab"));
        assert_eq!(controller.active_tab(), Some(DetailTab::KnowledgeGraph));
        assert!(matches!(
            controller.switch_tab_named("comments"),
            Err(SpaceBioError::UnknownTab(_))
        ));
    }
}
