//! # Core Type Definitions
//!
//! This module contains the record schema shared by the catalog, the filter
//! engine and the facet table:
//! - Record identifiers (`RecordId`)
//! - Closed facet enumerations (`Category`, `Mission`)
//! - The publication entity (`Record`)
//! - Error types (`SpaceBioError`)
//!
//! ## Single Declaration
//!
//! Category and mission identifiers are declared once, here. The facet table
//! and the record schema both use these enums, so a record can never carry a
//! value that the facet sidebar does not offer.

use crate::actions::ActionKind;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// RECORD IDENTIFIER
// =============================================================================

/// Unique identifier of a publication record.
/// Stable for the lifetime of the catalog that holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// FACET IDENTIFIERS
// =============================================================================

/// Normalize a display label into a facet identifier.
///
/// Lower-cases the label and replaces every run of whitespace with a single
/// hyphen: `"Task Book Grants"` becomes `"task-book-grants"`.
pub fn normalize_facet_id(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut in_whitespace = false;
    for ch in label.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                out.push('-');
            }
            in_whitespace = true;
        } else {
            in_whitespace = false;
            out.extend(ch.to_lowercase());
        }
    }
    out
}

/// Content category of a record (the "Content Type" facet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Research Papers")]
    ResearchPapers,
    #[serde(rename = "OSDR Data")]
    OsdrData,
    #[serde(rename = "Task Book Grants")]
    TaskBookGrants,
}

impl Category {
    /// Every category, in facet display order.
    pub const ALL: [Category; 3] = [
        Category::ResearchPapers,
        Category::OsdrData,
        Category::TaskBookGrants,
    ];

    /// Human-readable label, also the record's `type` field.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ResearchPapers => "Research Papers",
            Self::OsdrData => "OSDR Data",
            Self::TaskBookGrants => "Task Book Grants",
        }
    }

    /// Facet identifier: the label lower-cased with whitespace hyphenated.
    #[must_use]
    pub const fn facet_id(self) -> &'static str {
        match self {
            Self::ResearchPapers => "research-papers",
            Self::OsdrData => "osdr-data",
            Self::TaskBookGrants => "task-book-grants",
        }
    }

    /// Display count shown next to the facet.
    ///
    /// These are static figures for the full archive, not counts of the
    /// loaded catalog.
    #[must_use]
    pub const fn declared_count(self) -> u32 {
        match self {
            Self::ResearchPapers => 608,
            Self::OsdrData => 234,
            Self::TaskBookGrants => 89,
        }
    }

    /// Resolve a display label ("OSDR Data") or identifier ("osdr-data").
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let id = normalize_facet_id(label.trim());
        Self::ALL.into_iter().find(|c| c.facet_id() == id)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = SpaceBioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.facet_id() == s)
            .ok_or_else(|| SpaceBioError::UnknownFacet(s.to_string()))
    }
}

impl TryFrom<&str> for Category {
    type Error = SpaceBioError;

    /// Parse a display label (or identifier), see [`Category::from_label`].
    fn try_from(label: &str) -> Result<Self, Self::Error> {
        Self::from_label(label).ok_or_else(|| SpaceBioError::UnknownFacet(label.to_string()))
    }
}

/// Mission category tag (the "Mission Type" facet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mission {
    Mars,
    Moon,
    Iss,
    DeepSpace,
}

impl Mission {
    /// Every mission, in facet display order.
    pub const ALL: [Mission; 4] = [
        Mission::Mars,
        Mission::Moon,
        Mission::Iss,
        Mission::DeepSpace,
    ];

    #[must_use]
    pub const fn facet_id(self) -> &'static str {
        match self {
            Self::Mars => "mars",
            Self::Moon => "moon",
            Self::Iss => "iss",
            Self::DeepSpace => "deep-space",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Mars => "Mars Missions",
            Self::Moon => "Lunar Missions",
            Self::Iss => "International Space Station",
            Self::DeepSpace => "Deep Space Missions",
        }
    }

    /// Static display count, see [`Category::declared_count`].
    #[must_use]
    pub const fn declared_count(self) -> u32 {
        match self {
            Self::Mars => 45,
            Self::Moon => 32,
            Self::Iss => 156,
            Self::DeepSpace => 23,
        }
    }
}

impl fmt::Display for Mission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.facet_id())
    }
}

impl FromStr for Mission {
    type Err = SpaceBioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.facet_id() == s)
            .ok_or_else(|| SpaceBioError::UnknownFacet(s.to_string()))
    }
}

// =============================================================================
// RECORD
// =============================================================================

/// Treat absent, null and blank identifiers alike: all become `None`.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// A publication record in the catalog.
///
/// `tags` keeps its display order; matching treats it as an unordered set.
/// External identifiers are either present and non-empty or `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: RecordId,
    pub title: String,
    #[serde(rename = "type")]
    pub category: Category,
    pub authors: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub journal: String,
    #[serde(rename = "abstract", default)]
    pub abstract_text: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub missions: BTreeSet<Mission>,
    #[serde(
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub osdr_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub grant_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub doi: Option<String>,
}

impl Record {
    /// Create a record with the required fields; everything else empty.
    #[must_use]
    pub fn new(id: RecordId, title: impl Into<String>, category: Category, date: NaiveDate) -> Self {
        Self {
            id,
            title: title.into(),
            category,
            authors: String::new(),
            date,
            journal: String::new(),
            abstract_text: String::new(),
            tags: Vec::new(),
            missions: BTreeSet::new(),
            osdr_id: None,
            grant_id: None,
            doi: None,
        }
    }

    #[must_use]
    pub fn with_authors(mut self, authors: impl Into<String>) -> Self {
        self.authors = authors.into();
        self
    }

    #[must_use]
    pub fn with_journal(mut self, journal: impl Into<String>) -> Self {
        self.journal = journal.into();
        self
    }

    #[must_use]
    pub fn with_abstract(mut self, text: impl Into<String>) -> Self {
        self.abstract_text = text.into();
        self
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_missions(mut self, missions: impl IntoIterator<Item = Mission>) -> Self {
        self.missions = missions.into_iter().collect();
        self
    }

    /// Set the OSDR identifier. Blank input leaves it absent.
    #[must_use]
    pub fn with_osdr_id(mut self, id: impl Into<String>) -> Self {
        self.osdr_id = non_blank(id.into());
        self
    }

    #[must_use]
    pub fn with_grant_id(mut self, id: impl Into<String>) -> Self {
        self.grant_id = non_blank(id.into());
        self
    }

    #[must_use]
    pub fn with_doi(mut self, doi: impl Into<String>) -> Self {
        self.doi = non_blank(doi.into());
        self
    }

    /// Present external identifiers as `(label, value)` pairs in display order.
    #[must_use]
    pub fn external_ids(&self) -> Vec<(&'static str, &str)> {
        [
            ("OSDR ID", self.osdr_id.as_deref()),
            ("Grant ID", self.grant_id.as_deref()),
            ("DOI", self.doi.as_deref()),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.map(|v| (label, v)))
        .collect()
    }
}

fn non_blank(s: String) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s) }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the SpaceBio core.
///
/// Filtering itself never fails; these cover catalog loading, lookups,
/// facet parsing and the action board.
#[derive(Debug, Error)]
pub enum SpaceBioError {
    /// No record with this identifier exists in the catalog.
    #[error("Record not found: {0}")]
    RecordNotFound(RecordId),

    /// Two catalog entries share an identifier.
    #[error("Duplicate record id: {0}")]
    DuplicateRecord(RecordId),

    /// A facet identifier outside the closed enumerations.
    #[error("Unknown facet identifier: {0}")]
    UnknownFacet(String),

    /// A detail tab name outside the four known tabs.
    #[error("Unknown detail tab: {0}")]
    UnknownTab(String),

    /// A citation style other than plain text or BibTeX.
    #[error("Unknown citation style: {0}")]
    UnknownCitationStyle(String),

    /// An action name outside the known actions.
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// The action is already pending; its control is disabled.
    #[error("Action already in progress: {0}")]
    ActionBusy(ActionKind),

    /// The action did not complete within its timeout.
    #[error("Action timed out: {0}")]
    ActionTimedOut(ActionKind),

    /// The action was cancelled before completion.
    #[error("Action cancelled: {0}")]
    ActionCancelled(ActionKind),

    /// The action's work failed before producing a payload.
    #[error("Action failed: {0}")]
    ActionFailed(ActionKind),

    /// Request input outside the accepted bounds.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// The catalog payload is malformed or violates a catalog invariant.
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// A configuration file could not be parsed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn normalize_collapses_whitespace_runs() {
        assert_eq!(normalize_facet_id("Task Book Grants"), "task-book-grants");
        assert_eq!(normalize_facet_id("OSDR  \tData"), "osdr-data");
    }

    #[test]
    fn category_ids_are_normalized_labels() {
        for category in Category::ALL {
            assert_eq!(category.facet_id(), normalize_facet_id(category.label()));
        }
    }

    #[test]
    fn category_from_label_accepts_both_forms() {
        assert_eq!(Category::from_label("OSDR Data"), Some(Category::OsdrData));
        assert_eq!(Category::from_label("osdr-data"), Some(Category::OsdrData));
        assert_eq!(Category::from_label("Podcasts"), None);
        assert!(matches!(
            Category::try_from("Task Book Grants"),
            Ok(Category::TaskBookGrants)
        ));
        assert!(Category::try_from("Podcasts").is_err());
    }

    #[test]
    fn facet_ids_parse_back() {
        for mission in Mission::ALL {
            assert_eq!(mission.facet_id().parse::<Mission>().ok(), Some(mission));
        }
        assert!(matches!(
            "jupiter".parse::<Mission>(),
            Err(SpaceBioError::UnknownFacet(id)) if id == "jupiter"
        ));
    }

    #[test]
    fn record_json_uses_display_field_names() {
        let record = Record::new(RecordId(7), "Title", Category::OsdrData, date(2024, 7, 22))
            .with_missions([Mission::DeepSpace])
            .with_osdr_id("GLDS-401");

        let json = serde_json::to_value(&record).expect("serialize");
        assert_eq!(json["id"], 7);
        assert_eq!(json["type"], "OSDR Data");
        assert_eq!(json["date"], "2024-07-22");
        assert_eq!(json["missions"][0], "deep-space");
        assert_eq!(json["osdrId"], "GLDS-401");
        assert!(json.get("doi").is_none());
    }

    #[test]
    fn blank_external_ids_deserialize_as_absent() {
        let json = r#"{
            "id": 1, "title": "T", "type": "Research Papers", "authors": "A",
            "date": "2024-01-01", "doi": "", "grantId": "  ", "osdrId": null
        }"#;
        let record: Record = serde_json::from_str(json).expect("parse");
        assert_eq!(record.doi, None);
        assert_eq!(record.grant_id, None);
        assert_eq!(record.osdr_id, None);
        assert!(record.missions.is_empty());
    }

    #[test]
    fn builder_ignores_blank_ids() {
        let record =
            Record::new(RecordId(1), "T", Category::ResearchPapers, date(2024, 1, 1)).with_doi("");
        assert!(record.external_ids().is_empty());
    }
}
