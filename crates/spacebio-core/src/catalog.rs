//! # Catalog
//!
//! The Result Store: a fixed, in-memory collection of publication records,
//! plus the facet table offered by the search sidebar.
//!
//! Nothing in the core creates, persists or synchronizes records. A catalog
//! is built once (from the builtin dataset or a JSON file) and then only read.

use crate::{Category, Mission, Record, RecordId, SpaceBioError};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

// =============================================================================
// CATALOG
// =============================================================================

/// Read-only collection of publication records, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    records: Vec<Record>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// The builtin three-record dataset.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            records: builtin_records(),
        }
    }

    /// Build a catalog from records, rejecting duplicate identifiers.
    pub fn from_records(records: Vec<Record>) -> Result<Self, SpaceBioError> {
        let mut seen = BTreeSet::new();
        for record in &records {
            if !seen.insert(record.id) {
                return Err(SpaceBioError::DuplicateRecord(record.id));
            }
        }
        Ok(Self { records })
    }

    /// Parse a JSON array of records.
    ///
    /// Unknown `type` or `missions` values fail the whole load: the facet
    /// enumerations are closed.
    pub fn from_json(bytes: &[u8]) -> Result<Self, SpaceBioError> {
        let records: Vec<Record> = serde_json::from_slice(bytes)
            .map_err(|e| SpaceBioError::InvalidCatalog(e.to_string()))?;
        Self::from_records(records)
    }

    /// All records in source order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Like [`Catalog::get`], but an absent record is an error.
    pub fn require(&self, id: RecordId) -> Result<&Record, SpaceBioError> {
        self.get(id).ok_or(SpaceBioError::RecordNotFound(id))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records of the given category.
    #[must_use]
    pub fn count_category(&self, category: Category) -> usize {
        self.records
            .iter()
            .filter(|r| r.category == category)
            .count()
    }

    /// Number of records tagged with the given mission.
    #[must_use]
    pub fn count_mission(&self, mission: Mission) -> usize {
        self.records
            .iter()
            .filter(|r| r.missions.contains(&mission))
            .count()
    }
}

fn builtin_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn builtin_records() -> Vec<Record> {
    vec![
        Record::new(
            RecordId(1),
            "Effects of Microgravity on Plant Cell Wall Formation and Root Growth",
            Category::ResearchPapers,
            builtin_date(2024, 8, 15),
        )
        .with_authors("Dr. Sarah Martinez, Dr. Chen Liu, Dr. Robert Anderson")
        .with_journal("Life Sciences in Space Research")
        .with_abstract(
            "This comprehensive study investigates how microgravity environments affect \
             cellular development in Arabidopsis roots, with implications for sustainable \
             agriculture during long-duration space missions to Mars.",
        )
        .with_tags(["Microgravity", "Plant Biology", "Mars Mission", "Cell Biology"])
        .with_osdr_id("GLDS-394")
        .with_grant_id("NNX19AH54G")
        .with_doi("10.1016/j.lssr.2024.08.001")
        .with_missions([Mission::Mars]),
        Record::new(
            RecordId(2),
            "Radiation Protection Strategies for Human Deep Space Exploration",
            Category::OsdrData,
            builtin_date(2024, 7, 22),
        )
        .with_authors("NASA Ames Research Center, Johnson Space Center")
        .with_journal("NASA Open Science Data Repository")
        .with_abstract(
            "Comprehensive analysis of radiation exposure patterns and biological responses \
             during simulated Mars transit missions.",
        )
        .with_tags(["Radiation Biology", "Human Health", "Mars Mission"])
        .with_osdr_id("GLDS-401")
        .with_missions([Mission::Mars, Mission::DeepSpace]),
        Record::new(
            RecordId(3),
            "Bone Density Changes in Astronauts: Long-term Implications",
            Category::TaskBookGrants,
            builtin_date(2024, 6, 18),
        )
        .with_authors("Dr. Jennifer Kim, Dr. Michael Torres")
        .with_journal("NASA Task Book")
        .with_abstract(
            "Analysis of bone density changes in astronauts during extended space missions \
             and implications for Moon base operations.",
        )
        .with_tags(["Bone Health", "Human Physiology", "Moon Mission"])
        .with_grant_id("NNX20AB15H")
        .with_missions([Mission::Moon, Mission::Iss]),
    ]
}

// =============================================================================
// FACET TABLE
// =============================================================================

/// One selectable facet in the sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetOption<T> {
    #[serde(skip)]
    pub value: T,
    pub id: &'static str,
    pub label: &'static str,
    /// Static display count for the full archive.
    pub count: u32,
    /// Records in the loaded catalog carrying this facet, when computed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_count: Option<usize>,
}

/// The facet definitions offered by the search sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetTable {
    pub content_types: Vec<FacetOption<Category>>,
    pub missions: Vec<FacetOption<Mission>>,
}

impl FacetTable {
    /// Facets with their static display counts only.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            content_types: Category::ALL
                .into_iter()
                .map(|c| FacetOption {
                    value: c,
                    id: c.facet_id(),
                    label: c.label(),
                    count: c.declared_count(),
                    live_count: None,
                })
                .collect(),
            missions: Mission::ALL
                .into_iter()
                .map(|m| FacetOption {
                    value: m,
                    id: m.facet_id(),
                    label: m.label(),
                    count: m.declared_count(),
                    live_count: None,
                })
                .collect(),
        }
    }

    /// Facets annotated with how many catalog records carry each value.
    #[must_use]
    pub fn with_live_counts(catalog: &Catalog) -> Self {
        let mut table = Self::standard();
        for option in &mut table.content_types {
            option.live_count = Some(catalog.count_category(option.value));
        }
        for option in &mut table.missions {
            option.live_count = Some(catalog.count_mission(option.value));
        }
        table
    }

    /// Label for a category facet.
    #[must_use]
    pub fn category_label(&self, category: Category) -> &'static str {
        self.content_types
            .iter()
            .find(|o| o.value == category)
            .map(|o| o.label)
            .unwrap_or(category.label())
    }

    /// Label for a mission facet.
    #[must_use]
    pub fn mission_label(&self, mission: Mission) -> &'static str {
        self.missions
            .iter()
            .find(|o| o.value == mission)
            .map(|o| o.label)
            .unwrap_or(mission.label())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_three_records_in_order() {
        let catalog = Catalog::builtin();
        let ids: Vec<_> = catalog.records().iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn builtin_ids_are_unique() {
        let catalog = Catalog::builtin();
        assert!(Catalog::from_records(catalog.records().to_vec()).is_ok());
    }

    #[test]
    fn duplicate_ids_rejected() {
        let mut records = Catalog::builtin().records().to_vec();
        records.push(records[0].clone());

        let result = Catalog::from_records(records);
        assert!(matches!(
            result,
            Err(SpaceBioError::DuplicateRecord(RecordId(1)))
        ));
    }

    #[test]
    fn json_with_unknown_mission_rejected() {
        let json = br#"[{"id": 1, "title": "T", "type": "Research Papers",
            "authors": "A", "date": "2024-01-01", "missions": ["jupiter"]}]"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(SpaceBioError::InvalidCatalog(_))
        ));
    }

    #[test]
    fn json_with_unknown_category_rejected() {
        let json = br#"[{"id": 1, "title": "T", "type": "Podcasts",
            "authors": "A", "date": "2024-01-01"}]"#;
        assert!(Catalog::from_json(json).is_err());
    }

    #[test]
    fn json_round_trips_builtin() {
        let catalog = Catalog::builtin();
        let bytes = serde_json::to_vec(catalog.records()).expect("serialize");
        let loaded = Catalog::from_json(&bytes).expect("load");
        assert_eq!(loaded, catalog);
    }

    #[test]
    fn require_reports_missing_record() {
        let catalog = Catalog::builtin();
        assert!(catalog.require(RecordId(2)).is_ok());
        assert!(matches!(
            catalog.require(RecordId(99)),
            Err(SpaceBioError::RecordNotFound(RecordId(99)))
        ));
    }

    #[test]
    fn facet_table_covers_every_value_in_data() {
        let catalog = Catalog::builtin();
        let table = FacetTable::standard();
        for record in catalog.records() {
            assert!(table.content_types.iter().any(|o| o.value == record.category));
            for mission in &record.missions {
                assert!(table.missions.iter().any(|o| o.value == *mission));
            }
        }
    }

    #[test]
    fn declared_counts_are_independent_of_data() {
        let table = FacetTable::with_live_counts(&Catalog::builtin());
        let mars = table
            .missions
            .iter()
            .find(|o| o.value == Mission::Mars)
            .expect("mars facet");
        assert_eq!(mars.count, 45);
        assert_eq!(mars.live_count, Some(2));
    }

    #[test]
    fn facet_table_serializes_ids_and_labels() {
        let json = serde_json::to_value(FacetTable::standard()).expect("serialize");
        assert_eq!(json["contentTypes"][0]["id"], "research-papers");
        assert_eq!(json["contentTypes"][0]["count"], 608);
        assert_eq!(json["missions"][3]["label"], "Deep Space Missions");
        assert!(json["missions"][0].get("liveCount").is_none());
    }
}
