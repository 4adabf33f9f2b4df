//! # Search Page
//!
//! State holder of the presentation layer: one catalog, one filter state
//! (through the [`FacetManager`]) and one detail overlay. The filtered view
//! is derived on demand and never cached, so it cannot go stale.

use crate::detail::DetailController;
use crate::facets::FacetManager;
use crate::filter::apply_filters;
use crate::{Catalog, Record, RecordId, SpaceBioError};

/// "Found N results" line above the result list.
///
/// The query is echoed as typed whenever it is non-empty.
#[must_use]
pub fn results_summary(count: usize, query: &str) -> String {
    if query.is_empty() {
        format!("Found {count} results")
    } else {
        format!("Found {count} results for \"{query}\"")
    }
}

/// The search view: catalog, filters and detail overlay.
#[derive(Debug, Clone)]
pub struct SearchPage<'a> {
    catalog: &'a Catalog,
    facets: FacetManager,
    detail: DetailController,
}

impl<'a> SearchPage<'a> {
    /// Enter the view with a fresh, empty filter state.
    #[must_use]
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            facets: FacetManager::new(),
            detail: DetailController::new(),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    #[must_use]
    pub fn facets(&self) -> &FacetManager {
        &self.facets
    }

    pub fn facets_mut(&mut self) -> &mut FacetManager {
        &mut self.facets
    }

    #[must_use]
    pub fn detail(&self) -> &DetailController {
        &self.detail
    }

    pub fn detail_mut(&mut self) -> &mut DetailController {
        &mut self.detail
    }

    /// The filtered view for the current state.
    #[must_use]
    pub fn results(&self) -> Vec<&'a Record> {
        apply_filters(self.catalog.records(), self.facets.state())
    }

    #[must_use]
    pub fn summary(&self) -> String {
        results_summary(self.results().len(), &self.facets.state().query_text)
    }

    /// Open the detail overlay on the record with `id`.
    pub fn select(&mut self, id: RecordId) -> Result<&'a Record, SpaceBioError> {
        let catalog = self.catalog;
        let record = catalog.require(id)?;
        self.detail.open(record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detail::{ClickTarget, DetailTab};
    use crate::{Category, Mission};

    #[test]
    fn summary_echoes_query() {
        assert_eq!(results_summary(3, ""), "Found 3 results");
        assert_eq!(results_summary(0, "bone"), "Found 0 results for \"bone\"");
    }

    #[test]
    fn results_follow_facet_mutations() {
        let catalog = Catalog::builtin();
        let mut page = SearchPage::new(&catalog);
        assert_eq!(page.results().len(), 3);

        page.facets_mut().toggle_mission(Mission::Mars);
        assert_eq!(page.results().len(), 2);
        assert_eq!(page.summary(), "Found 2 results");

        page.facets_mut().toggle_category(Category::OsdrData);
        let ids: Vec<_> = page.results().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![RecordId(2)]);

        page.facets_mut().clear_all();
        assert_eq!(page.results().len(), 3);
    }

    #[test]
    fn select_opens_detail_on_summary() {
        let catalog = Catalog::builtin();
        let mut page = SearchPage::new(&catalog);

        let title = page.select(RecordId(3)).expect("known id").title.clone();
        assert!(title.starts_with("Bone Density"));
        assert_eq!(page.detail().active_tab(), Some(DetailTab::Summary));

        page.detail_mut().switch_tab(DetailTab::Data);
        page.detail_mut().backdrop_click(ClickTarget::Backdrop);
        page.select(RecordId(1)).expect("known id");
        assert_eq!(page.detail().active_tab(), Some(DetailTab::Summary));
    }

    #[test]
    fn select_unknown_id_leaves_overlay_closed() {
        let catalog = Catalog::builtin();
        let mut page = SearchPage::new(&catalog);
        assert!(matches!(
            page.select(RecordId(42)),
            Err(SpaceBioError::RecordNotFound(RecordId(42)))
        ));
        assert!(!page.detail().is_open());
    }
}
