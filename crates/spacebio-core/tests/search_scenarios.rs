//! # Search Scenario Tests (S0-S3)
//!
//! End-to-end flows through the public API, tier by tier.
//!
//! ## Tiers
//! - S0: Catalog Integrity
//! - S1: Filter Conjunction
//! - S2: Facet and Detail Flows
//! - S3: Account Flows

use spacebio_core::{
    ActionBoard, ActionKind, AuthClient, Catalog, Category, ClickTarget, DetailTab, FacetTable,
    IdentityService, KnowledgeGraph, MemoryPlatform, Mission, ProfileGate, RecordId,
    RegistrationForm, SearchPage, SpaceBioError,
};

// =============================================================================
// TIER S0: CATALOG INTEGRITY
// =============================================================================

mod s0_catalog_integrity {
    use super::*;

    /// S0.1: Every category and mission in the data is offered as a facet.
    #[test]
    fn facets_cover_data() {
        let catalog = Catalog::builtin();
        let table = FacetTable::with_live_counts(&catalog);

        for record in catalog.records() {
            assert!(table.content_types.iter().any(|o| o.value == record.category));
            assert!(
                record
                    .missions
                    .iter()
                    .all(|m| table.missions.iter().any(|o| o.value == *m))
            );
        }
    }

    /// S0.2: Live counts add up to the catalog size.
    #[test]
    fn live_category_counts_sum_to_len() {
        let catalog = Catalog::builtin();
        let table = FacetTable::with_live_counts(&catalog);
        let total: usize = table
            .content_types
            .iter()
            .filter_map(|o| o.live_count)
            .sum();
        assert_eq!(total, catalog.len());
    }

    /// S0.3: External catalogs go through the same invariants.
    #[test]
    fn external_catalog_loads() {
        let json = br#"[
            {"id": 10, "title": "Yeast in orbit", "type": "OSDR Data",
             "authors": "Lab A", "date": "2023-03-01", "missions": ["iss"], "doi": ""},
            {"id": 11, "title": "Lunar dust", "type": "Research Papers",
             "authors": "Lab B", "date": "2023-04-01", "missions": ["moon"]}
        ]"#;
        let catalog = Catalog::from_json(json).expect("valid catalog");
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(RecordId(10)).and_then(|r| r.doi.clone()), None);
    }
}

// =============================================================================
// TIER S1: FILTER CONJUNCTION
// =============================================================================

mod s1_filter_conjunction {
    use super::*;

    /// S1.1: Mars selects the first two records; adding "bone" empties the view.
    #[test]
    fn mars_then_bone() {
        let catalog = Catalog::builtin();
        let mut page = SearchPage::new(&catalog);

        page.facets_mut().toggle_mission(Mission::Mars);
        let ids: Vec<_> = page.results().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![RecordId(1), RecordId(2)]);

        page.facets_mut().set_query("bone");
        assert!(page.results().is_empty());
        assert_eq!(page.summary(), "Found 0 results for \"bone\"");
    }

    /// S1.2: Category, mission and date filters combine.
    #[test]
    fn three_facets_combined() {
        let catalog = Catalog::builtin();
        let mut page = SearchPage::new(&catalog);
        let facets = page.facets_mut();
        facets.toggle_category(Category::TaskBookGrants);
        facets.toggle_category(Category::OsdrData);
        facets.toggle_mission(Mission::Iss);
        facets.set_date_start_input("2024-06-01");
        facets.set_date_end_input("2024-06-30");

        let ids: Vec<_> = page.results().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![RecordId(3)]);
    }

    /// S1.3: Garbage date input never hides records.
    #[test]
    fn garbage_dates_fail_open() {
        let catalog = Catalog::builtin();
        let mut page = SearchPage::new(&catalog);
        page.facets_mut().set_date_start_input("yesterday");
        page.facets_mut().set_date_end_input("31/12/2024");
        assert_eq!(page.results().len(), 3);
    }
}

// =============================================================================
// TIER S2: FACET AND DETAIL FLOWS
// =============================================================================

mod s2_facet_and_detail {
    use super::*;

    /// S2.1: Unknown facet ids are rejected without touching the state.
    #[test]
    fn unknown_facet_rejected() {
        let catalog = Catalog::builtin();
        let mut page = SearchPage::new(&catalog);
        let result = page.facets_mut().toggle_category_id("podcasts");
        assert!(matches!(result, Err(SpaceBioError::UnknownFacet(_))));
        assert!(page.facets().state().is_empty());
    }

    /// S2.2: Full detail session: open, browse tabs, close, reopen.
    #[test]
    fn detail_session() {
        let catalog = Catalog::builtin();
        let mut page = SearchPage::new(&catalog);

        let record = page.select(RecordId(1)).expect("select").clone();
        let graph = KnowledgeGraph::for_record(&record);
        assert_eq!(graph.resolve_relationships().len(), 4);

        page.detail_mut().switch_tab(DetailTab::KnowledgeGraph);
        assert!(!page.detail_mut().backdrop_click(ClickTarget::Content));
        assert_eq!(page.detail().active_tab(), Some(DetailTab::KnowledgeGraph));

        page.detail_mut().close();
        page.select(RecordId(2)).expect("select");
        assert_eq!(page.detail().active_tab(), Some(DetailTab::Summary));
    }

    /// S2.3: Actions keep independent busy flags.
    #[test]
    fn action_flags_are_independent() {
        let mut board = ActionBoard::new();
        board.begin(ActionKind::Download).expect("download");
        assert!(board.begin(ActionKind::Download).is_err());
        assert!(board.begin(ActionKind::Citation).is_ok());
    }
}

// =============================================================================
// TIER S3: ACCOUNT FLOWS
// =============================================================================

mod s3_account_flows {
    use super::*;

    /// S3.1: Sign up through the form, then view the profile.
    #[test]
    fn sign_up_then_profile() {
        let mut client = AuthClient::new(IdentityService::new(MemoryPlatform::new()));
        client.restore(None);
        assert_eq!(
            ProfileGate::evaluate(&client.reader().snapshot()),
            ProfileGate::RedirectToSignIn
        );

        let form = RegistrationForm {
            first_name: "Mae".into(),
            last_name: "Jemison".into(),
            email: "mae@example.org".into(),
            password: "Endeavour92!".into(),
            confirm_password: "Endeavour92!".into(),
            research_area: "space-medicine".into(),
            ..RegistrationForm::default()
        };
        let registration = form.into_registration().expect("valid form");
        let profile = client.register(&registration).expect("register");

        assert_eq!(profile.display_name(), "Mae Jemison");
        assert_eq!(profile.initials(), "MJ");
        assert_eq!(
            ProfileGate::evaluate(&client.reader().snapshot()),
            ProfileGate::Show
        );
    }

    /// S3.2: A second registration with the same email fails with a fixed message.
    #[test]
    fn duplicate_registration_message() {
        let mut client = AuthClient::new(IdentityService::new(MemoryPlatform::new()));
        let form = RegistrationForm {
            first_name: "Mae".into(),
            last_name: "Jemison".into(),
            email: "mae@example.org".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
            ..RegistrationForm::default()
        };
        let registration = form.into_registration().expect("valid form");
        client.register(&registration).expect("first");
        client.logout().expect("logout");

        assert!(client.register(&registration).is_err());
        assert_eq!(
            client.reader().snapshot().error.as_deref(),
            Some("An account with this email already exists.")
        );
    }
}
