//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api::{self, AppState};
use crate::config::AppConfig;
use serde::Serialize;
use spacebio_core::{
    Catalog, CitationStyle, DatasetSheet, DetailTab, FacetManager, FacetTable, KnowledgeGraph,
    Record, RecordId, SearchPage, SpaceBioError, format_citation,
};
use std::collections::BTreeSet;

/// Print `value` as pretty JSON.
fn print_json<T: Serialize>(value: &T) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(
    catalog: Catalog,
    mut config: AppConfig,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), SpaceBioError> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    println!("SpaceBio Search Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", config.server.host);
    println!("  Port:     {}", config.server.port);
    println!("  Records:  {}", catalog.len());
    println!("  Timeout:  {} ms", config.actions.timeout_ms);
    println!();
    println!("Endpoints:");
    println!("  GET  /search                  - Filter publications");
    println!("  GET  /filters                 - Facets and counts");
    println!("  GET  /publications/{{id}}       - Publication detail");
    println!("  POST /publications/{{id}}/...   - citation, export, share, download");
    println!("  POST /auth/login              - Sign in");
    println!("  GET  /health                  - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::from_config(catalog, &config);
    api::run_server(&addr, state).await
}

// =============================================================================
// SEARCH COMMAND
// =============================================================================

/// Filter inputs as typed on the command line.
#[derive(Debug, Clone, Default)]
pub struct SearchArgs {
    pub query: String,
    pub categories: Vec<String>,
    pub missions: Vec<String>,
    pub from: String,
    pub to: String,
}

impl SearchArgs {
    /// Drive a facet manager the way the sidebar would.
    ///
    /// Each distinct facet id is toggled once; unknown ids are rejected.
    pub fn to_facets(&self) -> Result<FacetManager, SpaceBioError> {
        let mut facets = FacetManager::new();
        facets.set_query(self.query.as_str());

        let categories: BTreeSet<&str> = self.categories.iter().map(String::as_str).collect();
        for id in categories {
            facets.toggle_category_id(id)?;
        }
        let missions: BTreeSet<&str> = self.missions.iter().map(String::as_str).collect();
        for id in missions {
            facets.toggle_mission_id(id)?;
        }

        facets.set_date_start_input(&self.from);
        facets.set_date_end_input(&self.to);
        Ok(facets)
    }
}

#[derive(Serialize)]
struct SearchOutput<'a> {
    summary: String,
    count: usize,
    active_filters: Vec<String>,
    results: Vec<&'a Record>,
}

/// Filter the catalog and print the results.
pub fn cmd_search(
    catalog: &Catalog,
    args: &SearchArgs,
    json_mode: bool,
    verbose: bool,
) -> Result<(), SpaceBioError> {
    let mut page = SearchPage::new(catalog);
    *page.facets_mut() = args.to_facets()?;

    let results = page.results();
    let chips: Vec<String> = page
        .facets()
        .active_chips(&FacetTable::standard())
        .iter()
        .map(ToString::to_string)
        .collect();

    if json_mode {
        print_json(&SearchOutput {
            summary: page.summary(),
            count: results.len(),
            active_filters: chips,
            results,
        });
        return Ok(());
    }

    println!("{}", page.summary());
    if !chips.is_empty() {
        println!("Active Filters: {}", chips.join(" | "));
    }
    println!();

    for record in results {
        println!(
            "[{}] {} ({}, {})",
            record.id, record.title, record.category, record.date
        );
        println!("    {}", record.authors);
        if verbose {
            println!("    {}", record.abstract_text);
            if !record.tags.is_empty() {
                println!("    Tags: {}", record.tags.join(", "));
            }
        }
    }

    Ok(())
}

// =============================================================================
// SHOW COMMAND
// =============================================================================

/// Open a publication in the detail view and print one tab.
pub fn cmd_show(
    catalog: &Catalog,
    id: u64,
    tab: &str,
    json_mode: bool,
) -> Result<(), SpaceBioError> {
    let mut page = SearchPage::new(catalog);
    let record = page.select(RecordId(id))?;
    page.detail_mut().switch_tab_named(tab)?;
    let tab = page.detail().active_tab().unwrap_or_default();

    if json_mode {
        let body = match tab {
            DetailTab::Summary | DetailTab::Overview => serde_json::to_value(record),
            DetailTab::KnowledgeGraph => serde_json::to_value(KnowledgeGraph::for_record(record)),
            DetailTab::Data => serde_json::to_value(DatasetSheet::for_record(record)),
        }
        .map_err(|e| SpaceBioError::SerializationError(e.to_string()))?;
        print_json(&serde_json::json!({ "id": record.id, "tab": tab, "content": body }));
        return Ok(());
    }

    println!("{}", record.title);
    println!("{} | {} | {}", record.category, record.date, tab.label());
    println!();

    match tab {
        DetailTab::Summary => {
            println!("Authors:  {}", record.authors);
            println!("Journal:  {}", record.journal);
            println!();
            println!("{}", record.abstract_text);
            if !record.tags.is_empty() {
                println!();
                println!("Tags: {}", record.tags.join(", "));
            }
        }
        DetailTab::Overview => {
            let missions: Vec<&str> = record.missions.iter().map(|m| m.label()).collect();
            println!("Missions: {}", missions.join(", "));
            for (label, value) in record.external_ids() {
                println!("{:<10}{}", format!("{}:", label), value);
            }
        }
        DetailTab::KnowledgeGraph => print_graph(&KnowledgeGraph::for_record(record)),
        DetailTab::Data => {
            let sheet = DatasetSheet::for_record(record);
            println!("Dataset Information");
            for field in &sheet.info {
                println!("  {:<22}{}", field.label, field.value);
            }
            println!("Experimental Conditions");
            for field in &sheet.conditions {
                println!("  {:<22}{}", field.label, field.value);
            }
            println!("Downloads");
            for option in &sheet.downloads {
                println!("  {} ({})", option.label(), option.file_name(record));
            }
        }
    }

    Ok(())
}

// =============================================================================
// FILTERS COMMAND
// =============================================================================

/// List facets with declared and live counts.
pub fn cmd_filters(catalog: &Catalog, json_mode: bool) -> Result<(), SpaceBioError> {
    let table = FacetTable::with_live_counts(catalog);

    if json_mode {
        print_json(&table);
        return Ok(());
    }

    println!("Content Type");
    for option in &table.content_types {
        println!(
            "  {:<20}{:>5}   live: {}",
            option.label,
            option.count,
            option.live_count.unwrap_or_default()
        );
    }
    println!();
    println!("Mission Type");
    for option in &table.missions {
        println!(
            "  {:<20}{:>5}   live: {}",
            option.label,
            option.count,
            option.live_count.unwrap_or_default()
        );
    }

    Ok(())
}

// =============================================================================
// CITE COMMAND
// =============================================================================

/// Print a citation in the requested style.
pub fn cmd_cite(
    catalog: &Catalog,
    id: u64,
    style: &str,
    json_mode: bool,
) -> Result<(), SpaceBioError> {
    let style: CitationStyle = style.parse()?;
    let record = catalog.require(RecordId(id))?;
    let citation = format_citation(record, style);

    if json_mode {
        print_json(&serde_json::json!({
            "id": record.id,
            "style": style,
            "citation": citation,
        }));
    } else {
        println!("{}", citation);
    }
    Ok(())
}

// =============================================================================
// GRAPH COMMAND
// =============================================================================

/// Print the knowledge graph of a publication.
pub fn cmd_graph(catalog: &Catalog, id: u64, json_mode: bool) -> Result<(), SpaceBioError> {
    let record = catalog.require(RecordId(id))?;
    let graph = KnowledgeGraph::for_record(record);

    if json_mode {
        print_json(&serde_json::json!({
            "graph": graph,
            "relationships": graph.resolve_relationships(),
        }));
        return Ok(());
    }

    print_graph(&graph);
    Ok(())
}

fn print_graph(graph: &KnowledgeGraph) {
    println!("Entities");
    for entity in &graph.entities {
        println!(
            "  {:<18}{:<12}{} connections",
            entity.name,
            entity.kind.label(),
            entity.connections
        );
    }
    println!("Relationships");
    for rel in graph.resolve_relationships() {
        println!(
            "  {} --{}--> {} ({}%)",
            rel.from, rel.relation, rel.to, rel.strength_percent
        );
    }
    println!("Related Concepts");
    println!("  {}", graph.related_concepts.join(", "));
}
