//! # Citation Export
//!
//! Payload of the "Export Citation" action.

use crate::{Category, Record, SpaceBioError};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationStyle {
    #[default]
    Plain,
    Bibtex,
}

impl FromStr for CitationStyle {
    type Err = SpaceBioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "plain" | "text" => Ok(Self::Plain),
            "bibtex" | "bib" => Ok(Self::Bibtex),
            _ => Err(SpaceBioError::UnknownCitationStyle(s.to_string())),
        }
    }
}

/// Authors split on commas, blanks dropped.
fn author_list(record: &Record) -> Vec<&str> {
    record
        .authors
        .split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .collect()
}

/// BibTeX key: first author's surname, lower-cased, followed by the year.
#[must_use]
pub fn citation_key(record: &Record) -> String {
    let surname: String = author_list(record)
        .first()
        .and_then(|a| a.split_whitespace().last())
        .unwrap_or("anon")
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();
    format!("{surname}{}", record.date.year())
}

fn plain(record: &Record) -> String {
    let mut out = format!(
        "{} ({}). {}.",
        record.authors.trim(),
        record.date.year(),
        record.title
    );
    if !record.journal.is_empty() {
        let _ = write!(out, " {}.", record.journal);
    }
    if let Some(doi) = &record.doi {
        let _ = write!(out, " https://doi.org/{doi}");
    }
    out
}

fn bibtex(record: &Record) -> String {
    let entry = match record.category {
        Category::ResearchPapers => "article",
        Category::OsdrData | Category::TaskBookGrants => "misc",
    };
    let mut out = format!("@{entry}{{{},\n", citation_key(record));
    let _ = writeln!(out, "  title = {{{}}},", record.title);
    let _ = writeln!(out, "  author = {{{}}},", author_list(record).join(" and "));
    if !record.journal.is_empty() {
        let venue = if entry == "article" { "journal" } else { "howpublished" };
        let _ = writeln!(out, "  {venue} = {{{}}},", record.journal);
    }
    let _ = writeln!(out, "  year = {{{}}},", record.date.year());
    if let Some(doi) = &record.doi {
        let _ = writeln!(out, "  doi = {{{doi}}},");
    }
    out.push('}');
    out
}

#[must_use]
pub fn format_citation(record: &Record, style: CitationStyle) -> String {
    match style {
        CitationStyle::Plain => plain(record),
        CitationStyle::Bibtex => bibtex(record),
    }
}
