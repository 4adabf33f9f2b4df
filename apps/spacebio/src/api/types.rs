//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.
//!
//! Every response carries `success` and an optional `error`. Bodies that
//! embed static view models (knowledge graph, dataset sheet, facet table)
//! are serialize-only.

use serde::{Deserialize, Serialize};
use spacebio_core::{
    ActionKind, CitationStyle, DatasetSheet, DateRange, DetailTab, DownloadOption, FacetTable,
    FieldErrors, FilterChip, FilterState, Record, SpaceBioError, TaskStatus, UserProfile,
    format_research_area,
    knowledge::{KnowledgeGraph, NodePosition, ResolvedRelationship},
    primitives::MAX_QUERY_LENGTH,
    profile::PasswordStrength,
};
use std::collections::BTreeMap;

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// SEARCH
// =============================================================================

/// Parsed `/search` query string.
///
/// Facet parameters repeat (`category=a&category=b`) or carry a comma list
/// (`category=a,b`). Duplicates select once. Dates that do not parse leave
/// that bound open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub state: FilterState,
}

impl SearchQuery {
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self, SpaceBioError> {
        let mut state = FilterState::default();
        let mut from = String::new();
        let mut to = String::new();

        for (key, value) in pairs {
            match key.as_str() {
                "q" => {
                    if value.len() > MAX_QUERY_LENGTH {
                        return Err(SpaceBioError::InvalidQuery(format!(
                            "Query length {} exceeds maximum {} bytes",
                            value.len(),
                            MAX_QUERY_LENGTH
                        )));
                    }
                    state.query_text.clone_from(value);
                }
                "category" => {
                    for id in split_list(value) {
                        state.selected_categories.insert(id.parse()?);
                    }
                }
                "mission" => {
                    for id in split_list(value) {
                        state.selected_missions.insert(id.parse()?);
                    }
                }
                "from" => from.clone_from(value),
                "to" => to.clone_from(value),
                other => tracing::debug!(param = other, "Ignoring unknown search parameter"),
            }
        }

        state.date_range = DateRange::parse(&from, &to);
        Ok(Self { state })
    }
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Search results with the "Active Filters" chips.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub summary: String,
    pub count: usize,
    pub results: Vec<Record>,
    pub active_filters: Vec<FilterChip>,
    pub error: Option<String>,
}

impl SearchResponse {
    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            summary: String::new(),
            count: 0,
            results: vec![],
            active_filters: vec![],
            error: Some(msg.into()),
        }
    }
}

/// Facet table with declared and live counts.
#[derive(Debug, Clone, Serialize)]
pub struct FiltersResponse {
    pub success: bool,
    pub total: usize,
    pub filters: FacetTable,
}

// =============================================================================
// PUBLICATIONS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicationListResponse {
    pub success: bool,
    pub count: usize,
    pub publications: Vec<Record>,
}

/// Optional `?tab=` for the detail view.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetailParams {
    pub tab: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabJson {
    pub id: DetailTab,
    pub label: String,
}

/// One record opened in the detail view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicationResponse {
    pub success: bool,
    pub publication: Option<Record>,
    pub active_tab: Option<DetailTab>,
    pub tabs: Vec<TabJson>,
    pub error: Option<String>,
}

impl PublicationResponse {
    pub fn success(record: Record, active_tab: DetailTab) -> Self {
        Self {
            success: true,
            publication: Some(record),
            active_tab: Some(active_tab),
            tabs: DetailTab::ALL
                .into_iter()
                .map(|tab| TabJson {
                    id: tab,
                    label: tab.label().to_string(),
                })
                .collect(),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            publication: None,
            active_tab: None,
            tabs: vec![],
            error: Some(msg.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeGraphResponse {
    pub success: bool,
    pub graph: Option<KnowledgeGraph>,
    pub relationships: Vec<ResolvedRelationship>,
    pub layout: Vec<NodePosition>,
    pub error: Option<String>,
}

impl KnowledgeGraphResponse {
    pub fn success(graph: KnowledgeGraph) -> Self {
        Self {
            success: true,
            relationships: graph.resolve_relationships(),
            layout: graph.layout(),
            graph: Some(graph),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            graph: None,
            relationships: vec![],
            layout: vec![],
            error: Some(msg.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetResponse {
    pub success: bool,
    pub dataset: Option<DatasetSheet>,
    pub error: Option<String>,
}

// =============================================================================
// ACTIONS
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CitationRequest {
    #[serde(default)]
    pub style: CitationStyle,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DownloadRequest {
    #[serde(default)]
    pub option: DownloadOption,
}

/// Outcome of a mock action run.
///
/// `data` is base64 encoded file content (export, download); `text` is
/// the citation; `url` is the share link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    pub action: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub error: Option<String>,
}

impl ActionResponse {
    fn empty(action: ActionKind) -> Self {
        Self {
            success: true,
            action,
            file_name: None,
            data: None,
            text: None,
            url: None,
            error: None,
        }
    }

    pub fn file(action: ActionKind, file_name: String, bytes: &[u8]) -> Self {
        Self {
            file_name: Some(file_name),
            data: Some(base64::Engine::encode(
                &base64::engine::general_purpose::STANDARD,
                bytes,
            )),
            ..Self::empty(action)
        }
    }

    pub fn text(action: ActionKind, text: String) -> Self {
        Self {
            text: Some(text),
            ..Self::empty(action)
        }
    }

    pub fn link(action: ActionKind, url: String) -> Self {
        Self {
            url: Some(url),
            ..Self::empty(action)
        }
    }

    pub fn error(action: ActionKind, msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
            ..Self::empty(action)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionStatusJson {
    pub action: ActionKind,
    pub status: TaskStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionsResponse {
    pub success: bool,
    pub actions: Vec<ActionStatusJson>,
    pub error: Option<String>,
}

impl ActionsResponse {
    pub fn from_board(board: Vec<(ActionKind, TaskStatus)>) -> Self {
        Self {
            success: true,
            actions: board
                .into_iter()
                .map(|(action, status)| ActionStatusJson { action, status })
                .collect(),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            actions: vec![],
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// AUTH
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordRequest {
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordStrengthResponse {
    pub success: bool,
    #[serde(flatten)]
    pub strength: PasswordStrength,
}

/// Form errors keyed by field name.
pub fn field_errors_json(errors: &FieldErrors) -> BTreeMap<String, String> {
    errors
        .iter()
        .map(|(field, msg)| (field.as_str().to_string(), (*msg).to_string()))
        .collect()
}

/// Sign-in, sign-up and profile response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub user: Option<UserProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initials: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub research_area_label: Option<String>,
    /// Platform error code, e.g. `auth/wrong-password`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub field_errors: BTreeMap<String, String>,
    pub error: Option<String>,
}

impl AuthResponse {
    pub fn signed_in(token: Option<String>, user: UserProfile) -> Self {
        Self {
            success: true,
            token,
            display_name: Some(user.display_name()),
            initials: Some(user.initials()),
            research_area_label: Some(format_research_area(&user.research_area)),
            user: Some(user),
            code: None,
            field_errors: BTreeMap::new(),
            error: None,
        }
    }

    pub fn ok() -> Self {
        Self {
            success: true,
            token: None,
            user: None,
            display_name: None,
            initials: None,
            research_area_label: None,
            code: None,
            field_errors: BTreeMap::new(),
            error: None,
        }
    }

    pub fn failure(code: &str, msg: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code.to_string()),
            error: Some(msg.into()),
            ..Self::ok()
        }
    }

    pub fn invalid_form(errors: &FieldErrors) -> Self {
        Self {
            success: false,
            field_errors: field_errors_json(errors),
            error: Some("Please correct the highlighted fields.".to_string()),
            ..Self::ok()
        }
    }
}
