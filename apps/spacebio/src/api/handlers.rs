//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.

use super::{
    AppState,
    auth::{SessionToken, auth_failure},
    types::{
        ActionResponse, ActionsResponse, AuthResponse, CitationRequest, DatasetResponse,
        DetailParams, DownloadRequest, EmailRequest, FiltersResponse, HealthResponse,
        KnowledgeGraphResponse, LoginRequest, PasswordRequest, PasswordStrengthResponse,
        PublicationListResponse, PublicationResponse, SearchQuery, SearchResponse,
    },
};
use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::de::DeserializeOwned;
use spacebio_core::{
    ActionKind, AuthError, AuthSnapshot, DatasetSheet, FacetManager, FacetTable, KnowledgeGraph,
    ProfileGate, ProfileUpdate, Record, RecordId, RegistrationForm, SearchPage, SpaceBioError,
    UserProfile, format_citation, password_strength,
};

// =============================================================================
// SHARED HELPERS
// =============================================================================

/// HTTP status for a core failure.
fn error_status(error: &SpaceBioError) -> StatusCode {
    match error {
        SpaceBioError::RecordNotFound(_) => StatusCode::NOT_FOUND,
        SpaceBioError::UnknownFacet(_)
        | SpaceBioError::UnknownTab(_)
        | SpaceBioError::UnknownCitationStyle(_)
        | SpaceBioError::UnknownAction(_)
        | SpaceBioError::InvalidQuery(_)
        | SpaceBioError::SerializationError(_) => StatusCode::BAD_REQUEST,
        SpaceBioError::ActionBusy(_) | SpaceBioError::ActionCancelled(_) => StatusCode::CONFLICT,
        SpaceBioError::ActionTimedOut(_) => StatusCode::GATEWAY_TIMEOUT,
        SpaceBioError::ActionFailed(_)
        | SpaceBioError::DuplicateRecord(_)
        | SpaceBioError::InvalidCatalog(_)
        | SpaceBioError::InvalidConfig(_)
        | SpaceBioError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Parse an optional JSON body; an empty body means defaults.
fn optional_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, SpaceBioError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| SpaceBioError::SerializationError(e.to_string()))
}

fn lookup(state: &AppState, id: u64) -> Result<Record, SpaceBioError> {
    state.catalog.require(RecordId(id)).cloned()
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// SEARCH HANDLERS
// =============================================================================

/// Filter the catalog. See [`SearchQuery`] for the parameters.
pub async fn search_handler(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> impl IntoResponse {
    let query = match SearchQuery::from_pairs(&pairs) {
        Ok(q) => q,
        Err(e) => {
            return (
                error_status(&e),
                Json(SearchResponse::error(format!("Invalid search: {}", e))),
            );
        }
    };

    let mut page = SearchPage::new(&state.catalog);
    *page.facets_mut() = FacetManager::with_state(query.state);

    let results: Vec<Record> = page.results().into_iter().cloned().collect();
    let response = SearchResponse {
        success: true,
        summary: page.summary(),
        count: results.len(),
        results,
        active_filters: page.facets().active_chips(&FacetTable::standard()),
        error: None,
    };
    (StatusCode::OK, Json(response))
}

/// Facet definitions with declared and live counts.
pub async fn filters_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(FiltersResponse {
        success: true,
        total: state.catalog.len(),
        filters: FacetTable::with_live_counts(&state.catalog),
    })
}

// =============================================================================
// PUBLICATION HANDLERS
// =============================================================================

pub async fn list_publications_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(PublicationListResponse {
        success: true,
        count: state.catalog.len(),
        publications: state.catalog.records().to_vec(),
    })
}

/// Open a record in the detail view, optionally on a given tab.
pub async fn publication_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(params): Query<DetailParams>,
) -> impl IntoResponse {
    let mut page = SearchPage::new(&state.catalog);
    let record = match page.select(RecordId(id)) {
        Ok(r) => r.clone(),
        Err(e) => return (error_status(&e), Json(PublicationResponse::error(e.to_string()))),
    };

    if let Some(tab) = params.tab.as_deref() {
        if let Err(e) = page.detail_mut().switch_tab_named(tab) {
            return (error_status(&e), Json(PublicationResponse::error(e.to_string())));
        }
    }

    let tab = page.detail().active_tab().unwrap_or_default();
    (StatusCode::OK, Json(PublicationResponse::success(record, tab)))
}

pub async fn knowledge_graph_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    match state.catalog.require(RecordId(id)) {
        Ok(record) => (
            StatusCode::OK,
            Json(KnowledgeGraphResponse::success(KnowledgeGraph::for_record(
                record,
            ))),
        ),
        Err(e) => (
            error_status(&e),
            Json(KnowledgeGraphResponse::error(e.to_string())),
        ),
    }
}

pub async fn dataset_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    match state.catalog.require(RecordId(id)) {
        Ok(record) => (
            StatusCode::OK,
            Json(DatasetResponse {
                success: true,
                dataset: Some(DatasetSheet::for_record(record)),
                error: None,
            }),
        ),
        Err(e) => (
            error_status(&e),
            Json(DatasetResponse {
                success: false,
                dataset: None,
                error: Some(e.to_string()),
            }),
        ),
    }
}

// =============================================================================
// ACTION HANDLERS
// =============================================================================

fn action_error(kind: ActionKind, e: &SpaceBioError) -> (StatusCode, Json<ActionResponse>) {
    (error_status(e), Json(ActionResponse::error(kind, e.to_string())))
}

/// Run the Citation action. Body: `{"style": "plain" | "bibtex"}`, optional.
pub async fn citation_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    body: Bytes,
) -> impl IntoResponse {
    let kind = ActionKind::Citation;
    let (record, request) = match lookup(&state, id)
        .and_then(|r| optional_body::<CitationRequest>(&body).map(|b| (r, b)))
    {
        Ok(pair) => pair,
        Err(e) => return action_error(kind, &e),
    };

    let style = request.style;
    match state
        .actions
        .run(kind, move || format_citation(&record, style))
        .await
    {
        Ok(text) => (StatusCode::OK, Json(ActionResponse::text(kind, text))),
        Err(e) => action_error(kind, &e),
    }
}

/// Run the Export action: the record as a JSON document.
pub async fn export_handler(State(state): State<AppState>, Path(id): Path<u64>) -> impl IntoResponse {
    let kind = ActionKind::Export;
    let record = match lookup(&state, id) {
        Ok(r) => r,
        Err(e) => return action_error(kind, &e),
    };

    let file_name = format!("publication-{}.json", record.id);
    let produced = state
        .actions
        .run(kind, move || {
            serde_json::to_vec_pretty(&serde_json::json!({
                "exportedAt": chrono::Utc::now().to_rfc3339(),
                "publication": record,
            }))
        })
        .await;

    match produced {
        Ok(Ok(bytes)) => (
            StatusCode::OK,
            Json(ActionResponse::file(kind, file_name, &bytes)),
        ),
        Ok(Err(e)) => action_error(kind, &SpaceBioError::SerializationError(e.to_string())),
        Err(e) => action_error(kind, &e),
    }
}

/// Run the Share action: a link to the record.
pub async fn share_handler(State(state): State<AppState>, Path(id): Path<u64>) -> impl IntoResponse {
    let kind = ActionKind::Share;
    let record = match lookup(&state, id) {
        Ok(r) => r,
        Err(e) => return action_error(kind, &e),
    };

    let base = state.public_url.trim_end_matches('/').to_string();
    match state
        .actions
        .run(kind, move || format!("{}/publications/{}", base, record.id))
        .await
    {
        Ok(url) => (StatusCode::OK, Json(ActionResponse::link(kind, url))),
        Err(e) => action_error(kind, &e),
    }
}

/// Run the Download action. Body: `{"option": "raw-data" | ...}`, optional.
pub async fn download_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    body: Bytes,
) -> impl IntoResponse {
    let kind = ActionKind::Download;
    let (record, request) = match lookup(&state, id)
        .and_then(|r| optional_body::<DownloadRequest>(&body).map(|b| (r, b)))
    {
        Ok(pair) => pair,
        Err(e) => return action_error(kind, &e),
    };

    let option = request.option;
    let file_name = option.file_name(&record);
    let produced = state
        .actions
        .run(kind, move || {
            serde_json::to_vec_pretty(&serde_json::json!({
                "option": option,
                "label": option.label(),
                "dataset": DatasetSheet::for_record(&record),
            }))
        })
        .await;

    match produced {
        Ok(Ok(bytes)) => (
            StatusCode::OK,
            Json(ActionResponse::file(kind, file_name, &bytes)),
        ),
        Ok(Err(e)) => action_error(kind, &SpaceBioError::SerializationError(e.to_string())),
        Err(e) => action_error(kind, &e),
    }
}

/// Current status of every action.
pub async fn actions_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(ActionsResponse::from_board(state.actions.snapshot().await))
}

/// Cancel a pending action run.
pub async fn cancel_action_handler(
    State(state): State<AppState>,
    Path(action): Path<String>,
) -> impl IntoResponse {
    let kind = match action.parse::<ActionKind>() {
        Ok(k) => k,
        Err(e) => return (error_status(&e), Json(ActionsResponse::error(e.to_string()))),
    };

    if !state.actions.cancel(kind).await {
        return (
            StatusCode::NOT_FOUND,
            Json(ActionsResponse::error(format!("No pending {} action", kind))),
        );
    }
    tracing::info!(action = %kind, "Action cancelled by request");
    (
        StatusCode::OK,
        Json(ActionsResponse::from_board(state.actions.snapshot().await)),
    )
}

// =============================================================================
// AUTH HANDLERS
// =============================================================================

pub async fn register_handler(
    State(state): State<AppState>,
    Json(form): Json<RegistrationForm>,
) -> impl IntoResponse {
    let registration = match form.into_registration() {
        Ok(r) => r,
        Err(errors) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(AuthResponse::invalid_form(&errors)),
            );
        }
    };

    let result = state.identity.write().await.register(&registration);
    match result {
        Ok(signed_in) => {
            tracing::info!(uid = %signed_in.profile.uid, "Account registered");
            (
                StatusCode::CREATED,
                Json(AuthResponse::signed_in(
                    Some(signed_in.token),
                    signed_in.profile,
                )),
            )
        }
        Err(e) => {
            tracing::warn!(event = "auth_failure", reason = e.code(), "Registration failed");
            auth_failure(&e)
        }
    }
}

pub async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> impl IntoResponse {
    let result = state
        .identity
        .write()
        .await
        .login(&request.email, &request.password);
    match result {
        Ok(signed_in) => (
            StatusCode::OK,
            Json(AuthResponse::signed_in(
                Some(signed_in.token),
                signed_in.profile,
            )),
        ),
        Err(e) => {
            tracing::warn!(event = "auth_failure", reason = e.code(), "Login failed");
            auth_failure(&e)
        }
    }
}

pub async fn logout_handler(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> impl IntoResponse {
    match state.identity.write().await.logout(&token) {
        Ok(()) => (StatusCode::OK, Json(AuthResponse::ok())),
        Err(e) => auth_failure(&e),
    }
}

pub async fn forgot_password_handler(
    State(state): State<AppState>,
    Json(request): Json<EmailRequest>,
) -> impl IntoResponse {
    match state.identity.write().await.forgot_password(&request.email) {
        Ok(()) => (StatusCode::OK, Json(AuthResponse::ok())),
        Err(e) => auth_failure(&e),
    }
}

pub async fn password_strength_handler(Json(request): Json<PasswordRequest>) -> impl IntoResponse {
    Json(PasswordStrengthResponse {
        success: true,
        strength: password_strength(&request.password),
    })
}

// =============================================================================
// PROFILE HANDLERS
// =============================================================================

/// The signed-in user's profile (`GET /auth/me` and `GET /profile`).
pub async fn profile_handler(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> impl IntoResponse {
    let lookup = state.identity.read().await.profile(&token);
    match gate_profile(lookup) {
        Ok(profile) => (StatusCode::OK, Json(AuthResponse::signed_in(None, profile))),
        Err(e) => auth_failure(&e),
    }
}

/// Apply the profile page's gate to a finished lookup.
///
/// The server answers only after auth has resolved, so the gate never
/// reports Loading here.
fn gate_profile(lookup: Result<UserProfile, AuthError>) -> Result<UserProfile, AuthError> {
    match ProfileGate::evaluate(&AuthSnapshot::settled(&lookup)) {
        ProfileGate::Show => lookup,
        ProfileGate::RedirectToSignIn | ProfileGate::Loading => {
            lookup.and(Err(AuthError::NotAuthenticated))
        }
    }
}

pub async fn update_profile_handler(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(update): Json<ProfileUpdate>,
) -> impl IntoResponse {
    let errors = update.validate();
    if !errors.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(AuthResponse::invalid_form(&errors)),
        );
    }

    let result = state.identity.write().await.update_profile(&token, &update);
    match result {
        Ok(profile) => (StatusCode::OK, Json(AuthResponse::signed_in(None, profile))),
        Err(e) => auth_failure(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_means_defaults() {
        let request: CitationRequest = optional_body(&Bytes::from_static(b"  ")).expect("empty");
        assert_eq!(request.style, spacebio_core::CitationStyle::Plain);

        let request: CitationRequest =
            optional_body(&Bytes::from_static(br#"{"style":"bibtex"}"#)).expect("bibtex");
        assert_eq!(request.style, spacebio_core::CitationStyle::Bibtex);

        assert!(optional_body::<CitationRequest>(&Bytes::from_static(b"{")).is_err());
    }

    #[test]
    fn missing_record_is_not_found() {
        assert_eq!(
            error_status(&SpaceBioError::RecordNotFound(RecordId(9))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_status(&SpaceBioError::ActionBusy(ActionKind::Share)),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn profile_gate_shows_only_signed_in_lookups() {
        let mut identity = spacebio_core::IdentityService::new(spacebio_core::MemoryPlatform::new());
        let signed_in = identity
            .register(&spacebio_core::Registration {
                email: "ada@example.org".into(),
                password: "secret1".into(),
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                institution: String::new(),
                research_area: String::new(),
            })
            .expect("register");

        let profile = gate_profile(identity.profile(&signed_in.token)).expect("shown");
        assert_eq!(profile.email, "ada@example.org");

        identity.logout(&signed_in.token).expect("logout");
        assert_eq!(
            gate_profile(identity.profile(&signed_in.token)),
            Err(AuthError::NotAuthenticated)
        );
    }
}
