//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification. The view layer drives the
//! store synchronously through these CRUD routes and the suggestion chain
//! through `/suggestions`.

use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use kinderplan_core::domain::{
    Activity, AgeGroup, DayTemplate, Document, Newsletter, WeeklyPlan,
};
use kinderplan_core::ports::{PortError, SuggestionRequest};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        suggest_handler,
        create_backup_handler,
        restore_backup_handler,
    ),
    components(
        schemas(SuggestPayload)
    ),
    tags(
        (name = "Kinderplan API", description = "API endpoints for the weekly lesson planner.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The parameters of a suggestion request.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestPayload {
    /// Serialized with its display label, e.g. "Pre-K" or "Grade School".
    #[schema(value_type = String, example = "Preschool")]
    pub age_group: AgeGroup,
    pub theme: String,
    #[serde(default)]
    pub materials: String,
}

#[derive(Serialize)]
pub struct OnboardingStatus {
    pub seen: bool,
}

/// Maps a store failure onto a 500, logging the underlying cause.
fn storage_error(err: PortError) -> (StatusCode, String) {
    error!("store operation failed: {:?}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Storage operation failed".to_string(),
    )
}

type HandlerResult<T> = Result<T, (StatusCode, String)>;

//=========================================================================================
// Collection CRUD Handlers
//=========================================================================================

pub async fn list_plans(State(state): State<Arc<AppState>>) -> HandlerResult<Json<Vec<WeeklyPlan>>> {
    state.store.plans().map(Json).map_err(storage_error)
}

pub async fn save_plan(
    State(state): State<Arc<AppState>>,
    Json(plan): Json<WeeklyPlan>,
) -> HandlerResult<Json<WeeklyPlan>> {
    state.store.save_plan(plan).map(Json).map_err(storage_error)
}

pub async fn delete_plan(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> HandlerResult<StatusCode> {
    state.store.delete_plan(&id).map_err(storage_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_library(
    State(state): State<Arc<AppState>>,
) -> HandlerResult<Json<Vec<Activity>>> {
    state.store.library().map(Json).map_err(storage_error)
}

pub async fn save_library_activity(
    State(state): State<Arc<AppState>>,
    Json(activity): Json<Activity>,
) -> HandlerResult<Json<Activity>> {
    state
        .store
        .save_library_activity(activity)
        .map(Json)
        .map_err(storage_error)
}

pub async fn delete_library_activity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> HandlerResult<StatusCode> {
    state.store.delete_library_activity(&id).map_err(storage_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_day_templates(
    State(state): State<Arc<AppState>>,
) -> HandlerResult<Json<Vec<DayTemplate>>> {
    state.store.day_templates().map(Json).map_err(storage_error)
}

pub async fn save_day_template(
    State(state): State<Arc<AppState>>,
    Json(template): Json<DayTemplate>,
) -> HandlerResult<Json<DayTemplate>> {
    state
        .store
        .save_day_template(template)
        .map(Json)
        .map_err(storage_error)
}

pub async fn delete_day_template(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> HandlerResult<StatusCode> {
    state.store.delete_day_template(&id).map_err(storage_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_weekly_templates(
    State(state): State<Arc<AppState>>,
) -> HandlerResult<Json<Vec<WeeklyPlan>>> {
    state
        .store
        .weekly_templates()
        .map(Json)
        .map_err(storage_error)
}

pub async fn save_weekly_template(
    State(state): State<Arc<AppState>>,
    Json(template): Json<WeeklyPlan>,
) -> HandlerResult<Json<WeeklyPlan>> {
    state
        .store
        .save_weekly_template(template)
        .map(Json)
        .map_err(storage_error)
}

pub async fn delete_weekly_template(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> HandlerResult<StatusCode> {
    state
        .store
        .delete_weekly_template(&id)
        .map_err(storage_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_documents(
    State(state): State<Arc<AppState>>,
) -> HandlerResult<Json<Vec<Document>>> {
    state.store.documents().map(Json).map_err(storage_error)
}

pub async fn save_document(
    State(state): State<Arc<AppState>>,
    Json(document): Json<Document>,
) -> HandlerResult<Json<Document>> {
    state
        .store
        .save_document(document)
        .map(Json)
        .map_err(storage_error)
}

pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> HandlerResult<StatusCode> {
    state.store.delete_document(&id).map_err(storage_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_newsletters(
    State(state): State<Arc<AppState>>,
) -> HandlerResult<Json<Vec<Newsletter>>> {
    state.store.newsletters().map(Json).map_err(storage_error)
}

pub async fn save_newsletter(
    State(state): State<Arc<AppState>>,
    Json(newsletter): Json<Newsletter>,
) -> HandlerResult<Json<Newsletter>> {
    state
        .store
        .save_newsletter(newsletter)
        .map(Json)
        .map_err(storage_error)
}

pub async fn delete_newsletter(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> HandlerResult<StatusCode> {
    state.store.delete_newsletter(&id).map_err(storage_error)?;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Onboarding Handlers
//=========================================================================================

pub async fn onboarding_status(
    State(state): State<Arc<AppState>>,
) -> HandlerResult<Json<OnboardingStatus>> {
    let seen = state.store.has_seen_onboarding().map_err(storage_error)?;
    Ok(Json(OnboardingStatus { seen }))
}

pub async fn mark_onboarding_seen(
    State(state): State<Arc<AppState>>,
) -> HandlerResult<StatusCode> {
    state.store.set_onboarding_seen().map_err(storage_error)?;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Backup / Restore Handlers
//=========================================================================================

/// Export a snapshot of every collection as one downloadable JSON value.
#[utoipa::path(
    get,
    path = "/backup",
    responses(
        (status = 200, description = "Backup snapshot created"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_backup_handler(
    State(state): State<Arc<AppState>>,
) -> HandlerResult<impl IntoResponse> {
    let backup = state.store.create_backup().map_err(storage_error)?;
    Ok(Json(backup))
}

/// Import a previously exported backup file.
///
/// Collections present in the snapshot replace the stored ones; absent
/// collections are left untouched. An unparsable file or one without a
/// version marker is rejected without mutating anything.
#[utoipa::path(
    post,
    path = "/restore",
    request_body(content = String, content_type = "application/json", description = "The backup file contents."),
    responses(
        (status = 204, description = "Backup restored"),
        (status = 400, description = "Invalid backup file"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn restore_backup_handler(
    State(state): State<Arc<AppState>>,
    body: String,
) -> HandlerResult<StatusCode> {
    match state.store.restore_backup(&body) {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(PortError::InvalidBackup(reason)) => {
            Err((StatusCode::BAD_REQUEST, format!("Invalid backup: {reason}")))
        }
        Err(err) => Err(storage_error(err)),
    }
}

//=========================================================================================
// Suggestion Handler
//=========================================================================================

/// Suggest activities for an age group and theme.
///
/// Never fails: the service resolves through its cache, then the remote
/// generative backend, then the built-in offline table. The `source` field
/// of the response discloses which tier answered.
#[utoipa::path(
    post,
    path = "/suggestions",
    request_body = SuggestPayload,
    responses(
        (status = 200, description = "A suggestion set, tagged with its provenance (ai/cache/offline)")
    )
)]
pub async fn suggest_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SuggestPayload>,
) -> impl IntoResponse {
    let request = SuggestionRequest {
        age_group: payload.age_group,
        theme: payload.theme,
        materials: payload.materials,
    };
    Json(state.suggestions.suggest(request).await)
}
