//! services/agent/src/web/rest.rs
//!
//! Contains the Axum handlers for the dashboard API and the master
//! definition for the OpenAPI specification.

use crate::web::protocol::{
    ConfigBody, DashboardResponse, HistoryQuery, HistoryResponse, PostResponse, PostStatusBody,
    ShareResponse, StatusResponse, UpdateStatusRequest,
};
use crate::web::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::NaiveTime;
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;
use velotrivia_core::{DashboardView, PortError};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        dashboard_handler,
        history_handler,
        get_settings_handler,
        update_settings_handler,
        generate_post_handler,
        generate_image_handler,
        update_status_handler,
        share_post_handler,
        toggle_connection_handler,
        manage_auth_handler,
        status_handler,
    ),
    components(
        schemas(
            PostResponse,
            PostStatusBody,
            ConfigBody,
            StatusResponse,
            DashboardResponse,
            HistoryResponse,
            UpdateStatusRequest,
            ShareResponse
        )
    ),
    tags(
        (name = "VeloTrivia Agent API", description = "Review, generate and share cycling trivia posts.")
    )
)]
pub struct ApiDoc;

type HandlerError = (StatusCode, String);

/// Maps a failed generator call onto the response shown to the dashboard.
fn port_error_response(e: PortError) -> HandlerError {
    match e {
        PortError::NotFound(what) => (StatusCode::NOT_FOUND, format!("Not found: {}", what)),
        PortError::ContentRejected(reason) => (StatusCode::UNPROCESSABLE_ENTITY, reason),
        PortError::Unauthorized => (
            StatusCode::BAD_GATEWAY,
            "The content generator rejected the API key".to_string(),
        ),
        PortError::Unexpected(_) => (
            StatusCode::BAD_GATEWAY,
            "The content generator request failed".to_string(),
        ),
    }
}

fn post_not_found(id: &str) -> HandlerError {
    (StatusCode::NOT_FOUND, format!("No post with id {}", id))
}

//=========================================================================================
// View Handlers
//=========================================================================================

/// The dashboard: the current scheduled post, totals, settings and sync state.
#[utoipa::path(
    get,
    path = "/dashboard",
    responses((status = 200, description = "Dashboard view", body = DashboardResponse))
)]
pub async fn dashboard_handler(State(app_state): State<Arc<AppState>>) -> Json<DashboardResponse> {
    let data = app_state.controller.snapshot().await;
    let status = app_state.controller.status().await;
    let view = DashboardView::build(&data, status);
    Json(DashboardResponse::new(view, app_state.remote_sync_enabled()))
}

/// Posts that have left the schedule, optionally narrowed to posted or failed.
#[utoipa::path(
    get,
    path = "/history",
    params(HistoryQuery),
    responses((status = 200, description = "Post history", body = HistoryResponse))
)]
pub async fn history_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Json<HistoryResponse> {
    let data = app_state.controller.snapshot().await;
    let posts = query
        .filter
        .unwrap_or_default()
        .apply(&data.posts)
        .into_iter()
        .map(PostResponse::from)
        .collect();
    Json(HistoryResponse { posts })
}

#[utoipa::path(
    get,
    path = "/settings",
    responses((status = 200, description = "Current agent settings", body = ConfigBody))
)]
pub async fn get_settings_handler(State(app_state): State<Arc<AppState>>) -> Json<ConfigBody> {
    Json(app_state.controller.snapshot().await.config.into())
}

/// Replaces the agent settings.
#[utoipa::path(
    put,
    path = "/settings",
    request_body = ConfigBody,
    responses(
        (status = 200, description = "Settings saved", body = ConfigBody),
        (status = 400, description = "Post time is not HH:MM")
    )
)]
pub async fn update_settings_handler(
    State(app_state): State<Arc<AppState>>,
    Json(body): Json<ConfigBody>,
) -> Result<impl IntoResponse, HandlerError> {
    NaiveTime::parse_from_str(&body.post_time, "%H:%M").map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            format!("Invalid post time '{}', expected HH:MM", body.post_time),
        )
    })?;

    let config = app_state.controller.update_config(body.into()).await;
    info!("Settings updated.");
    Ok(Json(ConfigBody::from(config)))
}

/// Sync state flags, for polling while a command is in flight.
#[utoipa::path(
    get,
    path = "/status",
    responses((status = 200, description = "Sync status", body = StatusResponse))
)]
pub async fn status_handler(State(app_state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let status = app_state.controller.status().await;
    Json(StatusResponse::new(status, app_state.remote_sync_enabled()))
}

//=========================================================================================
// Post Commands
//=========================================================================================

/// Generates a new trivia post about the configured topic and schedules it.
#[utoipa::path(
    post,
    path = "/posts/generate",
    responses(
        (status = 201, description = "Post generated", body = PostResponse),
        (status = 502, description = "The content generator failed")
    )
)]
pub async fn generate_post_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HandlerError> {
    let post = app_state
        .controller
        .generate_trivia()
        .await
        .map_err(port_error_response)?;
    Ok((StatusCode::CREATED, Json(PostResponse::from(post))))
}

/// Generates an image from the post's image description and attaches it.
#[utoipa::path(
    post,
    path = "/posts/{id}/image",
    params(("id" = String, Path, description = "Post id")),
    responses(
        (status = 200, description = "Image attached", body = PostResponse),
        (status = 404, description = "Unknown post"),
        (status = 422, description = "The generator returned no image"),
        (status = 502, description = "The content generator failed")
    )
)]
pub async fn generate_image_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let post = app_state
        .controller
        .generate_image(&id)
        .await
        .map_err(port_error_response)?
        .ok_or_else(|| post_not_found(&id))?;
    Ok(Json(PostResponse::from(post)))
}

/// Marks a post as posted, or discards it by marking it failed.
#[utoipa::path(
    put,
    path = "/posts/{id}/status",
    params(("id" = String, Path, description = "Post id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = PostResponse),
        (status = 400, description = "Posts cannot be moved back to scheduled"),
        (status = 404, description = "Unknown post")
    )
)]
pub async fn update_status_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if body.status == PostStatusBody::Scheduled {
        return Err((
            StatusCode::BAD_REQUEST,
            "Status must be 'posted' or 'failed'".to_string(),
        ));
    }

    let post = app_state
        .controller
        .update_post_status(&id, body.status.into())
        .await
        .ok_or_else(|| post_not_found(&id))?;
    Ok(Json(PostResponse::from(post)))
}

/// The share text for a post, ready for the clipboard.
#[utoipa::path(
    get,
    path = "/posts/{id}/share",
    params(("id" = String, Path, description = "Post id")),
    responses(
        (status = 200, description = "Share text", body = ShareResponse),
        (status = 404, description = "Unknown post")
    )
)]
pub async fn share_post_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let data = app_state.controller.snapshot().await;
    let post = data
        .posts
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| post_not_found(&id))?;
    Ok(Json(ShareResponse {
        title: "Cycling Trivia".to_string(),
        text: post.share_text(),
    }))
}

//=========================================================================================
// Connection Commands
//=========================================================================================

/// Flips the simulated Facebook connection flag.
#[utoipa::path(
    post,
    path = "/connection/toggle",
    responses((status = 200, description = "Updated settings", body = ConfigBody))
)]
pub async fn toggle_connection_handler(State(app_state): State<Arc<AppState>>) -> Json<ConfigBody> {
    Json(app_state.controller.toggle_connection().await.into())
}

/// Runs the simulated authorization flow: disconnects at once, or connects
/// after a short delay.
#[utoipa::path(
    post,
    path = "/connection/auth",
    responses((status = 200, description = "Updated settings", body = ConfigBody))
)]
pub async fn manage_auth_handler(State(app_state): State<Arc<AppState>>) -> Json<ConfigBody> {
    let config = app_state.controller.manage_auth().await;
    if config.fb_connected {
        info!("Account linked to \"{}\".", config.group_name);
    } else {
        info!("Account disconnected.");
    }
    Json(config.into())
}
