pub mod protocol;
pub mod rest;
pub mod state;

use axum::{
    routing::{get, post, put},
    Router,
};
use rest::ApiDoc;
use state::AppState;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use rest::{
    dashboard_handler, generate_image_handler, generate_post_handler, get_settings_handler,
    history_handler, manage_auth_handler, share_post_handler, status_handler,
    toggle_connection_handler, update_settings_handler, update_status_handler,
};

/// Builds the dashboard API router together with the Swagger UI.
pub fn router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/dashboard", get(dashboard_handler))
        .route("/history", get(history_handler))
        .route("/settings", get(get_settings_handler).put(update_settings_handler))
        .route("/status", get(status_handler))
        .route("/posts/generate", post(generate_post_handler))
        .route("/posts/{id}/image", post(generate_image_handler))
        .route("/posts/{id}/status", put(update_status_handler))
        .route("/posts/{id}/share", get(share_post_handler))
        .route("/connection/toggle", post(toggle_connection_handler))
        .route("/connection/auth", post(manage_auth_handler))
        .with_state(app_state);

    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
