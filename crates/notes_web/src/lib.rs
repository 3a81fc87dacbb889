use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod error;
pub mod handlers;
pub mod state;

pub use auth::{CurrentUser, StaticTokenVerifier};
pub use error::{ApiError, ApiResult};
pub use state::{AppState, Timeouts, ANNOTATION_MARGIN};

pub async fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/api/notes", get(handlers::list_notes).post(handlers::create_note))
        .route("/api/notes/summarize", post(handlers::summarize_note))
        .route("/api/notes/extract-todos", post(handlers::extract_todos))
        .route(
            "/api/notes/:id",
            get(handlers::get_note)
                .put(handlers::update_note)
                .delete(handlers::delete_note),
        )
        .route("/api/notes/:id/permanent", delete(handlers::permanent_delete_note))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

pub mod prelude {
    pub use notes_core::{Note, Result, Error};
    pub use crate::{create_app, AppState, Timeouts, StaticTokenVerifier};
}
