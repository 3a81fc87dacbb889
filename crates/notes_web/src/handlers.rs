use axum::{
    extract::{Path, State},
    Json,
};
use notes_core::{AnnotationRequest, Note, NoteCreate, NoteUpdate, SummaryResult, TodoResult};
use notes_inference::workflow::MIN_CONTENT_CHARS;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;
use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Notes API is running!" }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "message": "API is running" }))
}

pub async fn create_note(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<NoteCreate>,
) -> ApiResult<Json<Note>> {
    input.validate()?;
    let note = state.workflow.create_note(input, &user.uid).await?;
    info!("📝 Created note {} for {}", note.id, user.uid);
    Ok(Json(note))
}

pub async fn list_notes(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<Note>>> {
    Ok(Json(state.store.list_by_owner(&user.uid).await?))
}

pub async fn get_note(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Note>> {
    state
        .store
        .get(&id, &user.uid)
        .await?
        .map(Json)
        .ok_or_else(ApiError::not_found)
}

pub async fn update_note(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(patch): Json<NoteUpdate>,
) -> ApiResult<Json<Note>> {
    patch.validate()?;
    state
        .store
        .update(&id, &user.uid, patch)
        .await?
        .map(Json)
        .ok_or_else(ApiError::not_found)
}

pub async fn delete_note(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let deleted = tokio::time::timeout(state.timeouts.request, state.store.soft_delete(&id, &user.uid))
        .await
        .map_err(|_| ApiError::timeout("Request timeout - please try again"))??;

    if !deleted {
        return Err(ApiError::not_found());
    }
    info!("🗑️ Note {} moved to trash", id);
    Ok(Json(json!({ "message": "Note deleted successfully" })))
}

pub async fn permanent_delete_note(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    if !state.store.hard_delete(&id, &user.uid).await? {
        return Err(ApiError::not_found());
    }
    info!("🗑️ Note {} permanently deleted", id);
    Ok(Json(json!({ "message": "Note permanently deleted" })))
}

pub async fn summarize_note(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<AnnotationRequest>,
) -> ApiResult<Json<SummaryResult>> {
    request.validate()?;
    if request.content.trim().chars().count() < MIN_CONTENT_CHARS {
        return Err(ApiError::bad_request("İçerik çok kısa, özetleme için en az 5 karakter gerekli"));
    }

    let service = state
        .annotation_service()
        .await
        .map_err(|e| ApiError::internal(format!("AI servisi başlatılamadı: {}", e)))?;

    debug!("✨ Summarizing {} chars for {}", request.content.len(), user.uid);
    let annotation = tokio::time::timeout(state.timeouts.annotation, service.summarize(&request.content))
        .await
        .map_err(|_| ApiError::timeout("AI özetleme işlemi zaman aşımına uğradı"))?;
    Ok(Json(annotation.into_value()))
}

pub async fn extract_todos(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<AnnotationRequest>,
) -> ApiResult<Json<TodoResult>> {
    request.validate()?;
    if request.content.trim().chars().count() < MIN_CONTENT_CHARS {
        return Err(ApiError::bad_request(
            "İçerik çok kısa, yapılacak iş algılama için en az 5 karakter gerekli",
        ));
    }

    let service = state
        .annotation_service()
        .await
        .map_err(|e| ApiError::internal(format!("AI servisi başlatılamadı: {}", e)))?;

    debug!("✨ Extracting todos from {} chars for {}", request.content.len(), user.uid);
    let annotation = tokio::time::timeout(state.timeouts.annotation, service.extract_todos(&request.content))
        .await
        .map_err(|_| ApiError::timeout("AI yapılacak iş algılama işlemi zaman aşımına uğradı"))?;
    Ok(Json(annotation.into_value()))
}
