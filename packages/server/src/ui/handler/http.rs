//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::domain::{MessageRepository as _, UserRepository as _};
use crate::infrastructure::dto::http::{MessagesQuery, UploadResponseDto};
use crate::infrastructure::dto::websocket::{MessageDto, UserDto};
use crate::ui::state::AppState;

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// GET /api/messages - paginated global feed, oldest-first
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<Vec<MessageDto>>, StatusCode> {
    let page = query.page.max(1);
    let offset = (page - 1) * query.limit;

    match state.messages.list(query.limit, offset).await {
        Ok(messages) => Ok(Json(messages.into_iter().map(MessageDto::from).collect())),
        Err(e) => {
            tracing::error!(error = %e, "failed to list messages");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /api/users - currently online users
pub async fn list_online_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserDto>>, StatusCode> {
    match state.users.list_online().await {
        Ok(users) => Ok(Json(users.into_iter().map(UserDto::from).collect())),
        Err(e) => {
            tracing::error!(error = %e, "failed to list online users");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /api/upload - multipart file upload
///
/// Stores the file under the configured upload directory with a
/// UUID-prefixed name and responds with the URL a client passes back in a
/// `send_message` event as `fileUrl`.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponseDto>, StatusCode> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let data = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;

        // Path separators are stripped so the file always lands in upload_dir
        let safe_name: String = filename
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        let stored_name = format!("{}-{}", Uuid::new_v4(), safe_name);
        let path = state.upload_dir.join(&stored_name);

        if let Err(e) = tokio::fs::create_dir_all(&state.upload_dir).await {
            tracing::error!(error = %e, "failed to create upload directory");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
        if let Err(e) = tokio::fs::write(&path, &data).await {
            tracing::error!(error = %e, path = %path.display(), "failed to store upload");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }

        tracing::info!(
            filename = %filename,
            stored = %stored_name,
            bytes = data.len(),
            "file uploaded"
        );

        return Ok(Json(UploadResponseDto {
            filename,
            url: format!("/uploads/{stored_name}"),
        }));
    }

    // No "file" field in the multipart body
    Err(StatusCode::BAD_REQUEST)
}
