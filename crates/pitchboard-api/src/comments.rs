use axum::{
    Extension, Json,
    extract::{Path, State},
};
use uuid::Uuid;

use pitchboard_db::models::parse_timestamp;
use pitchboard_types::api::{ActionResponse, AddCommentRequest, AuthorCard, Claims, CommentView};
use pitchboard_types::error::ActionError;

use crate::auth::AppState;
use crate::error::ApiResult;
use crate::identity::{self, Identity};
use crate::pitches::run_store;

pub async fn add_comment(
    State(state): State<AppState>,
    Path(pitch_id): Path<String>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<AddCommentRequest>,
) -> ApiResult<CommentView> {
    let identity = identity::resolve_identity(&state, &claims).await;
    ApiResult(do_add_comment(&state, Some(&identity), &pitch_id, &req.content).await)
}

/// Append-only: any authenticated identity may comment on any pitch; no
/// ownership check, and no edit or delete path exists.
pub async fn do_add_comment(
    state: &AppState,
    identity: Option<&Identity>,
    pitch_id: &str,
    content: &str,
) -> Result<ActionResponse<CommentView>, ActionError> {
    let identity = identity.ok_or(ActionError::NotAuthenticated)?;
    let author_id = identity.require_author()?.to_string();

    let content = content.trim().to_string();
    if content.is_empty() {
        return Err(ActionError::ValidationError("Comment cannot be empty".into()));
    }

    let id = Uuid::new_v4().to_string();
    let created_at = chrono::Utc::now().to_rfc3339();

    let db = state.clone();
    let row_id = id.clone();
    let row_pitch = pitch_id.to_string();
    let row_content = content.clone();
    let inserted = run_store(move || {
        if db.db.get_pitch_owner(&row_pitch)?.is_none() {
            return Ok(false);
        }
        db.db
            .insert_comment(&row_id, &row_content, &author_id, &row_pitch, &created_at)?;
        Ok(true)
    })
    .await?;

    if !inserted {
        return Err(ActionError::NotFound("Pitch not found".into()));
    }

    // Re-read through the author join so the view carries name and avatar.
    let db = state.clone();
    let row_pitch = pitch_id.to_string();
    let row_id = id.clone();
    let row = run_store(move || {
        Ok(db.db.get_comments(&row_pitch)?.into_iter().find(|c| c.id == row_id))
    })
    .await?
    .ok_or_else(|| ActionError::OperationFailed("Comment was not persisted".into()))?;

    Ok(ActionResponse::success(CommentView {
        created_at: parse_timestamp(&row.created_at).unwrap_or_default(),
        id: row.id,
        content: row.content,
        author: AuthorCard {
            id: row.author_id,
            name: row.author_name,
            username: row.author_username,
            image: row.author_image,
        },
    }))
}
