use axum::{
    Extension, Json,
    extract::{Path, State},
};
use uuid::Uuid;

use pitchboard_types::api::{ActionResponse, Claims, ReactionState, ToggleReactionRequest};
use pitchboard_types::error::ActionError;
use pitchboard_types::models::ReactionKind;

use crate::auth::AppState;
use crate::error::ApiResult;
use crate::identity::{self, Identity};
use crate::pitches::run_store;

pub async fn toggle_reaction(
    State(state): State<AppState>,
    Path(pitch_id): Path<String>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ToggleReactionRequest>,
) -> ApiResult<ReactionState> {
    let identity = identity::resolve_identity(&state, &claims).await;
    ApiResult(do_toggle_reaction(&state, Some(&identity), &pitch_id, req.kind).await)
}

/// One logical transition of the per-(identity, pitch) reaction state:
/// none -> kind, kind -> none, other -> kind. The client applies the delta
/// optimistically and rolls back if this reports failure; racing toggles are
/// last-write-wins at the store.
pub async fn do_toggle_reaction(
    state: &AppState,
    identity: Option<&Identity>,
    pitch_id: &str,
    kind: ReactionKind,
) -> Result<ActionResponse<ReactionState>, ActionError> {
    let identity = identity.ok_or(ActionError::NotAuthenticated)?;
    let author_id = identity.require_author()?.to_string();

    let reaction_id = Uuid::new_v4().to_string();
    let db = state.clone();
    let row_pitch = pitch_id.to_string();
    let resulting = run_store(move || {
        if db.db.get_pitch_owner(&row_pitch)?.is_none() {
            return Ok(None);
        }
        db.db
            .toggle_reaction(&reaction_id, &row_pitch, &author_id, kind)
            .map(Some)
    })
    .await?;

    match resulting {
        None => Err(ActionError::NotFound("Pitch not found".into())),
        Some(user_reaction) => Ok(ActionResponse::success(ReactionState { user_reaction })),
    }
}
