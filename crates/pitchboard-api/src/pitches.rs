use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::HeaderMap,
};
use futures_util::future::join_all;
use serde::Deserialize;
use tracing::{error, warn};
use uuid::Uuid;

use pitchboard_core::listing::compose_listing;
use pitchboard_core::samples;
use pitchboard_core::slug::slugify;
use pitchboard_db::models::{CommentRow, PitchRow, parse_timestamp};
use pitchboard_types::api::{
    ActionResponse, AuthorCard, Claims, CommentView, CreatedPitch, DeletedPitches, ListingPage,
    PitchCard, PitchDetail, PitchInput,
};
use pitchboard_types::error::ActionError;

use crate::auth::AppState;
use crate::error::ApiResult;
use crate::identity::{self, Identity};
use crate::middleware::optional_claims;
use crate::revalidate::CacheTag;

// -- Handlers --

pub async fn create_pitch(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<PitchInput>,
) -> ApiResult<CreatedPitch> {
    let identity = identity::resolve_identity(&state, &claims).await;
    ApiResult(do_create_pitch(&state, Some(&identity), input).await)
}

pub async fn update_pitch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<PitchInput>,
) -> ApiResult<PitchDetail> {
    let identity = identity::resolve_identity(&state, &claims).await;
    ApiResult(do_update_pitch(&state, Some(&identity), &id, input).await)
}

pub async fn delete_pitch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<()> {
    let identity = identity::resolve_identity(&state, &claims).await;
    ApiResult(do_delete_pitch(&state, Some(&identity), &id).await)
}

pub async fn delete_all_owned(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<DeletedPitches> {
    let identity = identity::resolve_identity(&state, &claims).await;
    ApiResult(do_delete_all_owned(&state, Some(&identity)).await)
}

/// Fresh single-pitch read. Always hits the durable store, never the listing
/// cache: callers re-read immediately after mutating and must see current
/// state. A valid bearer token personalizes `user_reaction`.
pub async fn get_pitch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<PitchDetail> {
    let viewer = match optional_claims(&headers) {
        Some(claims) => identity::resolve_identity(&state, &claims).await.author_id,
        None => None,
    };

    ApiResult(
        fetch_pitch_detail(&state, &id, viewer.as_deref())
            .await
            .map(ActionResponse::success),
    )
}

#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    12
}

pub async fn list_pitches(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> ApiResult<ListingPage> {
    let page_size = query.page_size.clamp(1, 48);
    ApiResult(
        do_list_pitches(&state, query.page, page_size)
            .await
            .map(ActionResponse::success),
    )
}

// -- Operations --

pub async fn do_create_pitch(
    state: &AppState,
    identity: Option<&Identity>,
    input: PitchInput,
) -> Result<ActionResponse<CreatedPitch>, ActionError> {
    let identity = identity.ok_or(ActionError::NotAuthenticated)?;
    ensure_write_credential(state)?;
    validate_input(&input)?;

    let id = Uuid::new_v4().to_string();
    let slug = slugify(input.title.trim());
    let created_at = chrono::Utc::now().to_rfc3339();
    let author_id = identity.author_id.clone();

    let db = state.clone();
    let row_id = id.clone();
    let row_slug = slug.clone();
    run_store(move || {
        db.db.insert_pitch(
            &row_id,
            input.title.trim(),
            input.description.trim(),
            input.category.trim(),
            input.link.trim(),
            &row_slug,
            &input.pitch,
            author_id.as_deref(),
            &created_at,
        )
    })
    .await?;

    state.revalidator.invalidate(CacheTag::Home);
    state.revalidator.invalidate(CacheTag::PitchList);

    let created = CreatedPitch { id, slug };
    if identity.author_id.is_none() {
        // Degraded-but-successful write: the pitch exists, just ownerless.
        Ok(ActionResponse::success_with_warning(
            created,
            "Created without author reference",
        ))
    } else {
        Ok(ActionResponse::success(created))
    }
}

pub async fn do_update_pitch(
    state: &AppState,
    identity: Option<&Identity>,
    id: &str,
    input: PitchInput,
) -> Result<ActionResponse<PitchDetail>, ActionError> {
    let identity = identity.ok_or(ActionError::NotAuthenticated)?;
    ensure_write_credential(state)?;
    validate_input(&input)?;

    check_ownership(state, identity, id, "edit").await?;

    let slug = slugify(input.title.trim());
    let db = state.clone();
    let row_id = id.to_string();
    let row_slug = slug.clone();
    run_store(move || {
        db.db.update_pitch(
            &row_id,
            input.title.trim(),
            input.description.trim(),
            input.category.trim(),
            input.link.trim(),
            &row_slug,
            &input.pitch,
        )
    })
    .await?;

    state.revalidator.invalidate(CacheTag::Pitch(id));
    state.revalidator.invalidate(CacheTag::Home);
    state.revalidator.invalidate(CacheTag::PitchList);

    let detail = fetch_pitch_detail(state, id, identity.author_id.as_deref()).await?;
    Ok(ActionResponse::success(detail))
}

pub async fn do_delete_pitch(
    state: &AppState,
    identity: Option<&Identity>,
    id: &str,
) -> Result<ActionResponse<()>, ActionError> {
    let identity = identity.ok_or(ActionError::NotAuthenticated)?;
    ensure_write_credential(state)?;

    check_ownership(state, identity, id, "delete").await?;

    let db = state.clone();
    let row_id = id.to_string();
    run_store(move || db.db.delete_pitch(&row_id)).await?;

    state.revalidator.invalidate(CacheTag::Home);
    state.revalidator.invalidate(CacheTag::PitchList);

    Ok(ActionResponse::success(()))
}

/// Delete every pitch owned by the acting identity. Deletions fan out as
/// independent calls and are individually idempotent; a mid-batch failure
/// leaves earlier deletions in place.
pub async fn do_delete_all_owned(
    state: &AppState,
    identity: Option<&Identity>,
) -> Result<ActionResponse<DeletedPitches>, ActionError> {
    let identity = identity.ok_or(ActionError::NotAuthenticated)?;
    ensure_write_credential(state)?;
    let author_id = identity.require_author()?.to_string();

    let db = state.clone();
    let ids = run_store(move || db.db.pitch_ids_by_author(&author_id)).await?;

    if ids.is_empty() {
        // Quirk preserved from the original behavior: an empty result is
        // reported through the error channel, not as a zero-count success.
        return Err(ActionError::NotFound("No pitches found to delete".into()));
    }

    let tasks = ids.into_iter().map(|pitch_id| {
        let db = state.clone();
        tokio::task::spawn_blocking(move || db.db.delete_pitch(&pitch_id))
    });

    let mut deleted_count = 0usize;
    let mut first_failure: Option<String> = None;
    for outcome in join_all(tasks).await {
        match outcome {
            Ok(Ok(true)) => deleted_count += 1,
            Ok(Ok(false)) => {} // already gone; retries are safe
            Ok(Err(e)) => {
                warn!("bulk delete: pitch deletion failed: {}", e);
                first_failure.get_or_insert_with(|| e.to_string());
            }
            Err(e) => {
                error!("bulk delete: spawn_blocking join error: {}", e);
                first_failure.get_or_insert_with(|| e.to_string());
            }
        }
    }

    state.revalidator.invalidate(CacheTag::Home);
    state.revalidator.invalidate(CacheTag::PitchList);

    if deleted_count == 0 {
        if let Some(msg) = first_failure {
            return Err(ActionError::OperationFailed(msg));
        }
    }

    Ok(ActionResponse::success(DeletedPitches { deleted_count }))
}

pub async fn do_list_pitches(
    state: &AppState,
    page: u32,
    page_size: u32,
) -> Result<ListingPage, ActionError> {
    let generation = state.revalidator.generation(CacheTag::PitchList);
    if let Some(cached) = state.listing_cache.get(generation, page, page_size) {
        return Ok(cached);
    }

    let db = state.clone();
    let rows = run_store(move || db.db.list_pitches()).await?;
    let persisted = rows.into_iter().map(card_from_row).collect();

    let listing = compose_listing(persisted, samples::demo_cards(), page, page_size);
    state
        .listing_cache
        .put(generation, page, page_size, listing.clone());
    Ok(listing)
}

pub(crate) async fn fetch_pitch_detail(
    state: &AppState,
    id: &str,
    viewer: Option<&str>,
) -> Result<PitchDetail, ActionError> {
    let db = state.clone();
    let pitch_id = id.to_string();
    let viewer = viewer.map(str::to_string);

    let (row, comments, counts, user_reaction) = run_store(move || {
        let Some(row) = db.db.get_pitch(&pitch_id)? else {
            return Ok(None);
        };
        let comments = db.db.get_comments(&pitch_id)?;
        let counts = db.db.reaction_counts(&pitch_id)?;
        let user_reaction = match viewer.as_deref() {
            Some(author_id) => db.db.user_reaction(&pitch_id, author_id)?,
            None => None,
        };
        Ok(Some((row, comments, counts, user_reaction)))
    })
    .await?
    .ok_or_else(|| ActionError::NotFound("Pitch not found".into()))?;

    Ok(detail_from_rows(row, comments, counts, user_reaction))
}

// -- Internals --

/// The reconciled ownership rule, applied uniformly to update and delete:
/// an owned pitch is only mutable by its recorded author; an ownerless pitch
/// is mutable by any authenticated identity.
async fn check_ownership(
    state: &AppState,
    identity: &Identity,
    id: &str,
    verb: &str,
) -> Result<(), ActionError> {
    let db = state.clone();
    let pitch_id = id.to_string();
    let owner = run_store(move || db.db.get_pitch_owner(&pitch_id))
        .await?
        .ok_or_else(|| ActionError::NotFound("Pitch not found".into()))?;

    if let Some(owner_id) = owner.author_id {
        if identity.author_id.as_deref() != Some(owner_id.as_str()) {
            return Err(ActionError::PermissionDenied(format!(
                "You don't have permission to {verb} this pitch"
            )));
        }
    }

    Ok(())
}

fn ensure_write_credential(state: &AppState) -> Result<(), ActionError> {
    if state.config.write_token.is_none() {
        return Err(ActionError::ConfigurationError(
            "Content store write token not configured on the server".into(),
        ));
    }
    Ok(())
}

fn validate_input(input: &PitchInput) -> Result<(), ActionError> {
    let required = [
        (input.title.trim(), "Title is required"),
        (input.description.trim(), "Description is required"),
        (input.category.trim(), "Category is required"),
        (input.pitch.trim(), "Pitch body is required"),
    ];
    for (value, message) in required {
        if value.is_empty() {
            return Err(ActionError::ValidationError(message.into()));
        }
    }
    Ok(())
}

/// Run a blocking store call off the async runtime, capturing every fault as
/// an `OperationFailed` at the boundary.
pub(crate) async fn run_store<T, F>(f: F) -> Result<T, ActionError>
where
    T: Send + 'static,
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(ActionError::from_store(e)),
        Err(e) => {
            error!("spawn_blocking join error: {}", e);
            Err(ActionError::OperationFailed("internal task failure".into()))
        }
    }
}

fn created_at_or_warn(raw: &str, id: &str) -> chrono::DateTime<chrono::Utc> {
    parse_timestamp(raw).unwrap_or_else(|| {
        warn!("Corrupt created_at '{}' on '{}'", raw, id);
        chrono::DateTime::default()
    })
}

fn author_card_from_row(row: &PitchRow) -> Option<AuthorCard> {
    row.author_id.as_ref().map(|author_id| AuthorCard {
        id: author_id.clone(),
        name: row.author_name.clone().unwrap_or_default(),
        username: row.author_username.clone().unwrap_or_default(),
        image: row.author_image.clone().unwrap_or_default(),
    })
}

fn card_from_row(row: PitchRow) -> PitchCard {
    let author = author_card_from_row(&row);
    PitchCard {
        created_at: created_at_or_warn(&row.created_at, &row.id),
        id: row.id,
        title: row.title,
        description: row.description,
        category: row.category,
        image: row.image,
        author,
    }
}

fn detail_from_rows(
    row: PitchRow,
    comments: Vec<CommentRow>,
    (likes, dislikes): (u64, u64),
    user_reaction: Option<pitchboard_types::models::ReactionKind>,
) -> PitchDetail {
    let author = author_card_from_row(&row);
    let comments = comments
        .into_iter()
        .map(|c| CommentView {
            created_at: created_at_or_warn(&c.created_at, &c.id),
            id: c.id,
            content: c.content,
            author: AuthorCard {
                id: c.author_id,
                name: c.author_name,
                username: c.author_username,
                image: c.author_image,
            },
        })
        .collect();

    PitchDetail {
        created_at: created_at_or_warn(&row.created_at, &row.id),
        id: row.id,
        title: row.title,
        description: row.description,
        category: row.category,
        image: row.image,
        slug: row.slug,
        pitch: row.body,
        author,
        comments,
        likes: likes as usize,
        dislikes: dislikes as usize,
        user_reaction,
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;
    use crate::auth::AppState;

    pub fn ident(author_id: &str) -> Identity {
        Identity {
            author_id: Some(author_id.to_string()),
            email: Some(format!("{author_id}@example.com")),
        }
    }

    pub fn anonymous_ident() -> Identity {
        Identity {
            author_id: None,
            email: None,
        }
    }

    pub fn seed_author(state: &AppState, author_id: &str) {
        state
            .db
            .create_author_if_absent(
                author_id,
                &format!("ext-{author_id}"),
                author_id,
                author_id,
                &format!("{author_id}@example.com"),
                "",
                "",
            )
            .unwrap();
    }

    pub fn pitch_input(title: &str) -> PitchInput {
        PitchInput {
            title: title.to_string(),
            description: "A test pitch".to_string(),
            category: "Test".to_string(),
            link: "https://example.com/img.png".to_string(),
            pitch: "# Body\nDetails.".to_string(),
        }
    }

    pub async fn create_owned(state: &AppState, author_id: &str, title: &str) -> String {
        seed_author(state, author_id);
        let resp = do_create_pitch(state, Some(&ident(author_id)), pitch_input(title))
            .await
            .unwrap();
        resp.data.unwrap().id
    }
}

#[cfg(test)]
mod tests {
    use super::testutil::*;
    use super::*;
    use crate::auth::test_state;
    use pitchboard_types::api::ActionStatus;

    #[tokio::test]
    async fn create_slugifies_and_records_the_author() {
        let state = test_state();
        let id = create_owned(&state, "u1", "Foo Bar").await;

        let detail = fetch_pitch_detail(&state, &id, None).await.unwrap();
        assert_eq!(detail.slug, "foo-bar");
        assert_eq!(detail.author.unwrap().id, "u1");
    }

    #[tokio::test]
    async fn unauthenticated_create_is_rejected() {
        let state = test_state();
        let err = do_create_pitch(&state, None, pitch_input("Foo"))
            .await
            .unwrap_err();
        assert_eq!(err, ActionError::NotAuthenticated);
    }

    #[tokio::test]
    async fn unresolved_identity_creates_ownerless_with_warning() {
        let state = test_state();
        let resp = do_create_pitch(&state, Some(&anonymous_ident()), pitch_input("Orphan"))
            .await
            .unwrap();

        assert_eq!(resp.status, ActionStatus::Success);
        assert_eq!(resp.warning.as_deref(), Some("Created without author reference"));

        let id = resp.data.unwrap().id;
        let detail = fetch_pitch_detail(&state, &id, None).await.unwrap();
        assert!(detail.author.is_none());
    }

    #[tokio::test]
    async fn missing_write_credential_is_a_configuration_error() {
        let state = test_state();
        let mut inner = std::sync::Arc::into_inner(state).unwrap();
        inner.config.write_token = None;
        let state = std::sync::Arc::new(inner);

        seed_author(&state, "u1");
        let err = do_create_pitch(&state, Some(&ident("u1")), pitch_input("Foo"))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::ConfigurationError(_)));
    }

    #[tokio::test]
    async fn blank_title_fails_validation() {
        let state = test_state();
        seed_author(&state, "u1");
        let err = do_create_pitch(&state, Some(&ident("u1")), pitch_input("   "))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::ValidationError(_)));
    }

    #[tokio::test]
    async fn update_by_non_author_is_denied_and_leaves_state_unchanged() {
        let state = test_state();
        let id = create_owned(&state, "u1", "Original Title").await;
        seed_author(&state, "u2");

        let err = do_update_pitch(&state, Some(&ident("u2")), &id, pitch_input("Hijacked"))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::PermissionDenied(_)));

        let detail = fetch_pitch_detail(&state, &id, None).await.unwrap();
        assert_eq!(detail.title, "Original Title");
    }

    #[tokio::test]
    async fn owner_update_rewrites_fields_and_slug() {
        let state = test_state();
        let id = create_owned(&state, "u1", "Old Name").await;

        let resp = do_update_pitch(&state, Some(&ident("u1")), &id, pitch_input("New Name"))
            .await
            .unwrap();
        let detail = resp.data.unwrap();
        assert_eq!(detail.title, "New Name");
        assert_eq!(detail.slug, "new-name");
    }

    #[tokio::test]
    async fn delete_scenario_denied_then_owner_deletes_then_not_found() {
        let state = test_state();
        let id = create_owned(&state, "u1", "Foo Bar").await;
        seed_author(&state, "u2");

        let err = do_delete_pitch(&state, Some(&ident("u2")), &id).await.unwrap_err();
        assert!(matches!(err, ActionError::PermissionDenied(_)));

        let resp = do_delete_pitch(&state, Some(&ident("u1")), &id).await.unwrap();
        assert_eq!(resp.status, ActionStatus::Success);

        let err = fetch_pitch_detail(&state, &id, None).await.unwrap_err();
        assert!(matches!(err, ActionError::NotFound(_)));
    }

    #[tokio::test]
    async fn ownerless_pitch_is_mutable_by_any_authenticated_identity() {
        let state = test_state();
        let resp = do_create_pitch(&state, Some(&anonymous_ident()), pitch_input("Orphan"))
            .await
            .unwrap();
        let id = resp.data.unwrap().id;

        seed_author(&state, "u2");
        let resp = do_update_pitch(&state, Some(&ident("u2")), &id, pitch_input("Adopted"))
            .await
            .unwrap();
        assert_eq!(resp.data.unwrap().title, "Adopted");

        let resp = do_delete_pitch(&state, Some(&ident("u2")), &id).await.unwrap();
        assert_eq!(resp.status, ActionStatus::Success);
    }

    #[tokio::test]
    async fn missing_pitch_yields_not_found() {
        let state = test_state();
        seed_author(&state, "u1");
        let err = do_delete_pitch(&state, Some(&ident("u1")), "nope").await.unwrap_err();
        assert!(matches!(err, ActionError::NotFound(_)));
    }

    #[tokio::test]
    async fn bulk_delete_with_nothing_owned_uses_the_error_channel() {
        let state = test_state();
        seed_author(&state, "u1");

        let err = do_delete_all_owned(&state, Some(&ident("u1"))).await.unwrap_err();
        assert_eq!(err, ActionError::NotFound("No pitches found to delete".into()));
    }

    #[tokio::test]
    async fn bulk_delete_removes_only_owned_pitches() {
        let state = test_state();
        let _a = create_owned(&state, "u1", "One").await;
        let _b = create_owned(&state, "u1", "Two").await;
        let other = create_owned(&state, "u2", "Theirs").await;

        let resp = do_delete_all_owned(&state, Some(&ident("u1"))).await.unwrap();
        assert_eq!(resp.data.unwrap().deleted_count, 2);

        // The other author's pitch survives.
        assert!(fetch_pitch_detail(&state, &other, None).await.is_ok());
    }

    #[tokio::test]
    async fn listing_merges_demos_last_and_caches_per_generation() {
        let state = test_state();
        create_owned(&state, "u1", "Real Pitch").await;

        let listing = do_list_pitches(&state, 1, 12).await.unwrap();
        assert_eq!(listing.items[0].title, "Real Pitch");
        assert!(listing.items.len() > 1); // demo entries follow
        assert!(listing.items[1..].iter().all(|c| c.created_at < listing.items[0].created_at));

        // Cached result is reused until a mutation invalidates the tag.
        let again = do_list_pitches(&state, 1, 12).await.unwrap();
        assert_eq!(again.total_count, listing.total_count);

        create_owned(&state, "u1", "Another").await;
        let refreshed = do_list_pitches(&state, 1, 12).await.unwrap();
        assert_eq!(refreshed.total_count, listing.total_count + 1);
    }

    #[tokio::test]
    async fn out_of_range_page_is_empty_success() {
        let state = test_state();
        let listing = do_list_pitches(&state, 99, 12).await.unwrap();
        assert!(listing.items.is_empty());
    }
}
