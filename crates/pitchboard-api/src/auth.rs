use std::sync::Arc;

use axum::{Json, extract::State};
use jsonwebtoken::{EncodingKey, Header, encode};

use pitchboard_db::Database;
use pitchboard_db::mirror::MirrorStore;
use pitchboard_types::api::{ActionResponse, AuthData, CallbackProfile, Claims};
use pitchboard_types::error::ActionError;

use crate::error::ApiResult;
use crate::identity;
use crate::revalidate::{ListingCache, Revalidator};

pub type AppState = Arc<AppStateInner>;

pub struct ApiConfig {
    pub jwt_secret: String,
    /// Content-store write credential. Mutations are refused with a
    /// configuration error when it is absent.
    pub write_token: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
}

pub struct AppStateInner {
    pub db: Database,
    pub mirror: MirrorStore,
    pub revalidator: Revalidator,
    pub listing_cache: ListingCache,
    pub http: reqwest::Client,
    pub config: ApiConfig,
}

/// OAuth provider callback intake. Resolves (or lazily creates) the author,
/// mirrors the profile for login auditing, and issues a session token.
///
/// Sign-in never fails on identity-resolution trouble: a missing provider id
/// or a store fault downgrades to a token without an author id, flagged with
/// a warning so the UI can surface it.
pub async fn callback(
    State(state): State<AppState>,
    Json(profile): Json<CallbackProfile>,
) -> ApiResult<AuthData> {
    ApiResult(handle_callback(state, profile).await)
}

async fn handle_callback(
    state: AppState,
    profile: CallbackProfile,
) -> Result<ActionResponse<AuthData>, ActionError> {
    let author_id = identity::resolve_or_create_author(&state, &profile).await;

    let name = profile.name.clone().unwrap_or_default();
    let email = profile.email.clone();

    let token = create_token(&state.config.jwt_secret, author_id.clone(), email, name)
        .map_err(ActionError::from_store)?;

    let data = AuthData {
        token,
        author_id: author_id.clone(),
    };

    if author_id.is_none() {
        Ok(ActionResponse::success_with_warning(
            data,
            "Signed in without a resolved author identity",
        ))
    } else {
        Ok(ActionResponse::success(data))
    }
}

fn create_token(
    secret: &str,
    author_id: Option<String>,
    email: Option<String>,
    name: String,
) -> anyhow::Result<String> {
    let claims = Claims {
        sub: author_id,
        email,
        name,
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    Arc::new(AppStateInner {
        db: Database::open_in_memory().expect("in-memory db"),
        mirror: MirrorStore::open_in_memory().expect("in-memory mirror"),
        revalidator: Revalidator::new(),
        listing_cache: ListingCache::default(),
        http: reqwest::Client::new(),
        config: ApiConfig {
            jwt_secret: "test-secret".into(),
            write_token: Some("test-write-token".into()),
            gemini_api_key: None,
            gemini_model: "gemini-2.0-flash-lite".into(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(provider_id: Option<&str>) -> CallbackProfile {
        CallbackProfile {
            provider_id: provider_id.map(str::to_string),
            name: Some("Ada Lovelace".into()),
            email: Some("ada@example.com".into()),
            avatar_url: Some("https://example.com/ada.png".into()),
            bio: Some("First programmer".into()),
            login: Some("ada".into()),
        }
    }

    #[tokio::test]
    async fn callback_creates_author_and_mirrors_profile() {
        let state = test_state();

        let resp = handle_callback(state.clone(), profile(Some("42"))).await.unwrap();
        let data = resp.data.unwrap();
        assert_eq!(data.author_id.as_deref(), Some("author-42"));
        assert!(resp.warning.is_none());

        let author = state.db.get_author_by_external_id("42").unwrap().unwrap();
        assert_eq!(author.name, "Ada Lovelace");
        assert_eq!(author.username, "ada");

        assert_eq!(state.mirror.count_all().unwrap(), 1);
    }

    #[tokio::test]
    async fn missing_provider_id_is_a_soft_failure() {
        let state = test_state();

        let resp = handle_callback(state.clone(), profile(None)).await.unwrap();
        let data = resp.data.unwrap();
        assert!(data.author_id.is_none());
        assert!(resp.warning.is_some());
        assert!(!data.token.is_empty());

        // Nothing was created anywhere.
        assert_eq!(state.mirror.count_all().unwrap(), 0);
    }

    #[tokio::test]
    async fn repeat_sign_in_does_not_duplicate_the_author() {
        let state = test_state();

        for _ in 0..2 {
            handle_callback(state.clone(), profile(Some("42"))).await.unwrap();
        }

        assert_eq!(state.mirror.count_all().unwrap(), 1);
        let author = state.db.get_author_by_external_id("42").unwrap().unwrap();
        assert_eq!(author.id, "author-42");
    }
}
