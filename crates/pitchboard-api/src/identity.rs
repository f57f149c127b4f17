//! Per-request identity resolution.
//!
//! Identity is resolved once per request and threaded explicitly through
//! every mutation call; no handler reaches for ambient session state.

use tracing::{error, warn};

use pitchboard_types::api::{CallbackProfile, Claims};
use pitchboard_types::error::ActionError;

use crate::auth::AppState;

/// The acting identity for one request. `author_id` may be absent when
/// identity recovery failed at sign-in; operations decide per their own
/// rules how restrictive to be about that.
#[derive(Debug, Clone)]
pub struct Identity {
    pub author_id: Option<String>,
    pub email: Option<String>,
}

impl Identity {
    /// Author id for operations that must attach one (comments, reactions,
    /// bulk delete).
    pub fn require_author(&self) -> Result<&str, ActionError> {
        self.author_id
            .as_deref()
            .ok_or(ActionError::NotAuthenticated)
    }
}

/// Map an external OAuth profile to a stable internal author, creating it if
/// absent, and mirror it into the profile store. Soft-fails to `None`; a
/// sign-in is never blocked by identity trouble.
pub async fn resolve_or_create_author(state: &AppState, profile: &CallbackProfile) -> Option<String> {
    let Some(provider_id) = profile.provider_id.clone() else {
        warn!("sign-in callback carried no provider id; proceeding without author");
        return None;
    };

    let db = state.clone();
    let p = ProfileFields::from(profile);
    let pid = provider_id.clone();

    let author_id = tokio::task::spawn_blocking(move || -> anyhow::Result<String> {
        let author_id = match db.db.get_author_by_external_id(&pid)? {
            Some(existing) => existing.id,
            None => {
                // Deterministic id so concurrent first sign-ins cannot create
                // two authors for the same external identity.
                let id = format!("author-{pid}");
                db.db.create_author_if_absent(
                    &id, &pid, &p.name, &p.username, &p.email, &p.image, &p.bio,
                )?;
                id
            }
        };

        // Best-effort mirror for login auditing; never blocks sign-in.
        if let Err(e) = db
            .mirror
            .record_login(&pid, &p.name, &p.email, &p.username, &p.image, &p.bio)
        {
            error!("profile mirror update failed for {}: {}", pid, e);
        }

        Ok(author_id)
    })
    .await;

    match author_id {
        Ok(Ok(id)) => Some(id),
        Ok(Err(e)) => {
            error!("failed to resolve/create author for {}: {}", provider_id, e);
            None
        }
        Err(e) => {
            error!("spawn_blocking join error during identity resolution: {}", e);
            None
        }
    }
}

/// Build the request identity from validated claims. When the token carries
/// no author id, a single fallback lookup by email is attempted.
pub async fn resolve_identity(state: &AppState, claims: &Claims) -> Identity {
    let mut author_id = claims.sub.clone();

    if author_id.is_none() {
        if let Some(email) = claims.email.clone() {
            let db = state.clone();
            match tokio::task::spawn_blocking(move || db.db.get_author_id_by_email(&email)).await {
                Ok(Ok(found)) => author_id = found,
                Ok(Err(e)) => error!("identity fallback lookup by email failed: {}", e),
                Err(e) => error!("spawn_blocking join error during identity fallback: {}", e),
            }
        }
    }

    Identity {
        author_id,
        email: claims.email.clone(),
    }
}

struct ProfileFields {
    name: String,
    username: String,
    email: String,
    image: String,
    bio: String,
}

impl From<&CallbackProfile> for ProfileFields {
    fn from(p: &CallbackProfile) -> Self {
        let name = p.name.clone().unwrap_or_default();
        let username = p
            .login
            .clone()
            .unwrap_or_else(|| name.split_whitespace().collect::<Vec<_>>().join("-").to_lowercase());
        Self {
            name,
            username,
            email: p.email.clone().unwrap_or_default(),
            image: p.avatar_url.clone().unwrap_or_default(),
            bio: p.bio.clone().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::test_state;

    fn claims(sub: Option<&str>, email: Option<&str>) -> Claims {
        Claims {
            sub: sub.map(str::to_string),
            email: email.map(str::to_string),
            name: "Ada".into(),
            exp: 0,
        }
    }

    #[tokio::test]
    async fn fallback_by_email_recovers_the_author_id() {
        let state = test_state();
        state
            .db
            .create_author_if_absent("author-42", "42", "Ada", "ada", "ada@example.com", "", "")
            .unwrap();

        let identity = resolve_identity(&state, &claims(None, Some("ada@example.com"))).await;
        assert_eq!(identity.author_id.as_deref(), Some("author-42"));
    }

    #[tokio::test]
    async fn unknown_email_leaves_identity_unresolved() {
        let state = test_state();
        let identity = resolve_identity(&state, &claims(None, Some("ghost@example.com"))).await;
        assert!(identity.author_id.is_none());
        assert!(identity.require_author().is_err());
    }

    #[tokio::test]
    async fn token_author_id_wins_over_fallback() {
        let state = test_state();
        let identity =
            resolve_identity(&state, &claims(Some("author-7"), Some("ada@example.com"))).await;
        assert_eq!(identity.author_id.as_deref(), Some("author-7"));
    }

    #[tokio::test]
    async fn username_falls_back_to_dashed_name() {
        let state = test_state();
        let profile = CallbackProfile {
            provider_id: Some("99".into()),
            name: Some("Grace Brewster Hopper".into()),
            email: None,
            avatar_url: None,
            bio: None,
            login: None,
        };

        resolve_or_create_author(&state, &profile).await.unwrap();
        let author = state.db.get_author_by_external_id("99").unwrap().unwrap();
        assert_eq!(author.username, "grace-brewster-hopper");
    }
}
