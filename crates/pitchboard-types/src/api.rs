use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ActionError;
use crate::models::{Profile, ReactionKind};

// -- JWT Claims --

/// JWT claims shared between the REST middleware and the auth handlers.
/// `sub` is the resolved author id; it stays `None` when identity recovery
/// failed during sign-in, in which case `email` allows a fallback lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Option<String>,
    pub email: Option<String>,
    pub name: String,
    pub exp: usize,
}

// -- Tagged action envelope --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionStatus {
    Success,
    Error,
}

/// Every mutation entry point answers with this envelope; faults are carried
/// in `error`, never propagated past the boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse<T> {
    pub status: ActionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl<T> ActionResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: ActionStatus::Success,
            data: Some(data),
            error: String::new(),
            warning: None,
        }
    }

    pub fn success_with_warning(data: T, warning: impl Into<String>) -> Self {
        Self {
            warning: Some(warning.into()),
            ..Self::success(data)
        }
    }

    pub fn error(err: &ActionError) -> Self {
        Self {
            status: ActionStatus::Error,
            data: None,
            error: err.to_string(),
            warning: None,
        }
    }
}

// -- Auth --

/// Profile delivered by the OAuth provider after a completed sign-in.
/// Everything except `provider_id` is optional; a missing `provider_id`
/// downgrades identity resolution to a no-op rather than failing sign-in.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackProfile {
    pub provider_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub login: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthData {
    pub token: String,
    pub author_id: Option<String>,
}

// -- Pitches --

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PitchInput {
    pub title: String,
    pub description: String,
    pub category: String,
    /// Image URL; named `link` to match the submission form field.
    pub link: String,
    /// Markdown pitch body.
    pub pitch: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorCard {
    pub id: String,
    pub name: String,
    pub username: String,
    pub image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PitchCard {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorCard>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PitchDetail {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub image: String,
    pub slug: String,
    pub pitch: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorCard>,
    pub comments: Vec<CommentView>,
    pub likes: usize,
    pub dislikes: usize,
    pub user_reaction: Option<ReactionKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingPage {
    pub items: Vec<PitchCard>,
    pub page: u32,
    pub total_count: usize,
    pub total_pages: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedPitch {
    pub id: String,
    pub slug: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeletedPitches {
    pub deleted_count: usize,
}

// -- Comments --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddCommentRequest {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
    pub id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author: AuthorCard,
}

// -- Reactions --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToggleReactionRequest {
    #[serde(rename = "type")]
    pub kind: ReactionKind,
}

/// Durable reaction state after a toggle; `None` means un-reacted.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReactionState {
    pub user_reaction: Option<ReactionKind>,
}

// -- AI enhancement --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnhanceAction {
    Rewrite,
    Improve,
    Expand,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnhanceRequest {
    pub title: String,
    pub description: String,
    pub pitch: String,
    pub action: EnhanceAction,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EnhancedPitch {
    pub enhanced_pitch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

// -- User stats (mirror store) --

#[derive(Debug, Serialize, Deserialize)]
pub struct UserStats {
    pub total_users: u64,
    pub users_today: u64,
    pub users_this_week: u64,
    pub users_this_month: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserStatsData {
    pub stats: UserStats,
    pub recent_users: Vec<Profile>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserList {
    pub count: usize,
    pub data: Vec<Profile>,
}
