use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Like,
    Dislike,
}

impl ReactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ReactionKind::Like => "like",
            ReactionKind::Dislike => "dislike",
        }
    }

    pub fn other(self) -> ReactionKind {
        match self {
            ReactionKind::Like => ReactionKind::Dislike,
            ReactionKind::Dislike => ReactionKind::Like,
        }
    }
}

/// Best-effort copy of an author kept in the secondary profile store for
/// login auditing. Never authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub external_id: String,
    pub name: String,
    pub email: String,
    pub username: String,
    pub image: String,
    pub bio: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reaction_kind_uses_lowercase_on_the_wire() {
        assert_eq!(serde_json::to_string(&ReactionKind::Like).unwrap(), "\"like\"");
        let kind: ReactionKind = serde_json::from_str("\"dislike\"").unwrap();
        assert_eq!(kind, ReactionKind::Dislike);
    }

    #[test]
    fn other_flips_the_kind() {
        assert_eq!(ReactionKind::Like.other(), ReactionKind::Dislike);
        assert_eq!(ReactionKind::Dislike.other(), ReactionKind::Like);
        assert_eq!(ReactionKind::Like.as_str(), "like");
    }
}
