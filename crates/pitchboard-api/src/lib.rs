pub mod auth;
pub mod comments;
pub mod enhance;
pub mod error;
pub mod identity;
pub mod middleware;
pub mod pitches;
pub mod reactions;
pub mod revalidate;
pub mod users;
