pub mod listing;
pub mod optimistic;
pub mod prompt;
pub mod samples;
pub mod slug;
