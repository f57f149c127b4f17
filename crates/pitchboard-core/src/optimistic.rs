//! Client-side optimistic reaction state.
//!
//! A toggle is applied to the local panel before the durable write completes;
//! if the server rejects it the panel must return to exactly the state it
//! showed before the attempt. Only one attempt per panel may be in flight.

use pitchboard_types::models::ReactionKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Pending,
    Committed,
    RolledBack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Snapshot {
    likes: u64,
    dislikes: u64,
    user_reaction: Option<ReactionKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimisticError {
    /// A previous toggle on this panel has not been committed or rolled back.
    AttemptInFlight,
    /// `commit`/`rollback` called with no pending attempt.
    NoPendingAttempt,
}

/// Like/dislike counters plus the viewer's own reaction, as rendered for a
/// single pitch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionPanel {
    pub likes: u64,
    pub dislikes: u64,
    pub user_reaction: Option<ReactionKind>,
    pending: Option<Snapshot>,
    last_attempt: Option<AttemptState>,
}

impl ReactionPanel {
    pub fn new(likes: u64, dislikes: u64, user_reaction: Option<ReactionKind>) -> Self {
        Self {
            likes,
            dislikes,
            user_reaction,
            pending: None,
            last_attempt: None,
        }
    }

    pub fn last_attempt(&self) -> Option<AttemptState> {
        self.last_attempt
    }

    /// Apply the toggle optimistically and snapshot the prior state. The
    /// attempt stays `Pending` until `commit` or `rollback` resolves it.
    pub fn begin_toggle(&mut self, kind: ReactionKind) -> Result<(), OptimisticError> {
        if self.pending.is_some() {
            return Err(OptimisticError::AttemptInFlight);
        }

        self.pending = Some(Snapshot {
            likes: self.likes,
            dislikes: self.dislikes,
            user_reaction: self.user_reaction,
        });
        self.last_attempt = Some(AttemptState::Pending);

        match self.user_reaction {
            Some(current) if current == kind => {
                // Un-react.
                self.user_reaction = None;
                self.dec(kind);
            }
            Some(_) => {
                // Switch sides.
                self.dec(kind.other());
                self.inc(kind);
                self.user_reaction = Some(kind);
            }
            None => {
                self.inc(kind);
                self.user_reaction = Some(kind);
            }
        }

        Ok(())
    }

    /// The durable write succeeded; the optimistic state becomes the truth.
    pub fn commit(&mut self) -> Result<(), OptimisticError> {
        self.pending.take().ok_or(OptimisticError::NoPendingAttempt)?;
        self.last_attempt = Some(AttemptState::Committed);
        Ok(())
    }

    /// The durable write failed; restore the snapshot exactly.
    pub fn rollback(&mut self) -> Result<(), OptimisticError> {
        let snap = self.pending.take().ok_or(OptimisticError::NoPendingAttempt)?;
        self.likes = snap.likes;
        self.dislikes = snap.dislikes;
        self.user_reaction = snap.user_reaction;
        self.last_attempt = Some(AttemptState::RolledBack);
        Ok(())
    }

    fn inc(&mut self, kind: ReactionKind) {
        match kind {
            ReactionKind::Like => self.likes += 1,
            ReactionKind::Dislike => self.dislikes += 1,
        }
    }

    fn dec(&mut self, kind: ReactionKind) {
        match kind {
            ReactionKind::Like => self.likes = self.likes.saturating_sub(1),
            ReactionKind::Dislike => self.dislikes = self.dislikes.saturating_sub(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ReactionKind::{Dislike, Like};

    #[test]
    fn double_toggle_nets_to_zero() {
        let mut panel = ReactionPanel::new(3, 1, None);

        panel.begin_toggle(Like).unwrap();
        panel.commit().unwrap();
        assert_eq!(panel.likes, 4);
        assert_eq!(panel.user_reaction, Some(Like));

        panel.begin_toggle(Like).unwrap();
        panel.commit().unwrap();
        assert_eq!(panel.likes, 3);
        assert_eq!(panel.dislikes, 1);
        assert_eq!(panel.user_reaction, None);
    }

    #[test]
    fn switching_sides_moves_one_count_each_way() {
        let mut panel = ReactionPanel::new(5, 2, Some(Like));

        panel.begin_toggle(Dislike).unwrap();
        panel.commit().unwrap();
        assert_eq!(panel.likes, 4);
        assert_eq!(panel.dislikes, 3);
        assert_eq!(panel.user_reaction, Some(Dislike));
    }

    #[test]
    fn rollback_restores_the_snapshot_exactly() {
        let mut panel = ReactionPanel::new(5, 2, Some(Like));
        let before = panel.clone();

        panel.begin_toggle(Dislike).unwrap();
        assert_ne!(panel.likes, before.likes);

        panel.rollback().unwrap();
        assert_eq!(panel.likes, 5);
        assert_eq!(panel.dislikes, 2);
        assert_eq!(panel.user_reaction, Some(Like));
        assert_eq!(panel.last_attempt(), Some(AttemptState::RolledBack));
    }

    #[test]
    fn second_attempt_while_pending_is_rejected() {
        let mut panel = ReactionPanel::new(0, 0, None);

        panel.begin_toggle(Like).unwrap();
        assert_eq!(panel.begin_toggle(Dislike), Err(OptimisticError::AttemptInFlight));

        // State still reflects only the first attempt.
        assert_eq!(panel.likes, 1);
        assert_eq!(panel.dislikes, 0);
    }

    #[test]
    fn commit_without_attempt_is_an_error() {
        let mut panel = ReactionPanel::new(0, 0, None);
        assert_eq!(panel.commit(), Err(OptimisticError::NoPendingAttempt));
        assert_eq!(panel.rollback(), Err(OptimisticError::NoPendingAttempt));
    }
}
