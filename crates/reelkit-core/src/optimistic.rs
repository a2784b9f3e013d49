//! Optimistic mutations
//!
//! A mutation is applied to local state before the request is sent and
//! reverted if the request fails.

use crate::api::{ActionOutcome, VideoAction, VideoDetails};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::debug;

/// Local change with an exact inverse
pub trait Mutation<S> {
    fn apply(&self, state: &mut S);
    fn revert(&self, state: &mut S);
}

/// Apply `mutation`, await `request`, revert on failure
pub async fn run_optimistic<S, M, T, Fut>(state: &mut S, mutation: &M, request: Fut) -> Result<T>
where
    M: Mutation<S>,
    Fut: Future<Output = Result<T>>,
{
    mutation.apply(state);
    match request.await {
        Ok(value) => Ok(value),
        Err(e) => {
            debug!(error = %e, "Optimistic mutation rolled back");
            mutation.revert(state);
            Err(e)
        }
    }
}

/// Reaction buttons the user can press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionKind {
    Like,
    Dislike,
    Save,
}

/// Local copy of the reaction flags and counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reactions {
    pub is_liked: bool,
    pub is_disliked: bool,
    pub is_saved: bool,
    pub likes_count: u64,
    pub dislikes_count: u64,
}

impl From<&VideoDetails> for Reactions {
    fn from(details: &VideoDetails) -> Self {
        Self {
            is_liked: details.is_liked,
            is_disliked: details.is_disliked,
            is_saved: details.is_saved,
            likes_count: details.likes_count,
            dislikes_count: details.dislikes_count,
        }
    }
}

impl Reactions {
    /// Fold the server's confirmation into local state
    pub fn confirm(&mut self, action: VideoAction, outcome: &ActionOutcome) {
        match action {
            VideoAction::Like | VideoAction::Unlike => {
                if let Some(flag) = outcome.flag {
                    self.is_liked = flag;
                }
                if let Some(count) = outcome.count {
                    self.likes_count = count;
                }
            }
            VideoAction::Dislike | VideoAction::Undislike => {
                if let Some(flag) = outcome.flag {
                    self.is_disliked = flag;
                }
                if let Some(count) = outcome.count {
                    self.dislikes_count = count;
                }
            }
            VideoAction::Save => {
                if let Some(flag) = outcome.flag {
                    self.is_saved = flag;
                }
            }
            _ => {}
        }
    }
}

/// One reaction toggle and the state it replaced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionChange {
    kind: ReactionKind,
    action: VideoAction,
    before: Reactions,
}

impl ReactionChange {
    /// Change for pressing `kind` given the current state
    pub fn new(kind: ReactionKind, current: &Reactions) -> Self {
        let action = match kind {
            ReactionKind::Like if current.is_liked => VideoAction::Unlike,
            ReactionKind::Like => VideoAction::Like,
            ReactionKind::Dislike if current.is_disliked => VideoAction::Undislike,
            ReactionKind::Dislike => VideoAction::Dislike,
            ReactionKind::Save => VideoAction::Save,
        };
        Self {
            kind,
            action,
            before: current.clone(),
        }
    }

    pub fn kind(&self) -> ReactionKind {
        self.kind
    }

    /// Action to send to the backend
    pub fn action(&self) -> VideoAction {
        self.action
    }
}

impl Mutation<Reactions> for ReactionChange {
    fn apply(&self, state: &mut Reactions) {
        match self.action {
            VideoAction::Like => {
                state.is_liked = true;
                state.likes_count += 1;
                if self.before.is_disliked {
                    state.is_disliked = false;
                    state.dislikes_count = state.dislikes_count.saturating_sub(1);
                }
            }
            VideoAction::Unlike => {
                state.is_liked = false;
                state.likes_count = state.likes_count.saturating_sub(1);
            }
            VideoAction::Dislike => {
                state.is_disliked = true;
                state.dislikes_count += 1;
                if self.before.is_liked {
                    state.is_liked = false;
                    state.likes_count = state.likes_count.saturating_sub(1);
                }
            }
            VideoAction::Undislike => {
                state.is_disliked = false;
                state.dislikes_count = state.dislikes_count.saturating_sub(1);
            }
            VideoAction::Save => state.is_saved = !self.before.is_saved,
            _ => {}
        }
    }

    /// Undoes this change's own effects.
    ///
    /// Effects already superseded by a later change are left alone, so a
    /// failed like never erases a dislike pressed after it.
    fn revert(&self, state: &mut Reactions) {
        match self.action {
            VideoAction::Like => {
                if state.is_liked {
                    state.is_liked = false;
                    state.likes_count = state.likes_count.saturating_sub(1);
                }
                if self.before.is_disliked && !state.is_disliked {
                    state.is_disliked = true;
                    state.dislikes_count += 1;
                }
            }
            VideoAction::Unlike => {
                if !state.is_liked {
                    state.is_liked = true;
                    state.likes_count += 1;
                }
            }
            VideoAction::Dislike => {
                if state.is_disliked {
                    state.is_disliked = false;
                    state.dislikes_count = state.dislikes_count.saturating_sub(1);
                }
                if self.before.is_liked && !state.is_liked {
                    state.is_liked = true;
                    state.likes_count += 1;
                }
            }
            VideoAction::Undislike => {
                if !state.is_disliked {
                    state.is_disliked = true;
                    state.dislikes_count += 1;
                }
            }
            VideoAction::Save => state.is_saved = self.before.is_saved,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn reactions() -> Reactions {
        Reactions {
            is_liked: false,
            is_disliked: true,
            is_saved: false,
            likes_count: 10,
            dislikes_count: 3,
        }
    }

    #[test]
    fn test_like_clears_dislike() {
        let mut state = reactions();
        let change = ReactionChange::new(ReactionKind::Like, &state);
        assert_eq!(change.action(), VideoAction::Like);

        change.apply(&mut state);
        assert!(state.is_liked);
        assert!(!state.is_disliked);
        assert_eq!((state.likes_count, state.dislikes_count), (11, 2));

        change.revert(&mut state);
        assert_eq!(state, reactions());
    }

    #[test]
    fn test_toggle_picks_inverse_action() {
        let mut state = reactions();
        state.is_liked = true;
        state.is_disliked = false;
        assert_eq!(ReactionChange::new(ReactionKind::Like, &state).action(), VideoAction::Unlike);
        assert_eq!(ReactionChange::new(ReactionKind::Dislike, &reactions()).action(), VideoAction::Undislike);
    }

    #[test]
    fn test_revert_leaves_other_changes_alone() {
        let mut state = reactions();
        let like = ReactionChange::new(ReactionKind::Like, &state);
        like.apply(&mut state);
        let save = ReactionChange::new(ReactionKind::Save, &state);
        save.apply(&mut state);

        like.revert(&mut state);
        assert!(state.is_saved);
        assert!(!state.is_liked);
    }

    #[test]
    fn test_failed_like_keeps_later_dislike() {
        let mut state = reactions();
        let like = ReactionChange::new(ReactionKind::Like, &state);
        like.apply(&mut state);
        let dislike = ReactionChange::new(ReactionKind::Dislike, &state);
        assert_eq!(dislike.action(), VideoAction::Dislike);
        dislike.apply(&mut state);

        like.revert(&mut state);
        assert!(state.is_disliked);
        assert!(!state.is_liked);
        assert_eq!((state.likes_count, state.dislikes_count), (10, 3));
    }

    #[test]
    fn test_failed_dislike_keeps_later_like() {
        let mut state = Reactions {
            is_disliked: false,
            ..reactions()
        };
        let dislike = ReactionChange::new(ReactionKind::Dislike, &state);
        dislike.apply(&mut state);
        let like = ReactionChange::new(ReactionKind::Like, &state);
        like.apply(&mut state);

        dislike.revert(&mut state);
        assert!(state.is_liked);
        assert!(!state.is_disliked);
        assert_eq!((state.likes_count, state.dislikes_count), (11, 3));
    }

    #[test]
    fn test_run_optimistic_success_keeps_change() {
        let mut state = reactions();
        let change = ReactionChange::new(ReactionKind::Save, &state);
        let result = tokio_test::block_on(run_optimistic(&mut state, &change, async {
            Ok(ActionOutcome::default())
        }));
        tokio_test::assert_ok!(result);
        assert!(state.is_saved);
    }

    #[test]
    fn test_run_optimistic_failure_rolls_back() {
        let mut state = reactions();
        let change = ReactionChange::new(ReactionKind::Like, &state);
        let request = async { Err(Error::api(500, Some("Try later".into()))) };
        let result: Result<ActionOutcome> =
            tokio_test::block_on(run_optimistic(&mut state, &change, request));
        let err = tokio_test::assert_err!(result);
        assert_eq!(err.user_message(), "Try later");
        assert_eq!(state, reactions());
    }

    #[test]
    fn test_confirm_uses_server_counts() {
        let mut state = reactions();
        state.confirm(
            VideoAction::Like,
            &ActionOutcome {
                flag: Some(true),
                count: Some(42),
                message: None,
            },
        );
        assert!(state.is_liked);
        assert_eq!(state.likes_count, 42);
    }
}
