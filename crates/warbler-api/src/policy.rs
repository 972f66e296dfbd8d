//! Authorization rules.
//!
//! Pure decisions over a resolved session identity and an action. Nothing in
//! here touches the database or the request; callers resolve the identity
//! and look up any owner ids first.

/// The user a request acts as, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Identity(Option<i64>);

impl Identity {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn user(id: i64) -> Self {
        Self(Some(id))
    }

    pub fn user_id(&self) -> Option<i64> {
        self.0
    }

    pub fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }
}

impl From<Option<i64>> for Identity {
    fn from(id: Option<i64>) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ViewProfile,
    ViewMessage,
    ViewTimeline,
    /// Following / followers lists.
    ViewConnections,
    ViewLikes,
    CreateMessage,
    EditMessage { owner_id: i64 },
    DeleteMessage { owner_id: i64 },
    EditProfile { user_id: i64 },
    DeleteAccount { user_id: i64 },
    Follow,
    Unfollow,
    Like,
    Unlike,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("access unauthorized")]
pub struct Denied;

pub fn authorize(identity: Identity, action: Action) -> Result<(), Denied> {
    match action {
        Action::ViewProfile | Action::ViewMessage | Action::ViewTimeline => Ok(()),

        Action::EditMessage { owner_id }
        | Action::DeleteMessage { owner_id }
        | Action::EditProfile { user_id: owner_id }
        | Action::DeleteAccount { user_id: owner_id } => {
            if identity.user_id() == Some(owner_id) {
                Ok(())
            } else {
                Err(Denied)
            }
        }

        Action::ViewConnections
        | Action::ViewLikes
        | Action::CreateMessage
        | Action::Follow
        | Action::Unfollow
        | Action::Like
        | Action::Unlike => {
            if identity.is_authenticated() {
                Ok(())
            } else {
                Err(Denied)
            }
        }
    }
}

/// Authorize and hand back the acting user's id.
pub fn authorize_user(identity: Identity, action: Action) -> Result<i64, Denied> {
    authorize(identity, action)?;
    identity.user_id().ok_or(Denied)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: i64 = 1000;
    const BOB: i64 = 2000;

    #[test]
    fn public_views_always_allowed() {
        for identity in [Identity::anonymous(), Identity::user(ALICE)] {
            assert!(authorize(identity, Action::ViewProfile).is_ok());
            assert!(authorize(identity, Action::ViewMessage).is_ok());
            assert!(authorize(identity, Action::ViewTimeline).is_ok());
        }
    }

    #[test]
    fn authenticated_actions_deny_anonymous() {
        let actions = [
            Action::ViewConnections,
            Action::ViewLikes,
            Action::CreateMessage,
            Action::Follow,
            Action::Unfollow,
            Action::Like,
            Action::Unlike,
        ];
        for action in actions {
            assert_eq!(authorize(Identity::anonymous(), action), Err(Denied), "{action:?}");
            assert_eq!(authorize(Identity::user(BOB), action), Ok(()), "{action:?}");
        }
    }

    #[test]
    fn owner_only_actions() {
        let actions = [
            Action::EditMessage { owner_id: ALICE },
            Action::DeleteMessage { owner_id: ALICE },
            Action::EditProfile { user_id: ALICE },
            Action::DeleteAccount { user_id: ALICE },
        ];
        for action in actions {
            assert_eq!(authorize(Identity::user(ALICE), action), Ok(()));
            assert_eq!(authorize(Identity::user(BOB), action), Err(Denied));
            assert_eq!(authorize(Identity::anonymous(), action), Err(Denied));
        }
    }

    #[test]
    fn authorize_user_returns_actor() {
        assert_eq!(authorize_user(Identity::user(BOB), Action::Like), Ok(BOB));
        assert_eq!(authorize_user(Identity::anonymous(), Action::Like), Err(Denied));
        // Public actions still need someone to act as.
        assert_eq!(authorize_user(Identity::anonymous(), Action::ViewProfile), Err(Denied));
    }
}
