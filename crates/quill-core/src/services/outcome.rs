use std::time::Duration;

use crate::error::DomainError;

/// What the caller should do with the session cookie after an action.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionChange {
    #[default]
    Unchanged,
    /// Store `token` as the session, valid for `max_age`.
    Start { token: String, max_age: Duration },
    /// Drop the session.
    End,
}

/// Successful action result. Navigation is a hint; the presentation boundary
/// decides whether and how to follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub message: String,
    pub redirect: Option<String>,
    pub session: SessionChange,
}

impl ActionOutcome {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            redirect: None,
            session: SessionChange::Unchanged,
        }
    }

    pub fn redirect_to(mut self, target: impl Into<String>) -> Self {
        self.redirect = Some(target.into());
        self
    }

    pub fn with_session(mut self, session: SessionChange) -> Self {
        self.session = session;
        self
    }
}

pub type ActionResult = Result<ActionOutcome, DomainError>;
