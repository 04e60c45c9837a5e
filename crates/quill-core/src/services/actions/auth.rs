use crate::domain::{User, View, mask_email, normalize_email};
use crate::error::{DomainError, RepoError};
use crate::services::forms::{Credentials, Registration};
use crate::services::outcome::{ActionOutcome, ActionResult, SessionChange};

use super::BlogActions;

impl BlogActions {
    /// Sign in with email and password.
    pub async fn login(&self, credentials: Credentials) -> ActionResult {
        credentials.validate()?;
        let email = normalize_email(&credentials.email);

        let user = self
            .users
            .find_by_email(&email)
            .await
            .map_err(|e| DomainError::store("sign in", e))?;

        let Some(user) = user else {
            tracing::info!(user_email = %mask_email(&email), "Login for unknown email");
            return Err(DomainError::InvalidCredentials);
        };

        if !self.passwords.verify(&credentials.password, &user.password_hash)? {
            tracing::info!(user_id = %user.id, "Login with wrong password");
            return Err(DomainError::InvalidCredentials);
        }

        let session = self.start_session(&user)?;
        tracing::info!(user_id = %user.id, "User signed in");

        Ok(ActionOutcome::new("Signed in successfully")
            .redirect_to("/")
            .with_session(session))
    }

    /// Create a regular account and sign it in.
    pub async fn register(&self, registration: Registration) -> ActionResult {
        registration.validate()?;
        let email = normalize_email(&registration.email);
        let masked = mask_email(&email);

        let existing = self
            .users
            .find_by_email(&email)
            .await
            .map_err(|e| DomainError::store("create account", e))?;
        if existing.is_some() {
            return Err(DomainError::DuplicateEmail(masked));
        }

        let password_hash = self.passwords.hash(&registration.password)?;
        let user = User::new(registration.name.trim().to_string(), email, password_hash);

        let user = self.users.insert(user).await.map_err(|e| match e {
            RepoError::Constraint(_) => DomainError::DuplicateEmail(masked.clone()),
            other => DomainError::store("create account", other),
        })?;

        self.revalidate(&[View::AdminUsers]).await;

        let session = self.start_session(&user)?;
        tracing::info!(user_id = %user.id, user_email = %masked, "User registered");

        Ok(ActionOutcome::new("Account created")
            .redirect_to("/")
            .with_session(session))
    }

    /// End the current session.
    pub async fn sign_out(&self) -> ActionResult {
        Ok(ActionOutcome::new("Signed out")
            .redirect_to("/login")
            .with_session(SessionChange::End))
    }

    fn start_session(&self, user: &User) -> Result<SessionChange, DomainError> {
        Ok(SessionChange::Start {
            token: self.tokens.issue(user.id)?,
            max_age: self.tokens.session_ttl(),
        })
    }
}
