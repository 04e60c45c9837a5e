use uuid::Uuid;

use crate::domain::{PublicUser, Role, User, View, mask_email, normalize_email};
use crate::error::{DomainError, RepoError};
use crate::services::forms::Registration;
use crate::services::outcome::{ActionOutcome, ActionResult};

use super::BlogActions;

impl BlogActions {
    /// Set another user's role. Admins only; any other caller is `Unauthorized`.
    pub async fn change_user_role(
        &self,
        session: Option<&PublicUser>,
        user_id: Uuid,
        role: Role,
    ) -> ActionResult {
        let admin = session
            .filter(|user| user.is_admin())
            .ok_or(DomainError::Unauthorized)?;

        self.users
            .set_role(user_id, role)
            .await
            .map_err(|e| match e {
                RepoError::NotFound => DomainError::user_not_found(user_id),
                other => DomainError::store("update user role", other),
            })?;

        self.revalidate(&[View::AdminUsers, View::Profile(user_id)])
            .await;
        tracing::info!(admin_id = %admin.id, user_id = %user_id, role = %role, "User role changed");

        Ok(ActionOutcome::new(format!("User role updated to {role}")))
    }

    /// Make sure an administrator account exists for `registration.email`.
    ///
    /// Creates it when missing and promotes it when it exists with a lower
    /// role. The password of an existing account is left alone.
    pub async fn ensure_admin(&self, registration: Registration) -> Result<PublicUser, DomainError> {
        registration.validate()?;
        let email = normalize_email(&registration.email);

        let existing = self
            .users
            .find_by_email(&email)
            .await
            .map_err(|e| DomainError::store("load user", e))?;

        let admin = match existing {
            Some(user) if user.is_admin() => user,
            Some(user) => self
                .users
                .set_role(user.id, Role::Admin)
                .await
                .map_err(|e| DomainError::store("update user role", e))?,
            None => {
                let password_hash = self.passwords.hash(&registration.password)?;
                let user = User::new(
                    registration.name.trim().to_string(),
                    email.clone(),
                    password_hash,
                )
                .with_role(Role::Admin);
                self.users.insert(user).await.map_err(|e| match e {
                    RepoError::Constraint(_) => DomainError::DuplicateEmail(mask_email(&email)),
                    other => DomainError::store("create account", other),
                })?
            }
        };

        self.revalidate(&[View::AdminUsers, View::Profile(admin.id)])
            .await;
        Ok(PublicUser::from(admin))
    }
}
