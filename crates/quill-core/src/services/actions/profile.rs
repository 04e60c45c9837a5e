use crate::domain::{PublicUser, View};
use crate::error::{DomainError, RepoError};
use crate::services::outcome::{ActionOutcome, ActionResult};
use crate::validation::validate_name;

use super::BlogActions;

impl BlogActions {
    /// Rename the signed-in user. Only the name is written.
    pub async fn update_profile(&self, session: Option<&PublicUser>, name: &str) -> ActionResult {
        let user = session.ok_or(DomainError::Unauthorized)?;
        validate_name(name)?;

        self.users
            .update_name(user.id, name.trim())
            .await
            .map_err(|e| match e {
                RepoError::NotFound => DomainError::user_not_found(user.id),
                other => DomainError::store("update profile", other),
            })?;

        self.revalidate(&[View::Profile(user.id), View::AdminUsers])
            .await;
        tracing::info!(user_id = %user.id, "Profile updated");

        Ok(ActionOutcome::new("Profile updated successfully!"))
    }
}
