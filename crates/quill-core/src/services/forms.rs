//! Submitted form payloads accepted by the actions.

use uuid::Uuid;

use crate::domain::PostDraft;
use crate::validation::{
    ValidationError, validate_content, validate_cover_image, validate_email, validate_name,
    validate_password, validate_title,
};

#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_email(&self.email)
    }
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        validate_email(&self.email)?;
        validate_password(&self.password)
    }
}

/// Create-or-update form for a post. `id` selects update.
#[derive(Debug, Clone)]
pub struct PostForm {
    pub id: Option<Uuid>,
    pub title: String,
    pub cover_image: String,
    pub content: String,
}

impl PostForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_title(&self.title)?;
        validate_cover_image(&self.cover_image)?;
        validate_content(&self.content)
    }

    pub fn into_draft(self) -> (Option<Uuid>, PostDraft) {
        (
            self.id,
            PostDraft {
                title: self.title,
                cover_image: self.cover_image,
                content: self.content,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_reports_first_failing_field() {
        let form = Registration {
            name: "A".to_string(),
            email: "broken".to_string(),
            password: "short".to_string(),
        };
        assert_eq!(form.validate().unwrap_err().field, "name");

        let form = Registration {
            name: "Ada".to_string(),
            ..form
        };
        assert_eq!(form.validate().unwrap_err().field, "email");
    }

    #[test]
    fn post_form_checks_title_then_cover_then_content() {
        let form = PostForm {
            id: None,
            title: "Valid title".to_string(),
            cover_image: "nope".to_string(),
            content: "short".to_string(),
        };
        assert_eq!(form.validate().unwrap_err().field, "coverImage");
    }
}
