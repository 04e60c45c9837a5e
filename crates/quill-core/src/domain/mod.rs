//! Domain entities - the core business objects.

mod post;
mod user;
mod view;

pub use post::{EXCERPT_CHARS, Post, PostDraft, excerpt_of};
pub use user::{PublicUser, Role, User, avatar_url, mask_email, normalize_email};
pub use view::View;
