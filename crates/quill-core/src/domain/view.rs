use std::fmt;

use uuid::Uuid;

/// A rendered view whose cached copy must be dropped when the data behind it changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    /// Home page post listing.
    Home,
    /// A single post page.
    Post(Uuid),
    AdminPosts,
    AdminUsers,
    /// A user's own profile page with their posts.
    Profile(Uuid),
}

impl View {
    pub fn cache_key(&self) -> String {
        match self {
            View::Home => "view:/".to_string(),
            View::Post(id) => format!("view:/posts/{id}"),
            View::AdminPosts => "view:/admin/posts".to_string(),
            View::AdminUsers => "view:/admin/users".to_string(),
            View::Profile(id) => format!("view:/profile/{id}"),
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cache_key())
    }
}
