//! Services built on the ports: sessions, reads and actions.

mod actions;
pub mod forms;
mod outcome;
mod queries;
mod session;

pub use actions::BlogActions;
pub use forms::{Credentials, PostForm, Registration};
pub use outcome::{ActionOutcome, ActionResult, SessionChange};
pub use queries::BlogQueries;
pub use session::SessionResolver;
