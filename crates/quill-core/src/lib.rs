//! # Quill Core
//!
//! The domain layer of the Quill blog platform.
//! Entities, validation rules, the ports infrastructure must implement, and the
//! services built on top of them: session resolution, read queries and the
//! mutating actions. Nothing in here talks to a database or a socket directly.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;
pub mod validation;

pub use error::{DomainError, RepoError};
pub use services::{
    ActionOutcome, ActionResult, BlogActions, BlogQueries, SessionChange, SessionResolver,
};
