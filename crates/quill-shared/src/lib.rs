//! # Quill Shared
//!
//! Request and response bodies of the Quill HTTP API.
//! Kept free of server dependencies so a client can compile against it.

pub mod dto;
pub mod response;

pub use response::{ActionResponse, ApiResponse, ErrorResponse};
