//! Request and response shapes for the comment endpoint.

pub mod comment;

pub use comment::{CommentRequest, CommentResponse, CommentSource};
