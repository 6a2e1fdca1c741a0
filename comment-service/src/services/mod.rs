pub mod comment;
pub mod providers;

pub use comment::CommentService;
