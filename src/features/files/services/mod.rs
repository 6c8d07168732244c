mod file_service;
mod path_resolver;
pub mod search_clause;

pub use file_service::{FileService, UploadRequest};
pub use path_resolver::{resolve, Resolved};
pub use search_clause::SearchClause;
