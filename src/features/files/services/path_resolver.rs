use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::files::models::FileRecord;
use crate::features::files::store::MetadataStore;
use crate::shared::constants::PATH_SEPARATOR;

/// How a user-supplied identifier is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileIdentifier<'a> {
    /// Anything that parses as a UUID, even if a file has that literal path
    Id(Uuid),
    /// Ends with `/`: everything nested under it
    Prefix(&'a str),
    /// Exact path
    Path(&'a str),
}

impl<'a> FileIdentifier<'a> {
    pub fn classify(raw: &'a str) -> Self {
        if let Ok(id) = Uuid::try_parse(raw) {
            FileIdentifier::Id(id)
        } else if raw.ends_with(PATH_SEPARATOR) {
            FileIdentifier::Prefix(raw)
        } else {
            FileIdentifier::Path(raw)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Single(FileRecord),
    /// Prefix matches; may be empty
    Many(Vec<FileRecord>),
}

/// Look up the record(s) an identifier refers to within `account_id`.
///
/// Ids and exact paths that match nothing fail with `AppError::NotFound`;
/// a prefix that matches nothing yields `Resolved::Many(vec![])`.
pub async fn resolve(
    store: &dyn MetadataStore,
    identifier: &str,
    account_id: &str,
) -> Result<Resolved> {
    match FileIdentifier::classify(identifier) {
        FileIdentifier::Id(id) => store
            .get_by_id(id, account_id)
            .await?
            .map(Resolved::Single)
            .ok_or_else(|| AppError::NotFound(format!("File with id '{}' not found", id))),
        FileIdentifier::Prefix(prefix) => Ok(Resolved::Many(
            store.list_by_path_prefix(prefix, account_id).await?,
        )),
        FileIdentifier::Path(path) => store
            .get_by_path(path, account_id)
            .await?
            .map(Resolved::Single)
            .ok_or_else(|| AppError::NotFound(format!("File with path '{}' not found", path))),
    }
}
