/// Default number of records returned by list and search endpoints
pub const DEFAULT_LIST_LIMIT: i64 = 100;

/// Path separator used in logical file paths
pub const PATH_SEPARATOR: char = '/';

/// Media type of multi-file (zip) downloads
pub const ZIP_CONTENT_TYPE: &str = "application/x-zip-compressed";

/// File name of multi-file (zip) downloads
pub const ZIP_FILE_NAME: &str = "files.zip";

/// Content type used when neither the client nor the extension provides one
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";
