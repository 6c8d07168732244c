use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    /// Regex for logical file paths accepted on upload and download
    /// - No leading slash, no control characters
    /// - Valid: "docs/report.pdf", "docs/", "a"
    /// - Invalid: "/etc/passwd", "", "tab\there"
    pub static ref FILE_PATH_REGEX: Regex =
        Regex::new(r"^[^/\x00-\x1f\x7f][^\x00-\x1f\x7f]*$").unwrap();
}

/// Validate a logical file path or directory-like prefix (trailing `/` allowed).
///
/// Segments may not be empty, `.` or `..`.
pub fn validate_file_path(path: &str) -> Result<(), ValidationError> {
    if !FILE_PATH_REGEX.is_match(path) {
        return Err(invalid_path("Path must be non-empty and must not start with '/'"));
    }

    let body = path.strip_suffix('/').unwrap_or(path);
    if body
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(invalid_path(
            "Path segments must not be empty, '.' or '..'",
        ));
    }

    Ok(())
}

fn invalid_path(message: &'static str) -> ValidationError {
    ValidationError::new("file_path").with_message(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_path_valid() {
        assert!(validate_file_path("docs/report.pdf").is_ok());
        assert!(validate_file_path("docs/").is_ok());
        assert!(validate_file_path("a").is_ok());
        assert!(validate_file_path("deep/nested/dir/").is_ok());
        assert!(validate_file_path("файлы/отчёт.txt").is_ok());
        assert!(validate_file_path("0190f7a2-5c1e-7d3b-9a8e-2f4b6c8d0e1f").is_ok());
    }

    #[test]
    fn test_file_path_invalid() {
        assert!(validate_file_path("").is_err()); // empty
        assert!(validate_file_path("/etc/passwd").is_err()); // leading slash
        assert!(validate_file_path("/").is_err());
        assert!(validate_file_path("a//b").is_err()); // empty segment
        assert!(validate_file_path("a/../b").is_err()); // traversal
        assert!(validate_file_path("./a").is_err());
        assert!(validate_file_path("a/b//").is_err());
        assert!(validate_file_path("tab\there").is_err()); // control character
    }
}
