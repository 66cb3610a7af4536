//! Content type lookup by file extension

/// Content type used for names without an extension
pub const DIRECTORY_MIME: &str = "application/directory";

/// Fallback for unknown extensions
pub const DEFAULT_MIME: &str = "application/octet-stream";

/// Guess a content type from the extension of the last path segment
pub fn mime_for_path(path: &str) -> String {
    let name = path.trim_end_matches('/').rsplit('/').next().unwrap_or_default();

    match name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => mime_guess::from_ext(ext)
            .first_raw()
            .unwrap_or(DEFAULT_MIME)
            .to_string(),
        _ => DIRECTORY_MIME.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        assert_eq!(mime_for_path("x.json"), "application/json");
        assert_eq!(mime_for_path("docs/readme.txt"), "text/plain");
        assert_eq!(mime_for_path("photos/2024/cat.jpg"), "image/jpeg");
        assert_eq!(mime_for_path("site/index.html"), "text/html");
        assert_eq!(mime_for_path("archive.ZIP"), "application/zip");
    }

    #[test]
    fn test_no_extension_is_directory() {
        assert_eq!(mime_for_path("photos/2024"), DIRECTORY_MIME);
        assert_eq!(mime_for_path("photos/2024/"), DIRECTORY_MIME);
        assert_eq!(mime_for_path("notes."), DIRECTORY_MIME);
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(mime_for_path("blob.zzqx"), DEFAULT_MIME);
    }
}
