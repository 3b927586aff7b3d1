use std::borrow::Cow;
use std::env;
use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result, bail};

// Maximum size for export files accepted by the importer: 512MB
const MAX_FILE_SIZE_BYTES: u64 = 512 * 1024 * 1024;

/// Opens a file and validates its size before any reads
///
/// Validation happens on the open handle to avoid TOCTOU (time-of-check-time-of-use)
/// races where the file could be swapped between the check and the read.
pub fn safe_open_file(path: &Path) -> Result<File> {
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    validate_file_size(&file, path)?;
    Ok(file)
}

/// Validates that a file's size is within acceptable limits (512MB)
///
/// # Errors
///
/// Returns an error if:
/// - The file metadata cannot be read
/// - The file is larger than 512MB
pub fn validate_file_size(file: &File, path: &Path) -> Result<()> {
    let metadata = file
        .metadata()
        .with_context(|| format!("Failed to read file metadata: {}", path.display()))?;

    let file_size = metadata.len();
    if file_size > MAX_FILE_SIZE_BYTES {
        bail!(
            "File too large: {} ({} bytes, max {} bytes)",
            path.display(),
            file_size,
            MAX_FILE_SIZE_BYTES
        );
    }

    Ok(())
}

/// Formats a path with ~ substitution for the home directory
///
/// # Examples
///
/// ```no_run
/// use std::path::PathBuf;
/// use chat_archive_explorer::format_path_with_tilde;
///
/// let path = PathBuf::from("/Users/alice/archive.db");
/// // Returns "~/archive.db" if HOME=/Users/alice
/// let formatted = format_path_with_tilde(&path);
/// ```
pub fn format_path_with_tilde(path: &Path) -> String {
    format_path_with_tilde_internal(path, None)
}

/// Internal helper for path formatting with optional home override (for testing)
pub(crate) fn format_path_with_tilde_internal(path: &Path, home_override: Option<&str>) -> String {
    let home_from_env = env::var("HOME").ok();
    let home = home_override.or(home_from_env.as_deref());

    let path_str = path.to_string_lossy();
    if let Some(home) = home
        && !home.is_empty()
        && path_str.starts_with(home)
    {
        return path_str.replacen(home, "~", 1);
    }

    match path_str {
        Cow::Borrowed(s) => s.to_string(),
        Cow::Owned(s) => s,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_safe_open_file_small_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[]").unwrap();
        file.flush().unwrap();

        assert!(safe_open_file(file.path()).is_ok());
    }

    #[test]
    fn test_safe_open_file_missing() {
        let result = safe_open_file(Path::new("/nonexistent/conversations.json"));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Failed to open file"));
    }

    #[test]
    fn test_format_path_with_tilde_under_home() {
        let path = PathBuf::from("/Users/alice/archive/conversations.db");
        let formatted = format_path_with_tilde_internal(&path, Some("/Users/alice"));
        assert_eq!(formatted, "~/archive/conversations.db");
    }

    #[test]
    fn test_format_path_with_tilde_outside_home() {
        let path = PathBuf::from("/var/lib/archive.db");
        let formatted = format_path_with_tilde_internal(&path, Some("/Users/alice"));
        assert_eq!(formatted, "/var/lib/archive.db");
    }

    #[test]
    fn test_format_path_with_empty_home() {
        let path = PathBuf::from("/var/lib/archive.db");
        assert_eq!(format_path_with_tilde_internal(&path, Some("")), "/var/lib/archive.db");
    }
}
