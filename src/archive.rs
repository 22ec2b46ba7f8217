//! Local archive of downloaded XML documents.
//!
//! Files are written as `{directory}/{sanitized stem}.xml`. Each run
//! overwrites what the previous run wrote; two names that sanitize to the
//! same stem share a file and the last write wins.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{JamfError, Result};

/// Replaces every character other than alphanumerics, space, `-` and `_`
/// with `_`.
///
/// Path separators and dots never survive, so the result cannot escape
/// the directory it is joined onto.
pub fn sanitize_file_stem(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Writes `content` to `{directory}/{sanitize_file_stem(logical_name)}.xml`,
/// creating `directory` if needed, and returns the path written.
pub fn save(directory: &Path, logical_name: &str, content: &str) -> Result<PathBuf> {
    fs::create_dir_all(directory).map_err(|source| JamfError::Io {
        path: directory.to_path_buf(),
        source,
    })?;

    let path = directory.join(format!("{}.xml", sanitize_file_stem(logical_name)));
    fs::write(&path, content).map_err(|source| JamfError::Io {
        path: path.clone(),
        source,
    })?;

    tracing::debug!(path = %path.display(), bytes = content.len(), "archived document");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_unsafe_characters() {
        assert_eq!(sanitize_file_stem("a/b:c"), "a_b_c");
        assert_eq!(sanitize_file_stem("Install (v2).pkg_12"), "Install _v2__pkg_12");
    }

    #[test]
    fn sanitize_keeps_safe_characters() {
        assert_eq!(sanitize_file_stem("Test Script-1_42"), "Test Script-1_42");
        assert_eq!(sanitize_file_stem("Überprüfung_5"), "Überprüfung_5");
    }

    #[test]
    fn sanitize_neutralizes_traversal() {
        assert_eq!(sanitize_file_stem("../../etc/passwd"), "______etc_passwd");
    }

    #[test]
    fn save_creates_directory_and_writes_file() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("output").join("scripts");

        let path = save(&dir, "Test Script_42", "<script/>").unwrap();

        assert_eq!(path, dir.join("Test Script_42.xml"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "<script/>");
    }

    #[test]
    fn save_overwrites_previous_content() {
        let tmp = tempfile::tempdir().unwrap();
        save(tmp.path(), "a_1", "first, longer content").unwrap();
        let path = save(tmp.path(), "a_1", "second").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "second");
    }

    #[test]
    fn colliding_names_share_a_file() {
        let tmp = tempfile::tempdir().unwrap();
        let first = save(tmp.path(), "a/b_1", "one").unwrap();
        let second = save(tmp.path(), "a:b_1", "two").unwrap();
        assert_eq!(first, second);
        assert_eq!(fs::read_to_string(second).unwrap(), "two");
    }

    #[test]
    fn saved_path_stays_under_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let path = save(tmp.path(), "../escape_9", "x").unwrap();
        assert_eq!(path.parent(), Some(tmp.path()));
    }
}
