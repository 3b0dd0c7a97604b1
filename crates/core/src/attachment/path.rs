//! Path normalization for transfer entry points.

use std::path::{Path, PathBuf};

use super::error::AttachmentError;

/// Resolve `path` against the current directory without touching the disk.
pub(crate) fn normalize_path(path: &Path) -> Result<PathBuf, AttachmentError> {
    std::path::absolute(path).map_err(|e| AttachmentError::io(path, e))
}

/// Reduce a remote filename to a single safe path component.
///
/// Both `/` and `\` count as separators so a name crafted for either
/// platform cannot climb out of the target directory. Returns `None` when
/// nothing usable is left.
pub fn safe_filename(filename: &str) -> Option<&str> {
    let base = filename.rsplit(['/', '\\']).next()?.trim();
    match base {
        "" | "." | ".." => None,
        name if name.contains('\0') => None,
        name => Some(name),
    }
}

/// Basename used to report a local file, falling back to the raw input.
pub(crate) fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("report.pdf", Some("report.pdf"))]
    #[case("dir/sub/diagram.png", Some("diagram.png"))]
    #[case("../../etc/passwd", Some("passwd"))]
    #[case("/absolute/evil.sh", Some("evil.sh"))]
    #[case("..\\..\\windows\\win.ini", Some("win.ini"))]
    #[case("name with spaces.txt", Some("name with spaces.txt"))]
    #[case("..", None)]
    #[case("dir/..", None)]
    #[case(".", None)]
    #[case("", None)]
    #[case("trailing/", None)]
    fn test_safe_filename(#[case] input: &str, #[case] expected: Option<&str>) {
        assert_eq!(safe_filename(input), expected);
    }

    #[test]
    fn test_normalize_path_is_absolute() {
        let resolved = normalize_path(Path::new("some/relative/file.bin")).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("some/relative/file.bin"));
    }

    #[rstest]
    #[case("/tmp/upload/photo.jpg", "photo.jpg")]
    #[case("relative/notes.txt", "notes.txt")]
    #[case("/", "/")]
    fn test_display_name(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(display_name(Path::new(input)), expected);
    }
}
