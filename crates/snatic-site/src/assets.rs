//! Static asset copying.

use std::fs;
use std::path::Path;

use crate::BuildError;

/// Recursively copy `source` into `target`, creating `target` as needed.
///
/// Symlinks are followed. Returns the number of files copied.
pub fn copy_dir(source: &Path, target: &Path) -> Result<usize, BuildError> {
    fs::create_dir_all(target).map_err(BuildError::io(target))?;

    let mut copied = 0;
    for entry in fs::read_dir(source).map_err(BuildError::io(source))? {
        let entry = entry.map_err(BuildError::io(source))?;
        let from = entry.path();
        let to = target.join(entry.file_name());
        let metadata = fs::metadata(&from).map_err(BuildError::io(&from))?;

        if metadata.is_dir() {
            copied += copy_dir(&from, &to)?;
        } else {
            fs::copy(&from, &to).map_err(BuildError::io(&from))?;
            copied += 1;
        }
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_copies_nested_tree() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("assets");
        fs::create_dir_all(source.join("css/vendor")).unwrap();
        fs::write(source.join("logo.svg"), "<svg/>").unwrap();
        fs::write(source.join("css/site.css"), "body{}").unwrap();
        fs::write(source.join("css/vendor/reset.css"), "*{}").unwrap();
        let target = temp_dir.path().join("site/assets");

        let copied = copy_dir(&source, &target).unwrap();

        assert_eq!(copied, 3);
        assert_eq!(
            fs::read_to_string(target.join("css/vendor/reset.css")).unwrap(),
            "*{}"
        );
        assert!(target.join("logo.svg").is_file());
    }

    #[test]
    fn test_missing_source_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = copy_dir(&temp_dir.path().join("nope"), &temp_dir.path().join("out")).unwrap_err();
        assert!(matches!(err, BuildError::Io { .. }), "got {err:?}");
    }
}
