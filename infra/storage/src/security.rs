use crate::error::StorageError;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

/// Lexically validates a caller-supplied relative path.
///
/// `.` segments are dropped. `..`, root and prefix components are rejected outright, so
/// the result is always a plain sequence of names below the root.
fn normalize_relative(path: &Path) -> Result<PathBuf, StorageError> {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::Normal(segment) => out.push(segment),
            Component::ParentDir => {
                return Err(StorageError::traversal(path, "Parent directory segments are not allowed"));
            },
            Component::RootDir | Component::Prefix(_) => {
                return Err(StorageError::traversal(path, "Absolute paths are not allowed"));
            },
        }
    }

    Ok(out)
}

/// Joins a relative path onto the canonical storage root and proves the result stays inside it.
///
/// Existing targets are canonicalized so symlinks pointing outside the root are caught.
/// Missing targets are checked through their closest existing ancestor. The joined path is
/// returned, not the canonical one, so an in-root symlink leaf names the link itself.
pub(crate) fn resolve_path(root: &Path, path: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
    let relative = normalize_relative(path.as_ref())?;
    if relative.as_os_str().is_empty() {
        return Ok(root.to_path_buf());
    }

    let joined = root.join(relative);

    match joined.canonicalize() {
        Ok(canonical) => contain(root, &canonical).map(|()| joined),
        Err(e) if e.kind() == ErrorKind::NotFound => validate_ancestors(root, &joined),
        Err(e) => Err(StorageError::stat(&joined, e)),
    }
}

fn contain(root: &Path, canonical: &Path) -> Result<(), StorageError> {
    if canonical.starts_with(root) {
        Ok(())
    } else {
        Err(StorageError::traversal(canonical, "Path resolves outside the storage root"))
    }
}

/// Validates a path that doesn't exist yet by canonicalizing its first existing ancestor.
///
/// Returns the joined (non-canonical) path so the caller creates exactly what was asked for.
fn validate_ancestors(root: &Path, joined: &Path) -> Result<PathBuf, StorageError> {
    let mut current = joined.parent();

    while let Some(ancestor) = current {
        if ancestor == root {
            return Ok(joined.to_path_buf());
        }

        match ancestor.canonicalize() {
            Ok(canonical) if canonical.starts_with(root) => return Ok(joined.to_path_buf()),
            Ok(canonical) => {
                return Err(StorageError::traversal(
                    &canonical,
                    "Existing ancestor is a symlink outside the storage root",
                ));
            },
            Err(e) if e.kind() == ErrorKind::NotFound => current = ancestor.parent(),
            Err(e) => return Err(StorageError::stat(ancestor, e)),
        }
    }

    Err(StorageError::traversal(joined, "No ancestor found within the storage root"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn root() -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let canonical = temp.path().canonicalize().unwrap();
        (temp, canonical)
    }

    #[test]
    fn rejects_parent_segments_even_when_contained() {
        let (_temp, root) = root();
        assert!(matches!(
            resolve_path(&root, "a/../b"),
            Err(StorageError::PathTraversalAttempt { .. })
        ));
        assert!(resolve_path(&root, "../etc/passwd").is_err());
    }

    #[test]
    fn rejects_absolute_paths() {
        let (_temp, root) = root();
        assert!(matches!(
            resolve_path(&root, "/etc/passwd"),
            Err(StorageError::PathTraversalAttempt { .. })
        ));
    }

    #[test]
    fn empty_and_dot_paths_resolve_to_root() {
        let (_temp, root) = root();
        assert_eq!(resolve_path(&root, "").unwrap(), root);
        assert_eq!(resolve_path(&root, "./.").unwrap(), root);
    }

    #[test]
    fn missing_nested_paths_are_joined_under_root() {
        let (_temp, root) = root();
        let resolved = resolve_path(&root, "_apparel/_shoes/sku123/photo.png").unwrap();
        assert_eq!(resolved, root.join("_apparel/_shoes/sku123/photo.png"));
    }

    #[cfg(unix)]
    #[test]
    fn in_root_symlinks_resolve_to_the_link() {
        let (_temp, root) = root();
        std::fs::create_dir(root.join("target")).unwrap();
        std::os::unix::fs::symlink(root.join("target"), root.join("alias")).unwrap();

        assert_eq!(resolve_path(&root, "alias").unwrap(), root.join("alias"));
        assert_eq!(resolve_path(&root, "alias/new.bin").unwrap(), root.join("alias/new.bin"));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_escapes_are_rejected() {
        let (_temp, root) = root();
        let outside = TempDir::new().unwrap();
        std::os::unix::fs::symlink(outside.path(), root.join("escape")).unwrap();

        assert!(matches!(
            resolve_path(&root, "escape"),
            Err(StorageError::PathTraversalAttempt { .. })
        ));
        assert!(matches!(
            resolve_path(&root, "escape/new/file.bin"),
            Err(StorageError::PathTraversalAttempt { .. })
        ));
    }
}
