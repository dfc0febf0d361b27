use crate::engine::TMP_MARKER;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::{error, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Temporary files younger than this may still belong to an in-flight overwrite.
const STALE_AFTER: Duration = Duration::from_secs(300);

pub(crate) async fn purge_tmp(root: &Path) {
    let root = root.to_path_buf();
    let now = SystemTime::now();

    match tokio::task::spawn_blocking(move || remove_stale(&root, now, STALE_AFTER)).await {
        Ok((removed, failed)) if removed > 0 || failed > 0 => {
            info!(removed, failed, "Cleaned up temporary files");
        },
        Err(e) => {
            error!(error = %e, "Temp file cleanup task panicked");
        },
        _ => {},
    }
}

/// Removes stale temporary files under `root`. Directories are never touched: an empty
/// category or collection is valid data.
fn remove_stale(root: &Path, now: SystemTime, threshold: Duration) -> (usize, usize) {
    let mut removed = 0;
    let mut failed = 0;

    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .flatten()
        .filter(|entry| is_tmp(entry) && is_stale(entry, now, threshold))
        .for_each(|entry| {
            let path = entry.path();
            match std::fs::remove_file(path) {
                Ok(()) => removed += 1,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to remove temp file");
                    failed += 1;
                },
            }
        });

    (removed, failed)
}

fn is_tmp(entry: &DirEntry) -> bool {
    entry.file_type().is_file()
        && entry.file_name().to_str().is_some_and(|name| name.contains(TMP_MARKER))
}

fn is_stale(entry: &DirEntry, now: SystemTime, threshold: Duration) -> bool {
    entry
        .metadata()
        .ok()
        .and_then(|m| m.modified().ok())
        .and_then(|modified| now.duration_since(modified).ok())
        .is_none_or(|age| age > threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn removes_only_stale_temp_files() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        std::fs::create_dir_all(root.join("_apparel/sku123")).unwrap();
        std::fs::create_dir_all(root.join("_empty")).unwrap();
        std::fs::write(root.join("_apparel/sku123/photo.png"), b"img").unwrap();
        std::fs::write(root.join("_apparel/sku123/photo.png.fhubtmp.7"), b"partial").unwrap();

        let future = SystemTime::now() + Duration::from_secs(3600);
        let (removed, failed) = remove_stale(root, future, STALE_AFTER);

        assert_eq!((removed, failed), (1, 0));
        assert!(root.join("_apparel/sku123/photo.png").exists());
        assert!(!root.join("_apparel/sku123/photo.png.fhubtmp.7").exists());
        assert!(root.join("_empty").is_dir());
    }

    #[test]
    fn keeps_fresh_temp_files() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.bin.fhubtmp.1"), b"x").unwrap();

        let (removed, _) = remove_stale(temp.path(), SystemTime::now(), STALE_AFTER);

        assert_eq!(removed, 0);
        assert!(temp.path().join("a.bin.fhubtmp.1").exists());
    }
}
