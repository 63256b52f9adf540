//! Directory manager
//!
//! Helpers over the managed directories: creation, top-level listings, recursive sizes
//! and age-based selection. A directory that does not exist is treated as empty by every
//! read helper.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use stormlead_core::FileEntry;
use tokio::fs;

use crate::traits::StorageResult;

/// Create every directory in `dirs` (and missing parents). Idempotent.
pub async fn ensure_directories<P: AsRef<Path>>(dirs: &[P]) -> StorageResult<()> {
    for dir in dirs {
        fs::create_dir_all(dir.as_ref()).await?;
    }
    Ok(())
}

/// Regular files directly inside `dir`, sorted by name.
pub async fn list_files(dir: &Path) -> StorageResult<Vec<FileEntry>> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let metadata = entry.metadata().await?;
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        files.push(FileEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            size: metadata.len(),
            modified: DateTime::<Utc>::from(modified),
        });
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

/// Total size in bytes of every file under `dir`, recursively.
pub async fn directory_size(dir: &Path) -> StorageResult<u64> {
    let mut total = 0u64;
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let mut entries = match fs::read_dir(&current).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if metadata.is_dir() {
                pending.push(entry.path());
            } else if metadata.is_file() {
                total += metadata.len();
            }
        }
    }

    Ok(total)
}

/// Regular files directly inside `dir` whose modification time is before `cutoff`.
pub async fn files_modified_before(dir: &Path, cutoff: SystemTime) -> StorageResult<Vec<PathBuf>> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut stale = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let metadata = entry.metadata().await?;
        if !metadata.is_file() {
            continue;
        }
        if metadata.modified()? < cutoff {
            stale.push(entry.path());
        }
    }

    stale.sort();
    Ok(stale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[tokio::test]
    async fn ensure_directories_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let dirs = [dir.path().join("a/b"), dir.path().join("logs")];

        ensure_directories(&dirs).await.unwrap();
        ensure_directories(&dirs).await.unwrap();

        assert!(dirs.iter().all(|d| d.is_dir()));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn list_files_skips_subdirectories() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.png"), [0u8; 10]).unwrap();
        std::fs::write(dir.path().join("a.jpg"), [0u8; 4]).unwrap();
        std::fs::create_dir(dir.path().join("optimized")).unwrap();

        let files = list_files(dir.path()).await.unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "b.png"]);
        assert_eq!(files[1].size, 10);
    }

    #[tokio::test]
    async fn directory_size_recurses_and_tolerates_missing() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("one.bin"), [0u8; 100]).unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested/two.bin"), [0u8; 200]).unwrap();

        assert_eq!(directory_size(dir.path()).await.unwrap(), 300);
        assert_eq!(
            directory_size(&dir.path().join("missing")).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn files_modified_before_uses_cutoff() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("fresh.json"), "[]").unwrap();

        let past = SystemTime::now() - Duration::from_secs(3600);
        assert!(files_modified_before(dir.path(), past).await.unwrap().is_empty());

        let future = SystemTime::now() + Duration::from_secs(3600);
        assert_eq!(files_modified_before(dir.path(), future).await.unwrap().len(), 1);
    }
}
