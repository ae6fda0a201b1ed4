//! Capture cache files
//!
//! Filtered captures are appended to `clanchests_cache_<date>.txt` so they
//! can be merged into the ledger later. The date key is carried by the file
//! name, between the last `_` and the last `.`.

use crate::error::ProcessorError;
use crate::progress::ProgressReporter;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// File name prefix of cache files
pub const CACHE_FILE_PREFIX: &str = "clanchests_cache_";

/// Lines read back from a cache file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedCapture {
    /// Date key from the file name
    pub date_key: String,
    /// Non-empty lines in file order
    pub lines: Vec<String>,
}

/// Cache file name for a date key
pub fn cache_file_name(date_key: &str) -> String {
    format!("{}{}.txt", CACHE_FILE_PREFIX, date_key)
}

/// Date key embedded in a cache file name
pub fn date_from_filename(path: &Path) -> Result<String, ProcessorError> {
    let invalid = || ProcessorError::InvalidCacheFile(path.display().to_string());

    let name = path.file_name().and_then(|n| n.to_str()).ok_or_else(invalid)?;
    let start = name.rfind('_').ok_or_else(invalid)? + 1;
    let end = name.rfind('.').ok_or_else(invalid)?;
    if end <= start {
        return Err(invalid());
    }
    Ok(name[start..end].to_string())
}

/// Append lines to the cache file for `date_key`, creating the directory
/// when missing
pub async fn write_cache(
    dir: &Path,
    date_key: &str,
    lines: &[String],
) -> Result<PathBuf, ProcessorError> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(cache_file_name(date_key));

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .await?;

    let mut contents = String::new();
    for line in lines {
        contents.push_str(line);
        contents.push('\n');
    }
    file.write_all(contents.as_bytes()).await?;
    file.flush().await?;

    debug!("Appended {} line(s) to {}", lines.len(), path.display());
    Ok(path)
}

/// Read a cache file
///
/// CRLF line endings are normalized and empty lines dropped. One progress
/// update is emitted per line, separated by `throttle`.
pub async fn read_cache(
    path: &Path,
    progress: &ProgressReporter,
    throttle: Duration,
) -> Result<CachedCapture, ProcessorError> {
    let date_key = date_from_filename(path)?;
    let data = tokio::fs::read_to_string(path).await?;
    let data = data.replace("\r\n", "\n");

    let raw: Vec<&str> = data.split('\n').collect();
    let total = raw.len();
    let mut lines = Vec::with_capacity(total);

    for (current, line) in raw.into_iter().enumerate() {
        if !line.is_empty() {
            lines.push(line.to_string());
        }
        progress.report(
            format!("Processing clan chests cache for {} ({}/{})...", date_key, current, total),
            total,
            current,
        );
        throttle_delay(throttle).await;
    }

    info!("Read {} line(s) from {}", lines.len(), path.display());
    Ok(CachedCapture { date_key, lines })
}

/// Cache files in a directory, sorted by name
pub async fn list_cache_files(dir: &Path) -> Result<Vec<PathBuf>, ProcessorError> {
    let mut files = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_cache = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(CACHE_FILE_PREFIX) && n.ends_with(".txt"));
        if is_cache && entry.file_type().await?.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Cooperative pause between progress events
pub(crate) async fn throttle_delay(throttle: Duration) {
    if throttle.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(throttle).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_date_from_filename() {
        let path = Path::new("/tmp/cache/clanchests_cache_2026-10-17.txt");
        assert_eq!(date_from_filename(path).unwrap(), "2026-10-17");

        let path = Path::new("clanchests_cache_17.10.2026.txt");
        assert_eq!(date_from_filename(path).unwrap(), "17.10.2026");
    }

    #[test]
    fn test_invalid_cache_file_names() {
        for name in ["capture.txt", "clanchests_cache_", "notes_.txt"] {
            assert!(matches!(
                date_from_filename(Path::new(name)),
                Err(ProcessorError::InvalidCacheFile(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_write_appends_and_read_normalizes() {
        let dir = TempDir::new().unwrap();
        let cache_dir = dir.path().join("cache");

        let first = vec!["Epic Chest".to_string(), "From: Bob".to_string()];
        let path = write_cache(&cache_dir, "2026-10-17", &first).await.unwrap();
        let second = vec!["Source: Level 10 Crypt".to_string()];
        write_cache(&cache_dir, "2026-10-17", &second).await.unwrap();

        let capture = read_cache(&path, &ProgressReporter::disabled(), Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(capture.date_key, "2026-10-17");
        assert_eq!(capture.lines, vec!["Epic Chest", "From: Bob", "Source: Level 10 Crypt"]);
    }

    #[tokio::test]
    async fn test_read_handles_crlf_and_reports_progress() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(cache_file_name("2026-10-16"));
        std::fs::write(&path, "Epic Chest\r\nFrom: Bob\r\n\r\nSource: Arena\r\n").unwrap();

        let (reporter, mut rx) = ProgressReporter::channel();
        let capture = read_cache(&path, &reporter, Duration::ZERO).await.unwrap();
        assert_eq!(capture.lines, vec!["Epic Chest", "From: Bob", "Source: Arena"]);

        let mut updates = 0;
        while rx.try_recv().is_ok() {
            updates += 1;
        }
        assert_eq!(updates, 5);
    }

    #[tokio::test]
    async fn test_list_cache_files_sorted() {
        let dir = TempDir::new().unwrap();
        for date in ["2026-10-17", "2026-10-15"] {
            std::fs::write(dir.path().join(cache_file_name(date)), "").unwrap();
        }
        std::fs::write(dir.path().join("other.txt"), "").unwrap();

        let files = list_cache_files(dir.path()).await.unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with(cache_file_name("2026-10-15")));
    }
}
