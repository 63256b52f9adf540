use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::Level;

/// Log sink for maintenance operations
///
/// Each message becomes a tracing event at its level and, when file logging is on, a
/// line `[<ISO timestamp>] <LEVEL>: <message>` in `file-manager-<YYYY-MM-DD>.log`.
/// Failing to write the file never fails the caller.
#[derive(Debug, Clone)]
pub struct MaintenanceLog {
    logs_dir: PathBuf,
    to_file: bool,
}

impl MaintenanceLog {
    pub fn new(logs_dir: impl Into<PathBuf>, to_file: bool) -> Self {
        Self {
            logs_dir: logs_dir.into(),
            to_file,
        }
    }

    pub fn logs_dir(&self) -> &Path {
        &self.logs_dir
    }

    /// Daily log file for `at`.
    pub fn file_for(&self, at: DateTime<Utc>) -> PathBuf {
        self.logs_dir
            .join(format!("file-manager-{}.log", at.format("%Y-%m-%d")))
    }

    pub fn format_line(at: DateTime<Utc>, level: Level, message: &str) -> String {
        format!(
            "[{}] {}: {}\n",
            at.to_rfc3339_opts(SecondsFormat::Millis, true),
            level,
            message
        )
    }

    pub async fn info(&self, message: impl AsRef<str>) {
        self.log(Level::INFO, message.as_ref()).await
    }

    pub async fn warn(&self, message: impl AsRef<str>) {
        self.log(Level::WARN, message.as_ref()).await
    }

    pub async fn error(&self, message: impl AsRef<str>) {
        self.log(Level::ERROR, message.as_ref()).await
    }

    pub async fn log(&self, level: Level, message: &str) {
        match level {
            Level::ERROR => tracing::error!(target: "stormlead::maintenance", "{}", message),
            Level::WARN => tracing::warn!(target: "stormlead::maintenance", "{}", message),
            Level::INFO => tracing::info!(target: "stormlead::maintenance", "{}", message),
            Level::DEBUG => tracing::debug!(target: "stormlead::maintenance", "{}", message),
            _ => tracing::trace!(target: "stormlead::maintenance", "{}", message),
        }

        if !self.to_file {
            return;
        }

        let now = Utc::now();
        let path = self.file_for(now);
        if let Err(e) = append_line(&path, &Self::format_line(now, level, message)).await {
            tracing::warn!(
                error = %e,
                path = %path.display(),
                "Failed to write maintenance log file"
            );
        }
    }
}

async fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(line.as_bytes()).await?;
    file.flush().await
}
