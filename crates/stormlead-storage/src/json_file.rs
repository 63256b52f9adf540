use crate::traits::{LeadStore, StorageError, StorageResult};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use stormlead_core::{Lead, LEAD_ID_FIELD};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

const BACKUP_PREFIX: &str = "leads-backup-";

/// Lead store backed by a single JSON array file
///
/// Every operation re-reads the file, so edits made by other tools between requests
/// are picked up. Writes from this instance are serialized and land through a
/// sibling temporary file that is renamed over the original.
pub struct JsonFileLeadStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileLeadStore {
    /// Create a store for `path`. Nothing is read or written until first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Backup file name for a given instant: the ISO timestamp with ':' and '.' replaced by '-'.
    pub fn backup_file_name(at: DateTime<Utc>) -> String {
        let stamp = at
            .to_rfc3339_opts(SecondsFormat::Millis, true)
            .replace([':', '.'], "-");
        format!("{}{}.json", BACKUP_PREFIX, stamp)
    }

    /// Stored records as raw JSON values, so entries written by other tools
    /// come back byte-for-byte when the file is rewritten.
    async fn read_leads(&self) -> StorageResult<Vec<Value>> {
        let data = match fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::Io(e)),
        };

        serde_json::from_slice(&data).map_err(|source| StorageError::Corrupt {
            path: self.path.display().to_string(),
            source,
        })
    }

    async fn write_leads(&self, leads: &[Value]) -> StorageResult<()> {
        let data = serde_json::to_vec_pretty(leads)?;
        let tmp_path = self.temp_path();

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let mut file = fs::File::create(&tmp_path).await?;
        file.write_all(&data).await?;
        file.sync_all().await?;
        drop(file);

        if let Err(e) = fs::rename(&tmp_path, &self.path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StorageError::Io(e));
        }

        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "leads.json".to_string());
        self.path.with_file_name(format!(".{}.tmp", file_name))
    }

    /// Next identifier: submission time in milliseconds, bumped past the newest stored id
    /// so two leads in the same millisecond never collide. Records without an integer
    /// `id` are skipped.
    fn next_id(leads: &[Value], now: DateTime<Utc>) -> i64 {
        let now_ms = now.timestamp_millis();
        let newest = leads
            .iter()
            .filter_map(|lead| lead.get(LEAD_ID_FIELD).and_then(Value::as_i64))
            .max();
        match newest {
            Some(last) if last >= now_ms => last + 1,
            _ => now_ms,
        }
    }
}

#[async_trait]
impl LeadStore for JsonFileLeadStore {
    async fn initialize(&self) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;

        if fs::try_exists(&self.path).await? {
            return Ok(());
        }

        self.write_leads(&[]).await?;
        tracing::info!(path = %self.path.display(), "Created empty leads file");
        Ok(())
    }

    async fn append(&self, payload: Map<String, Value>) -> StorageResult<Lead> {
        let _guard = self.write_lock.lock().await;
        let start = std::time::Instant::now();

        let mut leads = self.read_leads().await?;
        let now = Utc::now();
        let lead = Lead::new(payload, Self::next_id(&leads, now), now);

        leads.push(serde_json::to_value(&lead)?);
        self.write_leads(&leads).await?;

        tracing::debug!(
            path = %self.path.display(),
            lead_id = lead.id,
            total_leads = leads.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Lead appended"
        );

        Ok(lead)
    }

    async fn list_all(&self) -> StorageResult<Vec<Value>> {
        self.read_leads().await
    }

    async fn backup(&self, destination_dir: &Path) -> StorageResult<PathBuf> {
        let _guard = self.write_lock.lock().await;

        if !fs::try_exists(&self.path).await? {
            return Err(StorageError::NotFound(self.path.display().to_string()));
        }

        fs::create_dir_all(destination_dir).await?;
        let destination = destination_dir.join(Self::backup_file_name(Utc::now()));
        let size = fs::copy(&self.path, &destination).await?;

        tracing::info!(
            source = %self.path.display(),
            path = %destination.display(),
            size_bytes = size,
            "Lead file backed up"
        );

        Ok(destination)
    }

    fn location(&self) -> &Path {
        &self.path
    }
}
