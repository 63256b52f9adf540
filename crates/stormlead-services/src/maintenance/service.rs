use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use bytes::Bytes;
use stormlead_core::{StoragePaths, StorageStats};
use stormlead_processing::ImageOptimizer;
use stormlead_storage::{
    directory_size, ensure_directories as create_directories, files_modified_before, list_files,
    LeadStore, StorageError,
};
use tokio::fs;
use tokio::time::{interval_at, Instant};

use super::{has_image_extension, MaintenanceLog, MaintenanceReport, MaintenanceSettings};

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Housekeeping over the managed directories and the lead file.
///
/// Public operations never return errors: a failing step is logged at error level and
/// reported as `false`, `None` or `0` so a maintenance run always reaches the end.
pub struct FileMaintenanceService {
    settings: MaintenanceSettings,
    paths: StoragePaths,
    lead_store: Arc<dyn LeadStore>,
    optimizer: Arc<dyn ImageOptimizer>,
    log: MaintenanceLog,
}

impl FileMaintenanceService {
    pub fn new(
        settings: MaintenanceSettings,
        paths: StoragePaths,
        lead_store: Arc<dyn LeadStore>,
        optimizer: Arc<dyn ImageOptimizer>,
    ) -> Self {
        let log = MaintenanceLog::new(paths.logs.clone(), settings.log_to_file);
        Self {
            settings,
            paths,
            lead_store,
            optimizer,
            log,
        }
    }

    pub fn settings(&self) -> &MaintenanceSettings {
        &self.settings
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    pub fn log(&self) -> &MaintenanceLog {
        &self.log
    }

    /// Create uploads, images, backups and logs directories when missing.
    #[tracing::instrument(skip(self), fields(maintenance.step = "ensure_directories"))]
    pub async fn ensure_directories(&self) -> bool {
        for dir in self.paths.managed_directories() {
            match fs::try_exists(dir).await {
                Ok(true) => continue,
                Ok(false) => {}
                Err(e) => {
                    self.log
                        .error(format!("Error creating directories: {}", e))
                        .await;
                    return false;
                }
            }

            if let Err(e) = create_directories(&[dir]).await {
                self.log
                    .error(format!("Error creating directories: {}", e))
                    .await;
                return false;
            }
            self.log
                .info(format!("Created directory: {}", dir.display()))
                .await;
        }
        true
    }

    /// Copy the lead file into the backups directory.
    #[tracing::instrument(skip(self), fields(maintenance.step = "backup"))]
    pub async fn backup_leads(&self) -> Option<PathBuf> {
        match self.lead_store.backup(&self.paths.backups).await {
            Ok(path) => {
                self.log
                    .info(format!("Backup created: {}", file_name(&path)))
                    .await;
                Some(path)
            }
            Err(StorageError::NotFound(_)) => {
                self.log.warn("No leads file found to backup").await;
                None
            }
            Err(e) => {
                self.log.error(format!("Backup failed: {}", e)).await;
                None
            }
        }
    }

    /// Delete backups last modified more than `max_age_days` ago.
    #[tracing::instrument(skip(self), fields(maintenance.step = "cleanup_backups"))]
    pub async fn cleanup_old_backups(&self, max_age_days: u32) -> usize {
        match self
            .delete_files_older_than(&self.paths.backups, max_age_days, "backup")
            .await
        {
            Ok(count) => {
                self.log
                    .info(format!("Cleaned up {} old backups", count))
                    .await;
                count
            }
            Err(e) => {
                self.log
                    .error(format!("Backup cleanup failed: {}", e))
                    .await;
                0
            }
        }
    }

    /// Delete log files last modified more than `max_age_days` ago.
    #[tracing::instrument(skip(self), fields(maintenance.step = "cleanup_logs"))]
    pub async fn cleanup_old_logs(&self, max_age_days: u32) -> usize {
        match self
            .delete_files_older_than(&self.paths.logs, max_age_days, "log file")
            .await
        {
            Ok(count) => {
                self.log
                    .info(format!("Cleaned up {} old log files", count))
                    .await;
                count
            }
            Err(e) => {
                self.log.error(format!("Log cleanup failed: {}", e)).await;
                0
            }
        }
    }

    /// Move image files sitting directly in uploads into the images directory.
    #[tracing::instrument(skip(self), fields(maintenance.step = "organize_images"))]
    pub async fn organize_images(&self) -> usize {
        match self.try_organize_images().await {
            Ok(count) => {
                self.log.info(format!("Organized {} images", count)).await;
                count
            }
            Err(e) => {
                self.log
                    .error(format!("Image organization failed: {}", e))
                    .await;
                0
            }
        }
    }

    /// Write a resized, re-encoded copy of each image into `images/optimized/`.
    #[tracing::instrument(skip(self), fields(maintenance.step = "optimize_images"))]
    pub async fn optimize_images(&self) -> usize {
        match self.try_optimize_images().await {
            Ok(count) => {
                self.log.info(format!("Optimized {} images", count)).await;
                count
            }
            Err(e) => {
                self.log
                    .error(format!("Image optimization failed: {}", e))
                    .await;
                0
            }
        }
    }

    /// Recursive byte counts for each managed directory. Missing directories count as 0.
    #[tracing::instrument(skip(self), fields(maintenance.step = "storage_stats"))]
    pub async fn get_storage_stats(&self) -> Option<StorageStats> {
        match self.try_storage_stats().await {
            Ok(stats) => {
                self.log.info("Storage statistics collected").await;
                Some(stats)
            }
            Err(e) => {
                self.log
                    .error(format!("Error getting storage stats: {}", e))
                    .await;
                None
            }
        }
    }

    /// Run every maintenance step in order and report what each did.
    pub async fn run_maintenance(&self) -> MaintenanceReport {
        self.log.info("Starting maintenance tasks...").await;

        let directories_ready = self.ensure_directories().await;
        let backup_path = self.backup_leads().await;
        let backups_removed = self
            .cleanup_old_backups(self.settings.max_backup_age_days)
            .await;
        let logs_removed = self.cleanup_old_logs(self.settings.max_log_age_days).await;
        let images_organized = self.organize_images().await;
        let images_optimized = self.optimize_images().await;
        let storage = self.get_storage_stats().await;

        if let Some(stats) = storage {
            self.log
                .info(format!(
                    "Maintenance completed. Storage usage: {:.2} MB",
                    stats.total_megabytes()
                ))
                .await;
        }
        self.log.info("All maintenance tasks completed").await;

        MaintenanceReport {
            directories_ready,
            backup_path,
            backups_removed,
            logs_removed,
            images_organized,
            images_optimized,
            storage,
        }
    }

    /// Periodically back up the lead file and apply backup retention.
    ///
    /// The first run happens one `period` after start. Returns a JoinHandle so the
    /// caller can abort the loop on shutdown.
    pub fn start_auto_backup(self: Arc<Self>, period: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut backup_interval = interval_at(Instant::now() + period, period);

            loop {
                backup_interval.tick().await;

                tracing::info!("Starting scheduled lead backup");
                self.backup_leads().await;
                self.cleanup_old_backups(self.settings.max_backup_age_days)
                    .await;
            }
        })
    }

    async fn delete_files_older_than(
        &self,
        dir: &Path,
        max_age_days: u32,
        kind: &str,
    ) -> Result<usize, StorageError> {
        let max_age = Duration::from_secs(u64::from(max_age_days) * SECONDS_PER_DAY);
        let cutoff = SystemTime::now()
            .checked_sub(max_age)
            .unwrap_or(SystemTime::UNIX_EPOCH);

        let mut deleted = 0;
        for path in files_modified_before(dir, cutoff).await? {
            match fs::remove_file(&path).await {
                Ok(()) => {
                    deleted += 1;
                    self.log
                        .info(format!("Deleted old {}: {}", kind, file_name(&path)))
                        .await;
                }
                Err(e) => {
                    self.log
                        .error(format!("Failed to delete {}: {}", path.display(), e))
                        .await;
                }
            }
        }
        Ok(deleted)
    }

    async fn try_organize_images(&self) -> Result<usize, StorageError> {
        let mut moved = 0;
        for entry in list_files(&self.paths.uploads).await? {
            if !has_image_extension(&entry.name) {
                continue;
            }

            let source = self.paths.uploads.join(&entry.name);
            let destination = self.paths.images.join(&entry.name);
            fs::rename(&source, &destination).await?;
            moved += 1;
            self.log
                .info(format!("Moved image: {}", entry.name))
                .await;
        }
        Ok(moved)
    }

    async fn try_optimize_images(&self) -> Result<usize, StorageError> {
        let output_dir = self.paths.optimized_images();
        create_directories(&[&output_dir]).await?;

        let format = self.settings.image_format;
        let mut optimized = 0;

        for entry in list_files(&self.paths.images).await? {
            if !has_image_extension(&entry.name) {
                continue;
            }

            let source = self.paths.images.join(&entry.name);
            let data = Bytes::from(fs::read(&source).await?);

            let encoded = match self
                .optimizer
                .optimize(
                    data,
                    self.settings.image_bounds,
                    self.settings.image_quality,
                    format,
                )
                .await
            {
                Ok(encoded) => encoded,
                Err(e) => {
                    self.log
                        .warn(format!("Skipping {}: {}", entry.name, e))
                        .await;
                    continue;
                }
            };

            let stem = Path::new(&entry.name)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| entry.name.clone());
            let destination = output_dir.join(format!("{}.{}", stem, format.extension()));

            fs::write(&destination, &encoded).await?;
            optimized += 1;
            self.log
                .info(format!("Optimized image: {}", entry.name))
                .await;
        }
        Ok(optimized)
    }

    async fn try_storage_stats(&self) -> Result<StorageStats, StorageError> {
        Ok(StorageStats::new(
            directory_size(&self.paths.uploads).await?,
            directory_size(&self.paths.images).await?,
            directory_size(&self.paths.backups).await?,
            directory_size(&self.paths.logs).await?,
        ))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::{set_file_mtime, FileTime};
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use serde_json::json;
    use std::io::Cursor;
    use stormlead_core::Config;
    use stormlead_processing::{Bounds, OutputFormat, RasterOptimizer};
    use stormlead_storage::JsonFileLeadStore;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        paths: StoragePaths,
        store: Arc<JsonFileLeadStore>,
        service: FileMaintenanceService,
    }

    fn fixture_with(settings: MaintenanceSettings) -> Fixture {
        let dir = TempDir::new().unwrap();
        let paths = Config::with_root(dir.path()).storage_paths();
        let store = Arc::new(JsonFileLeadStore::new(paths.leads_file.clone()));
        let service = FileMaintenanceService::new(
            settings,
            paths.clone(),
            store.clone(),
            Arc::new(RasterOptimizer::new()),
        );
        Fixture {
            _dir: dir,
            paths,
            store,
            service,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(MaintenanceSettings::default())
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([120, 120, 120, 255]),
        ));
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    fn age_file(path: &Path, days: u64) {
        let then = SystemTime::now() - Duration::from_secs(days * SECONDS_PER_DAY);
        set_file_mtime(path, FileTime::from_system_time(then)).unwrap();
    }

    #[tokio::test]
    async fn ensure_directories_twice_leaves_same_layout() {
        let f = fixture();

        assert!(f.service.ensure_directories().await);
        assert!(f.service.ensure_directories().await);

        for dir in f.paths.managed_directories() {
            assert!(dir.is_dir(), "{} missing", dir.display());
        }
    }

    #[tokio::test]
    async fn backup_is_byte_identical_to_lead_file() {
        let f = fixture();
        f.service.ensure_directories().await;
        f.store
            .append(json!({"name": "Jane Doe"}).as_object().unwrap().clone())
            .await
            .unwrap();

        let backup = f.service.backup_leads().await.unwrap();

        assert!(file_name(&backup).starts_with("leads-backup-"));
        assert_eq!(
            std::fs::read(&backup).unwrap(),
            std::fs::read(&f.paths.leads_file).unwrap()
        );
    }

    #[tokio::test]
    async fn backup_without_lead_file_returns_none_and_warns() {
        let f = fixture();
        f.service.ensure_directories().await;

        assert!(f.service.backup_leads().await.is_none());

        let log = std::fs::read_to_string(f.service.log().file_for(chrono::Utc::now())).unwrap();
        assert!(log.contains("WARN: No leads file found to backup"));
    }

    #[tokio::test]
    async fn cleanup_removes_only_backups_past_cutoff() {
        let f = fixture();
        f.service.ensure_directories().await;

        let old = f.paths.backups.join("leads-backup-old.json");
        let recent = f.paths.backups.join("leads-backup-recent.json");
        std::fs::write(&old, "[]").unwrap();
        std::fs::write(&recent, "[]").unwrap();
        age_file(&old, 40);
        age_file(&recent, 5);

        assert_eq!(f.service.cleanup_old_backups(30).await, 1);
        assert!(!old.exists());
        assert!(recent.exists());
    }

    #[tokio::test]
    async fn cleanup_of_empty_or_missing_directory_is_zero() {
        let f = fixture();
        assert_eq!(f.service.cleanup_old_backups(30).await, 0);

        f.service.ensure_directories().await;
        assert_eq!(f.service.cleanup_old_backups(30).await, 0);
    }

    #[tokio::test]
    async fn log_cleanup_uses_its_own_threshold() {
        let f = fixture();
        f.service.ensure_directories().await;

        let stale = f.paths.logs.join("file-manager-2020-01-01.log");
        std::fs::write(&stale, "[old] INFO: x\n").unwrap();
        age_file(&stale, 8);

        assert_eq!(f.service.cleanup_old_logs(7).await, 1);
        assert!(!stale.exists());
    }

    #[tokio::test]
    async fn organize_moves_images_and_leaves_other_files() {
        let f = fixture();
        f.service.ensure_directories().await;
        std::fs::write(f.paths.uploads.join("photo.png"), png_bytes(4, 4)).unwrap();
        std::fs::write(f.paths.uploads.join("ROOF.JPG"), b"jpeg-ish").unwrap();
        std::fs::write(f.paths.uploads.join("notes.txt"), b"hello").unwrap();

        assert_eq!(f.service.organize_images().await, 2);

        assert!(f.paths.images.join("photo.png").exists());
        assert!(f.paths.images.join("ROOF.JPG").exists());
        assert!(!f.paths.uploads.join("photo.png").exists());
        assert!(f.paths.uploads.join("notes.txt").exists());
    }

    #[tokio::test]
    async fn optimize_writes_bounded_variants_and_skips_bad_images() {
        let settings = MaintenanceSettings {
            image_bounds: Bounds::new(100, 100),
            image_format: OutputFormat::WebP,
            ..MaintenanceSettings::default()
        };
        let f = fixture_with(settings);
        f.service.ensure_directories().await;
        std::fs::write(f.paths.images.join("wide.png"), png_bytes(400, 200)).unwrap();
        std::fs::write(f.paths.images.join("broken.jpg"), b"not really a jpeg").unwrap();

        assert_eq!(f.service.optimize_images().await, 1);

        let output = f.paths.optimized_images().join("wide.webp");
        let decoded = image::open(&output).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (100, 50));
        assert!(f.paths.images.join("wide.png").exists());
        assert!(!f.paths.optimized_images().join("broken.webp").exists());
    }

    #[tokio::test]
    async fn storage_stats_sum_categories() {
        let f = fixture_with(MaintenanceSettings {
            log_to_file: false,
            ..MaintenanceSettings::default()
        });
        f.service.ensure_directories().await;
        std::fs::write(f.paths.uploads.join("a.bin"), vec![0u8; 100]).unwrap();
        std::fs::write(f.paths.uploads.join("b.bin"), vec![0u8; 200]).unwrap();

        let stats = f.service.get_storage_stats().await.unwrap();
        assert_eq!(stats.uploads, 300);
        assert_eq!(stats.images, 0);
        assert_eq!(
            stats.total,
            stats.uploads + stats.images + stats.backups + stats.logs
        );
    }

    #[tokio::test]
    async fn storage_stats_are_logged() {
        let f = fixture();
        f.service.ensure_directories().await;

        assert!(f.service.get_storage_stats().await.is_some());

        let log = std::fs::read_to_string(f.service.log().file_for(chrono::Utc::now())).unwrap();
        assert!(log.contains("INFO: Storage statistics collected"));
    }

    #[tokio::test]
    async fn maintenance_run_reports_every_step() {
        let f = fixture();
        f.store.initialize().await.unwrap();
        std::fs::create_dir_all(&f.paths.uploads).unwrap();
        std::fs::write(f.paths.uploads.join("storm.png"), png_bytes(8, 8)).unwrap();

        let report = f.service.run_maintenance().await;

        assert!(report.directories_ready);
        assert!(report.backup_path.is_some());
        assert_eq!(report.backups_removed, 0);
        assert_eq!(report.images_organized, 1);
        assert_eq!(report.images_optimized, 1);
        assert!(report.storage.is_some());

        let log = std::fs::read_to_string(f.service.log().file_for(chrono::Utc::now())).unwrap();
        assert!(log.contains("INFO: Starting maintenance tasks..."));
        assert!(log.contains("Maintenance completed. Storage usage: "));
        assert!(log.contains(" MB\n"));
    }

    #[tokio::test]
    async fn auto_backup_runs_after_each_period() {
        let f = fixture();
        f.service.ensure_directories().await;
        f.store.initialize().await.unwrap();
        let backups = f.paths.backups.clone();

        let service = Arc::new(f.service);
        let handle = service.clone().start_auto_backup(Duration::from_millis(50));

        assert_eq!(std::fs::read_dir(&backups).unwrap().count(), 0);
        tokio::time::sleep(Duration::from_millis(400)).await;
        handle.abort();

        assert!(std::fs::read_dir(&backups).unwrap().count() >= 1);
    }
}
