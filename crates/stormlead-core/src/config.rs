//! Configuration module
//!
//! Settings for the HTTP server, file storage, image optimization, backups, logging and
//! the (declared but mostly dormant) security, email and notification integrations.
//!
//! A [`Config`] is built once at startup with [`Config::from_env`] and handed to each
//! component by value or reference; nothing re-reads the environment afterwards.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

// Common constants
const DEFAULT_PORT: u16 = 8080;
const MAX_FILE_SIZE_MB: usize = 10;
const MAX_FILES: usize = 10;
const IMAGE_QUALITY: u8 = 85;
const THUMBNAIL_SIZE: u32 = 300;
const IMAGE_MAX_WIDTH: u32 = 1920;
const IMAGE_MAX_HEIGHT: u32 = 1080;
const BACKUP_INTERVAL_HOURS: u64 = 24;
const MAX_BACKUP_AGE_DAYS: u32 = 30;
const MAX_BACKUP_COUNT: usize = 10;
const MAX_LOG_AGE_DAYS: u32 = 7;
const RATE_LIMIT_WINDOW_MINUTES: u64 = 15;
const RATE_LIMIT_MAX: u32 = 100;
const SMTP_PORT: u16 = 587;

const IMAGE_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/gif"];
const DOCUMENT_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "text/plain",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];
const IMAGE_OUTPUT_FORMATS: &[&str] = &["webp", "jpeg", "png"];

/// Lowercase an output format name and fold the `jpg` alias into `jpeg`.
fn canonical_image_format(name: &str) -> String {
    match name.trim().to_lowercase().as_str() {
        "jpg" => "jpeg".to_string(),
        other => other.to_string(),
    }
}

/// HTTP server settings
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub environment: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            host: "0.0.0.0".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Locations of everything the system keeps on disk, relative to the working directory
/// unless given as absolute paths.
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub leads_file: PathBuf,
    pub public_dir: PathBuf,
    pub uploads_dir: PathBuf,
    pub images_dir: PathBuf,
    pub backups_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub temp_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            leads_file: PathBuf::from("leads.json"),
            public_dir: PathBuf::from("public"),
            uploads_dir: PathBuf::from("public/uploads"),
            images_dir: PathBuf::from("public/images"),
            backups_dir: PathBuf::from("backups"),
            logs_dir: PathBuf::from("logs"),
            temp_dir: PathBuf::from("temp"),
        }
    }
}

impl StorageConfig {
    /// Default layout placed under `root` instead of the working directory.
    pub fn rooted_at(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let defaults = Self::default();
        Self {
            leads_file: root.join(defaults.leads_file),
            public_dir: root.join(defaults.public_dir),
            uploads_dir: root.join(defaults.uploads_dir),
            images_dir: root.join(defaults.images_dir),
            backups_dir: root.join(defaults.backups_dir),
            logs_dir: root.join(defaults.logs_dir),
            temp_dir: root.join(defaults.temp_dir),
        }
    }
}

/// Resolved, absolute storage locations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StoragePaths {
    pub leads_file: PathBuf,
    pub public: PathBuf,
    pub uploads: PathBuf,
    pub images: PathBuf,
    pub backups: PathBuf,
    pub logs: PathBuf,
    pub temp: PathBuf,
}

impl StoragePaths {
    /// Directories the maintenance service keeps alive, in creation order.
    pub fn managed_directories(&self) -> [&Path; 4] {
        [&self.uploads, &self.images, &self.backups, &self.logs]
    }

    /// Output directory for optimized image variants.
    pub fn optimized_images(&self) -> PathBuf {
        self.images.join("optimized")
    }
}

/// Upload limits and accepted MIME types
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadConfig {
    pub max_file_size: usize,
    pub max_files: usize,
    pub allowed_image_types: Vec<String>,
    pub allowed_doc_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE_MB * 1024 * 1024,
            max_files: MAX_FILES,
            allowed_image_types: IMAGE_MIME_TYPES.iter().map(|s| s.to_string()).collect(),
            allowed_doc_types: DOCUMENT_MIME_TYPES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Image optimization settings
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    pub quality: u8,
    pub thumbnail_size: u32,
    pub max_width: u32,
    pub max_height: u32,
    pub formats: Vec<String>,
    pub default_format: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            quality: IMAGE_QUALITY,
            thumbnail_size: THUMBNAIL_SIZE,
            max_width: IMAGE_MAX_WIDTH,
            max_height: IMAGE_MAX_HEIGHT,
            formats: IMAGE_OUTPUT_FORMATS.iter().map(|s| s.to_string()).collect(),
            default_format: "webp".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct BackupConfig {
    pub auto_backup: bool,
    pub backup_interval_hours: u64,
    pub max_backup_age_days: u32,
    /// Declared for operators; retention is age based only.
    pub max_backup_count: usize,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            auto_backup: false,
            backup_interval_hours: BACKUP_INTERVAL_HOURS,
            max_backup_age_days: MAX_BACKUP_AGE_DAYS,
            max_backup_count: MAX_BACKUP_COUNT,
        }
    }
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub max_log_age_days: u32,
    pub log_to_file: bool,
    pub log_to_console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            max_log_age_days: MAX_LOG_AGE_DAYS,
            log_to_file: true,
            log_to_console: true,
        }
    }
}

/// CORS and rate limit settings. The rate limit values are carried for operators and
/// reverse proxies; the server does not enforce them.
#[derive(Clone, Debug)]
pub struct SecurityConfig {
    pub cors_enabled: bool,
    pub cors_origins: Vec<String>,
    pub rate_limit_window_minutes: u64,
    pub rate_limit_max: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            cors_enabled: true,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:8080".to_string(),
            ],
            rate_limit_window_minutes: RATE_LIMIT_WINDOW_MINUTES,
            rate_limit_max: RATE_LIMIT_MAX,
        }
    }
}

#[derive(Clone, Debug)]
pub struct EmailConfig {
    pub enabled: bool,
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_secure: bool,
    pub smtp_user: Option<String>,
    pub smtp_pass: Option<String>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: None,
            smtp_port: SMTP_PORT,
            smtp_secure: false,
            smtp_user: None,
            smtp_pass: None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct NotificationConfig {
    pub new_lead_email: Option<String>,
    pub admin_email: Option<String>,
    pub slack_webhook: Option<String>,
}

/// Application configuration.
#[derive(Clone, Debug, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub upload: UploadConfig,
    pub images: ImageConfig,
    pub backup: BackupConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub email: EmailConfig,
    pub notifications: NotificationConfig,
}

impl Config {
    /// Load configuration from the process environment (and `.env`, when present).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. `from_env` is this function
    /// over `std::env`; tests pass a map instead of mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let flag = |key: &str, default: bool| {
            var(key)
                .and_then(|v| v.trim().to_lowercase().parse::<bool>().ok())
                .unwrap_or(default)
        };
        let path = |key: &str, default: PathBuf| var(key).map(PathBuf::from).unwrap_or(default);

        let environment = var("APP_ENV")
            .or_else(|| var("ENVIRONMENT"))
            .unwrap_or_else(|| "development".to_string());

        let server = ServerConfig {
            port: match var("PORT") {
                Some(port) => port
                    .trim()
                    .parse()
                    .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
                None => DEFAULT_PORT,
            },
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            environment,
        };

        let defaults = StorageConfig::default();
        let storage = StorageConfig {
            leads_file: path("LEADS_FILE", defaults.leads_file),
            public_dir: path("PUBLIC_DIR", defaults.public_dir),
            uploads_dir: path("UPLOADS_DIR", defaults.uploads_dir),
            images_dir: path("IMAGES_DIR", defaults.images_dir),
            backups_dir: path("BACKUPS_DIR", defaults.backups_dir),
            logs_dir: path("LOGS_DIR", defaults.logs_dir),
            temp_dir: path("TEMP_DIR", defaults.temp_dir),
        };

        let upload = UploadConfig {
            max_file_size: var("MAX_FILE_SIZE_MB")
                .and_then(|s| s.trim().parse::<usize>().ok())
                .unwrap_or(MAX_FILE_SIZE_MB)
                .checked_mul(1024 * 1024)
                .ok_or_else(|| anyhow::anyhow!("MAX_FILE_SIZE_MB is too large"))?,
            max_files: var("MAX_FILES")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(MAX_FILES),
            ..UploadConfig::default()
        };

        let image_defaults = ImageConfig::default();
        let images = ImageConfig {
            quality: var("IMAGE_QUALITY")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(IMAGE_QUALITY),
            thumbnail_size: var("THUMBNAIL_SIZE")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(THUMBNAIL_SIZE),
            max_width: var("IMAGE_MAX_WIDTH")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(IMAGE_MAX_WIDTH),
            max_height: var("IMAGE_MAX_HEIGHT")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(IMAGE_MAX_HEIGHT),
            default_format: var("IMAGE_FORMAT")
                .map(|s| canonical_image_format(&s))
                .unwrap_or(image_defaults.default_format),
            formats: image_defaults.formats,
        };

        let backup = BackupConfig {
            auto_backup: flag("AUTO_BACKUP", false),
            backup_interval_hours: var("BACKUP_INTERVAL_HOURS")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(BACKUP_INTERVAL_HOURS),
            max_backup_age_days: var("MAX_BACKUP_AGE_DAYS")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(MAX_BACKUP_AGE_DAYS),
            max_backup_count: var("MAX_BACKUP_COUNT")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(MAX_BACKUP_COUNT),
        };

        let logging = LoggingConfig {
            level: var("LOG_LEVEL")
                .map(|s| s.trim().to_lowercase())
                .unwrap_or_else(|| "info".to_string()),
            max_log_age_days: var("MAX_LOG_AGE_DAYS")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(MAX_LOG_AGE_DAYS),
            log_to_file: flag("LOG_TO_FILE", true),
            log_to_console: flag("LOG_TO_CONSOLE", true),
        };

        let security = SecurityConfig {
            cors_enabled: flag("CORS_ENABLED", true),
            cors_origins: var("CORS_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_else(|| SecurityConfig::default().cors_origins),
            rate_limit_window_minutes: var("RATE_LIMIT_WINDOW_MINUTES")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(RATE_LIMIT_WINDOW_MINUTES),
            rate_limit_max: var("RATE_LIMIT_MAX")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(RATE_LIMIT_MAX),
        };

        let email = EmailConfig {
            enabled: flag("EMAIL_ENABLED", false),
            smtp_host: var("SMTP_HOST"),
            smtp_port: var("SMTP_PORT")
                .and_then(|s| s.trim().parse().ok())
                .filter(|&p| p > 0)
                .unwrap_or(SMTP_PORT),
            smtp_secure: flag("SMTP_SECURE", false),
            smtp_user: var("SMTP_USER"),
            smtp_pass: var("SMTP_PASS"),
        };

        let notifications = NotificationConfig {
            new_lead_email: var("NEW_LEAD_EMAIL"),
            admin_email: var("ADMIN_EMAIL"),
            slack_webhook: var("SLACK_WEBHOOK"),
        };

        let config = Config {
            server,
            storage,
            upload,
            images,
            backup,
            logging,
            security,
            email,
            notifications,
        };

        config.validate()?;
        Ok(config)
    }

    /// Default configuration with every storage location under `root`.
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        Config {
            storage: StorageConfig::rooted_at(root),
            ..Config::default()
        }
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("PORT must be greater than 0"));
        }

        if self.images.quality == 0 || self.images.quality > 100 {
            return Err(anyhow::anyhow!("IMAGE_QUALITY must be between 1 and 100"));
        }

        if self.images.max_width == 0 || self.images.max_height == 0 {
            return Err(anyhow::anyhow!(
                "IMAGE_MAX_WIDTH and IMAGE_MAX_HEIGHT must be greater than 0"
            ));
        }

        let default_format = canonical_image_format(&self.images.default_format);
        if !self
            .images
            .formats
            .iter()
            .any(|f| canonical_image_format(f) == default_format)
        {
            return Err(anyhow::anyhow!(
                "IMAGE_FORMAT must be one of: {}",
                self.images.formats.join(", ")
            ));
        }

        if self.backup.auto_backup && self.backup.backup_interval_hours == 0 {
            return Err(anyhow::anyhow!(
                "BACKUP_INTERVAL_HOURS must be greater than 0 when AUTO_BACKUP is enabled"
            ));
        }

        if self.backup.auto_backup && self.backup_interval().is_none() {
            return Err(anyhow::anyhow!("BACKUP_INTERVAL_HOURS is too large"));
        }

        if self.is_production()
            && self.security.cors_enabled
            && self.security.cors_origins.iter().any(|o| o == "*")
        {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.email.enabled && self.email.smtp_host.is_none() {
            return Err(anyhow::anyhow!(
                "EMAIL_ENABLED=true requires SMTP_HOST to be set"
            ));
        }

        Ok(())
    }

    /// Period between automatic backups, or `None` when the hour count overflows.
    pub fn backup_interval(&self) -> Option<Duration> {
        self.backup
            .backup_interval_hours
            .checked_mul(60 * 60)
            .map(Duration::from_secs)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.server.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Resolve a path against the current working directory.
    pub fn full_path(relative: impl AsRef<Path>) -> PathBuf {
        let relative = relative.as_ref();
        if relative.is_absolute() {
            return relative.to_path_buf();
        }
        match env::current_dir() {
            Ok(cwd) => cwd.join(relative),
            Err(_) => relative.to_path_buf(),
        }
    }

    pub fn storage_paths(&self) -> StoragePaths {
        StoragePaths {
            leads_file: Self::full_path(&self.storage.leads_file),
            public: Self::full_path(&self.storage.public_dir),
            uploads: Self::full_path(&self.storage.uploads_dir),
            images: Self::full_path(&self.storage.images_dir),
            backups: Self::full_path(&self.storage.backups_dir),
            logs: Self::full_path(&self.storage.logs_dir),
            temp: Self::full_path(&self.storage.temp_dir),
        }
    }

    /// Every MIME type accepted for upload, images first.
    pub fn allowed_types(&self) -> Vec<String> {
        self.upload
            .allowed_image_types
            .iter()
            .chain(self.upload.allowed_doc_types.iter())
            .cloned()
            .collect()
    }

    pub fn is_image_type(&self, mime_type: &str) -> bool {
        self.upload
            .allowed_image_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(mime_type))
    }

    pub fn is_document_type(&self, mime_type: &str) -> bool {
        self.upload
            .allowed_doc_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(mime_type))
    }

    pub fn server_port(&self) -> u16 {
        self.server.port
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn environment(&self) -> &str {
        &self.server.environment
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.security.cors_origins
    }
}
