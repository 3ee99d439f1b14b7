/*!
 * Configuration types for minimalgap
 */

use crate::error::{MinimalgapError, Result};
use crate::protocol::s3::{ObjectRef, TransferConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Bucket used when `BUCKET` is not set
pub const DEFAULT_BUCKET: &str = "aws.minimalgap.com";

/// Administrative sender of transactional email
pub const DEFAULT_SENDER: &str = "me@example.com";

/// Directory holding the round-trip files
pub const DEFAULT_OUT_DIR: &str = "out";

pub const UPLOAD_FILE_NAME: &str = "upload.txt";
pub const DOWNLOAD_FILE_NAME: &str = "download.txt";

/// Content written to the upload file before the round trip
pub const ROUND_TRIP_CONTENT: &[u8] = b"ok";

pub const ENV_BUCKET: &str = "BUCKET";
pub const ENV_REGION: &str = "AWS_DEFAULT_REGION";
pub const ENV_PROFILE: &str = "AWS_PROFILE";
pub const ENV_CREDENTIALS_FILE: &str = "AWS_SHARED_CREDENTIALS_FILE";
pub const ENV_CONFIG_FILE: &str = "AWS_CONFIG_FILE";
pub const ENV_SENDER: &str = "MAIL_SENDER";

/// Directory holding the fallback credential files, next to the crate sources
pub fn default_secrets_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("secrets")
        .join("aws")
}

/// Process configuration
///
/// Layered as defaults, then an optional TOML file, then environment
/// variables; the CLI applies its own flags last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Target bucket
    pub bucket: String,

    /// Explicit region; falls back to the credential file, then `eu-west-1`
    pub region: Option<String>,

    /// Directory for the upload and download files
    pub out_dir: PathBuf,

    /// Shared credentials file (INI)
    pub credentials_file: PathBuf,

    /// Shared config file (INI), or a combined JSON file when it ends in `.json`
    pub config_file: PathBuf,

    /// Profile to read from the shared files
    pub profile: Option<String>,

    /// Sender address for transactional email
    pub sender: String,

    /// Upload/download tuning
    pub transfer: TransferConfig,

    /// Log level for diagnostic output
    pub log_level: LogLevel,

    /// Log file path (None = stderr)
    pub log_file: Option<PathBuf>,

    /// Enable verbose logging (shorthand for log_level = debug)
    pub verbose: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let secrets = default_secrets_dir();
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
            region: None,
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            credentials_file: secrets.join("credentials"),
            config_file: secrets.join("config"),
            profile: None,
            sender: DEFAULT_SENDER.to_string(),
            transfer: TransferConfig::default(),
            log_level: LogLevel::default(),
            log_file: None,
            verbose: false,
        }
    }
}

impl Settings {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            MinimalgapError::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        toml::from_str(&contents).map_err(|e| {
            MinimalgapError::Config(format!("Invalid config file {}: {}", path.display(), e))
        })
    }

    /// Defaults, then `config_path` if given, then the process environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut settings = match config_path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_env(&|name| std::env::var(name).ok());
        Ok(settings)
    }

    /// Override fields from environment variables found through `lookup`
    pub fn apply_env(&mut self, lookup: &dyn Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(bucket) = non_empty(ENV_BUCKET) {
            self.bucket = bucket;
        }
        if let Some(region) = non_empty(ENV_REGION) {
            self.region = Some(region);
        }
        if let Some(profile) = non_empty(ENV_PROFILE) {
            self.profile = Some(profile);
        }
        if let Some(path) = non_empty(ENV_CREDENTIALS_FILE) {
            self.credentials_file = PathBuf::from(path);
        }
        if let Some(path) = non_empty(ENV_CONFIG_FILE) {
            self.config_file = PathBuf::from(path);
        }
        if let Some(sender) = non_empty(ENV_SENDER) {
            self.sender = sender;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        ObjectRef::new(self.bucket.as_str(), UPLOAD_FILE_NAME)
            .map_err(|e| MinimalgapError::Config(e.to_string()))?;
        self.transfer
            .validate()
            .map_err(|e| MinimalgapError::Config(e.to_string()))?;
        if self.sender.is_empty() {
            return Err(MinimalgapError::Config(
                "Sender address cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Local file uploaded by the round trip
    pub fn upload_path(&self) -> PathBuf {
        self.out_dir.join(UPLOAD_FILE_NAME)
    }

    /// Local file the round trip downloads into
    pub fn download_path(&self) -> PathBuf {
        self.out_dir.join(DOWNLOAD_FILE_NAME)
    }

    /// Object key for the round trip: the upload path, verbatim
    pub fn object_key(&self) -> String {
        self.upload_path().to_string_lossy().into_owned()
    }
}

/// Log level options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only errors
    Error,

    /// Warnings and errors
    Warn,

    /// Info, warnings, and errors
    #[default]
    Info,

    /// Debug and above
    Debug,

    /// All messages including traces
    Trace,
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}
