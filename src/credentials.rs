/*!
 * Credential resolution and the shared AWS SDK configuration
 *
 * Explicit keys in the environment win and are read by the SDK itself;
 * otherwise credentials come from a local file. Either way the result is
 * resolved once and turned into a single `SdkConfig` that every client is
 * built from.
 */

use crate::config::Settings;
use aws_config::meta::region::ProvideRegion;
use aws_config::profile::{ProfileFileCredentialsProvider, ProfileFileRegionProvider};
use aws_config::{BehaviorVersion, SdkConfig};
use aws_credential_types::provider::ProvideCredentials;
use aws_runtime::env_config::file::{EnvConfigFileKind, EnvConfigFiles};
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Region used when neither the environment nor the credential file names one
pub const DEFAULT_REGION: &str = "eu-west-1";

pub const ENV_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const ENV_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";

const DEFAULT_PROFILE: &str = "default";
const FILE_PROVIDER_NAME: &str = "minimalgap-file";

pub type CredentialResult<T> = Result<T, CredentialError>;

/// Failures while loading credentials from the fallback file
#[derive(Error, Debug, Clone)]
pub enum CredentialError {
    #[error("AWS credentials file not found at {}", .0.display())]
    FileMissing(PathBuf),

    #[error("AWS config file {} is malformed: {message}", path.display())]
    Malformed { path: PathBuf, message: String },

    #[error("error configuring AWS SDK from {}: {message}", path.display())]
    Load { path: PathBuf, message: String },
}

/// Where the process credentials came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`, read by the SDK
    Environment,

    /// A single JSON file holding keys and region
    CombinedFile(PathBuf),

    /// INI `credentials` and `config` files
    SharedFiles { credentials: PathBuf, config: PathBuf },
}

/// On-disk layout of the fallback credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileLayout {
    Combined(PathBuf),
    Split { credentials: PathBuf, config: PathBuf },
}

impl FileLayout {
    /// A `.json` config file holds everything; otherwise use the INI pair
    pub fn select(settings: &Settings) -> Self {
        let is_json = settings
            .config_file
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            FileLayout::Combined(settings.config_file.clone())
        } else {
            FileLayout::Split {
                credentials: settings.credentials_file.clone(),
                config: settings.config_file.clone(),
            }
        }
    }
}

/// Outcome of credential resolution
#[derive(Debug, Clone)]
pub struct ResolvedCredentials {
    pub source: CredentialSource,

    /// Keys loaded from a file; `None` when the SDK reads the environment
    pub credentials: Option<Credentials>,

    pub region: String,
}

/// Combined JSON file: `{"accessKeyId", "secretAccessKey", "sessionToken"?, "region"?}`
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CombinedFile {
    access_key_id: String,
    secret_access_key: String,
    #[serde(default)]
    session_token: Option<String>,
    #[serde(default)]
    region: Option<String>,
}

/// Resolve credentials from the process environment or the fallback file
pub async fn resolve(settings: &Settings) -> CredentialResult<ResolvedCredentials> {
    resolve_with(settings, &|name| std::env::var(name).ok()).await
}

/// Resolve credentials, reading environment variables through `lookup`
///
/// The fallback file is only touched when both key variables are absent.
pub async fn resolve_with(
    settings: &Settings,
    lookup: &(dyn Fn(&str) -> Option<String> + Sync),
) -> CredentialResult<ResolvedCredentials> {
    let has_env_keys =
        lookup(ENV_ACCESS_KEY_ID).is_some() || lookup(ENV_SECRET_ACCESS_KEY).is_some();

    if has_env_keys {
        debug!("using credentials from the environment");
        return Ok(ResolvedCredentials {
            source: CredentialSource::Environment,
            credentials: None,
            region: pick_region(settings.region.as_deref(), None),
        });
    }

    let resolved = match FileLayout::select(settings) {
        FileLayout::Combined(path) => load_combined(&path, settings.region.as_deref()).await?,
        FileLayout::Split {
            credentials,
            config,
        } => {
            let profile = settings.profile.as_deref().unwrap_or(DEFAULT_PROFILE);
            load_split(&credentials, &config, profile, settings.region.as_deref()).await?
        }
    };

    info!(source = ?resolved.source, region = %resolved.region, "loaded credentials from file");
    Ok(resolved)
}

fn pick_region(explicit: Option<&str>, from_file: Option<String>) -> String {
    explicit
        .map(str::to_string)
        .or(from_file)
        .unwrap_or_else(|| DEFAULT_REGION.to_string())
}

async fn load_combined(path: &Path, region: Option<&str>) -> CredentialResult<ResolvedCredentials> {
    let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            CredentialError::FileMissing(path.to_path_buf())
        } else {
            CredentialError::Load {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        }
    })?;

    let file: CombinedFile =
        serde_json::from_str(&contents).map_err(|e| CredentialError::Malformed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    if file.access_key_id.is_empty() || file.secret_access_key.is_empty() {
        return Err(CredentialError::Malformed {
            path: path.to_path_buf(),
            message: "accessKeyId and secretAccessKey must not be empty".to_string(),
        });
    }

    Ok(ResolvedCredentials {
        source: CredentialSource::CombinedFile(path.to_path_buf()),
        credentials: Some(Credentials::new(
            file.access_key_id,
            file.secret_access_key,
            file.session_token,
            None,
            FILE_PROVIDER_NAME,
        )),
        region: pick_region(region, file.region),
    })
}

fn profile_files(credentials: &Path, config: &Path) -> EnvConfigFiles {
    EnvConfigFiles::builder()
        .with_file(EnvConfigFileKind::Credentials, credentials)
        .with_file(EnvConfigFileKind::Config, config)
        .build()
}

async fn load_split(
    credentials: &Path,
    config: &Path,
    profile: &str,
    region: Option<&str>,
) -> CredentialResult<ResolvedCredentials> {
    // The SDK treats a missing profile file as empty; surface it instead
    if !tokio::fs::try_exists(credentials).await.unwrap_or(false) {
        return Err(CredentialError::FileMissing(credentials.to_path_buf()));
    }

    let provider = ProfileFileCredentialsProvider::builder()
        .profile_files(profile_files(credentials, config))
        .profile_name(profile)
        .build();

    let loaded = provider
        .provide_credentials()
        .await
        .map_err(|e| CredentialError::Load {
            path: credentials.to_path_buf(),
            message: DisplayErrorContext(&e).to_string(),
        })?;

    let file_region = ProfileFileRegionProvider::builder()
        .profile_files(profile_files(credentials, config))
        .profile_name(profile)
        .build()
        .region()
        .await
        .map(|r| r.to_string());

    Ok(ResolvedCredentials {
        source: CredentialSource::SharedFiles {
            credentials: credentials.to_path_buf(),
            config: config.to_path_buf(),
        },
        credentials: Some(loaded),
        region: pick_region(region, file_region),
    })
}

/// Shared AWS configuration, built once per process
///
/// Clients borrow the inner [`SdkConfig`]; nothing is stored globally.
#[derive(Debug, Clone)]
pub struct AwsContext {
    sdk_config: SdkConfig,
    source: CredentialSource,
}

impl AwsContext {
    /// Build the SDK configuration from resolved credentials
    pub async fn load(resolved: ResolvedCredentials) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(resolved.region));

        if let Some(credentials) = resolved.credentials {
            loader = loader.credentials_provider(credentials);
        }

        Self {
            sdk_config: loader.load().await,
            source: resolved.source,
        }
    }

    pub fn sdk_config(&self) -> &SdkConfig {
        &self.sdk_config
    }

    pub fn source(&self) -> &CredentialSource {
        &self.source
    }

    pub fn region(&self) -> Option<&Region> {
        self.sdk_config.region()
    }
}
