use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::session::{
    GuidanceLevel, MAX_INTERVENTION_THRESHOLD, MIN_INTERVENTION_THRESHOLD, Preferences,
};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_MAX_UPLOAD_MB: u64 = 50;
pub const DEFAULT_EXTRACTION_TIMEOUT_SECS: u64 = 60;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub server: Option<ServerConfig>,
    pub extraction: Option<ExtractionConfig>,
    pub reading: Option<ReadingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub allowed_origins: Option<Vec<String>>,
    pub max_upload_mb: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Seconds before an extraction is abandoned. `0` disables the limit.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReadingConfig {
    pub intervention_threshold_secs: Option<u64>,
    /// `light`, `medium` or `heavy`.
    pub guidance: Option<GuidanceLevel>,
}

/// Platform config directory path: `<config_dir>/focusflow/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("focusflow").join("config.toml"))
}

/// Load config by cascading CWD `.focusflow.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".focusflow.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        server: Some(ServerConfig {
            host: overlay
                .server
                .as_ref()
                .and_then(|s| s.host.clone())
                .or_else(|| base.server.as_ref().and_then(|s| s.host.clone())),
            port: overlay
                .server
                .as_ref()
                .and_then(|s| s.port)
                .or_else(|| base.server.as_ref().and_then(|s| s.port)),
            allowed_origins: overlay
                .server
                .as_ref()
                .and_then(|s| s.allowed_origins.clone())
                .or_else(|| base.server.as_ref().and_then(|s| s.allowed_origins.clone())),
            max_upload_mb: overlay
                .server
                .as_ref()
                .and_then(|s| s.max_upload_mb)
                .or_else(|| base.server.as_ref().and_then(|s| s.max_upload_mb)),
        }),
        extraction: Some(ExtractionConfig {
            timeout_secs: overlay
                .extraction
                .as_ref()
                .and_then(|e| e.timeout_secs)
                .or_else(|| base.extraction.as_ref().and_then(|e| e.timeout_secs)),
        }),
        reading: Some(ReadingConfig {
            intervention_threshold_secs: overlay
                .reading
                .as_ref()
                .and_then(|r| r.intervention_threshold_secs)
                .or_else(|| {
                    base.reading
                        .as_ref()
                        .and_then(|r| r.intervention_threshold_secs)
                }),
            guidance: overlay
                .reading
                .as_ref()
                .and_then(|r| r.guidance)
                .or_else(|| base.reading.as_ref().and_then(|r| r.guidance)),
        }),
    }
}

/// Fully resolved settings: environment > config file > defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
    pub extraction_timeout: Option<Duration>,
    pub preferences: Preferences,
}

impl Settings {
    /// Resolve settings from a loaded config file and an environment lookup.
    ///
    /// Environment values that fail to parse are ignored.
    pub fn resolve(file: &ConfigFile, env: impl Fn(&str) -> Option<String>) -> Self {
        let server = file.server.clone().unwrap_or_default();

        let host = env("FOCUSFLOW_HOST")
            .or(server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = env("FOCUSFLOW_PORT")
            .and_then(|v| v.parse().ok())
            .or(server.port)
            .unwrap_or(DEFAULT_PORT);
        let allowed_origins = env("FOCUSFLOW_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .or(server.allowed_origins)
            .unwrap_or_else(|| vec![DEFAULT_ALLOWED_ORIGIN.to_string()]);
        let max_upload_mb = env("FOCUSFLOW_MAX_UPLOAD_MB")
            .and_then(|v| v.parse().ok())
            .or(server.max_upload_mb)
            .unwrap_or(DEFAULT_MAX_UPLOAD_MB);

        let timeout_secs = env("FOCUSFLOW_EXTRACTION_TIMEOUT")
            .and_then(|v| v.parse().ok())
            .or_else(|| file.extraction.as_ref().and_then(|e| e.timeout_secs))
            .unwrap_or(DEFAULT_EXTRACTION_TIMEOUT_SECS);
        let extraction_timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));

        let reading = file.reading.clone().unwrap_or_default();
        let defaults = Preferences::default();
        let preferences = Preferences {
            intervention_threshold: reading
                .intervention_threshold_secs
                .map(clamp_threshold)
                .unwrap_or(defaults.intervention_threshold),
            guidance: reading.guidance.unwrap_or(defaults.guidance),
        };

        Settings {
            host,
            port,
            allowed_origins,
            max_upload_bytes: usize::try_from(max_upload_mb.saturating_mul(1024 * 1024))
                .unwrap_or(usize::MAX),
            extraction_timeout,
            preferences,
        }
    }
}

/// Bring a configured pause threshold into the allowed range.
fn clamp_threshold(secs: u64) -> Duration {
    let requested = Duration::from_secs(secs);
    let threshold = requested.clamp(MIN_INTERVENTION_THRESHOLD, MAX_INTERVENTION_THRESHOLD);
    if threshold != requested {
        tracing::warn!(
            requested_secs = secs,
            used_secs = threshold.as_secs(),
            "reading.intervention_threshold_secs out of range, clamping"
        );
    }
    threshold
}

impl Default for Settings {
    fn default() -> Self {
        Self::resolve(&ConfigFile::default(), |_| None)
    }
}
