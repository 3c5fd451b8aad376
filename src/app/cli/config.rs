//! Configuration layering
//!
//! Built-in defaults, then the TOML configuration file, then command-line
//! flags. Values are validated as they are applied so an error names the
//! layer it came from.

use crate::core::validation::{
    validate_base_url, validate_non_negative_millis, validate_positive_millis, ValidationError,
};
use crate::dedup::{DedupConfig, DEFAULT_COOLDOWN, DEFAULT_PROCESSING_TIMEOUT};
use crate::sync::{DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_LOCAL_SYNC_DELAY};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::args::Args;

/// Canonical form, as produced by base URL validation
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/";

const APP_DIR_NAME: &str = "Scanlog";
const CONFIG_FILE_NAME: &str = "scanlog.toml";
const STORE_FILE_NAME: &str = "scans.json";

/// Store value selecting the in-memory backend
pub const MEMORY_STORE: &str = "memory";

const KNOWN_KEYS: &[&str] = &[
    "local-only",
    "base-url",
    "cooldown-ms",
    "processing-timeout-ms",
    "local-sync-delay-ms",
    "http-timeout-secs",
    "store",
    "log-level",
    "log-file",
    "log-format",
    "color",
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("The specified configuration file does not exist: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Error reading configuration file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error parsing configuration file {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Invalid value for '{key}' in {origin}: {message}")]
    Invalid {
        key: String,
        origin: String,
        message: String,
    },
}

impl ConfigError {
    fn invalid(key: &str, origin: &str, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            key: key.to_string(),
            origin: origin.to_string(),
            message: message.into(),
        }
    }

    fn from_validation(key: &str, origin: &str, err: ValidationError) -> Self {
        Self::invalid(key, origin, err.message())
    }
}

impl crate::core::error_handling::ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ConfigError::Parse { message, .. } | ConfigError::Invalid { message, .. } => {
                Some(message)
            }
            _ => None,
        }
    }
}

/// Where scans are kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    Memory,
    File(PathBuf),
}

impl StoreLocation {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case(MEMORY_STORE) {
            StoreLocation::Memory
        } else {
            StoreLocation::File(PathBuf::from(value))
        }
    }

    /// `<data_dir>/Scanlog/scans.json`, or `scans.json` in the working directory
    pub fn default_file() -> Self {
        let path = dirs::data_dir()
            .map(|d| d.join(APP_DIR_NAME).join(STORE_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(STORE_FILE_NAME));
        StoreLocation::File(path)
    }
}

/// Fully resolved runtime configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub local_only: bool,
    pub base_url: String,
    pub cooldown: Duration,
    pub processing_timeout: Duration,
    pub local_sync_delay: Duration,
    pub http_timeout: Duration,
    pub store: StoreLocation,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
    pub log_format: Option<String>,
    /// None means decide from the terminal
    pub color: Option<bool>,
    /// Configuration file that was applied, if any
    pub config_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            local_only: true,
            base_url: DEFAULT_BASE_URL.to_string(),
            cooldown: DEFAULT_COOLDOWN,
            processing_timeout: DEFAULT_PROCESSING_TIMEOUT,
            local_sync_delay: DEFAULT_LOCAL_SYNC_DELAY,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            store: StoreLocation::default_file(),
            log_level: None,
            log_file: None,
            log_format: None,
            color: None,
            config_file: None,
        }
    }
}

impl AppConfig {
    /// Defaults, then the config file, then command-line flags
    pub async fn resolve(args: &Args) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some((path, table)) = load_config_file(args.config_file.as_deref()).await? {
            config.apply_toml_values(&table, &path.display().to_string())?;
            config.config_file = Some(path);
        }

        config.apply_args(args)?;
        Ok(config)
    }

    pub fn dedup_config(&self) -> DedupConfig {
        DedupConfig {
            cooldown: self.cooldown,
            processing_timeout: self.processing_timeout,
        }
    }

    /// Apply TOML configuration values; `origin` names the file in errors
    pub fn apply_toml_values(
        &mut self,
        config: &toml::Table,
        origin: &str,
    ) -> Result<(), ConfigError> {
        for key in config.keys() {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                log::warn!("Ignoring unknown configuration key '{}' in {}", key, origin);
            }
        }

        if let Some(value) = config.get("local-only") {
            self.local_only = value
                .as_bool()
                .ok_or_else(|| ConfigError::invalid("local-only", origin, "expected true or false"))?;
        }
        if let Some(value) = config.get("base-url") {
            let url = toml_str(value, "base-url", origin)?;
            self.base_url = validate_base_url(url)
                .map_err(|e| ConfigError::from_validation("base-url", origin, e))?
                .to_string();
        }
        if let Some(value) = config.get("cooldown-ms") {
            let ms = toml_int(value, "cooldown-ms", origin)?;
            self.cooldown = positive_millis("cooldown-ms", ms, origin)?;
        }
        if let Some(value) = config.get("processing-timeout-ms") {
            let ms = toml_int(value, "processing-timeout-ms", origin)?;
            self.processing_timeout = positive_millis("processing-timeout-ms", ms, origin)?;
        }
        if let Some(value) = config.get("local-sync-delay-ms") {
            let ms = toml_int(value, "local-sync-delay-ms", origin)?;
            self.local_sync_delay = non_negative_millis("local-sync-delay-ms", ms, origin)?;
        }
        if let Some(value) = config.get("http-timeout-secs") {
            let secs = toml_int(value, "http-timeout-secs", origin)?;
            self.http_timeout = positive_secs("http-timeout-secs", secs, origin)?;
        }
        if let Some(value) = config.get("store") {
            self.store = StoreLocation::parse(toml_str(value, "store", origin)?);
        }
        if let Some(value) = config.get("log-level") {
            self.log_level = Some(toml_str(value, "log-level", origin)?.to_string());
        }
        if let Some(value) = config.get("log-file") {
            let log_file = toml_str(value, "log-file", origin)?;
            self.log_file = parse_log_file(Path::new(log_file));
        }
        if let Some(value) = config.get("log-format") {
            self.log_format = Some(toml_str(value, "log-format", origin)?.to_string());
        }
        if let Some(value) = config.get("color") {
            self.color = Some(
                value
                    .as_bool()
                    .ok_or_else(|| ConfigError::invalid("color", origin, "expected true or false"))?,
            );
        }

        Ok(())
    }

    /// Apply command-line flags; only flags that were given override
    pub fn apply_args(&mut self, args: &Args) -> Result<(), ConfigError> {
        const ORIGIN: &str = "command line";

        if let Some(local_only) = args.local_only_override() {
            self.local_only = local_only;
        }
        if let Some(url) = &args.base_url {
            self.base_url = validate_base_url(url)
                .map_err(|e| ConfigError::from_validation("base-url", ORIGIN, e))?
                .to_string();
        }
        if let Some(ms) = args.cooldown_ms {
            self.cooldown = positive_millis("cooldown-ms", ms, ORIGIN)?;
        }
        if let Some(ms) = args.processing_timeout_ms {
            self.processing_timeout = positive_millis("processing-timeout-ms", ms, ORIGIN)?;
        }
        if let Some(ms) = args.local_sync_delay_ms {
            self.local_sync_delay = non_negative_millis("local-sync-delay-ms", ms, ORIGIN)?;
        }
        if let Some(secs) = args.http_timeout_secs {
            self.http_timeout = positive_secs("http-timeout-secs", secs as i64, ORIGIN)?;
        }
        if let Some(store) = &args.store {
            self.store = StoreLocation::parse(store);
        }
        if let Some(level) = &args.log_level {
            self.log_level = Some(level.clone());
        }
        if let Some(log_file) = &args.log_file {
            self.log_file = parse_log_file(log_file);
        }
        if let Some(format) = &args.log_format {
            self.log_format = Some(format.clone());
        }
        if let Some(color) = args.color_override() {
            self.color = Some(color);
        }

        Ok(())
    }
}

/// Default configuration file location, whether or not it exists
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Read the configuration file
///
/// An explicitly given file must exist. Without one, the default location
/// is used only if a file is present there.
pub async fn load_config_file(
    explicit: Option<&Path>,
) -> Result<Option<(PathBuf, toml::Table)>, ConfigError> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            path.to_path_buf()
        }
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(None),
        },
    };

    let contents = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
    let table = toml::from_str::<toml::Table>(&contents).map_err(|e| ConfigError::Parse {
        path: path.clone(),
        message: e.to_string(),
    })?;

    log::debug!("Loaded configuration from {}", path.display());
    Ok(Some((path, table)))
}

// Magic values "none" and "-" disable file logging
fn parse_log_file(path: &Path) -> Option<PathBuf> {
    match path.to_str() {
        Some(s) if s.eq_ignore_ascii_case("none") || s == "-" => None,
        _ => Some(path.to_path_buf()),
    }
}

fn toml_str<'a>(value: &'a toml::Value, key: &str, origin: &str) -> Result<&'a str, ConfigError> {
    value
        .as_str()
        .ok_or_else(|| ConfigError::invalid(key, origin, "expected a string"))
}

fn toml_int(value: &toml::Value, key: &str, origin: &str) -> Result<i64, ConfigError> {
    value
        .as_integer()
        .ok_or_else(|| ConfigError::invalid(key, origin, "expected an integer"))
}

fn positive_millis(key: &str, value: i64, origin: &str) -> Result<Duration, ConfigError> {
    validate_positive_millis(key, value)
        .map(Duration::from_millis)
        .map_err(|e| ConfigError::from_validation(key, origin, e))
}

fn non_negative_millis(key: &str, value: i64, origin: &str) -> Result<Duration, ConfigError> {
    validate_non_negative_millis(key, value)
        .map(Duration::from_millis)
        .map_err(|e| ConfigError::from_validation(key, origin, e))
}

fn positive_secs(key: &str, value: i64, origin: &str) -> Result<Duration, ConfigError> {
    validate_positive_millis(key, value)
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::from_validation(key, origin, e))
}
