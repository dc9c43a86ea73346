use std::path::{Path, PathBuf};
use std::time::Duration;

use melkor_core::AppError;
use serde::Deserialize;

pub const GLOBAL_CONFIG_PATH: &str = "/etc/melkor/config.yml";
pub const LOCAL_CONFIG_NAME: &str = "melkor.yml";

/// Runtime configuration for the melkor binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub address: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: String,
    /// Seconds between crawl rounds.
    pub crawl_interval: u64,
    pub aws_region: String,
    /// Owner of the service, e.g. the team running it.
    pub owner: String,
}

/// Keys accepted in the YAML config file. Anything left out keeps its
/// default; unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    address: Option<String>,
    port: Option<u16>,
    loglevel: Option<String>,
    logformat: Option<String>,
    crawl_interval: Option<u64>,
    aws_region: Option<String>,
    owner: Option<String>,
}

impl Config {
    /// Built-in defaults. `owner` comes from `USER` (empty if unset).
    pub fn defaults(env: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            address: "0.0.0.0".to_string(),
            port: 7654,
            log_level: "debug".to_string(),
            log_format: "text".to_string(),
            crawl_interval: 600,
            aws_region: "eu-west-1".to_string(),
            owner: env("USER").unwrap_or_default(),
        }
    }

    /// Load configuration from defaults, then a config file, then `MELKOR_*`
    /// environment variables.
    ///
    /// With no explicit `path`, `melkor.yml` next to the executable and then
    /// `/etc/melkor/config.yml` are tried; finding neither is fine.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        Self::load_with(path, &default_search_paths(), |key| std::env::var(key).ok())
    }

    pub fn load_with(
        path: Option<&Path>,
        search_paths: &[PathBuf],
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let mut config = Self::defaults(&env);

        let file = match path {
            Some(p) if !p.is_file() => {
                return Err(AppError::ConfigError(format!(
                    "Config file '{}' not found",
                    p.display()
                )));
            }
            Some(p) => Some(p.to_path_buf()),
            None => search_paths.iter().find(|p| p.is_file()).cloned(),
        };

        if let Some(file) = file {
            tracing::debug!(path = %file.display(), "Reading config file");
            config.apply_file(&file)?;
        }

        config.apply_env(&env)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_file(&mut self, path: &Path) -> Result<(), AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::ConfigError(format!("Failed to read '{}': {e}", path.display()))
        })?;
        if raw.trim().is_empty() {
            return Ok(());
        }

        let file: FileConfig = serde_yaml::from_str(&raw).map_err(|e| {
            AppError::ConfigError(format!("Invalid config file '{}': {e}", path.display()))
        })?;

        if let Some(v) = file.address {
            self.address = v;
        }
        if let Some(v) = file.port {
            self.port = v;
        }
        if let Some(v) = file.loglevel {
            self.log_level = v;
        }
        if let Some(v) = file.logformat {
            self.log_format = v;
        }
        if let Some(v) = file.crawl_interval {
            self.crawl_interval = v;
        }
        if let Some(v) = file.aws_region {
            self.aws_region = v;
        }
        if let Some(v) = file.owner {
            self.owner = v;
        }
        Ok(())
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<(), AppError> {
        let var = |key: &str| env(key).filter(|v| !v.is_empty());

        if let Some(v) = var("MELKOR_ADDRESS") {
            self.address = v;
        }
        if let Some(raw) = var("MELKOR_PORT") {
            self.port = raw.parse().map_err(|_| {
                AppError::ConfigError(format!(
                    "Invalid MELKOR_PORT '{raw}': must be a port number"
                ))
            })?;
        }
        if let Some(v) = var("MELKOR_LOGLEVEL") {
            self.log_level = v;
        }
        if let Some(v) = var("MELKOR_LOGFORMAT") {
            self.log_format = v;
        }
        if let Some(raw) = var("MELKOR_CRAWLINTERVAL") {
            self.crawl_interval = raw.parse().map_err(|_| {
                AppError::ConfigError(format!(
                    "Invalid MELKOR_CRAWLINTERVAL '{raw}': must be a number of seconds"
                ))
            })?;
        }
        if let Some(v) = var("MELKOR_AWSREGION") {
            self.aws_region = v;
        }
        if let Some(v) = var("MELKOR_OWNER") {
            self.owner = v;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.crawl_interval == 0 {
            return Err(AppError::ConfigError(
                "crawl_interval must be at least 1 second".into(),
            ));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }

    pub fn crawl_interval(&self) -> Duration {
        Duration::from_secs(self.crawl_interval)
    }
}

fn default_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        paths.push(dir.join(LOCAL_CONFIG_NAME));
    }
    paths.push(PathBuf::from(GLOBAL_CONFIG_PATH));
    paths
}
