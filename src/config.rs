use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};

use crate::error::{CookieInjectorError, ConfigInvalidSnafu};

fn default_cookie_dir() -> PathBuf {
    std::env::var("COOKIE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/cookies"))
}

fn default_config_path() -> PathBuf {
    std::env::var("CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/config/sites.yaml"))
}

/// Authentication strategy for a site. `Oauth` is accepted for forward
/// compatibility but no login routine currently implements it.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    Credentials,
    Oauth,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    #[serde(rename = "type")]
    pub auth_type: AuthType,
    #[serde(default)]
    pub username_env: Option<String>,
    #[serde(default)]
    pub password_env: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    pub domain: String,
    pub login_url: url::Url,
    pub auth: AuthConfig,
    /// Advisory only. The scheduler's adaptive logic (see `scheduler.rs`)
    /// ignores this value entirely; it exists for operator documentation.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: String,
}

fn default_refresh_interval() -> String {
    "12h".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub sites: Vec<SiteConfig>,
    #[serde(default = "default_cookie_dir")]
    pub cookie_dir: PathBuf,
    #[serde(default)]
    pub ntfy_url: Option<String>,
    #[serde(default)]
    pub healthcheck_url: Option<String>,
}

impl Config {
    fn validate(self) -> Result<Self, CookieInjectorError> {
        if self.sites.is_empty() {
            return ConfigInvalidSnafu {
                msg: "config must define at least one site".to_string(),
            }
            .fail();
        }
        Ok(self)
    }
}

/// Load and validate configuration from a YAML file, layering environment
/// variable overrides (`COOKIE_DIR`, `NTFY_URL`, `HEALTHCHECK_URL`) on top.
pub fn load_config(path: Option<&Path>) -> Result<Config, CookieInjectorError> {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);

    if !config_path.exists() {
        return ConfigInvalidSnafu {
            msg: format!("config file not found: {}", config_path.display()),
        }
        .fail();
    }

    let config: Config = Figment::new()
        .merge(Yaml::file(&config_path))
        .merge(
            Env::raw()
                .only(&["COOKIE_DIR", "NTFY_URL", "HEALTHCHECK_URL"])
                .map(|key| key.to_lowercase()),
        )
        .extract()
        .map_err(|e| {
            ConfigInvalidSnafu {
                msg: format!("failed to parse {}: {e}", config_path.display()),
            }
            .build()
        })?;

    let config = config.validate()?;
    tracing::info!(
        path = %config_path.display(),
        sites = ?config.sites.iter().map(|s| s.domain.as_str()).collect::<Vec<_>>(),
        "config_loaded"
    );
    Ok(config)
}
