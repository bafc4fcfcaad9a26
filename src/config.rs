use anyhow::{anyhow, Context, Result};
use log::info;
use serde::Deserialize;
use std::{
    env,
    net::SocketAddr,
    path::{Path, PathBuf},
    time::Duration,
};
use tokio::fs;
use warp::http::{
    uri::{Authority, Scheme},
    HeaderValue,
};

const DEFAULT_CONFIG: &str = "labshield.toml";

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bind: SocketAddr,
    pub data_dir: PathBuf,
    pub admin_password: Option<String>,
    pub cors_origin: Option<String>,
    pub rate_limit: RateLimitConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub window_secs: u64,
    pub max_attempts: u32,
    pub sweep_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            bind: ([0, 0, 0, 0], 3000).into(),
            data_dir: PathBuf::from("./"),
            admin_password: None,
            cors_origin: None,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> RateLimitConfig {
        RateLimitConfig {
            window_secs: 15 * 60,
            max_attempts: 5,
            sweep_interval_secs: 60,
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Config {
    /// Reads the optional TOML file named by `CONFIG` (or `labshield.toml`)
    /// and applies environment overrides on top.
    pub async fn load() -> Result<Config> {
        let path = env::var("CONFIG").unwrap_or_else(|_err| DEFAULT_CONFIG.into());

        let mut config = if Path::new(&path).exists() {
            let contents = fs::read_to_string(&path).await?;
            info!("Read configuration from {}", path);
            Config::from_toml(&contents).with_context(|| format!("invalid config in {}", path))?
        } else {
            Config::default()
        };

        config.apply_env(|key| env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Config> {
        let config: Config = toml::from_str(contents)?;
        Ok(config)
    }

    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(bind) = var("BIND") {
            self.bind = bind.parse::<SocketAddr>().context("BIND is not a socket address")?;
        } else if let Some(port) = var("PORT") {
            let port = port.parse::<u16>().context("PORT is not a port number")?;
            self.bind.set_port(port);
        }

        if let Some(data_dir) = var("DATA_DIR") {
            self.data_dir = data_dir.into();
        }

        if let Some(password) = var("ADMIN_PASSWORD") {
            self.admin_password = Some(password);
        }

        if let Some(origin) = var("CORS_ORIGIN") {
            self.cors_origin = Some(origin);
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.rate_limit.window_secs == 0 {
            return Err(anyhow!("rate_limit.window_secs must be positive"));
        }

        if self.rate_limit.max_attempts == 0 {
            return Err(anyhow!("rate_limit.max_attempts must be positive"));
        }

        if self.rate_limit.sweep_interval_secs == 0 {
            return Err(anyhow!("rate_limit.sweep_interval_secs must be positive"));
        }

        if matches!(&self.admin_password, Some(password) if password.is_empty()) {
            return Err(anyhow!("admin_password must not be empty"));
        }

        if let Some(origin) = &self.cors_origin {
            validate_origin(origin)
                .with_context(|| format!("CORS_ORIGIN {:?} is not a valid origin", origin))?;
        }

        Ok(())
    }
}

/// Accepts `scheme://host[:port]`, the form the CORS filter parses.
fn validate_origin(origin: &str) -> Result<()> {
    let mut parts = origin.splitn(2, "://");
    let scheme = parts.next().unwrap_or_default();
    let authority = parts
        .next()
        .ok_or_else(|| anyhow!("missing scheme"))?;

    if scheme.is_empty() {
        return Err(anyhow!("missing scheme"));
    }

    HeaderValue::from_str(origin)?;
    scheme.parse::<Scheme>()?;
    let authority = authority.parse::<Authority>()?;

    if authority.host().is_empty() || authority.as_str().contains('@') {
        return Err(anyhow!("expected scheme://host[:port]"));
    }

    Ok(())
}
