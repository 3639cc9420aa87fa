use serde::Deserialize;

use crate::rate::TimeUnit;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub feed: FeedConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Snapshots kept per subscription; older ones are evicted.
    #[serde(default = "default_window_capacity")]
    pub window_capacity: usize,
    /// Time unit every derived rate is expressed per.
    #[serde(default)]
    pub rate_unit: TimeUnit,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window_capacity: default_window_capacity(),
            rate_unit: TimeUnit::default(),
        }
    }
}

fn default_window_capacity() -> usize {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Buffered events per subscription before the Docker stream is back-pressured.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
        }
    }
}

fn default_channel_capacity() -> usize {
    32
}

fn default_reconnect_delay_ms() -> u64 {
    5000
}

impl AppConfig {
    /// Reads `CONFIG_FILE` (default `config.toml`), then applies `HOST` / `PORT` overrides.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&s)?;
        let config = config.with_overrides(
            std::env::var("HOST").ok().as_deref(),
            std::env::var("PORT").ok().as_deref(),
        )?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Host/port from the environment take precedence over the file.
    pub fn with_overrides(mut self, host: Option<&str>, port: Option<&str>) -> anyhow::Result<Self> {
        if let Some(host) = host {
            self.server.host = host.to_string();
        }
        if let Some(port) = port {
            self.server.port = port
                .parse()
                .map_err(|e| anyhow::anyhow!("PORT must be a port number, got {:?}: {}", port, e))?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(!self.server.host.is_empty(), "server.host must be non-empty");
        anyhow::ensure!(
            self.pipeline.window_capacity > 0,
            "pipeline.window_capacity must be > 0, got {}",
            self.pipeline.window_capacity
        );
        anyhow::ensure!(
            self.feed.channel_capacity > 0,
            "feed.channel_capacity must be > 0, got {}",
            self.feed.channel_capacity
        );
        anyhow::ensure!(
            self.feed.reconnect_delay_ms > 0,
            "feed.reconnect_delay_ms must be > 0, got {}",
            self.feed.reconnect_delay_ms
        );
        Ok(())
    }
}
