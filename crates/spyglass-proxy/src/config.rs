use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default = "default_backend_port")]
    pub backend_port: u16,
    /// Log every resolved packet at trace level.
    #[serde(default)]
    pub log_packets: bool,
}

fn default_bind() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    25565
}

fn default_backend() -> String {
    "127.0.0.1".into()
}

fn default_backend_port() -> u16 {
    25566
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            backend: default_backend(),
            backend_port: default_backend_port(),
            log_packets: false,
        }
    }
}

impl ProxyConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: ProxyConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::info!("No config file found at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: ProxyConfig = toml::from_str("backend_port = 25570").unwrap();
        assert_eq!(config.bind, "0.0.0.0");
        assert_eq!(config.port, 25565);
        assert_eq!(config.backend_port, 25570);
        assert!(!config.log_packets);
    }
}
