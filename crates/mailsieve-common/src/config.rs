//! Configuration for MailSieve

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Proxy (local listener) configuration
    #[serde(default)]
    pub proxy: ProxyConfig,

    /// Upstream POP3 server configuration
    pub upstream: UpstreamConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Local listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Listen address and port. Port 115 is intentionally non-standard so
    /// the real POP3 server can keep 110 and the mail client is pointed
    /// here instead.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Server name for the greeting
    #[serde(default = "default_server_name")]
    pub server_name: String,
}

fn default_bind() -> String {
    "127.0.0.1:115".to_string()
}

fn default_server_name() -> String {
    "MailSieve".to_string()
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            server_name: default_server_name(),
        }
    }
}

/// Upstream POP3 server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Real POP3 server host name
    pub host: String,

    /// Real POP3 server port
    #[serde(default = "default_upstream_port")]
    pub port: u16,
}

fn default_upstream_port() -> u16 {
    110
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log filter directive, e.g. "info" or "info,mailsieve=debug"
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "info,mailsieve=debug".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::Error::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> crate::Result<Self> {
        let paths = [
            std::path::PathBuf::from("./mailsieve.toml"),
            std::path::PathBuf::from("./config.toml"),
            std::path::PathBuf::from("/etc/mailsieve/config.toml"),
        ];

        for path in paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(crate::Error::Config(
            "No configuration file found".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let proxy = ProxyConfig::default();
        assert_eq!(proxy.bind, "127.0.0.1:115");
        assert_eq!(proxy.server_name, "MailSieve");

        let logging = LoggingConfig::default();
        assert_eq!(logging.filter, "info,mailsieve=debug");
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[proxy]
bind = "127.0.0.1:1115"

[upstream]
host = "pop.example.com"
"#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.proxy.bind, "127.0.0.1:1115");
        assert_eq!(config.proxy.server_name, "MailSieve");
        assert_eq!(config.upstream.host, "pop.example.com");
        assert_eq!(config.upstream.port, 110);
    }
}
