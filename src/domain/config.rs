use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`; every field has a default so
/// the server runs without a config file at all.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub commands: CommandsConfig,
}

/// Transport and bind settings for the MCP server.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_transport")]
    pub transport: Transport,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Sse,
    Stdio,
}

/// Settings for direct CCI command execution.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct CommandsConfig {
    /// Optional deadline for each executed command, in seconds.
    /// Unset means commands may run indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_transport() -> Transport {
    Transport::Sse
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8050
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: default_transport(),
            host: default_host(),
            port: default_port(),
        }
    }
}

impl AppConfig {
    /// Load configuration: YAML file if present, then environment overrides
    /// (`TRANSPORT`, `HOST`, `PORT`, `CCI_TIMEOUT_SECS`).
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_yaml::from_str(&content)?
        } else {
            AppConfig::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(transport) = std::env::var("TRANSPORT") {
            match transport.to_lowercase().as_str() {
                "stdio" => self.server.transport = Transport::Stdio,
                "sse" => self.server.transport = Transport::Sse,
                other => tracing::warn!("ignoring unknown TRANSPORT value '{other}'"),
            }
        }
        if let Ok(host) = std::env::var("HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("PORT")
            && let Ok(port) = port.parse()
        {
            self.server.port = port;
        }
        if let Ok(secs) = std::env::var("CCI_TIMEOUT_SECS")
            && let Ok(secs) = secs.parse()
        {
            self.commands.timeout_secs = Some(secs);
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn command_timeout(&self) -> Option<Duration> {
        self.commands.timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_original_server() {
        let config = AppConfig::default();

        assert_eq!(config.server.transport, Transport::Sse);
        assert_eq!(config.bind_address(), "0.0.0.0:8050");
        assert!(config.command_timeout().is_none());
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = "server:\n  transport: stdio\n  port: 9000\ncommands:\n  timeout_secs: 120\n";
        let config: AppConfig = serde_yaml::from_str(yaml).expect("parse yaml");

        assert_eq!(config.server.transport, Transport::Stdio);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.command_timeout(), Some(Duration::from_secs(120)));
        // host falls back to the default
        assert_eq!(config.server.host, "0.0.0.0");
    }
}
