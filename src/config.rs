//! Server configuration
//!
//! Settings come from an optional TOML file, with CLI flags layered on
//! top by main.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

/// On-disk configuration, every field optional
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub bind: Option<SocketAddr>,
    pub static_dir: Option<PathBuf>,
    pub cors_origins: Option<Vec<String>>,
    pub update_interval_secs: Option<u64>,
    pub tail_lines: Option<i64>,
}

impl ConfigFile {
    /// Read a config file, treating a missing file as empty
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .context(format!("Failed to parse config file {}", path.display()))
    }
}

/// Effective server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub static_dir: Option<PathBuf>,
    pub cors_origins: Vec<String>,
    pub update_interval: Duration,
    pub tail_lines: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 3001)),
            static_dir: None,
            cors_origins: Vec::new(),
            update_interval: Duration::from_secs(5),
            tail_lines: 100,
        }
    }
}

impl ServerConfig {
    /// Layer file values over the defaults
    pub fn from_file(file: ConfigFile) -> Self {
        let mut config = Self::default();
        if let Some(bind) = file.bind {
            config.bind = bind;
        }
        if let Some(dir) = file.static_dir {
            config.static_dir = Some(dir);
        }
        if let Some(origins) = file.cors_origins {
            config.cors_origins = origins;
        }
        if let Some(secs) = file.update_interval_secs {
            config.update_interval = Duration::from_secs(secs);
        }
        if let Some(lines) = file.tail_lines {
            config.tail_lines = lines;
        }
        config
    }

    pub fn validate(&self) -> Result<()> {
        // A zero period would make the update ticker panic
        ensure!(
            !self.update_interval.is_zero(),
            "update interval must be at least one second"
        );
        ensure!(self.tail_lines >= 0, "tail lines cannot be negative");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_yields_defaults() {
        let file = ConfigFile::load(Path::new("/no/such/place/kubedeck.toml")).unwrap();
        let config = ServerConfig::from_file(file);
        assert_eq!(config.bind.port(), 3001);
        assert_eq!(config.update_interval, Duration::from_secs(5));
        assert_eq!(config.tail_lines, 100);
        assert!(config.static_dir.is_none());
    }

    #[test]
    fn test_file_values_override_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "bind = \"127.0.0.1:8080\"\n\
             update_interval_secs = 10\n\
             tail_lines = 500\n\
             cors_origins = [\"http://localhost:3000\"]"
        )
        .unwrap();

        let config = ServerConfig::from_file(ConfigFile::load(file.path()).unwrap());
        assert_eq!(config.bind.to_string(), "127.0.0.1:8080");
        assert_eq!(config.update_interval, Duration::from_secs(10));
        assert_eq!(config.tail_lines, 500);
        assert_eq!(config.cors_origins, vec!["http://localhost:3000"]);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bnid = \"127.0.0.1:8080\"").unwrap();
        assert!(ConfigFile::load(file.path()).is_err());
    }

    #[test]
    fn test_zero_interval_fails_validation() {
        let config = ServerConfig {
            update_interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
