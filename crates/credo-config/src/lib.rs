//! Configuration primitives for credo nodes.
//!
//! This crate parses the TOML-based `~/.credo/config.toml` (and project-specific
//! variants) so that every binary resolves the same mesh parameters: where the
//! belief store listens, how fast nodes poll, and how large a datagram they
//! accept.

use std::fs;
use std::path::{Path, PathBuf};

use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

pub(crate) type Result<T> = std::result::Result<T, ConfigError>;

/// Application configuration loaded from TOML files.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CredoConfig {
    /// Poll-loop and addressing knobs shared by every node.
    pub node: NodeConfig,
}

/// Per-node mesh parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Where belief commits and snapshot polls are sent.
    pub bls_sba: u16,

    /// Sleep between poll-loop passes, in microseconds.
    pub poll_interval_us: u64,

    /// Datagram receive buffer size in bytes.
    pub recv_buffer_bytes: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            bls_sba: 4000,
            poll_interval_us: 1_000,
            recv_buffer_bytes: 65_536,
        }
    }
}

impl CredoConfig {
    /// Loads configuration from the given path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
        toml::from_str::<CredoConfig>(&contents).map_err(ConfigError::Parse)
    }

    /// Returns the default configuration path (`$HOME/.credo/config.toml`).
    pub fn default_path() -> Result<PathBuf> {
        let home = home_dir().ok_or(ConfigError::HomeDirMissing)?;
        Ok(home.join(".credo").join("config.toml"))
    }

    /// Load configuration from the default location.
    pub fn load_default() -> Result<Self> {
        let path = Self::default_path()?;
        Self::from_file(path)
    }

    /// Load configuration for the current working directory, falling back to the
    /// global config when no project-level file exists.
    pub fn load_scoped() -> Result<Self> {
        if let Some(path) = project_config_path() {
            return Self::from_file(path);
        }
        Self::load_default()
    }
}

fn project_config_path() -> Option<PathBuf> {
    let cwd = env::current_dir().ok()?;
    for ancestor in cwd.ancestors() {
        let candidate = ancestor.join(".credo").join("config.toml");
        if candidate.exists() {
            return Some(candidate);
        }
    }
    None
}

/// Errors that can occur while parsing credo configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO failure when reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Unable to determine home directory for default config path")]
    HomeDirMissing,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn deserialize_basic_config() {
        let toml = r#"
            [node]
            bls_sba = 4400
            poll_interval_us = 250
        "#;

        let config: CredoConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.node.bls_sba, 4400);
        assert_eq!(config.node.poll_interval_us, 250);
        // Unset keys keep their defaults.
        assert_eq!(config.node.recv_buffer_bytes, 65_536);
    }

    #[test]
    fn empty_config_is_all_defaults() {
        let config: CredoConfig = toml::from_str("").unwrap();
        assert_eq!(config.node.bls_sba, 4000);
        assert_eq!(config.node.poll_interval_us, 1_000);
    }

    #[test]
    fn from_file_reads_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[node]\nbls_sba = 4100\n").unwrap();

        let config = CredoConfig::from_file(&path).unwrap();
        assert_eq!(config.node.bls_sba, 4100);

        let missing = CredoConfig::from_file(dir.path().join("absent.toml"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }

    #[test]
    fn default_path_lands_in_dot_credo() {
        let path = CredoConfig::default_path().unwrap();
        assert!(path.ends_with(".credo/config.toml"));
    }

    #[test]
    fn load_default_reads_the_home_config() {
        let home = tempfile::tempdir().unwrap();
        fs::create_dir_all(home.path().join(".credo")).unwrap();
        fs::write(
            home.path().join(".credo").join("config.toml"),
            "[node]\npoll_interval_us = 500\n",
        )
        .unwrap();

        unsafe {
            env::set_var("HOME", home.path());
        }
        let config = CredoConfig::load_default().unwrap();
        assert_eq!(config.node.poll_interval_us, 500);
        // Keys the file leaves out still default.
        assert_eq!(config.node.bls_sba, 4000);
    }

    #[test]
    fn load_scoped_finds_ancestor_config() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("workspace").join("member");
        fs::create_dir_all(&nested).unwrap();
        fs::create_dir_all(dir.path().join(".credo")).unwrap();
        fs::write(
            dir.path().join(".credo").join("config.toml"),
            "[node]\nbls_sba = 4800\n",
        )
        .unwrap();

        let previous = env::current_dir().unwrap();
        env::set_current_dir(&nested).unwrap();
        let config = CredoConfig::load_scoped();
        env::set_current_dir(previous).unwrap();

        assert_eq!(config.unwrap().node.bls_sba, 4800);
    }
}
