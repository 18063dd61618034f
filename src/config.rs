//! Configuration for the watcher and server, loaded from `mdwatch.toml`.
//!
//! Every setting is optional: the defaults watch `./content` and serve on
//! `http://127.0.0.1:8000`. CLI flags override the config file. The loaded
//! `Config` is passed explicitly to each component so tests can build one
//! against temporary directories and ephemeral ports.
//!
//! | Section   | Purpose                                   |
//! |-----------|-------------------------------------------|
//! | `[watch]` | Watched directory and source extension    |
//! | `[serve]` | HTTP bind address (interface, port)       |

use crate::cli::Cli;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Name of the output subdirectory under the watched directory.
const OUTPUT_DIR_NAME: &str = "html";

/// Extension given to derived files.
pub const TARGET_EXTENSION: &str = ".html";

/// Root configuration structure representing mdwatch.toml
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Watcher settings
    #[serde(default)]
    pub watch: WatchConfig,

    /// HTTP server settings
    #[serde(default)]
    pub serve: ServeConfig,
}

/// `[watch]` section: what to watch and what counts as a source file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Directory scanned and watched for source files (non-recursive)
    pub dir: PathBuf,

    /// Source file extension, matched as a file-name suffix
    pub extension: String,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("content"),
            extension: ".md".to_string(),
        }
    }
}

/// `[serve]` section: HTTP bind address.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind
    pub interface: IpAddr,

    /// Port number to listen on
    pub port: u16,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8000,
        }
    }
}

impl Config {
    /// Load configuration from the CLI-specified file and apply overrides.
    ///
    /// A missing config file is not an error: defaults apply. A malformed
    /// one is fatal.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = match std::fs::read_to_string(&cli.config) {
            Ok(raw) => toml::from_str(&raw)
                .with_context(|| format!("invalid config file {}", cli.config.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read {}", cli.config.display()));
            }
        };
        config.apply_cli(cli);
        Ok(config)
    }

    /// Apply CLI flag overrides on top of file/default values.
    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(dir) = &cli.dir {
            self.watch.dir = dir.clone();
        }
        if let Some(interface) = cli.interface {
            self.serve.interface = interface;
        }
        if let Some(port) = cli.port {
            self.serve.port = port;
        }
    }

    /// Directory holding derived files; also the HTTP document root.
    pub fn output_dir(&self) -> PathBuf {
        self.watch.dir.join(OUTPUT_DIR_NAME)
    }

    /// Socket address the HTTP server binds to.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.serve.interface, self.serve.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.watch.dir, PathBuf::from("content"));
        assert_eq!(config.watch.extension, ".md");
        assert_eq!(config.serve.port, 8000);
        assert_eq!(config.output_dir(), PathBuf::from("content/html"));
        assert_eq!(config.bind_addr().to_string(), "127.0.0.1:8000");
    }

    #[test]
    fn test_toml_sections() {
        let config: Config = toml::from_str(
            r#"
            [watch]
            dir = "notes"

            [serve]
            port = 9000
            "#,
        )
        .unwrap();
        assert_eq!(config.watch.dir, PathBuf::from("notes"));
        assert_eq!(config.watch.extension, ".md"); // untouched default
        assert_eq!(config.serve.port, 9000);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.watch.dir, PathBuf::from("content"));
        assert_eq!(config.serve.port, 8000);
    }

    #[test]
    fn test_cli_overrides_file() {
        let cli = crate::cli::Cli::parse_from(["mdwatch", "--dir", "docs", "--port", "8123"]);
        let mut config: Config = toml::from_str("[serve]\nport = 9000\n").unwrap();
        config.apply_cli(&cli);
        assert_eq!(config.watch.dir, PathBuf::from("docs"));
        assert_eq!(config.serve.port, 8123);
    }

    #[test]
    fn test_missing_config_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut cli = crate::cli::Cli::parse_from(["mdwatch"]);
        cli.config = dir.path().join("does-not-exist.toml");
        let config = Config::load(&cli).unwrap();
        assert_eq!(config.serve.port, 8000);
    }

    #[test]
    fn test_malformed_config_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mdwatch.toml");
        std::fs::write(&path, "[serve]\nport = \"not a number\"\n").unwrap();
        let mut cli = crate::cli::Cli::parse_from(["mdwatch"]);
        cli.config = path;
        assert!(Config::load(&cli).is_err());
    }
}
