//! Command line interface

pub mod serve;

use std::path::PathBuf;

use clap::Parser;

/// Session-authenticated user API server
#[derive(Debug, Parser)]
#[command(name = "apiserver")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long = "config-path", default_value = "configs/apiserver.toml")]
    pub config_path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_path() {
        let cli = Cli::parse_from(["apiserver"]);
        assert_eq!(cli.config_path, PathBuf::from("configs/apiserver.toml"));
    }

    #[test]
    fn test_custom_config_path() {
        let cli = Cli::parse_from(["apiserver", "--config-path", "/etc/apiserver.toml"]);
        assert_eq!(cli.config_path, PathBuf::from("/etc/apiserver.toml"));
    }
}
