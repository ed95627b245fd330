use clap::{Parser, Subcommand};
use std::path::PathBuf;

use portscout::ConfigOverrides;

#[derive(Parser)]
#[command(name = "portscout")]
#[command(about = "Report which host ports are used by containers and suggest free ones")]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, env = "PORTSCOUT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Address the HTTP server binds to
    #[arg(long, env = "PORTSCOUT_HOST", global = true)]
    pub host: Option<String>,

    /// Port the HTTP server listens on
    #[arg(long, env = "PORT", global = true)]
    pub port: Option<u16>,

    /// Container runtime endpoint (tcp://, http:// or https://)
    #[arg(long, env = "DOCKER_HOST", global = true)]
    pub docker_host: Option<String>,

    /// Pin the Docker API version instead of negotiating
    #[arg(long, env = "DOCKER_API_VERSION", global = true)]
    pub docker_api_version: Option<String>,

    /// Directory with static assets served at /
    #[arg(long, env = "PORTSCOUT_STATIC_DIR", global = true)]
    pub static_dir: Option<PathBuf>,

    /// Log filter directive, e.g. "info" or "portscout=debug"
    #[arg(long, env = "PORTSCOUT_LOG", global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, env = "PORTSCOUT_LOG_JSON", global = true)]
    pub log_json: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP query API (default)
    Serve,

    /// List containers with their port mappings
    Containers,

    /// Check whether a host port is free
    Check {
        /// Port number
        #[arg(id = "check_port", value_name = "PORT", allow_hyphen_values = true)]
        port: String,
    },

    /// Suggest the first free port at or above a start port
    Suggest {
        /// Where to start searching (defaults to 8000, never below 1024)
        #[arg(short, long)]
        start: Option<String>,
    },
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host.clone(),
            port: self.port,
            docker_host: self.docker_host.clone(),
            docker_api_version: self.docker_api_version.clone(),
            static_dir: self.static_dir.clone(),
            log_level: if self.verbose {
                Some("debug".to_string())
            } else {
                self.log_level.clone()
            },
            log_json: self.log_json,
        }
    }
}
