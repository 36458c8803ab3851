//! Command-line definition.

use std::path::PathBuf;

use bastion_domain::HttpMethod;
use bastion_infrastructure::ConfigOverrides;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bastion")]
#[command(about = "Command-line client for the Bastion admin API", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (defaults to ./bastion.toml when present)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL, overriding config and BASTION_BASE_URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Session file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub session_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in with email and password
    Login {
        /// Admin email
        #[arg(long, short = 'e')]
        email: String,

        /// Password; prompted for when omitted
        #[arg(long, env = "BASTION_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Log out and forget the stored session
    Logout,
    /// Fetch the current user from the backend
    Whoami,
    /// Show the stored session without contacting the backend
    Status,
    /// Send an authenticated request and print the payload
    Request {
        /// HTTP method (GET, POST, PUT, PATCH, DELETE)
        method: HttpMethod,

        /// Path relative to the base URL, e.g. /api/admin/tenants
        path: String,

        /// JSON request body
        #[arg(long, short = 'd')]
        data: Option<String>,

        /// Extra header as `Name: value`; repeatable
        #[arg(long = "header", short = 'H', value_parser = parse_header)]
        headers: Vec<(String, String)>,
    },
}

impl Cli {
    /// Config values set by flags.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            base_url: self.base_url.clone(),
            timeout_secs: self.timeout,
            session_path: self.session_file.clone(),
        }
    }
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected `Name: value`, got `{raw}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err("header name is empty".to_string());
    }
    Ok((name.to_string(), value.trim().to_string()))
}
