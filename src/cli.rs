use std::path::PathBuf;

use clap::Parser;

/// Look up a GitHub user and browse their public repositories.
#[derive(Debug, Parser)]
#[command(name = "repo-tracker", version, about)]
pub struct Cli {
    /// GitHub username to look up on start
    pub username: Option<String>,

    /// Base URL of the REST API
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Repositories per page (1-100)
    #[arg(long, value_name = "N")]
    pub per_page: Option<u32>,

    /// Config file to read instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
