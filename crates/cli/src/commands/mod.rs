//! Command definitions and shared helpers

mod admin;
mod auth;
mod cat;
mod cdn;
mod cluster;
mod ls;
mod mb;
mod meta;
mod put;
mod rm;
mod search;
mod stat;

use clap::Subcommand;
use osc_core::{ClientOptions, ClusterClient, ClusterManager};

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage cluster profiles
    #[command(subcommand)]
    Cluster(cluster::ClusterCommands),

    /// List containers, or the objects of a container
    #[command(name = "ls", alias = "list")]
    Ls(ls::LsArgs),

    /// Show the headers and meta data of a container or object
    Stat(stat::StatArgs),

    /// Write an object's content to stdout
    Cat(cat::CatArgs),

    /// Upload a local file as an object
    Put(put::PutArgs),

    /// Create a container
    Mb(mb::MbArgs),

    /// Set meta data or headers on an existing container or object
    Meta(meta::MetaArgs),

    /// Delete a container or object
    #[command(alias = "remove")]
    Rm(rm::RmArgs),

    /// Search the account or a container
    Search(search::SearchArgs),

    /// CDN settings and cache control
    #[command(subcommand)]
    Cdn(cdn::CdnCommands),

    /// Account user administration
    #[command(subcommand)]
    Admin(admin::AdminCommands),

    /// Inspect or refresh the cached authentication token
    #[command(subcommand)]
    Auth(auth::AuthCommands),
}

/// Run a parsed command
pub fn execute(command: Commands, cluster: Option<&str>, output_config: OutputConfig) -> ExitCode {
    match command {
        Commands::Cluster(cmd) => cluster::execute(cmd, output_config),
        Commands::Ls(args) => ls::execute(args, cluster, output_config),
        Commands::Stat(args) => stat::execute(args, cluster, output_config),
        Commands::Cat(args) => cat::execute(args, cluster, output_config),
        Commands::Put(args) => put::execute(args, cluster, output_config),
        Commands::Mb(args) => mb::execute(args, cluster, output_config),
        Commands::Meta(args) => meta::execute(args, cluster, output_config),
        Commands::Rm(args) => rm::execute(args, cluster, output_config),
        Commands::Search(args) => search::execute(args, cluster, output_config),
        Commands::Cdn(cmd) => cdn::execute(cmd, cluster, output_config),
        Commands::Admin(cmd) => admin::execute(cmd, cluster, output_config),
        Commands::Auth(cmd) => auth::execute(cmd, cluster, output_config),
    }
}

/// Build a client for the selected cluster profile
///
/// `cluster` falls back to the configured default, then to the only profile.
pub fn connect(cluster: Option<&str>, formatter: &Formatter) -> Result<ClusterClient, ExitCode> {
    let manager = match ClusterManager::new() {
        Ok(m) => m,
        Err(e) => {
            formatter.error(&format!("Failed to load configuration: {e}"));
            return Err(ExitCode::GeneralError);
        }
    };

    let config = match manager.config_manager().load() {
        Ok(c) => c,
        Err(e) => return Err(fail(formatter, &e)),
    };

    if let Some(name) = cluster
        && !config.clusters.iter().any(|c| c.name == name)
    {
        formatter.error(&format!("Cluster '{name}' not found"));
        return Err(ExitCode::NotFound);
    }

    let profile = match manager.resolve(cluster) {
        Ok(p) => p,
        Err(e) => return Err(fail(formatter, &e)),
    };

    let credentials = match profile.credentials() {
        Ok(c) => c,
        Err(e) => return Err(fail(formatter, &e)),
    };

    let options = ClientOptions {
        timeout_secs: config.defaults.timeout_secs,
        accept_invalid_certs: profile.insecure,
    };

    tracing::debug!(cluster = %profile.name, host = %profile.host, "Connecting");
    osc_http::connect(credentials, &options, config.token_store.build())
        .map_err(|e| fail(formatter, &e))
}

/// Print a client error and pick the matching exit code
pub fn fail(formatter: &Formatter, error: &osc_core::Error) -> ExitCode {
    formatter.error(&error.to_string());
    ExitCode::from_error(error)
}

/// Parse `KEY=VALUE`
pub fn parse_key_val(s: &str) -> anyhow::Result<(String, String)> {
    let Some((key, value)) = s.split_once('=') else {
        anyhow::bail!("expected KEY=VALUE, got '{s}'");
    };

    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("key cannot be empty in '{s}'");
    }

    Ok((key.to_string(), value.to_string()))
}
