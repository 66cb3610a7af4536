//! Cluster profile management
//!
//! A profile names a cluster endpoint and the login used against it. Profiles live
//! in the configuration file; passwords are never printed.

use clap::Subcommand;
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};
use osc_core::{ClusterManager, ClusterProfile, Error};

/// Cluster subcommands
#[derive(Subcommand, Debug)]
pub enum ClusterCommands {
    /// Add or update a cluster profile
    Set(SetArgs),

    /// List configured cluster profiles
    #[command(alias = "ls")]
    List(ListArgs),

    /// Remove a cluster profile
    #[command(alias = "rm")]
    Remove(RemoveArgs),
}

/// Arguments for the `cluster set` command
#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Profile name (e.g., "dal05")
    pub name: String,

    /// Cluster URL (e.g., `https://dal05.objectstorage.example.com`)
    pub host: String,

    /// Login in `account:user` form
    pub username: String,

    /// Password or API key
    pub password: String,

    /// Skip TLS certificate verification
    #[arg(long)]
    pub insecure: bool,

    /// Use this profile when `--cluster` is not given
    #[arg(long)]
    pub default: bool,
}

/// Arguments for the `cluster list` command
#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Show hosts and logins
    #[arg(short, long)]
    pub long: bool,
}

/// Arguments for the `cluster remove` command
#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Name of the profile to remove
    pub name: String,
}

#[derive(Serialize)]
struct ClusterListOutput {
    clusters: Vec<ClusterInfo>,
    default: Option<String>,
}

/// Profile without the password
#[derive(Serialize)]
struct ClusterInfo {
    name: String,
    host: String,
    username: String,
    insecure: bool,
}

impl From<&ClusterProfile> for ClusterInfo {
    fn from(profile: &ClusterProfile) -> Self {
        Self {
            name: profile.name.clone(),
            host: profile.host.clone(),
            username: profile.username.clone(),
            insecure: profile.insecure,
        }
    }
}

#[derive(Serialize)]
struct ClusterOperationOutput {
    success: bool,
    cluster: String,
    message: String,
}

/// Execute a cluster subcommand
pub fn execute(cmd: ClusterCommands, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);
    let manager = match ClusterManager::new() {
        Ok(m) => m,
        Err(e) => {
            formatter.error(&format!("Failed to load configuration: {e}"));
            return ExitCode::GeneralError;
        }
    };

    match cmd {
        ClusterCommands::Set(args) => execute_set(args, &manager, &formatter),
        ClusterCommands::List(args) => execute_list(args, &manager, &formatter),
        ClusterCommands::Remove(args) => execute_remove(args, &manager, &formatter),
    }
}

fn execute_set(args: SetArgs, manager: &ClusterManager, formatter: &Formatter) -> ExitCode {
    if args.name.trim().is_empty() {
        formatter.error("Cluster name cannot be empty");
        return ExitCode::UsageError;
    }

    let mut profile = ClusterProfile::new(&args.name, &args.host, &args.username, &args.password);
    profile.insecure = args.insecure;

    if let Err(e) = manager.set(profile) {
        formatter.error(&format!("Failed to save cluster: {e}"));
        return ExitCode::from_error(&e);
    }

    if args.default
        && let Err(e) = set_default(manager, &args.name)
    {
        formatter.error(&format!("Failed to set default cluster: {e}"));
        return ExitCode::from_error(&e);
    }

    if formatter.is_json() {
        formatter.json(&ClusterOperationOutput {
            success: true,
            cluster: args.name.clone(),
            message: format!("Cluster '{}' configured successfully", args.name),
        });
    } else {
        formatter.success(&format!(
            "Cluster '{}' configured successfully",
            formatter.style_name(&args.name)
        ));
    }

    ExitCode::Success
}

fn set_default(manager: &ClusterManager, name: &str) -> Result<(), Error> {
    let config_manager = manager.config_manager();
    let mut config = config_manager.load()?;
    config.defaults.cluster = Some(name.to_string());
    config_manager.save(&config)
}

fn execute_list(args: ListArgs, manager: &ClusterManager, formatter: &Formatter) -> ExitCode {
    let config = match manager.config_manager().load() {
        Ok(c) => c,
        Err(e) => {
            formatter.error(&format!("Failed to list clusters: {e}"));
            return ExitCode::from_error(&e);
        }
    };
    let default = config.defaults.cluster;

    if formatter.is_json() {
        formatter.json(&ClusterListOutput {
            clusters: config.clusters.iter().map(ClusterInfo::from).collect(),
            default,
        });
        return ExitCode::Success;
    }

    if config.clusters.is_empty() {
        formatter.println("No clusters configured.");
        return ExitCode::Success;
    }

    let width = config.clusters.iter().map(|c| c.name.len()).max().unwrap_or(0);
    for profile in &config.clusters {
        let marker = if default.as_deref() == Some(profile.name.as_str()) {
            "*"
        } else {
            " "
        };
        let name = formatter.style_name(&format!("{:<width$}", profile.name));
        if args.long {
            let insecure = if profile.insecure { " (insecure)" } else { "" };
            formatter.println(&format!(
                "{marker} {name}  {}  {}{insecure}",
                formatter.style_url(&profile.host),
                profile.username
            ));
        } else {
            formatter.println(&format!("{marker} {name}"));
        }
    }

    ExitCode::Success
}

fn execute_remove(args: RemoveArgs, manager: &ClusterManager, formatter: &Formatter) -> ExitCode {
    let exists = match manager.list() {
        Ok(profiles) => profiles.iter().any(|p| p.name == args.name),
        Err(e) => {
            formatter.error(&format!("Failed to remove cluster: {e}"));
            return ExitCode::from_error(&e);
        }
    };
    if !exists {
        formatter.error(&format!("Cluster '{}' not found", args.name));
        return ExitCode::NotFound;
    }

    if let Err(e) = manager.remove(&args.name) {
        formatter.error(&format!("Failed to remove cluster: {e}"));
        return ExitCode::from_error(&e);
    }

    if formatter.is_json() {
        formatter.json(&ClusterOperationOutput {
            success: true,
            cluster: args.name.clone(),
            message: format!("Cluster '{}' removed successfully", args.name),
        });
    } else {
        formatter.success(&format!("Cluster '{}' removed successfully", args.name));
    }
    ExitCode::Success
}
