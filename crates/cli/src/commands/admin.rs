//! Admin commands
//!
//! Account user management. The selected profile must hold admin credentials.

use clap::Subcommand;
use serde::Serialize;

use super::{connect, fail};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};
use osc_core::{ClusterClient, UserRole};

/// Admin subcommands
#[derive(Subcommand, Debug)]
pub enum AdminCommands {
    /// Show the account id, service endpoints and users
    Info(InfoArgs),

    /// Add a user to the account
    #[command(name = "user-add")]
    UserAdd(UserAddArgs),

    /// Remove a user from the account
    #[command(name = "user-rm", alias = "user-remove")]
    UserRemove(UserRemoveArgs),
}

#[derive(clap::Args, Debug)]
pub struct InfoArgs {
    /// Print the account document exactly as the cluster returned it
    #[arg(long)]
    pub raw: bool,
}

#[derive(clap::Args, Debug)]
pub struct UserAddArgs {
    /// User name, without the account prefix
    pub username: String,

    /// Password for the new user
    pub password: String,

    /// Role: regular or admin
    #[arg(long, default_value = "regular")]
    pub role: UserRole,
}

#[derive(clap::Args, Debug)]
pub struct UserRemoveArgs {
    /// User name, without the account prefix
    pub username: String,
}

#[derive(Serialize)]
struct UserOperationOutput {
    success: bool,
    username: String,
    message: String,
}

/// Execute an admin subcommand
pub fn execute(cmd: AdminCommands, cluster: Option<&str>, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);
    let client = match connect(cluster, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    match cmd {
        AdminCommands::Info(args) => execute_info(args, &client, &formatter),
        AdminCommands::UserAdd(args) => execute_user_add(args, &client, &formatter),
        AdminCommands::UserRemove(args) => execute_user_remove(args, &client, &formatter),
    }
}

fn execute_info(args: InfoArgs, client: &ClusterClient, formatter: &Formatter) -> ExitCode {
    if args.raw {
        return match client.cluster_info() {
            Ok(body) => {
                formatter.println(&body);
                ExitCode::Success
            }
            Err(e) => fail(formatter, &e),
        };
    }

    let info = match client.account_info() {
        Ok(info) => info,
        Err(e) => return fail(formatter, &e),
    };

    if formatter.is_json() {
        formatter.json(&info);
        return ExitCode::Success;
    }

    formatter.property("Account:", &info.account_id, 10);
    for (service, endpoints) in &info.services {
        let endpoint = info.default_endpoint(service).unwrap_or("-");
        formatter.property(
            &format!("{service}:"),
            &formatter.style_url(endpoint),
            10,
        );
        for (name, url) in endpoints.iter().filter(|(name, _)| name.as_str() != "default") {
            formatter.println(&format!("  {:<8} {url}", name));
        }
    }

    let users = info.user_names();
    formatter.property(
        "Users:",
        &formatter.style_count(&users.len().to_string()),
        10,
    );
    for user in users {
        formatter.println(&format!("  {}", formatter.style_name(user)));
    }

    ExitCode::Success
}

fn execute_user_add(args: UserAddArgs, client: &ClusterClient, formatter: &Formatter) -> ExitCode {
    if let Err(e) = client.add_user(&args.username, &args.password, args.role) {
        return fail(formatter, &e);
    }

    let message = format!("User '{}' added as {}", args.username.trim(), args.role);
    if formatter.is_json() {
        formatter.json(&UserOperationOutput {
            success: true,
            username: args.username.trim().to_string(),
            message,
        });
    } else {
        formatter.success(&message);
    }

    ExitCode::Success
}

fn execute_user_remove(args: UserRemoveArgs, client: &ClusterClient, formatter: &Formatter) -> ExitCode {
    if let Err(e) = client.delete_user(&args.username) {
        return fail(formatter, &e);
    }

    let message = format!("User '{}' removed", args.username.trim());
    if formatter.is_json() {
        formatter.json(&UserOperationOutput {
            success: true,
            username: args.username.trim().to_string(),
            message,
        });
    } else {
        formatter.success(&message);
    }

    ExitCode::Success
}
