//! Authentication commands

use clap::Subcommand;
use serde::Serialize;

use super::{connect, fail};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};
use osc_core::AuthData;

/// Auth subcommands
#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Print the storage URL and token, authenticating if nothing is cached
    Token,

    /// Discard the cached token and authenticate again
    Reload,
}

#[derive(Serialize)]
struct TokenOutput {
    storage_url: String,
    auth_token: String,
}

impl From<AuthData> for TokenOutput {
    fn from(data: AuthData) -> Self {
        Self {
            storage_url: data.storage_url,
            auth_token: data.auth_token,
        }
    }
}

/// Execute an auth subcommand
pub fn execute(cmd: AuthCommands, cluster: Option<&str>, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);
    let client = match connect(cluster, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    if let AuthCommands::Reload = cmd
        && let Err(e) = client.reload_authentication_data()
    {
        return fail(&formatter, &e);
    }

    let data = match client.authentication_data() {
        Ok(d) => d,
        Err(e) => return fail(&formatter, &e),
    };

    if formatter.is_json() {
        formatter.json(&TokenOutput::from(data));
        return ExitCode::Success;
    }

    if let AuthCommands::Reload = cmd {
        formatter.success("Authenticated");
    }
    formatter.property("Storage URL:", &formatter.style_url(&data.storage_url), 13);
    formatter.property("Token:", &data.auth_token, 13);

    ExitCode::Success
}
