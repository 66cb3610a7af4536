//! rm command

use serde::Serialize;

use super::{connect, fail};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};
use osc_core::resolve;

/// Arguments for the `rm` command
#[derive(clap::Args, Debug)]
pub struct RmArgs {
    /// Container or object path; containers must be empty
    pub path: String,

    /// Succeed when the path does not exist
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Serialize)]
struct RmOutput {
    success: bool,
    path: String,
    existed: bool,
}

/// Execute the rm command
pub fn execute(args: RmArgs, cluster: Option<&str>, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let resolved = resolve(&args.path);
    if resolved.is_root() {
        formatter.error("Refusing to delete the account root");
        return ExitCode::UsageError;
    }

    let client = match connect(cluster, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let existed = match client.with(&resolved.path).delete() {
        Ok(_) => true,
        Err(e) if args.force && e.status() == Some(404) => false,
        Err(e) => return fail(&formatter, &e),
    };

    if formatter.is_json() {
        formatter.json(&RmOutput {
            success: true,
            path: resolved.path,
            existed,
        });
    } else if existed {
        formatter.success(&format!("Removed '{}'", resolved.path));
    } else {
        formatter.warning(&format!("'{}' does not exist", resolved.path));
    }

    ExitCode::Success
}
