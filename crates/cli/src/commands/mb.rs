//! mb command

use serde::Serialize;

use super::{connect, fail, parse_key_val};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};
use osc_core::{EntityKind, StorageEntity, resolve};

/// Arguments for the `mb` command
#[derive(clap::Args, Debug)]
pub struct MbArgs {
    /// Container name
    pub name: String,

    /// Make the container publicly readable through the CDN
    #[arg(long)]
    pub cdn: bool,

    /// CDN cache TTL in seconds
    #[arg(long, requires = "cdn")]
    pub ttl: Option<u64>,

    /// Meta data as KEY=VALUE (repeatable)
    #[arg(short, long = "meta", value_parser = parse_key_val)]
    pub meta: Vec<(String, String)>,
}

#[derive(Serialize)]
struct MbOutput {
    success: bool,
    container: String,
    cdn: bool,
    message: String,
}

/// Execute the mb command
pub fn execute(args: MbArgs, cluster: Option<&str>, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let resolved = resolve(&args.name);
    if resolved.is_root() || resolved.kind() != EntityKind::Container {
        formatter.error(&format!("'{}' is not a container name", args.name));
        return ExitCode::UsageError;
    }

    let client = match connect(cluster, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let mut container = match client.container(&resolved.path) {
        Ok(c) => c,
        Err(e) => return fail(&formatter, &e),
    };

    for (key, value) in &args.meta {
        container.set_meta(key, value);
    }
    if args.cdn {
        container.enable_cdn();
    }
    if let Some(ttl) = args.ttl {
        container.set_ttl(ttl);
    }

    if let Err(e) = container.create() {
        return fail(&formatter, &e);
    }

    let message = format!("Container '{}' created", resolved.path);
    if formatter.is_json() {
        formatter.json(&MbOutput {
            success: true,
            container: resolved.path,
            cdn: args.cdn,
            message,
        });
    } else {
        formatter.success(&message);
    }

    ExitCode::Success
}
