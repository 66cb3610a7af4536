//! meta command
//!
//! POSTs meta data and headers to an existing entity. On objects the cluster
//! replaces the whole meta data set, so pass every key that should remain.

use serde::Serialize;

use super::{connect, fail, parse_key_val};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};
use osc_core::{Entity, Result, StorageEntity};

/// Arguments for the `meta` command
#[derive(clap::Args, Debug)]
pub struct MetaArgs {
    /// Container or object path; omit for the account
    #[arg(default_value = "")]
    pub path: String,

    /// Meta data as KEY=VALUE (repeatable)
    #[arg(short, long = "set", value_parser = parse_key_val)]
    pub set: Vec<(String, String)>,

    /// Raw header as NAME=VALUE (repeatable)
    #[arg(short = 'H', long = "header", value_parser = parse_key_val)]
    pub headers: Vec<(String, String)>,
}

#[derive(Serialize)]
struct MetaOutput {
    success: bool,
    path: String,
    updated: usize,
}

/// Execute the meta command
pub fn execute(args: MetaArgs, cluster: Option<&str>, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    if args.set.is_empty() && args.headers.is_empty() {
        formatter.error("Nothing to update: pass --set KEY=VALUE or --header NAME=VALUE");
        return ExitCode::UsageError;
    }

    let client = match connect(cluster, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let result = match client.with(&args.path) {
        Entity::Container(mut container) if container.path().is_empty() => {
            for (key, value) in &args.set {
                container.set_account_meta(key, value);
            }
            apply(&mut container, &[], &args.headers)
        }
        Entity::Container(mut container) => apply(&mut container, &args.set, &args.headers),
        Entity::Object(mut object) => apply(&mut object, &args.set, &args.headers),
    };

    if let Err(e) = result {
        return fail(&formatter, &e);
    }

    let updated = args.set.len() + args.headers.len();
    if formatter.is_json() {
        formatter.json(&MetaOutput {
            success: true,
            path: args.path,
            updated,
        });
    } else {
        formatter.success(&format!("Updated {updated} value(s) on '{}'", args.path));
    }

    ExitCode::Success
}

fn apply<E: StorageEntity>(
    entity: &mut E,
    meta: &[(String, String)],
    headers: &[(String, String)],
) -> Result<()> {
    for (key, value) in meta {
        entity.set_meta(key, value);
    }
    for (name, value) in headers {
        entity.set_header(name, value);
    }
    entity.update()?;
    Ok(())
}
