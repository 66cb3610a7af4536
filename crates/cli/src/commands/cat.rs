//! cat command
//!
//! Writes the object body to stdout as-is, also under `--json`.

use std::io::Write;

use anyhow::Context;

use super::{connect, fail};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};
use osc_core::StorageEntity;

/// Arguments for the `cat` command
#[derive(clap::Args, Debug)]
pub struct CatArgs {
    /// Object path (`container/name`)
    pub path: String,
}

/// Execute the cat command
pub fn execute(args: CatArgs, cluster: Option<&str>, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);
    let client = match connect(cluster, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let mut object = match client.object(&args.path) {
        Ok(o) => o,
        Err(e) => return fail(&formatter, &e),
    };

    if let Err(e) = object.get() {
        return fail(&formatter, &e);
    }

    match write_body(object.body()) {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            formatter.error(&format!("{e:#}"));
            ExitCode::GeneralError
        }
    }
}

fn write_body(body: &[u8]) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(body)
        .context("Failed to write object to stdout")?;
    stdout.flush().context("Failed to flush stdout")?;
    Ok(())
}
