//! stat command
//!
//! HEAD on a container, object or the account root (empty path).

use std::collections::BTreeMap;

use serde::Serialize;

use super::{connect, fail};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Arguments for the `stat` command
#[derive(clap::Args, Debug)]
pub struct StatArgs {
    /// Container or object path; omit for the account
    #[arg(default_value = "")]
    pub path: String,
}

#[derive(Serialize)]
struct StatOutput {
    path: String,
    kind: String,
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    container_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    object_count: Option<u64>,
    headers: BTreeMap<String, String>,
}

/// Execute the stat command
pub fn execute(args: StatArgs, cluster: Option<&str>, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);
    let client = match connect(cluster, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let mut entity = client.with(&args.path);
    let kind = if entity.path().is_empty() {
        "account".to_string()
    } else {
        entity.kind().to_string()
    };

    let state = match entity.get_info() {
        Ok(s) => s,
        Err(e) => return fail(&formatter, &e),
    };

    let output = StatOutput {
        path: state.path().to_string(),
        kind,
        status: state.response().status,
        container_count: state.container_count(),
        object_count: state.object_count(),
        headers: state
            .response()
            .headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    };

    if formatter.is_json() {
        formatter.json(&output);
        return ExitCode::Success;
    }

    let width = output
        .headers
        .keys()
        .map(|k| k.len() + 1)
        .chain([12])
        .max()
        .unwrap_or(12);

    formatter.property("Path:", &output.path, width);
    formatter.property("Kind:", &output.kind, width);
    if let Some(count) = output.container_count {
        formatter.property("Containers:", &formatter.style_count(&count.to_string()), width);
    }
    if let Some(count) = output.object_count {
        formatter.property("Objects:", &formatter.style_count(&count.to_string()), width);
    }
    for (name, value) in &output.headers {
        formatter.property(&format!("{name}:"), value, width);
    }

    ExitCode::Success
}
