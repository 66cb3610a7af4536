//! search command
//!
//! Queries the cluster's search service through the `X-Context: search` header.
//! Results may be containers or objects.

use serde::Serialize;

use super::{connect, fail, parse_key_val};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};
use osc_core::entity::DEFAULT_LIMIT;
use osc_core::{Context, StorageEntity};

/// Arguments for the `search` command
#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    /// Keyword
    pub query: String,

    /// Container to search in; searches the whole account when omitted
    #[arg(long, default_value = "")]
    pub container: String,

    /// Restrict results to `container` or `object`
    #[arg(long = "type", value_parser = ["container", "object"])]
    pub kind: Option<String>,

    /// Extra search filter as KEY=VALUE (repeatable)
    #[arg(short, long = "filter", value_parser = parse_key_val)]
    pub filters: Vec<(String, String)>,

    /// Maximum number of results
    #[arg(short = 'n', long, default_value_t = DEFAULT_LIMIT)]
    pub limit: u32,

    /// Start after this result
    #[arg(long, default_value = "")]
    pub marker: String,

    /// Listing format requested from the cluster: json, xml or text
    #[arg(long, default_value = "json")]
    pub format: String,
}

#[derive(Serialize)]
struct SearchOutput {
    query: String,
    containers: Vec<String>,
    objects: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    container_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    object_count: Option<u64>,
}

/// Execute the search command
pub fn execute(args: SearchArgs, cluster: Option<&str>, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);
    let client = match connect(cluster, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let mut container = match client.container(&args.container) {
        Ok(c) => c,
        Err(e) => return fail(&formatter, &e),
    };

    container.set_context(Context::Search);
    if let Err(e) = container.set_mime(&args.format) {
        return fail(&formatter, &e);
    }

    let mut filters = vec![("q".to_string(), args.query.clone())];
    if let Some(kind) = &args.kind {
        filters.push(("type".to_string(), kind.clone()));
    }
    filters.extend(args.filters.iter().cloned());

    for (key, value) in &filters {
        if let Err(e) = container.set_filter(key, value) {
            return fail(&formatter, &e);
        }
    }

    if let Err(e) = container.get_page(args.limit, &args.marker) {
        return fail(&formatter, &e);
    }

    let output = SearchOutput {
        query: args.query,
        containers: container
            .containers()
            .iter()
            .map(|c| c.path().to_string())
            .collect(),
        objects: container
            .objects()
            .iter()
            .map(|o| o.path().to_string())
            .collect(),
        container_count: container.container_count(),
        object_count: container.object_count(),
    };

    if formatter.is_json() {
        formatter.json(&output);
        return ExitCode::Success;
    }

    if output.containers.is_empty() && output.objects.is_empty() {
        formatter.println("No matches.");
        return ExitCode::Success;
    }

    for path in &output.containers {
        formatter.println(&formatter.style_container(&format!("{path}/")));
    }
    for path in &output.objects {
        formatter.println(&formatter.style_object(path));
    }

    ExitCode::Success
}
