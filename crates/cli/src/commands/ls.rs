//! ls command
//!
//! An empty path lists the account's containers. A container path lists one level
//! of its objects; `container/prefix/` lists inside a pseudo-directory.

use serde::Serialize;

use super::{connect, fail};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};
use osc_core::entity::DEFAULT_LIMIT;
use osc_core::{Container, ListingFormat, StorageEntity, resolve};

/// Arguments for the `ls` command
#[derive(clap::Args, Debug)]
pub struct LsArgs {
    /// Container or `container/prefix/`; omit to list containers
    #[arg(default_value = "")]
    pub path: String,

    /// Maximum number of entries to return
    #[arg(short = 'n', long, default_value_t = DEFAULT_LIMIT)]
    pub limit: u32,

    /// Start after this name
    #[arg(long, default_value = "")]
    pub marker: String,

    /// List every name under the path instead of one level
    #[arg(short, long)]
    pub recursive: bool,
}

#[derive(Serialize)]
struct LsOutput {
    path: String,
    containers: Vec<String>,
    objects: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    container_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    object_count: Option<u64>,
    /// Pass as `--marker` to fetch the next page
    #[serde(skip_serializing_if = "Option::is_none")]
    next_marker: Option<String>,
}

/// Execute the ls command
pub fn execute(args: LsArgs, cluster: Option<&str>, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    if args.limit == 0 {
        formatter.error("--limit must be greater than zero");
        return ExitCode::UsageError;
    }

    let client = match connect(cluster, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let resolved = resolve(&args.path);
    let mut container = match client.container(&resolved.container) {
        Ok(c) => c,
        Err(e) => return fail(&formatter, &e),
    };

    container.set_format(ListingFormat::Json);
    if let Some(prefix) = &resolved.object {
        container.set_param("prefix", prefix);
    }
    if !args.recursive && !resolved.is_root() {
        container.set_param("delimiter", "/");
    }

    if let Err(e) = container.get_page(args.limit, &args.marker) {
        return fail(&formatter, &e);
    }

    let output = listing_output(&container, args.limit);

    if formatter.is_json() {
        formatter.json(&output);
        return ExitCode::Success;
    }

    for name in &output.containers {
        formatter.println(&formatter.style_container(&format!("{name}/")));
    }
    for name in &output.objects {
        if name.ends_with('/') {
            formatter.println(&formatter.style_container(name));
        } else {
            formatter.println(&formatter.style_object(name));
        }
    }

    if let Some(marker) = &output.next_marker {
        formatter.warning(&format!("More entries available; continue with --marker '{marker}'"));
    }

    ExitCode::Success
}

fn listing_output(container: &Container, limit: u32) -> LsOutput {
    let prefix = format!("{}/", container.path());
    let containers: Vec<String> = container
        .containers()
        .iter()
        .map(|c| c.path().to_string())
        .collect();
    let objects: Vec<String> = container
        .objects()
        .iter()
        .map(|o| relative_name(o.path(), &prefix))
        .collect();

    let returned = containers.len() + objects.len();
    let next_marker = if returned >= limit as usize {
        objects.last().or(containers.last()).cloned()
    } else {
        None
    };

    LsOutput {
        path: container.path().to_string(),
        containers,
        objects,
        container_count: container.container_count(),
        object_count: container.object_count(),
        next_marker,
    }
}

/// Object name within its container
fn relative_name(path: &str, container_prefix: &str) -> String {
    path.strip_prefix(container_prefix).unwrap_or(path).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_name() {
        assert_eq!(relative_name("photos/2024/cat.jpg", "photos/"), "2024/cat.jpg");
        assert_eq!(relative_name("photos/2024/", "photos/"), "2024/");
        assert_eq!(relative_name("other/cat.jpg", "photos/"), "other/cat.jpg");
    }
}
