//! put command
//!
//! Streams a local file to an object. The Content-Type is guessed from the object
//! name unless given.

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::{connect, fail, parse_key_val};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};
use osc_core::{EntityKind, StorageEntity, resolve};

/// Arguments for the `put` command
#[derive(clap::Args, Debug)]
pub struct PutArgs {
    /// Local file to upload
    pub file: PathBuf,

    /// Destination object; a container or a path ending in `/` keeps the file name
    pub path: String,

    /// Meta data as KEY=VALUE (repeatable)
    #[arg(short, long = "meta", value_parser = parse_key_val)]
    pub meta: Vec<(String, String)>,

    /// Content-Type header
    #[arg(long)]
    pub content_type: Option<String>,

    /// Expire the object this many seconds after upload
    #[arg(long)]
    pub delete_after: Option<u64>,
}

#[derive(Serialize)]
struct PutOutput {
    success: bool,
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
    message: String,
}

/// Execute the put command
pub fn execute(args: PutArgs, cluster: Option<&str>, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let Some(destination) = destination(&args.path, &args.file) else {
        formatter.error(&format!(
            "Cannot upload '{}' to '{}': destination needs a container",
            args.file.display(),
            args.path
        ));
        return ExitCode::UsageError;
    };

    let client = match connect(cluster, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let mut object = match client.object(&destination) {
        Ok(o) => o,
        Err(e) => return fail(&formatter, &e),
    };

    object.set_local_file(&args.file);
    for (key, value) in &args.meta {
        object.set_meta(key, value);
    }
    if let Some(content_type) = &args.content_type {
        object.set_header("Content-Type", content_type);
    }
    if let Some(seconds) = args.delete_after {
        object.delete_after(seconds);
    }

    if let Err(e) = object.create() {
        return fail(&formatter, &e);
    }

    let size = object
        .request()
        .headers
        .get("Content-Length")
        .and_then(|v| v.parse().ok());
    let message = format!("Uploaded '{}' to '{destination}'", args.file.display());

    if formatter.is_json() {
        formatter.json(&PutOutput {
            success: true,
            path: destination,
            size,
            message,
        });
    } else {
        formatter.success(&message);
    }

    ExitCode::Success
}

/// Object path for an upload; `None` when the path has no container
fn destination(path: &str, file: &Path) -> Option<String> {
    let resolved = resolve(path);
    if resolved.is_root() {
        return None;
    }

    if resolved.kind() == EntityKind::Container || path.ends_with('/') {
        let name = file.file_name()?.to_str()?;
        return Some(format!("{}/{name}", path.trim_matches('/')));
    }

    Some(resolved.path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination() {
        let file = Path::new("/tmp/report.pdf");
        assert_eq!(destination("docs", file).as_deref(), Some("docs/report.pdf"));
        assert_eq!(destination("/docs/", file).as_deref(), Some("docs/report.pdf"));
        assert_eq!(
            destination("docs/2024/", file).as_deref(),
            Some("docs/2024/report.pdf")
        );
        assert_eq!(
            destination("docs/final.pdf", file).as_deref(),
            Some("docs/final.pdf")
        );
        assert_eq!(destination("", file), None);
        assert_eq!(destination("/", file), None);
    }
}
