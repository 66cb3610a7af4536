//! CDN commands
//!
//! Public access, CNAMEs and edge cache control for CDN-enabled containers.

use clap::Subcommand;
use serde::Serialize;

use super::{connect, fail};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};
use osc_core::{ClusterClient, Context, Entity, StorageEntity};

/// CDN subcommands
#[derive(Subcommand, Debug)]
pub enum CdnCommands {
    /// Show the public CDN URLs of a container or object
    Urls(PathArgs),

    /// Make a container publicly readable through the CDN
    Enable(EnableArgs),

    /// Make a container private again
    Disable(PathArgs),

    /// Add or remove a custom CNAME on a container
    Cname(CnameArgs),

    /// Evict an object from the edge caches
    Purge(PathArgs),

    /// Pre-load an object into the edge caches
    Load(PathArgs),

    /// Turn compression of text content served through the CDN on or off
    Compression(CompressionArgs),
}

#[derive(clap::Args, Debug)]
pub struct PathArgs {
    /// Container or object path
    pub path: String,
}

#[derive(clap::Args, Debug)]
pub struct EnableArgs {
    /// Container name
    pub path: String,

    /// Edge cache TTL in seconds
    #[arg(long)]
    pub ttl: Option<u64>,
}

#[derive(clap::Args, Debug)]
pub struct CnameArgs {
    /// Container name
    pub path: String,

    /// Host name, e.g. `cdn.example.com`
    pub cname: String,

    /// Protocol the CNAME serves
    #[arg(long = "type", default_value = "HTTP", value_parser = ["HTTP", "HTTPS"])]
    pub kind: String,

    /// Remove the CNAME instead of adding it
    #[arg(long)]
    pub remove: bool,
}

#[derive(clap::Args, Debug)]
pub struct CompressionArgs {
    /// `on` or `off`
    #[arg(value_parser = ["on", "off"])]
    pub state: String,

    /// Comma-separated MIME types to compress, e.g. `text/plain,text/css`
    #[arg(long)]
    pub mime: Option<String>,
}

#[derive(Serialize)]
struct UrlsOutput {
    path: String,
    urls: Vec<String>,
}

#[derive(Serialize)]
struct CdnOperationOutput {
    success: bool,
    path: String,
    message: String,
}

/// Execute a CDN subcommand
pub fn execute(cmd: CdnCommands, cluster: Option<&str>, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);
    let client = match connect(cluster, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    match cmd {
        CdnCommands::Urls(args) => execute_urls(args, &client, &formatter),
        CdnCommands::Enable(args) => execute_enable(args, &client, &formatter),
        CdnCommands::Disable(args) => execute_disable(args, &client, &formatter),
        CdnCommands::Cname(args) => execute_cname(args, &client, &formatter),
        CdnCommands::Purge(args) => execute_cache(args, true, &client, &formatter),
        CdnCommands::Load(args) => execute_cache(args, false, &client, &formatter),
        CdnCommands::Compression(args) => execute_compression(args, &client, &formatter),
    }
}

fn execute_urls(args: PathArgs, client: &ClusterClient, formatter: &Formatter) -> ExitCode {
    let result = match client.with(&args.path) {
        Entity::Container(mut container) => container.cdn_urls(),
        Entity::Object(mut object) => object.cdn_urls(),
    };

    let urls = match result {
        Ok(urls) => urls,
        Err(e) => return fail(formatter, &e),
    };

    if formatter.is_json() {
        formatter.json(&UrlsOutput {
            path: args.path,
            urls,
        });
    } else if urls.is_empty() {
        formatter.warning(&format!("'{}' has no CDN URLs; is the container CDN enabled?", args.path));
    } else {
        for url in &urls {
            formatter.println(&formatter.style_url(url));
        }
    }

    ExitCode::Success
}

fn execute_enable(args: EnableArgs, client: &ClusterClient, formatter: &Formatter) -> ExitCode {
    let mut container = match client.container(&args.path) {
        Ok(c) => c,
        Err(e) => return fail(formatter, &e),
    };

    container.enable_cdn();
    if let Some(ttl) = args.ttl {
        container.set_ttl(ttl);
    }

    match container.update() {
        Ok(_) => done(formatter, args.path, "CDN enabled"),
        Err(e) => fail(formatter, &e),
    }
}

fn execute_disable(args: PathArgs, client: &ClusterClient, formatter: &Formatter) -> ExitCode {
    let mut container = match client.container(&args.path) {
        Ok(c) => c,
        Err(e) => return fail(formatter, &e),
    };

    match container.disable_cdn().update() {
        Ok(_) => done(formatter, args.path, "CDN disabled"),
        Err(e) => fail(formatter, &e),
    }
}

fn execute_cname(args: CnameArgs, client: &ClusterClient, formatter: &Formatter) -> ExitCode {
    let mut container = match client.container(&args.path) {
        Ok(c) => c,
        Err(e) => return fail(formatter, &e),
    };

    let message = if args.remove {
        container.remove_cname(&args.cname);
        format!("CNAME '{}' removed", args.cname)
    } else {
        container.add_cname(&args.cname, &args.kind);
        format!("CNAME '{}' added", args.cname)
    };

    match container.update() {
        Ok(_) => done(formatter, args.path, &message),
        Err(e) => fail(formatter, &e),
    }
}

fn execute_cache(args: PathArgs, purge: bool, client: &ClusterClient, formatter: &Formatter) -> ExitCode {
    let mut object = match client.object(&args.path) {
        Ok(o) => o,
        Err(e) => return fail(formatter, &e),
    };

    let (result, message) = if purge {
        (object.purge_cache(), "Cache purge requested")
    } else {
        (object.load_cache(), "Cache load requested")
    };

    match result {
        Ok(_) => done(formatter, args.path, message),
        Err(e) => fail(formatter, &e),
    }
}

fn execute_compression(args: CompressionArgs, client: &ClusterClient, formatter: &Formatter) -> ExitCode {
    let mut root = client.root();
    root.set_context(Context::Cdn)
        .set_header("X-Cdn-Compression", args.state == "on");
    if let Some(mime) = &args.mime {
        root.set_header("X-Cdn-Compression-Mime", mime);
    }

    match root.update() {
        Ok(_) => done(formatter, String::new(), &format!("CDN compression turned {}", args.state)),
        Err(e) => fail(formatter, &e),
    }
}

fn done(formatter: &Formatter, path: String, message: &str) -> ExitCode {
    if formatter.is_json() {
        formatter.json(&CdnOperationOutput {
            success: true,
            path,
            message: message.to_string(),
        });
    } else if path.is_empty() {
        formatter.success(message);
    } else {
        formatter.success(&format!("{message} on '{path}'"));
    }
    ExitCode::Success
}
