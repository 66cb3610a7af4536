//! osc: command line client for Swift-style object storage clusters

mod commands;
mod exit_code;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use commands::Commands;
use output::OutputConfig;

#[derive(Parser, Debug)]
#[command(name = "osc", version, about = "Command line client for Swift-style object storage clusters")]
struct Cli {
    /// Output JSON
    #[arg(long, global = true)]
    json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log requests and responses to stderr
    #[arg(long, global = true)]
    debug: bool,

    /// Cluster profile to use
    #[arg(short, long, global = true, env = "OSC_CLUSTER")]
    cluster: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let output_config = OutputConfig {
        json: cli.json || prefers_json(),
        no_color: cli.no_color,
        quiet: cli.quiet,
    };

    commands::execute(cli.command, cli.cluster.as_deref(), output_config).into()
}

/// `RUST_LOG` wins; otherwise warnings only, or debug for the osc crates
fn init_tracing(debug: bool) {
    let default = if debug {
        "osc=debug,osc_core=debug,osc_http=debug"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// `output = "json"` in the configuration defaults
fn prefers_json() -> bool {
    osc_core::ConfigManager::new()
        .and_then(|manager| manager.load())
        .map(|config| config.defaults.output == "json")
        .unwrap_or(false)
}
