//! Binary entry point for the wmcp-workspace MCP server.

use clap::Parser;
use rmcp::ServiceExt;
use std::path::PathBuf;
use wmcp_workspace::config::{DEFAULT_MANIFEST, DEFAULT_MAX_READ_BYTES, RunnerConfig};
use wmcp_workspace::{WorkspaceConfig, WorkspaceServer};

/// Walrus MCP Workspace Server — exposes one project directory and its scripts.
#[derive(Parser)]
#[command(name = "wmcp-workspace", version, about)]
struct Cli {
    /// Workspace root. Defaults to the current directory.
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Largest file, in bytes, that read_file will return.
    #[arg(long, default_value_t = DEFAULT_MAX_READ_BYTES)]
    max_read_bytes: u64,

    /// Manifest file declaring runnable scripts, relative to the root.
    #[arg(long, default_value = DEFAULT_MANIFEST)]
    manifest: String,

    /// Program used to run manifest scripts (invoked as `<runner> run <script>`).
    #[arg(long)]
    runner: Option<String>,

    /// Encoding of script output (e.g. "utf-8", "shift_jis"). Defaults to the host locale.
    #[arg(long)]
    output_encoding: Option<String>,
}

#[tokio::main]
async fn main() {
    if std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .init();
    }
    let cli = Cli::parse();

    let mut config = WorkspaceConfig::new(cli.root);
    config.max_read_bytes = cli.max_read_bytes;
    config.manifest = cli.manifest;
    config.output_encoding = cli.output_encoding;
    if let Some(program) = cli.runner {
        config.runner = RunnerConfig {
            program,
            args: Vec::new(),
        };
    }

    let server = WorkspaceServer::new(config).expect("invalid workspace root");
    tracing::info!(root = %server.root().display(), "serving workspace");
    let transport = rmcp::transport::stdio();
    server
        .serve(transport)
        .await
        .expect("failed to start server")
        .waiting()
        .await
        .expect("server error");
}
