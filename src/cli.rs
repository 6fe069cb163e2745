use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "spyglass",
    version,
    about = "A terminal dashboard for cluster-management API proxies."
)]
pub struct CliArgs {
    /// Base URL of the backend API (default: http://127.0.0.1:8080)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Start with a namespace filter selected
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Section to open at startup (nodes, pods, deployments, services)
    #[arg(short, long)]
    pub section: Option<String>,

    /// Initial tail-lines selection for the log pane
    #[arg(long)]
    pub tail_lines: Option<u32>,

    /// tracing filter (for example: info,debug,trace)
    #[arg(long, default_value = "info")]
    pub log_filter: String,

    /// Explicit config file path
    #[arg(long)]
    pub config: Option<PathBuf>,
}
