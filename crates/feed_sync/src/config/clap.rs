use clap::Parser;

#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Run a single polling pass and exit instead of looping.
    #[arg(short, long, env = "ONCE")]
    pub once: bool,

    /// Import metadata only, skipping thumbnail downloads.
    #[arg(short, long, env = "SCAN_ONLY")]
    pub scan_only: bool,

    #[arg(short, long, default_value = "None,feed_sync=info", env = "RUST_LOG")]
    pub log_level: String,
}
