use super::Parser;

/// Runs a scripted two-user walkthrough against the configured backends.
#[derive(Parser, Debug)]
#[command(name = "socialgraph", version)]
pub struct Cli {
    /// Path to a TOML settings file.
    #[arg(long)]
    pub settings: Option<String>,
}
