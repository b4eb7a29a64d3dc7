use clap::Parser;

#[derive(Parser)]
#[command(
    name = "typewinner",
    version,
    about = "Typing-race automation host for play.typeracer.com"
)]
pub struct Cli {
    /// Log filter directive, e.g. "info" or "typewinner_core=debug".
    #[arg(long, default_value = "info", env = "TYPEWINNER_LOG")]
    pub log: String,
}
