use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "billdroid")]
#[command(about = "Pays utility bills by driving a banking app over adb")]
pub struct Cli {
    /// Path to the JSON config file
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// Run provider fetchers without a visible browser
    #[arg(long)]
    pub headless: bool,

    /// Base sleep unit in milliseconds; every wait in the flow is a multiple of it
    #[arg(long, default_value_t = 100)]
    pub default_sleep: u64,
}
