pub mod toml_config;

pub use toml_config::TapConfig;

#[cfg(feature = "cli")]
use crate::core::etl::Mode;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "bloomerang-tap")]
#[command(about = "Sync Bloomerang collections as a Singer message stream")]
pub struct CliConfig {
    /// Path to the TOML tap configuration
    #[arg(short, long, default_value = "tap-config.toml")]
    pub config: String,

    #[arg(long, value_enum, default_value_t = Mode::Tap)]
    pub mode: Mode,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Write logs as JSON lines")]
    pub json_logs: bool,
}
