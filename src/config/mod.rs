pub mod toml_config;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "gift-exchange")]
#[command(about = "Match gift exchange participants and notify each of them")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "santa.toml")]
    pub config: String,

    /// Override the seed from the config file
    #[arg(long, allow_hyphen_values = true)]
    pub seed: Option<i64>,

    /// Override the number of concurrent senders
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Send every message to the sender address instead of the participants
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Print the matching instead of sending anything
    #[arg(long)]
    pub show_matching: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 將命令列覆蓋套用到檔案設定
    pub fn apply_overrides(&self, config: &mut toml_config::TomlConfig) {
        if let Some(seed) = self.seed {
            config.exchange.seed = Some(seed);
            tracing::info!("🔧 Seed overridden to: {}", seed);
        }
        if let Some(concurrency) = self.concurrency {
            config.exchange.concurrency = Some(concurrency);
            tracing::info!("🔧 Concurrency overridden to: {}", concurrency);
        }
        if self.dry_run {
            config.notifier.dry_run = Some(true);
        }
    }
}
