use clap::Parser;
use gift_exchange::adapters::confirm::{AutoConfirm, StdinConfirmation};
use gift_exchange::utils::{logger, validation::Validate};
use gift_exchange::{
    CliConfig, Confirmation, DispatchSummary, ExchangeEngine, ExchangeError, ExchangeSetup,
    Notifier, TomlConfig,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliConfig::parse();

    // 初始化日誌
    if args.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🎁 Starting gift-exchange");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    args.apply_overrides(&mut config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded for '{}'", config.exchange_name());

    let setup = config.to_setup()?;
    let notifier = config.notifier()?;

    if args.show_matching {
        let engine = ExchangeEngine::new(setup, notifier, AutoConfirm);
        return match engine.plan() {
            Ok(plan) => {
                for line in plan.matching.describe(engine.registry()) {
                    println!("{}", line);
                }
                Ok(())
            }
            Err(e) => exit_with(e),
        };
    }

    let result = if config.is_dry_run() {
        tracing::info!("🔍 Doing a dry-run of matching!");
        run(setup, notifier, AutoConfirm).await
    } else if args.yes {
        run(setup, notifier, AutoConfirm).await
    } else {
        run(setup, notifier, StdinConfirmation).await
    };

    match result {
        Ok(summary) => {
            println!("Done! {} messages delivered", summary.delivered);
            if !summary.is_complete() {
                for assignment in &summary.dead_letters {
                    eprintln!("⚠️  Not delivered: {}", assignment.source);
                }
                std::process::exit(2);
            }
            Ok(())
        }
        Err(e) => exit_with(e),
    }
}

async fn run<C: Confirmation>(
    setup: ExchangeSetup,
    notifier: Arc<dyn Notifier>,
    confirmation: C,
) -> gift_exchange::Result<DispatchSummary> {
    ExchangeEngine::new(setup, notifier, confirmation).run().await
}

fn exit_with(e: ExchangeError) -> anyhow::Result<()> {
    tracing::error!(
        "❌ Gift exchange failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = e.exit_code();
    if exit_code > 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}
