use bloomerang_tap::core::tap::emit_tables;
use bloomerang_tap::utils::{logger, validation::Validate};
use bloomerang_tap::{
    BloomerangClient, BloomerangTap, Catalog, CliConfig, Mode, SingerWriter, TapConfig, TapEngine,
    TapError, TokioBackoff,
};
use clap::Parser;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting bloomerang-tap");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = run(&cli).await {
        tracing::error!("❌ Tap failed: {}", e);
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: &CliConfig) -> Result<(), TapError> {
    let mut writer = SingerWriter::stdout();

    // tables 模式不需要憑證
    if cli.mode == Mode::Tables {
        emit_tables(&Catalog::bloomerang(), &mut writer)?;
        return Ok(());
    }

    tracing::info!("📁 Loading configuration from: {}", cli.config);
    let config = TapConfig::from_file(&cli.config)?;
    config.validate()?;

    let client = BloomerangClient::with_timeout(config.base_url(), config.private_key(), config.timeout())?;
    let tap = BloomerangTap::new(
        client,
        writer,
        TokioBackoff,
        Catalog::bloomerang(),
        config.retry_policy(),
    );

    let mut engine = TapEngine::new(tap, config.streams());
    engine.run(cli.mode).await?;
    Ok(())
}
