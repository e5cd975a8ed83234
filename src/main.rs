use aod_export::utils::{logger, validation::Validate};
use aod_export::{
    connect, AppConfig, CliArgs, DryRunSubmitter, EarthEngineClient, ExportEngine, ExportError,
    InteractiveAuthenticator, LogFormat, OAuthClient,
};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // 初始化日誌
    match args.log_format {
        LogFormat::Text => logger::init_cli_logger(args.verbose),
        LogFormat::Json => logger::init_json_logger(args.verbose),
    }

    tracing::info!("🚀 Starting aod-export");

    if let Err(e) = run(&args).await {
        tracing::error!("❌ Export run failed: {}", e);
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e);
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }

    Ok(())
}

async fn run(args: &CliArgs) -> Result<(), ExportError> {
    let mut config = match &args.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path.display());
            AppConfig::from_file(path)?
        }
        None => AppConfig::default(),
    };
    args.apply_overrides(&mut config);

    // 驗證配置
    config.validate()?;
    tracing::debug!("Configuration: {:?}", config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no tasks will be submitted");
        ExportEngine::new(DryRunSubmitter, config.export).run().await?;
        return Ok(());
    }

    let oauth = OAuthClient::new(config.earth_engine.clone());
    let credentials_path = config.earth_engine.credentials_path();
    let authenticator = InteractiveAuthenticator::new(oauth.clone(), credentials_path.clone());
    let session = connect(&oauth, &credentials_path, &authenticator).await?;

    let client = EarthEngineClient::new(&config.earth_engine, session);
    let submitted = ExportEngine::new(client, config.export).run().await?;
    for task in &submitted {
        tracing::info!(
            "📋 {} -> task {} ({:.2}s)",
            task.description,
            task.handle.id(),
            task.elapsed.as_secs_f64()
        );
    }
    tracing::info!("✅ {} export tasks registered", submitted.len());

    Ok(())
}
