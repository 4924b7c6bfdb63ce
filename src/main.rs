use anyhow::Context;
use clap::Parser;
use poll_sample_size::core::ConfigProvider;
use poll_sample_size::utils::{logger, validation::Validate};
use poll_sample_size::{
    CliConfig, FileTimestampStore, ReportEngine, SurveyError, SystemClock, TomlConfig,
};

fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting poll-sample-size");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let outcome = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            TomlConfig::from_file(path).and_then(|mut file_config| {
                file_config.apply_cli_overrides(&cli);
                run(&file_config)
            })
        }
        None => run(&cli),
    };

    match outcome {
        Ok((rendered, output_path)) => match output_path {
            Some(path) => {
                std::fs::write(&path, rendered)
                    .with_context(|| format!("failed to write report to {}", path))?;
                tracing::info!("📁 Output saved to: {}", path);
            }
            None => println!("{}", rendered),
        },
        Err(e) => {
            tracing::error!(
                "❌ Sample size report failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            std::process::exit(e.severity().exit_code());
        }
    }

    Ok(())
}

/// Validates, runs the engine and renders; returns the output and its destination.
fn run<C: ConfigProvider + Validate>(
    config: &C,
) -> Result<(String, Option<String>), SurveyError> {
    config.validate()?;
    tracing::info!("✅ Configuration validated");

    let store = FileTimestampStore::new(config.timestamp_file());
    let engine = ReportEngine::new(store, SystemClock);
    let report = engine.run(config)?;
    let rendered = report.render(config.output_format())?;

    Ok((rendered, config.output_path().map(str::to_string)))
}
