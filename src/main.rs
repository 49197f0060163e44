use anyhow::Context;
use clap::Parser;
use org_profile::utils::{logger, validation::Validate};
use org_profile::{CliConfig, Command, ProfileError, ProfileService};
use serde::Serialize;

fn print_json<T: Serialize>(value: &T) -> Result<(), ProfileError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: &CliConfig, service: &ProfileService) -> Result<(), ProfileError> {
    match &cli.command {
        Command::Profile { name } => {
            let profile = service.get_profile(name).await?;
            print_json(&profile.snapshot())
        }
        Command::Summary { source, name } => {
            let summary = service.get_org_summary(*source, name).await?;
            print_json(&summary.snapshot())
        }
        Command::Repos { source, name } => {
            let repos = service.list_raw_repos(*source, name).await?;
            print_json(&repos)
        }
        Command::Health => {
            println!("All Good!");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = cli
        .resolve()
        .with_context(|| format!("loading configuration from {:?}", cli.config))?;

    if cli.json_logs {
        logger::init_json_logger(&config.log_level);
    } else {
        logger::init_cli_logger(&config.log_level);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    let service = ProfileService::from_config(&config).context("building HTTP client")?;

    if let Err(e) = run(&cli, &service).await {
        tracing::error!("❌ Unable to construct profile: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    Ok(())
}
