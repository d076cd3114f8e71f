use anyhow::Context;
use clap::Parser;
use secret_inject::cli::{Cli, Commands, ConfigAction};
use secret_inject::config::{validate_config, Config, DEFAULT_CONFIG_FILE};
use secret_inject::generate::{generate, read_inputs};
use secret_inject::logging;
use std::path::Path;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(opts) => {
            let config = Config::load(opts.config.as_deref())?;
            let input = read_inputs(&opts.path)
                .with_context(|| format!("failed to read manifests from {}", opts.path))?;
            let output = generate(&input, &config)
                .await
                .with_context(|| format!("failed to generate manifests from {}", opts.path))?;
            print!("{output}");
        }
        Commands::Config(opts) => match opts.action {
            ConfigAction::Show => {
                let config = Config::load(opts.config.as_deref())?;
                println!("{}", serde_yaml::to_string(&config)?);
            }
            ConfigAction::Validate => {
                let config = Config::load(opts.config.as_deref())?;
                let problems = validate_config(&config);
                if !problems.is_empty() {
                    for problem in &problems {
                        error!("{problem}");
                    }
                    anyhow::bail!("configuration has {} problem(s)", problems.len());
                }
                info!("Configuration is valid");
            }
            ConfigAction::Init => {
                let path = opts.config.as_deref().unwrap_or(DEFAULT_CONFIG_FILE);
                if Path::new(path).exists() {
                    warn!("Overwriting existing configuration at {path}");
                }
                Config::write_default(Path::new(path))
                    .with_context(|| format!("failed to write {path}"))?;
                info!("Configuration file created at {path}");
            }
        },
        Commands::Version => {
            println!("secret-inject {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
