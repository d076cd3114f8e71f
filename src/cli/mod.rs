use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "secret-inject",
    version,
    about = "Substitute secret placeholders in Kubernetes manifests"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print manifests with every placeholder replaced.
    Generate(GenerateOpts),
    Config(ConfigOpts),
    Version,
}

#[derive(clap::Args)]
pub struct GenerateOpts {
    #[arg(short, long, env = "SECRET_INJECT_CONFIG")]
    pub config: Option<String>,
    /// Manifest file, directory of `*.yaml`/`*.yml` files, or `-` for stdin.
    pub path: String,
}

#[derive(clap::Args)]
pub struct ConfigOpts {
    #[arg(short, long, env = "SECRET_INJECT_CONFIG")]
    pub config: Option<String>,
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    Show,
    Validate,
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_generate() {
        let cli = Cli::try_parse_from(["secret-inject", "generate", "-c", "cfg.yaml", "-"]).unwrap();
        match cli.command {
            Commands::Generate(opts) => {
                assert_eq!(opts.config.as_deref(), Some("cfg.yaml"));
                assert_eq!(opts.path, "-");
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn parses_config_action() {
        let cli = Cli::try_parse_from(["secret-inject", "config", "validate"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config(ConfigOpts {
                action: ConfigAction::Validate,
                ..
            })
        ));
    }

    #[test]
    fn generate_requires_path() {
        assert!(Cli::try_parse_from(["secret-inject", "generate"]).is_err());
    }
}
