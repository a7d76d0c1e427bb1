mod settings;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clap_complete::Shell;

use o2p_core::Orchestrator;
use o2p_core::config::{self, CONFIG_FILE_NAME, ProjectConfig};
use o2p_core::parse::deref::{FileDereferencer, dereference_file};
use o2p_postman::PostmanConverter;

use settings::ConvertArgs;

#[derive(Parser)]
#[command(
    name = "o2p",
    about = "Convert OpenAPI documents into Postman collections",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an OpenAPI document into a Postman v2.1 collection
    Convert(ConvertArgs),

    /// Print an OpenAPI document with every $ref inlined
    Dereference {
        /// Path to the root OpenAPI document
        #[arg(short, long)]
        input: PathBuf,

        /// Write compact instead of pretty-printed JSON
        #[arg(long)]
        compact: bool,
    },

    /// Initialize a new o2p configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert(args) => cmd_convert(args).await,

        Commands::Dereference { input, compact } => cmd_dereference(&input, compact).await,

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "o2p", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<ProjectConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    config::load_config(&config_path).map_err(|e| anyhow::anyhow!(e))
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

async fn cmd_convert(args: ConvertArgs) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let settings = settings::resolve(args, cfg)?;
    log::debug!(
        "converting {} for the {} environment",
        settings.input.display(),
        settings.environment.environment
    );

    let orchestrator = Orchestrator::new(FileDereferencer, PostmanConverter)
        .with_options(settings.options)
        .with_identity(settings.identity.clone());

    let conversion = orchestrator
        .convert(&settings.input, &settings.environment, settings.verbose)
        .await
        .with_context(|| format!("failed to convert {}", settings.input.display()))?;

    for diagnostic in &conversion.diagnostics {
        eprintln!("{diagnostic}");
    }

    let json = to_json(&conversion.collection, settings.pretty)?;
    match &settings.output {
        Some(path) => {
            write_output(path, &json)?;
            eprintln!(
                "Wrote {} request(s) to {}",
                conversion.collection.requests().len(),
                path.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

async fn cmd_dereference(input: &Path, compact: bool) -> Result<()> {
    let document = dereference_file(input)
        .await
        .with_context(|| format!("failed to dereference {}", input.display()))?;
    println!("{}", to_json(&document, !compact)?);
    Ok(())
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_convert_flags() {
        let cli = Cli::try_parse_from([
            "o2p",
            "convert",
            "--input",
            "openapi.json",
            "--environment",
            "acc",
            "--auth-method",
            "token",
            "--grant-type",
            "authorization_code",
            "--callback-url",
            "https://oauth.pstmn.io/v1/callback",
            "--auth-per-request",
            "--folder-strategy",
            "paths",
            "-v",
        ])
        .unwrap();
        match cli.command {
            Commands::Convert(args) => {
                assert_eq!(args.input, Some(PathBuf::from("openapi.json")));
                assert_eq!(args.environment, Some(o2p_core::config::Environment::Acc));
                assert_eq!(
                    args.grant_type,
                    Some(o2p_core::config::GrantType::AuthorizationCode)
                );
                assert!(args.auth_per_request);
                assert!(args.verbose);
            }
            _ => panic!("expected convert"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_environment() {
        let result = Cli::try_parse_from(["o2p", "convert", "--environment", "staging"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_write_output_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/nested/collection.json");
        write_output(&path, "{}").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn test_to_json_compact_and_pretty() {
        let value = serde_json::json!({ "a": 1 });
        assert_eq!(to_json(&value, false).unwrap(), r#"{"a":1}"#);
        assert_eq!(to_json(&value, true).unwrap(), "{\n  \"a\": 1\n}");
    }
}
