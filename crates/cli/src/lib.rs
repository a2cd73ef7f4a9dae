pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use prodcat_client::HttpCatalogClient;
use prodcat_core::config::{AppConfig, ConfigOverrides, LoadOptions, LogFormat};
use prodcat_core::{CatalogClient, CatalogStore, ProductDraft, ProductId};

use commands::edit::FieldChanges;
use commands::{CommandResult, EXIT_CONFIG};

#[derive(Debug, Parser)]
#[command(
    name = "prodcat",
    about = "Product catalog client",
    long_about = "List, add, edit and delete products held by a remote catalog service.",
    after_help = "Examples:\n  prodcat list\n  prodcat add --name Lamp --description 'Desk lamp' --price 19.99\n  prodcat edit 7 --price 21\n  prodcat delete 7\n  prodcat config"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a prodcat.toml config file")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Override remote.base_url")]
    base_url: Option<String>,
    #[arg(long, global = true, help = "Override remote.timeout_secs")]
    timeout_secs: Option<u64>,
    #[arg(long, global = true, help = "Override logging.level")]
    log_level: Option<String>,
    #[arg(long, global = true, help = "Override logging.format (compact|pretty|json)")]
    log_format: Option<LogFormat>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(flatten)]
    Catalog(CatalogCommand),
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CatalogCommand {
    #[command(about = "Load and print the product list")]
    List,
    #[command(about = "Validate and create a product")]
    Add {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        price: String,
    },
    #[command(about = "Edit an existing product; omitted fields keep their current value")]
    Edit {
        id: ProductId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        price: Option<String>,
    },
    #[command(about = "Delete a product by id")]
    Delete { id: ProductId },
}

impl CatalogCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Add { .. } => "add",
            Self::Edit { .. } => "edit",
            Self::Delete { .. } => "delete",
        }
    }
}

impl Cli {
    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_path: self.config.clone(),
            require_file: self.config.is_some(),
            overrides: ConfigOverrides {
                remote_base_url: self.base_url.clone(),
                remote_timeout_secs: self.timeout_secs,
                log_level: self.log_level.clone(),
                log_format: self.log_format,
            },
        }
    }
}

pub async fn run() -> ExitCode {
    let result = execute(Cli::parse()).await;

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

pub async fn execute(cli: Cli) -> CommandResult {
    let options = cli.load_options();
    let command = match cli.command {
        Command::Config => return commands::config::run(options),
        Command::Catalog(command) => command,
    };

    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                command.name(),
                "config_validation",
                format!("config validation failed: {error}"),
                EXIT_CONFIG,
            )
        }
    };
    init_logging(&config);

    let store = match build_store(&config) {
        Ok(store) => store,
        Err(error) => {
            return CommandResult::failure(
                command.name(),
                "client_setup",
                format!("{error:#}"),
                EXIT_CONFIG,
            )
        }
    };

    dispatch(&store, command).await
}

/// Runs one catalog command against `store`, starting with the initial list load.
pub async fn dispatch<C: CatalogClient>(
    store: &CatalogStore<C>,
    command: CatalogCommand,
) -> CommandResult {
    match command {
        CatalogCommand::List => commands::list::run(store).await,
        CatalogCommand::Add { name, description, price } => {
            commands::add::run(store, ProductDraft::new(name, description, price)).await
        }
        CatalogCommand::Edit { id, name, description, price } => {
            commands::edit::run(store, &id, FieldChanges { name, description, price }).await
        }
        CatalogCommand::Delete { id } => commands::delete::run(store, &id).await,
    }
}

fn build_store(config: &AppConfig) -> anyhow::Result<CatalogStore<HttpCatalogClient>> {
    let client = HttpCatalogClient::from_config(&config.remote)
        .with_context(|| format!("could not build client for `{}`", config.remote.base_url))?;
    Ok(CatalogStore::new(client))
}

fn init_logging(config: &AppConfig) {
    use prodcat_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    // A subscriber may already be installed when commands run in-process.
    let _ = match config.logging.format {
        Compact => builder.compact().try_init(),
        Pretty => builder.pretty().try_init(),
        Json => builder.json().try_init(),
    };
}
