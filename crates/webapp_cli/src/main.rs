//! Command-line front end for the application store.
//!
//! # Responsibility
//! - Install, uninstall and list applications without a rendering host.
//! - Print machine-readable JSON for listing commands.

use clap::{Args, Parser, Subcommand};
use log::error;
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use webapp_core::{
    init_logging_from_config, open_db, ApplicationId, ApplicationRecord, ApplicationService,
    RuntimeConfig, ServiceCollaborators, ServiceError, SqliteApplicationStore,
};

#[derive(Parser)]
#[command(name = "webapp", version, about = "Web application store utilities")]
struct Cli {
    #[command(flatten)]
    location: LocationArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct LocationArgs {
    /// JSON runtime config; takes precedence over --data-path
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory holding the store, resources and logs
    #[arg(long, global = true, env = "WEBAPP_DATA_PATH")]
    data_path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Install a package archive or an unpacked application directory
    Install { source: PathBuf },
    /// Uninstall an application by id
    Uninstall { id: String },
    /// List installed applications (JSON)
    List,
    /// Show one installed application (JSON)
    Show { id: String },
    /// Print the runtime core version
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    if let Commands::Version = cli.command {
        println!("webapp_core version={}", webapp_core::core_version());
        return Ok(());
    }

    let config = resolve_config(&cli.location)?;
    std::fs::create_dir_all(&config.data_path)
        .map_err(|err| format!("{}: {err}", config.data_path.display()))?;
    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("warning: file logging disabled: {err}");
    }

    let conn = open_db(config.database_path()).map_err(|err| err.to_string())?;
    let store = SqliteApplicationStore::new(&conn);
    let mut service = ApplicationService::new(config, store, ServiceCollaborators::headless());

    match cli.command {
        Commands::Install { source } => match service.install(&source) {
            Ok(report) => {
                println!("installed {}", report.id);
                Ok(())
            }
            Err(ServiceError::AlreadyInstalled { id }) => {
                println!("already installed {id}");
                Ok(())
            }
            Err(err) => Err(err.to_string()),
        },
        Commands::Uninstall { id } => {
            let id = parse_id(&id)?;
            service.uninstall(&id).map_err(|err| err.to_string())?;
            println!("uninstalled {id}");
            Ok(())
        }
        Commands::List => {
            let records = service
                .installed_applications()
                .map_err(|err| err.to_string())?;
            let rows: Vec<_> = records.iter().map(record_json).collect();
            print_json(&json!({ "applications": rows }))
        }
        Commands::Show { id } => {
            let id = parse_id(&id)?;
            match service.application(&id).map_err(|err| err.to_string())? {
                Some(record) => print_json(&record_json(&record)),
                None => Err(format!("application is not installed: {id}")),
            }
        }
        Commands::Version => Ok(()),
    }
}

fn resolve_config(location: &LocationArgs) -> Result<RuntimeConfig, String> {
    if let Some(path) = &location.config {
        return RuntimeConfig::load(path).map_err(|err| err.to_string());
    }
    let data_path = match &location.data_path {
        Some(path) => path.clone(),
        None => std::env::current_dir()
            .map_err(|err| err.to_string())?
            .join("webapp-data"),
    };
    let data_path = if data_path.is_relative() {
        std::env::current_dir()
            .map_err(|err| err.to_string())?
            .join(data_path)
    } else {
        data_path
    };
    Ok(RuntimeConfig::new(data_path))
}

fn parse_id(raw: &str) -> Result<ApplicationId, String> {
    ApplicationId::parse(raw.trim()).map_err(|err| {
        error!("event=cli_parse module=cli status=error error={err}");
        err.to_string()
    })
}

fn record_json(record: &ApplicationRecord) -> serde_json::Value {
    json!({
        "id": record.id,
        "name": record.manifest.name,
        "version": record.manifest.version,
        "path": record.path,
        "permissions": record.persistent_permissions,
    })
}

fn print_json(value: &serde_json::Value) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value).map_err(|err| err.to_string())?;
    println!("{text}");
    Ok(())
}
