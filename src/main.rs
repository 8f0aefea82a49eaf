use anyhow::{anyhow, Context, Result};
use azrm::azure::auth::AzureCredentials;
use azrm::azure::client::ArmClient;
use azrm::azure::http::format_arm_error;
use azrm::commands::{self, Session};
use azrm::config::Config;
use azrm::document::Document;
use azrm::resource::Registry;
use azrm::state::StateStore;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Manage Azure Resource Manager objects from YAML or JSON documents
#[derive(Parser, Debug)]
#[command(name = "azrm", version, about, long_about = None)]
struct Args {
    /// Subscription to create objects in
    #[arg(short, long, global = true)]
    subscription_id: Option<String>,

    /// Azure AD tenant for client secret authentication
    #[arg(long, global = true)]
    tenant_id: Option<String>,

    /// Application id for client secret authentication
    #[arg(long, global = true)]
    client_id: Option<String>,

    /// Resource Manager endpoint
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// State file
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    /// Run in read-only mode (block all write operations)
    #[arg(long, global = true)]
    readonly: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Work with resource ids
    #[command(subcommand)]
    Id(IdCommand),

    /// Show the schema of a resource or data source
    Schema {
        /// Type name, e.g. azurerm_netapp_snapshot_policy
        object_type: Option<String>,
    },

    /// Validate a document without contacting Azure
    Validate { file: PathBuf },

    /// Create, update, replace or delete objects to match a document
    Apply { file: PathBuf },

    /// Show the recorded attributes of an object
    Read { address: String },

    /// Re-read every recorded object
    Refresh,

    /// Delete recorded objects
    Destroy {
        /// Only this address
        address: Option<String>,
    },

    /// Adopt an existing object
    Import {
        object_type: String,
        name: String,
        id: String,
    },

    /// Show or change the stored configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
enum IdCommand {
    /// List the known id types
    Types,

    /// Parse an id into its segments
    Parse {
        id_type: String,
        id: String,
        /// Ignore the case of literal segments
        #[arg(long)]
        insensitively: bool,
    },

    /// Check an id the way configuration validation does
    Validate { id_type: String, id: String },

    /// Build an id from segment=value pairs
    Format {
        id_type: String,
        #[arg(value_parser = parse_key_value)]
        segments: Vec<(String, String)>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    Show,
    Set { key: String, value: String },
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected segment=value, got {:?}", s))
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("azrm started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = Config::dir() {
        return config_dir.join("azrm.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".azrm").join("azrm.log");
    }
    PathBuf::from("azrm.log")
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn connect(args: &Args, config: &Config) -> Result<ArmClient> {
    let subscription_id = config.effective_subscription_id(args.subscription_id.as_deref())?;
    let tenant_id = config.effective_tenant_id(args.tenant_id.as_deref())?;
    let client_id = config.effective_client_id(args.client_id.as_deref());
    let endpoint = config.effective_endpoint(args.endpoint.as_deref());

    tracing::info!("Using subscription: {}, endpoint: {}", subscription_id, endpoint);

    let credentials = AzureCredentials::from_env(tenant_id, client_id)?;
    ArmClient::new(credentials, &subscription_id, &endpoint)
}

async fn run(args: Args) -> Result<()> {
    let mut config = Config::load();
    let registry = Registry::new();

    match &args.command {
        Command::Id(command) => run_id(command),
        Command::Schema { object_type: None } => {
            println!("Resources:");
            for name in registry.resource_types() {
                println!("  {}", name);
            }
            println!("Data sources:");
            for name in registry.data_source_types() {
                println!("  {}", name);
            }
            Ok(())
        }
        Command::Schema {
            object_type: Some(object_type),
        } => print_json(&commands::schema(&registry, object_type)?),
        Command::Validate { file } => {
            let document = Document::load(file)?;
            let mut failed = 0;
            for (address, validation) in commands::validate_document(&registry, &document) {
                for warning in &validation.warnings {
                    println!("{}: warning: {}", address, warning);
                }
                for error in &validation.errors {
                    println!("{}: error: {}", address, error);
                }
                if !validation.is_valid() {
                    failed += 1;
                }
            }
            if failed > 0 {
                return Err(anyhow!("{} block(s) failed validation", failed));
            }
            println!("{} is valid", file.display());
            Ok(())
        }
        Command::Config(ConfigCommand::Show) => print_json(&serde_json::to_value(&config)?),
        Command::Config(ConfigCommand::Set { key, value }) => {
            config.set(key, value)?;
            config.save()?;
            println!("{} = {}", key, value);
            Ok(())
        }
        Command::Read { address } => {
            let state = StateStore::load(config.effective_state_path(args.state.as_deref()))?;
            print_json(&commands::read(&registry, &state, address)?)
        }
        Command::Apply { .. }
        | Command::Refresh
        | Command::Destroy { .. }
        | Command::Import { .. } => run_session(&args, &config, &registry).await,
    }
}

/// Commands that need credentials and the state file
async fn run_session(args: &Args, config: &Config, registry: &Registry) -> Result<()> {
    let document = match &args.command {
        Command::Apply { file } => Some(Document::load(file)?),
        _ => None,
    };

    let state = StateStore::load(config.effective_state_path(args.state.as_deref()))?;
    let client = connect(args, config)?;
    let mut session = Session::new(registry, &client, state, args.readonly);

    match &args.command {
        Command::Apply { .. } => {
            let document = document.unwrap_or_default();
            for change in session.apply(&document).await? {
                println!("{}", change);
            }
            Ok(())
        }
        Command::Refresh => {
            for outcome in session.refresh().await? {
                println!("{}", outcome);
            }
            Ok(())
        }
        Command::Destroy { address } => {
            for change in session.destroy(address.as_deref()).await? {
                println!("{}", change);
            }
            Ok(())
        }
        Command::Import {
            object_type,
            name,
            id,
        } => {
            let address = session.import(object_type, name, id).await?;
            println!("{}: imported {}", address, id);
            Ok(())
        }
        other => Err(anyhow!("{:?} does not use the state file", other)),
    }
}

fn run_id(command: &IdCommand) -> Result<()> {
    match command {
        IdCommand::Types => {
            for id_type in azrm::services::id_types() {
                println!("{:<28} {}", id_type.name, id_type.parser().example());
            }
            Ok(())
        }
        IdCommand::Parse {
            id_type,
            id,
            insensitively,
        } => print_json(&commands::id_parse(id_type, id, *insensitively)?),
        IdCommand::Validate { id_type, id } => match commands::id_validate(id_type, id)? {
            Ok(()) => {
                println!("valid");
                Ok(())
            }
            Err(e) => Err(e.into()),
        },
        IdCommand::Format { id_type, segments } => {
            println!("{}", commands::id_format(id_type, segments)?);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let _log_guard = match setup_logging(args.log_level) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Error: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:#}", err);
            eprintln!("Error: {}", format_arm_error(&err));
            ExitCode::FAILURE
        }
    }
}
