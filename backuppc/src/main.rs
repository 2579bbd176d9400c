// SPDX-License-Identifier: AGPL-3.0-or-later
//! backuppc-host: BackupPC facts and role catalogs
//!
//! Run by the configuration-management agent as an external fact, or by an
//! operator to inspect what a role would declare on this host.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;

use backuppc_host::{
    catalog::{self, ClientParams, Role, ServerParams},
    config::{LoggingConfig, DEFAULT_CONFIG},
    facts::{self, FactRegistry, PublicKey},
    logging, Config,
};

/// backuppc-host: BackupPC host facts and role catalogs
///
/// Publishes the backuppc_hosts and backuppc_pubkey_rsa facts and compiles
/// the backuppc::client / backuppc::server resource catalogs.
#[derive(Parser, Debug)]
#[command(name = "backuppc-host")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "backuppc-host.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print facts for the agent
    Facts {
        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: FactFormat,

        /// Only these facts (default: all)
        names: Vec<String>,
    },

    /// Compile a role catalog
    #[command(subcommand)]
    Catalog(RoleCommand),

    /// Show the BackupPC public key and its fingerprint
    Pubkey {
        /// Key file (default: the configured pubkey_file)
        path: Option<PathBuf>,
    },

    /// Show configuration
    Config,

    /// Initialize a new configuration file
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand, Debug)]
enum RoleCommand {
    /// backuppc::client
    Client {
        #[command(flatten)]
        host: HostArgs,

        /// BackupPC server allowed to pull backups
        #[arg(long)]
        backuppc_hostname: String,

        /// Server key material to authorize
        #[arg(long)]
        pubkey: Option<String>,
    },

    /// backuppc::server
    Server {
        #[command(flatten)]
        host: HostArgs,

        /// Web interface password
        #[arg(long, env = "BACKUPPC_PASSWORD", hide_env_values = true)]
        backuppc_password: String,

        /// Web interface user
        #[arg(long, default_value = "backuppc")]
        backuppc_user: String,
    },
}

#[derive(Args, Debug)]
struct HostArgs {
    /// OS family of the target host (Debian, RedHat)
    #[arg(long)]
    osfamily: Option<String>,

    /// JSON facts document to read osfamily from
    #[arg(long)]
    facts_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FactFormat {
    /// A single JSON object
    Json,
    /// name=value lines
    Text,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Cli {
        config: config_path,
        verbose,
        debug,
        command,
    } = cli;

    // These never read the config file, so a broken one can still be replaced
    let command = match command {
        Commands::Version => {
            println!("backuppc-host v{}", env!("CARGO_PKG_VERSION"));
            println!("BackupPC facts and role catalogs");
            return Ok(());
        }

        Commands::Init { force } => {
            init_logging(debug, verbose, &LoggingConfig::default());
            return init_config(&config_path, force);
        }

        Commands::Catalog(role) => {
            init_logging(debug, verbose, &LoggingConfig::default());
            return compile_catalog(role);
        }

        other => other,
    };

    let config = Config::load_or_default(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    init_logging(debug, verbose, &config.logging);

    match command {
        Commands::Facts { format, names } => print_facts(&config, format, &names),

        Commands::Pubkey { path } => {
            let path = path.unwrap_or_else(|| config.facts.pubkey_file.clone());
            show_pubkey(&path)
        }

        _ => show_config(&config_path, &config),
    }
}

fn init_logging(debug: bool, verbose: bool, logging_config: &LoggingConfig) {
    let level = logging::effective_level(debug, verbose, &logging_config.level);
    logging::init(&level, logging_config, debug);
}

/// Initialize a new configuration file
fn init_config(config_path: &Path, force: bool) -> anyhow::Result<()> {
    if config_path.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    info!("Created configuration file: {}", config_path.display());
    println!("Created configuration file: {}", config_path.display());
    Ok(())
}

/// Show the effective configuration
fn show_config(config_path: &Path, config: &Config) -> anyhow::Result<()> {
    if !config_path.exists() {
        println!("No configuration file found. Using defaults:");
        println!();
    }

    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

/// Collect and print facts
fn print_facts(config: &Config, format: FactFormat, names: &[String]) -> anyhow::Result<()> {
    let registry = FactRegistry::standard(&config.facts);

    let collected = if names.is_empty() {
        registry.collect()
    } else {
        registry.collect_named(names)?
    };

    info!(count = collected.len(), "Collected facts");

    match format {
        FactFormat::Json => println!("{}", serde_json::to_string(&collected)?),
        FactFormat::Text => print!("{}", facts::render_text(&collected)),
    }

    Ok(())
}

/// Print the parsed public key
fn show_pubkey(path: &Path) -> anyhow::Result<()> {
    let key = PublicKey::from_file(path)
        .with_context(|| format!("Failed to read public key {}", path.display()))?;

    println!("Algorithm:   {}", key.algorithm);
    println!("Key:         {}", key.key);
    if let Some(comment) = &key.comment {
        println!("Comment:     {}", comment);
    }
    println!("Fingerprint: {}", key.fingerprint()?);
    Ok(())
}

/// Compile a role and print the catalog as JSON
fn compile_catalog(command: RoleCommand) -> anyhow::Result<()> {
    let (host, role) = match command {
        RoleCommand::Client {
            host,
            backuppc_hostname,
            pubkey,
        } => {
            let mut params = ClientParams::new(backuppc_hostname);
            params.pubkey = pubkey;
            (host, Role::Client(params))
        }
        RoleCommand::Server {
            host,
            backuppc_password,
            backuppc_user,
        } => {
            let mut params = ServerParams::new(backuppc_password);
            params.backuppc_user = backuppc_user;
            (host, Role::Server(params))
        }
    };

    let osfamily = resolve_osfamily(&host)?;
    info!(class = role.class(), osfamily = %osfamily, "Compiling catalog");

    let compiled = catalog::compile(&osfamily, &role)?;
    println!("{}", compiled.to_json_pretty()?);
    Ok(())
}

/// `--osfamily` wins; otherwise read it from `--facts-file`
fn resolve_osfamily(host: &HostArgs) -> anyhow::Result<String> {
    if let Some(osfamily) = &host.osfamily {
        return Ok(osfamily.clone());
    }

    let Some(facts_file) = &host.facts_file else {
        anyhow::bail!("No OS family given. Pass --osfamily or --facts-file.");
    };

    let contents = std::fs::read_to_string(facts_file)
        .with_context(|| format!("Failed to read facts file {}", facts_file.display()))?;
    let document: serde_json::Value = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse facts file {}", facts_file.display()))?;

    catalog::osfamily_from_facts(&document)
        .map(str::to_string)
        .with_context(|| format!("No osfamily fact in {}", facts_file.display()))
}
