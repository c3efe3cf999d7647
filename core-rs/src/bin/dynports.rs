//! dynports - resolve listener ports for a service before it starts
//!
//! Command-line interface over the port assigner

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::net::IpAddr;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dynports_core::{
    ConnectorConfig, PortAssigner, PortFinderFactory, PortProbe, PortRange, ServerConfig,
    ServiceConfig, ServicePorts, TcpBindProbe, DEFAULT_CONFIG_FILE,
};

const REDACTED: &str = "********";

#[derive(Parser)]
#[command(name = "dynports")]
#[command(version)]
#[command(about = "Dynamic application/admin port assignment", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve ports for a service configuration and print the result
    Assign {
        /// Service bootstrap file
        #[arg(long, short, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
        /// Write the rewritten configuration to this file
        #[arg(long)]
        write: Option<PathBuf>,
    },
    /// Check whether a port can be bound right now
    Probe {
        port: u16,
        /// Address to bind (defaults to all interfaces)
        #[arg(long)]
        host: Option<IpAddr>,
    },
    /// Validate a port range and show its search budget
    Range { min: u32, max: u32 },
    /// List available port finder strategies
    Finders,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct AssignReport {
    ports: ServicePorts,
    server: ServerConfig,
}

/// Copy of `server` safe to print: TLS store passwords are masked
fn redacted(server: &ServerConfig) -> ServerConfig {
    let mut server = server.clone();
    for connector in server
        .application_connectors
        .iter_mut()
        .chain(server.admin_connectors.iter_mut())
    {
        if let ConnectorConfig::Https(https) = connector {
            https.key_store_password = REDACTED.to_string();
            https.trust_store_password = REDACTED.to_string();
        }
    }
    server
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("dynports={},dynports_core={},warn", level, level))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_assign(
    config_path: PathBuf,
    format: OutputFormat,
    write: Option<PathBuf>,
) -> Result<()> {
    let mut config = ServiceConfig::load(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    info!(
        assignment = %config.ports.assignment,
        security = %config.ports.security,
        finder = %config.ports.finder,
        "Resolving service ports"
    );

    let assigner = PortAssigner::new(config.ports.clone());
    let ports = assigner
        .assign_dynamic_ports(&mut config.server)
        .context("Port assignment failed")?;

    let report = AssignReport {
        ports,
        server: redacted(&config.server),
    };
    let rendered = match format {
        OutputFormat::Yaml => serde_yaml::to_string(&report)?,
        OutputFormat::Json => serde_json::to_string_pretty(&report)?,
    };
    println!("{}", rendered.trim_end());

    if let Some(out) = write {
        config
            .save(&out)
            .with_context(|| format!("Failed to write {}", out.display()))?;
        eprintln!("{} {}", "Wrote".green(), out.display());
    }

    Ok(())
}

fn handle_probe(port: u16, host: Option<IpAddr>) {
    let probe = host.map(TcpBindProbe::new).unwrap_or_default();

    if probe.is_available(port) {
        println!("{} {} on {}", port, "available".green(), probe.host());
    } else {
        println!("{} {} on {}", port, "in use".red(), probe.host());
    }
}

fn handle_range(min: u32, max: u32) -> Result<()> {
    let range = PortRange::new(min, max)?;

    println!("range:       {}", range);
    println!("portCount:   {}", range.port_count());
    println!("maxAttempts: {}", range.max_attempts());
    Ok(())
}

fn handle_finders() {
    for (i, name) in PortFinderFactory::names().into_iter().enumerate() {
        if i == 0 {
            println!("{} {}", name.bold(), "(default)".dimmed());
        } else {
            println!("{}", name);
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Assign {
            config,
            format,
            write,
        } => handle_assign(config, format, write),
        Commands::Probe { port, host } => {
            handle_probe(port, host);
            Ok(())
        }
        Commands::Range { min, max } => handle_range(min, max),
        Commands::Finders => {
            handle_finders();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
