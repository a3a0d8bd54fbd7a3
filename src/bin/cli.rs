//! ChemTrack CLI
//!
//! Operator commands against the traceability backend:
//! - Check blockchain status
//! - Register chemicals and log movements
//! - Look up, verify and trace chemicals
//! - Render dashboard pages offline

use anyhow::{bail, Context as _};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use chemtrack::blockchain::{BlockchainClient, ChemicalRegistration, MovementEvent, MovementStatus};
use chemtrack::config::{generate_default_config, Config};
use chemtrack::dashboard;
use chemtrack::session::{AuthStore, FileStorage, Role};
use chemtrack::transport::ReqwestTransport;

#[derive(Parser)]
#[command(name = "chemtrack-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Chemical traceability from the command line")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Backend URL (overrides config and CHEMTRACK_BACKEND_URL)
    #[arg(long, global = true)]
    pub backend_url: Option<String>,

    /// Config file (default: search the usual locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show blockchain connection status
    Status,

    /// Register a chemical
    Register {
        name: String,
        /// RFID tag id
        rfid: String,
        manufacturer: String,
        /// Current location
        location: String,
        #[arg(short, long)]
        quantity: Option<f64>,
        #[arg(short, long, default_value = "L")]
        unit: String,
        /// Expiry date (YYYY-MM-DD)
        #[arg(long)]
        expiry: Option<String>,
        /// Received date (YYYY-MM-DD)
        #[arg(long)]
        received: Option<String>,
        #[arg(long)]
        storage: Option<String>,
        #[arg(long)]
        hazard: Option<String>,
        #[arg(long)]
        cas: Option<String>,
        #[arg(long)]
        batch: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },

    /// Log a movement event
    LogEvent {
        /// RFID tag id
        tag: String,
        /// New location
        location: String,
        moved_by: String,
        #[arg(long, default_value = "Transport")]
        purpose: String,
        /// in_transit, delivered, received, in_storage, in_use, disposed, ...
        #[arg(long, default_value = "in_transit")]
        status: MovementStatus,
        #[arg(long, default_value = "")]
        remarks: String,
    },

    /// Movement history, blockchain-verified when available
    History { tag: String },

    /// Find a chemical and its recorded movements
    Lookup { rfid: String },

    /// Verify a chemical on chain
    Verify { rfid: String },

    /// Print the HTML for a dashboard page
    Render {
        #[arg(long)]
        role: Role,
        #[arg(long, default_value = "dashboard")]
        page: String,
        /// Check the backend first so status cards show live values
        #[arg(long)]
        live_status: bool,
    },

    /// Configuration helpers
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Write the default config file
    Init {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.backend_url {
        config.backend.base_url = url.trim_end_matches('/').to_string();
    }
    chemtrack::logging::init(&config.logging);

    match cli.command {
        Commands::Config {
            action: ConfigCommand::Init { output },
        } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, content)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Config written to {}", path.display());
                }
                None => print!("{}", content),
            }
        }

        Commands::Render {
            role,
            page,
            live_status,
        } => {
            let status = if live_status {
                connect(&config)?.check_connection().await
            } else {
                Default::default()
            };
            let page = chemtrack::navigation::route_from_hash(&page);
            println!("{}", dashboard::page_content(Some(role), &page, &status));
        }

        Commands::Status => {
            let client = connect(&config)?;
            let status = client.check_connection().await;
            match cli.format {
                OutputFormat::Json => print_json(&status)?,
                OutputFormat::Table => {
                    println!("Backend:   {}", config.backend.base_url);
                    println!("Status:    {}", status.label());
                    println!("Provider:  {}", status.provider);
                    println!("Contract:  {}", status.short_contract_address());
                }
            }
            if !status.connected {
                std::process::exit(1);
            }
        }

        Commands::Register {
            name,
            rfid,
            manufacturer,
            location,
            quantity,
            unit,
            expiry,
            received,
            storage,
            hazard,
            cas,
            batch,
            description,
        } => {
            let chemical = ChemicalRegistration {
                name,
                rfid_tag: rfid,
                manufacturer,
                current_location: location,
                quantity,
                unit,
                expiry_date: expiry,
                received_date: received,
                storage_condition: storage,
                hazard_class: hazard,
                cas_number: cas,
                batch_number: batch,
                description,
            };
            let result = connect(&config)?.register_chemical(&chemical).await;
            match cli.format {
                OutputFormat::Json => print_json(&result)?,
                OutputFormat::Table => {
                    println!("{}", result.message);
                    if result.success {
                        println!(
                            "On chain:  {}",
                            if result.blockchain_status { "recorded" } else { "pending" }
                        );
                    }
                }
            }
            if !result.success {
                bail!("registration failed");
            }
        }

        Commands::LogEvent {
            tag,
            location,
            moved_by,
            purpose,
            status,
            remarks,
        } => {
            let event = MovementEvent {
                tag_id: tag,
                location,
                moved_by,
                purpose,
                status,
                remarks,
            };
            let result = connect(&config)?.log_event(&event).await;
            match cli.format {
                OutputFormat::Json => print_json(&result)?,
                OutputFormat::Table => {
                    println!("{}", result.message);
                    if result.partial_success {
                        println!("Warning: stored locally, blockchain verification failed");
                    }
                }
            }
            if !result.success {
                bail!("movement logging failed");
            }
        }

        Commands::History { tag } => {
            let result = connect(&config)?.get_chemical_history(&tag).await;
            match cli.format {
                OutputFormat::Json => print_json(&result)?,
                OutputFormat::Table => {
                    if !result.success {
                        bail!("{}", result.message);
                    }
                    if !result.blockchain_enabled {
                        println!("(unverified: blockchain history unavailable)");
                        println!();
                    }
                    println!("{:<22} {:<20} {:<14} {}", "Time", "Location", "Status", "Moved by");
                    println!("{}", "-".repeat(72));
                    for entry in &result.history {
                        println!(
                            "{:<22} {:<20} {:<14} {}",
                            entry.timestamp.as_deref().unwrap_or("-"),
                            entry.location,
                            entry.status.as_deref().unwrap_or("-"),
                            entry.moved_by.as_deref().unwrap_or("-")
                        );
                    }
                }
            }
        }

        Commands::Lookup { rfid } => {
            let client = connect(&config)?;
            let chemical = client.find_chemical(&rfid).await?;
            let movements = client.movement_history(&rfid).await?;
            match cli.format {
                OutputFormat::Json => print_json(&serde_json::json!({
                    "chemical": chemical,
                    "movements": movements,
                }))?,
                OutputFormat::Table => {
                    println!("Name:          {}", chemical.name);
                    println!("RFID:          {}", chemical.rfid_tag);
                    println!("Manufacturer:  {}", chemical.manufacturer);
                    println!("Location:      {}", chemical.location.as_deref().unwrap_or("Unknown"));
                    println!();
                    if movements.is_empty() {
                        println!("No movement history found.");
                    } else {
                        println!("{:<22} {:<18} {:<18} {:<12} {}", "Date", "From", "To", "Purpose", "Status");
                        println!("{}", "-".repeat(84));
                        for m in &movements {
                            println!(
                                "{:<22} {:<18} {:<18} {:<12} {}",
                                m.timestamp.as_deref().unwrap_or("-"),
                                m.from_location.as_deref().unwrap_or("Unknown"),
                                m.to_location,
                                m.purpose,
                                if m.verified { "Verified" } else { "Pending" }
                            );
                        }
                    }
                }
            }
        }

        Commands::Verify { rfid } => {
            let result = connect(&config)?.verify_chemical(&rfid).await?;
            match cli.format {
                OutputFormat::Json => print_json(&result)?,
                OutputFormat::Table => {
                    if result.verified {
                        match result.block_number {
                            Some(block) => println!("Verified on chain (block #{})", block),
                            None => println!("Verified on chain"),
                        }
                    } else {
                        println!("Not verified on chain");
                    }
                }
            }
        }
    }

    Ok(())
}

/// Client against the configured backend, signed in with the persisted session if any
fn connect(config: &Config) -> anyhow::Result<BlockchainClient> {
    let transport = Arc::new(ReqwestTransport::new(
        &config.backend.base_url,
        config.backend.request_timeout(),
    )?);
    let storage = Arc::new(FileStorage::new(&config.session.storage_path));
    let auth = AuthStore::new(transport.clone(), storage);

    let client = BlockchainClient::new(transport);
    client.set_auth_token(auth.restore().map(|s| s.token));
    Ok(client)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
