//! Clearance CLI - Main entry point

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clearance_rpc::{commands, AppContext};
use clearance_workflow::ClearanceConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "clearance")]
#[command(about = "Clearance - multi-department student clearance", long_about = None)]
struct Cli {
    /// Data directory path
    #[arg(short, long, default_value = "./data")]
    data: PathBuf,

    /// Workflow configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a student
    Register {
        /// Student ID
        id: String,
        /// Full name
        name: String,
        /// Contact address for notifications
        contact: String,
    },

    /// Request clearance from a department
    Submit {
        /// Student ID
        subject: String,
        /// finance, library, department, hostel or administration
        department: String,
    },

    /// Approve or reject a request
    Resolve {
        /// Request ID
        request: String,
        /// approved or rejected
        decision: String,
    },

    /// Show a student's clearance status
    Status {
        /// Student ID
        subject: String,
    },

    /// List requests
    Requests {
        /// Filter by student ID
        #[arg(long)]
        subject: Option<String>,
        /// Filter by department
        #[arg(long)]
        department: Option<String>,
        /// Filter by status (pending, approved, rejected)
        #[arg(long)]
        status: Option<String>,
    },

    /// Check every status snapshot against the request ledger
    Verify,

    /// Request counts by status
    Stats,

    /// Generate a token signing key
    Keygen {
        /// Output file path
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Issue an identity token for a student
    Token {
        /// Student ID
        subject: String,
    },

    /// Show the status of the student holding a token
    Mine {
        /// Identity token
        #[arg(long)]
        token: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Keygen needs no data directory
    if let Commands::Keygen { output } = &cli.command {
        return commands::keygen(output.as_deref());
    }

    let config = match &cli.config {
        Some(path) => ClearanceConfig::from_file(path)?,
        None => ClearanceConfig::default(),
    };
    let mut ctx = AppContext::new(&cli.data, config)?;

    match cli.command {
        Commands::Register { id, name, contact } => {
            commands::register(&mut ctx, &id, &name, &contact)?;
        }

        Commands::Submit {
            subject,
            department,
        } => {
            commands::submit(&mut ctx, &subject, &department).await?;
        }

        Commands::Resolve { request, decision } => {
            commands::resolve(&mut ctx, &request, &decision).await?;
        }

        Commands::Status { subject } => {
            commands::status(&ctx, &subject)?;
        }

        Commands::Requests {
            subject,
            department,
            status,
        } => {
            commands::requests(
                &ctx,
                subject.as_deref(),
                department.as_deref(),
                status.as_deref(),
            )?;
        }

        Commands::Verify => commands::verify(&ctx)?,

        Commands::Stats => commands::stats(&ctx)?,

        Commands::Token { subject } => {
            commands::token(&ctx, &subject)?;
        }

        Commands::Mine { token } => {
            commands::mine(&ctx, &token)?;
        }

        Commands::Keygen { .. } => {}
    }

    Ok(())
}
