// SPDX-FileCopyrightText: 2026 Haiv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Haiv - credential custody for a collective node.
//!
//! Binary entry point: bootstraps, inspects, and rotates the node's own
//! master credentials, and generates X25519 keypairs for agent enrollment.

mod init;
mod keygen;
mod rotate;
mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use haiv_bootstrap::{BootstrapVault, CredentialType};
use haiv_config::HaivConfig;
use haiv_core::HaivError;

/// Haiv - credential custody for a collective node.
#[derive(Parser, Debug)]
#[command(name = "haiv", version, about, long_about = None)]
struct Cli {
    /// Configuration file to use instead of the standard search path.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the node's bootstrap key and master credentials.
    Init {
        /// Admin account name stored with the credentials.
        #[arg(long, default_value = "admin")]
        admin_username: String,
    },
    /// Show bootstrap state without revealing any secret.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Rotate the signing secret or one of the API tokens.
    Rotate {
        /// jwt_secret, admin_token, readonly_token or agent_token.
        credential: CredentialType,
        /// Who is performing the rotation.
        #[arg(long = "by")]
        rotated_by: String,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Replace the admin password.
    ResetPassword {
        #[arg(long = "by")]
        reset_by: String,
        /// New password. A random one is generated when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    /// Replace the vault master key.
    RotateMasterKey {
        #[arg(long = "by")]
        rotated_by: String,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Print a fresh X25519 keypair as hex.
    Keygen,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            haiv_config::render_errors(&errors);
            std::process::exit(1);
        }
    };
    init_tracing(&config.node.log_level);

    if let Err(e) = run(cli.command, &config).await {
        eprintln!("error: {e}");
        if e.is_fatal() {
            eprintln!("{}", fatal_hint(&e));
        }
        std::process::exit(1);
    }
}

fn load_config(
    path: Option<&std::path::Path>,
) -> Result<HaivConfig, Vec<haiv_config::ConfigError>> {
    match path {
        Some(path) => haiv_config::load_and_validate_path(path),
        None => haiv_config::load_and_validate(),
    }
}

async fn run(command: Commands, config: &HaivConfig) -> Result<(), HaivError> {
    match command {
        Commands::Init { admin_username } => {
            init::run_init(&BootstrapVault::open(config).await?, &admin_username).await
        }
        Commands::Status { json } => {
            status::run_status(&BootstrapVault::open(config).await?, json).await
        }
        Commands::Rotate {
            credential,
            rotated_by,
            reason,
        } => {
            let vault = BootstrapVault::open(config).await?;
            rotate::run_rotate(&vault, credential, &rotated_by, reason.as_deref()).await
        }
        Commands::ResetPassword { reset_by, password } => {
            let vault = BootstrapVault::open(config).await?;
            rotate::run_reset_password(&vault, &reset_by, password).await
        }
        Commands::RotateMasterKey { rotated_by, reason } => {
            let vault = BootstrapVault::open(config).await?;
            rotate::run_rotate_master_key(&vault, &rotated_by, reason.as_deref()).await
        }
        Commands::Keygen => keygen::run_keygen(),
    }
}

/// Initialize the tracing subscriber with an env filter.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("haiv={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn fatal_hint(error: &HaivError) -> &'static str {
    match error {
        HaivError::BootstrapKeyMissing => {
            "The bootstrap key is gone and the stored credentials cannot be decrypted. \
             Discard the credential database, run `haiv init`, and re-issue every \
             secret that depended on the old credentials."
        }
        HaivError::Config(_) => {
            "The configuration cannot be used as given. Fix the reported value and retry."
        }
        _ => "A required cryptographic primitive failed. Refusing to continue.",
    }
}
