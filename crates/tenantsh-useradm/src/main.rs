//! Credential administration CLI.
//!
//! Grounded in the reference `manage_users.py` helper: add a user to the
//! flat credential file, refusing to overwrite an existing one.

use clap::{Parser, Subcommand};
use tenantsh_core::config::DEFAULT_CREDENTIALS_PATH;

#[derive(Parser)]
#[command(name = "tenantsh-useradm", about = "Manage tenantsh gateway credentials")]
struct Cli {
    /// Path to the credential file.
    #[arg(short, long, default_value = DEFAULT_CREDENTIALS_PATH)]
    file: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add a new user, failing if the username already exists.
    Add {
        username: String,
        password: String,
        /// bcrypt work factor.
        #[arg(long, default_value_t = tenantsh_creds::DEFAULT_COST)]
        cost: u32,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Add { username, password, cost } => {
            tenantsh_creds::add_user(&cli.file, &username, &password, cost)
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }

    println!("ok");
}
