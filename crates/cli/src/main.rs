//! Recipe Accounts CLI - Database migrations and user management.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! accounts-cli migrate
//!
//! # Create a user
//! accounts-cli user create -e cook@example.com -p 'correct horse' -n "Cook"
//!
//! # Create a superuser
//! accounts-cli user create -e admin@example.com -p 'correct horse' --superuser
//!
//! # Deactivate a user
//! accounts-cli user deactivate -e cook@example.com
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "accounts-cli")]
#[command(author, version, about = "Recipe Accounts CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Initial password
        #[arg(short, long)]
        password: String,

        /// Display name
        #[arg(short, long)]
        name: Option<String>,

        /// Create a superuser (staff + superuser flags)
        #[arg(long)]
        superuser: bool,
    },
    /// Deactivate a user
    Deactivate {
        /// Email address
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                password,
                name,
                superuser,
            } => {
                commands::user::create(&email, &password, name.as_deref(), superuser).await?;
            }
            UserAction::Deactivate { email } => commands::user::deactivate(&email).await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_create_superuser() {
        let cli = Cli::try_parse_from([
            "accounts-cli",
            "user",
            "create",
            "-e",
            "admin@example.com",
            "-p",
            "secret123",
            "--superuser",
        ]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::User {
                action: UserAction::Create {
                    superuser: true,
                    name: None,
                    ..
                }
            })
        ));
    }
}
