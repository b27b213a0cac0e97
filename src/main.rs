use std::fs;
use std::sync::Arc;

use anyhow::bail;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use depot::auth::TokenGenerator;
use depot::blob::FsBlobStore;
use depot::config::ServerConfig;
use depot::server::{AppState, create_router};
use depot::store::{SqliteStore, Store};
use depot::types::{Role, Token, User};

fn create_token(
    generator: &TokenGenerator,
    role: Role,
    user_id: Option<String>,
) -> anyhow::Result<(Token, String)> {
    let (raw_token, lookup, hash) = generator.generate()?;
    let token = Token {
        id: Uuid::new_v4().to_string(),
        token_hash: hash,
        token_lookup: lookup,
        role,
        user_id,
        created_at: Utc::now(),
        expires_at: None,
        last_used_at: None,
    };
    Ok((token, raw_token))
}

#[cfg(unix)]
fn set_restrictive_permissions(path: &std::path::Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        tracing::warn!("Failed to set permissions on {}: {e}", path.display());
    }
}

#[derive(Parser)]
#[command(name = "depot")]
#[command(about = "A self-hostable package registry", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Start the server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(long, short, default_value = "8080")]
        port: u16,

        /// Data directory for database and artifact blobs
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Public base URL for external access (e.g., "https://packages.example.com").
        /// Used for generating download locators. If not set, locators are relative.
        #[arg(long)]
        public_base_url: Option<String>,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Initialize the server (create database and super-user token)
    Init {
        /// Data directory for database and artifact blobs
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,
    },
}

fn run_init(data_dir: String, non_interactive: bool) -> anyhow::Result<()> {
    let data_path: std::path::PathBuf = data_dir.into();
    fs::create_dir_all(&data_path)?;

    let db_path = data_path.join("depot.db");
    let store = SqliteStore::new(&db_path)?;
    store.initialize()?;

    let token_file = data_path.join(".admin_token");

    if store.has_super_user_token()? {
        bail!(
            "Server already initialized. Super-user token exists at: {}",
            token_file.display()
        );
    }

    let generator = TokenGenerator::new();
    let (token, raw_token) = create_token(&generator, Role::SuperUser, None)?;

    store.create_token(&token)?;
    fs::write(&token_file, &raw_token)?;

    #[cfg(unix)]
    set_restrictive_permissions(&token_file);

    println!();
    println!("========================================");
    println!("Super-user token (save this, it won't be shown again):");
    println!();
    println!("  {raw_token}");
    println!();
    println!("Token also written to: {}", token_file.display());
    println!("========================================");
    println!();

    if !non_interactive {
        create_default_publisher_prompt(&store, &generator)?;
    }

    Ok(())
}

fn create_default_publisher_prompt(
    store: &SqliteStore,
    generator: &TokenGenerator,
) -> anyhow::Result<()> {
    let create_user = inquire::Confirm::new("Would you like to create a default publisher?")
        .with_default(false)
        .prompt()?;

    if !create_user {
        return Ok(());
    }

    let username = inquire::Text::new("Publisher name:")
        .with_validator(|input: &str| {
            if input.trim().is_empty() {
                Err("Publisher name cannot be empty".into())
            } else if input.contains(char::is_whitespace) {
                Err("Publisher name cannot contain whitespace".into())
            } else {
                Ok(inquire::validator::Validation::Valid)
            }
        })
        .prompt()?;

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4().to_string(),
        name: username.clone(),
        created_at: now,
        updated_at: now,
    };

    store.create_user(&user)?;

    let (user_token, raw_token) = create_token(generator, Role::Owner, Some(user.id.clone()))?;
    store.create_token(&user_token)?;

    println!();
    println!("========================================");
    println!("Created publisher '{username}' (owner id {}) with token:", user.id);
    println!();
    println!("  {raw_token}");
    println!();
    println!("========================================");
    println!();

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("depot=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::Init {
                data_dir,
                non_interactive,
            } => {
                run_init(data_dir, non_interactive)?;
            }
        },
        Commands::Serve {
            host,
            port,
            data_dir,
            public_base_url,
        } => {
            let config = ServerConfig {
                host,
                port,
                data_dir: data_dir.into(),
                public_base_url,
            };

            let token_file = config.data_dir.join(".admin_token");
            if !token_file.exists() {
                bail!(
                    "Server not initialized. Run 'depot admin init' first to create the database and super-user token."
                );
            }

            let store = SqliteStore::new(config.db_path())?;
            if !store.has_super_user_token()? {
                bail!(
                    "Server not initialized. Run 'depot admin init' first to create the database and super-user token."
                );
            }

            info!("Super-user token available at {}", token_file.display());

            let state = Arc::new(AppState::new(
                Arc::new(store),
                Arc::new(FsBlobStore::new(&config.data_dir)),
                config.public_base_url.clone(),
            ));

            let app = create_router(state);
            let addr = config.socket_addr()?;

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
