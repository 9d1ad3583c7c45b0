/// Contacts Server - contacts REST API and operator commands
use anyhow::Context;
use clap::{Parser, Subcommand};
use contacts_core::{IdentityStore, Permission};
use contacts_server::{config::ServerConfig, create_router, AppState, AuthService};
use contacts_storage::Database;
use std::{net::SocketAddr, path::PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "contacts-server")]
#[command(about = "Contacts REST API server", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Create a new user
    AddUser {
        /// Username
        #[arg(short, long)]
        username: String,
        /// Password
        #[arg(short, long)]
        password: String,
        /// Allow every action regardless of grants
        #[arg(long)]
        superuser: bool,
        /// Permission to grant (view, add, change, delete); repeatable
        #[arg(short, long = "grant")]
        grants: Vec<Permission>,
    },
    /// Replace a user's password
    SetPassword {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Grant permissions to a user
    Grant {
        #[arg(short, long)]
        username: String,
        #[arg(required = true)]
        permissions: Vec<Permission>,
    },
    /// Revoke permissions from a user
    Revoke {
        #[arg(short, long)]
        username: String,
        #[arg(required = true)]
        permissions: Vec<Permission>,
    },
    /// List all users
    ListUsers,
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = ServerConfig::load(cli.config.as_deref())?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.default_log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Serve => serve(config).await?,
        Commands::AddUser {
            username,
            password,
            superuser,
            grants,
        } => add_user(&config, &username, &password, superuser, &grants).await?,
        Commands::SetPassword { username, password } => {
            set_password(&config, &username, &password).await?
        }
        Commands::Grant {
            username,
            permissions,
        } => change_grants(&config, &username, &permissions, true).await?,
        Commands::Revoke {
            username,
            permissions,
        } => change_grants(&config, &username, &permissions, false).await?,
        Commands::ListUsers => list_users(&config).await?,
        Commands::Migrate => {
            open_database(&config).await?;
            tracing::info!("Migrations applied to {}", config.storage.database_url);
        }
    }

    Ok(())
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    config.validate()?;

    tracing::info!("Starting Contacts Server");
    tracing::info!("Host: {}", config.server.host);
    tracing::info!("Port: {}", config.server.port);
    tracing::info!(
        "Mail backend: {:?}, notification policy: {:?}",
        config.mail.backend,
        config.notification.failure_policy
    );
    if config.debug {
        tracing::warn!("Debug mode is on; error details are returned to clients");
    }

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    let db = open_database(&config).await?;
    tracing::info!("Database connected");

    let app_state = AppState::from_config(config, db)?;
    let app = create_router(app_state);

    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn open_database(config: &ServerConfig) -> anyhow::Result<Database> {
    Database::connect(&config.storage.database_url)
        .await
        .with_context(|| format!("Failed to open {}", config.storage.database_url))
}

fn password_hasher(config: &ServerConfig) -> AuthService {
    AuthService::new(
        config.auth.secret_key.clone(),
        config.auth.access_token_hours,
        config.auth.refresh_token_days,
    )
    .with_bcrypt_cost(config.auth.bcrypt_cost)
}

async fn find_user(db: &Database, username: &str) -> anyhow::Result<contacts_core::User> {
    db.find_credentials(username)
        .await?
        .map(|(user, _)| user)
        .with_context(|| format!("No user named '{}'", username))
}

async fn add_user(
    config: &ServerConfig,
    username: &str,
    password: &str,
    superuser: bool,
    grants: &[Permission],
) -> anyhow::Result<()> {
    let db = open_database(config).await?;
    let password_hash = password_hasher(config).hash_password(password)?;

    let user = db.create_user(username, &password_hash, superuser).await?;
    for permission in grants {
        db.grant_permission(user.id, *permission).await?;
    }

    tracing::info!("Created user {} (id {})", user.username, user.id);
    Ok(())
}

async fn set_password(config: &ServerConfig, username: &str, password: &str) -> anyhow::Result<()> {
    let db = open_database(config).await?;
    let user = find_user(&db, username).await?;
    let password_hash = password_hasher(config).hash_password(password)?;

    contacts_storage::users::set_password_hash(db.pool(), user.id, &password_hash).await?;

    tracing::info!("Password updated for {}", user.username);
    Ok(())
}

async fn change_grants(
    config: &ServerConfig,
    username: &str,
    permissions: &[Permission],
    grant: bool,
) -> anyhow::Result<()> {
    let db = open_database(config).await?;
    let user = find_user(&db, username).await?;

    for permission in permissions {
        if grant {
            db.grant_permission(user.id, *permission).await?;
        } else {
            db.revoke_permission(user.id, *permission).await?;
        }
    }

    let user = db.get_user(user.id).await?;
    tracing::info!("{} now holds [{}]", user.username, user.grants);
    Ok(())
}

async fn list_users(config: &ServerConfig) -> anyhow::Result<()> {
    let db = open_database(config).await?;
    let users = db.list_users().await?;

    println!("Users:");
    for user in users {
        let role = if user.is_superuser { " (superuser)" } else { "" };
        println!("  {} - {}{} [{}]", user.id, user.username, role, user.grants);
    }

    Ok(())
}
