use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use civic_server::auth::hash_password;
use civic_server::config::DATABASE_FILE_NAME;
use civic_server::model::{AccountProfile, NewAccount, Role};
use civic_server::seed::seed_if_empty;
use civic_server::{CivicRepository, SqliteRepository};

/// Civic: administer a CivicMoncho database
#[derive(Parser, Debug)]
#[command(name = "civic")]
#[command(about = "Administer a CivicMoncho database", long_about = None)]
struct Cli {
    /// Path to the SQLite database
    #[arg(long, env = "CIVIC_DB", default_value = DATABASE_FILE_NAME)]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Insert sample projects and events into empty tables
    Seed,
    /// Create an active account without going through approval
    CreateUser(CreateUserArgs),
    /// List registrations waiting for approval
    Pending,
    /// Approve a pending registration
    Approve {
        /// Pending registration ID
        id: String,
    },
    /// Delete a pending registration
    Reject {
        /// Pending registration ID
        id: String,
    },
}

#[derive(Parser, Debug)]
struct CreateUserArgs {
    /// Email address used to log in
    username: String,

    /// Password (if not provided, will use CIVIC_USER_PASSWORD environment variable)
    #[arg(long, env = "CIVIC_USER_PASSWORD", hide_env_values = true)]
    password: String,

    #[arg(long, default_value = "citizen", value_parser = ["citizen", "governmental"])]
    role: String,

    #[arg(long)]
    first_name: String,

    #[arg(long)]
    last_name: String,

    /// `nid` or `birthCert`
    #[arg(long, default_value = "nid", value_parser = ["nid", "birthCert"])]
    id_type: String,

    #[arg(long)]
    id_number: String,

    #[arg(long)]
    mobile: String,

    #[arg(long)]
    thana: String,

    #[arg(long)]
    building: String,

    #[arg(long)]
    floor: Option<String>,

    #[arg(long)]
    street: String,

    #[arg(long, default_value = "Dhaka")]
    city: String,

    #[arg(long)]
    postal_code: String,

    #[arg(long, default_value = "Bangladesh")]
    country: String,
}

async fn run_seed(repo: &dyn CivicRepository) -> Result<()> {
    let report = seed_if_empty(repo).await.context("Failed to seed database")?;
    println!(
        "Inserted {} projects and {} events",
        report.projects, report.events
    );
    Ok(())
}

async fn run_create_user(repo: &dyn CivicRepository, args: CreateUserArgs) -> Result<()> {
    let role: Role = args
        .role
        .parse()
        .map_err(|e| anyhow!("Invalid role: {}", e))?;
    let password = args.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .context("Password hashing task failed")?
        .context("Failed to hash password")?;

    let profile = AccountProfile {
        username: args.username.trim().to_string(),
        role,
        first_name: args.first_name,
        last_name: args.last_name,
        id_type: args.id_type,
        id_number: args.id_number,
        building: args.building,
        floor: args.floor,
        street: args.street,
        thana: args.thana,
        city: args.city,
        postal_code: args.postal_code,
        country: args.country,
        mobile: args.mobile,
    };
    let user = repo
        .create_user(NewAccount {
            profile,
            password_hash,
        })
        .await
        .context("Failed to create user")?;
    info!(user_id = %user.id, role = %user.role(), "User created");
    println!("{}\t{}\t{}", user.id, user.profile.username, user.role());
    Ok(())
}

async fn run_pending(repo: &dyn CivicRepository) -> Result<()> {
    let pending = repo
        .list_pending_approvals()
        .await
        .context("Failed to list pending registrations")?;
    if pending.is_empty() {
        println!("No pending registrations");
        return Ok(());
    }
    for approval in pending {
        println!(
            "{}\t{}\t{} {}\t{}\t{}\t{}",
            approval.id,
            approval.profile.username,
            approval.profile.first_name,
            approval.profile.last_name,
            approval.profile.role,
            approval.profile.thana,
            approval.created_at.format("%Y-%m-%d %H:%M"),
        );
    }
    Ok(())
}

async fn run_approve(repo: &dyn CivicRepository, id: &str) -> Result<()> {
    let user = repo
        .approve_registration(id)
        .await
        .with_context(|| format!("Failed to approve registration {}", id))?;
    info!(user_id = %user.id, "Registration approved");
    println!("Approved {} ({})", user.profile.username, user.id);
    Ok(())
}

async fn run_reject(repo: &dyn CivicRepository, id: &str) -> Result<()> {
    let removed = repo
        .reject_registration(id)
        .await
        .with_context(|| format!("Failed to reject registration {}", id))?;
    if !removed {
        return Err(anyhow!("No pending registration with ID {}", id));
    }
    println!("Deleted pending registration {}", id);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let repo = SqliteRepository::new(&cli.db)
        .with_context(|| format!("Failed to open database {}", cli.db.display()))?;

    match cli.command {
        Commands::Seed => run_seed(&repo).await,
        Commands::CreateUser(args) => run_create_user(&repo, args).await,
        Commands::Pending => run_pending(&repo).await,
        Commands::Approve { id } => run_approve(&repo, &id).await,
        Commands::Reject { id } => run_reject(&repo, &id).await,
    }
}
