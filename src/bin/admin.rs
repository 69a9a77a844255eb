//! CLI administration tool for slug-shortener.
//!
//! Inspects and creates mappings directly against PostgreSQL, without going
//! through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Check database connection
//! cargo run --bin admin -- db check
//!
//! # Apply migrations
//! cargo run --bin admin -- db migrate
//!
//! # Show a mapping (does not count a visit)
//! cargo run --bin admin -- link show promo
//!
//! # Create a mapping
//! cargo run --bin admin -- link create https://example.com --slug promo
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (or `DB_*` components): PostgreSQL connection string
//! - `BASE_URL`: public prefix used to print short URLs

use slug_shortener::application::services::ShortenerService;
use slug_shortener::config::{Config, mask_connection_string};
use slug_shortener::domain::repositories::MappingRepository;
use slug_shortener::infrastructure::persistence::PgMappingRepository;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing slug-shortener.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage URL mappings
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Mapping subcommands.
#[derive(Subcommand)]
enum LinkAction {
    /// Show a mapping without counting a visit
    Show {
        /// Slug to look up
        slug: String,
    },

    /// Create a new mapping
    Create {
        /// Target URL (prompted for if omitted)
        url: Option<String>,

        /// Custom slug (generated if omitted)
        #[arg(short, long)]
        slug: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Apply bundled migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = Config::load_database_url().context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Link { action } => handle_link_action(action, pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool, &database_url).await?,
    }

    Ok(())
}

/// Dispatches mapping commands.
async fn handle_link_action(action: LinkAction, pool: PgPool) -> Result<()> {
    let base_url =
        std::env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:3000/url".to_string());
    let repository = Arc::new(PgMappingRepository::new(Arc::new(pool)));
    let service = ShortenerService::new(repository, base_url);

    match action {
        LinkAction::Show { slug } => show_link(&service, &slug).await?,
        LinkAction::Create { url, slug, yes } => create_link(&service, url, slug, yes).await?,
    }

    Ok(())
}

/// Prints a mapping with its visit count.
///
/// Fails when the slug is unknown, so the process exits non-zero.
async fn show_link<R: MappingRepository + ?Sized>(
    service: &ShortenerService<R>,
    slug: &str,
) -> Result<()> {
    println!("{}", "🔗 URL Mapping".bright_blue().bold());
    println!();

    let mapping = service
        .get(slug)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to show mapping '{}': {}", slug, e))?;

    println!("  Slug:      {}", mapping.slug.cyan());
    println!("  Short URL: {}", service.short_url(&mapping.slug).bright_yellow());
    println!("  Target:    {}", mapping.original_url);
    println!(
        "  Created:   {}",
        mapping
            .created_at
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string()
            .bright_black()
    );
    println!(
        "  Visits:    {}",
        mapping.visits.to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Creates a mapping with interactive prompts.
///
/// # Flow
///
/// 1. Prompt for target URL (or use provided)
/// 2. Display mapping details
/// 3. Confirm creation (unless `--yes` flag)
/// 4. Create through the shortener service (same validation as the API)
async fn create_link(
    service: &ShortenerService<PgMappingRepository>,
    url: Option<String>,
    slug: Option<String>,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "✨ Create URL Mapping".bright_blue().bold());
    println!();

    let original_url = match url {
        Some(u) => u,
        None => Input::new()
            .with_prompt("Target URL")
            .with_initial_text("https://")
            .interact_text()?,
    };

    println!("  Target: {}", original_url.cyan());
    match slug.as_deref().filter(|s| !s.is_empty()) {
        Some(s) => println!("  Slug:   {}", s.cyan()),
        None => println!("  Slug:   {}", "(generated)".bright_black()),
    }
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this mapping?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let mapping = service
        .create(original_url, slug)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create mapping: {}", e))?;

    println!("{}", "✅ Mapping created successfully!".green().bold());
    println!();
    println!(
        "  Short URL: {}",
        service.short_url(&mapping.slug).bright_yellow().bold()
    );
    println!();

    Ok(())
}

/// Dispatches database commands.
async fn handle_db_action(action: DbAction, pool: &PgPool, database_url: &str) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1")
                .execute(pool)
                .await
                .context("Database query failed")?;

            println!("{}", "✅ Database connection OK".green().bold());
            println!("  {}", mask_connection_string(database_url).bright_black());
        }
        DbAction::Migrate => {
            println!("{}", "📦 Applying migrations...".bright_blue());

            slug_shortener::server::migrate(pool).await?;

            let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM url_mappings")
                .fetch_one(pool)
                .await?;

            println!("{}", "✅ Migrations applied".green().bold());
            println!("  Mappings stored: {}", count.to_string().bright_white());
        }
    }

    Ok(())
}
