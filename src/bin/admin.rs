//! CLI administration tool for link-shortener.
//!
//! Manages links directly in PostgreSQL without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Create a link with a generated code
//! cargo run --bin admin -- link create https://example.com
//!
//! # Create a link with a custom code that expires in one hour
//! cargo run --bin admin -- link create https://example.com --code promo --expires-in 3600
//!
//! # Show statistics for a code
//! cargo run --bin admin -- link stats promo
//!
//! # Delete a link
//! cargo run --bin admin -- link delete promo
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (or `DB_*` components): PostgreSQL connection string
//! - `BASE_URL`, `SHORT_CODE_LENGTH`, `SHORT_CODE_ALPHABET`: as for the server

use link_shortener::application::services::ShortenerService;
use link_shortener::config::{self, Config, mask_connection_string};
use link_shortener::domain::repositories::LinkRepository;
use link_shortener::infrastructure::persistence::{PgLinkRepository, pool};
use link_shortener::utils::code_generator::{CodeGenerator, validate_custom_code};
use link_shortener::utils::url_validator::validate_target_url;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use std::sync::Arc;

/// CLI tool for managing link-shortener.
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
    /// Manage short links
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

/// Link management subcommands.
#[derive(Subcommand)]
enum LinkAction {
    /// Create a new short link
    Create {
        /// Redirect target (http or https)
        url: String,

        /// Custom short code (generated if omitted)
        #[arg(short, long)]
        code: Option<String>,

        /// Lifetime in seconds (never expires if omitted)
        #[arg(short, long)]
        expires_in: Option<i64>,
    },

    /// Show statistics for a short code
    Stats {
        code: String,
    },

    /// Delete a short link
    Delete {
        code: String,

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
}

type PgShortener = ShortenerService<dyn LinkRepository>;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env()?;
    let database_url = config
        .database_url
        .clone()
        .context("DATABASE_URL must be set")?;

    let pg_pool = Arc::new(pool::connect(&config).await?);
    let repository: Arc<dyn LinkRepository> = Arc::new(PgLinkRepository::new(pg_pool));

    match cli.command {
        Commands::Link { action } => {
            let shortener = build_shortener(&config, repository)?;
            handle_link_action(action, &shortener).await?
        }
        Commands::Db { action } => handle_db_action(action, repository, &database_url).await?,
    }

    Ok(())
}

fn build_shortener(config: &Config, repository: Arc<dyn LinkRepository>) -> Result<PgShortener> {
    let generator = CodeGenerator::new(&config.short_code_alphabet, config.short_code_length)
        .context("Invalid SHORT_CODE_ALPHABET or SHORT_CODE_LENGTH")?;

    Ok(
        ShortenerService::new(repository, generator, config.base_url.clone())
            .with_max_generation_attempts(config.code_generation_attempts),
    )
}

/// Dispatches link management commands.
async fn handle_link_action(action: LinkAction, shortener: &PgShortener) -> Result<()> {
    match action {
        LinkAction::Create {
            url,
            code,
            expires_in,
        } => create_link(shortener, url, code, expires_in).await,
        LinkAction::Stats { code } => show_stats(shortener, &code).await,
        LinkAction::Delete { code, yes } => delete_link(shortener, &code, yes).await,
    }
}

/// Validates input the same way the HTTP API does, then creates the link.
async fn create_link(
    shortener: &PgShortener,
    url: String,
    code: Option<String>,
    expires_in: Option<i64>,
) -> Result<()> {
    println!("{}", "🔗 Create Short Link".bright_blue().bold());
    println!();

    validate_target_url(&url).map_err(|e| anyhow::anyhow!("{e}"))?;

    if let Some(ref code) = code {
        validate_custom_code(code)?;
    }

    let expires_at = match expires_in {
        Some(seconds) if seconds <= 0 => anyhow::bail!("--expires-in must be positive"),
        Some(seconds) => Some(Utc::now() + Duration::seconds(seconds)),
        None => None,
    };

    let link = shortener
        .create_link(url, code, expires_at)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create link: {}", e))?;

    println!("{}", "✅ Link created".green().bold());
    println!();
    println!("  Code:      {}", link.short_code.cyan());
    println!(
        "  Short URL: {}",
        shortener.short_url(&link.short_code).bright_yellow().bold()
    );
    println!("  Target:    {}", link.original_url);
    match link.expires_at {
        Some(at) => println!("  Expires:   {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
        None => println!("  Expires:   {}", "never".bright_black()),
    }
    println!();

    Ok(())
}

/// Prints the statistics of one link.
async fn show_stats(shortener: &PgShortener, code: &str) -> Result<()> {
    println!("{}", "📊 Link Statistics".bright_blue().bold());
    println!();

    let stats = shortener
        .stats(code)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .context("Short link not found")?;

    let status = if stats.is_expired {
        "EXPIRED".red()
    } else {
        "ACTIVE".green()
    };

    println!("  Code:    {}", stats.short_code.cyan());
    println!("  Target:  {}", stats.original_url);
    println!(
        "  Clicks:  {}",
        stats.click_count.to_string().bright_green().bold()
    );
    println!(
        "  Created: {}",
        stats
            .created_at
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .bright_black()
    );
    if let Some(at) = stats.expires_at {
        println!("  Expires: {}", at.format("%Y-%m-%d %H:%M").to_string().bright_black());
    }
    println!("  Status:  {}", status);
    println!();

    Ok(())
}

/// Deletes a link after confirmation (default: No).
async fn delete_link(shortener: &PgShortener, code: &str, skip_confirm: bool) -> Result<()> {
    println!("{}", "🗑  Delete Short Link".bright_blue().bold());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete link '{code}'?"))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let deleted = shortener
        .delete(code)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete link: {}", e))?;

    if deleted {
        println!("{}", "✅ Link deleted".green().bold());
    } else {
        println!("{}", "⚠️  No link uses this code".yellow());
    }
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(
    action: DbAction,
    repository: Arc<dyn LinkRepository>,
    database_url: &str,
) -> Result<()> {
    match action {
        DbAction::Check => {
            println!(
                "{} {}",
                "🔍 Checking database connection:".bright_blue(),
                mask_connection_string(database_url)
            );

            if !repository.health_check().await {
                anyhow::bail!("Database is unreachable");
            }

            let links = repository
                .count()
                .await
                .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

            println!("{}", "✅ Database connection OK".green().bold());
            println!("  Links: {}", links.to_string().bright_green().bold());
        }
    }

    Ok(())
}
