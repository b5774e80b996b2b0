use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use stayease_core::AvailabilityWindow;
use stayease_mail::{DisabledMailer, Mailer, SmtpMailer};
use stayease_server::health::{HealthSettings, SystemHealthService};
use stayease_server::{run_availability_sweep, NotifierConfig};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "stayease-cli")]
#[command(about = "StayEase operations command line")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Run the availability sweep once
    NotifyAvailability {
        /// Treat this UTC date as today (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// List matching listings without sending anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Run the dashboard health checks once and print the report
    Health,
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("stayease-cli: no command given; see --help");
        return Ok(());
    };

    let config = stayease_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool = stayease_db::connect_pool(
        &config.database_url,
        stayease_db::PoolConfig::from_app_config(&config),
    )
    .await?;

    match command {
        Commands::Db {
            command: DbCommands::Ping,
        } => {
            stayease_db::health_check(&pool).await?;
            println!("database ok");
        }
        Commands::Db {
            command: DbCommands::Migrate,
        } => {
            let applied = stayease_db::run_migrations(&pool).await?;
            println!("migrations applied: {applied}");
        }
        Commands::NotifyAvailability { date, dry_run } => {
            let now = sweep_instant(date);
            let notifier = NotifierConfig {
                app_url: config.app_url.clone(),
                lead_days: config.availability_lead_days,
            };
            if dry_run {
                preview_sweep(&pool, &notifier, now).await?;
            } else {
                let mailer: Arc<dyn Mailer> = match &config.email {
                    Some(email) => Arc::new(SmtpMailer::from_config(email)?),
                    None => {
                        tracing::warn!("email not configured; every send will fail");
                        Arc::new(DisabledMailer)
                    }
                };
                let report = run_availability_sweep(&pool, mailer.as_ref(), &notifier, now).await?;
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }
        Commands::Health => {
            let service = SystemHealthService::new(&HealthSettings::from_config(&config.health));
            let report = service.check_all(&pool).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

/// Midnight UTC of `date`, or the current instant.
fn sweep_instant(date: Option<NaiveDate>) -> DateTime<Utc> {
    date.map_or_else(Utc::now, |d| d.and_time(chrono::NaiveTime::MIN).and_utc())
}

async fn preview_sweep(
    pool: &sqlx::PgPool,
    notifier: &NotifierConfig,
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    let window = AvailabilityWindow::days_ahead(now, notifier.lead_days);
    let properties =
        stayease_db::list_properties_available_between(pool, window.start, window.end).await?;

    println!(
        "window {} .. {}: {} listing(s)",
        window.start,
        window.end,
        properties.len()
    );
    for property in &properties {
        println!(
            "  {}  {}  interested={}",
            property.public_id,
            property.name,
            property.interested_applicants.len()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests;
