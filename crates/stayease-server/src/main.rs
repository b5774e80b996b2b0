use std::sync::Arc;

use stayease_mail::{DisabledMailer, Mailer, SmtpMailer};
use stayease_server::health::{HealthSettings, SystemHealthService};
use stayease_server::{build_app, scheduler, AppState, NotifierConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = stayease_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = stayease_db::PoolConfig::from_app_config(&config);
    let pool = stayease_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = stayease_db::run_migrations(&pool).await?;
    tracing::info!(applied, env = %config.env, "database ready");

    let mailer: Arc<dyn Mailer> = match &config.email {
        Some(email) => Arc::new(SmtpMailer::from_config(email)?),
        None => {
            tracing::warn!("EMAIL_USER/EMAIL_PASSWORD not set; outgoing email is disabled");
            Arc::new(DisabledMailer)
        }
    };

    let state = AppState {
        pool,
        mailer,
        health: Arc::new(SystemHealthService::new(&HealthSettings::from_config(
            &config.health,
        ))),
        notifier: NotifierConfig {
            app_url: config.app_url.clone(),
            lead_days: config.availability_lead_days,
        },
    };

    let _scheduler = scheduler::build_scheduler(state.clone(), &config).await?;

    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "stayease-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
