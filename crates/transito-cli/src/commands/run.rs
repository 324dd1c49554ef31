use anyhow::{Result, bail};
use std::sync::Arc;
use tracing::{info, warn};
use transito_application::{AppContext, BotRunner, spawn_session_sweeper};
use transito_infrastructure::AppConfig;
use transito_infrastructure::config::BOT_TOKEN_ENV;
use transito_interaction::TelegramClient;

pub async fn execute(config: &AppConfig, token: Option<String>) -> Result<()> {
    let Some(token) = token else {
        bail!("{BOT_TOKEN_ENV} must be set to run the bot");
    };

    let ctx = AppContext::from_config(config);
    let sweeper = spawn_session_sweeper(
        ctx.dialogue.clone(),
        config.session_ttl(),
        config.sweep_interval(),
    );

    let transport = Arc::new(TelegramClient::new(token));
    let lines = config.lines.codes().collect::<Vec<_>>().join(",");
    info!(lines = %lines, "Starting transito bot");

    BotRunner::new(transport, ctx.dialogue.clone())
        .with_poll_timeout(config.poll_timeout())
        .run_until(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Interrupt received, shutting down"),
                Err(err) => {
                    warn!(error = %err, "Cannot listen for Ctrl-C, running until killed");
                    std::future::pending::<()>().await;
                }
            }
        })
        .await;

    sweeper.abort();
    Ok(())
}
