use std::sync::Arc;

use anyhow::Context;

use sample_app::{
    auth::Hasher,
    config::AppConfig,
    db::connection::connect,
    logging::init_tracing,
    mailer::LogMailer,
    services::ServiceContext,
};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        tracing::error!("startup failed: {err:?}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cfg = AppConfig::from_env()?;
    init_tracing(&cfg.logging);

    let db_cfg = cfg
        .database
        .as_ref()
        .context("APP_DATABASE__URL must be set")?;
    let db = connect(db_cfg).await?;

    let hasher = Hasher::from_config(&cfg.security)
        .map_err(|err| anyhow::anyhow!("invalid hash settings: {err}"))?;
    let services = ServiceContext::new(&db, hasher, Arc::new(LogMailer::new(&cfg.mail)));

    if let Some(admin) = &cfg.admin {
        services.user().seed_admin(admin).await?;
    }

    tracing::info!("database prepared");
    db.close().await?;
    Ok(())
}
