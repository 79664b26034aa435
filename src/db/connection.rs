use std::time::Duration;

use anyhow::{Result, bail};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, sea_query::Index,
};
use tracing::info;

use crate::{config::DatabaseConfig, db::entities::micropost};

const SQLITE_BUSY_TIMEOUT: Duration = Duration::from_secs(5);
pub const FEED_INDEX: &str = "index_microposts_on_user_id_and_created_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    Sqlite,
}

impl Backend {
    pub fn from_url(url: &str) -> Result<Self> {
        let normalized = url.trim().to_ascii_lowercase();
        if normalized.starts_with("postgres://") || normalized.starts_with("postgresql://") {
            Ok(Self::Postgres)
        } else if normalized.starts_with("sqlite:") {
            Ok(Self::Sqlite)
        } else {
            bail!("unsupported database url; expected scheme postgres://, postgresql:// or sqlite:")
        }
    }
}

/// Opens the pool and brings the schema in line with the entities.
pub async fn connect(cfg: &DatabaseConfig) -> Result<DatabaseConnection> {
    let backend = Backend::from_url(&cfg.url)?;

    let mut options = ConnectOptions::new(cfg.url.clone());
    options
        .max_connections(cfg.max_connections)
        .min_connections(cfg.min_idle)
        .connect_timeout(Duration::from_secs(5))
        .sqlx_logging(false);
    if backend == Backend::Sqlite {
        // applied to every pooled connection; micropost cascade needs foreign keys
        options.map_sqlx_sqlite_opts(|opts| {
            opts.foreign_keys(true).busy_timeout(SQLITE_BUSY_TIMEOUT)
        });
    }

    let db = Database::connect(options).await?;

    sync_schema(&db).await?;
    info!(?backend, "database ready");
    Ok(db)
}

pub async fn sync_schema(db: &DatabaseConnection) -> Result<()> {
    info!("syncing database schema from entities");
    db.get_schema_registry("sample_app::db::entities::*")
        .sync(db)
        .await?;

    // serves the newest-first feed of one user
    db.execute(
        Index::create()
            .name(FEED_INDEX)
            .table(micropost::Entity)
            .col(micropost::Column::UserId)
            .col(micropost::Column::CreatedAt)
            .if_not_exists(),
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use sea_orm::{ConnectionTrait, DbBackend, Statement};

    use super::{Backend, FEED_INDEX, sync_schema};
    use crate::test_helpers::sqlite_memory;

    #[tokio::test]
    async fn schema_sync_creates_the_feed_index_once() {
        let db = sqlite_memory().await.expect("sqlite");
        sync_schema(&db).await.expect("second sync is a no-op");

        let row = db
            .query_one_raw(Statement::from_string(
                DbBackend::Sqlite,
                format!(
                    "SELECT sql FROM sqlite_master WHERE type = 'index' AND name = '{FEED_INDEX}'"
                ),
            ))
            .await
            .expect("query")
            .expect("feed index exists");
        let sql: String = row.try_get("", "sql").expect("index sql");
        assert!(sql.contains("user_id"));
        assert!(sql.contains("created_at"));
    }

    #[tokio::test]
    async fn sqlite_connections_enforce_foreign_keys() {
        let db = sqlite_memory().await.expect("sqlite");

        let row = db
            .query_one_raw(Statement::from_string(
                DbBackend::Sqlite,
                "PRAGMA foreign_keys",
            ))
            .await
            .expect("query")
            .expect("pragma row");
        let enabled: i32 = row.try_get_by_index(0).expect("pragma value");
        assert_eq!(enabled, 1);
    }

    #[test]
    fn backend_is_picked_from_the_url_scheme() {
        assert_eq!(
            Backend::from_url("postgres://u:p@localhost/db").expect("postgres"),
            Backend::Postgres
        );
        assert_eq!(
            Backend::from_url("PostgreSQL://localhost/db").expect("postgres"),
            Backend::Postgres
        );
        assert_eq!(
            Backend::from_url("sqlite::memory:").expect("sqlite"),
            Backend::Sqlite
        );
        assert!(Backend::from_url("mysql://localhost/db").is_err());
    }
}
