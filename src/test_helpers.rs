//! Fixtures shared by the unit tests and the integration tests under `tests/`.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use sea_orm::{
    DatabaseBackend, DatabaseConnection, DbErr, IntoMockRow, MockDatabase, MockExecResult,
};
use uuid::Uuid;

use crate::{
    auth::Hasher,
    config::DatabaseConfig,
    db::{
        connection::connect,
        entities::{micropost, user},
    },
    mailer::Mailer,
    services::ServiceContext,
    uploads::{PictureStore, PictureUpload},
};

/// Fixed instant used as `created_at` for model fixtures.
pub fn ts() -> DateTime<FixedOffset> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0)
        .single()
        .expect("valid fixture timestamp")
        .fixed_offset()
}

pub fn user_model(email: &str) -> user::Model {
    user::Model {
        id: Uuid::new_v4(),
        created_at: ts(),
        updated_at: ts(),
        name: "Example User".to_string(),
        email: email.to_string(),
        password_digest: "$argon2id$placeholder".to_string(),
        remember_digest: None,
        admin: false,
        activation_digest: None,
        activated: false,
        activated_at: None,
    }
}

/// A post written `minute_offset` minutes after [`ts`].
pub fn micropost_model(user_id: Uuid, content: &str, minute_offset: i64) -> micropost::Model {
    let at = ts() + Duration::minutes(minute_offset);
    micropost::Model {
        id: Uuid::new_v4(),
        created_at: at,
        updated_at: at,
        content: content.to_string(),
        user_id,
        picture: None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub user_id: Uuid,
    pub email: String,
    pub activation_token: String,
}

/// Mailer that keeps every activation email in memory.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    deliveries: Mutex<Vec<Delivery>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn last_token_for(&self, email: &str) -> Option<String> {
        self.deliveries()
            .into_iter()
            .rev()
            .find(|delivery| delivery.email == email)
            .map(|delivery| delivery.activation_token)
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_activation_email(
        &self,
        user: &user::Model,
        activation_token: &str,
    ) -> Result<()> {
        if self.fail {
            anyhow::bail!("smtp unavailable");
        }
        self.deliveries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Delivery {
                user_id: user.id,
                email: user.email.clone(),
                activation_token: activation_token.to_string(),
            });
        Ok(())
    }
}

/// Picture store that hands back `uploads/<file name>`.
#[derive(Debug, Default)]
pub struct FakePictureStore {
    pub stored: AtomicUsize,
}

#[async_trait]
impl PictureStore for FakePictureStore {
    async fn store(&self, upload: PictureUpload) -> Result<String> {
        self.stored.fetch_add(1, Ordering::SeqCst);
        Ok(format!("uploads/{}", upload.file_name))
    }
}

/// Services wired to a scripted Postgres mock.
pub struct MockServices {
    db: MockDatabase,
    mailer: RecordingMailer,
}

pub struct MockFixture {
    pub services: ServiceContext,
    pub db: DatabaseConnection,
    pub mailer: Arc<RecordingMailer>,
}

impl Default for MockServices {
    fn default() -> Self {
        Self::new()
    }
}

impl MockServices {
    pub fn new() -> Self {
        Self {
            db: MockDatabase::new(DatabaseBackend::Postgres),
            mailer: RecordingMailer::default(),
        }
    }

    pub fn with_query_results<T, I, II>(mut self, results: II) -> Self
    where
        T: IntoMockRow,
        I: IntoIterator<Item = T>,
        II: IntoIterator<Item = I>,
    {
        self.db = self.db.append_query_results(results);
        self
    }

    pub fn with_query_error(mut self, err: DbErr) -> Self {
        self.db = self.db.append_query_errors([err]);
        self
    }

    pub fn with_exec_results(mut self, results: impl IntoIterator<Item = MockExecResult>) -> Self {
        self.db = self.db.append_exec_results(results);
        self
    }

    pub fn with_failing_mailer(mut self) -> Self {
        self.mailer = RecordingMailer::failing();
        self
    }

    pub fn build(self) -> MockFixture {
        let db = self.db.into_connection();
        let mailer = Arc::new(self.mailer);
        let services = ServiceContext::new(&db, Hasher::min_cost(), mailer.clone());
        MockFixture {
            services,
            db,
            mailer,
        }
    }
}

/// Fresh in-memory SQLite database with the schema applied. A single
/// connection keeps every query on the same database.
pub async fn sqlite_memory() -> Result<DatabaseConnection> {
    connect(&DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_idle: 1,
    })
    .await
}

/// Services over [`sqlite_memory`] with a recording mailer.
pub async fn sqlite_services() -> Result<(ServiceContext, Arc<RecordingMailer>)> {
    let db = sqlite_memory().await?;
    let mailer = Arc::new(RecordingMailer::default());
    let services = ServiceContext::new(&db, Hasher::min_cost(), mailer.clone());
    Ok((services, mailer))
}
