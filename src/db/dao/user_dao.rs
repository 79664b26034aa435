use chrono::{DateTime, FixedOffset};
use sea_orm::{ColumnTrait, DatabaseConnection, QueryFilter, Set};
use uuid::Uuid;

use super::{DaoBase, DaoResult, PaginatedResponse};
use crate::db::entities::{prelude::User, user};

#[derive(Clone)]
pub struct UserDao {
    db: DatabaseConnection,
}

impl DaoBase for UserDao {
    type Entity = User;

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Columns written when a user registers.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub name: String,
    pub email: String,
    pub password_digest: String,
    pub activation_digest: String,
    pub admin: bool,
}

impl UserDao {
    /// Case-insensitive: stored emails are lower-cased, so is the lookup key.
    pub async fn find_by_email(&self, email: &str) -> DaoResult<Option<user::Model>> {
        let email = email.to_lowercase();
        self.find(1, 1, None, move |query| {
            query.filter(user::Column::Email.eq(email))
        })
        .await
        .map(|response| response.data.into_iter().next())
    }

    /// Whether another user already owns `email`, ignoring `except`.
    pub async fn email_taken(&self, email: &str, except: Option<Uuid>) -> DaoResult<bool> {
        Ok(self
            .find_by_email(email)
            .await?
            .is_some_and(|existing| Some(existing.id) != except))
    }

    pub async fn create_user(&self, record: UserRecord) -> DaoResult<user::Model> {
        let model = user::ActiveModel {
            name: Set(record.name),
            email: Set(record.email),
            password_digest: Set(record.password_digest),
            remember_digest: Set(None),
            admin: Set(record.admin),
            activation_digest: Set(Some(record.activation_digest)),
            activated: Set(false),
            activated_at: Set(None),
            ..Default::default()
        };
        self.create(model).await
    }

    /// Last writer wins when two sessions race on the same user.
    pub async fn set_remember_digest(
        &self,
        id: &Uuid,
        digest: Option<String>,
    ) -> DaoResult<user::Model> {
        self.update(*id, move |active| {
            active.remember_digest = Set(digest);
        })
        .await
    }

    pub async fn set_activation_digest(&self, id: &Uuid, digest: String) -> DaoResult<user::Model> {
        self.update(*id, move |active| {
            active.activation_digest = Set(Some(digest));
        })
        .await
    }

    /// Both columns go out in the same UPDATE statement.
    pub async fn mark_activated(
        &self,
        id: &Uuid,
        at: &DateTime<FixedOffset>,
    ) -> DaoResult<user::Model> {
        let at = *at;
        self.update(*id, move |active| {
            active.activated = Set(true);
            active.activated_at = Set(Some(at));
        })
        .await
    }

    pub async fn set_admin(&self, id: &Uuid, admin: bool) -> DaoResult<user::Model> {
        self.update(*id, move |active| {
            active.admin = Set(admin);
        })
        .await
    }

    pub async fn update_profile(
        &self,
        id: &Uuid,
        name: Option<String>,
        email: Option<String>,
        password_digest: Option<String>,
    ) -> DaoResult<user::Model> {
        self.update(*id, move |active| {
            if let Some(name) = name {
                active.name = Set(name);
            }
            if let Some(email) = email {
                active.email = Set(email);
            }
            if let Some(password_digest) = password_digest {
                active.password_digest = Set(password_digest);
            }
        })
        .await
    }

    pub async fn list_activated(
        &self,
        page: u64,
        page_size: u64,
    ) -> DaoResult<PaginatedResponse<user::Model>> {
        self.find(page, page_size, None, |query| {
            query.filter(user::Column::Activated.eq(true))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase};
    use uuid::Uuid;

    use super::{UserDao, UserRecord};
    use crate::db::dao::{DaoBase, DaoLayerError};
    use crate::db::entities::user;
    use crate::test_helpers::{ts, user_model};

    #[tokio::test]
    async fn find_by_email_returns_first_match() {
        let existing = user_model("alice@example.com");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[existing.clone()]])
            .into_connection();
        let dao = UserDao::new(&db);

        let result = dao
            .find_by_email("Alice@Example.com")
            .await
            .expect("query should succeed");
        assert_eq!(result.map(|u| u.id), Some(existing.id));
    }

    #[tokio::test]
    async fn find_by_email_lowercases_the_lookup_key() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();
        let dao = UserDao::new(&db);

        dao.find_by_email("MiXeD@Example.COM")
            .await
            .expect("query should succeed");

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("mixed@example.com"));
        assert!(!log.contains("MiXeD@Example.COM"));
    }

    #[tokio::test]
    async fn email_taken_ignores_the_given_user() {
        let existing = user_model("alice@example.com");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[existing.clone()], [existing.clone()]])
            .into_connection();
        let dao = UserDao::new(&db);

        assert!(
            dao.email_taken("alice@example.com", None)
                .await
                .expect("query should succeed")
        );
        assert!(
            !dao.email_taken("alice@example.com", Some(existing.id))
                .await
                .expect("query should succeed")
        );
    }

    #[tokio::test]
    async fn create_user_lowercases_email_before_insert() {
        let stored = user_model("bob@example.com");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[stored]])
            .into_connection();
        let dao = UserDao::new(&db);

        dao.create_user(UserRecord {
            name: "Bob".to_string(),
            email: "BOB@Example.com".to_string(),
            password_digest: "digest".to_string(),
            activation_digest: "activation".to_string(),
            admin: false,
        })
        .await
        .expect("insert should succeed");

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("bob@example.com"));
        assert!(!log.contains("BOB@Example.com"));
    }

    #[tokio::test]
    async fn mark_activated_propagates_not_found() {
        let missing_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();
        let dao = UserDao::new(&db);

        let err = dao
            .mark_activated(&missing_id, &ts())
            .await
            .expect_err("update should fail");
        assert!(matches!(
            err,
            DaoLayerError::NotFound { id, .. } if id == missing_id
        ));
    }

    #[tokio::test]
    async fn set_remember_digest_maps_database_errors() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("select failed".to_string())])
            .into_connection();
        let dao = UserDao::new(&db);

        let err = dao
            .set_remember_digest(&Uuid::new_v4(), None)
            .await
            .expect_err("update should fail");
        assert!(matches!(err, DaoLayerError::Db(_)));
    }

    #[tokio::test]
    async fn list_activated_rejects_oversized_pages() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let dao = UserDao::new(&db);

        let err = dao
            .list_activated(1, 101)
            .await
            .expect_err("page size over the cap should fail");
        assert!(matches!(
            err,
            DaoLayerError::InvalidPagination { page: 1, page_size: 101 }
        ));
    }
}
