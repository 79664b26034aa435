use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait, QueryFilter, Set,
};
use uuid::Uuid;

use super::{DaoBase, DaoLayerError, DaoResult, PaginatedResponse};
use crate::db::entities::{micropost, prelude::Micropost};

#[derive(Clone)]
pub struct MicropostDao {
    db: DatabaseConnection,
}

impl DaoBase for MicropostDao {
    type Entity = Micropost;

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl MicropostDao {
    pub async fn create_post(
        &self,
        user_id: &Uuid,
        content: String,
        picture: Option<String>,
    ) -> DaoResult<micropost::Model> {
        let model = micropost::ActiveModel {
            user_id: Set(*user_id),
            content: Set(content),
            picture: Set(picture),
            ..Default::default()
        };
        self.create(model).await
    }

    /// A user's posts; newest first when `order` is `None`.
    pub async fn list_for_user(
        &self,
        user_id: &Uuid,
        page: u64,
        page_size: u64,
        order: Option<(micropost::Column, Order)>,
    ) -> DaoResult<PaginatedResponse<micropost::Model>> {
        let user_id = *user_id;
        self.find(page, page_size, order, move |query| {
            query.filter(micropost::Column::UserId.eq(user_id))
        })
        .await
    }

    pub async fn list_all(
        &self,
        page: u64,
        page_size: u64,
    ) -> DaoResult<PaginatedResponse<micropost::Model>> {
        self.find(page, page_size, None, |query| query).await
    }

    pub async fn count_for_user(&self, user_id: &Uuid) -> DaoResult<u64> {
        Micropost::find()
            .filter(micropost::Column::UserId.eq(*user_id))
            .count(&self.db)
            .await
            .map_err(DaoLayerError::from)
    }

    pub async fn find_owned(
        &self,
        user_id: &Uuid,
        id: &Uuid,
    ) -> DaoResult<Option<micropost::Model>> {
        Micropost::find_by_id(*id)
            .filter(micropost::Column::UserId.eq(*user_id))
            .one(&self.db)
            .await
            .map_err(DaoLayerError::from)
    }

    /// Deletes the post only if it belongs to `user_id`.
    pub async fn delete_owned(&self, user_id: &Uuid, id: &Uuid) -> DaoResult<bool> {
        let result = Micropost::delete_many()
            .filter(micropost::Column::Id.eq(*id))
            .filter(micropost::Column::UserId.eq(*user_id))
            .exec(&self.db)
            .await
            .map_err(DaoLayerError::from)?;
        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Order, Value};
    use uuid::Uuid;

    use super::MicropostDao;
    use crate::db::dao::DaoBase;
    use crate::db::entities::micropost;
    use crate::test_helpers::micropost_model;

    #[tokio::test]
    async fn list_for_user_defaults_to_newest_first() {
        let user_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[
                micropost_model(user_id, "third", 3),
                micropost_model(user_id, "second", 2),
            ]])
            .into_connection();
        let dao = MicropostDao::new(&db);

        let page = dao
            .list_for_user(&user_id, 1, 1, None)
            .await
            .expect("query should succeed");

        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].content, "third");
        assert!(page.has_next);

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains(r#"ORDER BY \"microposts\".\"created_at\" DESC"#));
    }

    #[tokio::test]
    async fn list_for_user_honours_explicit_order() {
        let user_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<micropost::Model>::new()])
            .into_connection();
        let dao = MicropostDao::new(&db);

        dao.list_for_user(
            &user_id,
            1,
            10,
            Some((micropost::Column::CreatedAt, Order::Asc)),
        )
        .await
        .expect("query should succeed");

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains(r#"ORDER BY \"microposts\".\"created_at\" ASC"#));
    }

    #[tokio::test]
    async fn count_for_user_reads_the_aggregate() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[BTreeMap::from([("num_items", Value::BigInt(Some(3)))])]])
            .into_connection();
        let dao = MicropostDao::new(&db);

        let count = dao
            .count_for_user(&Uuid::new_v4())
            .await
            .expect("count should succeed");
        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn delete_owned_reports_whether_a_row_went_away() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();
        let dao = MicropostDao::new(&db);
        let user_id = Uuid::new_v4();

        assert!(
            dao.delete_owned(&user_id, &Uuid::new_v4())
                .await
                .expect("delete should succeed")
        );
        assert!(
            !dao.delete_owned(&user_id, &Uuid::new_v4())
                .await
                .expect("delete should succeed")
        );
    }
}
