use sea_orm::DatabaseConnection;

use super::{DaoBase, MicropostDao, UserDao};

#[derive(Clone)]
pub struct DaoContext {
    db: DatabaseConnection,
}

impl DaoContext {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    pub fn user(&self) -> UserDao {
        DaoBase::new(&self.db)
    }

    pub fn micropost(&self) -> MicropostDao {
        DaoBase::new(&self.db)
    }
}
