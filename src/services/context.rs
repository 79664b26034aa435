use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::{MicropostService, UserService};
use crate::{auth::Hasher, db::dao::DaoContext, mailer::Mailer};

#[derive(Clone)]
pub struct ServiceContext {
    daos: DaoContext,
    hasher: Hasher,
    mailer: Arc<dyn Mailer>,
}

impl ServiceContext {
    pub fn new(db: &DatabaseConnection, hasher: Hasher, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            daos: DaoContext::new(db),
            hasher,
            mailer,
        }
    }

    pub fn user(&self) -> UserService {
        UserService::new(
            self.daos.user(),
            self.hasher.clone(),
            Arc::clone(&self.mailer),
        )
    }

    pub fn micropost(&self) -> MicropostService {
        MicropostService::new(self.daos.micropost(), self.daos.user())
    }
}
