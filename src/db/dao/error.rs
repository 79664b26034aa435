use sea_orm::{DbErr, SqlErr};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum DaoLayerError {
    #[error("Database error: {0}")]
    Db(DbErr),
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),
    #[error("Foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),
    #[error("{entity} not found (id={id})")]
    NotFound { entity: &'static str, id: Uuid },
    #[error("Invalid pagination: page={page} page_size={page_size}")]
    InvalidPagination { page: u64, page_size: u64 },
}

pub type DaoResult<T> = Result<T, DaoLayerError>;

impl From<DbErr> for DaoLayerError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => Self::UniqueViolation(detail),
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                Self::ForeignKeyViolation(detail)
            }
            _ => Self::Db(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::DbErr;
    use uuid::Uuid;

    use super::DaoLayerError;

    #[test]
    fn unclassified_db_errors_stay_db_errors() {
        let err = DaoLayerError::from(DbErr::Custom("connection reset".to_string()));
        assert!(matches!(err, DaoLayerError::Db(_)));
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn not_found_names_entity_and_id() {
        let id = Uuid::nil();
        let err = DaoLayerError::NotFound { entity: "users", id };
        assert_eq!(
            err.to_string(),
            "users not found (id=00000000-0000-0000-0000-000000000000)"
        );
    }
}
