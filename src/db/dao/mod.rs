pub mod base;
pub mod base_traits;
mod context;
pub mod error;
pub mod micropost_dao;
pub mod user_dao;

pub use base::{DaoBase, PaginatedResponse};
pub use base_traits::{
    BeforePersist, HasCreatedAtColumn, HasIdActiveModel, TimestampedActiveModel,
};
pub use context::DaoContext;
pub use error::{DaoLayerError, DaoResult};
pub use micropost_dao::MicropostDao;
pub use user_dao::UserDao;
