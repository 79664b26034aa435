//! Domain operations on top of the DAO layer: validation, hashing and the
//! outbound collaborators (mail, picture uploads) come together here.

mod context;
pub mod micropost_service;
pub mod user_service;

pub use context::ServiceContext;
pub use micropost_service::MicropostService;
pub use user_service::{Registration, Remembered, UserService};
