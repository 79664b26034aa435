#[allow(unused_imports)]
pub mod prelude {
    pub use super::micropost::Entity as Micropost;
    pub use super::user::Entity as User;
}

pub mod micropost;
pub mod user;
