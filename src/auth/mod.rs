pub mod credential;
pub mod password;
pub mod token;
mod types;

pub use credential::PasswordCredential;
pub use password::{Hasher, verify};
pub use token::new_token;
pub use types::DigestKind;
