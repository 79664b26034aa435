pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod mailer;
pub mod services;
pub mod test_helpers;
pub mod uploads;
pub mod validation;
