pub mod configs;
pub mod defaults;
pub mod envconfig;
pub mod validate;

pub use configs::{
    AdminConfig, AppConfig, DatabaseConfig, HashCost, LoggingConfig, MailConfig, SecurityConfig,
};
pub use envconfig::EnvConfig;
