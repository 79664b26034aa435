pub const DEFAULT_RUST_LOG: &str = "info,sqlx=warn";
pub const DEFAULT_DB_MAX_CONNECTIONS: i64 = 10;
pub const DEFAULT_DB_MIN_IDLE: i64 = 2;
pub const DEFAULT_ACTIVATION_URL: &str = "http://localhost:3000/account_activations";
pub const DEFAULT_MAIL_FROM: &str = "noreply@example.com";
