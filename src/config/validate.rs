use anyhow::{Result, bail};

use super::AppConfig;

pub fn validate(cfg: &AppConfig) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    if let Some(database) = cfg.database.as_ref() {
        if database.url.trim().is_empty() {
            errors.push("database.url must not be empty".to_string());
        }

        if database.min_idle > database.max_connections {
            errors.push(format!(
                "database.min_idle ({}) must be <= database.max_connections ({})",
                database.min_idle, database.max_connections
            ));
        }
    }

    if matches!(cfg.security.memory_kib, Some(0)) {
        errors.push("security.memory_kib must be > 0".to_string());
    }

    if matches!(cfg.security.iterations, Some(0)) {
        errors.push("security.iterations must be > 0".to_string());
    }

    if cfg.mail.activation_url.trim().is_empty() {
        errors.push("mail.activation_url must not be empty".to_string());
    } else if url::Url::parse(&cfg.mail.activation_url).is_err() {
        errors.push("mail.activation_url must be an absolute URL".to_string());
    }

    if let Some(admin) = cfg.admin.as_ref() {
        if admin.name.trim().is_empty() {
            errors.push("admin.name must not be empty".to_string());
        }

        if admin.email.trim().is_empty() {
            errors.push("admin.email must not be empty".to_string());
        }

        if admin.password.is_empty() {
            errors.push("admin.password must not be empty".to_string());
        }
    }

    if errors.is_empty() {
        return Ok(());
    }

    bail!("invalid app config:\n- {}", errors.join("\n- "))
}
