//! Outbound mail boundary. Delivery itself lives outside this crate; the
//! [`LogMailer`] stands in for it in development.

use anyhow::{Context, Result};
use async_trait::async_trait;
use url::Url;

use crate::{config::MailConfig, db::entities::user};

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Called once per freshly issued activation token. The token is only
    /// available here and in the registration result; it is never stored.
    async fn send_activation_email(
        &self,
        user: &user::Model,
        activation_token: &str,
    ) -> Result<()>;
}

/// Builds `<activation_url>/<token>/edit?email=<email>`.
pub fn activation_link(base: &str, activation_token: &str, email: &str) -> Result<String> {
    let mut url = Url::parse(base).context("mail.activation_url is not a valid URL")?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("mail.activation_url cannot be a base URL"))?
        .pop_if_empty()
        .push(activation_token)
        .push("edit");
    url.query_pairs_mut().append_pair("email", email);
    Ok(url.into())
}

/// Writes the activation link to the log instead of sending mail.
#[derive(Debug, Clone)]
pub struct LogMailer {
    from: String,
    activation_url: String,
}

impl LogMailer {
    pub fn new(cfg: &MailConfig) -> Self {
        Self {
            from: cfg.from.clone(),
            activation_url: cfg.activation_url.clone(),
        }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send_activation_email(
        &self,
        user: &user::Model,
        activation_token: &str,
    ) -> Result<()> {
        let link = activation_link(&self.activation_url, activation_token, &user.email)?;
        tracing::info!(
            from = %self.from,
            to = %user.email,
            user_id = %user.id,
            "account activation email"
        );
        tracing::debug!(%link, "account activation link");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{LogMailer, Mailer, activation_link};
    use crate::{config::MailConfig, test_helpers::user_model};

    #[test]
    fn activation_link_appends_token_and_encoded_email() {
        let link = activation_link(
            "https://example.org/account_activations",
            "abc-123_XYZ",
            "alice+test@example.com",
        )
        .expect("link should build");

        assert_eq!(
            link,
            "https://example.org/account_activations/abc-123_XYZ/edit?email=alice%2Btest%40example.com"
        );
    }

    #[test]
    fn activation_link_tolerates_trailing_slash() {
        let link = activation_link("https://example.org/activate/", "tok", "a@b.co")
            .expect("link should build");
        assert!(link.starts_with("https://example.org/activate/tok/edit?"));
    }

    #[test]
    fn activation_link_rejects_invalid_base() {
        assert!(activation_link("not a url", "tok", "a@b.co").is_err());
        assert!(activation_link("mailto:someone@example.org", "tok", "a@b.co").is_err());
    }

    #[tokio::test]
    async fn log_mailer_accepts_valid_configuration() {
        let mailer = LogMailer::new(&MailConfig::default());
        mailer
            .send_activation_email(&user_model("alice@example.com"), "token")
            .await
            .expect("log mailer should not fail");
    }
}
