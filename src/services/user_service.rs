use std::{fmt, sync::Arc};

use chrono::Utc;
use uuid::Uuid;

use crate::{
    auth::{DigestKind, Hasher, PasswordCredential, new_token, password::verify_blocking},
    config::AdminConfig,
    db::dao::{DaoBase, DaoLayerError, PaginatedResponse, UserDao, user_dao::UserRecord},
    db::entities::user,
    error::AppError,
    mailer::Mailer,
    validation::{NewUser, TAKEN, UserChanges},
};

/// A freshly created account together with its plaintext activation token.
pub struct Registration {
    pub user: user::Model,
    pub activation_token: String,
    /// False when the mailer failed; the account exists regardless and
    /// [`UserService::resend_activation`] can be retried.
    pub activation_email_sent: bool,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("user_id", &self.user.id)
            .field("activation_email_sent", &self.activation_email_sent)
            .finish_non_exhaustive()
    }
}

/// Result of [`UserService::remember`]: the plaintext token goes into the
/// client's session cookie, only its digest is stored.
pub struct Remembered {
    pub user: user::Model,
    pub remember_token: String,
}

impl fmt::Debug for Remembered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Remembered")
            .field("user_id", &self.user.id)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct UserService {
    user_dao: UserDao,
    hasher: Hasher,
    mailer: Arc<dyn Mailer>,
}

impl UserService {
    pub fn new(user_dao: UserDao, hasher: Hasher, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            user_dao,
            hasher,
            mailer,
        }
    }

    pub async fn find_by_id(&self, id: &Uuid) -> Result<Option<user::Model>, AppError> {
        Ok(self.user_dao.find_optional(*id).await?)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, AppError> {
        Ok(self.user_dao.find_by_email(email).await?)
    }

    /// Validates, stores and mails an activation link to a new user.
    pub async fn register(&self, new_user: NewUser) -> Result<Registration, AppError> {
        self.create_account(new_user, false, true).await
    }

    async fn create_account(
        &self,
        new_user: NewUser,
        admin: bool,
        notify: bool,
    ) -> Result<Registration, AppError> {
        let mut errors = new_user.validate();
        if !errors.contains("email") && self.user_dao.email_taken(&new_user.email, None).await? {
            errors.add("email", TAKEN);
        }
        errors.into_result()?;

        let NewUser {
            name,
            email,
            password,
            ..
        } = new_user;
        let activation_token = new_token();
        let hasher = self.hasher.clone();
        let token = activation_token.clone();
        let (credential, activation_digest) = tokio::task::spawn_blocking(move || {
            let mut credential = PasswordCredential::default();
            credential.set_password(&hasher, &password)?;
            let activation_digest = hasher.digest(&token)?;
            Ok::<_, AppError>((credential, activation_digest))
        })
        .await
        .map_err(|err| AppError::internal(format!("Hashing task failed: {err}")))??;

        let password_digest = credential
            .into_digest()
            .ok_or_else(|| AppError::internal("Password digest missing"))?;
        let user = self
            .user_dao
            .create_user(UserRecord {
                name,
                email,
                password_digest,
                activation_digest,
                admin,
            })
            .await
            .map_err(email_conflict)?;
        tracing::info!(user_id = %user.id, admin, "user registered");

        let activation_email_sent = notify && self.send_activation(&user, &activation_token).await;
        Ok(Registration {
            user,
            activation_token,
            activation_email_sent,
        })
    }

    async fn send_activation(&self, user: &user::Model, activation_token: &str) -> bool {
        match self
            .mailer
            .send_activation_email(user, activation_token)
            .await
        {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(user_id = %user.id, error = %err, "activation email failed");
                false
            }
        }
    }

    /// Login lookup. `None` covers both an unknown email and a wrong password.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<user::Model>, AppError> {
        let Some(user) = self.find_by_email(email).await? else {
            return Ok(None);
        };

        if verify_blocking(password.to_string(), user.password_digest.clone()).await {
            Ok(Some(user))
        } else {
            tracing::debug!(user_id = %user.id, "password mismatch");
            Ok(None)
        }
    }

    /// [`user::Model::authenticated`] run off the async executor.
    pub async fn authenticated(&self, user: &user::Model, kind: DigestKind, token: &str) -> bool {
        let matched = match user.digest_for(kind) {
            Some(digest) => verify_blocking(token.to_string(), digest.to_string()).await,
            None => false,
        };
        if !matched {
            tracing::debug!(user_id = %user.id, kind = kind.as_str(), "token rejected");
        }
        matched
    }

    /// Issues a new remember token, replacing any earlier one. Concurrent
    /// calls for one user are last-writer-wins.
    pub async fn remember(&self, user_id: &Uuid) -> Result<Remembered, AppError> {
        let remember_token = new_token();
        let digest = self.hasher.digest_blocking(remember_token.clone()).await?;
        let user = self
            .user_dao
            .set_remember_digest(user_id, Some(digest))
            .await?;
        Ok(Remembered {
            user,
            remember_token,
        })
    }

    /// Clears the remember digest, ending every persistent session.
    pub async fn forget(&self, user_id: &Uuid) -> Result<user::Model, AppError> {
        Ok(self.user_dao.set_remember_digest(user_id, None).await?)
    }

    /// Resolves a persistent session cookie (user id + remember token).
    pub async fn find_remembered(
        &self,
        user_id: &Uuid,
        remember_token: &str,
    ) -> Result<Option<user::Model>, AppError> {
        let Some(user) = self.find_by_id(user_id).await? else {
            return Ok(None);
        };
        if self
            .authenticated(&user, DigestKind::Remember, remember_token)
            .await
        {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Sets `activated` and stamps `activated_at` with the current time,
    /// also for a user who is already active.
    pub async fn activate(&self, user_id: &Uuid) -> Result<user::Model, AppError> {
        let now = Utc::now().fixed_offset();
        let user = self.user_dao.mark_activated(user_id, &now).await?;
        tracing::info!(user_id = %user.id, "user activated");
        Ok(user)
    }

    /// Account activation link handler: activates only a not yet activated
    /// user whose activation digest matches `activation_token`.
    pub async fn activate_account(
        &self,
        email: &str,
        activation_token: &str,
    ) -> Result<Option<user::Model>, AppError> {
        let Some(user) = self.find_by_email(email).await? else {
            return Ok(None);
        };
        if user.activated
            || !self
                .authenticated(&user, DigestKind::Activation, activation_token)
                .await
        {
            return Ok(None);
        }

        self.activate(&user.id).await.map(Some)
    }

    /// Replaces the activation digest of an unactivated user and mails the
    /// new token.
    pub async fn resend_activation(&self, email: &str) -> Result<Registration, AppError> {
        let user = self
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        if user.activated {
            return Err(AppError::bad_request("User is already activated"));
        }

        let activation_token = new_token();
        let digest = self
            .hasher
            .digest_blocking(activation_token.clone())
            .await?;
        let user = self.user_dao.set_activation_digest(&user.id, digest).await?;
        let activation_email_sent = self.send_activation(&user, &activation_token).await;
        Ok(Registration {
            user,
            activation_token,
            activation_email_sent,
        })
    }

    /// Applies the supplied fields. Leaving `password` out keeps the current
    /// one.
    pub async fn update_profile(
        &self,
        user_id: &Uuid,
        changes: UserChanges,
    ) -> Result<user::Model, AppError> {
        let mut errors = changes.validate();
        if let Some(email) = changes.email.as_deref() {
            if !errors.contains("email") && self.user_dao.email_taken(email, Some(*user_id)).await?
            {
                errors.add("email", TAKEN);
            }
        }
        errors.into_result()?;

        let UserChanges {
            name,
            email,
            password,
            ..
        } = changes;
        let password_digest = match password {
            Some(password) => Some(self.hasher.digest_blocking(password).await?),
            None => None,
        };

        self.user_dao
            .update_profile(user_id, name, email, password_digest)
            .await
            .map_err(email_conflict)
    }

    pub async fn set_admin(&self, user_id: &Uuid, admin: bool) -> Result<user::Model, AppError> {
        Ok(self.user_dao.set_admin(user_id, admin).await?)
    }

    /// Removes the user; the database cascades the delete to their microposts.
    pub async fn delete(&self, user_id: &Uuid) -> Result<(), AppError> {
        self.user_dao.delete(*user_id).await?;
        tracing::info!(user_id = %user_id, "user deleted");
        Ok(())
    }

    pub async fn list_activated(
        &self,
        page: u64,
        page_size: u64,
    ) -> Result<PaginatedResponse<user::Model>, AppError> {
        Ok(self.user_dao.list_activated(page, page_size).await?)
    }

    /// Creates the configured admin account, already activated, unless a user
    /// with that email exists.
    pub async fn seed_admin(&self, cfg: &AdminConfig) -> anyhow::Result<()> {
        if let Some(existing) = self
            .find_by_email(&cfg.email)
            .await
            .map_err(|err| anyhow::anyhow!("{err}"))?
        {
            tracing::info!("admin user already present: {}", existing.email);
            return Ok(());
        }

        let registration = self
            .create_account(
                NewUser::new(&cfg.name, &cfg.email, &cfg.password),
                true,
                false,
            )
            .await
            .map_err(|err| anyhow::anyhow!("admin seed failed: {err}"))?;
        let admin = self
            .activate(&registration.user.id)
            .await
            .map_err(|err| anyhow::anyhow!("{err}"))?;
        tracing::info!("seeded admin user {}", admin.email);
        Ok(())
    }
}

fn email_conflict(err: DaoLayerError) -> AppError {
    match err {
        DaoLayerError::UniqueViolation(_) => AppError::conflict("Email has already been taken"),
        other => other.into(),
    }
}
