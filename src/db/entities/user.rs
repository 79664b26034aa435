use record_entity_derive::record_entity;
use sea_orm::{ActiveValue, entity::prelude::*};

use crate::{
    auth::{DigestKind, PasswordCredential, verify},
    db::dao::BeforePersist,
};

#[record_entity]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    pub name: String,
    /// Always stored lower-cased, so the unique index is case-insensitive.
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password_digest: String,
    #[serde(skip_serializing)]
    pub remember_digest: Option<String>,
    #[sea_orm(default_value = false)]
    pub admin: bool,
    #[serde(skip_serializing)]
    pub activation_digest: Option<String>,
    #[sea_orm(default_value = false)]
    pub activated: bool,
    pub activated_at: Option<DateTimeWithTimeZone>,
    #[sea_orm(has_many)]
    pub microposts: HasMany<super::micropost::Entity>,
}

impl Model {
    pub fn digest_for(&self, kind: DigestKind) -> Option<&str> {
        match kind {
            DigestKind::Remember => self.remember_digest.as_deref(),
            DigestKind::Activation => self.activation_digest.as_deref(),
        }
    }

    /// True iff a digest of the given kind is stored and `token` matches it.
    pub fn authenticated(&self, kind: DigestKind, token: &str) -> bool {
        self.digest_for(kind)
            .is_some_and(|digest| verify(token, digest))
    }

    pub fn password_credential(&self) -> PasswordCredential {
        PasswordCredential::from_digest(self.password_digest.clone())
    }

    pub fn verify_password(&self, plaintext: &str) -> bool {
        self.password_credential().verify_password(plaintext)
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl BeforePersist for ActiveModel {
    fn before_persist(&mut self) {
        if let ActiveValue::Set(email) = &mut self.email {
            *email = email.to_lowercase();
        }
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{ActiveValue, Set};

    use super::ActiveModel;
    use crate::{
        auth::{DigestKind, Hasher},
        db::dao::BeforePersist,
        test_helpers::user_model,
    };

    #[test]
    fn before_persist_lowercases_assigned_email() {
        let mut active = ActiveModel {
            email: Set("Foo@ExAMPle.CoM".to_string()),
            ..Default::default()
        };
        active.before_persist();

        assert_eq!(active.email, Set("foo@example.com".to_string()));
    }

    #[test]
    fn before_persist_leaves_untouched_email_alone() {
        let mut active = ActiveModel::default();
        active.before_persist();

        assert!(matches!(active.email, ActiveValue::NotSet));
    }

    #[test]
    fn authenticated_is_false_without_a_digest() {
        let user = user_model("alice@example.com");

        assert!(user.remember_digest.is_none());
        assert!(!user.authenticated(DigestKind::Remember, ""));
        assert!(!user.authenticated(DigestKind::Remember, "anything"));
    }

    #[test]
    fn authenticated_checks_the_selected_digest() {
        let hasher = Hasher::min_cost();
        let mut user = user_model("alice@example.com");
        user.remember_digest = Some(hasher.digest("remember-me").expect("digest"));
        user.activation_digest = Some(hasher.digest("activate-me").expect("digest"));

        assert!(user.authenticated(DigestKind::Remember, "remember-me"));
        assert!(!user.authenticated(DigestKind::Remember, "activate-me"));
        assert!(user.authenticated(DigestKind::Activation, "activate-me"));
        assert!(!user.authenticated(DigestKind::Activation, "remember-me"));
    }

    #[test]
    fn password_credential_wraps_the_stored_digest() {
        let mut user = user_model("alice@example.com");
        user.password_digest = Hasher::min_cost().digest("foobar").expect("digest");

        assert!(user.verify_password("foobar"));
        assert!(!user.verify_password("foobaz"));
        assert!(user.password_credential().is_set());
    }

    #[test]
    fn json_never_carries_digests() {
        let mut user = user_model("alice@example.com");
        user.remember_digest = Some("remember".to_string());
        user.activation_digest = Some("activation".to_string());

        let json = serde_json::to_value(&user).expect("serialize");
        assert_eq!(json["email"], "alice@example.com");
        for key in ["password_digest", "remember_digest", "activation_digest"] {
            assert!(json.get(key).is_none(), "{key} leaked");
        }
    }
}
