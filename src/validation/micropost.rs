use uuid::Uuid;

use super::{ValidationErrors, check_required_text};

pub const MAX_CONTENT_CHARS: usize = 140;

#[derive(Debug, Clone)]
pub struct NewMicropost {
    pub user_id: Uuid,
    pub content: String,
    /// Reference handed out by the upload collaborator.
    pub picture: Option<String>,
}

impl NewMicropost {
    pub fn new(user_id: Uuid, content: impl Into<String>) -> Self {
        Self {
            user_id,
            content: content.into(),
            picture: None,
        }
    }

    pub fn with_picture(mut self, picture: impl Into<String>) -> Self {
        self.picture = Some(picture.into());
        self
    }

    /// Content rules. Whether `user_id` points at a stored user is checked by
    /// the micropost service against storage.
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        check_required_text(&mut errors, "content", &self.content, MAX_CONTENT_CHARS);
        errors
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::NewMicropost;

    #[test]
    fn content_of_exactly_140_chars_is_valid() {
        let post = NewMicropost::new(Uuid::new_v4(), "a".repeat(140));
        assert!(post.validate().is_empty());
    }

    #[test]
    fn content_of_141_chars_is_rejected() {
        let post = NewMicropost::new(Uuid::new_v4(), "a".repeat(141));
        assert_eq!(
            post.validate().on("content"),
            vec!["is too long (maximum is 140 characters)"]
        );
    }

    #[test]
    fn empty_or_blank_content_is_rejected() {
        for content in ["", "   ", "\n\t"] {
            let post = NewMicropost::new(Uuid::new_v4(), content);
            assert_eq!(post.validate().on("content"), vec!["can't be blank"]);
        }
    }

    #[test]
    fn picture_reference_is_optional() {
        let post = NewMicropost::new(Uuid::new_v4(), "hello").with_picture("uploads/a.png");
        assert_eq!(post.picture.as_deref(), Some("uploads/a.png"));
        assert!(post.validate().is_empty());
    }
}
