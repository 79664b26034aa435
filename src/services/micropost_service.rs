use sea_orm::Order;
use uuid::Uuid;

use crate::{
    db::dao::{DaoBase, DaoLayerError, MicropostDao, PaginatedResponse, UserDao},
    db::entities::micropost,
    error::AppError,
    uploads::{PictureStore, PictureUpload},
    validation::{MUST_EXIST, NewMicropost, ValidationErrors},
};

#[derive(Clone)]
pub struct MicropostService {
    micropost_dao: MicropostDao,
    user_dao: UserDao,
}

impl MicropostService {
    pub fn new(micropost_dao: MicropostDao, user_dao: UserDao) -> Self {
        Self {
            micropost_dao,
            user_dao,
        }
    }

    /// Stores a post after checking content and author.
    pub async fn create(&self, new_post: NewMicropost) -> Result<micropost::Model, AppError> {
        let mut errors = new_post.validate();
        if self.user_dao.find_optional(new_post.user_id).await?.is_none() {
            errors.add("user_id", MUST_EXIST);
        }
        errors.into_result()?;

        let NewMicropost {
            user_id,
            content,
            picture,
        } = new_post;
        let post = self
            .micropost_dao
            .create_post(&user_id, content, picture)
            .await
            .map_err(|err| match err {
                // author removed between the check and the insert
                DaoLayerError::ForeignKeyViolation(_) => {
                    let mut errors = ValidationErrors::new();
                    errors.add("user_id", MUST_EXIST);
                    AppError::Validation(errors)
                }
                other => other.into(),
            })?;
        tracing::debug!(micropost_id = %post.id, user_id = %post.user_id, "micropost created");
        Ok(post)
    }

    /// Like [`MicropostService::create`], storing `upload` first and keeping
    /// its reference. Invalid content never reaches the store.
    pub async fn create_with_picture(
        &self,
        new_post: NewMicropost,
        upload: PictureUpload,
        store: &dyn PictureStore,
    ) -> Result<micropost::Model, AppError> {
        new_post.validate().into_result()?;

        let picture = store.store(upload).await.map_err(|err| {
            tracing::error!(error = %err, "picture upload failed");
            AppError::internal(format!("Picture upload failed: {err}"))
        })?;
        self.create(new_post.with_picture(picture)).await
    }

    /// Posts shown on the user's home page, newest first.
    pub async fn feed_for(
        &self,
        user_id: &Uuid,
        page: u64,
        page_size: u64,
    ) -> Result<PaginatedResponse<micropost::Model>, AppError> {
        self.list_for_user(user_id, page, page_size, None).await
    }

    pub async fn list_for_user(
        &self,
        user_id: &Uuid,
        page: u64,
        page_size: u64,
        order: Option<(micropost::Column, Order)>,
    ) -> Result<PaginatedResponse<micropost::Model>, AppError> {
        Ok(self
            .micropost_dao
            .list_for_user(user_id, page, page_size, order)
            .await?)
    }

    pub async fn list_all(
        &self,
        page: u64,
        page_size: u64,
    ) -> Result<PaginatedResponse<micropost::Model>, AppError> {
        Ok(self.micropost_dao.list_all(page, page_size).await?)
    }

    pub async fn count_for_user(&self, user_id: &Uuid) -> Result<u64, AppError> {
        Ok(self.micropost_dao.count_for_user(user_id).await?)
    }

    pub async fn find_by_id(&self, id: &Uuid) -> Result<Option<micropost::Model>, AppError> {
        Ok(self.micropost_dao.find_optional(*id).await?)
    }

    /// Admin removal, regardless of author.
    pub async fn delete(&self, id: &Uuid) -> Result<(), AppError> {
        self.micropost_dao.delete(*id).await?;
        Ok(())
    }

    /// Removes a post only when `user_id` wrote it. Someone else's post is
    /// reported the same way as a missing one.
    pub async fn delete_owned(&self, user_id: &Uuid, id: &Uuid) -> Result<(), AppError> {
        if self.micropost_dao.delete_owned(user_id, id).await? {
            tracing::debug!(micropost_id = %id, user_id = %user_id, "micropost deleted");
            Ok(())
        } else {
            Err(AppError::not_found("Micropost not found"))
        }
    }
}
