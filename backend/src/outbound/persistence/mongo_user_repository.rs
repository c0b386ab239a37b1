//! MongoDB-backed `UserRepository`.
//!
//! Every filter includes the `_clazz` discriminator, so an id or login of
//! one role never resolves to an account of another.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, Document};

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{User, UserId, UserRole};

use super::documents::UserDocument;
use super::error_mapping::{is_duplicate_key, map_basic_mongo_error};
use super::store::MongoStore;

fn map_mongo_error(error: mongodb::error::Error) -> UserRepositoryError {
    map_basic_mongo_error(
        error,
        UserRepositoryError::query,
        UserRepositoryError::connection,
    )
}

fn map_write_error(error: mongodb::error::Error, user: &User) -> UserRepositoryError {
    if is_duplicate_key(&error) {
        return UserRepositoryError::duplicate_login(user.login().as_str());
    }
    map_mongo_error(error)
}

fn by_id(role: UserRole, id: &UserId) -> Document {
    doc! { "_id": id.to_string(), "_clazz": role.as_str() }
}

/// Account repository over the shared `users` collection.
#[derive(Clone, Debug)]
pub struct MongoUserRepository {
    store: MongoStore,
}

impl MongoUserRepository {
    pub fn new(store: MongoStore) -> Self {
        Self { store }
    }

    async fn find_many(&self, filter: Document) -> Result<Vec<User>, UserRepositoryError> {
        let documents: Vec<UserDocument> = self
            .store
            .users()
            .find(filter)
            .await
            .map_err(map_mongo_error)?
            .try_collect()
            .await
            .map_err(map_mongo_error)?;
        documents
            .into_iter()
            .map(|document| User::try_from(document).map_err(UserRepositoryError::query))
            .collect()
    }

    async fn find_single(&self, filter: Document) -> Result<Option<User>, UserRepositoryError> {
        self.store
            .users()
            .find_one(filter)
            .await
            .map_err(map_mongo_error)?
            .map(|document| User::try_from(document).map_err(UserRepositoryError::query))
            .transpose()
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn create(&self, user: &User) -> Result<(), UserRepositoryError> {
        self.store
            .users()
            .insert_one(UserDocument::from(user))
            .await
            .map_err(|err| map_write_error(err, user))?;
        Ok(())
    }

    async fn find_by_id(
        &self,
        role: UserRole,
        id: &UserId,
    ) -> Result<Option<User>, UserRepositoryError> {
        self.find_single(by_id(role, id)).await
    }

    async fn find_by_login(
        &self,
        role: UserRole,
        login: &str,
    ) -> Result<Option<User>, UserRepositoryError> {
        self.find_single(doc! { "login": login, "_clazz": role.as_str() })
            .await
    }

    async fn find_matching_login(
        &self,
        role: UserRole,
        fragment: &str,
    ) -> Result<Vec<User>, UserRepositoryError> {
        self.find_many(doc! {
            "_clazz": role.as_str(),
            "login": { "$regex": regex::escape(fragment), "$options": "i" },
        })
        .await
    }

    async fn find_all(&self, role: UserRole) -> Result<Vec<User>, UserRepositoryError> {
        self.find_many(doc! { "_clazz": role.as_str() }).await
    }

    async fn update(&self, user: &User) -> Result<(), UserRepositoryError> {
        let result = self
            .store
            .users()
            .replace_one(by_id(user.role(), &user.id()), UserDocument::from(user))
            .await
            .map_err(|err| map_write_error(err, user))?;
        if result.matched_count == 0 {
            return Err(UserRepositoryError::not_found(user.id()));
        }
        Ok(())
    }

    async fn set_active(
        &self,
        role: UserRole,
        id: &UserId,
        active: bool,
    ) -> Result<(), UserRepositoryError> {
        let result = self
            .store
            .users()
            .update_one(by_id(role, id), doc! { "$set": { "active": active } })
            .await
            .map_err(map_mongo_error)?;
        if result.matched_count == 0 {
            return Err(UserRepositoryError::not_found(*id));
        }
        Ok(())
    }

    async fn delete(&self, role: UserRole, id: &UserId) -> Result<(), UserRepositoryError> {
        let result = self
            .store
            .users()
            .delete_one(by_id(role, id))
            .await
            .map_err(map_mongo_error)?;
        if result.deleted_count == 0 {
            return Err(UserRepositoryError::not_found(*id));
        }
        Ok(())
    }
}
