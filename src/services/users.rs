//! User profiles. Credentials live with the identity platform; this service
//! owns the profile record, including the role attribute that drives
//! authorization everywhere else.

use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::models::{Location, Role, UserProfile};
use crate::store::{self, keys, RecordStore};

#[derive(Debug, Clone)]
pub struct ProfileInput {
    pub name: String,
    pub phone: String,
    pub bio: String,
    pub location: Option<Location>,
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn RecordStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn get_profile(&self, id: Uuid) -> Result<UserProfile, ServiceError> {
        store::get_typed(self.store.as_ref(), &keys::user(id))
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", id)))
    }

    /// Creates or updates the caller's own profile. The role attribute is
    /// never writable through this path.
    #[instrument(skip(self, actor, input), fields(user_id = %actor.user_id))]
    pub async fn upsert_own_profile(
        &self,
        actor: &AuthUser,
        input: ProfileInput,
    ) -> Result<UserProfile, ServiceError> {
        if input.name.trim().is_empty() {
            return Err(ServiceError::ValidationError("Name is required".into()));
        }

        let existing: Option<UserProfile> =
            store::get_typed(self.store.as_ref(), &keys::user(actor.user_id)).await?;

        let profile = match existing {
            Some(mut profile) => {
                profile.name = input.name;
                profile.phone = input.phone;
                profile.bio = input.bio;
                if let Some(location) = input.location {
                    profile.location = location;
                }
                profile
            }
            None => UserProfile {
                id: actor.user_id,
                email: actor.email.clone(),
                name: input.name,
                phone: input.phone,
                bio: input.bio,
                location: input.location.unwrap_or_default(),
                role: Role::Buyer,
                created_at: Utc::now(),
            },
        };

        store::set_typed(self.store.as_ref(), &keys::user(actor.user_id), &profile).await?;
        Ok(profile)
    }

    /// Role assignment, operator only.
    #[instrument(skip(self, actor), fields(actor_id = %actor.user_id, user_id = %id))]
    pub async fn set_role(
        &self,
        actor: &AuthUser,
        id: Uuid,
        role: Role,
    ) -> Result<UserProfile, ServiceError> {
        if !actor.is_admin() {
            return Err(ServiceError::Forbidden(
                "Only operators may change roles".into(),
            ));
        }
        let mut profile = self.get_profile(id).await?;
        profile.role = role;
        store::set_typed(self.store.as_ref(), &keys::user(id), &profile).await?;
        Ok(profile)
    }
}
