//! Parent profile: lazily created on first visit, owner-only updates.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::Identity;
use crate::remote::RemoteError;
use crate::schema::{NewProfile, Profile};

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn profile(&self, id: Uuid) -> Result<Option<Profile>, RemoteError>;

    async fn insert_profile(&self, profile: &NewProfile) -> Result<(), RemoteError>;

    async fn update_profile(
        &self,
        id: Uuid,
        full_name: &str,
        phone: &str,
    ) -> Result<(), RemoteError>;
}

pub struct ProfileService {
    store: Arc<dyn ProfileStore>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    /// Fetch the identity's profile row, creating it from the identity's
    /// metadata when it does not exist yet.
    pub async fn ensure(&self, identity: &Identity) -> Result<Profile, RemoteError> {
        if let Some(existing) = self.store.profile(identity.id).await? {
            return Ok(existing);
        }

        let seeded = NewProfile {
            id: identity.id,
            full_name: identity.display_name.clone().unwrap_or_default(),
            email: identity.email.clone(),
        };
        self.store.insert_profile(&seeded).await?;

        Ok(Profile {
            id: seeded.id,
            full_name: Some(seeded.full_name),
            email: Some(seeded.email),
            phone: None,
            avatar_url: None,
            created_at: None,
            updated_at: None,
        })
    }

    pub async fn update(&self, id: Uuid, full_name: &str, phone: &str) -> Result<(), RemoteError> {
        self.store.update_profile(id, full_name, phone).await
    }
}
