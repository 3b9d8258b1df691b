//! User directory client
//!
//! Resolves user ids to display profiles via the external user service.
//! Directory unavailability must never block chat or message retrieval, so
//! the public surface is infallible: any transport or decode failure
//! degrades to the "Unknown user" sentinel.

use crate::models::UserProfile;
use tracing::warn;

pub struct UserDirectory {
    base_url: String,
    client: reqwest::Client,
}

impl UserDirectory {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Best-effort profile lookup; falls back to the sentinel.
    pub async fn resolve(&self, user_id: &str) -> UserProfile {
        match self.fetch(user_id).await {
            Ok(profile) => profile,
            Err(err) => {
                warn!("User directory lookup failed for {}: {}", user_id, err);
                UserProfile::unknown(user_id)
            }
        }
    }

    async fn fetch(&self, user_id: &str) -> anyhow::Result<UserProfile> {
        let url = format!("{}/api/v1/user/{}", self.base_url, user_id);
        let profile = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(profile)
    }
}
