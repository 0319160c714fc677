use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::{AuthApi, Identity};
use crate::remote::{RemoteClient, RemoteError};

/// Identity provider implementation over the platform's auth surface. A
/// successful sign-in installs the access token on the shared remote client
/// so row and function calls run as that identity.
pub struct PlatformAuth {
    client: Arc<RemoteClient>,
}

impl PlatformAuth {
    pub fn new(client: Arc<RemoteClient>) -> Self {
        Self { client }
    }

    fn parse_identity(value: &serde_json::Value) -> Result<Identity, RemoteError> {
        let user = value
            .get("user")
            .ok_or_else(|| RemoteError::Decode("token response missing user".into()))?;
        let id = user
            .get("id")
            .and_then(|v| v.as_str())
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or_else(|| RemoteError::Decode("token response missing user id".into()))?;
        let email = user
            .get("email")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let display_name = user
            .pointer("/user_metadata/full_name")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        Ok(Identity {
            id,
            email,
            display_name,
        })
    }
}

#[async_trait]
impl AuthApi for PlatformAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, RemoteError> {
        let body = json!({ "email": email, "password": password });
        let value = self
            .client
            .auth_call("token", &[("grant_type", "password")], &body)
            .await?;

        let token = value
            .get("access_token")
            .and_then(|v| v.as_str())
            .ok_or_else(|| RemoteError::Decode("token response missing access_token".into()))?;

        let identity = Self::parse_identity(&value)?;
        self.client.set_bearer(Some(token.to_string()));
        Ok(identity)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<(), RemoteError> {
        let body = json!({
            "email": email,
            "password": password,
            "data": { "full_name": display_name },
        });
        self.client.auth_call("signup", &[], &body).await?;
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), RemoteError> {
        let result = self.client.auth_call("logout", &[], &json!({})).await;
        self.client.set_bearer(None);
        result.map(|_| ())
    }
}
