pub mod client;
pub mod state;
pub mod validate;

pub use state::{AuthHolder, AuthPhase, AuthSnapshot};

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::remote::RemoteError;

/// The signed-in identity as the auth provider reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Blocked client-side before any remote call.
    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },
    #[error("email or password is incorrect")]
    InvalidCredentials,
    /// The caller is expected to offer switching to sign-in.
    #[error("this email is already registered")]
    DuplicateAccount,
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Identity provider operations, consumed only through this interface.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, RemoteError>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<(), RemoteError>;

    async fn sign_out(&self) -> Result<(), RemoteError>;
}

/// Resolves the "has at least one child profile" flag for an identity.
#[async_trait]
pub trait ChildrenProbe: Send + Sync {
    async fn has_children(&self, parent: Uuid) -> Result<bool, RemoteError>;
}
