use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::auth::{validate, AuthApi, AuthError, ChildrenProbe, Identity};
use crate::remote::RemoteError;

/// Where the current identity stands. `Loading` means the session has not
/// been resolved yet; dependents must make no redirect decision on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthPhase {
    Loading,
    SignedOut,
    SignedIn(Identity),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSnapshot {
    pub phase: AuthPhase,
    /// None until resolved for the signed-in identity.
    pub has_children: Option<bool>,
}

impl AuthSnapshot {
    pub fn identity(&self) -> Option<&Identity> {
        match &self.phase {
            AuthPhase::SignedIn(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.phase == AuthPhase::Loading
    }
}

/// Single source of truth for the signed-in identity and its derived
/// has-children flag. Dependents subscribe and are notified on change; the
/// children count is re-resolved exactly once per successful auth transition,
/// not per observation.
pub struct AuthHolder {
    api: Arc<dyn AuthApi>,
    children: Arc<dyn ChildrenProbe>,
    tx: watch::Sender<AuthSnapshot>,
}

impl AuthHolder {
    pub fn new(api: Arc<dyn AuthApi>, children: Arc<dyn ChildrenProbe>) -> Self {
        let (tx, _rx) = watch::channel(AuthSnapshot {
            phase: AuthPhase::Loading,
            has_children: None,
        });
        Self { api, children, tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        self.tx.borrow().clone()
    }

    fn publish(&self, snapshot: AuthSnapshot) {
        // send_replace never fails even with no live subscribers.
        self.tx.send_replace(snapshot);
    }

    /// Resolve the initial session. The mobile shell carries no persisted
    /// token, so an unresolved session settles to signed-out.
    pub async fn initialize(&self) {
        if self.snapshot().is_loading() {
            self.publish(AuthSnapshot {
                phase: AuthPhase::SignedOut,
                has_children: None,
            });
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        validate::email(email)?;
        validate::password(password)?;

        let identity = self.api.sign_in(email.trim(), password).await.map_err(
            |e| match e {
                RemoteError::InvalidCredentials => AuthError::InvalidCredentials,
                other => AuthError::Remote(other),
            },
        )?;

        info!(user = %identity.id, "signed in");
        self.publish(AuthSnapshot {
            phase: AuthPhase::SignedIn(identity.clone()),
            has_children: None,
        });
        self.resolve_children(&identity).await;
        Ok(identity)
    }

    /// Create the account. Success does not sign the user in; the caller
    /// sends them to the sign-in form. The profile row is created downstream
    /// by the platform.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<(), AuthError> {
        validate::email(email)?;
        validate::password(password)?;
        validate::display_name(display_name)?;

        self.api
            .sign_up(email.trim(), password, display_name.trim())
            .await
            .map_err(|e| match e {
                RemoteError::DuplicateAccount => AuthError::DuplicateAccount,
                other => AuthError::Remote(other),
            })?;

        info!("account created");
        self.publish(AuthSnapshot {
            phase: AuthPhase::SignedOut,
            has_children: None,
        });
        Ok(())
    }

    pub async fn sign_out(&self) {
        if let Err(e) = self.api.sign_out().await {
            // The local session is cleared regardless.
            warn!(error = %e, "remote sign-out failed");
        }
        info!("signed out");
        self.publish(AuthSnapshot {
            phase: AuthPhase::SignedOut,
            has_children: None,
        });
    }

    /// Re-resolve the has-children flag, e.g. after the first child profile
    /// is created mid-session.
    pub async fn refresh_children(&self) {
        if let Some(identity) = self.snapshot().identity().cloned() {
            self.resolve_children(&identity).await;
        }
    }

    async fn resolve_children(&self, identity: &Identity) {
        let resolved = match self.children.has_children(identity.id).await {
            Ok(flag) => Some(flag),
            Err(e) => {
                warn!(error = %e, "could not resolve children count");
                None
            }
        };

        let current = self.snapshot();
        // A sign-out that raced the probe wins; never resurrect an identity.
        if current.identity().map(|i| i.id) == Some(identity.id) {
            self.publish(AuthSnapshot {
                phase: current.phase,
                has_children: resolved,
            });
        }
    }
}
