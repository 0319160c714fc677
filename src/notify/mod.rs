//! Admin broadcast: a point-in-time fan-out of one notification row per
//! registered identity, followed by a single push-relay invocation.
//! Identities registered after the broadcast never receive it.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::remote::RemoteError;
use crate::schema::NewNotification;

#[derive(Debug, Error)]
pub enum BroadcastError {
    #[error("please enter both a title and a message")]
    MissingContent,
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

#[async_trait]
pub trait Directory: Send + Sync {
    /// Ids of every currently registered identity.
    async fn profile_ids(&self) -> Result<Vec<Uuid>, RemoteError>;

    /// One batch insert; the fan-out is unbounded by design of the source
    /// schema and recorded as a scalability gap.
    async fn insert_notifications(&self, rows: &[NewNotification]) -> Result<(), RemoteError>;
}

#[async_trait]
pub trait PushSender: Send + Sync {
    async fn push(&self, title: &str, message: &str) -> Result<(), RemoteError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastReport {
    pub recipients: usize,
    /// False when the rows were written but the push-gateway call failed;
    /// callers surface this as a degraded success, not an error.
    pub push_delivered: bool,
}

pub struct AdminBroadcast {
    directory: Arc<dyn Directory>,
    push: Arc<dyn PushSender>,
}

impl AdminBroadcast {
    pub fn new(directory: Arc<dyn Directory>, push: Arc<dyn PushSender>) -> Self {
        Self { directory, push }
    }

    pub async fn send_to_all(
        &self,
        title: &str,
        message: &str,
    ) -> Result<BroadcastReport, BroadcastError> {
        let title = title.trim();
        let message = message.trim();
        if title.is_empty() || message.is_empty() {
            return Err(BroadcastError::MissingContent);
        }

        let recipients = self.directory.profile_ids().await?;
        if recipients.is_empty() {
            return Ok(BroadcastReport {
                recipients: 0,
                push_delivered: false,
            });
        }

        let rows: Vec<NewNotification> = recipients
            .iter()
            .map(|&user_id| NewNotification {
                user_id,
                title: title.to_string(),
                message: message.to_string(),
                is_read: false,
            })
            .collect();
        self.directory.insert_notifications(&rows).await?;

        // Exactly one gateway invocation regardless of how many rows landed.
        let push_delivered = match self.push.push(title, message).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "notification rows saved but push delivery failed");
                false
            }
        };

        info!(recipients = rows.len(), push_delivered, "broadcast sent");
        Ok(BroadcastReport {
            recipients: rows.len(),
            push_delivered,
        })
    }
}
