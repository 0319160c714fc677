//! The platform-backed implementation of every store seam. One concrete
//! type, addressed through the per-module traits.

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::ChildrenProbe;
use crate::chat::{Assistant, AssistantReply, ChatStore};
use crate::children::ChildStore;
use crate::growth::GrowthStore;
use crate::notify::{Directory, PushSender};
use crate::profile::ProfileStore;
use crate::reminders::ReminderStore;
use crate::remote::client::{Eq, Order};
use crate::remote::{RemoteClient, RemoteError};
use crate::schema::{
    ChatMessage, ChatSession, Child, ChildRecord, MilestoneRecord, NewMilestoneRecord,
    NewNotification, NewProfile, NewVaccinationRecord, Profile, Reminder, VaccinationRecord,
};

pub mod tables {
    pub const PROFILES: &str = "profiles";
    pub const CHILDREN: &str = "children";
    pub const CHAT_SESSIONS: &str = "chat_sessions";
    pub const CHAT_MESSAGES: &str = "chat_messages";
    pub const CHILD_VACCINATIONS: &str = "child_vaccinations";
    pub const CHILD_MILESTONES: &str = "child_milestones";
    pub const REMINDERS: &str = "reminders";
    pub const NOTIFICATIONS: &str = "notifications";
}

pub mod functions {
    pub const ASSISTANT_CHAT: &str = "assistant-chat";
    pub const PUSH: &str = "push";
}

#[derive(Clone)]
pub struct PlatformStore {
    client: Arc<RemoteClient>,
}

impl PlatformStore {
    pub fn new(client: Arc<RemoteClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChatStore for PlatformStore {
    async fn sessions_for(&self, user: Uuid) -> Result<Vec<ChatSession>, RemoteError> {
        self.client
            .select(
                tables::CHAT_SESSIONS,
                &[Eq::new("user_id", user)],
                Some(Order::desc("updated_at")),
            )
            .await
    }

    async fn messages_for(&self, session: Uuid) -> Result<Vec<ChatMessage>, RemoteError> {
        self.client
            .select(
                tables::CHAT_MESSAGES,
                &[Eq::new("session_id", session)],
                Some(Order::asc("created_at")),
            )
            .await
    }
}

#[derive(Debug, Deserialize)]
struct AssistantWireReply {
    #[serde(rename = "sessionId")]
    session_id: Uuid,
    response: String,
}

#[async_trait]
impl Assistant for PlatformStore {
    async fn send(
        &self,
        session: Option<Uuid>,
        message: &str,
        user: Uuid,
    ) -> Result<AssistantReply, RemoteError> {
        let body = json!({
            "sessionId": session,
            "message": message,
            "userId": user,
        });
        let reply: AssistantWireReply = self
            .client
            .invoke(functions::ASSISTANT_CHAT, &body)
            .await?;
        Ok(AssistantReply {
            session_id: reply.session_id,
            response: reply.response,
        })
    }
}

#[async_trait]
impl GrowthStore for PlatformStore {
    async fn vaccinations_for(&self, child: Uuid) -> Result<Vec<VaccinationRecord>, RemoteError> {
        self.client
            .select(
                tables::CHILD_VACCINATIONS,
                &[Eq::new("child_id", child)],
                None,
            )
            .await
    }

    async fn add_vaccination(&self, record: &NewVaccinationRecord) -> Result<(), RemoteError> {
        self.client.insert(tables::CHILD_VACCINATIONS, record).await
    }

    async fn remove_vaccination(
        &self,
        child: Uuid,
        vaccine_name: &str,
    ) -> Result<(), RemoteError> {
        self.client
            .delete(
                tables::CHILD_VACCINATIONS,
                &[
                    Eq::new("child_id", child),
                    Eq::new("vaccine_name", vaccine_name),
                ],
            )
            .await
    }

    async fn milestones_for(&self, child: Uuid) -> Result<Vec<MilestoneRecord>, RemoteError> {
        self.client
            .select(
                tables::CHILD_MILESTONES,
                &[Eq::new("child_id", child)],
                Some(Order::desc("achieved_at")),
            )
            .await
    }

    async fn add_milestone(&self, record: &NewMilestoneRecord) -> Result<(), RemoteError> {
        self.client.insert(tables::CHILD_MILESTONES, record).await
    }

    async fn remove_milestone(&self, child: Uuid, milestone_id: &str) -> Result<(), RemoteError> {
        self.client
            .delete(
                tables::CHILD_MILESTONES,
                &[
                    Eq::new("child_id", child),
                    Eq::new("milestone_id", milestone_id),
                ],
            )
            .await
    }
}

#[async_trait]
impl ChildStore for PlatformStore {
    async fn children_for(&self, parent: Uuid) -> Result<Vec<Child>, RemoteError> {
        self.client
            .select(
                tables::CHILDREN,
                &[Eq::new("parent_id", parent)],
                Some(Order::desc("created_at")),
            )
            .await
    }

    async fn child(&self, parent: Uuid, id: Uuid) -> Result<Option<Child>, RemoteError> {
        let rows: Vec<Child> = self
            .client
            .select(
                tables::CHILDREN,
                &[Eq::new("id", id), Eq::new("parent_id", parent)],
                None,
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_child(&self, record: &ChildRecord) -> Result<(), RemoteError> {
        self.client.insert(tables::CHILDREN, record).await
    }

    async fn update_child(
        &self,
        parent: Uuid,
        id: Uuid,
        record: &ChildRecord,
    ) -> Result<(), RemoteError> {
        self.client
            .update(
                tables::CHILDREN,
                &[Eq::new("id", id), Eq::new("parent_id", parent)],
                record,
            )
            .await
    }

    async fn delete_child(&self, id: Uuid) -> Result<(), RemoteError> {
        self.client
            .delete(tables::CHILDREN, &[Eq::new("id", id)])
            .await
    }

    async fn count_for(&self, parent: Uuid) -> Result<u64, RemoteError> {
        self.client
            .count(tables::CHILDREN, &[Eq::new("parent_id", parent)])
            .await
    }
}

#[async_trait]
impl ChildrenProbe for PlatformStore {
    async fn has_children(&self, parent: Uuid) -> Result<bool, RemoteError> {
        Ok(ChildStore::count_for(self, parent).await? > 0)
    }
}

#[async_trait]
impl ProfileStore for PlatformStore {
    async fn profile(&self, id: Uuid) -> Result<Option<Profile>, RemoteError> {
        let rows: Vec<Profile> = self
            .client
            .select(tables::PROFILES, &[Eq::new("id", id)], None)
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_profile(&self, profile: &NewProfile) -> Result<(), RemoteError> {
        self.client.insert(tables::PROFILES, profile).await
    }

    async fn update_profile(
        &self,
        id: Uuid,
        full_name: &str,
        phone: &str,
    ) -> Result<(), RemoteError> {
        self.client
            .update(
                tables::PROFILES,
                &[Eq::new("id", id)],
                &json!({ "full_name": full_name, "phone": phone }),
            )
            .await
    }
}

#[async_trait]
impl ReminderStore for PlatformStore {
    async fn reminders(&self) -> Result<Vec<Reminder>, RemoteError> {
        self.client
            .select(tables::REMINDERS, &[], Some(Order::asc("due_date")))
            .await
    }

    async fn mark_complete(&self, id: Uuid) -> Result<(), RemoteError> {
        self.client
            .update(
                tables::REMINDERS,
                &[Eq::new("id", id)],
                &json!({ "is_completed": true, "updated_at": Utc::now() }),
            )
            .await
    }
}

#[derive(Debug, Deserialize)]
struct IdRow {
    id: Uuid,
}

#[async_trait]
impl Directory for PlatformStore {
    async fn profile_ids(&self) -> Result<Vec<Uuid>, RemoteError> {
        let rows: Vec<IdRow> = self.client.select(tables::PROFILES, &[], None).await?;
        Ok(rows.into_iter().map(|r| r.id).collect())
    }

    async fn insert_notifications(&self, rows: &[NewNotification]) -> Result<(), RemoteError> {
        self.client.insert(tables::NOTIFICATIONS, rows).await
    }
}

#[async_trait]
impl PushSender for PlatformStore {
    async fn push(&self, title: &str, message: &str) -> Result<(), RemoteError> {
        let _: serde_json::Value = self
            .client
            .invoke(
                functions::PUSH,
                &json!({ "title": title, "message": message }),
            )
            .await?;
        Ok(())
    }
}
