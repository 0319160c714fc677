//! Due/overdue/completed reminder records; overdue is derived at read time,
//! never stored.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::remote::RemoteError;
use crate::schema::Reminder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderStatus {
    Due,
    Overdue,
    Completed,
}

pub fn status(reminder: &Reminder, now: DateTime<Utc>) -> ReminderStatus {
    if reminder.is_completed {
        ReminderStatus::Completed
    } else if reminder.due_date < now {
        ReminderStatus::Overdue
    } else {
        ReminderStatus::Due
    }
}

#[async_trait]
pub trait ReminderStore: Send + Sync {
    /// All reminders in scope, due date ascending (soonest first).
    async fn reminders(&self) -> Result<Vec<Reminder>, RemoteError>;

    async fn mark_complete(&self, id: Uuid) -> Result<(), RemoteError>;
}

pub struct ReminderList {
    store: Arc<dyn ReminderStore>,
    reminders: Vec<Reminder>,
    loading: bool,
}

impl ReminderList {
    pub fn new(store: Arc<dyn ReminderStore>) -> Self {
        Self {
            store,
            reminders: Vec::new(),
            loading: false,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn active(&self) -> Vec<&Reminder> {
        self.reminders.iter().filter(|r| !r.is_completed).collect()
    }

    pub fn completed(&self) -> Vec<&Reminder> {
        self.reminders.iter().filter(|r| r.is_completed).collect()
    }

    pub async fn refresh(&mut self) -> Result<(), RemoteError> {
        self.loading = true;
        let fetched = self.store.reminders().await;
        self.loading = false;
        self.reminders = fetched?;
        Ok(())
    }

    /// Complete a reminder, then re-fetch so the partitions reflect the
    /// store.
    pub async fn mark_complete(&mut self, id: Uuid) -> Result<(), RemoteError> {
        self.store.mark_complete(id).await?;
        self.refresh().await
    }
}
