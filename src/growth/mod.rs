//! Per-child checklist state for the vaccination and milestone schedules,
//! with optimistic toggles reconciled against the remote store.

pub mod schedule;

pub use schedule::{MilestoneCategory, MILESTONES, VACCINATION_SCHEDULE};

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::remote::RemoteError;
use crate::schema::{MilestoneRecord, NewMilestoneRecord, NewVaccinationRecord, VaccinationRecord};

/// Stable identity of a checkable milestone: a pure function of the age-range
/// label, the category, and the item's index within that category's list.
/// Changing the schedule's ordering silently re-keys historical records, so
/// the schedule is treated as append-only.
pub fn milestone_key(age_range: &str, category: MilestoneCategory, index: usize) -> String {
    format!(
        "{}_{}_{}",
        age_range.replace(' ', "-"),
        category.as_str(),
        index
    )
}

#[derive(Debug, Error)]
pub enum GrowthError {
    #[error("please select a child first")]
    NoChildSelected,
    /// A round-trip for this item is still outstanding; the control should be
    /// disabled until it resolves.
    #[error("this item is still being saved")]
    TogglePending,
    /// The optimistic flip has been rolled back.
    #[error("an error occurred while saving")]
    SaveFailed(#[source] RemoteError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// What a resolved toggle did, for the confirmation toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Recorded,
    Cleared,
}

#[async_trait]
pub trait GrowthStore: Send + Sync {
    async fn vaccinations_for(&self, child: Uuid) -> Result<Vec<VaccinationRecord>, RemoteError>;

    async fn add_vaccination(&self, record: &NewVaccinationRecord) -> Result<(), RemoteError>;

    async fn remove_vaccination(&self, child: Uuid, vaccine_name: &str)
        -> Result<(), RemoteError>;

    /// Milestone records, most recently achieved first.
    async fn milestones_for(&self, child: Uuid) -> Result<Vec<MilestoneRecord>, RemoteError>;

    async fn add_milestone(&self, record: &NewMilestoneRecord) -> Result<(), RemoteError>;

    async fn remove_milestone(&self, child: Uuid, milestone_id: &str) -> Result<(), RemoteError>;
}

pub struct GrowthTracker {
    store: Arc<dyn GrowthStore>,
    child: Option<Uuid>,
    completed_vaccines: BTreeSet<String>,
    achieved_milestones: BTreeSet<String>,
    vaccine_history: Vec<VaccinationRecord>,
    milestone_history: Vec<MilestoneRecord>,
    pending_vaccines: BTreeSet<String>,
    pending_milestones: BTreeSet<String>,
}

impl GrowthTracker {
    pub fn new(store: Arc<dyn GrowthStore>) -> Self {
        Self {
            store,
            child: None,
            completed_vaccines: BTreeSet::new(),
            achieved_milestones: BTreeSet::new(),
            vaccine_history: Vec::new(),
            milestone_history: Vec::new(),
            pending_vaccines: BTreeSet::new(),
            pending_milestones: BTreeSet::new(),
        }
    }

    pub fn selected_child(&self) -> Option<Uuid> {
        self.child
    }

    pub fn is_vaccine_completed(&self, vaccine_name: &str) -> bool {
        self.completed_vaccines.contains(vaccine_name)
    }

    pub fn is_milestone_achieved(&self, key: &str) -> bool {
        self.achieved_milestones.contains(key)
    }

    pub fn is_vaccine_pending(&self, vaccine_name: &str) -> bool {
        self.pending_vaccines.contains(vaccine_name)
    }

    pub fn is_milestone_pending(&self, key: &str) -> bool {
        self.pending_milestones.contains(key)
    }

    pub fn vaccine_history(&self) -> &[VaccinationRecord] {
        &self.vaccine_history
    }

    pub fn milestone_history(&self) -> &[MilestoneRecord] {
        &self.milestone_history
    }

    /// Switch the selected child. Both checklists are cleared before the
    /// re-fetch so the previous child's state is never shown against the new
    /// one; a brief empty view during the fetch is fine.
    pub async fn select_child(&mut self, child: Option<Uuid>) -> Result<(), GrowthError> {
        self.child = child;
        self.completed_vaccines.clear();
        self.achieved_milestones.clear();
        self.vaccine_history.clear();
        self.milestone_history.clear();
        self.pending_vaccines.clear();
        self.pending_milestones.clear();

        if child.is_some() {
            self.refresh_vaccinations().await?;
            self.refresh_milestones().await?;
        }
        Ok(())
    }

    /// Replace (not merge) local vaccination state from the store.
    pub async fn refresh_vaccinations(&mut self) -> Result<(), GrowthError> {
        let child = self.child.ok_or(GrowthError::NoChildSelected)?;
        let records = self.store.vaccinations_for(child).await?;
        self.completed_vaccines = records.iter().map(|r| r.vaccine_name.clone()).collect();
        self.vaccine_history = records;
        Ok(())
    }

    /// Replace (not merge) local milestone state from the store.
    pub async fn refresh_milestones(&mut self) -> Result<(), GrowthError> {
        let child = self.child.ok_or(GrowthError::NoChildSelected)?;
        let records = self.store.milestones_for(child).await?;
        self.achieved_milestones = records.iter().map(|r| r.milestone_id.clone()).collect();
        self.milestone_history = records;
        Ok(())
    }

    pub async fn toggle_vaccine(&mut self, vaccine_name: &str) -> Result<ToggleOutcome, GrowthError> {
        let child = self.child.ok_or(GrowthError::NoChildSelected)?;
        if !self.pending_vaccines.insert(vaccine_name.to_string()) {
            return Err(GrowthError::TogglePending);
        }

        let was_completed = self.completed_vaccines.contains(vaccine_name);
        // Flip locally before the round-trip; rolled back on failure.
        if was_completed {
            self.completed_vaccines.remove(vaccine_name);
        } else {
            self.completed_vaccines.insert(vaccine_name.to_string());
        }

        let result = if was_completed {
            self.store.remove_vaccination(child, vaccine_name).await
        } else {
            self.store
                .add_vaccination(&NewVaccinationRecord {
                    child_id: child,
                    vaccine_name: vaccine_name.to_string(),
                    completed: true,
                    completed_at: Utc::now(),
                })
                .await
        };
        self.pending_vaccines.remove(vaccine_name);

        match result {
            Ok(()) => {
                if let Err(e) = self.refresh_vaccinations().await {
                    warn!(error = %e, "vaccination refresh after toggle failed");
                }
                Ok(if was_completed {
                    ToggleOutcome::Cleared
                } else {
                    ToggleOutcome::Recorded
                })
            }
            Err(e) => {
                if was_completed {
                    self.completed_vaccines.insert(vaccine_name.to_string());
                } else {
                    self.completed_vaccines.remove(vaccine_name);
                }
                Err(GrowthError::SaveFailed(e))
            }
        }
    }

    pub async fn toggle_milestone(
        &mut self,
        age_range: &str,
        category: MilestoneCategory,
        index: usize,
        description: &str,
    ) -> Result<ToggleOutcome, GrowthError> {
        let child = self.child.ok_or(GrowthError::NoChildSelected)?;
        let key = milestone_key(age_range, category, index);
        if !self.pending_milestones.insert(key.clone()) {
            return Err(GrowthError::TogglePending);
        }

        let was_achieved = self.achieved_milestones.contains(&key);
        if was_achieved {
            self.achieved_milestones.remove(&key);
        } else {
            self.achieved_milestones.insert(key.clone());
        }

        let result = if was_achieved {
            self.store.remove_milestone(child, &key).await
        } else {
            self.store
                .add_milestone(&NewMilestoneRecord {
                    child_id: child,
                    milestone_id: key.clone(),
                    category: category.as_str().to_string(),
                    age_range: age_range.to_string(),
                    description: description.to_string(),
                    achieved_at: Utc::now(),
                })
                .await
        };
        self.pending_milestones.remove(&key);

        match result {
            Ok(()) => {
                if let Err(e) = self.refresh_milestones().await {
                    warn!(error = %e, "milestone refresh after toggle failed");
                }
                Ok(if was_achieved {
                    ToggleOutcome::Cleared
                } else {
                    ToggleOutcome::Recorded
                })
            }
            Err(e) => {
                if was_achieved {
                    self.achieved_milestones.insert(key);
                } else {
                    self.achieved_milestones.remove(&key);
                }
                Err(GrowthError::SaveFailed(e))
            }
        }
    }
}
