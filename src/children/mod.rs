//! Child profile management: form handling, CRUD, and the derived age label.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::remote::RemoteError;
use crate::schema::{BloodType, Child, ChildRecord, Gender};

#[derive(Debug, Error)]
pub enum ChildrenError {
    #[error("please enter the child's name")]
    MissingName,
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

#[async_trait]
pub trait ChildStore: Send + Sync {
    /// Children of a parent, newest first.
    async fn children_for(&self, parent: Uuid) -> Result<Vec<Child>, RemoteError>;

    /// A single child, scoped to its owning parent.
    async fn child(&self, parent: Uuid, id: Uuid) -> Result<Option<Child>, RemoteError>;

    async fn insert_child(&self, record: &ChildRecord) -> Result<(), RemoteError>;

    async fn update_child(
        &self,
        parent: Uuid,
        id: Uuid,
        record: &ChildRecord,
    ) -> Result<(), RemoteError>;

    /// Hard delete, non-recoverable. Confirmation is the caller's problem.
    async fn delete_child(&self, id: Uuid) -> Result<(), RemoteError>;

    async fn count_for(&self, parent: Uuid) -> Result<u64, RemoteError>;
}

/// Raw form values as entered; allergies arrive comma-delimited.
#[derive(Debug, Clone, Default)]
pub struct ChildForm {
    pub name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub blood_type: Option<BloodType>,
    pub allergies: String,
    pub medical_notes: String,
}

impl ChildForm {
    pub fn from_child(child: &Child) -> Self {
        Self {
            name: child.name.clone(),
            date_of_birth: child.date_of_birth,
            gender: child.gender,
            blood_type: child.blood_type,
            allergies: child
                .allergies
                .as_deref()
                .map(|a| a.join(", "))
                .unwrap_or_default(),
            medical_notes: child.medical_notes.clone().unwrap_or_default(),
        }
    }

    fn into_record(self, parent_id: Option<Uuid>) -> Result<ChildRecord, ChildrenError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ChildrenError::MissingName);
        }

        let notes = self.medical_notes.trim();
        Ok(ChildRecord {
            name,
            date_of_birth: self.date_of_birth,
            gender: self.gender,
            blood_type: self.blood_type,
            allergies: parse_allergies(&self.allergies),
            medical_notes: if notes.is_empty() {
                None
            } else {
                Some(notes.to_string())
            },
            parent_id,
        })
    }
}

/// Comma-delimited input, parsed to a trimmed list; blank input stays NULL.
pub fn parse_allergies(input: &str) -> Option<Vec<String>> {
    let parsed: Vec<String> = input
        .split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect();
    if parsed.is_empty() {
        None
    } else {
        Some(parsed)
    }
}

/// Age as the children screen shows it: whole months under a year, whole
/// years after.
pub fn age_label(date_of_birth: NaiveDate, today: NaiveDate) -> String {
    let years = today.year() - date_of_birth.year();
    let months = today.month() as i32 - date_of_birth.month() as i32;

    if years == 0 {
        let months = months + if months < 0 { 12 } else { 0 };
        format!("{months} months")
    } else {
        format!("{years} years")
    }
}

pub struct ChildService {
    store: Arc<dyn ChildStore>,
}

impl ChildService {
    pub fn new(store: Arc<dyn ChildStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, parent: Uuid) -> Result<Vec<Child>, ChildrenError> {
        Ok(self.store.children_for(parent).await?)
    }

    pub async fn load(&self, parent: Uuid, id: Uuid) -> Result<Option<Child>, ChildrenError> {
        Ok(self.store.child(parent, id).await?)
    }

    pub async fn create(&self, parent: Uuid, form: ChildForm) -> Result<(), ChildrenError> {
        let record = form.into_record(Some(parent))?;
        Ok(self.store.insert_child(&record).await?)
    }

    pub async fn update(
        &self,
        parent: Uuid,
        id: Uuid,
        form: ChildForm,
    ) -> Result<(), ChildrenError> {
        let record = form.into_record(None)?;
        Ok(self.store.update_child(parent, id, &record).await?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ChildrenError> {
        Ok(self.store.delete_child(id).await?)
    }
}
