//! Persistence collaborator seams: project-role lookups and the commit/refresh
//! step of the write path.
//!
//! Implementations are expected to bound their own I/O with a timeout and to
//! report failures as [`PersistenceError`]; the engine never retries and never
//! turns a failed lookup into an allow or a deny.

use std::collections::BTreeSet;
use std::fmt;

use crate::constants::roles;
use crate::error::PersistenceError;
use crate::types::ProjectId;

/// Relationship a user holds inside a translation project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProjectRole {
    Owner,
    Member,
}

impl ProjectRole {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => roles::PROJECT_OWNER,
            Self::Member => roles::PROJECT_MEMBER,
        }
    }
}

impl fmt::Display for ProjectRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Membership query backing the `projectOwner` / `projectMember` roles.
pub trait ProjectMembership {
    fn has_project_role(
        &self,
        project_id: ProjectId,
        user_id: &str,
        role: ProjectRole,
    ) -> Result<bool, PersistenceError>;
}

impl<T: ProjectMembership + ?Sized> ProjectMembership for &T {
    fn has_project_role(
        &self,
        project_id: ProjectId,
        user_id: &str,
        role: ProjectRole,
    ) -> Result<bool, PersistenceError> {
        (**self).has_project_role(project_id, user_id, role)
    }
}

impl<T: ProjectMembership + ?Sized> ProjectMembership for std::sync::Arc<T> {
    fn has_project_role(
        &self,
        project_id: ProjectId,
        user_id: &str,
        role: ProjectRole,
    ) -> Result<bool, PersistenceError> {
        (**self).has_project_role(project_id, user_id, role)
    }
}

/// Transaction scope of the current request.
pub trait UnitOfWork<R> {
    fn commit(&mut self) -> Result<(), PersistenceError>;

    fn refresh(&mut self, record: &mut R) -> Result<(), PersistenceError>;
}

/// Step recorded by [`InMemoryStore`] so callers can check ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    Lookup,
    Commit,
    Refresh,
}

/// In-process membership table and unit of work.
///
/// Used by the crate's tests and by embedders that keep project membership in
/// memory. An outage can be injected to exercise the operational-failure path.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    memberships: BTreeSet<(ProjectId, String, ProjectRole)>,
    outage: Option<String>,
    journal: std::sync::Mutex<Vec<StoreEvent>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_member(&mut self, project_id: ProjectId, user_id: impl Into<String>, role: ProjectRole) {
        self.memberships.insert((project_id, user_id.into(), role));
    }

    #[must_use]
    pub fn with_member(
        mut self,
        project_id: ProjectId,
        user_id: impl Into<String>,
        role: ProjectRole,
    ) -> Self {
        self.add_member(project_id, user_id, role);
        self
    }

    /// Make every subsequent call fail as if the backend were unreachable.
    pub fn set_outage(&mut self, reason: impl Into<String>) {
        self.outage = Some(reason.into());
    }

    /// Steps performed so far, in order.
    #[must_use]
    pub fn journal(&self) -> Vec<StoreEvent> {
        match self.journal.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    #[must_use]
    pub fn commits(&self) -> usize {
        self.journal()
            .iter()
            .filter(|event| **event == StoreEvent::Commit)
            .count()
    }

    fn record(&self, event: StoreEvent) -> Result<(), PersistenceError> {
        match self.journal.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
        match &self.outage {
            Some(reason) => Err(PersistenceError::Unavailable {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl ProjectMembership for InMemoryStore {
    fn has_project_role(
        &self,
        project_id: ProjectId,
        user_id: &str,
        role: ProjectRole,
    ) -> Result<bool, PersistenceError> {
        self.record(StoreEvent::Lookup)?;
        Ok(self
            .memberships
            .contains(&(project_id, user_id.to_string(), role)))
    }
}

impl<R> UnitOfWork<R> for InMemoryStore {
    fn commit(&mut self) -> Result<(), PersistenceError> {
        self.record(StoreEvent::Commit)
    }

    fn refresh(&mut self, _record: &mut R) -> Result<(), PersistenceError> {
        self.record(StoreEvent::Refresh)
    }
}
