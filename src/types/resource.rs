//! Resource categories and the narrow read/stamp interface the engine needs from records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AccessError;

/// Primary key of a translation project.
pub type ProjectId = i64;

/// Coarse resource category; selects tag derivation and the filtering regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Metacontent,
    Content,
    Project,
    User,
    Translation,
}

impl ResourceType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Metacontent => "metacontent",
            Self::Content => "content",
            Self::Project => "project",
            Self::User => "user",
            Self::Translation => "translation",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = AccessError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "metacontent" | "meta-content" => Ok(Self::Metacontent),
            "content" => Ok(Self::Content),
            "project" => Ok(Self::Project),
            "user" => Ok(Self::User),
            "translation" => Ok(Self::Translation),
            _ => Err(AccessError::UnknownResourceType {
                name: value.to_string(),
            }),
        }
    }
}

/// One row of a project's user list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectUser {
    pub user_id: String,
    pub user_role: String,
}

impl ProjectUser {
    pub fn new(user_id: impl Into<String>, user_role: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            user_role: user_role.into(),
        }
    }
}

/// Field accessors the engine reads from persisted entities, plus the audit
/// stamps the mediator writes before committing.
pub trait ResourceRecord {
    /// Access tags stored on content-family records.
    fn access_permissions(&self) -> &[String];

    fn created_user(&self) -> Option<&str>;

    fn project_id(&self) -> Option<ProjectId> {
        None
    }

    fn project_users(&self) -> &[ProjectUser] {
        &[]
    }

    fn stamp_created_user(&mut self, user_id: Option<&str>);

    fn stamp_updated_user(&mut self, user_id: Option<&str>);
}

/// General-purpose record used by tests, tooling, and JSON fixtures.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub access_permissions: Vec<String>,
    #[serde(default)]
    pub created_user: Option<String>,
    #[serde(default)]
    pub updated_user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<ProjectUser>,
}

impl ResourceEntry {
    /// Content record carrying the given access tags.
    pub fn content<I, S>(name: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: Some(name.into()),
            access_permissions: tags.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Translation project with its user list.
    pub fn project(project_id: ProjectId, users: Vec<ProjectUser>) -> Self {
        Self {
            name: Some(format!("project-{project_id}")),
            project_id: Some(project_id),
            users,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn created_by(mut self, user_id: impl Into<String>) -> Self {
        self.created_user = Some(user_id.into());
        self
    }
}

impl ResourceRecord for ResourceEntry {
    fn access_permissions(&self) -> &[String] {
        &self.access_permissions
    }

    fn created_user(&self) -> Option<&str> {
        self.created_user.as_deref()
    }

    fn project_id(&self) -> Option<ProjectId> {
        self.project_id
    }

    fn project_users(&self) -> &[ProjectUser] {
        &self.users
    }

    fn stamp_created_user(&mut self, user_id: Option<&str>) {
        self.created_user = user_id.map(str::to_string);
    }

    fn stamp_updated_user(&mut self, user_id: Option<&str>) {
        self.updated_user = user_id.map(str::to_string);
    }
}

/// The resource under evaluation: a single record on writes, a candidate list on reads.
#[derive(Debug)]
pub enum ResourceInput<'a, R> {
    None,
    Single(&'a R),
    Collection(&'a [R]),
}

impl<R> Clone for ResourceInput<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for ResourceInput<'_, R> {}

impl<'a, R> ResourceInput<'a, R> {
    /// First record, used where a single subject is needed.
    #[must_use]
    pub fn primary(&self) -> Option<&'a R> {
        match *self {
            Self::None => None,
            Self::Single(record) => Some(record),
            Self::Collection(records) => records.first(),
        }
    }

    /// Records viewed as a candidate list.
    #[must_use]
    pub fn as_slice(&self) -> &'a [R] {
        match *self {
            Self::None => &[],
            Self::Single(record) => std::slice::from_ref(record),
            Self::Collection(records) => records,
        }
    }
}
