//! Immutable policy table and compiled role rules.
//!
//! The table maps an access tag to the permissions it defines, and each
//! permission to the ordered roles allowed to exercise it. Role names are
//! compiled into [`RoleRule`] once, when the table is built, so evaluation
//! never dispatches on raw strings.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::roles;
use crate::error::{AccessError, Result};

/// Permission keyword → allowed roles, for one tag.
pub type PermissionRules = BTreeMap<String, Vec<RoleRule>>;

type RawPolicy = BTreeMap<String, BTreeMap<String, Vec<String>>>;

static NO_PERMISSIONS: PermissionRules = BTreeMap::new();

/// An allowed-role entry, resolved to the check it requires.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum RoleRule {
    /// Anyone, authenticated or not.
    NoAuthRequired,
    /// Any authenticated caller.
    RegisteredUser,
    /// The caller created the resource under evaluation.
    ResourceCreatedUser,
    /// The caller is the user the request targets.
    CreatedUser,
    /// The caller owns the project under evaluation.
    ProjectOwner,
    /// The caller is a member of the project under evaluation.
    ProjectMember,
    /// A static role assigned by the identity provider.
    Named(String),
}

impl RoleRule {
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            roles::NO_AUTH_REQUIRED => Self::NoAuthRequired,
            roles::REGISTERED_USER => Self::RegisteredUser,
            roles::RESOURCE_CREATED_USER => Self::ResourceCreatedUser,
            roles::CREATED_USER => Self::CreatedUser,
            roles::PROJECT_OWNER => Self::ProjectOwner,
            roles::PROJECT_MEMBER => Self::ProjectMember,
            other => Self::Named(other.to_string()),
        }
    }

    /// Role name as written in the policy and in caller role lists.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::NoAuthRequired => roles::NO_AUTH_REQUIRED,
            Self::RegisteredUser => roles::REGISTERED_USER,
            Self::ResourceCreatedUser => roles::RESOURCE_CREATED_USER,
            Self::CreatedUser => roles::CREATED_USER,
            Self::ProjectOwner => roles::PROJECT_OWNER,
            Self::ProjectMember => roles::PROJECT_MEMBER,
            Self::Named(name) => name.as_str(),
        }
    }
}

impl From<String> for RoleRule {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<RoleRule> for String {
    fn from(value: RoleRule) -> Self {
        value.name().to_string()
    }
}

/// Fixed policy, constructed once and owned by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPolicy", into = "RawPolicy")]
pub struct PolicyTable {
    pub(super) rules: BTreeMap<String, PermissionRules>,
}

impl PolicyTable {
    /// Build a table from `(tag, [(permission, [role, ...])])` entries.
    ///
    /// Every defined permission must allow at least one role; an absent pair is
    /// how "grants nothing" is expressed.
    pub fn from_entries<'a, T, P, R>(entries: T) -> Result<Self>
    where
        T: IntoIterator<Item = (&'a str, P)>,
        P: IntoIterator<Item = (&'a str, R)>,
        R: IntoIterator<Item = &'a str>,
    {
        let mut rules = BTreeMap::new();
        for (tag, permissions) in entries {
            let mut compiled = PermissionRules::new();
            for (permission, allowed) in permissions {
                let allowed: Vec<RoleRule> = allowed.into_iter().map(RoleRule::parse).collect();
                if allowed.is_empty() {
                    return Err(AccessError::InvalidPolicy {
                        reason: format!("{tag}/{permission} allows no roles"),
                    });
                }
                compiled.insert(permission.to_string(), allowed);
            }
            rules.insert(tag.to_string(), compiled);
        }
        Ok(Self { rules })
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let table = Self::from_json_reader(BufReader::new(file))?;
        tracing::debug!(
            path = %path.as_ref().display(),
            tags = table.rules.len(),
            "loaded access policy"
        );
        Ok(table)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Permission rules for `tag`; an unknown tag yields an empty mapping.
    #[must_use]
    pub fn permissions_for(&self, tag: &str) -> &PermissionRules {
        self.rules.get(tag).unwrap_or(&NO_PERMISSIONS)
    }

    /// Allowed roles for `(tag, permission)`; empty when the pair is undefined.
    #[must_use]
    pub fn allowed_roles(&self, tag: &str, permission: &str) -> &[RoleRule] {
        self.permissions_for(tag)
            .get(permission)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    #[must_use]
    pub fn contains_tag(&self, tag: &str) -> bool {
        self.rules.contains_key(tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }
}

impl TryFrom<RawPolicy> for PolicyTable {
    type Error = AccessError;

    fn try_from(raw: RawPolicy) -> Result<Self> {
        Self::from_entries(raw.iter().map(|(tag, permissions)| {
            (
                tag.as_str(),
                permissions.iter().map(|(permission, allowed)| {
                    (permission.as_str(), allowed.iter().map(String::as_str))
                }),
            )
        }))
    }
}

impl From<PolicyTable> for RawPolicy {
    fn from(table: PolicyTable) -> Self {
        table
            .rules
            .into_iter()
            .map(|(tag, permissions)| {
                let permissions = permissions
                    .into_iter()
                    .map(|(permission, allowed)| {
                        (permission, allowed.into_iter().map(String::from).collect())
                    })
                    .collect();
                (tag, permissions)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tag_yields_empty_rules() {
        let table = PolicyTable::builtin();
        assert!(table.permissions_for("nonexistent-tag").is_empty());
        assert!(table.allowed_roles("nonexistent-tag", "edit").is_empty());
        assert!(!table.contains_tag("nonexistent-tag"));
    }

    #[test]
    fn dynamic_roles_compile_to_their_variants() {
        assert_eq!(RoleRule::parse("projectOwner"), RoleRule::ProjectOwner);
        assert_eq!(
            RoleRule::parse("AgAdmin"),
            RoleRule::Named("AgAdmin".to_string())
        );
        assert_eq!(RoleRule::parse("resourceCreatedUser").name(), "resourceCreatedUser");
    }

    #[test]
    fn empty_role_list_is_rejected() {
        let err = PolicyTable::from_json_str(r#"{"content":{"edit":[]}}"#).unwrap_err();
        assert!(err.to_string().contains("content/edit"));
    }

    #[test]
    fn json_round_trip_preserves_role_order() {
        let table = PolicyTable::builtin();
        let json = table.to_json_string().unwrap();
        let reloaded = PolicyTable::from_json_str(&json).unwrap();
        assert_eq!(reloaded, table);
        assert_eq!(
            reloaded.allowed_roles("meta-content", "edit"),
            [RoleRule::Named("SuperAdmin".to_string()), RoleRule::ResourceCreatedUser]
        );
    }
}
