//! Resolved caller identity as consumed by the decision engine.

use serde::{Deserialize, Serialize};

use crate::constants::roles;

/// Why identity resolution fell back to an anonymous caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum IdentityFailure {
    /// Missing, expired, or rejected session token.
    Unauthorized(String),
    /// The identity provider failed or answered with something unusable.
    Upstream(String),
}

/// Caller as seen by the engine: `user_id == None` is an unauthenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CallerIdentity {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<IdentityFailure>,
}

impl CallerIdentity {
    pub fn authenticated<I, S>(user_id: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            user_id: Some(user_id.into()),
            roles: roles.into_iter().map(Into::into).collect(),
            error: None,
        }
    }

    /// Unauthenticated caller that can still reach `noAuthRequired` resources.
    #[must_use]
    pub fn anonymous(failure: Option<IdentityFailure>) -> Self {
        Self {
            user_id: None,
            roles: vec![roles::NO_AUTH_REQUIRED.to_string()],
            error: failure,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|held| held == role)
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}
