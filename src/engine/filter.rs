//! Per-candidate visibility filtering for list reads.

use std::collections::HashSet;

use crate::constants::{SINGLE_PROJECT_PREFIX, roles};
use crate::permission::PermissionMap;
use crate::policy::RoleRule;
use crate::store::ProjectMembership;
use crate::types::request::trim_endpoint;
use crate::types::{CallerIdentity, RequestContext, ResourceRecord};

use super::AccessEngine;

/// Outcome of filtering a candidate list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FilterOutcome {
    pub has_rights: bool,
    /// Indices into the candidate slice, ascending.
    pub visible: Vec<usize>,
    pub hidden_count: usize,
}

impl FilterOutcome {
    fn record(&mut self, index: usize, visible: bool) {
        if visible {
            self.visible.push(index);
        } else {
            self.hidden_count += 1;
        }
    }
}

/// Caller as seen by the filters: identity failures strip everything.
#[derive(Debug, Clone, PartialEq, Eq)]
struct NormalizedCaller<'a> {
    user_id: Option<&'a str>,
    roles: Vec<String>,
}

impl<'a> NormalizedCaller<'a> {
    fn raw(caller: &'a CallerIdentity) -> Self {
        if caller.error.is_some() {
            return Self {
                user_id: None,
                roles: Vec::new(),
            };
        }
        Self {
            user_id: caller.user_id(),
            roles: caller.roles.clone(),
        }
    }

    // Legacy API roles read as registered, and every signed-in caller is registered.
    fn for_content(caller: &'a CallerIdentity, legacy_roles: &[String]) -> Self {
        let mut normalized = Self::raw(caller);
        if caller.error.is_some() {
            return normalized;
        }
        let before = normalized.roles.len();
        normalized.roles.retain(|role| !legacy_roles.contains(role));
        let had_legacy = normalized.roles.len() != before;
        let registered = roles::REGISTERED_USER.to_string();
        if (had_legacy || normalized.user_id.is_some()) && !normalized.roles.contains(&registered) {
            normalized.roles.push(registered);
        }
        normalized
    }

    fn holds_any(&self, allowed: &[RoleRule]) -> bool {
        allowed
            .iter()
            .any(|rule| self.roles.iter().any(|role| role == rule.name()))
    }
}

impl<P, M> AccessEngine<P, M>
where
    P: PermissionMap,
    M: ProjectMembership,
{
    /// Keep each content record that one of its own tags opens to the caller.
    pub(super) fn filter_tagged_content<R: ResourceRecord>(
        &self,
        candidates: &[R],
        context: &RequestContext,
        required_permission: &str,
        caller: &CallerIdentity,
    ) -> FilterOutcome {
        let normalized =
            NormalizedCaller::for_content(caller, &self.options.legacy_registered_roles);
        let mut unknown_tags: HashSet<&str> = HashSet::new();
        let mut outcome = FilterOutcome::default();

        for (index, record) in candidates.iter().enumerate() {
            let visible = record.access_permissions().iter().any(|tag| {
                if !self.policy.contains_tag(tag) {
                    if unknown_tags.insert(tag.as_str()) {
                        tracing::warn!(%tag, "skipping tag the policy does not define");
                    }
                    return false;
                }
                let allowed = self.policy.allowed_roles(tag, required_permission);
                allowed.contains(&RoleRule::NoAuthRequired) || normalized.holds_any(allowed)
            });
            outcome.record(index, visible);
        }

        let lists_sources =
            context.path() == trim_endpoint(&self.options.sources_listing_endpoint);
        outcome.has_rights = lists_sources || !outcome.visible.is_empty();
        tracing::debug!(
            visible = outcome.visible.len(),
            hidden = outcome.hidden_count,
            "filtered content candidates"
        );
        outcome
    }

    /// Project listing: a matching static role opens every project; otherwise
    /// only projects that list the caller under an allowed role stay.
    pub(super) fn filter_projects<R: ResourceRecord>(
        &self,
        candidates: &[R],
        access_tags: &[String],
        required_permission: &str,
        caller: &CallerIdentity,
        context: &RequestContext,
    ) -> FilterOutcome {
        let normalized = NormalizedCaller::raw(caller);
        let allowed = access_tags
            .first()
            .map(|tag| self.policy.allowed_roles(tag, required_permission))
            .unwrap_or_default();
        let mut outcome = FilterOutcome::default();

        match normalized.user_id {
            Some(user_id) if !normalized.roles.is_empty() && !allowed.is_empty() => {
                let open_to_all = normalized.holds_any(allowed);
                for (index, project) in candidates.iter().enumerate() {
                    let visible = open_to_all
                        || project.project_users().iter().any(|member| {
                            member.user_id == user_id
                                && allowed.iter().any(|rule| rule.name() == member.user_role)
                        });
                    outcome.record(index, visible);
                }
            }
            _ => outcome.hidden_count = candidates.len(),
        }

        outcome.has_rights =
            !(context.endpoint.starts_with(SINGLE_PROJECT_PREFIX) && outcome.visible.is_empty());
        tracing::debug!(
            visible = outcome.visible.len(),
            hidden = outcome.hidden_count,
            "filtered project candidates"
        );
        outcome
    }
}
