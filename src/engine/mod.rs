//! The access decision engine.
//!
//! [`AccessEngine`] owns the immutable policy and its two lookup collaborators.
//! A decision runs in three steps: classify the resource and resolve the
//! required permission, derive the access tags, then either evaluate rights
//! (single-subject requests) or filter the candidate list (list reads).

mod classify;
mod filter;
mod rights;

pub use classify::{classify, tags_for};

use tracing::instrument;

use crate::constants::AUTOGRAPHA_PREFIX;
use crate::error::{AccessError, Result};
use crate::permission::PermissionMap;
use crate::policy::PolicyTable;
use crate::store::ProjectMembership;
use crate::types::{
    AccessDecision, App, CallerIdentity, EngineOptions, RequestContext, ResourceInput,
    ResourceRecord, ResourceType,
};

/// Decision function shared by every request.
///
/// Holds no per-request state; share it behind an `Arc` when the collaborators
/// are `Send + Sync`.
#[derive(Debug, Clone)]
pub struct AccessEngine<P, M> {
    policy: PolicyTable,
    permissions: P,
    membership: M,
    options: EngineOptions,
}

impl<P, M> AccessEngine<P, M>
where
    P: PermissionMap,
    M: ProjectMembership,
{
    pub fn new(policy: PolicyTable, permissions: P, membership: M) -> Self {
        Self {
            policy,
            permissions,
            membership,
            options: EngineOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn policy(&self) -> &PolicyTable {
        &self.policy
    }

    #[must_use]
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    #[must_use]
    pub fn membership(&self) -> &M {
        &self.membership
    }

    /// Decide whether `caller` may perform `context` on `resource`, and for
    /// list reads, which candidates are visible.
    ///
    /// `Ok` carries both allow and deny; `Err` means no decision could be made.
    #[instrument(
        level = "debug",
        skip_all,
        fields(method = %context.method, endpoint = %context.endpoint, user = ?caller.user_id)
    )]
    pub fn decide_access<R: ResourceRecord>(
        &self,
        context: &RequestContext,
        caller: &CallerIdentity,
        resource_type: Option<ResourceType>,
        resource: ResourceInput<'_, R>,
    ) -> Result<AccessDecision> {
        if let Some(failure) = &caller.error {
            tracing::warn!(?failure, "evaluating as anonymous after identity failure");
        }

        let resource_type = classify(&context.endpoint, resource_type);
        let required_permission =
            self.permissions
                .required_permission(context, resource_type, caller)?;
        let access_tags = tags_for(resource_type, &context.method, resource);
        tracing::debug!(
            %resource_type,
            permission = %required_permission,
            tags = ?access_tags,
            "resolved access requirements"
        );

        let (allowed, visible) = if resource_type == ResourceType::Content
            && context.method.is_read()
        {
            let outcome =
                self.filter_tagged_content(resource.as_slice(), context, &required_permission, caller);
            (outcome.has_rights, Some(outcome.visible))
        } else if context.method.is_read() && context.endpoint.starts_with(AUTOGRAPHA_PREFIX) {
            if context.requesting_app() == Some(App::Autographa) {
                let outcome = self.filter_projects(
                    resource.as_slice(),
                    &access_tags,
                    &required_permission,
                    caller,
                    context,
                );
                (outcome.has_rights, Some(outcome.visible))
            } else {
                tracing::debug!(app = ?context.app, "project listing requested outside Autographa");
                (false, Some(Vec::new()))
            }
        } else {
            let granted = self.evaluate_rights(
                &access_tags,
                &required_permission,
                caller,
                resource_type,
                resource.primary(),
                context,
            )?;
            (granted, None)
        };

        if !allowed {
            tracing::info!(
                user = ?caller.user_id,
                method = %context.method,
                endpoint = %context.endpoint,
                permission = %required_permission,
                "access denied"
            );
        }

        Ok(AccessDecision {
            allowed,
            resource_type,
            required_permission,
            access_tags,
            visible,
        })
    }

    /// Like [`decide_access`](Self::decide_access), but a deny becomes
    /// [`AccessError::PermissionDenied`].
    pub fn authorize<R: ResourceRecord>(
        &self,
        context: &RequestContext,
        caller: &CallerIdentity,
        resource_type: Option<ResourceType>,
        resource: ResourceInput<'_, R>,
    ) -> Result<AccessDecision> {
        let decision = self.decide_access(context, caller, resource_type, resource)?;
        if decision.allowed {
            Ok(decision)
        } else {
            Err(AccessError::denied(format!(
                "{} on {} requires '{}'",
                context.method, context.endpoint, decision.required_permission
            )))
        }
    }
}
