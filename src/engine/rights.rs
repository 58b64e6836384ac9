//! Single-subject rights evaluation.

use crate::constants::{permissions, roles};
use crate::error::Result;
use crate::permission::PermissionMap;
use crate::policy::RoleRule;
use crate::store::{ProjectMembership, ProjectRole};
use crate::types::{CallerIdentity, Method, RequestContext, ResourceRecord, ResourceType};

use super::AccessEngine;

impl<P, M> AccessEngine<P, M>
where
    P: PermissionMap,
    M: ProjectMembership,
{
    /// Walk the tags in order and grant on the first allowed role that the
    /// caller satisfies.
    pub(super) fn evaluate_rights<R: ResourceRecord>(
        &self,
        access_tags: &[String],
        required_permission: &str,
        caller: &CallerIdentity,
        resource_type: ResourceType,
        resource: Option<&R>,
        context: &RequestContext,
    ) -> Result<bool> {
        for tag in access_tags {
            if !self.policy.contains_tag(tag) {
                tracing::warn!(%tag, "resource carries a tag the policy does not define");
                continue;
            }
            for rule in self.policy.allowed_roles(tag, required_permission) {
                let granted = match self.literal_role_outcome(rule, caller, resource, context) {
                    Some(outcome) => outcome,
                    None => self.role_grants(
                        rule,
                        required_permission,
                        caller,
                        resource_type,
                        resource,
                        context,
                    )?,
                };
                if granted {
                    tracing::debug!(%tag, role = rule.name(), "access granted");
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Whether `rule` is satisfied on its own merits, without the literal
    /// role-name match.
    fn role_grants<R: ResourceRecord>(
        &self,
        rule: &RoleRule,
        required_permission: &str,
        caller: &CallerIdentity,
        resource_type: ResourceType,
        resource: Option<&R>,
        context: &RequestContext,
    ) -> Result<bool> {
        let granted = match rule {
            RoleRule::NoAuthRequired => true,
            RoleRule::RegisteredUser => caller.is_authenticated(),
            RoleRule::ResourceCreatedUser => created_by_caller(caller, resource),
            RoleRule::CreatedUser => {
                targets_caller(caller, required_permission, resource, context)
            }
            RoleRule::ProjectOwner => {
                self.project_role_check(ProjectRole::Owner, caller, resource_type, resource)?
            }
            RoleRule::ProjectMember => {
                self.project_role_check(ProjectRole::Member, caller, resource_type, resource)?
            }
            RoleRule::Named(_) => false,
        };
        Ok(granted)
    }

    /// Outcome forced by the caller holding the rule's role by name.
    ///
    /// A non-SuperAdmin POST onto a primary content source must also come from
    /// the record's creator.
    fn literal_role_outcome<R: ResourceRecord>(
        &self,
        rule: &RoleRule,
        caller: &CallerIdentity,
        resource: Option<&R>,
        context: &RequestContext,
    ) -> Option<bool> {
        let role = rule.name();
        if !caller.has_role(role) {
            return None;
        }
        let posts_source_content = role != roles::SUPER_ADMIN
            && context.method == Method::Post
            && context
                .resource_segment()
                .is_some_and(|segment| self.options.is_source_content_kind(segment));
        if posts_source_content {
            Some(created_by_caller(caller, resource))
        } else {
            Some(true)
        }
    }

    fn project_role_check<R: ResourceRecord>(
        &self,
        role: ProjectRole,
        caller: &CallerIdentity,
        resource_type: ResourceType,
        resource: Option<&R>,
    ) -> Result<bool> {
        if resource_type != ResourceType::Project {
            return Ok(false);
        }
        let (Some(user_id), Some(project_id)) =
            (caller.user_id(), resource.and_then(R::project_id))
        else {
            return Ok(false);
        };
        self.membership
            .has_project_role(project_id, user_id, role)
            .map_err(|err| {
                tracing::error!(project_id, %role, error = %err, "project membership lookup failed");
                err.into()
            })
    }
}

fn created_by_caller<R: ResourceRecord>(caller: &CallerIdentity, resource: Option<&R>) -> bool {
    match (caller.user_id(), resource.and_then(R::created_user)) {
        (Some(user_id), Some(created_user)) => user_id == created_user,
        _ => false,
    }
}

// The subject user is the record's creator, else the `user_id` path
// parameter. Self-service permissions target the caller. With no subject
// the rule grants nothing.
fn targets_caller<R: ResourceRecord>(
    caller: &CallerIdentity,
    required_permission: &str,
    resource: Option<&R>,
    context: &RequestContext,
) -> bool {
    let Some(user_id) = caller.user_id() else {
        return false;
    };
    if permissions::SELF_SERVICE.contains(&required_permission) {
        return true;
    }
    resource
        .and_then(R::created_user)
        .or_else(|| context.path_params.get("user_id").map(String::as_str))
        .is_some_and(|target| target == user_id)
}
