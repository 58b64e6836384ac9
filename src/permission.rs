//! Endpoint → required-permission resolution.
//!
//! The engine treats the map as a collaborator: exactly one permission per
//! call, deterministic in its inputs. [`RoutePermissionMap`] is the table-driven
//! implementation the gateway ships with; any closure with the right shape
//! works too.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{SOURCE_CONTENT_KINDS, permissions as perm};
use crate::error::{AccessError, Result};
use crate::types::request::trim_endpoint;
use crate::types::{App, CallerIdentity, Method, RequestContext, ResourceType};

/// Resolves the permission keyword a request requires.
pub trait PermissionMap {
    fn required_permission(
        &self,
        context: &RequestContext,
        resource_type: ResourceType,
        caller: &CallerIdentity,
    ) -> Result<String>;
}

impl<F> PermissionMap for F
where
    F: Fn(&RequestContext, ResourceType, &CallerIdentity) -> Result<String>,
{
    fn required_permission(
        &self,
        context: &RequestContext,
        resource_type: ResourceType,
        caller: &CallerIdentity,
    ) -> Result<String> {
        self(context, resource_type, caller)
    }
}

/// One row of the route table.
///
/// `path` is matched segment by segment: `{name}` matches any single segment
/// and a trailing `*` matches whatever remains, including nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRule {
    pub method: Method,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<ResourceType>,
    pub permission: String,
}

impl RouteRule {
    pub fn new(method: Method, path: impl Into<String>, permission: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            app: None,
            authenticated: None,
            resource_type: None,
            permission: permission.into(),
        }
    }

    #[must_use]
    pub fn for_app(mut self, app: App) -> Self {
        self.app = Some(app.as_str().to_string());
        self
    }

    #[must_use]
    pub fn when_authenticated(mut self, authenticated: bool) -> Self {
        self.authenticated = Some(authenticated);
        self
    }

    #[must_use]
    pub fn for_resource_type(mut self, resource_type: ResourceType) -> Self {
        self.resource_type = Some(resource_type);
        self
    }

    fn matches(
        &self,
        context: &RequestContext,
        resource_type: ResourceType,
        caller: &CallerIdentity,
    ) -> bool {
        self.method == context.method
            && self
                .app
                .as_ref()
                .is_none_or(|app| context.app.as_ref() == Some(app))
            && self
                .authenticated
                .is_none_or(|required| caller.is_authenticated() == required)
            && self
                .resource_type
                .is_none_or(|expected| expected == resource_type)
            && path_matches(&self.path, &context.endpoint)
    }
}

fn path_matches(template: &str, endpoint: &str) -> bool {
    let mut expected = trim_endpoint(template).split('/');
    let mut actual = trim_endpoint(endpoint).split('/');
    loop {
        match (expected.next(), actual.next()) {
            (Some("*"), _) => return expected.next().is_none(),
            (Some(pattern), Some(segment)) => {
                let is_placeholder = pattern.starts_with('{') && pattern.ends_with('}');
                if is_placeholder {
                    if segment.is_empty() {
                        return false;
                    }
                } else if pattern != segment {
                    return false;
                }
            }
            (None, None) => return true,
            _ => return false,
        }
    }
}

/// Ordered route table; the first matching rule decides the permission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePermissionMap {
    routes: Vec<RouteRule>,
}

impl RoutePermissionMap {
    #[must_use]
    pub fn new(routes: Vec<RouteRule>) -> Self {
        Self { routes }
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_json_reader(BufReader::new(file))
    }

    pub fn push(&mut self, rule: RouteRule) {
        self.routes.push(rule);
    }

    #[must_use]
    pub fn routes(&self) -> &[RouteRule] {
        &self.routes
    }

    /// Route table for the gateway's endpoint families.
    #[must_use]
    pub fn builtin() -> Self {
        let mut routes = Vec::new();

        for collection in ["contents", "languages", "licenses", "versions"] {
            let path = format!("/v2/{collection}");
            routes.push(
                RouteRule::new(Method::Get, path.clone(), perm::VIEW_ON_WEB)
                    .for_app(App::VachanOnline),
            );
            routes.push(RouteRule::new(Method::Get, path.clone(), perm::READ_VIA_API));
            routes.push(RouteRule::new(Method::Post, path.clone(), perm::CREATE));
            routes.push(RouteRule::new(Method::Put, path, perm::EDIT));
        }

        routes.push(
            RouteRule::new(Method::Get, "/v2/sources", perm::READ_VIA_VACHANADMIN)
                .for_app(App::VachanAdmin),
        );
        routes.push(
            RouteRule::new(Method::Get, "/v2/sources", perm::VIEW_ON_WEB).for_app(App::VachanOnline),
        );
        routes.push(
            RouteRule::new(Method::Get, "/v2/sources", perm::REFER_FOR_TRANSLATION)
                .for_app(App::Autographa),
        );
        routes.push(RouteRule::new(Method::Get, "/v2/sources", perm::READ_VIA_API));
        routes.push(RouteRule::new(Method::Post, "/v2/sources", perm::CREATE));
        routes.push(RouteRule::new(Method::Put, "/v2/sources", perm::EDIT));

        for kind in SOURCE_CONTENT_KINDS {
            let path = format!("/v2/{kind}/*");
            routes.push(
                RouteRule::new(Method::Get, path.clone(), perm::VIEW_ON_WEB)
                    .for_app(App::VachanOnline),
            );
            routes.push(
                RouteRule::new(Method::Get, path.clone(), perm::READ_VIA_VACHANADMIN)
                    .for_app(App::VachanAdmin),
            );
            routes.push(RouteRule::new(Method::Get, path.clone(), perm::READ_VIA_API));
            routes.push(RouteRule::new(Method::Post, path.clone(), perm::CREATE));
            routes.push(RouteRule::new(Method::Put, path.clone(), perm::EDIT));
            routes.push(RouteRule::new(Method::Delete, path, perm::EDIT));
        }

        routes.extend([
            RouteRule::new(Method::Get, "/v2/autographa/projects", perm::VIEW_PROJECT),
            RouteRule::new(Method::Post, "/v2/autographa/projects", perm::CREATE),
            RouteRule::new(Method::Put, "/v2/autographa/projects", perm::EDIT_SETTINGS),
            RouteRule::new(Method::Post, "/v2/autographa/project/user", perm::CREATE_USER),
            RouteRule::new(Method::Put, "/v2/autographa/project/user", perm::CREATE_USER),
            RouteRule::new(Method::Get, "/v2/autographa/project/settings", perm::READ_SETTINGS),
            RouteRule::new(Method::Get, "/v2/autographa/project/*", perm::READ_DRAFT),
            RouteRule::new(Method::Put, "/v2/autographa/project/*", perm::EDIT_DRAFT),
            RouteRule::new(Method::Post, "/v2/autographa/project/*", perm::EDIT_DRAFT),
        ]);

        routes.extend([
            RouteRule::new(Method::Post, "/v2/user/register", perm::CREATE),
            RouteRule::new(Method::Post, "/v2/user/login", perm::LOGIN),
            RouteRule::new(Method::Get, "/v2/user/login", perm::LOGIN),
            RouteRule::new(Method::Post, "/v2/user/logout", perm::LOGOUT),
            RouteRule::new(Method::Get, "/v2/user/logout", perm::LOGOUT),
            RouteRule::new(Method::Put, "/v2/user/userrole", perm::EDIT_ROLE),
            RouteRule::new(Method::Delete, "/v2/user/delete-identity", perm::DELETE_OR_DEACTIVATE),
            RouteRule::new(Method::Get, "/v2/user/*", perm::VIEW_PROFILE),
            RouteRule::new(Method::Put, "/v2/user/*", perm::EDIT_DATA),
            RouteRule::new(Method::Delete, "/v2/user/*", perm::DELETE_OR_DEACTIVATE),
        ]);

        routes.extend([
            RouteRule::new(Method::Get, "/v2/translation/*", perm::READ),
            RouteRule::new(Method::Post, "/v2/translation/*", perm::PROCESS),
            RouteRule::new(Method::Put, "/v2/translation/*", perm::PROCESS),
        ]);

        Self { routes }
    }
}

impl PermissionMap for RoutePermissionMap {
    fn required_permission(
        &self,
        context: &RequestContext,
        resource_type: ResourceType,
        caller: &CallerIdentity,
    ) -> Result<String> {
        self.routes
            .iter()
            .find(|rule| rule.matches(context, resource_type, caller))
            .map(|rule| rule.permission.clone())
            .ok_or_else(|| AccessError::UnmappedEndpoint {
                method: context.method.to_string(),
                endpoint: context.endpoint.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn permission(map: &RoutePermissionMap, context: &RequestContext) -> Result<String> {
        map.required_permission(context, ResourceType::Content, &CallerIdentity::default())
    }

    #[test]
    fn placeholders_and_wildcards_match_segments() {
        assert!(path_matches("/v2/bibles/*", "/v2/bibles/en_KJV_1_bible/books"));
        assert!(path_matches("/v2/bibles/*", "/v2/bibles"));
        assert!(path_matches("/v2/user/{id}", "/v2/user/U1"));
        assert!(!path_matches("/v2/user/{id}", "/v2/user/U1/roles"));
        assert!(!path_matches("/v2/sources", "/v2/sources/extra"));
        assert!(path_matches("/v2/sources", "/v2/sources/"));
    }

    #[test]
    fn app_specific_rule_wins_over_generic() {
        let map = RoutePermissionMap::builtin();
        let admin = RequestContext::new("GET", "/v2/sources").with_app("VachanAdmin");
        assert_eq!(permission(&map, &admin).unwrap(), perm::READ_VIA_VACHANADMIN);
        let api = RequestContext::new("GET", "/v2/sources");
        assert_eq!(permission(&map, &api).unwrap(), perm::READ_VIA_API);
    }

    #[test]
    fn source_content_post_requires_create() {
        let map = RoutePermissionMap::builtin();
        let ctx = RequestContext::new("POST", "/v2/bibles/en_KJV_1_bible/books");
        assert_eq!(permission(&map, &ctx).unwrap(), perm::CREATE);
    }

    #[test]
    fn unmapped_route_is_an_internal_error() {
        let map = RoutePermissionMap::builtin();
        let err = permission(&map, &RequestContext::new("PATCH", "/v2/nowhere")).unwrap_err();
        assert!(matches!(err, AccessError::UnmappedEndpoint { .. }));
        assert!(!err.is_denial());
    }

    #[test]
    fn authenticated_flag_selects_rule() {
        let map = RoutePermissionMap::new(vec![
            RouteRule::new(Method::Get, "/v2/x", "edit").when_authenticated(true),
            RouteRule::new(Method::Get, "/v2/x", "read-via-api"),
        ]);
        let ctx = RequestContext::new("GET", "/v2/x");
        let anonymous = CallerIdentity::anonymous(None);
        let registered = CallerIdentity::authenticated("U1", ["VachanUser"]);
        assert_eq!(
            map.required_permission(&ctx, ResourceType::Content, &anonymous).unwrap(),
            "read-via-api"
        );
        assert_eq!(
            map.required_permission(&ctx, ResourceType::Content, &registered).unwrap(),
            "edit"
        );
    }
}
