//! Request pipeline around a route handler.
//!
//! The mediator decides where the access check sits relative to the handler:
//! before it for identity and generic-translation routes, after it everywhere
//! else, since most checks need the record the handler loaded or built. On
//! writes, nothing is committed until the check passes.

use tracing::instrument;

use crate::constants::{TRANSLATION_PREFIX, USER_PREFIX};
use crate::engine::AccessEngine;
use crate::error::AccessError;
use crate::permission::PermissionMap;
use crate::store::{ProjectMembership, UnitOfWork};
use crate::types::{
    AccessDecision, App, CallerIdentity, Method, RequestContext, ResourceInput, ResourceRecord,
    ResourceType,
};

/// Parent kind of a [`HandlerOutput::Scoped`] response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentScope {
    /// Content rows under a source (bible books, commentary entries, ...).
    Source,
    /// Draft or settings data under a translation project.
    Project,
}

/// What a route handler produced.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerOutput<R, C> {
    Record(R),
    Records(Vec<R>),
    /// Content whose access is governed by `parent`.
    Scoped {
        scope: ContentScope,
        parent: R,
        content: C,
    },
}

/// Response after access control.
#[derive(Debug, Clone, PartialEq)]
pub enum MediatedResponse<R, C> {
    Record(R),
    Records(Vec<R>),
    Content(C),
    /// The request was allowed but the governing parent is not visible to the caller.
    Hidden,
}

impl<R, C> MediatedResponse<R, C> {
    fn unchecked(output: HandlerOutput<R, C>) -> Self {
        match output {
            HandlerOutput::Record(record) => Self::Record(record),
            HandlerOutput::Records(records) => Self::Records(records),
            HandlerOutput::Scoped { content, .. } => Self::Content(content),
        }
    }
}

/// Runs handlers under an [`AccessEngine`].
#[derive(Debug)]
pub struct RequestMediator<'e, P, M> {
    engine: &'e AccessEngine<P, M>,
}

impl<P, M> Clone for RequestMediator<'_, P, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P, M> Copy for RequestMediator<'_, P, M> {}

impl<'e, P, M> RequestMediator<'e, P, M>
where
    P: PermissionMap,
    M: ProjectMembership,
{
    pub fn new(engine: &'e AccessEngine<P, M>) -> Self {
        Self { engine }
    }

    /// Run `handler` with access control applied.
    ///
    /// Handler errors pass through untouched; access failures are converted
    /// into `E`.
    #[instrument(
        level = "debug",
        skip_all,
        fields(method = %context.method, endpoint = %context.endpoint)
    )]
    pub fn mediate<R, C, U, E, H>(
        &self,
        context: &RequestContext,
        caller: &CallerIdentity,
        resource_type: Option<ResourceType>,
        unit_of_work: &mut U,
        handler: H,
    ) -> Result<MediatedResponse<R, C>, E>
    where
        R: ResourceRecord,
        U: UnitOfWork<R>,
        E: From<AccessError>,
        H: FnOnce() -> Result<HandlerOutput<R, C>, E>,
    {
        if checks_before_handler(&context.endpoint) {
            self.engine
                .authorize::<R>(context, caller, resource_type, ResourceInput::None)?;
            return Ok(MediatedResponse::unchecked(handler()?));
        }

        let output = handler()?;
        if matches!(&output, HandlerOutput::Records(records) if records.is_empty()) {
            return Ok(MediatedResponse::Records(Vec::new()));
        }

        if context.method.is_read() {
            self.filter_read(context, caller, resource_type, output)
                .map_err(E::from)
        } else {
            self.guard_write(context, caller, resource_type, unit_of_work, output)
                .map_err(E::from)
        }
    }

    fn filter_read<R, C>(
        &self,
        context: &RequestContext,
        caller: &CallerIdentity,
        resource_type: Option<ResourceType>,
        output: HandlerOutput<R, C>,
    ) -> crate::Result<MediatedResponse<R, C>>
    where
        R: ResourceRecord,
    {
        match output {
            HandlerOutput::Records(records) => {
                let decision = self.engine.authorize(
                    context,
                    caller,
                    resource_type,
                    ResourceInput::Collection(&records),
                )?;
                Ok(MediatedResponse::Records(decision.retain_visible(records)))
            }
            HandlerOutput::Record(record) => {
                let decision = self.engine.authorize(
                    context,
                    caller,
                    resource_type,
                    ResourceInput::Single(&record),
                )?;
                Ok(if first_is_visible(&decision) {
                    MediatedResponse::Record(record)
                } else {
                    MediatedResponse::Hidden
                })
            }
            HandlerOutput::Scoped {
                parent, content, ..
            } => {
                let decision = self.engine.authorize(
                    context,
                    caller,
                    resource_type,
                    ResourceInput::Collection(std::slice::from_ref(&parent)),
                )?;
                if first_is_visible(&decision) {
                    Ok(MediatedResponse::Content(content))
                } else {
                    tracing::debug!("parent hidden from caller, withholding content");
                    Ok(MediatedResponse::Hidden)
                }
            }
        }
    }

    fn guard_write<R, C, U>(
        &self,
        context: &RequestContext,
        caller: &CallerIdentity,
        resource_type: Option<ResourceType>,
        unit_of_work: &mut U,
        output: HandlerOutput<R, C>,
    ) -> crate::Result<MediatedResponse<R, C>>
    where
        R: ResourceRecord,
        U: UnitOfWork<R>,
    {
        let user_id = caller.user_id();
        match output {
            HandlerOutput::Record(mut record) => {
                stamp_record(&mut record, &context.method, user_id);
                self.engine
                    .authorize(context, caller, resource_type, ResourceInput::Single(&record))?;
                unit_of_work.commit()?;
                unit_of_work.refresh(&mut record)?;
                Ok(MediatedResponse::Record(record))
            }
            HandlerOutput::Records(mut records) => {
                for record in &mut records {
                    stamp_record(record, &context.method, user_id);
                }
                for record in &records {
                    self.engine
                        .authorize(context, caller, resource_type, ResourceInput::Single(record))?;
                }
                unit_of_work.commit()?;
                for record in &mut records {
                    unit_of_work.refresh(record)?;
                }
                Ok(MediatedResponse::Records(records))
            }
            HandlerOutput::Scoped {
                scope,
                mut parent,
                content,
            } => {
                parent.stamp_updated_user(user_id);
                if scope == ContentScope::Project
                    && context.method == Method::Put
                    && context.requesting_app() != Some(App::Autographa)
                {
                    return Err(AccessError::denied(format!(
                        "project content on {} can only be edited from Autographa",
                        context.endpoint
                    )));
                }
                self.engine
                    .authorize(context, caller, resource_type, ResourceInput::Single(&parent))?;
                unit_of_work.commit()?;
                unit_of_work.refresh(&mut parent)?;
                Ok(MediatedResponse::Content(content))
            }
        }
    }
}

fn checks_before_handler(endpoint: &str) -> bool {
    endpoint.starts_with(USER_PREFIX) || endpoint.starts_with(TRANSLATION_PREFIX)
}

fn first_is_visible(decision: &AccessDecision) -> bool {
    decision
        .visible
        .as_ref()
        .is_none_or(|visible| visible.first() == Some(&0))
}

fn stamp_record<R: ResourceRecord>(record: &mut R, method: &Method, user_id: Option<&str>) {
    match method {
        Method::Post => record.stamp_created_user(user_id),
        Method::Put | Method::Patch => record.stamp_updated_user(user_id),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::engine;
    use crate::store::{InMemoryStore, StoreEvent};
    use crate::types::ResourceEntry;

    type Output = HandlerOutput<ResourceEntry, Vec<String>>;

    #[test]
    fn user_routes_deny_before_handler_runs() {
        let engine = engine(InMemoryStore::new());
        let mediator = RequestMediator::new(&engine);
        let mut uow = InMemoryStore::new();
        let ctx = RequestContext::new("PUT", "/v2/user/userrole");
        let caller = CallerIdentity::authenticated("U1", ["VachanUser"]);
        let result = mediator.mediate(&ctx, &caller, None, &mut uow, || -> Result<Output, AccessError> {
            panic!("handler must not run on a denied pre-check")
        });
        assert!(result.unwrap_err().is_denial());
        assert!(uow.journal().is_empty());
    }

    #[test]
    fn empty_listing_skips_the_check() {
        let engine = engine(InMemoryStore::new());
        let mediator = RequestMediator::new(&engine);
        let mut uow = InMemoryStore::new();
        let ctx = RequestContext::new("GET", "/v2/commentaries/en_BBC_1_commentary");
        let response = mediator
            .mediate(&ctx, &CallerIdentity::anonymous(None), None, &mut uow, || {
                Ok::<Output, AccessError>(HandlerOutput::Records(Vec::new()))
            })
            .unwrap();
        assert_eq!(response, MediatedResponse::Records(Vec::new()));
    }

    #[test]
    fn post_stamps_creator_before_commit() {
        let engine = engine(InMemoryStore::new());
        let mediator = RequestMediator::new(&engine);
        let mut uow = InMemoryStore::new();
        let ctx = RequestContext::new("POST", "/v2/sources");
        let caller = CallerIdentity::authenticated("U3", ["VachanAdmin"]);
        let response = mediator
            .mediate(&ctx, &caller, None, &mut uow, || {
                Ok::<Output, AccessError>(HandlerOutput::Record(ResourceEntry::content(
                    "hi_IRV_1_bible",
                    ["content"],
                )))
            })
            .unwrap();
        let MediatedResponse::Record(record) = response else {
            panic!("expected a record");
        };
        assert_eq!(record.created_user.as_deref(), Some("U3"));
        assert_eq!(uow.journal(), vec![StoreEvent::Commit, StoreEvent::Refresh]);
    }

    #[test]
    fn project_content_put_outside_autographa_is_denied() {
        let engine = engine(InMemoryStore::new());
        let mediator = RequestMediator::new(&engine);
        let mut uow = InMemoryStore::new();
        let ctx = RequestContext::new("PUT", "/v2/autographa/project/draft").with_app("VachanAdmin");
        let caller = CallerIdentity::authenticated("U1", ["SuperAdmin"]);
        let err = mediator
            .mediate(&ctx, &caller, None, &mut uow, || {
                Ok::<Output, AccessError>(HandlerOutput::Scoped {
                    scope: ContentScope::Project,
                    parent: ResourceEntry::project(9, Vec::new()),
                    content: vec!["GEN 1:1".to_string()],
                })
            })
            .unwrap_err();
        assert!(err.is_denial());
        assert_eq!(uow.commits(), 0);
    }
}
