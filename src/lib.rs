#![deny(clippy::all, clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![cfg_attr(test, allow(clippy::useless_vec, clippy::uninlined_format_args))]
#![allow(clippy::module_name_repetitions)]
//
// Documentation lints: every public error type is documented in `error`.
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
//
// Evaluation helpers thread the full request context through each step.
#![allow(clippy::too_many_arguments)]
//
// Pattern matching: These pedantic lints often suggest changes that reduce clarity.
#![allow(clippy::match_same_arms)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)] // Builder patterns don't need must_use on every method
#![allow(clippy::needless_pass_by_value)]

//! Access-control core for the Vachan content and translation API gateway.
//!
//! Resources carry access tags; a fixed [`PolicyTable`] maps each tag and
//! permission to the roles allowed to exercise it. The [`AccessEngine`]
//! combines that table with the caller's identity, a [`PermissionMap`] and a
//! [`ProjectMembership`] lookup to allow, deny, or filter each request, and
//! the [`RequestMediator`] places that decision around a route handler.

/// The vachan-access-core crate version (matches `Cargo.toml`).
pub const VACHAN_ACCESS_CORE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod constants;
pub mod engine;
pub mod error;
pub mod identity;
pub mod mediator;
pub mod permission;
pub mod policy;
pub mod store;
pub mod types;

pub use engine::{AccessEngine, classify, tags_for};
pub use error::{AccessError, PersistenceError, Result};
pub use identity::{IdentityResolver, WhoamiResolver, caller_from_whoami};
pub use mediator::{ContentScope, HandlerOutput, MediatedResponse, RequestMediator};
pub use permission::{PermissionMap, RoutePermissionMap, RouteRule};
pub use policy::{PermissionRules, PolicyTable, RoleRule};
pub use store::{InMemoryStore, ProjectMembership, ProjectRole, StoreEvent, UnitOfWork};
pub use types::{
    AccessDecision, App, CallerIdentity, EngineOptions, IdentityFailure, Method, ProjectId,
    ProjectUser, RequestContext, ResourceEntry, ResourceInput, ResourceRecord, ResourceType,
};
