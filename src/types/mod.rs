//! Public types exposed by the `vachan-access-core` crate.

pub mod caller;
pub mod decision;
pub mod options;
pub mod request;
pub mod resource;

pub use caller::{CallerIdentity, IdentityFailure};
pub use decision::AccessDecision;
pub use options::EngineOptions;
pub use request::{App, Method, RequestContext};
pub use resource::{
    ProjectId, ProjectUser, ResourceEntry, ResourceInput, ResourceRecord, ResourceType,
};
