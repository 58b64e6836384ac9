//! Identity-provider boundary.
//!
//! The engine only ever sees a resolved [`CallerIdentity`]. Resolution never
//! fails: a bad token or an upstream outage yields an anonymous caller carrying
//! an [`IdentityFailure`] marker, so public resources stay reachable while
//! everything else is denied.

use serde::Deserialize;
use serde_json::Value;

use crate::types::{CallerIdentity, IdentityFailure};

/// Resolves a bearer token into a caller.
pub trait IdentityResolver {
    fn resolve_caller(&self, token: Option<&str>) -> CallerIdentity;
}

impl<F> IdentityResolver for F
where
    F: Fn(Option<&str>) -> CallerIdentity,
{
    fn resolve_caller(&self, token: Option<&str>) -> CallerIdentity {
        self(token)
    }
}

#[derive(Debug, Deserialize)]
struct WhoamiSession {
    identity: WhoamiIdentity,
}

#[derive(Debug, Deserialize)]
struct WhoamiIdentity {
    id: String,
    #[serde(default)]
    traits: WhoamiTraits,
}

#[derive(Debug, Default, Deserialize)]
struct WhoamiTraits {
    #[serde(default)]
    userrole: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct WhoamiError {
    #[serde(default)]
    error: Value,
}

/// Map a `sessions/whoami` response onto a caller.
#[must_use]
pub fn caller_from_whoami(status: u16, body: &str) -> CallerIdentity {
    match status {
        200 => match serde_json::from_str::<WhoamiSession>(body) {
            Ok(session) => CallerIdentity::authenticated(
                session.identity.id,
                session.identity.traits.userrole,
            ),
            Err(err) => {
                tracing::warn!(error = %err, "unparsable session payload from identity provider");
                CallerIdentity::anonymous(Some(IdentityFailure::Upstream(err.to_string())))
            }
        },
        401 => {
            let detail = error_detail(body);
            tracing::debug!(%detail, "session rejected by identity provider");
            CallerIdentity::anonymous(Some(IdentityFailure::Unauthorized(detail)))
        }
        other => {
            let detail = error_detail(body);
            tracing::warn!(status = other, %detail, "identity provider failure");
            CallerIdentity::anonymous(Some(IdentityFailure::Upstream(detail)))
        }
    }
}

fn error_detail(body: &str) -> String {
    match serde_json::from_str::<WhoamiError>(body) {
        Ok(WhoamiError {
            error: Value::Null,
        })
        | Err(_) => body.trim().to_string(),
        Ok(WhoamiError { error }) => error.to_string(),
    }
}

/// Resolver backed by a caller-supplied whoami transport.
///
/// `fetch` receives the token and returns `(status, body)`; a transport error
/// is treated as an upstream failure.
pub struct WhoamiResolver<F> {
    fetch: F,
}

impl<F> WhoamiResolver<F>
where
    F: Fn(&str) -> Result<(u16, String), String>,
{
    pub fn new(fetch: F) -> Self {
        Self { fetch }
    }
}

impl<F> IdentityResolver for WhoamiResolver<F>
where
    F: Fn(&str) -> Result<(u16, String), String>,
{
    fn resolve_caller(&self, token: Option<&str>) -> CallerIdentity {
        let Some(token) = token.filter(|token| !token.trim().is_empty()) else {
            return CallerIdentity::anonymous(Some(IdentityFailure::Unauthorized(
                "no session token".to_string(),
            )));
        };
        match (self.fetch)(token) {
            Ok((status, body)) => caller_from_whoami(status, &body),
            Err(reason) => {
                tracing::warn!(%reason, "identity provider unreachable");
                CallerIdentity::anonymous(Some(IdentityFailure::Upstream(reason)))
            }
        }
    }
}
