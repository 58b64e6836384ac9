//! Tunable engine options, deserializable from gateway configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{SOURCE_CONTENT_KINDS, SOURCES_LISTING_ENDPOINT, roles};

fn default_sources_listing_endpoint() -> String {
    SOURCES_LISTING_ENDPOINT.to_string()
}

fn default_source_content_kinds() -> Vec<String> {
    SOURCE_CONTENT_KINDS.iter().map(|kind| (*kind).to_string()).collect()
}

fn default_legacy_registered_roles() -> Vec<String> {
    vec![roles::API_USER.to_string()]
}

/// Knobs for the decision engine. Defaults match the deployed gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Listing endpoint where an empty visible set is still an allowed request.
    #[serde(default = "default_sources_listing_endpoint")]
    pub sources_listing_endpoint: String,
    /// Resource segments whose POST falls back to the created-user check on a literal role match.
    #[serde(default = "default_source_content_kinds")]
    pub source_content_kinds: Vec<String>,
    /// Roles rewritten to `registeredUser` before content filtering.
    #[serde(default = "default_legacy_registered_roles")]
    pub legacy_registered_roles: Vec<String>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            sources_listing_endpoint: default_sources_listing_endpoint(),
            source_content_kinds: default_source_content_kinds(),
            legacy_registered_roles: default_legacy_registered_roles(),
        }
    }
}

impl EngineOptions {
    #[must_use]
    pub fn builder() -> EngineOptionsBuilder {
        EngineOptionsBuilder::default()
    }

    pub(crate) fn is_source_content_kind(&self, segment: &str) -> bool {
        self.source_content_kinds.iter().any(|kind| kind == segment)
    }
}

#[derive(Debug, Clone, Default)]
pub struct EngineOptionsBuilder {
    inner: EngineOptions,
}

impl EngineOptionsBuilder {
    pub fn sources_listing_endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.inner.sources_listing_endpoint = endpoint.into();
        self
    }

    pub fn source_content_kind<S: Into<String>>(mut self, kind: S) -> Self {
        self.inner.source_content_kinds.push(kind.into());
        self
    }

    pub fn legacy_registered_role<S: Into<String>>(mut self, role: S) -> Self {
        self.inner.legacy_registered_roles.push(role.into());
        self
    }

    #[must_use]
    pub fn build(self) -> EngineOptions {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let options: EngineOptions =
            serde_json::from_str(r#"{"source_content_kinds":["bibles"]}"#).unwrap();
        assert_eq!(options.sources_listing_endpoint, "/v2/sources");
        assert!(options.is_source_content_kind("bibles"));
        assert!(!options.is_source_content_kind("commentaries"));
        assert_eq!(options.legacy_registered_roles, vec!["APIUser".to_string()]);
    }

    #[test]
    fn builder_extends_defaults() {
        let options = EngineOptions::builder().source_content_kind("audiobibles").build();
        assert!(options.is_source_content_kind("audiobibles"));
        assert!(options.is_source_content_kind("biblevideos"));
    }
}
