//! Resource classification and access-tag derivation.

use crate::constants::{
    METACONTENT_SEGMENTS, PROJECT_PREFIX, TRANSLATION_PREFIX, USER_PREFIX, tags,
};
use crate::types::request::trim_endpoint;
use crate::types::{Method, ResourceInput, ResourceRecord, ResourceType};

/// Resource type for `endpoint`; an explicit type always wins.
#[must_use]
pub fn classify(endpoint: &str, explicit: Option<ResourceType>) -> ResourceType {
    if let Some(resource_type) = explicit {
        return resource_type;
    }
    let last_segment = trim_endpoint(endpoint).rsplit('/').next().unwrap_or_default();
    if METACONTENT_SEGMENTS.contains(&last_segment) {
        ResourceType::Metacontent
    } else if endpoint.starts_with(PROJECT_PREFIX) {
        ResourceType::Project
    } else if endpoint.starts_with(USER_PREFIX) {
        ResourceType::User
    } else if endpoint.starts_with(TRANSLATION_PREFIX) {
        ResourceType::Translation
    } else {
        ResourceType::Content
    }
}

/// Access tags that apply to `resource` under `resource_type`.
///
/// Non-content types carry fixed tags. Content writes use the single record's
/// tags verbatim; content reads take the first-seen union across every
/// candidate so per-item filtering can narrow it later. A content request with
/// no records yields no tags and therefore no grants.
#[must_use]
pub fn tags_for<R: ResourceRecord>(
    resource_type: ResourceType,
    method: &Method,
    resource: ResourceInput<'_, R>,
) -> Vec<String> {
    match resource_type {
        ResourceType::Metacontent => vec![
            tags::META_CONTENT.to_string(),
            tags::OPEN_ACCESS.to_string(),
        ],
        ResourceType::Project => vec![tags::TRANSLATION_PROJECT.to_string()],
        ResourceType::User => vec![tags::USER.to_string()],
        ResourceType::Translation => vec![tags::GENERIC_TRANSLATION.to_string()],
        ResourceType::Content => match resource {
            ResourceInput::Single(record) if !method.is_read() => {
                record.access_permissions().to_vec()
            }
            other => union_of_tags(other.as_slice()),
        },
    }
}

fn union_of_tags<R: ResourceRecord>(records: &[R]) -> Vec<String> {
    let mut union: Vec<String> = Vec::new();
    for record in records {
        for tag in record.access_permissions() {
            if !union.contains(tag) {
                union.push(tag.clone());
            }
        }
    }
    union
}
