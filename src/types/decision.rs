//! Outcome of a single access decision.

use serde::{Deserialize, Serialize};

use super::resource::ResourceType;

/// Result of [`AccessEngine::decide_access`](crate::AccessEngine::decide_access).
///
/// `visible` is populated only by the two list-filtering regimes and holds
/// indices into the candidate collection that was evaluated. `None` means the
/// caller-supplied resource is the answer unpruned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDecision {
    pub allowed: bool,
    pub resource_type: ResourceType,
    pub required_permission: String,
    pub access_tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<Vec<usize>>,
}

impl AccessDecision {
    /// Number of visible candidates, if a filter ran.
    #[must_use]
    pub fn visible_count(&self) -> Option<usize> {
        self.visible.as_ref().map(Vec::len)
    }

    /// Keep only the visible candidates, preserving order. Unfiltered decisions
    /// return the input untouched.
    #[must_use]
    pub fn retain_visible<T>(&self, items: Vec<T>) -> Vec<T> {
        let Some(visible) = &self.visible else {
            return items;
        };
        let mut cursor = visible.iter().copied().peekable();
        items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| {
                if cursor.peek() == Some(&index) {
                    cursor.next();
                    Some(item)
                } else {
                    None
                }
            })
            .collect()
    }
}
