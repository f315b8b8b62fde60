//! Multi-field filter predicate.
//!
//! Every criterion is independent and AND-combined. An unset criterion
//! (`None`, the empty string, or the literal `all`) always matches, so the
//! default [`FilterSpec`] matches every entity.

use serde::{Deserialize, Serialize};

use crate::model::entity::ListEntity;

/// Filter criteria applied to an entity list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    /// Case-insensitive substring of the display name.
    pub text: String,
    /// Exact status label.
    pub status: Option<String>,
    /// Exact priority label.
    pub priority: Option<String>,
    /// Exact due-date string. Not a range or day-boundary compare.
    pub due_date: Option<String>,
}

fn criterion(value: Option<&String>) -> Option<&str> {
    value
        .map(String::as_str)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

impl FilterSpec {
    /// Returns true if no criteria are active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
            && criterion(self.status.as_ref()).is_none()
            && criterion(self.priority.as_ref()).is_none()
            && criterion(self.due_date.as_ref()).is_none()
    }

    /// Returns true if the entity satisfies every active criterion.
    pub fn matches<E: ListEntity>(&self, entity: &E) -> bool {
        if !self.text.is_empty()
            && !entity
                .display_name()
                .to_lowercase()
                .contains(&self.text.to_lowercase())
        {
            return false;
        }
        if let Some(status) = criterion(self.status.as_ref()) {
            if entity.status_label() != status {
                return false;
            }
        }
        if let Some(priority) = criterion(self.priority.as_ref()) {
            if entity.priority_label() != priority {
                return false;
            }
        }
        if let Some(due) = criterion(self.due_date.as_ref()) {
            if entity.due_date() != Some(due) {
                return false;
            }
        }
        true
    }

    /// Entities that match, in their original order.
    pub fn apply<E: ListEntity>(&self, items: &[E]) -> Vec<E> {
        items
            .iter()
            .filter(|item| self.matches(*item))
            .cloned()
            .collect()
    }
}
