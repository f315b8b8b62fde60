use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::sort::{RankTables, SortField};

/// Server-assigned entity identifier. Unique and immutable.
pub type EntityId = i64;

/// Which screen an entity shape belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Project,
    WorkItem,
}

impl EntityKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::WorkItem => "work_item",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One changed field, rendered for user-facing notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldChange {
    pub field: &'static str,
    pub old: Option<String>,
    pub new: Option<String>,
}

/// Typed partial fields of an entity.
///
/// `None` means "not present": the field is neither sent nor, on a remote
/// response, allowed to overwrite what the store already knows.
pub trait EntityPatch:
    Clone + fmt::Debug + Default + PartialEq + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Names of the fields present in this patch, in declaration order.
    fn fields(&self) -> Vec<&'static str>;

    fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }
}

/// An entity with a status enum, a priority enum, a due date, and a display
/// name. The filter, sort, store, and controller layers are generic over it.
pub trait ListEntity:
    Clone + fmt::Debug + PartialEq + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Partial-field update payload (also the shape of update responses).
    type Patch: EntityPatch;
    /// Create payload; the server assigns the id.
    type Draft: Clone + fmt::Debug + Send + Sync + Serialize + DeserializeOwned + 'static;

    const KIND: EntityKind;
    /// Sort fields this screen offers. Toggles on anything else are no-ops.
    const SORTABLE: &'static [SortField];

    fn id(&self) -> EntityId;
    fn display_name(&self) -> &str;
    fn status_label(&self) -> &str;
    fn priority_label(&self) -> &str;
    fn due_date(&self) -> Option<&str>;
    /// Team-member or assignee names joined for display and sorting.
    fn members_label(&self) -> String;

    fn meeting_link(&self) -> Option<&str> {
        None
    }

    /// Display value of a named field, `None` when unset or unknown.
    fn field_label(&self, field: &str) -> Option<String>;

    /// Shallow merge: every field present in `patch` overwrites, every
    /// absent field is left untouched.
    fn apply(&mut self, patch: &Self::Patch);

    /// Materialize a draft under a server-assigned id.
    fn from_draft(id: EntityId, draft: &Self::Draft) -> Self;

    /// Rank tables used when no configuration overrides them.
    fn default_ranks() -> RankTables;

    /// Render the changes `patch` makes against `self` (the pre-change value)
    /// and `after` (the merged value).
    fn describe_changes(&self, after: &Self, patch: &Self::Patch) -> Vec<FieldChange> {
        patch
            .fields()
            .into_iter()
            .map(|field| FieldChange {
                field,
                old: self.field_label(field),
                new: after.field_label(field),
            })
            .collect()
    }
}
