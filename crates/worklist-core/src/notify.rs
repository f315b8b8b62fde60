//! User-visible outcome notifications.
//!
//! The controller reports every load and mutation outcome as a [`Notice`].
//! How a notice is shown (toast, status bar, log line) is the
//! [`Notifier`]'s business.

use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::ErrorCode;
use crate::model::entity::{EntityId, EntityKind, FieldChange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Load,
    Update,
    Delete,
    Create,
    Edit,
}

impl Operation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Create => "create",
            Self::Edit => "edit",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Notice {
    Loaded {
        kind: EntityKind,
        count: usize,
    },
    Updated {
        kind: EntityKind,
        id: EntityId,
        name: String,
        changes: Vec<FieldChange>,
    },
    Deleted {
        kind: EntityKind,
        id: EntityId,
        name: String,
    },
    Created {
        kind: EntityKind,
        id: EntityId,
        name: String,
    },
    Edited {
        kind: EntityKind,
        id: EntityId,
        name: String,
        changes: Vec<FieldChange>,
    },
    Failed {
        kind: EntityKind,
        operation: Operation,
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<EntityId>,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        code: ErrorCode,
        message: String,
    },
}

impl Notice {
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Entity id the notice is about, if any.
    #[must_use]
    pub const fn id(&self) -> Option<EntityId> {
        match self {
            Self::Loaded { .. } => None,
            Self::Updated { id, .. }
            | Self::Deleted { id, .. }
            | Self::Created { id, .. }
            | Self::Edited { id, .. } => Some(*id),
            Self::Failed { id, .. } => *id,
        }
    }
}

fn describe(changes: &[FieldChange]) -> String {
    changes
        .iter()
        .map(|c| {
            format!(
                "{} from {} to {}",
                c.field,
                c.old.as_deref().unwrap_or("(none)"),
                c.new.as_deref().unwrap_or("(none)")
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loaded { kind, count } => write!(f, "Loaded {count} {kind} record(s)"),
            Self::Updated {
                kind,
                name,
                changes,
                ..
            } => write!(f, "Updated {kind} \"{name}\": {}", describe(changes)),
            Self::Edited {
                kind,
                name,
                changes,
                ..
            } => write!(f, "Saved {kind} \"{name}\": {}", describe(changes)),
            Self::Deleted { kind, name, .. } => write!(f, "Deleted {kind} \"{name}\""),
            Self::Created { kind, name, .. } => write!(f, "Created {kind} \"{name}\""),
            Self::Failed {
                kind,
                operation,
                name,
                code,
                message,
                ..
            } => match name {
                Some(name) => write!(f, "Failed to {operation} {kind} \"{name}\" [{code}]: {message}"),
                None => write!(f, "Failed to {operation} {kind} [{code}]: {message}"),
            },
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, notice: Notice) {
        (**self).notify(notice);
    }
}

/// Fan-out: every notice goes to both notifiers.
impl<A: Notifier, B: Notifier> Notifier for (A, B) {
    fn notify(&self, notice: Notice) {
        self.0.notify(notice.clone());
        self.1.notify(notice);
    }
}

/// Emits every notice as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        if notice.is_failure() {
            tracing::warn!(id = notice.id(), "{notice}");
        } else {
            tracing::info!(id = notice.id(), "{notice}");
        }
    }
}

/// Collects notices in memory, for callers that render them later.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn last(&self) -> Option<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    /// Drain everything recorded so far.
    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn updated_notice_names_entity_field_and_values() {
        let notice = Notice::Updated {
            kind: EntityKind::Project,
            id: 1,
            name: "Apollo".to_string(),
            changes: vec![FieldChange {
                field: "status",
                old: Some("active".to_string()),
                new: Some("completed".to_string()),
            }],
        };
        assert_eq!(
            notice.to_string(),
            "Updated project \"Apollo\": status from active to completed"
        );
        assert_eq!(notice.id(), Some(1));
    }

    #[test]
    fn failed_notice_carries_code() {
        let notice = Notice::Failed {
            kind: EntityKind::WorkItem,
            operation: Operation::Delete,
            id: Some(5),
            name: Some("Write docs".to_string()),
            code: ErrorCode::RemoteUnavailable,
            message: "transport failure: reset".to_string(),
        };
        assert!(notice.is_failure());
        assert_eq!(
            notice.to_string(),
            "Failed to delete work_item \"Write docs\" [E4001]: transport failure: reset"
        );
        let json = serde_json::to_value(&notice).unwrap();
        assert_eq!(json["event"], "failed");
        assert_eq!(json["code"], "E4001");
        assert_eq!(json["operation"], "delete");
    }

    #[test]
    fn recording_notifier_collects_and_drains() {
        let recorder = Arc::new(RecordingNotifier::new());
        recorder.notify(Notice::Loaded {
            kind: EntityKind::Project,
            count: 2,
        });
        assert_eq!(recorder.notices().len(), 1);
        assert!(recorder.last().is_some());
        assert_eq!(recorder.take().len(), 1);
        assert!(recorder.notices().is_empty());
    }

    #[test]
    fn pair_notifies_both() {
        let first = Arc::new(RecordingNotifier::new());
        let second = Arc::new(RecordingNotifier::new());
        let pair = (Arc::clone(&first), Arc::clone(&second));
        pair.notify(Notice::Loaded {
            kind: EntityKind::WorkItem,
            count: 0,
        });
        assert_eq!(first.notices(), second.notices());
        assert_eq!(first.notices().len(), 1);
    }
}
