use serde::{Deserialize, Serialize};

use super::entity::{EntityId, EntityKind, EntityPatch, ListEntity};
use super::{Priority, User, join_usernames, label_enum};
use crate::sort::{RankTable, RankTables, SortField};

label_enum! {
    /// Work-item lifecycle status.
    WorkItemStatus, "work item status", default = Pending {
        Pending => "pending",
        InProgress => "in_progress",
        Completed => "completed",
    }
}

/// The owning project as embedded in a work-item payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: EntityId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: WorkItemStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default)]
    pub assigned_to: Vec<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectRef>,
}

impl WorkItem {
    pub fn new(id: EntityId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            status: WorkItemStatus::default(),
            priority: Priority::default(),
            due_date: None,
            assigned_to: Vec::new(),
            project: None,
        }
    }

    /// Id of the owning project, the container work items are fetched by.
    #[must_use]
    pub fn project_id(&self) -> Option<EntityId> {
        self.project.as_ref().map(|p| p.id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<WorkItemStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Vec<User>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectRef>,
}

impl WorkItemPatch {
    #[must_use]
    pub fn status(status: WorkItemStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn priority(priority: Priority) -> Self {
        Self {
            priority: Some(priority),
            ..Self::default()
        }
    }
}

impl EntityPatch for WorkItemPatch {
    fn fields(&self) -> Vec<&'static str> {
        [
            ("title", self.title.is_some()),
            ("status", self.status.is_some()),
            ("priority", self.priority.is_some()),
            ("due_date", self.due_date.is_some()),
            ("assigned_to", self.assigned_to.is_some()),
            ("project", self.project.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkItemDraft {
    pub title: String,
    pub status: WorkItemStatus,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub assigned_to: Vec<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectRef>,
}

impl WorkItemDraft {
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

impl ListEntity for WorkItem {
    type Patch = WorkItemPatch;
    type Draft = WorkItemDraft;

    const KIND: EntityKind = EntityKind::WorkItem;
    const SORTABLE: &'static [SortField] = &[
        SortField::Name,
        SortField::Status,
        SortField::Priority,
        SortField::DueDate,
        SortField::Members,
    ];

    fn id(&self) -> EntityId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.title
    }

    fn status_label(&self) -> &str {
        self.status.as_str()
    }

    fn priority_label(&self) -> &str {
        self.priority.as_str()
    }

    fn due_date(&self) -> Option<&str> {
        self.due_date.as_deref()
    }

    fn members_label(&self) -> String {
        join_usernames(self.assigned_to.iter())
    }

    fn field_label(&self, field: &str) -> Option<String> {
        match field {
            "title" => Some(self.title.clone()),
            "status" => Some(self.status.to_string()),
            "priority" => Some(self.priority.to_string()),
            "due_date" => self.due_date.clone(),
            "assigned_to" => Some(self.members_label()),
            "project" => self.project.as_ref().map(|p| p.name.clone()),
            _ => None,
        }
    }

    fn apply(&mut self, patch: &WorkItemPatch) {
        if let Some(title) = &patch.title {
            self.title.clone_from(title);
        }
        if let Some(status) = &patch.status {
            self.status = status.clone();
        }
        if let Some(priority) = &patch.priority {
            self.priority = priority.clone();
        }
        if let Some(due_date) = &patch.due_date {
            self.due_date = Some(due_date.clone());
        }
        if let Some(assigned) = &patch.assigned_to {
            self.assigned_to.clone_from(assigned);
        }
        if let Some(project) = &patch.project {
            self.project = Some(project.clone());
        }
    }

    fn from_draft(id: EntityId, draft: &WorkItemDraft) -> Self {
        Self {
            id,
            title: draft.title.clone(),
            status: draft.status.clone(),
            priority: draft.priority.clone(),
            due_date: draft.due_date.clone(),
            assigned_to: draft.assigned_to.clone(),
            project: draft.project.clone(),
        }
    }

    fn default_ranks() -> RankTables {
        RankTables {
            status_natural: RankTable::new(["pending", "in_progress", "completed"]),
            status_custom: RankTable::new(["in_progress", "pending", "completed"]),
            ..RankTables::priority_defaults()
        }
    }
}
