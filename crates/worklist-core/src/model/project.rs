use serde::{Deserialize, Serialize};

use super::entity::{EntityId, EntityKind, EntityPatch, ListEntity};
use super::{Priority, User, join_usernames, label_enum};
use crate::sort::{RankTable, RankTables, SortField};

label_enum! {
    /// Project lifecycle status.
    ProjectStatus, "project status", default = Active {
        Active => "active",
        Completed => "completed",
        OnHold => "on_hold",
    }
}

/// A user's seat on a project team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub user: User,
    #[serde(default)]
    pub role: String,
}

impl TeamMember {
    pub fn new(user: User, role: impl Into<String>) -> Self {
        Self {
            user,
            role: role.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default)]
    pub team_members: Vec<TeamMember>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_link: Option<String>,
}

impl Project {
    /// A project with the given name and default status/priority.
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            status: ProjectStatus::default(),
            priority: Priority::default(),
            due_date: None,
            team_members: Vec::new(),
            meeting_link: None,
        }
    }
}

/// Partial project fields. Absent fields are never serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_members: Option<Vec<TeamMember>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_link: Option<String>,
}

impl ProjectPatch {
    #[must_use]
    pub fn status(status: ProjectStatus) -> Self {
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

impl EntityPatch for ProjectPatch {
    fn fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.name.is_some() {
            fields.push("name");
        }
        if self.status.is_some() {
            fields.push("status");
        }
        if self.priority.is_some() {
            fields.push("priority");
        }
        if self.due_date.is_some() {
            fields.push("due_date");
        }
        if self.team_members.is_some() {
            fields.push("team_members");
        }
        if self.meeting_link.is_some() {
            fields.push("meeting_link");
        }
        fields
    }
}

/// Create payload for a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectDraft {
    pub name: String,
    pub status: ProjectStatus,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub team_members: Vec<TeamMember>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_link: Option<String>,
}

impl ProjectDraft {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl ListEntity for Project {
    type Patch = ProjectPatch;
    type Draft = ProjectDraft;

    const KIND: EntityKind = EntityKind::Project;
    const SORTABLE: &'static [SortField] = &[
        SortField::Name,
        SortField::Status,
        SortField::Priority,
        SortField::DueDate,
        SortField::Members,
        SortField::MeetingLink,
    ];

    fn id(&self) -> EntityId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
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
        join_usernames(self.team_members.iter().map(|m| &m.user))
    }

    fn meeting_link(&self) -> Option<&str> {
        self.meeting_link.as_deref()
    }

    fn field_label(&self, field: &str) -> Option<String> {
        match field {
            "name" => Some(self.name.clone()),
            "status" => Some(self.status.to_string()),
            "priority" => Some(self.priority.to_string()),
            "due_date" => self.due_date.clone(),
            "team_members" => Some(self.members_label()),
            "meeting_link" => self.meeting_link.clone(),
            _ => None,
        }
    }

    fn apply(&mut self, patch: &ProjectPatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
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
        if let Some(members) = &patch.team_members {
            self.team_members.clone_from(members);
        }
        if let Some(link) = &patch.meeting_link {
            self.meeting_link = Some(link.clone());
        }
    }

    fn from_draft(id: EntityId, draft: &ProjectDraft) -> Self {
        Self {
            id,
            name: draft.name.clone(),
            status: draft.status.clone(),
            priority: draft.priority.clone(),
            due_date: draft.due_date.clone(),
            team_members: draft.team_members.clone(),
            meeting_link: draft.meeting_link.clone(),
        }
    }

    fn default_ranks() -> RankTables {
        RankTables {
            status_natural: RankTable::new(["active", "on_hold", "completed"]),
            status_custom: RankTable::new(["on_hold", "active", "completed"]),
            ..RankTables::priority_defaults()
        }
    }
}
