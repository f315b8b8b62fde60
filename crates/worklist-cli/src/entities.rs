//! How the CLI renders entities and turns flags into patches.

use chrono::NaiveDate;
use std::io::{self, Write};
use std::str::FromStr;

use worklist_core::error::ErrorCode;
use worklist_core::model::ParseEnumError;
use worklist_core::model::entity::ListEntity;
use worklist_core::model::project::{Project, ProjectPatch};
use worklist_core::model::work_item::{WorkItem, WorkItemPatch};

use crate::cmd::edit::EditArgs;
use crate::cmd::set::SetArgs;
use crate::file_remote::Stored;
use crate::output::{CliError, Renderable, pretty_kv};

/// An entity shape the CLI can list and mutate.
pub trait CliEntity: Stored + Renderable {
    /// Noun used in messages and prompts.
    const NOUN: &'static str;

    /// Patch for `set`: status, priority, and due date.
    fn set_patch(args: &SetArgs) -> Result<Self::Patch, CliError>;

    /// Patch for `edit`: name, due date, and meeting link.
    fn edit_patch(args: &EditArgs) -> Result<Self::Patch, CliError>;
}

/// Parse an enum flag strictly.
pub fn parse_label<T>(raw: Option<&str>) -> Result<Option<T>, CliError>
where
    T: FromStr<Err = ParseEnumError>,
{
    raw.map(|value| {
        value
            .parse::<T>()
            .map_err(|e| CliError::coded(ErrorCode::InvalidEnumValue, e.to_string()))
    })
    .transpose()
}

/// Validate a `YYYY-MM-DD` due date and return it in canonical form.
pub fn parse_due(raw: Option<&str>) -> Result<Option<String>, CliError> {
    raw.map(|value| {
        NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .map(|date| date.format("%Y-%m-%d").to_string())
            .map_err(|_| {
                CliError::coded(ErrorCode::InvalidDate, format!("invalid due date '{value}'"))
            })
    })
    .transpose()
}

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

fn write_json<T: serde::Serialize>(w: &mut dyn Write, value: &T) -> io::Result<()> {
    serde_json::to_writer(&mut *w, value).map_err(io::Error::other)?;
    writeln!(w)
}

fn write_common<E: ListEntity>(w: &mut dyn Write, entity: &E) -> io::Result<()> {
    writeln!(w, "#{} {}", entity.id(), entity.display_name())?;
    pretty_kv(w, "status", entity.status_label())?;
    pretty_kv(w, "priority", entity.priority_label())?;
    pretty_kv(w, "due", or_dash(entity.due_date()))
}

impl Renderable for Project {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        write_common(w, self)?;
        if !self.team_members.is_empty() {
            pretty_kv(w, "team", self.members_label())?;
        }
        if let Some(link) = &self.meeting_link {
            pretty_kv(w, "meeting", link)?;
        }
        writeln!(w)
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        write_json(w, self)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{}  {}  {}  {}  {}",
            self.id,
            self.status,
            self.priority,
            or_dash(self.due_date.as_deref()),
            self.name
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["id", "status", "priority", "due", "name"]
    }
}

impl Renderable for WorkItem {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        write_common(w, self)?;
        if let Some(project) = &self.project {
            pretty_kv(w, "project", format!("#{} {}", project.id, project.name))?;
        }
        if !self.assigned_to.is_empty() {
            pretty_kv(w, "assigned", self.members_label())?;
        }
        writeln!(w)
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        write_json(w, self)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        let project = self
            .project_id()
            .map_or_else(|| "-".to_string(), |id| id.to_string());
        writeln!(
            w,
            "{}  {}  {}  {}  {}  {}",
            self.id,
            self.status,
            self.priority,
            or_dash(self.due_date.as_deref()),
            project,
            self.title
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["id", "status", "priority", "due", "project", "title"]
    }
}

impl CliEntity for Project {
    const NOUN: &'static str = "project";

    fn set_patch(args: &SetArgs) -> Result<ProjectPatch, CliError> {
        Ok(ProjectPatch {
            status: parse_label(args.status.as_deref())?,
            priority: parse_label(args.priority.as_deref())?,
            due_date: parse_due(args.due.as_deref())?,
            ..ProjectPatch::default()
        })
    }

    fn edit_patch(args: &EditArgs) -> Result<ProjectPatch, CliError> {
        Ok(ProjectPatch {
            name: args.name.clone(),
            due_date: parse_due(args.due.as_deref())?,
            meeting_link: args.meeting_link.clone(),
            ..ProjectPatch::default()
        })
    }
}

impl CliEntity for WorkItem {
    const NOUN: &'static str = "work item";

    fn set_patch(args: &SetArgs) -> Result<WorkItemPatch, CliError> {
        Ok(WorkItemPatch {
            status: parse_label(args.status.as_deref())?,
            priority: parse_label(args.priority.as_deref())?,
            due_date: parse_due(args.due.as_deref())?,
            ..WorkItemPatch::default()
        })
    }

    fn edit_patch(args: &EditArgs) -> Result<WorkItemPatch, CliError> {
        if args.meeting_link.is_some() {
            return Err(CliError {
                suggestion: Some("Set the meeting link on the owning project.".to_string()),
                ..CliError::new("work items have no meeting link")
            });
        }
        Ok(WorkItemPatch {
            title: args.name.clone(),
            due_date: parse_due(args.due.as_deref())?,
            ..WorkItemPatch::default()
        })
    }
}
