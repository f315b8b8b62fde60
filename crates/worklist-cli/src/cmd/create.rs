//! `wl projects create` / `wl items create`.
//!
//! The created entity appears in the list only once the remote has assigned
//! it an id.

use clap::Args;

use worklist_core::controller::MutationOutcome;
use worklist_core::model::entity::EntityId;
use worklist_core::model::project::{Project, ProjectDraft};
use worklist_core::model::work_item::{ProjectRef, WorkItem, WorkItemDraft};

use crate::cmd::{CmdContext, finish, load};
use crate::entities::{CliEntity, parse_due, parse_label};
use crate::output::CliError;

#[derive(Args, Debug)]
pub struct ProjectCreateArgs {
    /// Project name.
    #[arg(long)]
    pub name: String,

    /// Initial status (default: active).
    #[arg(long, short = 's')]
    pub status: Option<String>,

    /// Initial priority (default: medium).
    #[arg(long, short = 'p')]
    pub priority: Option<String>,

    /// Due date (YYYY-MM-DD).
    #[arg(long)]
    pub due: Option<String>,

    /// Meeting link.
    #[arg(long)]
    pub meeting_link: Option<String>,
}

impl ProjectCreateArgs {
    fn draft(&self) -> Result<ProjectDraft, CliError> {
        Ok(ProjectDraft {
            status: parse_label(self.status.as_deref())?.unwrap_or_default(),
            priority: parse_label(self.priority.as_deref())?.unwrap_or_default(),
            due_date: parse_due(self.due.as_deref())?,
            meeting_link: self.meeting_link.clone(),
            ..ProjectDraft::named(self.name.trim())
        })
    }
}

#[derive(Args, Debug)]
pub struct ItemCreateArgs {
    /// Work item title.
    #[arg(long)]
    pub title: String,

    /// Owning project id.
    #[arg(long)]
    pub project: EntityId,

    /// Initial status (default: pending).
    #[arg(long, short = 's')]
    pub status: Option<String>,

    /// Initial priority (default: medium).
    #[arg(long, short = 'p')]
    pub priority: Option<String>,

    /// Due date (YYYY-MM-DD).
    #[arg(long)]
    pub due: Option<String>,
}

impl ItemCreateArgs {
    fn draft(&self) -> Result<WorkItemDraft, CliError> {
        Ok(WorkItemDraft {
            status: parse_label(self.status.as_deref())?.unwrap_or_default(),
            priority: parse_label(self.priority.as_deref())?.unwrap_or_default(),
            due_date: parse_due(self.due.as_deref())?,
            // The remote fills in the project name.
            project: Some(ProjectRef {
                id: self.project,
                name: String::new(),
            }),
            ..WorkItemDraft::titled(self.title.trim())
        })
    }
}

async fn run_create<E: CliEntity>(
    ctx: &CmdContext,
    draft: Result<E::Draft, CliError>,
    container: Option<EntityId>,
) -> anyhow::Result<()> {
    let draft = match draft {
        Ok(draft) => draft,
        Err(e) => return ctx.fail(&e),
    };

    let (controller, recorder) = ctx.controller::<E>();
    load(ctx, &controller, &recorder, container).await?;

    let created = controller.create(draft).await;
    let outcome = if created.is_some() {
        MutationOutcome::Committed
    } else {
        MutationOutcome::Failed
    };
    finish(ctx, &controller, &recorder, outcome, created)
}

pub async fn run_project_create(ctx: &CmdContext, args: &ProjectCreateArgs) -> anyhow::Result<()> {
    run_create::<Project>(ctx, args.draft(), None).await
}

pub async fn run_item_create(ctx: &CmdContext, args: &ItemCreateArgs) -> anyhow::Result<()> {
    run_create::<WorkItem>(ctx, args.draft(), Some(args.project)).await
}
