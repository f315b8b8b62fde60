//! `wl projects edit` / `wl items edit`: save edited fields.
//!
//! Unlike `set`, nothing changes locally until the remote accepts the edit.

use clap::Args;

use worklist_core::error::ErrorCode;
use worklist_core::model::entity::{EntityId, EntityPatch};

use crate::cmd::{CmdContext, finish, load};
use crate::entities::CliEntity;
use crate::output::CliError;

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Entity id.
    pub id: EntityId,

    /// New display name.
    #[arg(long, alias = "title")]
    pub name: Option<String>,

    /// New due date (YYYY-MM-DD).
    #[arg(long)]
    pub due: Option<String>,

    /// New meeting link (projects only).
    #[arg(long)]
    pub meeting_link: Option<String>,
}

pub async fn run_edit<E: CliEntity>(ctx: &CmdContext, args: &EditArgs) -> anyhow::Result<()> {
    let patch = match E::edit_patch(args) {
        Ok(patch) if patch.is_empty() => {
            return ctx.fail(&CliError::coded(ErrorCode::EmptyPatch, "nothing to edit"));
        }
        Ok(patch) => patch,
        Err(e) => return ctx.fail(&e),
    };

    let (controller, recorder) = ctx.controller::<E>();
    load(ctx, &controller, &recorder, None).await?;

    let outcome = controller.edit(args.id, patch).await;
    let entity = controller.get(args.id);
    finish(ctx, &controller, &recorder, outcome, entity)
}
