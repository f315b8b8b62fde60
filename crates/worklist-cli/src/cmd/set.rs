//! `wl projects set` / `wl items set`: optimistic field update.
//!
//! The new value is applied locally before the remote confirms it. If the
//! remote rejects the change, the list is rolled back and the command fails.

use clap::Args;

use worklist_core::error::ErrorCode;
use worklist_core::model::entity::{EntityId, EntityPatch};

use crate::cmd::{CmdContext, finish, load};
use crate::entities::CliEntity;
use crate::output::CliError;

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Entity id.
    pub id: EntityId,

    /// New status label.
    #[arg(long, short = 's')]
    pub status: Option<String>,

    /// New priority label (high, medium, low).
    #[arg(long, short = 'p')]
    pub priority: Option<String>,

    /// New due date (YYYY-MM-DD).
    #[arg(long)]
    pub due: Option<String>,
}

pub async fn run_set<E: CliEntity>(ctx: &CmdContext, args: &SetArgs) -> anyhow::Result<()> {
    let patch = match E::set_patch(args) {
        Ok(patch) if patch.is_empty() => {
            return ctx.fail(&CliError::coded(ErrorCode::EmptyPatch, "nothing to set"));
        }
        Ok(patch) => patch,
        Err(e) => return ctx.fail(&e),
    };

    let (controller, recorder) = ctx.controller::<E>();
    load(ctx, &controller, &recorder, None).await?;

    let outcome = controller.update_field(args.id, patch).await;
    let entity = controller.get(args.id);
    finish(ctx, &controller, &recorder, outcome, entity)
}
