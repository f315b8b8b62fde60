//! `wl projects delete` / `wl items delete`: confirmed optimistic delete.
//!
//! The entity leaves the list before the remote confirms. A rejected delete
//! puts it back and leaves the confirmation open.

use clap::Args;
use std::io::{IsTerminal, Write};

use worklist_core::error::ErrorCode;
use worklist_core::model::entity::EntityId;

use crate::cmd::{CmdContext, finish, load};
use crate::entities::CliEntity;
use crate::output::CliError;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Entity id.
    pub id: EntityId,

    /// Skip interactive confirmation prompt.
    #[arg(long)]
    pub force: bool,
}

fn confirm_delete(noun: &str, id: EntityId, name: &str) -> anyhow::Result<bool> {
    if !std::io::stdin().is_terminal() || !std::io::stdout().is_terminal() {
        return Ok(true);
    }

    eprint!("Delete {noun} {id} '{name}'? [y/N] ");
    std::io::stderr().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    let answer = input.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

pub async fn run_delete<E: CliEntity>(ctx: &CmdContext, args: &DeleteArgs) -> anyhow::Result<()> {
    let (controller, recorder) = ctx.controller::<E>();
    load(ctx, &controller, &recorder, None).await?;

    if !controller.request_delete(args.id) {
        return ctx.fail(&CliError::coded(
            ErrorCode::EntityNotFound,
            format!("{} {} not found", E::NOUN, args.id),
        ));
    }

    let name = controller
        .get(args.id)
        .map(|e| e.display_name().to_string())
        .unwrap_or_default();
    if !args.force && !confirm_delete(E::NOUN, args.id, &name)? {
        controller.cancel_delete();
        eprintln!("Cancelled.");
        return Ok(());
    }

    let outcome = controller.delete(args.id).await;
    finish::<E>(ctx, &controller, &recorder, outcome, None)
}
