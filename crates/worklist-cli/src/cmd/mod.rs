//! Command handlers. Each one builds a controller over the data file, loads
//! the collection it needs, runs one controller operation, and renders the
//! outcome.

pub mod create;
pub mod delete;
pub mod edit;
pub mod list;
pub mod set;

use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use worklist_core::config::ListConfig;
use worklist_core::controller::{EntityController, MutationOutcome};
use worklist_core::error::ErrorCode;
use worklist_core::model::entity::EntityId;
use worklist_core::notify::{Notice, RecordingNotifier, TracingNotifier};

use crate::entities::CliEntity;
use crate::file_remote::FileRemote;
use crate::output::{CliError, OutputMode, Reported, render, render_error, write_notice};

pub type CliNotifier = (Arc<RecordingNotifier>, TracingNotifier);
pub type CliController<E> = EntityController<E, FileRemote, CliNotifier>;

/// Everything a command handler needs from the global flags and config.
#[derive(Debug)]
pub struct CmdContext {
    pub data: PathBuf,
    pub output: OutputMode,
    pub config: ListConfig,
}

impl CmdContext {
    /// A controller for `E` over the data file, plus the recorder that
    /// collects its notices.
    pub fn controller<E: CliEntity>(&self) -> (CliController<E>, Arc<RecordingNotifier>) {
        let recorder = Arc::new(RecordingNotifier::new());
        let remote = FileRemote::new(&self.data).with_failures_from_env();
        let controller = EntityController::with_settings(
            remote,
            (Arc::clone(&recorder), TracingNotifier),
            self.config.settings_for::<E>(),
        );
        (controller, recorder)
    }

    /// Render `error` and turn it into the command's failure. The returned
    /// error is a [`Reported`] marker so `main` does not print it again.
    pub fn fail(&self, error: &CliError) -> anyhow::Result<()> {
        render_error(self.output, error)?;
        Err(Reported.into())
    }
}

/// Load the collection, failing the command if the fetch fails.
pub async fn load<E: CliEntity>(
    ctx: &CmdContext,
    controller: &CliController<E>,
    recorder: &RecordingNotifier,
    container: Option<EntityId>,
) -> anyhow::Result<()> {
    if controller.load(container).await.is_some() {
        recorder.take();
        return Ok(());
    }
    let error = controller.last_error().map_or_else(
        || CliError::coded(ErrorCode::InternalUnexpected, "load failed"),
        |e| CliError::from(&e),
    );
    ctx.fail(&error)
}

/// JSON output for every mutating command.
#[derive(Debug, Serialize)]
pub struct MutationReport<E> {
    pub outcome: MutationOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<E>,
    /// Set when a failed delete left its confirmation open.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_delete: Option<EntityId>,
    pub notices: Vec<Notice>,
}

/// Render the notices a mutation produced, then fail the command unless the
/// mutation committed.
pub fn finish<E: CliEntity>(
    ctx: &CmdContext,
    controller: &CliController<E>,
    recorder: &RecordingNotifier,
    outcome: MutationOutcome,
    entity: Option<E>,
) -> anyhow::Result<()> {
    let report = MutationReport {
        outcome,
        entity,
        pending_delete: controller.pending_delete(),
        notices: recorder.take(),
    };
    render(ctx.output, &report, |r, w| {
        for notice in r.notices.iter().filter(|n| !n.is_failure()) {
            write_notice(w, notice)?;
        }
        if let Some(id) = r.pending_delete {
            writeln!(w, "delete of {} {id} is still pending", E::NOUN)?;
        }
        Ok(())
    })?;

    if outcome.is_committed() {
        return Ok(());
    }
    let error = controller.last_error().map_or_else(
        || CliError::coded(ErrorCode::InternalUnexpected, "mutation failed"),
        |e| CliError::from(&e),
    );
    ctx.fail(&error)
}
