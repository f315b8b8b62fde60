//! `wl projects list` / `wl items list`: filtered, multi-key sorted listing.

use clap::Args;
use std::io::{self, Write};
use tracing::warn;

use worklist_core::filter::FilterSpec;
use worklist_core::model::entity::EntityId;
use worklist_core::sort::SortKeys;

use crate::cmd::{CmdContext, load};
use crate::entities::CliEntity;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_list_to};

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Case-insensitive substring of the name.
    #[arg(long, short = 't')]
    pub text: Option<String>,

    /// Exact status label (`all` matches everything).
    #[arg(long, short = 's')]
    pub status: Option<String>,

    /// Exact priority label (`all` matches everything).
    #[arg(long, short = 'p')]
    pub priority: Option<String>,

    /// Exact due date (YYYY-MM-DD).
    #[arg(long)]
    pub due: Option<String>,

    /// Toggle a sort field. Repeat to add keys or advance a field's
    /// direction: binary fields cycle asc, desc, off; status and priority
    /// cycle asc, desc, custom, off.
    #[arg(long = "sort", value_name = "FIELD")]
    pub sort: Vec<String>,
}

impl ListArgs {
    fn filter(&self) -> FilterSpec {
        FilterSpec {
            text: self.text.clone().unwrap_or_default(),
            status: self.status.clone(),
            priority: self.priority.clone(),
            due_date: self.due.clone(),
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct ItemListArgs {
    #[command(flatten)]
    pub list: ListArgs,

    /// Only list work items of this project.
    #[arg(long)]
    pub project: Option<EntityId>,
}

/// Apply the `--sort` toggles in order. Names that are unknown or not
/// sortable for `E` leave the keys untouched.
fn sort_keys<E: CliEntity>(names: &[String]) -> SortKeys {
    let mut keys = SortKeys::new();
    for name in names {
        if !keys.toggle_named::<E>(name) {
            warn!(
                field = %name,
                noun = E::NOUN,
                sortable = %sortable_names::<E>(),
                "not a sortable field; ignoring"
            );
        }
    }
    keys
}

fn sortable_names<E: CliEntity>() -> String {
    E::SORTABLE
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub async fn run_list<E: CliEntity>(
    ctx: &CmdContext,
    args: &ListArgs,
    container: Option<EntityId>,
) -> anyhow::Result<()> {
    let keys = sort_keys::<E>(&args.sort);
    let (controller, recorder) = ctx.controller::<E>();
    load(ctx, &controller, &recorder, container).await?;

    let rows = controller.view(&args.filter(), &keys);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if ctx.output == OutputMode::Pretty {
        pretty_section(&mut out, &format!("{}s ({})", E::NOUN, rows.len()))?;
        if !keys.is_empty() {
            pretty_kv(&mut out, "sort", keys.to_string())?;
            writeln!(out)?;
        }
    }
    render_list_to(&rows, ctx.output, &mut out)?;
    Ok(())
}
