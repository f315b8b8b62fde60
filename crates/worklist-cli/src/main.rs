#![forbid(unsafe_code)]

mod cmd;
mod entities;
mod file_remote;
mod output;

use clap::{Parser, Subcommand};
use output::{CliError, OutputMode, Reported};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use worklist_core::config::{self, ListConfig};
use worklist_core::error::ErrorCode;
use worklist_core::model::project::Project;
use worklist_core::model::work_item::WorkItem;

use cmd::CmdContext;
use cmd::create::{ItemCreateArgs, ProjectCreateArgs};
use cmd::delete::DeleteArgs;
use cmd::edit::EditArgs;
use cmd::list::{ItemListArgs, ListArgs};
use cmd::set::SetArgs;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "wl: project and work-item lists with optimistic updates",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging (ignored when `WORKLIST_LOG` is set).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format (pretty, text, json).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Data file the lists are read from and written to.
    #[arg(long, global = true, default_value = "worklist.json")]
    data: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Manage projects",
        after_help = "EXAMPLES:\n    # Projects sorted by status, then priority descending\n    wl projects list --sort status --sort priority --sort priority\n\n    # Move a project to on_hold\n    wl projects set 3 --status on_hold"
    )]
    Projects {
        #[command(subcommand)]
        command: ProjectCommand,
    },

    #[command(
        alias = "work-items",
        about = "Manage work items",
        after_help = "EXAMPLES:\n    # Work items of project 3\n    wl items list --project 3\n\n    # Start a work item\n    wl items set 12 --status in_progress"
    )]
    Items {
        #[command(subcommand)]
        command: ItemCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ProjectCommand {
    /// List projects with optional filters and sort order.
    List(ListArgs),
    /// Change status, priority, or due date (applied optimistically).
    Set(SetArgs),
    /// Save edited fields.
    Edit(EditArgs),
    /// Delete a project.
    Delete(DeleteArgs),
    /// Create a project.
    Create(ProjectCreateArgs),
}

#[derive(Subcommand, Debug)]
enum ItemCommand {
    /// List work items with optional filters and sort order.
    List(ItemListArgs),
    /// Change status, priority, or due date (applied optimistically).
    Set(SetArgs),
    /// Save edited fields.
    Edit(EditArgs),
    /// Delete a work item.
    Delete(DeleteArgs),
    /// Create a work item under a project.
    Create(ItemCreateArgs),
}

/// Default filter when `WORKLIST_LOG` is unset.
fn default_log_filter(verbose: bool) -> &'static str {
    if verbose || env::var("DEBUG").is_ok() {
        "worklist=debug,info"
    } else {
        "warn"
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("WORKLIST_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_log_filter(verbose)));

    let format = env::var("WORKLIST_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn load_config(output: OutputMode) -> anyhow::Result<ListConfig> {
    let root = env::current_dir()?;
    match config::load_list_config(&root) {
        Ok(config) => Ok(config),
        Err(err) => {
            let code = if err.downcast_ref::<toml::de::Error>().is_some() {
                ErrorCode::ConfigParseError
            } else {
                ErrorCode::InternalUnexpected
            };
            output::render_error(output, &CliError::coded(code, format!("{err:#}")))?;
            Err(Reported.into())
        }
    }
}

async fn dispatch(ctx: &CmdContext, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Projects { command } => match command {
            ProjectCommand::List(args) => cmd::list::run_list::<Project>(ctx, &args, None).await,
            ProjectCommand::Set(args) => cmd::set::run_set::<Project>(ctx, &args).await,
            ProjectCommand::Edit(args) => cmd::edit::run_edit::<Project>(ctx, &args).await,
            ProjectCommand::Delete(args) => cmd::delete::run_delete::<Project>(ctx, &args).await,
            ProjectCommand::Create(args) => cmd::create::run_project_create(ctx, &args).await,
        },
        Commands::Items { command } => match command {
            ItemCommand::List(args) => {
                cmd::list::run_list::<WorkItem>(ctx, &args.list, args.project).await
            }
            ItemCommand::Set(args) => cmd::set::run_set::<WorkItem>(ctx, &args).await,
            ItemCommand::Edit(args) => cmd::edit::run_edit::<WorkItem>(ctx, &args).await,
            ItemCommand::Delete(args) => cmd::delete::run_delete::<WorkItem>(ctx, &args).await,
            ItemCommand::Create(args) => cmd::create::run_item_create(ctx, &args).await,
        },
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let user = config::load_user_config().unwrap_or_else(|err| {
        warn!("ignoring user config: {err:#}");
        config::UserConfig::default()
    });
    let output = output::resolve_output_mode(cli.format, cli.json, user.output.as_deref());
    let config = load_config(output)?;

    let ctx = CmdContext {
        data: cli.data,
        output,
        config,
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(dispatch(&ctx, cli.command))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        // Already rendered on stderr in the selected output mode.
        Err(err) if err.is::<Reported>() => std::process::exit(1),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_parses_after_subcommand() {
        let cli = Cli::parse_from(["wl", "projects", "list", "--json"]);
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Commands::Projects {
                command: ProjectCommand::List(_)
            }
        ));
    }

    #[test]
    fn format_flag_is_global() {
        let cli = Cli::parse_from(["wl", "items", "list", "--format", "text"]);
        assert_eq!(cli.format, Some(OutputMode::Text));
    }

    #[test]
    fn data_defaults_to_local_file() {
        let cli = Cli::parse_from(["wl", "projects", "list"]);
        assert_eq!(cli.data, PathBuf::from("worklist.json"));
    }

    #[test]
    fn sort_flag_repeats_in_order() {
        let cli = Cli::parse_from([
            "wl", "projects", "list", "--sort", "status", "--sort", "priority", "--sort", "status",
        ]);
        let Commands::Projects {
            command: ProjectCommand::List(args),
        } = cli.command
        else {
            panic!("expected projects list");
        };
        assert_eq!(args.sort, vec!["status", "priority", "status"]);
    }

    #[test]
    fn work_items_alias_and_project_scope() {
        let cli = Cli::parse_from(["wl", "work-items", "list", "--project", "7"]);
        let Commands::Items {
            command: ItemCommand::List(args),
        } = cli.command
        else {
            panic!("expected items list");
        };
        assert_eq!(args.project, Some(7));
    }

    #[test]
    fn set_takes_id_and_fields() {
        let cli = Cli::parse_from(["wl", "items", "set", "12", "--status", "in_progress"]);
        let Commands::Items {
            command: ItemCommand::Set(args),
        } = cli.command
        else {
            panic!("expected items set");
        };
        assert_eq!(args.id, 12);
        assert_eq!(args.status.as_deref(), Some("in_progress"));
    }

    #[test]
    fn edit_accepts_title_alias() {
        let cli = Cli::parse_from(["wl", "items", "edit", "3", "--title", "Renamed"]);
        let Commands::Items {
            command: ItemCommand::Edit(args),
        } = cli.command
        else {
            panic!("expected items edit");
        };
        assert_eq!(args.name.as_deref(), Some("Renamed"));
    }

    #[test]
    fn verbose_flag_is_global() {
        assert!(Cli::parse_from(["wl", "projects", "list", "--verbose"]).verbose);
        assert!(Cli::parse_from(["wl", "items", "set", "3", "-v", "--status", "done"]).verbose);
        assert!(!Cli::parse_from(["wl", "projects", "list"]).verbose);
    }

    #[test]
    fn verbose_selects_debug_filter() {
        assert_eq!(default_log_filter(true), "worklist=debug,info");
    }

    #[test]
    fn item_create_requires_project() {
        assert!(Cli::try_parse_from(["wl", "items", "create", "--title", "x"]).is_err());
    }
}
