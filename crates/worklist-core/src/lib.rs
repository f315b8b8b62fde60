//! worklist-core library.
//!
//! A generic list controller for entities that carry a status, a priority,
//! a due date, and a display name: a filter composer, a multi-key cyclic
//! sort, an entity store, and an optimistic mutation manager with rollback.
//!
//! # Conventions
//!
//! - **Errors**: Remote failures are [`error::RemoteError`]; the controller
//!   catches them and reports an [`error::ErrorCode`] in a notification.
//!   Config loading returns `anyhow::Result`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`).

pub mod config;
pub mod controller;
pub mod error;
pub mod filter;
pub mod model;
pub mod notify;
pub mod remote;
pub mod sort;
pub mod store;

pub use controller::{ControllerSettings, EntityController, MutationOutcome, RollbackScope};
pub use error::{ErrorCode, RemoteError};
pub use filter::FilterSpec;
pub use model::entity::{EntityId, EntityKind, ListEntity};
pub use notify::{Notice, Notifier};
pub use remote::{Page, Remote};
pub use sort::{SortField, SortKeys};
pub use store::EntityStore;
