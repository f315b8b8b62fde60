//! A [`Remote`] backed by a JSON data file.
//!
//! The file holds every collection plus the next id to assign:
//!
//! ```json
//! { "projects": [...], "work_items": [...], "next_id": 3 }
//! ```
//!
//! A missing file reads as empty. Every write replaces the file atomically
//! through a temp file in the same directory.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tempfile::NamedTempFile;
use tracing::debug;

use worklist_core::error::RemoteError;
use worklist_core::model::entity::{EntityId, ListEntity};
use worklist_core::model::project::{Project, ProjectPatch};
use worklist_core::model::work_item::{WorkItem, WorkItemPatch};
use worklist_core::remote::{Page, Remote};

/// Page size the file remote serves collections in.
pub const PAGE_SIZE: usize = 50;

/// Env var naming remote operations that fail with a transport error
/// (comma-separated: `fetch`, `create`, `update`, `delete`).
pub const FAIL_ENV: &str = "WORKLIST_REMOTE_FAIL";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataFile {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub work_items: Vec<WorkItem>,
    #[serde(default = "first_id")]
    pub next_id: EntityId,
}

const fn first_id() -> EntityId {
    1
}

impl DataFile {
    /// Next free id, never below one past the largest id on file.
    fn allocate_id(&mut self) -> EntityId {
        let max_seen = self
            .projects
            .iter()
            .map(|p| p.id)
            .chain(self.work_items.iter().map(|w| w.id))
            .max()
            .unwrap_or(0);
        let id = self.next_id.max(max_seen + 1);
        self.next_id = id + 1;
        id
    }
}

/// How an entity shape lives in the data file.
pub trait Stored: ListEntity {
    fn collection(data: &DataFile) -> &[Self];

    fn collection_mut(data: &mut DataFile) -> &mut Vec<Self>;

    /// The container a scoped fetch filters by.
    fn container(&self) -> Option<EntityId>;

    /// Server-side normalization of a freshly created entity.
    fn normalize_created(&mut self, _data: &DataFile) -> Result<(), RemoteError> {
        Ok(())
    }

    /// The fields the server echoes back after an update.
    fn echo(patch: &Self::Patch) -> Self::Patch {
        patch.clone()
    }
}

impl Stored for Project {
    fn collection(data: &DataFile) -> &[Self] {
        &data.projects
    }

    fn collection_mut(data: &mut DataFile) -> &mut Vec<Self> {
        &mut data.projects
    }

    fn container(&self) -> Option<EntityId> {
        None
    }

    fn echo(patch: &ProjectPatch) -> ProjectPatch {
        ProjectPatch {
            name: patch.name.as_ref().map(|n| n.trim().to_string()),
            ..patch.clone()
        }
    }
}

impl Stored for WorkItem {
    fn collection(data: &DataFile) -> &[Self] {
        &data.work_items
    }

    fn collection_mut(data: &mut DataFile) -> &mut Vec<Self> {
        &mut data.work_items
    }

    fn container(&self) -> Option<EntityId> {
        self.project_id()
    }

    /// Fill the owning project's name from the projects on file.
    fn normalize_created(&mut self, data: &DataFile) -> Result<(), RemoteError> {
        let Some(project) = self.project.as_mut() else {
            return Ok(());
        };
        let owner = data
            .projects
            .iter()
            .find(|p| p.id == project.id)
            .ok_or_else(|| RemoteError::Rejected {
                status: 422,
                message: format!("project {} does not exist", project.id),
            })?;
        project.name.clone_from(&owner.name);
        Ok(())
    }

    fn echo(patch: &WorkItemPatch) -> WorkItemPatch {
        WorkItemPatch {
            title: patch.title.as_ref().map(|t| t.trim().to_string()),
            ..patch.clone()
        }
    }
}

pub struct FileRemote {
    path: PathBuf,
    page_size: usize,
    failing: Vec<String>,
    /// Serializes read-modify-write cycles on the file.
    write_lock: Mutex<()>,
}

impl FileRemote {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            page_size: PAGE_SIZE,
            failing: Vec::new(),
            write_lock: Mutex::new(()),
        }
    }

    /// Operations named in [`FAIL_ENV`] fail with a transport error.
    #[must_use]
    pub fn with_failures_from_env(mut self) -> Self {
        if let Ok(raw) = std::env::var(FAIL_ENV) {
            self.failing = raw
                .split(',')
                .map(|op| op.trim().to_ascii_lowercase())
                .filter(|op| !op.is_empty())
                .collect();
        }
        self
    }

    #[cfg(test)]
    fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    #[cfg(test)]
    fn path(&self) -> &Path {
        &self.path
    }

    fn check(&self, operation: &str) -> Result<(), RemoteError> {
        if self.failing.iter().any(|op| op == operation) {
            return Err(RemoteError::Transport(format!(
                "{operation} failed: injected by {FAIL_ENV}"
            )));
        }
        Ok(())
    }

    pub fn read(&self) -> Result<DataFile, RemoteError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(DataFile::default()),
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| RemoteError::Decode(format!("{}: {e}", self.path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(DataFile::default()),
            Err(e) => Err(RemoteError::Transport(format!(
                "read {}: {e}",
                self.path.display()
            ))),
        }
    }

    fn write(&self, data: &DataFile) -> Result<(), RemoteError> {
        let io_err = |e: std::io::Error| {
            RemoteError::Transport(format!("write {}: {e}", self.path.display()))
        };
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
        serde_json::to_writer_pretty(&mut tmp, data)
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        tmp.write_all(b"\n").map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;
        debug!(path = %self.path.display(), "data file written");
        Ok(())
    }

    /// Read, mutate, and write back under the write lock.
    fn modify<T>(
        &self,
        change: impl FnOnce(&mut DataFile) -> Result<T, RemoteError>,
    ) -> Result<T, RemoteError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut data = self.read()?;
        let value = change(&mut data)?;
        self.write(&data)?;
        Ok(value)
    }
}

#[async_trait]
impl<E: Stored> Remote<E> for FileRemote {
    async fn fetch_page(
        &self,
        container: Option<EntityId>,
        page: u32,
    ) -> Result<Page<E>, RemoteError> {
        self.check("fetch")?;
        let data = self.read()?;
        let scoped: Vec<&E> = E::collection(&data)
            .iter()
            .filter(|entity| container.is_none() || entity.container() == container)
            .collect();
        let index = usize::try_from(page.saturating_sub(1)).unwrap_or(usize::MAX);
        let start = index.saturating_mul(self.page_size);
        let items: Vec<E> = scoped
            .iter()
            .skip(start)
            .take(self.page_size)
            .map(|entity| (*entity).clone())
            .collect();
        let next = (start.saturating_add(self.page_size) < scoped.len()).then_some(page + 1);
        Ok(Page { items, next })
    }

    async fn create(&self, draft: &E::Draft) -> Result<E, RemoteError> {
        self.check("create")?;
        self.modify(|data| {
            let id = data.allocate_id();
            let mut entity = E::from_draft(id, draft);
            entity.normalize_created(data)?;
            E::collection_mut(data).push(entity.clone());
            Ok(entity)
        })
    }

    async fn update(&self, id: EntityId, patch: &E::Patch) -> Result<E::Patch, RemoteError> {
        self.check("update")?;
        self.modify(|data| {
            let echoed = E::echo(patch);
            let entity = E::collection_mut(data)
                .iter_mut()
                .find(|entity| entity.id() == id)
                .ok_or(RemoteError::NotFound(id))?;
            entity.apply(&echoed);
            Ok(echoed)
        })
    }

    async fn delete(&self, id: EntityId) -> Result<(), RemoteError> {
        self.check("delete")?;
        self.modify(|data| {
            let items = E::collection_mut(data);
            let before = items.len();
            items.retain(|entity| entity.id() != id);
            if items.len() == before {
                return Err(RemoteError::NotFound(id));
            }
            Ok(())
        })
    }
}
