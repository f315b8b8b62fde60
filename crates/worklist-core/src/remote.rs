//! Remote collaborator interface.
//!
//! The controller never talks to a transport directly. Anything that can
//! page a collection and create, update, or delete a single entity can back
//! it: an HTTP client, a data file, or a scripted test double.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::RemoteError;
use crate::model::entity::{EntityId, ListEntity};

/// One page of a collection fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<E> {
    pub items: Vec<E>,
    /// Number of the next page, `None` on the last page.
    #[serde(default)]
    pub next: Option<u32>,
}

impl<E> Page<E> {
    pub const fn last(items: Vec<E>) -> Self {
        Self { items, next: None }
    }
}

#[async_trait]
pub trait Remote<E: ListEntity>: Send + Sync {
    /// Fetch one page (1-based) of the collection, optionally scoped to a
    /// container (the owning project for work items).
    async fn fetch_page(&self, container: Option<EntityId>, page: u32)
    -> Result<Page<E>, RemoteError>;

    async fn create(&self, draft: &E::Draft) -> Result<E, RemoteError>;

    /// Apply a partial update. The response may omit fields.
    async fn update(&self, id: EntityId, patch: &E::Patch) -> Result<E::Patch, RemoteError>;

    async fn delete(&self, id: EntityId) -> Result<(), RemoteError>;

    /// Full collection, accumulated page by page until the last page.
    ///
    /// # Errors
    ///
    /// Propagates the first page failure, or
    /// [`RemoteError::PageBudgetExhausted`] when `max_pages` pages were read
    /// and the collection still had more.
    async fn fetch_entities(
        &self,
        container: Option<EntityId>,
        max_pages: u32,
    ) -> Result<Vec<E>, RemoteError> {
        let mut items = Vec::new();
        let mut page = 1;
        for _ in 0..max_pages {
            let batch = self.fetch_page(container, page).await?;
            items.extend(batch.items);
            match batch.next {
                Some(next) => page = next,
                None => return Ok(items),
            }
        }
        Err(RemoteError::PageBudgetExhausted { pages: max_pages })
    }
}

#[async_trait]
impl<E: ListEntity, R: Remote<E> + ?Sized> Remote<E> for Arc<R> {
    async fn fetch_page(
        &self,
        container: Option<EntityId>,
        page: u32,
    ) -> Result<Page<E>, RemoteError> {
        Remote::<E>::fetch_page(&**self, container, page).await
    }

    async fn create(&self, draft: &E::Draft) -> Result<E, RemoteError> {
        Remote::<E>::create(&**self, draft).await
    }

    async fn update(&self, id: EntityId, patch: &E::Patch) -> Result<E::Patch, RemoteError> {
        Remote::<E>::update(&**self, id, patch).await
    }

    async fn delete(&self, id: EntityId) -> Result<(), RemoteError> {
        Remote::<E>::delete(&**self, id).await
    }

    async fn fetch_entities(
        &self,
        container: Option<EntityId>,
        max_pages: u32,
    ) -> Result<Vec<E>, RemoteError> {
        Remote::<E>::fetch_entities(&**self, container, max_pages).await
    }
}
