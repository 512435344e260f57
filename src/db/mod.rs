mod blueprints;
pub use blueprints::*;
mod memory;
pub use memory::*;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    config::DatabaseSettings,
    models::{Blueprint, Point},
};

/// Failures of the blueprint persistence contract.
#[derive(Debug, thiserror::Error)]
pub enum BlueprintError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    AlreadyExists(String),
    /// Infrastructure fault of the underlying store, passed through untranslated.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl BlueprintError {
    pub fn not_found(author: &str, name: &str) -> Self {
        Self::NotFound(format!("Blueprint not found: {}/{}", author, name))
    }

    pub fn author_not_found(author: &str) -> Self {
        Self::NotFound(format!("No blueprints for author: {}", author))
    }

    pub fn already_exists(author: &str, name: &str) -> Self {
        Self::AlreadyExists(format!("Blueprint already exists: {}/{}", author, name))
    }
}

impl From<mongodb::error::Error> for BlueprintError {
    fn from(value: mongodb::error::Error) -> Self {
        Self::Store(value.into())
    }
}

pub type Result<T, E = BlueprintError> = std::result::Result<T, E>;

/// CRUD contract over blueprints keyed by `(author, name)`.
///
/// Implementations are the sole owners of durable blueprint state and return
/// raw, unfiltered point sequences.
#[async_trait]
pub trait BlueprintPersistence: Send + Sync {
    /// Stores a new blueprint and returns it with its freshly assigned id.
    async fn save(&self, blueprint: Blueprint) -> Result<Blueprint>;

    async fn get(&self, author: &str, name: &str) -> Result<Blueprint>;

    /// Fails with [`BlueprintError::NotFound`] when the author owns no blueprints.
    async fn get_by_author(&self, author: &str) -> Result<Vec<Blueprint>>;

    /// Every stored blueprint; an empty store yields an empty vector.
    async fn get_all(&self) -> Result<Vec<Blueprint>>;

    async fn add_point(&self, author: &str, name: &str, point: Point) -> Result<()>;

    /// Replaces the points in place when the key is unchanged. A changed key
    /// deletes the original record and creates a new one with a fresh id.
    async fn update(
        &self,
        original_author: &str,
        original_name: &str,
        updated: Blueprint,
    ) -> Result<Blueprint>;

    async fn delete(&self, author: &str, name: &str) -> Result<()>;
}

/// Picks the store for this process: MongoDB when a URI is configured and
/// reachable, otherwise the in-memory store.
pub async fn connect(settings: &DatabaseSettings) -> Arc<dyn BlueprintPersistence> {
    let Some(uri) = settings.uri.as_deref().filter(|u| !u.trim().is_empty()) else {
        log::info!("no database uri configured, using in-memory blueprint store");
        return Arc::new(InMemoryBlueprintPersistence::new());
    };

    match MongoBlueprintPersistence::connect(uri, &settings.name).await {
        Ok(store) => {
            log::info!("connected to external datasource");
            Arc::new(store)
        }
        Err(e) => {
            log::warn!(
                "external datasource unavailable, falling back to in-memory store: {:#}",
                e
            );
            Arc::new(InMemoryBlueprintPersistence::new())
        }
    }
}
