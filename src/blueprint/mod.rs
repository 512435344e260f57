pub mod filter;

use std::sync::Arc;

use crate::{
    db::{BlueprintPersistence, Result},
    models::{Blueprint, Point},
};

pub use self::filter::BlueprintFilter;

/// Entry point for blueprint operations. Reads go through the active filter;
/// writes reach the store untouched.
#[derive(Clone)]
pub struct BlueprintService {
    persistence: Arc<dyn BlueprintPersistence>,
    filter: BlueprintFilter,
}

impl BlueprintService {
    pub fn new(persistence: Arc<dyn BlueprintPersistence>, filter: BlueprintFilter) -> Self {
        Self {
            persistence,
            filter,
        }
    }

    pub fn filter(&self) -> BlueprintFilter {
        self.filter
    }

    pub async fn add_new(&self, blueprint: Blueprint) -> Result<Blueprint> {
        self.persistence.save(blueprint).await
    }

    pub async fn get_all(&self) -> Result<Vec<Blueprint>> {
        let blueprints = self.persistence.get_all().await?;
        Ok(self.filter_all(&blueprints))
    }

    pub async fn get_by_author(&self, author: &str) -> Result<Vec<Blueprint>> {
        let blueprints = self.persistence.get_by_author(author).await?;
        Ok(self.filter_all(&blueprints))
    }

    pub async fn get(&self, author: &str, name: &str) -> Result<Blueprint> {
        let blueprint = self.persistence.get(author, name).await?;
        Ok(self.filter.apply(&blueprint))
    }

    pub async fn add_point(&self, author: &str, name: &str, x: i32, y: i32) -> Result<()> {
        self.persistence
            .add_point(author, name, Point::new(x, y))
            .await
    }

    pub async fn update(
        &self,
        original_author: &str,
        original_name: &str,
        updated: Blueprint,
    ) -> Result<Blueprint> {
        self.persistence
            .update(original_author, original_name, updated)
            .await
    }

    pub async fn delete(&self, author: &str, name: &str) -> Result<()> {
        self.persistence.delete(author, name).await
    }

    fn filter_all(&self, blueprints: &[Blueprint]) -> Vec<Blueprint> {
        blueprints.iter().map(|bp| self.filter.apply(bp)).collect()
    }
}
