use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::{Blueprint, Point};

use super::{BlueprintError, BlueprintPersistence, Result};

type Key = (String, String);

fn key(author: &str, name: &str) -> Key {
    (author.to_string(), name.to_string())
}

/// Blueprint store kept in process memory, ordered by `(author, name)`.
#[derive(Debug, Default)]
pub struct InMemoryBlueprintPersistence {
    blueprints: RwLock<BTreeMap<Key, Blueprint>>,
}

impl InMemoryBlueprintPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

#[async_trait]
impl BlueprintPersistence for InMemoryBlueprintPersistence {
    async fn save(&self, mut blueprint: Blueprint) -> Result<Blueprint> {
        let mut blueprints = self.blueprints.write().await;
        let k = key(&blueprint.author, &blueprint.name);
        if blueprints.contains_key(&k) {
            return Err(BlueprintError::already_exists(&k.0, &k.1));
        }

        blueprint.id = Some(Self::next_id());
        blueprints.insert(k, blueprint.clone());
        log::debug!("saved blueprint {}/{}", blueprint.author, blueprint.name);
        Ok(blueprint)
    }

    async fn get(&self, author: &str, name: &str) -> Result<Blueprint> {
        self.blueprints
            .read()
            .await
            .get(&key(author, name))
            .cloned()
            .ok_or_else(|| BlueprintError::not_found(author, name))
    }

    async fn get_by_author(&self, author: &str) -> Result<Vec<Blueprint>> {
        let found: Vec<_> = self
            .blueprints
            .read()
            .await
            .values()
            .filter(|bp| bp.author == author)
            .cloned()
            .collect();

        if found.is_empty() {
            return Err(BlueprintError::author_not_found(author));
        }
        Ok(found)
    }

    async fn get_all(&self) -> Result<Vec<Blueprint>> {
        Ok(self.blueprints.read().await.values().cloned().collect())
    }

    async fn add_point(&self, author: &str, name: &str, point: Point) -> Result<()> {
        let mut blueprints = self.blueprints.write().await;
        let blueprint = blueprints
            .get_mut(&key(author, name))
            .ok_or_else(|| BlueprintError::not_found(author, name))?;
        blueprint.add_point(point);
        Ok(())
    }

    async fn update(
        &self,
        original_author: &str,
        original_name: &str,
        updated: Blueprint,
    ) -> Result<Blueprint> {
        let mut blueprints = self.blueprints.write().await;
        let original_key = key(original_author, original_name);
        if !blueprints.contains_key(&original_key) {
            return Err(BlueprintError::not_found(original_author, original_name));
        }

        if updated.has_key(original_author, original_name) {
            let stored = blueprints
                .get_mut(&original_key)
                .ok_or_else(|| BlueprintError::not_found(original_author, original_name))?;
            stored.replace_points(updated.points);
            return Ok(stored.clone());
        }

        let new_key = key(&updated.author, &updated.name);
        if blueprints.contains_key(&new_key) {
            return Err(BlueprintError::already_exists(&new_key.0, &new_key.1));
        }

        blueprints.remove(&original_key);
        let renamed = Blueprint {
            id: Some(Self::next_id()),
            ..updated
        };
        blueprints.insert(new_key, renamed.clone());
        log::info!(
            "renamed blueprint {}/{} to {}/{}",
            original_author,
            original_name,
            renamed.author,
            renamed.name
        );
        Ok(renamed)
    }

    async fn delete(&self, author: &str, name: &str) -> Result<()> {
        self.blueprints
            .write()
            .await
            .remove(&key(author, name))
            .map(|_| log::info!("deleted blueprint {}/{}", author, name))
            .ok_or_else(|| BlueprintError::not_found(author, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(i32, i32)]) -> Vec<Point> {
        coords.iter().copied().map(Point::from).collect()
    }

    async fn seeded() -> InMemoryBlueprintPersistence {
        let store = InMemoryBlueprintPersistence::new();
        store
            .save(Blueprint::new("john", "house", pts(&[(0, 0), (10, 0), (10, 10)])))
            .await
            .unwrap();
        store
            .save(Blueprint::new("john", "garage", pts(&[(5, 5)])))
            .await
            .unwrap();
        store
            .save(Blueprint::new("jane", "garden", pts(&[(2, 2), (3, 4)])))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn save_then_get_returns_the_same_points() {
        let store = InMemoryBlueprintPersistence::new();
        let saved = store
            .save(Blueprint::new("john", "house", pts(&[(1, 2), (3, 4)])))
            .await
            .unwrap();
        assert!(saved.id.is_some());

        let fetched = store.get("john", "house").await.unwrap();
        assert_eq!(fetched.author, "john");
        assert_eq!(fetched.name, "house");
        assert_eq!(fetched.points, pts(&[(1, 2), (3, 4)]));
        assert_eq!(fetched.id, saved.id);
    }

    #[tokio::test]
    async fn saving_a_duplicate_key_fails() {
        let store = seeded().await;
        let err = store
            .save(Blueprint::new("john", "house", vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, BlueprintError::AlreadyExists(_)));
        assert_eq!(err.to_string(), "Blueprint already exists: john/house");
    }

    #[tokio::test]
    async fn missing_blueprints_are_not_found() {
        let store = seeded().await;

        let err = store.get("john", "castle").await.unwrap_err();
        assert_eq!(err.to_string(), "Blueprint not found: john/castle");
        assert!(matches!(
            store.add_point("john", "castle", Point::new(1, 1)).await,
            Err(BlueprintError::NotFound(_))
        ));
        assert!(matches!(
            store.delete("john", "castle").await,
            Err(BlueprintError::NotFound(_))
        ));
        assert!(matches!(
            store
                .update("john", "castle", Blueprint::new("john", "castle", vec![]))
                .await,
            Err(BlueprintError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn author_without_blueprints_is_not_found_but_empty_store_is_empty() {
        let empty = InMemoryBlueprintPersistence::new();
        assert!(empty.get_all().await.unwrap().is_empty());
        let err = empty.get_by_author("nobody").await.unwrap_err();
        assert!(matches!(err, BlueprintError::NotFound(_)));
        assert_eq!(err.to_string(), "No blueprints for author: nobody");

        let store = seeded().await;
        let johns = store.get_by_author("john").await.unwrap();
        assert_eq!(johns.len(), 2);
        assert!(johns.iter().all(|bp| bp.author == "john"));
        assert_eq!(store.get_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn add_point_appends_exactly_one_point() {
        let store = seeded().await;
        store.add_point("john", "house", Point::new(0, 10)).await.unwrap();

        let bp = store.get("john", "house").await.unwrap();
        assert_eq!(bp.points.len(), 4);
        assert_eq!(bp.points.last(), Some(&Point::new(0, 10)));
    }

    #[tokio::test]
    async fn update_in_place_keeps_the_id() {
        let store = seeded().await;
        let before = store.get("john", "house").await.unwrap();

        let updated = store
            .update("john", "house", Blueprint::new("john", "house", pts(&[(7, 7)])))
            .await
            .unwrap();

        let after = store.get("john", "house").await.unwrap();
        assert_eq!(after.id, before.id);
        assert_eq!(updated.id, before.id);
        assert_eq!(after.points, pts(&[(7, 7)]));
    }

    #[tokio::test]
    async fn rename_recreates_under_a_new_id() {
        let store = seeded().await;
        let before = store.get("john", "house").await.unwrap();

        store
            .update("john", "house", Blueprint::new("john", "villa", pts(&[(1, 1)])))
            .await
            .unwrap();

        assert!(matches!(
            store.get("john", "house").await,
            Err(BlueprintError::NotFound(_))
        ));
        let renamed = store.get("john", "villa").await.unwrap();
        assert_ne!(renamed.id, before.id);
        assert_eq!(renamed.points, pts(&[(1, 1)]));
    }

    #[tokio::test]
    async fn rename_onto_an_existing_key_fails_and_keeps_both() {
        let store = seeded().await;
        let err = store
            .update("john", "house", Blueprint::new("john", "garage", vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, BlueprintError::AlreadyExists(_)));

        assert_eq!(store.get("john", "house").await.unwrap().points.len(), 3);
        assert_eq!(store.get("john", "garage").await.unwrap().points.len(), 1);
    }

    #[tokio::test]
    async fn delete_removes_permanently() {
        let store = seeded().await;
        store.delete("jane", "garden").await.unwrap();
        assert!(matches!(
            store.get_by_author("jane").await,
            Err(BlueprintError::NotFound(_))
        ));
        assert!(matches!(
            store.delete("jane", "garden").await,
            Err(BlueprintError::NotFound(_))
        ));
    }
}
