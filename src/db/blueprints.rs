use std::future::Future;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use bson::{doc, Document};
use futures::TryStreamExt;
use mongodb::{
    error::{ErrorKind, WriteFailure},
    options::{ClientOptions, FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument},
    Client, Collection, IndexModel,
};
use serde::{Deserialize, Serialize};

use crate::models::{self, Point};

use super::{BlueprintError, BlueprintPersistence, Result};

const BLUEPRINTS_COLLECTION: &str = "blueprints";
const DUPLICATE_KEY: i32 = 11000;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BlueprintDocument {
    #[serde(
        rename = "_id",
        with = "bson::serde_helpers::hex_string_as_object_id",
        skip_serializing
    )]
    pub id: String,
    pub author: String,
    pub name: String,
    #[serde(default)]
    pub points: Vec<Point>,
}

impl From<models::Blueprint> for BlueprintDocument {
    fn from(value: models::Blueprint) -> Self {
        Self {
            id: value.id.unwrap_or_default(),
            author: value.author,
            name: value.name,
            points: value.points,
        }
    }
}

impl From<BlueprintDocument> for models::Blueprint {
    fn from(value: BlueprintDocument) -> Self {
        Self {
            id: Some(value.id),
            author: value.author,
            name: value.name,
            points: value.points,
        }
    }
}

fn by_key(author: &str, name: &str) -> Document {
    doc! { "author": author, "name": name }
}

/// Comma separated `host:port` list of a connection string, leaving out the
/// credentials and options it may carry.
fn hosts(options: &ClientOptions) -> String {
    options
        .hosts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Hands back `step` unchanged, running `undo` first when it failed.
async fn undo_on_failure<T, U>(step: Result<T>, undo: U) -> Result<T>
where
    U: Future<Output = Result<()>>,
{
    if step.is_err() {
        if let Err(e) = undo.await {
            log::error!("failed to undo partial write: {:#}", e);
        }
    }
    step
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        &*err.kind,
        ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY
    )
}

/// Blueprint store backed by a MongoDB collection. Each document embeds its
/// points; `_id` is the surrogate key.
#[derive(Debug, Clone)]
pub struct MongoBlueprintPersistence {
    blueprints: Collection<BlueprintDocument>,
}

impl MongoBlueprintPersistence {
    /// Connects, verifies the server answers a ping and ensures the unique
    /// `(author, name)` index exists.
    pub async fn connect(uri: &str, database: &str) -> anyhow::Result<Self> {
        let options = ClientOptions::parse(uri)
            .await
            .context("invalid database uri")?;
        log::info!("attempting to use external datasource at {}", hosts(&options));
        let client = Client::with_options(options).context("invalid database options")?;
        let db = client.database(database);
        db.run_command(doc! { "ping": 1 }, None)
            .await
            .context("database did not answer ping")?;

        let store = Self::new(db.collection(BLUEPRINTS_COLLECTION));
        store.ensure_indexes().await?;
        Ok(store)
    }

    pub fn new(blueprints: Collection<BlueprintDocument>) -> Self {
        Self { blueprints }
    }

    async fn ensure_indexes(&self) -> anyhow::Result<()> {
        let index = IndexModel::builder()
            .keys(doc! { "author": 1, "name": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.blueprints
            .create_index(index, None)
            .await
            .context("failed to create blueprint key index")?;
        Ok(())
    }

    async fn find_sorted(&self, filter: Document) -> Result<Vec<models::Blueprint>> {
        let options = FindOptions::builder()
            .sort(doc! { "author": 1, "name": 1 })
            .build();
        let cursor = self.blueprints.find(filter, options).await?;
        let blueprints: Vec<models::Blueprint> = cursor
            .map_ok(models::Blueprint::from)
            .try_collect()
            .await?;
        Ok(blueprints)
    }

    async fn insert(&self, blueprint: models::Blueprint) -> Result<models::Blueprint> {
        let (author, name) = (blueprint.author.clone(), blueprint.name.clone());
        let document: BlueprintDocument = blueprint.into();

        let inserted = match self.blueprints.insert_one(&document, None).await {
            Ok(inserted) => inserted,
            Err(e) if is_duplicate_key(&e) => {
                return Err(BlueprintError::already_exists(&author, &name))
            }
            Err(e) => return Err(e.into()),
        };
        let id = inserted
            .inserted_id
            .as_object_id()
            .ok_or_else(|| anyhow!("store assigned a non-ObjectId key"))?
            .to_hex();

        Ok(BlueprintDocument { id, ..document }.into())
    }
}

#[async_trait]
impl BlueprintPersistence for MongoBlueprintPersistence {
    async fn save(&self, blueprint: models::Blueprint) -> Result<models::Blueprint> {
        if self
            .blueprints
            .find_one(by_key(&blueprint.author, &blueprint.name), None)
            .await?
            .is_some()
        {
            return Err(BlueprintError::already_exists(
                &blueprint.author,
                &blueprint.name,
            ));
        }

        let saved = self.insert(blueprint).await?;
        log::debug!("saved blueprint {}/{}", saved.author, saved.name);
        Ok(saved)
    }

    async fn get(&self, author: &str, name: &str) -> Result<models::Blueprint> {
        self.blueprints
            .find_one(by_key(author, name), None)
            .await?
            .map(Into::into)
            .ok_or_else(|| BlueprintError::not_found(author, name))
    }

    async fn get_by_author(&self, author: &str) -> Result<Vec<models::Blueprint>> {
        let found = self.find_sorted(doc! { "author": author }).await?;
        if found.is_empty() {
            return Err(BlueprintError::author_not_found(author));
        }
        Ok(found)
    }

    async fn get_all(&self) -> Result<Vec<models::Blueprint>> {
        self.find_sorted(doc! {}).await
    }

    async fn add_point(&self, author: &str, name: &str, point: Point) -> Result<()> {
        let update = doc! {
            "$push": {
                "points": { "x": point.x, "y": point.y },
            }
        };

        let result = self
            .blueprints
            .update_one(by_key(author, name), update, None)
            .await?;
        if result.matched_count == 0 {
            return Err(BlueprintError::not_found(author, name));
        }
        Ok(())
    }

    async fn update(
        &self,
        original_author: &str,
        original_name: &str,
        updated: models::Blueprint,
    ) -> Result<models::Blueprint> {
        if updated.has_key(original_author, original_name) {
            let points = bson::to_bson(&updated.points).context("failed to encode points")?;
            let options = FindOneAndUpdateOptions::builder()
                .return_document(ReturnDocument::After)
                .build();

            return self
                .blueprints
                .find_one_and_update(
                    by_key(original_author, original_name),
                    doc! { "$set": { "points": points } },
                    options,
                )
                .await?
                .map(Into::into)
                .ok_or_else(|| BlueprintError::not_found(original_author, original_name));
        }

        if self
            .blueprints
            .find_one(by_key(original_author, original_name), None)
            .await?
            .is_none()
        {
            return Err(BlueprintError::not_found(original_author, original_name));
        }

        // The new key differs from the original, so inserting first cannot
        // collide with the record being replaced. If the original cannot be
        // removed the inserted copy is, so both keys never survive together.
        let renamed = self
            .insert(models::Blueprint {
                id: None,
                ..updated
            })
            .await?;
        let removed = self
            .blueprints
            .delete_one(by_key(original_author, original_name), None)
            .await
            .map(|_| ())
            .map_err(BlueprintError::from);
        undo_on_failure(removed, async {
            self.blueprints
                .delete_one(by_key(&renamed.author, &renamed.name), None)
                .await?;
            log::warn!(
                "rolled back rename of {}/{} to {}/{}",
                original_author,
                original_name,
                renamed.author,
                renamed.name
            );
            Ok::<(), BlueprintError>(())
        })
        .await?;

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
        let result = self
            .blueprints
            .delete_one(by_key(author, name), None)
            .await?;
        if result.deleted_count == 0 {
            return Err(BlueprintError::not_found(author, name));
        }
        log::info!("deleted blueprint {}/{}", author, name);
        Ok(())
    }
}
