//! Persistence gateway for recipes.
//!
//! Every operation takes an already-parsed [`RecipeId`], so malformed
//! identifiers are rejected before a query is ever issued. Records are
//! validated by the schema on insert and on every update.

use crate::models::{NewRecipe, Recipe, RecipeChanges, RecipeId};
use crate::services::database::MongoDb;
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, Bson, DateTime as BsonDateTime, Document};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use service_core::error::AppError;
use std::collections::HashMap;
use std::sync::Mutex;

pub const RECIPE_NOT_FOUND: &str = "Recipe not found";

fn not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!(RECIPE_NOT_FOUND))
}

#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Validates and persists a new recipe.
    async fn insert(&self, fields: NewRecipe) -> Result<Recipe, AppError>;
    /// All recipes, most recently created first.
    async fn find_all(&self) -> Result<Vec<Recipe>, AppError>;
    async fn find_by_id(&self, id: &RecipeId) -> Result<Recipe, AppError>;
    /// Merges `changes` into the stored record, re-validates it and returns
    /// the updated record.
    async fn update_by_id(&self, id: &RecipeId, changes: RecipeChanges)
        -> Result<Recipe, AppError>;
    async fn delete_by_id(&self, id: &RecipeId) -> Result<(), AppError>;
    async fn health_check(&self) -> Result<(), AppError>;
}

pub struct MongoRecipeStore {
    db: MongoDb,
}

impl MongoRecipeStore {
    pub fn new(db: MongoDb) -> Self {
        Self { db }
    }
}

/// `$set` document carrying only the supplied fields, taken from the
/// merged (normalized) record.
fn set_document(recipe: &Recipe, changes: &RecipeChanges) -> Document {
    let mut set = doc! { "updatedAt": BsonDateTime::from_chrono(recipe.updated_at) };

    if changes.title.is_some() {
        set.insert("title", recipe.title.clone());
    }
    if let Some(description) = recipe.description.clone().filter(|_| changes.description.is_some()) {
        set.insert("description", description);
    }
    if changes.ingredients.is_some() {
        set.insert("ingredients", recipe.ingredients.clone());
    }
    if changes.instructions.is_some() {
        set.insert("instructions", recipe.instructions.clone());
    }
    if let Some(cooking_time) = recipe.cooking_time.filter(|_| changes.cooking_time.is_some()) {
        set.insert("cookingTime", Bson::Int64(cooking_time));
    }
    if let Some(servings) = recipe.servings.filter(|_| changes.servings.is_some()) {
        set.insert("servings", Bson::Int64(servings));
    }

    set
}

#[async_trait]
impl RecipeStore for MongoRecipeStore {
    async fn insert(&self, fields: NewRecipe) -> Result<Recipe, AppError> {
        let recipe = Recipe::create(fields)?;

        self.db.recipes().insert_one(&recipe, None).await.map_err(|e| {
            tracing::error!("Failed to insert recipe {} into database: {}", recipe.id, e);
            AppError::from(e)
        })?;

        Ok(recipe)
    }

    async fn find_all(&self) -> Result<Vec<Recipe>, AppError> {
        let find_options = FindOptions::builder()
            .sort(doc! { "createdAt": -1, "_id": -1 })
            .build();

        let cursor = self
            .db
            .recipes()
            .find(doc! {}, find_options)
            .await
            .map_err(AppError::from)?;

        cursor.try_collect::<Vec<Recipe>>().await.map_err(AppError::from)
    }

    async fn find_by_id(&self, id: &RecipeId) -> Result<Recipe, AppError> {
        self.db
            .recipes()
            .find_one(doc! { "_id": id.as_object_id() }, None)
            .await
            .map_err(AppError::from)?
            .ok_or_else(not_found)
    }

    async fn update_by_id(
        &self,
        id: &RecipeId,
        changes: RecipeChanges,
    ) -> Result<Recipe, AppError> {
        let mut recipe = self.find_by_id(id).await?;
        recipe.apply(&changes)?;

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.db
            .recipes()
            .find_one_and_update(
                doc! { "_id": id.as_object_id() },
                doc! { "$set": set_document(&recipe, &changes) },
                options,
            )
            .await
            .map_err(|e| {
                tracing::error!("Failed to update recipe {}: {}", id, e);
                AppError::from(e)
            })?
            // Deleted between the read and the write
            .ok_or_else(not_found)
    }

    async fn delete_by_id(&self, id: &RecipeId) -> Result<(), AppError> {
        let result = self
            .db
            .recipes()
            .delete_one(doc! { "_id": id.as_object_id() }, None)
            .await
            .map_err(AppError::from)?;

        if result.deleted_count == 0 {
            return Err(not_found());
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.db.health_check().await
    }
}

/// Process-local store with the same semantics as [`MongoRecipeStore`].
/// Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryRecipeStore {
    recipes: Mutex<HashMap<RecipeId, Recipe>>,
}

impl InMemoryRecipeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<RecipeId, Recipe>>, AppError> {
        self.recipes
            .lock()
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("Recipe store mutex poisoned: {}", e)))
    }
}

#[async_trait]
impl RecipeStore for InMemoryRecipeStore {
    async fn insert(&self, fields: NewRecipe) -> Result<Recipe, AppError> {
        let recipe = Recipe::create(fields)?;
        self.lock()?.insert(recipe.recipe_id(), recipe.clone());
        Ok(recipe)
    }

    async fn find_all(&self) -> Result<Vec<Recipe>, AppError> {
        let mut recipes: Vec<Recipe> = self.lock()?.values().cloned().collect();
        recipes.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.bytes().cmp(&a.id.bytes()))
        });
        Ok(recipes)
    }

    async fn find_by_id(&self, id: &RecipeId) -> Result<Recipe, AppError> {
        self.lock()?.get(id).cloned().ok_or_else(not_found)
    }

    async fn update_by_id(
        &self,
        id: &RecipeId,
        changes: RecipeChanges,
    ) -> Result<Recipe, AppError> {
        let mut recipes = self.lock()?;
        let stored = recipes.get_mut(id).ok_or_else(not_found)?;

        let mut updated = stored.clone();
        updated.apply(&changes)?;
        *stored = updated.clone();

        Ok(updated)
    }

    async fn delete_by_id(&self, id: &RecipeId) -> Result<(), AppError> {
        self.lock()?.remove(id).map(|_| ()).ok_or_else(not_found)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.lock().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tea() -> NewRecipe {
        NewRecipe {
            title: "Tea".to_string(),
            ingredients: vec!["water".to_string(), "leaves".to_string()],
            instructions: "Boil".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn failed_insert_persists_nothing() {
        let store = InMemoryRecipeStore::new();
        let result = store
            .insert(NewRecipe {
                ingredients: vec![],
                ..tea()
            })
            .await;

        assert!(matches!(result, Err(AppError::ValidationError(_))));
        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn find_all_is_newest_first() {
        let store = InMemoryRecipeStore::new();
        let mut ids = Vec::new();
        for title in ["one", "two", "three"] {
            let recipe = store
                .insert(NewRecipe {
                    title: title.to_string(),
                    ..tea()
                })
                .await
                .unwrap();
            ids.push(recipe.id);
        }

        let listed: Vec<_> = store.find_all().await.unwrap().into_iter().map(|r| r.id).collect();
        ids.reverse();
        assert_eq!(listed, ids);
    }

    #[tokio::test]
    async fn rejected_update_leaves_record_untouched() {
        let store = InMemoryRecipeStore::new();
        let recipe = store.insert(tea()).await.unwrap();
        let id = recipe.recipe_id();

        let result = store
            .update_by_id(
                &id,
                RecipeChanges {
                    title: Some("Chai".to_string()),
                    servings: Some(0),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::ValidationError(_))));
        assert_eq!(store.find_by_id(&id).await.unwrap(), recipe);
    }

    #[tokio::test]
    async fn delete_twice_reports_not_found() {
        let store = InMemoryRecipeStore::new();
        let id = store.insert(tea()).await.unwrap().recipe_id();

        store.delete_by_id(&id).await.unwrap();
        assert!(matches!(store.delete_by_id(&id).await, Err(AppError::NotFound(_))));
        assert!(matches!(store.find_by_id(&id).await, Err(AppError::NotFound(_))));
    }

    #[test]
    fn set_document_only_names_supplied_fields() {
        let mut recipe = Recipe::create(tea()).unwrap();
        let changes = RecipeChanges {
            title: Some("  Chai ".to_string()),
            servings: Some(4),
            ..Default::default()
        };
        recipe.apply(&changes).unwrap();

        let set = set_document(&recipe, &changes);
        let mut keys: Vec<_> = set.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["servings", "title", "updatedAt"]);
        assert_eq!(set.get_str("title").unwrap(), "Chai");
        assert_eq!(set.get_i64("servings").unwrap(), 4);
    }
}
