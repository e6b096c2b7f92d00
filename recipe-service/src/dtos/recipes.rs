use crate::models::{NewRecipe, Recipe, RecipeChanges};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;

pub const MISSING_REQUIRED_FIELDS: &str = "Title, ingredients, and instructions are required";

/// Body accepted by both create and update. Unknown keys are ignored and
/// `null` is treated the same as an absent key.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub instructions: Option<String>,
    pub cooking_time: Option<i64>,
    pub servings: Option<i64>,
}

impl RecipeRequest {
    /// Checks that the required fields are present and non-empty. Deeper
    /// rules (trimming, empty ingredient list, minimums) are the schema's.
    pub fn into_new_recipe(self) -> Result<NewRecipe, AppError> {
        match (self.title, self.ingredients, self.instructions) {
            (Some(title), Some(ingredients), Some(instructions))
                if !title.is_empty() && !instructions.is_empty() =>
            {
                Ok(NewRecipe {
                    title,
                    description: self.description,
                    ingredients,
                    instructions,
                    cooking_time: self.cooking_time,
                    servings: self.servings,
                })
            }
            _ => Err(AppError::MissingRequiredField(
                MISSING_REQUIRED_FIELDS.to_string(),
            )),
        }
    }

    pub fn into_changes(self) -> RecipeChanges {
        RecipeChanges {
            title: self.title,
            description: self.description,
            ingredients: self.ingredients,
            instructions: self.instructions,
            cooking_time: self.cooking_time,
            servings: self.servings,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub ingredients: Vec<String>,
    pub instructions: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooking_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servings: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Recipe> for RecipeResponse {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id.to_hex(),
            title: recipe.title,
            description: recipe.description,
            ingredients: recipe.ingredients,
            instructions: recipe.instructions,
            cooking_time: recipe.cooking_time,
            servings: recipe.servings,
            created_at: recipe.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            updated_at: recipe.updated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Success envelope: `{ success: true, count?, data?, message? }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            count: None,
            data: Some(data),
            message: None,
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    pub fn list(items: Vec<T>) -> Self {
        Self {
            success: true,
            count: Some(items.len()),
            data: Some(items),
            message: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            count: None,
            data: None,
            message: Some(message.into()),
        }
    }
}
