use chrono::{DateTime, SubsecRound, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use service_core::error::{validation_messages, AppError};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

pub const INVALID_RECIPE_ID: &str = "Invalid recipe ID";

/// Identifier of a stored recipe. Only well-formed ObjectIds (24 hex
/// characters) parse, so a malformed id never reaches the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecipeId(ObjectId);

impl RecipeId {
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    pub fn as_object_id(&self) -> ObjectId {
        self.0
    }
}

impl FromStr for RecipeId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(s)
            .map(Self)
            .map_err(|_| AppError::InvalidIdentifier(INVALID_RECIPE_ID.to_string()))
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

/// Fields supplied when a recipe is created.
#[derive(Debug, Clone, Default)]
pub struct NewRecipe {
    pub title: String,
    pub description: Option<String>,
    pub ingredients: Vec<String>,
    pub instructions: String,
    pub cooking_time: Option<i64>,
    pub servings: Option<i64>,
}

/// A partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct RecipeChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub instructions: Option<String>,
    pub cooking_time: Option<i64>,
    pub servings: Option<i64>,
}

/// Declaration order of the validated fields; violations are reported in it.
const FIELD_ORDER: &[&str] = &[
    "title",
    "description",
    "ingredients",
    "instructions",
    "cooking_time",
    "servings",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "Ingredients array cannot be empty"))]
    pub ingredients: Vec<String>,
    #[validate(length(min = 1, message = "Instructions are required"))]
    pub instructions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "Cooking time must be at least 1 minute"))]
    pub cooking_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "Servings must be at least 1"))]
    pub servings: Option<i64>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

/// Current time at the store's resolution (milliseconds), so a record
/// compares equal before and after a round trip.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

impl Recipe {
    /// Builds a validated record with a fresh identifier and timestamps.
    pub fn create(fields: NewRecipe) -> Result<Self, AppError> {
        let now = now();
        let mut recipe = Self {
            id: RecipeId::new().as_object_id(),
            title: fields.title,
            description: fields.description,
            ingredients: fields.ingredients,
            instructions: fields.instructions,
            cooking_time: fields.cooking_time,
            servings: fields.servings,
            created_at: now,
            updated_at: now,
        };
        recipe.normalize();
        recipe.check()?;
        Ok(recipe)
    }

    pub fn recipe_id(&self) -> RecipeId {
        RecipeId(self.id)
    }

    /// Merges `changes` into the record, bumps `updated_at` and re-validates
    /// the result. On error the record may be partially modified.
    pub fn apply(&mut self, changes: &RecipeChanges) -> Result<(), AppError> {
        if let Some(title) = &changes.title {
            self.title = title.clone();
        }
        if let Some(description) = &changes.description {
            self.description = Some(description.clone());
        }
        if let Some(ingredients) = &changes.ingredients {
            self.ingredients = ingredients.clone();
        }
        if let Some(instructions) = &changes.instructions {
            self.instructions = instructions.clone();
        }
        if let Some(cooking_time) = changes.cooking_time {
            self.cooking_time = Some(cooking_time);
        }
        if let Some(servings) = changes.servings {
            self.servings = Some(servings);
        }

        self.normalize();
        self.check()?;
        self.updated_at = now().max(self.created_at);
        Ok(())
    }

    fn check(&self) -> Result<(), AppError> {
        self.validate()
            .map_err(|errors| AppError::ValidationError(validation_messages(&errors, FIELD_ORDER)))
    }

    fn normalize(&mut self) {
        let trimmed = self.title.trim();
        if trimmed.len() != self.title.len() {
            self.title = trimmed.to_string();
        }
        if let Some(description) = self.description.as_mut() {
            let trimmed = description.trim();
            if trimmed.len() != description.len() {
                *description = trimmed.to_string();
            }
        }
    }
}
