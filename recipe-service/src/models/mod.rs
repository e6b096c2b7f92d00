pub mod recipe;

pub use recipe::{NewRecipe, Recipe, RecipeChanges, RecipeId, INVALID_RECIPE_ID};
