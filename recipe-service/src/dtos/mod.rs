pub mod recipes;

pub use recipes::{ApiResponse, RecipeRequest, RecipeResponse, MISSING_REQUIRED_FIELDS};
