pub mod database;
pub mod metrics;
pub mod store;

pub use database::MongoDb;
pub use metrics::{get_metrics, init_metrics, record_mutation};
pub use store::{InMemoryRecipeStore, MongoRecipeStore, RecipeStore, RECIPE_NOT_FOUND};
