pub mod health;
pub mod pages;
pub mod recipes;

pub use health::{health_check, metrics_endpoint, readiness_check};
pub use pages::{index, route_not_found, ROUTE_NOT_FOUND};
pub use recipes::{
    create_recipe, delete_recipe, get_recipe, list_recipes, update_recipe, RECIPE_DELETED,
};
