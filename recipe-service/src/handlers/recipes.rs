use crate::dtos::{ApiResponse, RecipeRequest, RecipeResponse};
use crate::models::RecipeId;
use crate::services::record_mutation;
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;
use service_core::extract::ApiJson;

pub const RECIPE_DELETED: &str = "Recipe deleted successfully";

/// POST /api/recipes
#[tracing::instrument(skip(state, request))]
pub async fn create_recipe(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RecipeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let fields = request.into_new_recipe()?;
    let recipe = state.store.insert(fields).await?;

    record_mutation("create");
    tracing::info!(recipe_id = %recipe.id, "Recipe created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(RecipeResponse::from(recipe))),
    ))
}

/// GET /api/recipes
#[tracing::instrument(skip(state))]
pub async fn list_recipes(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let recipes = state.store.find_all().await?;

    Ok(Json(ApiResponse::list(
        recipes.into_iter().map(RecipeResponse::from).collect(),
    )))
}

/// GET /api/recipes/:id
#[tracing::instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id: RecipeId = id.parse()?;
    let recipe = state.store.find_by_id(&id).await?;

    Ok(Json(ApiResponse::data(RecipeResponse::from(recipe))))
}

/// PUT /api/recipes/:id
#[tracing::instrument(skip(state, request))]
pub async fn update_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<RecipeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let id: RecipeId = id.parse()?;
    let recipe = state.store.update_by_id(&id, request.into_changes()).await?;

    record_mutation("update");
    tracing::info!(recipe_id = %id, "Recipe updated");

    Ok(Json(ApiResponse::data(RecipeResponse::from(recipe))))
}

/// DELETE /api/recipes/:id
#[tracing::instrument(skip(state))]
pub async fn delete_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id: RecipeId = id.parse()?;
    state.store.delete_by_id(&id).await?;

    record_mutation("delete");
    tracing::info!(recipe_id = %id, "Recipe deleted");

    Ok(Json(ApiResponse::message(RECIPE_DELETED)))
}
