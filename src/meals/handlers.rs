use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    error::AppError,
    meals::{
        dto::{CreateMealRequest, MealFilters, MealSummary, UpdateMealRequest},
        extractors::MealId,
        repo,
        repo_types::Meal,
    },
    session::CurrentUser,
    state::AppState,
    validation::{ValidJson, ValidQuery},
};

pub fn meal_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", post(create_meal).get(list_meals))
        .route("/meals/summary", get(meal_summary))
        .route(
            "/meals/:id",
            get(get_meal).put(update_meal).delete(delete_meal),
        )
}

/// POST /meals { name, description, date, respect_diet }
#[instrument(skip(state, user, payload))]
pub async fn create_meal(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidJson(payload): ValidJson<CreateMealRequest>,
) -> Result<(StatusCode, HeaderMap), AppError> {
    let meal = repo::insert(&state.db, user.id, &payload.into_new_meal()).await?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/meals/{}", meal.id)) {
        headers.insert(header::LOCATION, location);
    }

    info!(user_id = %user.id, meal_id = %meal.id, "meal created");
    Ok((StatusCode::CREATED, headers))
}

#[instrument(skip(state, user))]
pub async fn list_meals(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidQuery(filters): ValidQuery<MealFilters>,
) -> Result<Json<Vec<Meal>>, AppError> {
    let meals = repo::list_by_user(&state.db, user.id, &filters).await?;
    Ok(Json(meals))
}

#[instrument(skip(state, user))]
pub async fn get_meal(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    MealId(id): MealId,
) -> Result<Json<Meal>, AppError> {
    match repo::find_owned(&state.db, user.id, id).await? {
        Some(meal) => Ok(Json(meal)),
        None => {
            warn!(user_id = %user.id, %id, "meal not found");
            Err(AppError::NotFound("Meal"))
        }
    }
}

/// PUT /meals/:id with any subset of the meal fields.
#[instrument(skip(state, user, payload))]
pub async fn update_meal(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    MealId(id): MealId,
    ValidJson(payload): ValidJson<UpdateMealRequest>,
) -> Result<StatusCode, AppError> {
    if !repo::update_owned(&state.db, user.id, id, &payload).await? {
        warn!(user_id = %user.id, %id, "update on missing meal");
        return Err(AppError::NotFound("Meal"));
    }
    info!(user_id = %user.id, meal_id = %id, "meal updated");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, user))]
pub async fn delete_meal(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    MealId(id): MealId,
) -> Result<StatusCode, AppError> {
    if !repo::delete_owned(&state.db, user.id, id).await? {
        warn!(user_id = %user.id, %id, "delete on missing meal");
        return Err(AppError::NotFound("Meal"));
    }
    info!(user_id = %user.id, meal_id = %id, "meal deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /meals/summary: totals and the longest on-diet streak.
#[instrument(skip(state, user))]
pub async fn meal_summary(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<MealSummary>, AppError> {
    let meals = repo::list_by_user(&state.db, user.id, &MealFilters::default()).await?;
    Ok(Json(MealSummary::from_meals(&meals)))
}
