//! services/api/src/web/goals.rs
//!
//! Long-term goals and weekly goals. Same owner-scoped CRUD shape as the
//! task endpoints; the interesting payloads here are the nested structured
//! blobs (`system`, `contract`, `evaluation`) that the coach operations
//! produce and the frontend stores back onto these rows.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use goggins_core::domain::{NewGoal, NewWeeklyGoal, User};
use goggins_core::patch::{GoalPatch, WeeklyGoalPatch};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::state::AppState;

//=========================================================================================
// Goals
//=========================================================================================

/// GET /goals - List goals
#[utoipa::path(
    get,
    path = "/goals",
    responses((status = 200, description = "Goals for the current user")),
    tag = "goals"
)]
pub async fn list_goals_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, ApiError> {
    let goals = state.db.list_goals(user.id).await?;
    Ok(Json(goals))
}

/// POST /goals - Create a goal
#[utoipa::path(
    post,
    path = "/goals",
    request_body(content_type = "application/json", description = "New goal"),
    responses((status = 201, description = "Goal created")),
    tag = "goals"
)]
pub async fn create_goal_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(new): Json<NewGoal>,
) -> Result<impl IntoResponse, ApiError> {
    let goal = state.db.create_goal(user.id, new).await?;
    Ok((StatusCode::CREATED, Json(goal)))
}

/// PUT /goals/{id} - Partially update a goal
#[utoipa::path(
    put,
    path = "/goals/{id}",
    request_body(content_type = "application/json", description = "Goal fields to change"),
    responses(
        (status = 200, description = "Updated goal"),
        (status = 404, description = "Goal not found")
    ),
    tag = "goals"
)]
pub async fn update_goal_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(patch): Json<GoalPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let goal = state.db.update_goal(user.id, id, patch).await?;
    Ok(Json(goal))
}

/// DELETE /goals/{id} - Delete a goal (idempotent)
#[utoipa::path(
    delete,
    path = "/goals/{id}",
    responses((status = 204, description = "Goal deleted or already absent")),
    tag = "goals"
)]
pub async fn delete_goal_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.delete_goal(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Weekly Goals
//=========================================================================================

/// GET /weekly-goals - List weekly goals
#[utoipa::path(
    get,
    path = "/weekly-goals",
    responses((status = 200, description = "Weekly goals for the current user")),
    tag = "goals"
)]
pub async fn list_weekly_goals_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, ApiError> {
    let goals = state.db.list_weekly_goals(user.id).await?;
    Ok(Json(goals))
}

/// POST /weekly-goals - Create a weekly goal
#[utoipa::path(
    post,
    path = "/weekly-goals",
    request_body(content_type = "application/json", description = "New weekly goal"),
    responses((status = 201, description = "Weekly goal created")),
    tag = "goals"
)]
pub async fn create_weekly_goal_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(new): Json<NewWeeklyGoal>,
) -> Result<impl IntoResponse, ApiError> {
    let goal = state.db.create_weekly_goal(user.id, new).await?;
    Ok((StatusCode::CREATED, Json(goal)))
}

/// PUT /weekly-goals/{id} - Partially update a weekly goal
#[utoipa::path(
    put,
    path = "/weekly-goals/{id}",
    request_body(content_type = "application/json", description = "Weekly goal fields to change"),
    responses(
        (status = 200, description = "Updated weekly goal"),
        (status = 404, description = "Weekly Goal not found")
    ),
    tag = "goals"
)]
pub async fn update_weekly_goal_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(patch): Json<WeeklyGoalPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let goal = state.db.update_weekly_goal(user.id, id, patch).await?;
    Ok(Json(goal))
}

/// DELETE /weekly-goals/{id} - Delete a weekly goal (idempotent)
#[utoipa::path(
    delete,
    path = "/weekly-goals/{id}",
    responses((status = 204, description = "Weekly goal deleted or already absent")),
    tag = "goals"
)]
pub async fn delete_weekly_goal_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.delete_weekly_goal(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
