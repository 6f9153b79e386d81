//! services/api/src/web/tasks.rs
//!
//! Task-shaped resources: one-off tasks, recurring task templates, side
//! quests, and the wish/core lists. All are owner-scoped CRUD; updates are
//! partial merges where an absent field keeps the stored value and an
//! explicit null clears it.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::NaiveDate;
use goggins_core::domain::{NewCoreTask, NewRecurringTask, NewSideQuest, NewTask, NewWish, User};
use goggins_core::patch::{CoreTaskPatch, RecurringTaskPatch, SideQuestPatch, TaskPatch, WishPatch};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::state::AppState;

//=========================================================================================
// Tasks
//=========================================================================================

#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// GET /tasks - List tasks, optionally restricted to an inclusive date range
#[utoipa::path(
    get,
    path = "/tasks",
    params(
        ("start_date" = Option<String>, Query, description = "Inclusive range start (YYYY-MM-DD)"),
        ("end_date" = Option<String>, Query, description = "Inclusive range end (YYYY-MM-DD)")
    ),
    responses((status = 200, description = "Tasks for the current user")),
    tag = "tasks"
)]
pub async fn list_tasks_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Query(query): Query<ListTasksQuery>,
) -> Result<impl IntoResponse, ApiError> {
    // The filter only applies when both ends are present.
    let range = match (query.start_date, query.end_date) {
        (Some(start), Some(end)) => Some((start, end)),
        _ => None,
    };
    let tasks = state.db.list_tasks(user.id, range).await?;
    Ok(Json(tasks))
}

/// POST /tasks - Create a task
#[utoipa::path(
    post,
    path = "/tasks",
    request_body(content_type = "application/json", description = "New task"),
    responses((status = 201, description = "Task created")),
    tag = "tasks"
)]
pub async fn create_task_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(new): Json<NewTask>,
) -> Result<impl IntoResponse, ApiError> {
    let task = state.db.create_task(user.id, new).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// PUT /tasks/{id} - Partially update a task
#[utoipa::path(
    put,
    path = "/tasks/{id}",
    request_body(content_type = "application/json", description = "Task fields to change"),
    responses(
        (status = 200, description = "Updated task"),
        (status = 404, description = "Task not found")
    ),
    tag = "tasks"
)]
pub async fn update_task_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(patch): Json<TaskPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let task = state.db.update_task(user.id, id, patch).await?;
    Ok(Json(task))
}

/// DELETE /tasks/{id} - Delete a task (idempotent)
#[utoipa::path(
    delete,
    path = "/tasks/{id}",
    responses((status = 204, description = "Task deleted or already absent")),
    tag = "tasks"
)]
pub async fn delete_task_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.delete_task(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Recurring Tasks
//=========================================================================================

/// GET /recurring-tasks - List recurring task templates
#[utoipa::path(
    get,
    path = "/recurring-tasks",
    responses((status = 200, description = "Recurring tasks for the current user")),
    tag = "tasks"
)]
pub async fn list_recurring_tasks_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, ApiError> {
    let tasks = state.db.list_recurring_tasks(user.id).await?;
    Ok(Json(tasks))
}

/// POST /recurring-tasks - Create a recurring task template
#[utoipa::path(
    post,
    path = "/recurring-tasks",
    request_body(content_type = "application/json", description = "New recurring task"),
    responses((status = 201, description = "Recurring task created")),
    tag = "tasks"
)]
pub async fn create_recurring_task_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(new): Json<NewRecurringTask>,
) -> Result<impl IntoResponse, ApiError> {
    let task = state.db.create_recurring_task(user.id, new).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// PUT /recurring-tasks/{id} - Partially update a recurring task
#[utoipa::path(
    put,
    path = "/recurring-tasks/{id}",
    request_body(content_type = "application/json", description = "Recurring task fields to change"),
    responses(
        (status = 200, description = "Updated recurring task"),
        (status = 404, description = "Recurring Task not found")
    ),
    tag = "tasks"
)]
pub async fn update_recurring_task_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(patch): Json<RecurringTaskPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let task = state.db.update_recurring_task(user.id, id, patch).await?;
    Ok(Json(task))
}

/// DELETE /recurring-tasks/{id} - Delete a recurring task (idempotent)
#[utoipa::path(
    delete,
    path = "/recurring-tasks/{id}",
    responses((status = 204, description = "Recurring task deleted or already absent")),
    tag = "tasks"
)]
pub async fn delete_recurring_task_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.delete_recurring_task(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Side Quests
//=========================================================================================

/// GET /side-quests - List side quests
#[utoipa::path(
    get,
    path = "/side-quests",
    responses((status = 200, description = "Side quests for the current user")),
    tag = "tasks"
)]
pub async fn list_side_quests_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, ApiError> {
    let quests = state.db.list_side_quests(user.id).await?;
    Ok(Json(quests))
}

/// POST /side-quests - Create a side quest
#[utoipa::path(
    post,
    path = "/side-quests",
    request_body(content_type = "application/json", description = "New side quest"),
    responses((status = 201, description = "Side quest created")),
    tag = "tasks"
)]
pub async fn create_side_quest_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(new): Json<NewSideQuest>,
) -> Result<impl IntoResponse, ApiError> {
    let quest = state.db.create_side_quest(user.id, new).await?;
    Ok((StatusCode::CREATED, Json(quest)))
}

/// PUT /side-quests/{id} - Partially update a side quest
#[utoipa::path(
    put,
    path = "/side-quests/{id}",
    request_body(content_type = "application/json", description = "Side quest fields to change"),
    responses(
        (status = 200, description = "Updated side quest"),
        (status = 404, description = "Side Quest not found")
    ),
    tag = "tasks"
)]
pub async fn update_side_quest_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(patch): Json<SideQuestPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let quest = state.db.update_side_quest(user.id, id, patch).await?;
    Ok(Json(quest))
}

/// DELETE /side-quests/{id} - Delete a side quest (idempotent)
#[utoipa::path(
    delete,
    path = "/side-quests/{id}",
    responses((status = 204, description = "Side quest deleted or already absent")),
    tag = "tasks"
)]
pub async fn delete_side_quest_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.delete_side_quest(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Wish List
//=========================================================================================

/// GET /wish-list - List wishes
#[utoipa::path(
    get,
    path = "/wish-list",
    responses((status = 200, description = "Wish list for the current user")),
    tag = "lists"
)]
pub async fn list_wishes_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, ApiError> {
    let wishes = state.db.list_wishes(user.id).await?;
    Ok(Json(wishes))
}

/// POST /wish-list - Create a wish
#[utoipa::path(
    post,
    path = "/wish-list",
    request_body(content_type = "application/json", description = "New wish"),
    responses((status = 201, description = "Wish created")),
    tag = "lists"
)]
pub async fn create_wish_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(new): Json<NewWish>,
) -> Result<impl IntoResponse, ApiError> {
    let wish = state.db.create_wish(user.id, new).await?;
    Ok((StatusCode::CREATED, Json(wish)))
}

/// PUT /wish-list/{id} - Partially update a wish
#[utoipa::path(
    put,
    path = "/wish-list/{id}",
    request_body(content_type = "application/json", description = "Wish fields to change"),
    responses(
        (status = 200, description = "Updated wish"),
        (status = 404, description = "Wish not found")
    ),
    tag = "lists"
)]
pub async fn update_wish_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(patch): Json<WishPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let wish = state.db.update_wish(user.id, id, patch).await?;
    Ok(Json(wish))
}

/// DELETE /wish-list/{id} - Delete a wish (idempotent)
#[utoipa::path(
    delete,
    path = "/wish-list/{id}",
    responses((status = 204, description = "Wish deleted or already absent")),
    tag = "lists"
)]
pub async fn delete_wish_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.delete_wish(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Core List
//=========================================================================================

/// GET /core-list - List core tasks
#[utoipa::path(
    get,
    path = "/core-list",
    responses((status = 200, description = "Core list for the current user")),
    tag = "lists"
)]
pub async fn list_core_tasks_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, ApiError> {
    let tasks = state.db.list_core_tasks(user.id).await?;
    Ok(Json(tasks))
}

/// POST /core-list - Create a core task
#[utoipa::path(
    post,
    path = "/core-list",
    request_body(content_type = "application/json", description = "New core task"),
    responses((status = 201, description = "Core task created")),
    tag = "lists"
)]
pub async fn create_core_task_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(new): Json<NewCoreTask>,
) -> Result<impl IntoResponse, ApiError> {
    let task = state.db.create_core_task(user.id, new).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// PUT /core-list/{id} - Partially update a core task
#[utoipa::path(
    put,
    path = "/core-list/{id}",
    request_body(content_type = "application/json", description = "Core task fields to change"),
    responses(
        (status = 200, description = "Updated core task"),
        (status = 404, description = "Core Task not found")
    ),
    tag = "lists"
)]
pub async fn update_core_task_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(patch): Json<CoreTaskPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let task = state.db.update_core_task(user.id, id, patch).await?;
    Ok(Json(task))
}

/// DELETE /core-list/{id} - Delete a core task (idempotent)
#[utoipa::path(
    delete,
    path = "/core-list/{id}",
    responses((status = 204, description = "Core task deleted or already absent")),
    tag = "lists"
)]
pub async fn delete_core_task_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.delete_core_task(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
