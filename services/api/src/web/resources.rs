//! services/api/src/web/resources.rs
//!
//! The reward economy and the daily diary: rewards, purchased rewards, the
//! per-owner character ledger, and date-keyed diary entries.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::NaiveDate;
use goggins_core::domain::{Character, NewPurchasedReward, NewReward, User};
use goggins_core::patch::{DiaryEntryPatch, PurchasedRewardPatch, RewardPatch};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::state::AppState;

//=========================================================================================
// Rewards
//=========================================================================================

/// GET /rewards - List the reward catalogue
#[utoipa::path(
    get,
    path = "/rewards",
    responses((status = 200, description = "Rewards for the current user")),
    tag = "resources"
)]
pub async fn list_rewards_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, ApiError> {
    let rewards = state.db.list_rewards(user.id).await?;
    Ok(Json(rewards))
}

/// POST /rewards - Create a reward
#[utoipa::path(
    post,
    path = "/rewards",
    request_body(content_type = "application/json", description = "New reward"),
    responses((status = 201, description = "Reward created")),
    tag = "resources"
)]
pub async fn create_reward_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(new): Json<NewReward>,
) -> Result<impl IntoResponse, ApiError> {
    let reward = state.db.create_reward(user.id, new).await?;
    Ok((StatusCode::CREATED, Json(reward)))
}

/// PUT /rewards/{id} - Partially update a reward
#[utoipa::path(
    put,
    path = "/rewards/{id}",
    request_body(content_type = "application/json", description = "Reward fields to change"),
    responses(
        (status = 200, description = "Updated reward"),
        (status = 404, description = "Reward not found")
    ),
    tag = "resources"
)]
pub async fn update_reward_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(patch): Json<RewardPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let reward = state.db.update_reward(user.id, id, patch).await?;
    Ok(Json(reward))
}

/// DELETE /rewards/{id} - Delete a reward (idempotent)
#[utoipa::path(
    delete,
    path = "/rewards/{id}",
    responses((status = 204, description = "Reward deleted or already absent")),
    tag = "resources"
)]
pub async fn delete_reward_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.delete_reward(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Purchased Rewards
//=========================================================================================

/// GET /purchased-rewards - List purchase receipts
#[utoipa::path(
    get,
    path = "/purchased-rewards",
    responses((status = 200, description = "Purchases for the current user")),
    tag = "resources"
)]
pub async fn list_purchased_rewards_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, ApiError> {
    let purchases = state.db.list_purchased_rewards(user.id).await?;
    Ok(Json(purchases))
}

/// POST /purchased-rewards - Record a purchase
#[utoipa::path(
    post,
    path = "/purchased-rewards",
    request_body(content_type = "application/json", description = "New purchase"),
    responses((status = 201, description = "Purchase recorded")),
    tag = "resources"
)]
pub async fn create_purchased_reward_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(new): Json<NewPurchasedReward>,
) -> Result<impl IntoResponse, ApiError> {
    let purchase = state.db.create_purchased_reward(user.id, new).await?;
    Ok((StatusCode::CREATED, Json(purchase)))
}

/// PUT /purchased-rewards/{id} - Partially update a purchase receipt
#[utoipa::path(
    put,
    path = "/purchased-rewards/{id}",
    request_body(content_type = "application/json", description = "Purchase fields to change"),
    responses(
        (status = 200, description = "Updated purchase"),
        (status = 404, description = "Purchased Reward not found")
    ),
    tag = "resources"
)]
pub async fn update_purchased_reward_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(patch): Json<PurchasedRewardPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let purchase = state.db.update_purchased_reward(user.id, id, patch).await?;
    Ok(Json(purchase))
}

/// DELETE /purchased-rewards/{id} - Delete a purchase receipt (idempotent)
#[utoipa::path(
    delete,
    path = "/purchased-rewards/{id}",
    responses((status = 204, description = "Purchase deleted or already absent")),
    tag = "resources"
)]
pub async fn delete_purchased_reward_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.delete_purchased_reward(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Diary Entries
//=========================================================================================

/// POST body for a diary entry: the date plus whatever fields are being set.
#[derive(Debug, Deserialize)]
pub struct CreateDiaryEntry {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub patch: DiaryEntryPatch,
}

/// GET /diary-entries - List diary entries
#[utoipa::path(
    get,
    path = "/diary-entries",
    responses((status = 200, description = "Diary entries for the current user")),
    tag = "resources"
)]
pub async fn list_diary_entries_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = state.db.list_diary_entries(user.id).await?;
    Ok(Json(entries))
}

/// POST /diary-entries - Create, or merge into the entry for that date
#[utoipa::path(
    post,
    path = "/diary-entries",
    request_body(content_type = "application/json", description = "Entry date plus fields to merge"),
    responses((status = 201, description = "Entry created or merged")),
    tag = "resources"
)]
pub async fn create_diary_entry_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(body): Json<CreateDiaryEntry>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = state
        .db
        .upsert_diary_entry(user.id, body.date, body.patch)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// PUT /diary-entries/{date} - Merge fields into the entry for that date
#[utoipa::path(
    put,
    path = "/diary-entries/{date}",
    request_body(content_type = "application/json", description = "Fields to merge into the entry"),
    responses((status = 200, description = "Entry updated (created if absent)")),
    tag = "resources"
)]
pub async fn update_diary_entry_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(date): Path<NaiveDate>,
    Json(patch): Json<DiaryEntryPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = state.db.upsert_diary_entry(user.id, date, patch).await?;
    Ok(Json(entry))
}

/// DELETE /diary-entries/{date} - Delete the entry for that date (idempotent)
#[utoipa::path(
    delete,
    path = "/diary-entries/{date}",
    responses((status = 204, description = "Entry deleted or already absent")),
    tag = "resources"
)]
pub async fn delete_diary_entry_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(date): Path<NaiveDate>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.delete_diary_entry(user.id, date).await?;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Character
//=========================================================================================

/// GET /character - The owner's ledger, lazily created at zero
#[utoipa::path(
    get,
    path = "/character",
    responses((status = 200, description = "Character ledger")),
    tag = "resources"
)]
pub async fn get_character_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, ApiError> {
    let character = state.db.get_or_create_character(user.id).await?;
    Ok(Json(character))
}

/// PUT /character - Full replacement of both ledger fields
#[utoipa::path(
    put,
    path = "/character",
    request_body(content_type = "application/json", description = "Replacement spent and bonuses"),
    responses((status = 200, description = "Character ledger replaced")),
    tag = "resources"
)]
pub async fn put_character_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(body): Json<Character>,
) -> Result<impl IntoResponse, ApiError> {
    let character = state.db.put_character(user.id, body).await?;
    Ok(Json(character))
}
