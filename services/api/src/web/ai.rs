//! services/api/src/web/ai.rs
//!
//! Coaching endpoints. Each handler resolves a Gemini key first (the user's
//! own key wins over the process default; neither present is a 400), then
//! asks the coach. The coach never fails past that point: if the model is
//! unreachable the handler still answers 200 with the canned fallback.

use axum::{extract::State, response::IntoResponse, Extension, Json};
use goggins_core::domain::User;
use std::sync::Arc;

use crate::coach::{
    AlignmentRequest, AtomicSystemRequest, BettingOddsRequest, ChatRequest, ContractRequest,
    DiaryFeedbackRequest, EnhanceTextRequest, EvaluateWeeklyRequest, GoalChangeRequest,
    GoalCompletionRequest, LabelRequest, ReflectionRequest, ReviewRequest, StoryRequest,
    WeeklyBriefingRequest,
};
use crate::error::ApiError;
use crate::web::state::AppState;

fn resolve_key(state: &AppState, user: &User) -> Result<String, ApiError> {
    user.api_key
        .clone()
        .or_else(|| state.config.gemini_api_key.clone())
        .ok_or(ApiError::MissingApiKey)
}

/// POST /ai/story - Motivational micro-story for a task
#[utoipa::path(
    post,
    path = "/ai/story",
    request_body(content_type = "application/json", description = "Task and goal context for the story"),
    responses(
        (status = 200, description = "Story (generated or fallback)"),
        (status = 400, description = "Gemini API Key missing")
    ),
    tag = "ai"
)]
pub async fn story_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(request): Json<StoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let key = resolve_key(&state, &user)?;
    let reply = state.coach.story(&key, &user.username, request).await;
    Ok(Json(reply.into_inner()))
}

/// POST /ai/label - Classify free text into a category
#[utoipa::path(
    post,
    path = "/ai/label",
    request_body(content_type = "application/json", description = "Text to classify"),
    responses(
        (status = 200, description = "Label (generated or fallback)"),
        (status = 400, description = "Gemini API Key missing")
    ),
    tag = "ai"
)]
pub async fn label_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(request): Json<LabelRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let key = resolve_key(&state, &user)?;
    let reply = state.coach.label(&key, request).await;
    Ok(Json(reply.into_inner()))
}

/// POST /ai/analyze-goal-alignment - Score a task against active goals
#[utoipa::path(
    post,
    path = "/ai/analyze-goal-alignment",
    request_body(content_type = "application/json", description = "Task description and active goals"),
    responses(
        (status = 200, description = "Alignment verdict (generated or fallback)"),
        (status = 400, description = "Gemini API Key missing")
    ),
    tag = "ai"
)]
pub async fn analyze_goal_alignment_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(request): Json<AlignmentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let key = resolve_key(&state, &user)?;
    let reply = state.coach.analyze_goal_alignment(&key, request).await;
    Ok(Json(reply.into_inner()))
}

/// POST /ai/reflection-feedback - Feedback on a morning reflection
#[utoipa::path(
    post,
    path = "/ai/reflection-feedback",
    request_body(content_type = "application/json", description = "Morning reflection"),
    responses(
        (status = 200, description = "Feedback (generated or fallback)"),
        (status = 400, description = "Gemini API Key missing")
    ),
    tag = "ai"
)]
pub async fn reflection_feedback_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(request): Json<ReflectionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let key = resolve_key(&state, &user)?;
    let reply = state.coach.reflection_feedback(&key, request).await;
    Ok(Json(reply.into_inner()))
}

/// POST /ai/diary-feedback - Grade a daily debrief
#[utoipa::path(
    post,
    path = "/ai/diary-feedback",
    request_body(content_type = "application/json", description = "Daily debrief report"),
    responses(
        (status = 200, description = "Verdict (generated or fallback)"),
        (status = 400, description = "Gemini API Key missing")
    ),
    tag = "ai"
)]
pub async fn diary_feedback_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(request): Json<DiaryFeedbackRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let key = resolve_key(&state, &user)?;
    let reply = state.coach.diary_feedback(&key, request).await;
    Ok(Json(reply.into_inner()))
}

/// POST /ai/review - Structured performance review
#[utoipa::path(
    post,
    path = "/ai/review",
    request_body(content_type = "application/json", description = "Review data, goals, and side quests"),
    responses(
        (status = 200, description = "Review report (generated or fallback)"),
        (status = 400, description = "Gemini API Key missing")
    ),
    tag = "ai"
)]
pub async fn review_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(request): Json<ReviewRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let key = resolve_key(&state, &user)?;
    let reply = state.coach.review(&key, request).await;
    Ok(Json(reply.into_inner()))
}

/// POST /ai/goal-change-verdict - Judge a goal-change justification
#[utoipa::path(
    post,
    path = "/ai/goal-change-verdict",
    request_body(content_type = "application/json", description = "Goal change justification"),
    responses(
        (status = 200, description = "Verdict (generated or fallback)"),
        (status = 400, description = "Gemini API Key missing")
    ),
    tag = "ai"
)]
pub async fn goal_change_verdict_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(request): Json<GoalChangeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let key = resolve_key(&state, &user)?;
    let reply = state.coach.goal_change_verdict(&key, request).await;
    Ok(Json(reply.into_inner()))
}

/// POST /ai/goal-completion-verdict - Judge a completion claim
#[utoipa::path(
    post,
    path = "/ai/goal-completion-verdict",
    request_body(content_type = "application/json", description = "Goal completion claim"),
    responses(
        (status = 200, description = "Verdict (generated or fallback)"),
        (status = 400, description = "Gemini API Key missing")
    ),
    tag = "ai"
)]
pub async fn goal_completion_verdict_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(request): Json<GoalCompletionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let key = resolve_key(&state, &user)?;
    let reply = state.coach.goal_completion_verdict(&key, request).await;
    Ok(Json(reply.into_inner()))
}

/// POST /ai/atomic-system - Atomic Habits suggestions for a new goal
#[utoipa::path(
    post,
    path = "/ai/atomic-system",
    request_body(content_type = "application/json", description = "New goal and surrounding context"),
    responses(
        (status = 200, description = "Suggestions (generated or fallback)"),
        (status = 400, description = "Gemini API Key missing")
    ),
    tag = "ai"
)]
pub async fn atomic_system_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(request): Json<AtomicSystemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let key = resolve_key(&state, &user)?;
    let reply = state.coach.atomic_system(&key, request).await;
    Ok(Json(reply.into_inner()))
}

/// POST /ai/weekly-briefing - Briefing for the week ahead
#[utoipa::path(
    post,
    path = "/ai/weekly-briefing",
    request_body(content_type = "application/json", description = "Plans for the week ahead"),
    responses(
        (status = 200, description = "Briefing (generated or fallback)"),
        (status = 400, description = "Gemini API Key missing")
    ),
    tag = "ai"
)]
pub async fn weekly_briefing_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(request): Json<WeeklyBriefingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let key = resolve_key(&state, &user)?;
    let reply = state.coach.weekly_briefing(&key, &user.username, request).await;
    Ok(Json(reply.into_inner()))
}

/// POST /ai/enhance-text - Rewrite text in the coach's voice
#[utoipa::path(
    post,
    path = "/ai/enhance-text",
    request_body(content_type = "application/json", description = "Text to rewrite"),
    responses(
        (status = 200, description = "Rewritten text (or the input, offline)"),
        (status = 400, description = "Gemini API Key missing")
    ),
    tag = "ai"
)]
pub async fn enhance_text_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(request): Json<EnhanceTextRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let key = resolve_key(&state, &user)?;
    let reply = state.coach.enhance_text(&key, request).await;
    Ok(Json(reply.into_inner()))
}

/// POST /ai/chat - Free-form conversation with the coach
#[utoipa::path(
    post,
    path = "/ai/chat",
    request_body(content_type = "application/json", description = "Conversation history"),
    responses(
        (status = 200, description = "Chat reply (generated or fallback)"),
        (status = 400, description = "Gemini API Key missing")
    ),
    tag = "ai"
)]
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(request): Json<ChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let key = resolve_key(&state, &user)?;
    let reply = state.coach.chat(&key, &user.username, request).await;
    Ok(Json(reply.into_inner()))
}

/// POST /ai/contract - Draft a goal contract
#[utoipa::path(
    post,
    path = "/ai/contract",
    request_body(content_type = "application/json", description = "Goal description"),
    responses(
        (status = 200, description = "Contract (generated or fallback)"),
        (status = 400, description = "Gemini API Key missing")
    ),
    tag = "ai"
)]
pub async fn contract_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(request): Json<ContractRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let key = resolve_key(&state, &user)?;
    let reply = state.coach.contract(&key, request).await;
    Ok(Json(reply.into_inner()))
}

/// POST /ai/betting-odds - Odds for a task bet
#[utoipa::path(
    post,
    path = "/ai/betting-odds",
    request_body(content_type = "application/json", description = "Task details for the bet"),
    responses(
        (status = 200, description = "Odds (generated or fallback)"),
        (status = 400, description = "Gemini API Key missing")
    ),
    tag = "ai"
)]
pub async fn betting_odds_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(request): Json<BettingOddsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let key = resolve_key(&state, &user)?;
    let reply = state.coach.betting_odds(&key, request).await;
    Ok(Json(reply.into_inner()))
}

/// POST /ai/evaluate-weekly - Score a finished weekly goal
#[utoipa::path(
    post,
    path = "/ai/evaluate-weekly",
    request_body(content_type = "application/json", description = "Weekly goal and week activity"),
    responses(
        (status = 200, description = "Evaluation (generated or fallback)"),
        (status = 400, description = "Gemini API Key missing")
    ),
    tag = "ai"
)]
pub async fn evaluate_weekly_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(request): Json<EvaluateWeeklyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let key = resolve_key(&state, &user)?;
    let reply = state.coach.evaluate_weekly(&key, request).await;
    Ok(Json(reply.into_inner()))
}
