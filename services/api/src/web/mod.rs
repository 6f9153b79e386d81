//! services/api/src/web/mod.rs
//!
//! HTTP surface: routing, auth middleware, and the handler modules.

pub mod ai;
pub mod auth;
pub mod goals;
pub mod middleware;
pub mod resources;
pub mod state;
pub mod tasks;

use axum::{
    http::Method,
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register_handler,
        auth::login_handler,
        auth::me_handler,
        auth::update_me_handler,
        tasks::list_tasks_handler,
        tasks::create_task_handler,
        tasks::update_task_handler,
        tasks::delete_task_handler,
        tasks::list_recurring_tasks_handler,
        tasks::create_recurring_task_handler,
        tasks::update_recurring_task_handler,
        tasks::delete_recurring_task_handler,
        tasks::list_side_quests_handler,
        tasks::create_side_quest_handler,
        tasks::update_side_quest_handler,
        tasks::delete_side_quest_handler,
        tasks::list_wishes_handler,
        tasks::create_wish_handler,
        tasks::update_wish_handler,
        tasks::delete_wish_handler,
        tasks::list_core_tasks_handler,
        tasks::create_core_task_handler,
        tasks::update_core_task_handler,
        tasks::delete_core_task_handler,
        goals::list_goals_handler,
        goals::create_goal_handler,
        goals::update_goal_handler,
        goals::delete_goal_handler,
        goals::list_weekly_goals_handler,
        goals::create_weekly_goal_handler,
        goals::update_weekly_goal_handler,
        goals::delete_weekly_goal_handler,
        resources::list_rewards_handler,
        resources::create_reward_handler,
        resources::update_reward_handler,
        resources::delete_reward_handler,
        resources::list_purchased_rewards_handler,
        resources::create_purchased_reward_handler,
        resources::update_purchased_reward_handler,
        resources::delete_purchased_reward_handler,
        resources::list_diary_entries_handler,
        resources::create_diary_entry_handler,
        resources::update_diary_entry_handler,
        resources::delete_diary_entry_handler,
        resources::get_character_handler,
        resources::put_character_handler,
        ai::story_handler,
        ai::label_handler,
        ai::analyze_goal_alignment_handler,
        ai::reflection_feedback_handler,
        ai::diary_feedback_handler,
        ai::review_handler,
        ai::goal_change_verdict_handler,
        ai::goal_completion_verdict_handler,
        ai::atomic_system_handler,
        ai::weekly_briefing_handler,
        ai::enhance_text_handler,
        ai::chat_handler,
        ai::contract_handler,
        ai::betting_odds_handler,
        ai::evaluate_weekly_handler,
    ),
    components(schemas(
        auth::RegisterRequest,
        auth::LoginRequest,
        auth::AuthResponse,
        auth::UserProfile,
        auth::UpdateMeRequest,
    ))
)]
pub struct ApiDoc;

/// GET / - Liveness greeting
async fn root_handler() -> impl IntoResponse {
    Json(json!({"message": "Welcome to the Goggins Habit Tracker API. Stay Hard!"}))
}

/// Builds the complete application router over a shared state. Used by both
/// the binary and the integration tests.
pub fn app(state: Arc<AppState>) -> Router {
    // The frontend may be served from anywhere, so CORS is wide open.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    let public_routes = Router::new()
        .route("/", get(root_handler))
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/login", post(auth::login_handler));

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me_handler).put(auth::update_me_handler))
        // Tasks
        .route(
            "/tasks",
            get(tasks::list_tasks_handler).post(tasks::create_task_handler),
        )
        .route(
            "/tasks/{id}",
            put(tasks::update_task_handler).delete(tasks::delete_task_handler),
        )
        // Recurring tasks
        .route(
            "/recurring-tasks",
            get(tasks::list_recurring_tasks_handler).post(tasks::create_recurring_task_handler),
        )
        .route(
            "/recurring-tasks/{id}",
            put(tasks::update_recurring_task_handler)
                .delete(tasks::delete_recurring_task_handler),
        )
        // Side quests
        .route(
            "/side-quests",
            get(tasks::list_side_quests_handler).post(tasks::create_side_quest_handler),
        )
        .route(
            "/side-quests/{id}",
            put(tasks::update_side_quest_handler).delete(tasks::delete_side_quest_handler),
        )
        // Wish and core lists
        .route(
            "/wish-list",
            get(tasks::list_wishes_handler).post(tasks::create_wish_handler),
        )
        .route(
            "/wish-list/{id}",
            put(tasks::update_wish_handler).delete(tasks::delete_wish_handler),
        )
        .route(
            "/core-list",
            get(tasks::list_core_tasks_handler).post(tasks::create_core_task_handler),
        )
        .route(
            "/core-list/{id}",
            put(tasks::update_core_task_handler).delete(tasks::delete_core_task_handler),
        )
        // Goals
        .route(
            "/goals",
            get(goals::list_goals_handler).post(goals::create_goal_handler),
        )
        .route(
            "/goals/{id}",
            put(goals::update_goal_handler).delete(goals::delete_goal_handler),
        )
        .route(
            "/weekly-goals",
            get(goals::list_weekly_goals_handler).post(goals::create_weekly_goal_handler),
        )
        .route(
            "/weekly-goals/{id}",
            put(goals::update_weekly_goal_handler).delete(goals::delete_weekly_goal_handler),
        )
        // Rewards and purchases
        .route(
            "/rewards",
            get(resources::list_rewards_handler).post(resources::create_reward_handler),
        )
        .route(
            "/rewards/{id}",
            put(resources::update_reward_handler).delete(resources::delete_reward_handler),
        )
        .route(
            "/purchased-rewards",
            get(resources::list_purchased_rewards_handler)
                .post(resources::create_purchased_reward_handler),
        )
        .route(
            "/purchased-rewards/{id}",
            put(resources::update_purchased_reward_handler)
                .delete(resources::delete_purchased_reward_handler),
        )
        // Diary and character
        .route(
            "/diary-entries",
            get(resources::list_diary_entries_handler)
                .post(resources::create_diary_entry_handler),
        )
        .route(
            "/diary-entries/{date}",
            put(resources::update_diary_entry_handler)
                .delete(resources::delete_diary_entry_handler),
        )
        .route(
            "/character",
            get(resources::get_character_handler).put(resources::put_character_handler),
        )
        // Coaching
        .route("/ai/story", post(ai::story_handler))
        .route("/ai/label", post(ai::label_handler))
        .route(
            "/ai/analyze-goal-alignment",
            post(ai::analyze_goal_alignment_handler),
        )
        .route("/ai/reflection-feedback", post(ai::reflection_feedback_handler))
        .route("/ai/diary-feedback", post(ai::diary_feedback_handler))
        .route("/ai/review", post(ai::review_handler))
        .route("/ai/goal-change-verdict", post(ai::goal_change_verdict_handler))
        .route(
            "/ai/goal-completion-verdict",
            post(ai::goal_completion_verdict_handler),
        )
        .route("/ai/atomic-system", post(ai::atomic_system_handler))
        .route("/ai/weekly-briefing", post(ai::weekly_briefing_handler))
        .route("/ai/enhance-text", post(ai::enhance_text_handler))
        .route("/ai/chat", post(ai::chat_handler))
        .route("/ai/contract", post(ai::contract_handler))
        .route("/ai/betting-odds", post(ai::betting_odds_handler))
        .route("/ai/evaluate-weekly", post(ai::evaluate_weekly_handler))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .with_state(state);

    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
