//! services/api/tests/ai_fallbacks.rs
//!
//! Coaching endpoints: key resolution, the offline fallback for every
//! operation, and the generated path with a scripted gateway.

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use std::sync::Arc;

fn sample_task() -> Value {
    json!({
        "id": "11111111-1111-1111-1111-111111111111",
        "date": "2025-01-06",
        "description": "Run 5 miles",
        "difficulty": "Hard",
        "completed": false,
        "category": "Physical Training",
        "estimatedTime": 45.0
    })
}

fn sample_goal() -> Value {
    json!({
        "id": "22222222-2222-2222-2222-222222222222",
        "description": "Finish an ultra",
        "targetDate": "2025-12-31",
        "label": null,
        "completed": false
    })
}

async fn post_ai(server: &TestServer, token: &str, path: &str, body: &Value) -> Value {
    let response = server.post(path).authorization_bearer(token).json(body).await;
    response.assert_status_ok();
    response.json()
}

#[tokio::test]
async fn every_operation_answers_200_with_its_fallback_when_offline() {
    let server = common::test_server().await;
    let (token, _) = common::register(&server, "david").await;

    let body = post_ai(
        &server,
        &token,
        "/ai/story",
        &json!({"task": sample_task(), "goals": [sample_goal()]}),
    )
    .await;
    assert_eq!(
        body["story"],
        "Stay hard, david. The AI is offline, but you are not."
    );

    let body = post_ai(&server, &token, "/ai/label", &json!({"text": "cold shower"})).await;
    assert_eq!(body["label"], "General");

    let body = post_ai(
        &server,
        &token,
        "/ai/analyze-goal-alignment",
        &json!({"taskDescription": "Run 5 miles", "activeGoals": [sample_goal()]}),
    )
    .await;
    assert_eq!(body["alignmentScore"].as_f64().unwrap(), 5.0);
    assert_eq!(body["justification"], "Analysis failed. Assuming neutral impact.");
    assert!(body["alignedGoalId"].is_null());

    let body = post_ai(
        &server,
        &token,
        "/ai/reflection-feedback",
        &json!({"reflection": "Ready to work.", "goals": []}),
    )
    .await;
    assert_eq!(body["feedback"], "Good morning. Get after it. (Offline)");

    let body = post_ai(
        &server,
        &token,
        "/ai/diary-feedback",
        &json!({
            "debrief": {
                "initialReflection": "Up early.",
                "debriefEntry": "Did the work.",
                "tasks": [{"completed": true}, {"completed": false}],
                "earnings": 3.5
            },
            "goals": []
        }),
    )
    .await;
    assert_eq!(body["feedback"], "Log received. Stay hard.");
    assert_eq!(body["grade"], "N/A");

    let body = post_ai(
        &server,
        &token,
        "/ai/review",
        &json!({"reviewData": {"week": 1}, "goals": [], "sideQuests": []}),
    )
    .await;
    assert_eq!(body["good"][0], "You showed up");
    assert_eq!(body["bad"][0], "Data unavailable");
    assert!(body["suggestions"]["keep"].as_array().unwrap().is_empty());
    assert!(body["suggestions"]["remove"].as_array().unwrap().is_empty());
    assert!(body["suggestions"]["add"].as_array().unwrap().is_empty());

    let body = post_ai(
        &server,
        &token,
        "/ai/goal-change-verdict",
        &json!({"justification": "Injury", "currentGoal": "Marathon"}),
    )
    .await;
    assert_eq!(body["approved"], false);
    assert_eq!(body["feedback"], "System offline. Hold the line.");

    let body = post_ai(
        &server,
        &token,
        "/ai/goal-completion-verdict",
        &json!({"goalDescription": "Marathon", "completionProof": "Finisher medal"}),
    )
    .await;
    assert_eq!(body["approved"], true);
    assert_eq!(body["feedback"], "Logged. (Offline)");

    let body = post_ai(
        &server,
        &token,
        "/ai/atomic-system",
        &json!({"newGoal": sample_goal(), "allGoals": [], "accomplishmentsSummary": {}}),
    )
    .await;
    assert_eq!(body["obvious"][0], "Define the goal clearly");
    assert_eq!(body["attractive"][0], "Visualize success");
    assert_eq!(body["easy"][0], "Start small");
    assert_eq!(body["satisfying"][0], "Track progress");

    let body = post_ai(
        &server,
        &token,
        "/ai/weekly-briefing",
        &json!({"previousWeekEvaluations": [], "nextWeekGoals": [], "longTermGoals": []}),
    )
    .await;
    assert_eq!(body["briefing"], "New week. New war. Get after it.");

    let body = post_ai(
        &server,
        &token,
        "/ai/enhance-text",
        &json!({"text": "go jogging maybe", "type": "task"}),
    )
    .await;
    assert_eq!(body["enhanced_text"], "go jogging maybe");

    let body = post_ai(
        &server,
        &token,
        "/ai/chat",
        &json!({"messages": [{"sender": "user", "content": "I want to quit."}]}),
    )
    .await;
    assert_eq!(body["response"], "Radio silence. (Offline)");

    let body = post_ai(
        &server,
        &token,
        "/ai/contract",
        &json!({"description": "Deadlift 400", "type": "goal"}),
    )
    .await;
    assert_eq!(body["primaryObjective"], "Deadlift 400");
    assert_eq!(body["contractStatement"], "I will not fail.");
    assert_eq!(body["rewardPayout"].as_f64().unwrap(), 100.0);
    assert!(body["kpis"].as_array().unwrap().is_empty());
    assert_eq!(body["fiveWhys"], json!(["Stub", "Stub", "Stub", "Stub", "Stub"]));

    let body = post_ai(
        &server,
        &token,
        "/ai/betting-odds",
        &json!({
            "description": "Run 5 miles",
            "difficulty": "Hard",
            "category": "Physical Training",
            "estimatedTime": 45.0
        }),
    )
    .await;
    assert_eq!(body["multiplier"].as_f64().unwrap(), 2.0);
    assert_eq!(body["rationale"], "Standard risk. Get after it.");

    let body = post_ai(
        &server,
        &token,
        "/ai/evaluate-weekly",
        &json!({"description": "Train 5 days", "completedTasks": [], "purchasedRewards": []}),
    )
    .await;
    assert_eq!(body["alignmentScore"].as_f64().unwrap(), 5.0);
    assert_eq!(body["feedback"], "Evaluation offline. Keep grinding.");
}

#[tokio::test]
async fn missing_key_everywhere_is_a_400_before_any_fallback() {
    let server = common::test_server_with(Arc::new(common::OfflineGateway), None).await;
    let (token, _) = common::register(&server, "david").await;

    let response = server
        .post("/ai/label")
        .authorization_bearer(&token)
        .json(&json!({"text": "cold shower"}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["detail"], "Gemini API Key missing");
}

#[tokio::test]
async fn a_user_key_satisfies_the_resolver_without_a_process_default() {
    let server = common::test_server_with(Arc::new(common::OfflineGateway), None).await;
    common::register(&server, "david").await;

    // Log in again with a personal key, which persists onto the account.
    let response = server
        .post("/auth/login")
        .json(&json!({"username": "david", "password": "hard-pass", "api_key": "my-own-key"}))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    let token = body["token"].as_str().unwrap().to_string();

    let response = server
        .post("/ai/label")
        .authorization_bearer(&token)
        .json(&json!({"text": "cold shower"}))
        .await;
    response.assert_status_ok();
}

#[tokio::test]
async fn generated_replies_pass_through_the_gateway() {
    let gateway = Arc::new(common::CannedGateway {
        text: "Taking souls today.".to_string(),
        json: json!({"approved": true, "feedback": "Roger that."}),
    });
    let server = common::test_server_with(gateway, Some("test-key")).await;
    let (token, _) = common::register(&server, "david").await;

    let response = server
        .post("/ai/reflection-feedback")
        .authorization_bearer(&token)
        .json(&json!({"reflection": "Up at 4am.", "goals": []}))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["feedback"], "Taking souls today.");

    let response = server
        .post("/ai/goal-change-verdict")
        .authorization_bearer(&token)
        .json(&json!({"justification": "Strategic pivot", "currentGoal": "Marathon"}))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["approved"], true);
    assert_eq!(body["feedback"], "Roger that.");
}

#[tokio::test]
async fn coaching_requires_authentication() {
    let server = common::test_server().await;

    let response = server.post("/ai/label").json(&json!({"text": "x"})).await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}
