//! services/api/tests/crud_api.rs
//!
//! Owner-scoped CRUD behavior over the HTTP surface: partial updates,
//! idempotent deletes, range filters, the diary's find-or-create identity,
//! and the character ledger.

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

fn ids(items: &Value) -> Vec<String> {
    items
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn task_create_list_and_date_range_filter() {
    let server = common::test_server().await;
    let (token, _) = common::register(&server, "david").await;

    for (date, description) in [
        ("2025-01-01", "run"),
        ("2025-01-15", "lift"),
        ("2025-02-01", "swim"),
    ] {
        let response = server
            .post("/tasks")
            .authorization_bearer(&token)
            .json(&json!({
                "date": date,
                "description": description,
                "difficulty": "Hard",
                "category": "Physical Training",
                "estimated_time": 30.0
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
    }

    let response = server.get("/tasks").authorization_bearer(&token).await;
    response.assert_status_ok();
    let all: Value = response.json();
    assert_eq!(all.as_array().unwrap().len(), 3);

    let response = server
        .get("/tasks?start_date=2025-01-01&end_date=2025-01-31")
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    let january: Value = response.json();
    let descriptions: Vec<&str> = january
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["description"].as_str().unwrap())
        .collect();
    assert_eq!(descriptions.len(), 2);
    assert!(descriptions.contains(&"run"));
    assert!(descriptions.contains(&"lift"));
}

#[tokio::test]
async fn task_patch_distinguishes_absent_from_null() {
    let server = common::test_server().await;
    let (token, _) = common::register(&server, "david").await;

    let response = server
        .post("/tasks")
        .authorization_bearer(&token)
        .json(&json!({
            "date": "2025-01-01",
            "description": "run",
            "difficulty": "Hard",
            "category": "Physical Training",
            "estimated_time": 30.0,
            "story": "Carry the boats."
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let task: Value = response.json();
    let id = task["id"].as_str().unwrap();

    // An unrelated update leaves the story alone.
    let response = server
        .put(&format!("/tasks/{id}"))
        .authorization_bearer(&token)
        .json(&json!({"completed": true}))
        .await;
    response.assert_status_ok();
    let updated: Value = response.json();
    assert_eq!(updated["completed"], true);
    assert_eq!(updated["story"], "Carry the boats.");

    // An explicit null clears it.
    let response = server
        .put(&format!("/tasks/{id}"))
        .authorization_bearer(&token)
        .json(&json!({"story": null}))
        .await;
    response.assert_status_ok();
    let cleared: Value = response.json();
    assert!(cleared["story"].is_null());
    assert_eq!(cleared["completed"], true);
}

#[tokio::test]
async fn task_update_of_unknown_id_is_404_and_delete_is_idempotent() {
    let server = common::test_server().await;
    let (token, _) = common::register(&server, "david").await;
    let unknown = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    let response = server
        .put(&format!("/tasks/{unknown}"))
        .authorization_bearer(&token)
        .json(&json!({"completed": true}))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["detail"], "Task not found");

    // Deleting something that does not exist still succeeds.
    let response = server
        .delete(&format!("/tasks/{unknown}"))
        .authorization_bearer(&token)
        .await;
    response.assert_status(StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn tasks_are_isolated_between_users() {
    let server = common::test_server().await;
    let (alice, _) = common::register(&server, "alice").await;
    let (bob, _) = common::register(&server, "bob").await;

    let response = server
        .post("/tasks")
        .authorization_bearer(&alice)
        .json(&json!({
            "date": "2025-01-01",
            "description": "secret mission",
            "difficulty": "Savage",
            "category": "Discipline",
            "estimated_time": 60.0
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let task: Value = response.json();
    let id = task["id"].as_str().unwrap();

    let response = server.get("/tasks").authorization_bearer(&bob).await;
    response.assert_status_ok();
    let bobs: Value = response.json();
    assert!(bobs.as_array().unwrap().is_empty());

    // Bob cannot update Alice's row either.
    let response = server
        .put(&format!("/tasks/{id}"))
        .authorization_bearer(&bob)
        .json(&json!({"completed": true}))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    // And Bob's delete is a no-op against it.
    let response = server
        .delete(&format!("/tasks/{id}"))
        .authorization_bearer(&bob)
        .await;
    response.assert_status(StatusCode::NO_CONTENT);
    let response = server.get("/tasks").authorization_bearer(&alice).await;
    assert_eq!(ids(&response.json()), vec![id.to_string()]);
}

#[tokio::test]
async fn recurring_task_completions_round_trip() {
    let server = common::test_server().await;
    let (token, _) = common::register(&server, "david").await;

    let response = server
        .post("/recurring-tasks")
        .authorization_bearer(&token)
        .json(&json!({
            "description": "morning run",
            "difficulty": "Medium",
            "category": "Physical Training",
            "recurrenceRule": "Daily",
            "startDate": "2025-01-01",
            "estimatedTime": 30.0
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let task: Value = response.json();
    let id = task["id"].as_str().unwrap();

    let response = server
        .put(&format!("/recurring-tasks/{id}"))
        .authorization_bearer(&token)
        .json(&json!({
            "completions": {
                "2025-01-02": {"completed": true, "actualTime": 28.0},
                "2025-01-03": {"completed": false}
            }
        }))
        .await;
    response.assert_status_ok();

    let response = server
        .get("/recurring-tasks")
        .authorization_bearer(&token)
        .await;
    let listed: Value = response.json();
    let completions = &listed[0]["completions"];
    assert_eq!(completions["2025-01-02"]["completed"], true);
    assert_eq!(completions["2025-01-02"]["actualTime"].as_f64().unwrap(), 28.0);
    assert_eq!(completions["2025-01-03"]["completed"], false);
}

#[tokio::test]
async fn goal_keeps_structured_contract_and_system() {
    let server = common::test_server().await;
    let (token, _) = common::register(&server, "david").await;

    let response = server
        .post("/goals")
        .authorization_bearer(&token)
        .json(&json!({
            "description": "Run an ultra",
            "targetDate": "2025-12-31"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let goal: Value = response.json();
    let id = goal["id"].as_str().unwrap();

    let response = server
        .put(&format!("/goals/{id}"))
        .authorization_bearer(&token)
        .json(&json!({
            "system": {
                "obvious": ["lay out shoes"],
                "attractive": ["new playlist"],
                "easy": ["start with 1 mile"],
                "satisfying": ["mark the calendar"]
            },
            "contract": {
                "primaryObjective": "Finish 50 miles",
                "contractStatement": "I will not quit.",
                "rewardPayout": 250.0,
                "kpis": [
                    {"description": "weekly mileage", "type": "Internal Metric", "target": "40"}
                ],
                "preStateAnswers": [],
                "fiveWhys": ["a", "b", "c", "d", "e"]
            }
        }))
        .await;
    response.assert_status_ok();

    let response = server.get("/goals").authorization_bearer(&token).await;
    let goals: Value = response.json();
    let stored = &goals[0];
    assert_eq!(stored["system"]["obvious"][0], "lay out shoes");
    assert_eq!(stored["contract"]["primaryObjective"], "Finish 50 miles");
    assert_eq!(stored["contract"]["kpis"][0]["type"], "Internal Metric");
    assert_eq!(stored["contract"]["fiveWhys"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn diary_post_and_put_merge_into_the_same_date() {
    let server = common::test_server().await;
    let (token, _) = common::register(&server, "david").await;

    let response = server
        .post("/diary-entries")
        .authorization_bearer(&token)
        .json(&json!({
            "date": "2025-03-01",
            "initialReflection": "Woke up ready."
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    // Same date again merges instead of duplicating.
    let response = server
        .post("/diary-entries")
        .authorization_bearer(&token)
        .json(&json!({
            "date": "2025-03-01",
            "debrief": "Got it done."
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let merged: Value = response.json();
    assert_eq!(merged["initial_reflection"], "Woke up ready.");
    assert_eq!(merged["debrief"], "Got it done.");

    let response = server
        .put("/diary-entries/2025-03-01")
        .authorization_bearer(&token)
        .json(&json!({"grade": "A"}))
        .await;
    response.assert_status_ok();

    let response = server
        .get("/diary-entries")
        .authorization_bearer(&token)
        .await;
    let entries: Value = response.json();
    assert_eq!(entries.as_array().unwrap().len(), 1);
    assert_eq!(entries[0]["grade"], "A");
    assert_eq!(entries[0]["initial_reflection"], "Woke up ready.");

    let response = server
        .delete("/diary-entries/2025-03-01")
        .authorization_bearer(&token)
        .await;
    response.assert_status(StatusCode::NO_CONTENT);
    let response = server
        .delete("/diary-entries/2025-03-01")
        .authorization_bearer(&token)
        .await;
    response.assert_status(StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn put_to_an_absent_diary_date_creates_it() {
    let server = common::test_server().await;
    let (token, _) = common::register(&server, "david").await;

    let response = server
        .put("/diary-entries/2025-04-01")
        .authorization_bearer(&token)
        .json(&json!({"final_feedback": "Stay hard."}))
        .await;
    response.assert_status_ok();
    let entry: Value = response.json();
    assert_eq!(entry["date"], "2025-04-01");
    assert_eq!(entry["final_feedback"], "Stay hard.");
}

#[tokio::test]
async fn character_put_is_a_full_replace() {
    let server = common::test_server().await;
    let (token, _) = common::register(&server, "david").await;

    let response = server
        .put("/character")
        .authorization_bearer(&token)
        .json(&json!({"spent": 12.5, "bonuses": 40.0}))
        .await;
    response.assert_status_ok();

    let response = server.get("/character").authorization_bearer(&token).await;
    let character: Value = response.json();
    assert_eq!(character["spent"].as_f64().unwrap(), 12.5);
    assert_eq!(character["bonuses"].as_f64().unwrap(), 40.0);
}

#[tokio::test]
async fn reward_lifecycle_with_purchase_receipt() {
    let server = common::test_server().await;
    let (token, _) = common::register(&server, "david").await;

    let response = server
        .post("/rewards")
        .authorization_bearer(&token)
        .json(&json!({"name": "Cheat meal", "cost": 3.0}))
        .await;
    response.assert_status(StatusCode::CREATED);
    let reward: Value = response.json();
    let reward_id = reward["id"].as_str().unwrap();

    let response = server
        .put(&format!("/rewards/{reward_id}"))
        .authorization_bearer(&token)
        .json(&json!({"cost": 4.5}))
        .await;
    response.assert_status_ok();
    let updated: Value = response.json();
    assert_eq!(updated["name"], "Cheat meal");
    assert_eq!(updated["cost"].as_f64().unwrap(), 4.5);

    let response = server
        .post("/purchased-rewards")
        .authorization_bearer(&token)
        .json(&json!({
            "rewardId": reward_id,
            "name": "Cheat meal",
            "cost": 4.5,
            "purchaseDate": "2025-05-01"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let response = server
        .get("/purchased-rewards")
        .authorization_bearer(&token)
        .await;
    let purchases: Value = response.json();
    assert_eq!(purchases.as_array().unwrap().len(), 1);
    assert_eq!(purchases[0]["reward_id"], reward_id);
    assert_eq!(purchases[0]["purchase_date"], "2025-05-01");
}

#[tokio::test]
async fn wish_and_core_lists_support_the_full_verb_set() {
    let server = common::test_server().await;
    let (token, _) = common::register(&server, "david").await;

    for path in ["/wish-list", "/core-list"] {
        let response = server
            .post(path)
            .authorization_bearer(&token)
            .json(&json!({"description": "own a cabin", "label": "Someday"}))
            .await;
        response.assert_status(StatusCode::CREATED);
        let item: Value = response.json();
        let id = item["id"].as_str().unwrap();

        let response = server
            .put(&format!("{path}/{id}"))
            .authorization_bearer(&token)
            .json(&json!({"explanation": "space to think", "label": null}))
            .await;
        response.assert_status_ok();
        let updated: Value = response.json();
        assert_eq!(updated["explanation"], "space to think");
        assert!(updated["label"].is_null());

        let response = server
            .delete(&format!("{path}/{id}"))
            .authorization_bearer(&token)
            .await;
        response.assert_status(StatusCode::NO_CONTENT);

        let response = server.get(path).authorization_bearer(&token).await;
        let listed: Value = response.json();
        assert!(listed.as_array().unwrap().is_empty());
    }
}

#[tokio::test]
async fn side_quest_counts_accumulate_by_date() {
    let server = common::test_server().await;
    let (token, _) = common::register(&server, "david").await;

    let response = server
        .post("/side-quests")
        .authorization_bearer(&token)
        .json(&json!({
            "description": "pushups",
            "difficulty": "Easy",
            "dailyGoal": 100
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let quest: Value = response.json();
    let id = quest["id"].as_str().unwrap();

    let response = server
        .put(&format!("/side-quests/{id}"))
        .authorization_bearer(&token)
        .json(&json!({"completions": {"2025-01-01": 40, "2025-01-02": 100}}))
        .await;
    response.assert_status_ok();
    let updated: Value = response.json();
    assert_eq!(updated["completions"]["2025-01-01"], 40);
    assert_eq!(updated["completions"]["2025-01-02"], 100);
    assert_eq!(updated["daily_goal"], 100);
}
