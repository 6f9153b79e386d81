//! services/api/src/coach/types.rs
//!
//! Request and reply shapes for the coach operations. Requests arrive from
//! the frontend in camelCase; structured replies go back out in camelCase
//! too, matching what the model is asked to produce.

use goggins_core::domain::{
    Difficulty, Goal, SideQuest, Task, WeeklyGoal, WeeklyGoalEvaluation,
};
use serde::{Deserialize, Serialize};

//=========================================================================================
// Requests
//=========================================================================================

#[derive(Debug, Deserialize)]
pub struct StoryRequest {
    pub task: Task,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub justification: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LabelRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct AlignmentRequest {
    #[serde(alias = "taskDescription")]
    pub task_description: String,
    #[serde(default, alias = "activeGoals")]
    pub active_goals: Vec<Goal>,
}

#[derive(Debug, Deserialize)]
pub struct ReflectionRequest {
    pub reflection: String,
    #[serde(default)]
    pub goals: Vec<Goal>,
}

/// Free-form day summary assembled by the frontend. Only the fields the
/// prompt cares about are typed; anything else is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct DebriefReport {
    #[serde(default, alias = "initialReflection")]
    pub initial_reflection: Option<String>,
    #[serde(default, alias = "debriefEntry")]
    pub debrief_entry: Option<String>,
    #[serde(default)]
    pub tasks: Vec<DebriefTask>,
    #[serde(default)]
    pub earnings: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DebriefTask {
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Deserialize)]
pub struct DiaryFeedbackRequest {
    #[serde(default)]
    pub debrief: DebriefReport,
    #[serde(default)]
    pub goals: Vec<Goal>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    #[serde(default, alias = "reviewData")]
    pub review_data: serde_json::Value,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default, alias = "sideQuests")]
    pub side_quests: Vec<SideQuest>,
}

#[derive(Debug, Deserialize)]
pub struct GoalChangeRequest {
    pub justification: String,
    #[serde(alias = "currentGoal")]
    pub current_goal: String,
}

#[derive(Debug, Deserialize)]
pub struct GoalCompletionRequest {
    #[serde(alias = "goalDescription")]
    pub goal_description: String,
    #[serde(alias = "completionProof")]
    pub completion_proof: String,
}

#[derive(Debug, Deserialize)]
pub struct AtomicSystemRequest {
    #[serde(alias = "newGoal")]
    pub new_goal: Goal,
    #[serde(default, alias = "allGoals")]
    pub all_goals: Vec<Goal>,
    #[serde(default, alias = "accomplishmentsSummary")]
    pub accomplishments_summary: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct WeeklyBriefingRequest {
    #[serde(default, alias = "previousWeekEvaluations")]
    pub previous_week_evaluations: Vec<WeeklyGoalEvaluation>,
    #[serde(default, alias = "nextWeekGoals")]
    pub next_week_goals: Vec<WeeklyGoal>,
    #[serde(default, alias = "longTermGoals")]
    pub long_term_goals: Vec<Goal>,
}

#[derive(Debug, Deserialize)]
pub struct EnhanceTextRequest {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

fn default_contract_kind() -> String {
    "goal".to_string()
}

#[derive(Debug, Deserialize)]
pub struct ContractRequest {
    pub description: String,
    #[serde(rename = "type", default = "default_contract_kind")]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
pub struct BettingOddsRequest {
    pub description: String,
    pub difficulty: Difficulty,
    pub category: String,
    #[serde(alias = "estimatedTime")]
    pub estimated_time: f64,
    #[serde(default)]
    pub context: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateWeeklyRequest {
    pub description: String,
    #[serde(default, alias = "completedTasks")]
    pub completed_tasks: Vec<serde_json::Value>,
    #[serde(default, alias = "purchasedRewards")]
    pub purchased_rewards: Vec<serde_json::Value>,
}

//=========================================================================================
// Replies
//=========================================================================================

#[derive(Debug, Serialize)]
pub struct StoryReply {
    pub story: String,
}

#[derive(Debug, Serialize)]
pub struct LabelReply {
    pub label: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentVerdict {
    pub alignment_score: f64,
    pub justification: String,
    pub aligned_goal_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FeedbackReply {
    pub feedback: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DiaryVerdict {
    pub feedback: String,
    pub grade: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewSuggestions {
    pub keep: Vec<String>,
    pub remove: Vec<String>,
    pub add: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewReport {
    pub good: Vec<String>,
    pub bad: Vec<String>,
    pub suggestions: ReviewSuggestions,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Verdict {
    pub approved: bool,
    pub feedback: String,
}

#[derive(Debug, Serialize)]
pub struct BriefingReply {
    pub briefing: String,
}

#[derive(Debug, Serialize)]
pub struct EnhanceReply {
    pub enhanced_text: String,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub response: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BettingOdds {
    pub multiplier: f64,
    pub rationale: String,
}
