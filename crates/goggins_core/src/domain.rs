//! crates/goggins_core/src/domain.rs
//!
//! Defines the core data structures for the habit tracker.
//! These structs are independent of any database; serde attributes describe
//! the JSON wire shape (snake_case fields, with the legacy camelCase
//! spellings accepted on input via aliases).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

//=========================================================================================
// Enums
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Savage,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Savage => "Savage",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Easy" => Ok(Difficulty::Easy),
            "Medium" => Ok(Difficulty::Medium),
            "Hard" => Ok(Difficulty::Hard),
            "Savage" => Ok(Difficulty::Savage),
            other => Err(format!("unknown difficulty '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecurrenceRule {
    Daily,
    Weekly,
    Weekdays,
    Weekends,
    None,
}

impl RecurrenceRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurrenceRule::Daily => "Daily",
            RecurrenceRule::Weekly => "Weekly",
            RecurrenceRule::Weekdays => "Weekdays",
            RecurrenceRule::Weekends => "Weekends",
            RecurrenceRule::None => "None",
        }
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecurrenceRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Daily" => Ok(RecurrenceRule::Daily),
            "Weekly" => Ok(RecurrenceRule::Weekly),
            "Weekdays" => Ok(RecurrenceRule::Weekdays),
            "Weekends" => Ok(RecurrenceRule::Weekends),
            "None" => Ok(RecurrenceRule::None),
            other => Err(format!("unknown recurrence rule '{}'", other)),
        }
    }
}

/// KPI classification used inside a goal contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalKind {
    #[serde(rename = "Internal Metric")]
    InternalMetric,
    #[serde(rename = "External Metric")]
    ExternalMetric,
}

//=========================================================================================
// Users
//=========================================================================================

/// Represents a user - used throughout the app. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(alias = "apiKey")]
    pub api_key: Option<String>,
}

/// Only used internally for login/registration - contains sensitive data.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub id: Uuid,
    pub username: String,
    pub password_hash: Option<String>,
    pub api_key: Option<String>,
}

impl UserCredentials {
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            api_key: self.api_key,
        }
    }
}

//=========================================================================================
// Character (1:1 with User)
//=========================================================================================

/// The per-user points ledger. Keyed by the owning user, so the struct itself
/// only carries the two numeric fields the API exposes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Character {
    #[serde(default)]
    pub spent: f64,
    #[serde(default)]
    pub bonuses: f64,
}

impl Character {
    pub fn zero() -> Self {
        Self {
            spent: 0.0,
            bonuses: 0.0,
        }
    }
}

//=========================================================================================
// Tasks
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    pub difficulty: Difficulty,
    pub completed: bool,
    pub category: String,
    #[serde(alias = "estimatedTime")]
    pub estimated_time: f64,
    #[serde(alias = "actualTime")]
    pub actual_time: Option<f64>,
    pub story: Option<String>,
    #[serde(alias = "recurringMasterId")]
    pub recurring_master_id: Option<Uuid>,
    #[serde(alias = "goalAlignment")]
    pub goal_alignment: Option<f64>,
    #[serde(alias = "alignedGoalId")]
    pub aligned_goal_id: Option<Uuid>,
    pub justification: Option<String>,
    pub time: Option<String>,
    #[serde(alias = "betAmount")]
    pub bet_amount: Option<f64>,
    #[serde(alias = "betMultiplier")]
    pub bet_multiplier: Option<f64>,
    #[serde(alias = "betPlaced")]
    pub bet_placed: Option<bool>,
    #[serde(alias = "betWon")]
    pub bet_won: Option<bool>,
    #[serde(alias = "recurrenceRule")]
    pub recurrence_rule: Option<RecurrenceRule>,
}

/// Payload for creating a task; the server assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub date: NaiveDate,
    pub description: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub completed: bool,
    pub category: String,
    #[serde(alias = "estimatedTime")]
    pub estimated_time: f64,
    #[serde(default, alias = "actualTime")]
    pub actual_time: Option<f64>,
    #[serde(default)]
    pub story: Option<String>,
    #[serde(default, alias = "recurringMasterId")]
    pub recurring_master_id: Option<Uuid>,
    #[serde(default, alias = "goalAlignment")]
    pub goal_alignment: Option<f64>,
    #[serde(default, alias = "alignedGoalId")]
    pub aligned_goal_id: Option<Uuid>,
    #[serde(default)]
    pub justification: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default, alias = "betAmount")]
    pub bet_amount: Option<f64>,
    #[serde(default, alias = "betMultiplier")]
    pub bet_multiplier: Option<f64>,
    #[serde(default, alias = "betPlaced")]
    pub bet_placed: Option<bool>,
    #[serde(default, alias = "betWon")]
    pub bet_won: Option<bool>,
    #[serde(default, alias = "recurrenceRule")]
    pub recurrence_rule: Option<RecurrenceRule>,
}

impl NewTask {
    /// Materializes a full task with a server-assigned id.
    pub fn into_task(self, id: Uuid) -> Task {
        Task {
            id,
            date: self.date,
            description: self.description,
            difficulty: self.difficulty,
            completed: self.completed,
            category: self.category,
            estimated_time: self.estimated_time,
            actual_time: self.actual_time,
            story: self.story,
            recurring_master_id: self.recurring_master_id,
            goal_alignment: self.goal_alignment,
            aligned_goal_id: self.aligned_goal_id,
            justification: self.justification,
            time: self.time,
            bet_amount: self.bet_amount,
            bet_multiplier: self.bet_multiplier,
            bet_placed: self.bet_placed,
            bet_won: self.bet_won,
            recurrence_rule: self.recurrence_rule,
        }
    }
}

//=========================================================================================
// Recurring Tasks
//=========================================================================================

/// One day's completion record under a recurring-task template. The shape the
/// frontend has always written into the (previously schema-less) blob.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringCompletion {
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub actual_time: Option<f64>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub bet_placed: Option<bool>,
    #[serde(default)]
    pub bet_amount: Option<f64>,
    #[serde(default)]
    pub bet_multiplier: Option<f64>,
    #[serde(default)]
    pub bet_won: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringTask {
    pub id: Uuid,
    pub description: String,
    pub difficulty: Difficulty,
    pub category: String,
    #[serde(alias = "recurrenceRule")]
    pub recurrence_rule: RecurrenceRule,
    #[serde(alias = "startDate")]
    pub start_date: NaiveDate,
    #[serde(alias = "estimatedTime")]
    pub estimated_time: f64,
    #[serde(alias = "goalAlignment")]
    pub goal_alignment: Option<f64>,
    #[serde(alias = "alignedGoalId")]
    pub aligned_goal_id: Option<Uuid>,
    pub justification: Option<String>,
    pub time: Option<String>,
    #[serde(default)]
    pub completions: BTreeMap<NaiveDate, RecurringCompletion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecurringTask {
    pub description: String,
    pub difficulty: Difficulty,
    pub category: String,
    #[serde(alias = "recurrenceRule")]
    pub recurrence_rule: RecurrenceRule,
    #[serde(alias = "startDate")]
    pub start_date: NaiveDate,
    #[serde(alias = "estimatedTime")]
    pub estimated_time: f64,
    #[serde(default, alias = "goalAlignment")]
    pub goal_alignment: Option<f64>,
    #[serde(default, alias = "alignedGoalId")]
    pub aligned_goal_id: Option<Uuid>,
    #[serde(default)]
    pub justification: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub completions: BTreeMap<NaiveDate, RecurringCompletion>,
}

impl NewRecurringTask {
    pub fn into_recurring_task(self, id: Uuid) -> RecurringTask {
        RecurringTask {
            id,
            description: self.description,
            difficulty: self.difficulty,
            category: self.category,
            recurrence_rule: self.recurrence_rule,
            start_date: self.start_date,
            estimated_time: self.estimated_time,
            goal_alignment: self.goal_alignment,
            aligned_goal_id: self.aligned_goal_id,
            justification: self.justification,
            time: self.time,
            completions: self.completions,
        }
    }
}

//=========================================================================================
// Goals and Weekly Goals
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalKpi {
    pub description: String,
    #[serde(rename = "type")]
    pub kind: GoalKind,
    pub target: String,
}

/// A structured pledge produced by the coach. Serializes camelCase because
/// that is the shape the model emits and the frontend stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalContract {
    pub primary_objective: String,
    pub contract_statement: String,
    pub reward_payout: f64,
    #[serde(default)]
    pub kpis: Vec<GoalKpi>,
    #[serde(default)]
    pub pre_state_answers: Vec<BTreeMap<String, String>>,
    #[serde(default)]
    pub five_whys: Vec<String>,
}

/// Atomic-Habits-style suggestion bundle (make it obvious / attractive /
/// easy / satisfying).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomicHabitsSuggestions {
    pub obvious: Vec<String>,
    pub attractive: Vec<String>,
    pub easy: Vec<String>,
    pub satisfying: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyGoalEvaluation {
    pub alignment_score: f64,
    pub feedback: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub description: String,
    #[serde(alias = "targetDate")]
    pub target_date: NaiveDate,
    pub label: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(alias = "completionDate")]
    pub completion_date: Option<NaiveDate>,
    #[serde(alias = "completionProof")]
    pub completion_proof: Option<String>,
    #[serde(alias = "completionFeedback")]
    pub completion_feedback: Option<String>,
    pub system: Option<AtomicHabitsSuggestions>,
    pub contract: Option<GoalContract>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGoal {
    pub description: String,
    #[serde(alias = "targetDate")]
    pub target_date: NaiveDate,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, alias = "completionDate")]
    pub completion_date: Option<NaiveDate>,
    #[serde(default, alias = "completionProof")]
    pub completion_proof: Option<String>,
    #[serde(default, alias = "completionFeedback")]
    pub completion_feedback: Option<String>,
    #[serde(default)]
    pub system: Option<AtomicHabitsSuggestions>,
    #[serde(default)]
    pub contract: Option<GoalContract>,
}

impl NewGoal {
    pub fn into_goal(self, id: Uuid) -> Goal {
        Goal {
            id,
            description: self.description,
            target_date: self.target_date,
            label: self.label,
            completed: self.completed,
            completion_date: self.completion_date,
            completion_proof: self.completion_proof,
            completion_feedback: self.completion_feedback,
            system: self.system,
            contract: self.contract,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyGoal {
    pub id: Uuid,
    pub description: String,
    #[serde(alias = "targetDate")]
    pub target_date: NaiveDate,
    #[serde(alias = "alignedGoalId")]
    pub aligned_goal_id: Option<Uuid>,
    #[serde(alias = "goalAlignment")]
    pub goal_alignment: Option<f64>,
    pub label: Option<String>,
    pub evaluation: Option<WeeklyGoalEvaluation>,
    pub contract: Option<GoalContract>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWeeklyGoal {
    pub description: String,
    #[serde(alias = "targetDate")]
    pub target_date: NaiveDate,
    #[serde(default, alias = "alignedGoalId")]
    pub aligned_goal_id: Option<Uuid>,
    #[serde(default, alias = "goalAlignment")]
    pub goal_alignment: Option<f64>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub evaluation: Option<WeeklyGoalEvaluation>,
    #[serde(default)]
    pub contract: Option<GoalContract>,
}

impl NewWeeklyGoal {
    pub fn into_weekly_goal(self, id: Uuid) -> WeeklyGoal {
        WeeklyGoal {
            id,
            description: self.description,
            target_date: self.target_date,
            aligned_goal_id: self.aligned_goal_id,
            goal_alignment: self.goal_alignment,
            label: self.label,
            evaluation: self.evaluation,
            contract: self.contract,
        }
    }
}

//=========================================================================================
// Side Quests
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideQuest {
    pub id: Uuid,
    pub description: String,
    pub difficulty: Difficulty,
    #[serde(alias = "dailyGoal")]
    pub daily_goal: i64,
    #[serde(default)]
    pub completions: BTreeMap<NaiveDate, i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSideQuest {
    pub description: String,
    pub difficulty: Difficulty,
    #[serde(alias = "dailyGoal")]
    pub daily_goal: i64,
    #[serde(default)]
    pub completions: BTreeMap<NaiveDate, i64>,
}

impl NewSideQuest {
    pub fn into_side_quest(self, id: Uuid) -> SideQuest {
        SideQuest {
            id,
            description: self.description,
            difficulty: self.difficulty,
            daily_goal: self.daily_goal,
            completions: self.completions,
        }
    }
}

//=========================================================================================
// Rewards
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reward {
    pub id: Uuid,
    pub name: String,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReward {
    pub name: String,
    pub cost: f64,
}

impl NewReward {
    pub fn into_reward(self, id: Uuid) -> Reward {
        Reward {
            id,
            name: self.name,
            cost: self.cost,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchasedReward {
    pub id: Uuid,
    #[serde(alias = "rewardId")]
    pub reward_id: Uuid,
    pub name: String,
    pub cost: f64,
    #[serde(alias = "purchaseDate")]
    pub purchase_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPurchasedReward {
    #[serde(alias = "rewardId")]
    pub reward_id: Uuid,
    pub name: String,
    pub cost: f64,
    #[serde(alias = "purchaseDate")]
    pub purchase_date: NaiveDate,
}

impl NewPurchasedReward {
    pub fn into_purchased_reward(self, id: Uuid) -> PurchasedReward {
        PurchasedReward {
            id,
            reward_id: self.reward_id,
            name: self.name,
            cost: self.cost,
            purchase_date: self.purchase_date,
        }
    }
}

//=========================================================================================
// Diary Entries
//=========================================================================================

/// Keyed by (date, owner) rather than a synthetic id; both create and
/// update-by-date are upserts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaryEntry {
    pub date: NaiveDate,
    #[serde(alias = "initialReflection")]
    pub initial_reflection: Option<String>,
    #[serde(alias = "initialFeedback")]
    pub initial_feedback: Option<String>,
    pub debrief: Option<String>,
    #[serde(alias = "finalFeedback")]
    pub final_feedback: Option<String>,
    pub grade: Option<String>,
}

impl DiaryEntry {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            initial_reflection: None,
            initial_feedback: None,
            debrief: None,
            final_feedback: None,
            grade: None,
        }
    }
}

//=========================================================================================
// Wish List and Core List
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wish {
    pub id: Uuid,
    pub description: String,
    pub explanation: Option<String>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWish {
    pub description: String,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

impl NewWish {
    pub fn into_wish(self, id: Uuid) -> Wish {
        Wish {
            id,
            description: self.description,
            explanation: self.explanation,
            label: self.label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreTask {
    pub id: Uuid,
    pub description: String,
    pub explanation: Option<String>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCoreTask {
    pub description: String,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

impl NewCoreTask {
    pub fn into_core_task(self, id: Uuid) -> CoreTask {
        CoreTask {
            id,
            description: self.description,
            explanation: self.explanation,
            label: self.label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_round_trips_through_strings() {
        for d in [
            Difficulty::Easy,
            Difficulty::Medium,
            Difficulty::Hard,
            Difficulty::Savage,
        ] {
            assert_eq!(d.as_str().parse::<Difficulty>().unwrap(), d);
        }
        assert!("Brutal".parse::<Difficulty>().is_err());
    }

    #[test]
    fn recurrence_rule_none_is_the_literal_string() {
        assert_eq!("None".parse::<RecurrenceRule>().unwrap(), RecurrenceRule::None);
        assert_eq!(RecurrenceRule::None.to_string(), "None");
    }

    #[test]
    fn task_accepts_camel_case_aliases() {
        let task: NewTask = serde_json::from_value(serde_json::json!({
            "date": "2025-03-01",
            "description": "4am run",
            "difficulty": "Savage",
            "category": "Physical Training",
            "estimatedTime": 60.0,
            "betAmount": 2.5
        }))
        .unwrap();
        assert_eq!(task.estimated_time, 60.0);
        assert_eq!(task.bet_amount, Some(2.5));
        assert!(!task.completed);
    }

    #[test]
    fn goal_contract_wire_shape_is_camel_case() {
        let contract = GoalContract {
            primary_objective: "Run 100 miles".into(),
            contract_statement: "I will not fail.".into(),
            reward_payout: 100.0,
            kpis: vec![GoalKpi {
                description: "weekly mileage".into(),
                kind: GoalKind::InternalMetric,
                target: "25".into(),
            }],
            pre_state_answers: vec![],
            five_whys: vec!["because".into()],
        };
        let value = serde_json::to_value(&contract).unwrap();
        assert_eq!(value["primaryObjective"], "Run 100 miles");
        assert_eq!(value["kpis"][0]["type"], "Internal Metric");
    }

    #[test]
    fn recurring_completions_key_on_dates() {
        let mut completions = BTreeMap::new();
        completions.insert(
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            RecurringCompletion {
                completed: true,
                actual_time: Some(45.0),
                ..Default::default()
            },
        );
        let value = serde_json::to_value(&completions).unwrap();
        assert_eq!(value["2025-03-01"]["completed"], true);
        assert_eq!(value["2025-03-01"]["actualTime"], 45.0);
    }
}
