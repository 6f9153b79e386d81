//! crates/goggins_core/src/patch.rs
//!
//! Explicit partial-update ("exclude unset") types for every entity.
//!
//! A PUT body may leave a field out entirely, set it to `null`, or set it to
//! a value, and the three cases mean different things: untouched, cleared,
//! replaced. [`Patch`] keeps the distinction that `Option<Option<T>>` tends
//! to lose, and each entity gets a hand-written `apply` merge instead of a
//! dynamic field copy.

use crate::domain::{
    AtomicHabitsSuggestions, CoreTask, DiaryEntry, Difficulty, Goal, GoalContract, PurchasedReward,
    RecurrenceRule, RecurringCompletion, RecurringTask, Reward, SideQuest, Task, WeeklyGoal,
    WeeklyGoalEvaluation, Wish,
};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A three-state field for nullable columns: absent from the payload, an
/// explicit `null`, or a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Patch<T> {
    #[default]
    Missing,
    Null,
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Patch::Missing)
    }

    /// Merges this patch into a nullable slot.
    pub fn apply(self, slot: &mut Option<T>) {
        match self {
            Patch::Missing => {}
            Patch::Null => *slot = None,
            Patch::Value(v) => *slot = Some(v),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // A field that is present deserializes here; `null` becomes `Null`.
        // Absent fields never reach this impl and stay `Missing` via Default.
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        })
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Patch::Value(v) => serializer.serialize_some(v),
            _ => serializer.serialize_none(),
        }
    }
}

//=========================================================================================
// Per-entity patch payloads
//=========================================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TaskPatch {
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub completed: Option<bool>,
    pub category: Option<String>,
    #[serde(alias = "estimatedTime")]
    pub estimated_time: Option<f64>,
    #[serde(alias = "actualTime")]
    pub actual_time: Patch<f64>,
    pub story: Patch<String>,
    #[serde(alias = "recurringMasterId")]
    pub recurring_master_id: Patch<Uuid>,
    #[serde(alias = "goalAlignment")]
    pub goal_alignment: Patch<f64>,
    #[serde(alias = "alignedGoalId")]
    pub aligned_goal_id: Patch<Uuid>,
    pub justification: Patch<String>,
    pub time: Patch<String>,
    #[serde(alias = "betAmount")]
    pub bet_amount: Patch<f64>,
    #[serde(alias = "betMultiplier")]
    pub bet_multiplier: Patch<f64>,
    #[serde(alias = "betPlaced")]
    pub bet_placed: Patch<bool>,
    #[serde(alias = "betWon")]
    pub bet_won: Patch<bool>,
    #[serde(alias = "recurrenceRule")]
    pub recurrence_rule: Patch<RecurrenceRule>,
}

impl TaskPatch {
    pub fn apply(self, task: &mut Task) {
        if let Some(v) = self.date {
            task.date = v;
        }
        if let Some(v) = self.description {
            task.description = v;
        }
        if let Some(v) = self.difficulty {
            task.difficulty = v;
        }
        if let Some(v) = self.completed {
            task.completed = v;
        }
        if let Some(v) = self.category {
            task.category = v;
        }
        if let Some(v) = self.estimated_time {
            task.estimated_time = v;
        }
        self.actual_time.apply(&mut task.actual_time);
        self.story.apply(&mut task.story);
        self.recurring_master_id.apply(&mut task.recurring_master_id);
        self.goal_alignment.apply(&mut task.goal_alignment);
        self.aligned_goal_id.apply(&mut task.aligned_goal_id);
        self.justification.apply(&mut task.justification);
        self.time.apply(&mut task.time);
        self.bet_amount.apply(&mut task.bet_amount);
        self.bet_multiplier.apply(&mut task.bet_multiplier);
        self.bet_placed.apply(&mut task.bet_placed);
        self.bet_won.apply(&mut task.bet_won);
        self.recurrence_rule.apply(&mut task.recurrence_rule);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RecurringTaskPatch {
    pub description: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub category: Option<String>,
    #[serde(alias = "recurrenceRule")]
    pub recurrence_rule: Option<RecurrenceRule>,
    #[serde(alias = "startDate")]
    pub start_date: Option<NaiveDate>,
    #[serde(alias = "estimatedTime")]
    pub estimated_time: Option<f64>,
    #[serde(alias = "goalAlignment")]
    pub goal_alignment: Patch<f64>,
    #[serde(alias = "alignedGoalId")]
    pub aligned_goal_id: Patch<Uuid>,
    pub justification: Patch<String>,
    pub time: Patch<String>,
    pub completions: Option<BTreeMap<NaiveDate, RecurringCompletion>>,
}

impl RecurringTaskPatch {
    pub fn apply(self, task: &mut RecurringTask) {
        if let Some(v) = self.description {
            task.description = v;
        }
        if let Some(v) = self.difficulty {
            task.difficulty = v;
        }
        if let Some(v) = self.category {
            task.category = v;
        }
        if let Some(v) = self.recurrence_rule {
            task.recurrence_rule = v;
        }
        if let Some(v) = self.start_date {
            task.start_date = v;
        }
        if let Some(v) = self.estimated_time {
            task.estimated_time = v;
        }
        self.goal_alignment.apply(&mut task.goal_alignment);
        self.aligned_goal_id.apply(&mut task.aligned_goal_id);
        self.justification.apply(&mut task.justification);
        self.time.apply(&mut task.time);
        if let Some(v) = self.completions {
            task.completions = v;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GoalPatch {
    pub description: Option<String>,
    #[serde(alias = "targetDate")]
    pub target_date: Option<NaiveDate>,
    pub label: Patch<String>,
    pub completed: Option<bool>,
    #[serde(alias = "completionDate")]
    pub completion_date: Patch<NaiveDate>,
    #[serde(alias = "completionProof")]
    pub completion_proof: Patch<String>,
    #[serde(alias = "completionFeedback")]
    pub completion_feedback: Patch<String>,
    pub system: Patch<AtomicHabitsSuggestions>,
    pub contract: Patch<GoalContract>,
}

impl GoalPatch {
    pub fn apply(self, goal: &mut Goal) {
        if let Some(v) = self.description {
            goal.description = v;
        }
        if let Some(v) = self.target_date {
            goal.target_date = v;
        }
        self.label.apply(&mut goal.label);
        if let Some(v) = self.completed {
            goal.completed = v;
        }
        self.completion_date.apply(&mut goal.completion_date);
        self.completion_proof.apply(&mut goal.completion_proof);
        self.completion_feedback.apply(&mut goal.completion_feedback);
        self.system.apply(&mut goal.system);
        self.contract.apply(&mut goal.contract);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WeeklyGoalPatch {
    pub description: Option<String>,
    #[serde(alias = "targetDate")]
    pub target_date: Option<NaiveDate>,
    #[serde(alias = "alignedGoalId")]
    pub aligned_goal_id: Patch<Uuid>,
    #[serde(alias = "goalAlignment")]
    pub goal_alignment: Patch<f64>,
    pub label: Patch<String>,
    pub evaluation: Patch<WeeklyGoalEvaluation>,
    pub contract: Patch<GoalContract>,
}

impl WeeklyGoalPatch {
    pub fn apply(self, goal: &mut WeeklyGoal) {
        if let Some(v) = self.description {
            goal.description = v;
        }
        if let Some(v) = self.target_date {
            goal.target_date = v;
        }
        self.aligned_goal_id.apply(&mut goal.aligned_goal_id);
        self.goal_alignment.apply(&mut goal.goal_alignment);
        self.label.apply(&mut goal.label);
        self.evaluation.apply(&mut goal.evaluation);
        self.contract.apply(&mut goal.contract);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SideQuestPatch {
    pub description: Option<String>,
    pub difficulty: Option<Difficulty>,
    #[serde(alias = "dailyGoal")]
    pub daily_goal: Option<i64>,
    pub completions: Option<BTreeMap<NaiveDate, i64>>,
}

impl SideQuestPatch {
    pub fn apply(self, quest: &mut SideQuest) {
        if let Some(v) = self.description {
            quest.description = v;
        }
        if let Some(v) = self.difficulty {
            quest.difficulty = v;
        }
        if let Some(v) = self.daily_goal {
            quest.daily_goal = v;
        }
        if let Some(v) = self.completions {
            quest.completions = v;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RewardPatch {
    pub name: Option<String>,
    pub cost: Option<f64>,
}

impl RewardPatch {
    pub fn apply(self, reward: &mut Reward) {
        if let Some(v) = self.name {
            reward.name = v;
        }
        if let Some(v) = self.cost {
            reward.cost = v;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PurchasedRewardPatch {
    #[serde(alias = "rewardId")]
    pub reward_id: Option<Uuid>,
    pub name: Option<String>,
    pub cost: Option<f64>,
    #[serde(alias = "purchaseDate")]
    pub purchase_date: Option<NaiveDate>,
}

impl PurchasedRewardPatch {
    pub fn apply(self, purchase: &mut PurchasedReward) {
        if let Some(v) = self.reward_id {
            purchase.reward_id = v;
        }
        if let Some(v) = self.name {
            purchase.name = v;
        }
        if let Some(v) = self.cost {
            purchase.cost = v;
        }
        if let Some(v) = self.purchase_date {
            purchase.purchase_date = v;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DiaryEntryPatch {
    #[serde(alias = "initialReflection")]
    pub initial_reflection: Patch<String>,
    #[serde(alias = "initialFeedback")]
    pub initial_feedback: Patch<String>,
    pub debrief: Patch<String>,
    #[serde(alias = "finalFeedback")]
    pub final_feedback: Patch<String>,
    pub grade: Patch<String>,
}

impl DiaryEntryPatch {
    pub fn apply(self, entry: &mut DiaryEntry) {
        self.initial_reflection.apply(&mut entry.initial_reflection);
        self.initial_feedback.apply(&mut entry.initial_feedback);
        self.debrief.apply(&mut entry.debrief);
        self.final_feedback.apply(&mut entry.final_feedback);
        self.grade.apply(&mut entry.grade);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WishPatch {
    pub description: Option<String>,
    pub explanation: Patch<String>,
    pub label: Patch<String>,
}

impl WishPatch {
    pub fn apply(self, wish: &mut Wish) {
        if let Some(v) = self.description {
            wish.description = v;
        }
        self.explanation.apply(&mut wish.explanation);
        self.label.apply(&mut wish.label);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CoreTaskPatch {
    pub description: Option<String>,
    pub explanation: Patch<String>,
    pub label: Patch<String>,
}

impl CoreTaskPatch {
    pub fn apply(self, task: &mut CoreTask) {
        if let Some(v) = self.description {
            task.description = v;
        }
        self.explanation.apply(&mut task.explanation);
        self.label.apply(&mut task.label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn sample_task() -> Task {
        Task {
            id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            description: "4am run".into(),
            difficulty: Difficulty::Hard,
            completed: false,
            category: "Physical Training".into(),
            estimated_time: 60.0,
            actual_time: Some(55.0),
            story: None,
            recurring_master_id: None,
            goal_alignment: Some(8.0),
            aligned_goal_id: None,
            justification: None,
            time: Some("04:00".into()),
            bet_amount: None,
            bet_multiplier: None,
            bet_placed: None,
            bet_won: None,
            recurrence_rule: None,
        }
    }

    #[test]
    fn absent_fields_deserialize_as_missing() {
        let patch: TaskPatch = serde_json::from_str(r#"{"completed": true}"#).unwrap();
        assert_eq!(patch.completed, Some(true));
        assert!(patch.actual_time.is_missing());
        assert!(patch.description.is_none());
    }

    #[test]
    fn explicit_null_deserializes_as_null() {
        let patch: TaskPatch = serde_json::from_str(r#"{"actual_time": null}"#).unwrap();
        assert_eq!(patch.actual_time, Patch::Null);
    }

    #[test]
    fn apply_distinguishes_missing_from_null() {
        let mut task = sample_task();

        // Missing leaves the slot alone.
        let untouched: TaskPatch = serde_json::from_str(r#"{"completed": true}"#).unwrap();
        untouched.apply(&mut task);
        assert!(task.completed);
        assert_eq!(task.actual_time, Some(55.0));

        // Null clears it.
        let cleared: TaskPatch = serde_json::from_str(r#"{"actualTime": null}"#).unwrap();
        cleared.apply(&mut task);
        assert_eq!(task.actual_time, None);

        // Value replaces it.
        let replaced: TaskPatch = serde_json::from_str(r#"{"actualTime": 61.5}"#).unwrap();
        replaced.apply(&mut task);
        assert_eq!(task.actual_time, Some(61.5));
    }

    #[test]
    fn diary_patch_only_touches_supplied_fields() {
        let mut entry = DiaryEntry::empty(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        entry.debrief = Some("first attempt".into());

        let patch: DiaryEntryPatch =
            serde_json::from_str(r#"{"grade": "B"}"#).unwrap();
        patch.apply(&mut entry);

        assert_eq!(entry.grade.as_deref(), Some("B"));
        assert_eq!(entry.debrief.as_deref(), Some("first attempt"));
    }
}
