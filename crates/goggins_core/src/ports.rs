//! crates/goggins_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific external implementations like databases
//! or generative-text APIs.

use crate::domain::{
    Character, CoreTask, DiaryEntry, Goal, NewCoreTask, NewGoal, NewPurchasedReward,
    NewRecurringTask, NewReward, NewSideQuest, NewTask, NewWeeklyGoal, NewWish, PurchasedReward,
    RecurringTask, Reward, SideQuest, Task, User, UserCredentials, WeeklyGoal, Wish,
};
use crate::patch::{
    CoreTaskPatch, DiaryEntryPatch, GoalPatch, PurchasedRewardPatch, RecurringTaskPatch,
    RewardPatch, SideQuestPatch, TaskPatch, WeeklyGoalPatch, WishPatch,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Database Port
//=========================================================================================

/// Storage for every entity, owner-scoped throughout: reads and writes only
/// ever touch rows whose owner matches the given user id, so one user's data
/// can never leak into another's results.
#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Users ---
    async fn create_user(
        &self,
        username: &str,
        password_hash: Option<&str>,
        api_key: Option<&str>,
    ) -> PortResult<User>;
    async fn get_user_credentials(&self, username: &str) -> PortResult<UserCredentials>;
    async fn get_user_by_id(&self, id: Uuid) -> PortResult<User>;
    /// First user in storage order, for the legacy "default" token mode.
    async fn first_user(&self) -> PortResult<Option<User>>;
    async fn set_user_api_key(&self, id: Uuid, api_key: Option<&str>) -> PortResult<User>;

    // --- Character (singleton per owner) ---
    /// Lazily inserts a zero-valued row if absent; a read with a persisting
    /// side effect, by contract.
    async fn get_or_create_character(&self, owner: Uuid) -> PortResult<Character>;
    /// Full replacement of both fields (deliberately not a partial update).
    async fn put_character(&self, owner: Uuid, state: Character) -> PortResult<Character>;

    // --- Tasks ---
    async fn list_tasks(
        &self,
        owner: Uuid,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> PortResult<Vec<Task>>;
    async fn create_task(&self, owner: Uuid, new: NewTask) -> PortResult<Task>;
    async fn update_task(&self, owner: Uuid, id: Uuid, patch: TaskPatch) -> PortResult<Task>;
    async fn delete_task(&self, owner: Uuid, id: Uuid) -> PortResult<()>;

    // --- Recurring Tasks ---
    async fn list_recurring_tasks(&self, owner: Uuid) -> PortResult<Vec<RecurringTask>>;
    async fn create_recurring_task(
        &self,
        owner: Uuid,
        new: NewRecurringTask,
    ) -> PortResult<RecurringTask>;
    async fn update_recurring_task(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: RecurringTaskPatch,
    ) -> PortResult<RecurringTask>;
    async fn delete_recurring_task(&self, owner: Uuid, id: Uuid) -> PortResult<()>;

    // --- Side Quests ---
    async fn list_side_quests(&self, owner: Uuid) -> PortResult<Vec<SideQuest>>;
    async fn create_side_quest(&self, owner: Uuid, new: NewSideQuest) -> PortResult<SideQuest>;
    async fn update_side_quest(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: SideQuestPatch,
    ) -> PortResult<SideQuest>;
    async fn delete_side_quest(&self, owner: Uuid, id: Uuid) -> PortResult<()>;

    // --- Goals ---
    async fn list_goals(&self, owner: Uuid) -> PortResult<Vec<Goal>>;
    async fn create_goal(&self, owner: Uuid, new: NewGoal) -> PortResult<Goal>;
    async fn update_goal(&self, owner: Uuid, id: Uuid, patch: GoalPatch) -> PortResult<Goal>;
    async fn delete_goal(&self, owner: Uuid, id: Uuid) -> PortResult<()>;

    // --- Weekly Goals ---
    async fn list_weekly_goals(&self, owner: Uuid) -> PortResult<Vec<WeeklyGoal>>;
    async fn create_weekly_goal(&self, owner: Uuid, new: NewWeeklyGoal) -> PortResult<WeeklyGoal>;
    async fn update_weekly_goal(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: WeeklyGoalPatch,
    ) -> PortResult<WeeklyGoal>;
    async fn delete_weekly_goal(&self, owner: Uuid, id: Uuid) -> PortResult<()>;

    // --- Rewards ---
    async fn list_rewards(&self, owner: Uuid) -> PortResult<Vec<Reward>>;
    async fn create_reward(&self, owner: Uuid, new: NewReward) -> PortResult<Reward>;
    async fn update_reward(&self, owner: Uuid, id: Uuid, patch: RewardPatch) -> PortResult<Reward>;
    async fn delete_reward(&self, owner: Uuid, id: Uuid) -> PortResult<()>;

    // --- Purchased Rewards ---
    async fn list_purchased_rewards(&self, owner: Uuid) -> PortResult<Vec<PurchasedReward>>;
    async fn create_purchased_reward(
        &self,
        owner: Uuid,
        new: NewPurchasedReward,
    ) -> PortResult<PurchasedReward>;
    async fn update_purchased_reward(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: PurchasedRewardPatch,
    ) -> PortResult<PurchasedReward>;
    async fn delete_purchased_reward(&self, owner: Uuid, id: Uuid) -> PortResult<()>;

    // --- Diary Entries (keyed by date + owner) ---
    async fn list_diary_entries(&self, owner: Uuid) -> PortResult<Vec<DiaryEntry>>;
    /// Find-or-create: applies the patch to the existing row for that date,
    /// or inserts a fresh one.
    async fn upsert_diary_entry(
        &self,
        owner: Uuid,
        date: NaiveDate,
        patch: DiaryEntryPatch,
    ) -> PortResult<DiaryEntry>;
    async fn delete_diary_entry(&self, owner: Uuid, date: NaiveDate) -> PortResult<()>;

    // --- Wish List ---
    async fn list_wishes(&self, owner: Uuid) -> PortResult<Vec<Wish>>;
    async fn create_wish(&self, owner: Uuid, new: NewWish) -> PortResult<Wish>;
    async fn update_wish(&self, owner: Uuid, id: Uuid, patch: WishPatch) -> PortResult<Wish>;
    async fn delete_wish(&self, owner: Uuid, id: Uuid) -> PortResult<()>;

    // --- Core List ---
    async fn list_core_tasks(&self, owner: Uuid) -> PortResult<Vec<CoreTask>>;
    async fn create_core_task(&self, owner: Uuid, new: NewCoreTask) -> PortResult<CoreTask>;
    async fn update_core_task(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: CoreTaskPatch,
    ) -> PortResult<CoreTask>;
    async fn delete_core_task(&self, owner: Uuid, id: Uuid) -> PortResult<()>;
}

//=========================================================================================
// Generative-Text Port
//=========================================================================================

/// Low-level access to the external generative model. The key is resolved
/// per call (the user's own key, else the process default) so no global
/// mutable credential exists anywhere.
#[async_trait]
pub trait TextGenerationService: Send + Sync {
    /// Free-text mode: returns the model's raw reply, trimmed.
    async fn generate_text(&self, api_key: &str, prompt: &str) -> PortResult<String>;

    /// Structured mode: the model is instructed to reply with JSON, which is
    /// parsed before being returned.
    async fn generate_json(&self, api_key: &str, prompt: &str) -> PortResult<serde_json::Value>;
}
