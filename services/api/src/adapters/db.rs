//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete
//! implementation of the `DatabaseService` port from the `core` crate. It
//! handles all interactions with the SQLite database using `sqlx`.
//!
//! Ids and calendar dates live in TEXT columns; the record structs below hold
//! them as strings and `to_domain` parses them into the typed domain shapes.

use async_trait::async_trait;
use chrono::NaiveDate;
use goggins_core::domain::{
    AtomicHabitsSuggestions, Character, CoreTask, DiaryEntry, Goal, GoalContract,
    NewCoreTask, NewGoal, NewPurchasedReward, NewRecurringTask, NewReward, NewSideQuest, NewTask,
    NewWeeklyGoal, NewWish, PurchasedReward, RecurringCompletion, RecurringTask, Reward, SideQuest,
    Task, User, UserCredentials, WeeklyGoal, WeeklyGoalEvaluation, Wish,
};
use goggins_core::patch::{
    CoreTaskPatch, DiaryEntryPatch, GoalPatch, PurchasedRewardPatch, RecurringTaskPatch,
    RewardPatch, SideQuestPatch, TaskPatch, WeeklyGoalPatch, WishPatch,
};
use goggins_core::ports::{DatabaseService, PortError, PortResult};
use sqlx::types::Json;
use sqlx::{FromRow, SqlitePool};
use std::collections::BTreeMap;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: SqlitePool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

//=========================================================================================
// Parsing helpers
//=========================================================================================

fn unexpected(e: impl std::fmt::Display) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn parse_uuid(raw: &str) -> PortResult<Uuid> {
    Uuid::parse_str(raw).map_err(|e| unexpected(format!("bad uuid '{raw}': {e}")))
}

fn parse_uuid_opt(raw: Option<&str>) -> PortResult<Option<Uuid>> {
    raw.map(parse_uuid).transpose()
}

fn parse_date(raw: &str) -> PortResult<NaiveDate> {
    raw.parse::<NaiveDate>()
        .map_err(|e| unexpected(format!("bad date '{raw}': {e}")))
}

fn parse_date_opt(raw: Option<&str>) -> PortResult<Option<NaiveDate>> {
    raw.map(parse_date).transpose()
}

fn parse_enum<T: std::str::FromStr<Err = String>>(raw: &str) -> PortResult<T> {
    raw.parse::<T>().map_err(unexpected)
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: String,
    username: String,
    password_hash: Option<String>,
    api_key: Option<String>,
}

impl UserRecord {
    fn to_user(self) -> PortResult<User> {
        Ok(User {
            id: parse_uuid(&self.id)?,
            username: self.username,
            api_key: self.api_key,
        })
    }

    fn to_credentials(self) -> PortResult<UserCredentials> {
        Ok(UserCredentials {
            id: parse_uuid(&self.id)?,
            username: self.username,
            password_hash: self.password_hash,
            api_key: self.api_key,
        })
    }
}

#[derive(FromRow)]
struct CharacterRecord {
    spent: f64,
    bonuses: f64,
}

impl CharacterRecord {
    fn to_domain(self) -> Character {
        Character {
            spent: self.spent,
            bonuses: self.bonuses,
        }
    }
}

#[derive(FromRow)]
struct TaskRecord {
    id: String,
    date: String,
    description: String,
    difficulty: String,
    completed: bool,
    category: String,
    estimated_time: f64,
    actual_time: Option<f64>,
    story: Option<String>,
    recurring_master_id: Option<String>,
    goal_alignment: Option<f64>,
    aligned_goal_id: Option<String>,
    justification: Option<String>,
    time: Option<String>,
    bet_amount: Option<f64>,
    bet_multiplier: Option<f64>,
    bet_placed: Option<bool>,
    bet_won: Option<bool>,
    recurrence_rule: Option<String>,
}

impl TaskRecord {
    fn to_domain(self) -> PortResult<Task> {
        Ok(Task {
            id: parse_uuid(&self.id)?,
            date: parse_date(&self.date)?,
            description: self.description,
            difficulty: parse_enum(&self.difficulty)?,
            completed: self.completed,
            category: self.category,
            estimated_time: self.estimated_time,
            actual_time: self.actual_time,
            story: self.story,
            recurring_master_id: parse_uuid_opt(self.recurring_master_id.as_deref())?,
            goal_alignment: self.goal_alignment,
            aligned_goal_id: parse_uuid_opt(self.aligned_goal_id.as_deref())?,
            justification: self.justification,
            time: self.time,
            bet_amount: self.bet_amount,
            bet_multiplier: self.bet_multiplier,
            bet_placed: self.bet_placed,
            bet_won: self.bet_won,
            recurrence_rule: self
                .recurrence_rule
                .as_deref()
                .map(parse_enum)
                .transpose()?,
        })
    }
}

#[derive(FromRow)]
struct RecurringTaskRecord {
    id: String,
    description: String,
    difficulty: String,
    category: String,
    recurrence_rule: String,
    start_date: String,
    estimated_time: f64,
    goal_alignment: Option<f64>,
    aligned_goal_id: Option<String>,
    justification: Option<String>,
    time: Option<String>,
    completions: Json<BTreeMap<NaiveDate, RecurringCompletion>>,
}

impl RecurringTaskRecord {
    fn to_domain(self) -> PortResult<RecurringTask> {
        Ok(RecurringTask {
            id: parse_uuid(&self.id)?,
            description: self.description,
            difficulty: parse_enum(&self.difficulty)?,
            category: self.category,
            recurrence_rule: parse_enum(&self.recurrence_rule)?,
            start_date: parse_date(&self.start_date)?,
            estimated_time: self.estimated_time,
            goal_alignment: self.goal_alignment,
            aligned_goal_id: parse_uuid_opt(self.aligned_goal_id.as_deref())?,
            justification: self.justification,
            time: self.time,
            completions: self.completions.0,
        })
    }
}

#[derive(FromRow)]
struct GoalRecord {
    id: String,
    description: String,
    target_date: String,
    label: Option<String>,
    completed: bool,
    completion_date: Option<String>,
    completion_proof: Option<String>,
    completion_feedback: Option<String>,
    system: Option<Json<AtomicHabitsSuggestions>>,
    contract: Option<Json<GoalContract>>,
}

impl GoalRecord {
    fn to_domain(self) -> PortResult<Goal> {
        Ok(Goal {
            id: parse_uuid(&self.id)?,
            description: self.description,
            target_date: parse_date(&self.target_date)?,
            label: self.label,
            completed: self.completed,
            completion_date: parse_date_opt(self.completion_date.as_deref())?,
            completion_proof: self.completion_proof,
            completion_feedback: self.completion_feedback,
            system: self.system.map(|j| j.0),
            contract: self.contract.map(|j| j.0),
        })
    }
}

#[derive(FromRow)]
struct WeeklyGoalRecord {
    id: String,
    description: String,
    target_date: String,
    aligned_goal_id: Option<String>,
    goal_alignment: Option<f64>,
    label: Option<String>,
    evaluation: Option<Json<WeeklyGoalEvaluation>>,
    contract: Option<Json<GoalContract>>,
}

impl WeeklyGoalRecord {
    fn to_domain(self) -> PortResult<WeeklyGoal> {
        Ok(WeeklyGoal {
            id: parse_uuid(&self.id)?,
            description: self.description,
            target_date: parse_date(&self.target_date)?,
            aligned_goal_id: parse_uuid_opt(self.aligned_goal_id.as_deref())?,
            goal_alignment: self.goal_alignment,
            label: self.label,
            evaluation: self.evaluation.map(|j| j.0),
            contract: self.contract.map(|j| j.0),
        })
    }
}

#[derive(FromRow)]
struct SideQuestRecord {
    id: String,
    description: String,
    difficulty: String,
    daily_goal: i64,
    completions: Json<BTreeMap<NaiveDate, i64>>,
}

impl SideQuestRecord {
    fn to_domain(self) -> PortResult<SideQuest> {
        Ok(SideQuest {
            id: parse_uuid(&self.id)?,
            description: self.description,
            difficulty: parse_enum(&self.difficulty)?,
            daily_goal: self.daily_goal,
            completions: self.completions.0,
        })
    }
}

#[derive(FromRow)]
struct RewardRecord {
    id: String,
    name: String,
    cost: f64,
}

impl RewardRecord {
    fn to_domain(self) -> PortResult<Reward> {
        Ok(Reward {
            id: parse_uuid(&self.id)?,
            name: self.name,
            cost: self.cost,
        })
    }
}

#[derive(FromRow)]
struct PurchasedRewardRecord {
    id: String,
    reward_id: String,
    name: String,
    cost: f64,
    purchase_date: String,
}

impl PurchasedRewardRecord {
    fn to_domain(self) -> PortResult<PurchasedReward> {
        Ok(PurchasedReward {
            id: parse_uuid(&self.id)?,
            reward_id: parse_uuid(&self.reward_id)?,
            name: self.name,
            cost: self.cost,
            purchase_date: parse_date(&self.purchase_date)?,
        })
    }
}

#[derive(FromRow)]
struct DiaryEntryRecord {
    date: String,
    initial_reflection: Option<String>,
    initial_feedback: Option<String>,
    debrief: Option<String>,
    final_feedback: Option<String>,
    grade: Option<String>,
}

impl DiaryEntryRecord {
    fn to_domain(self) -> PortResult<DiaryEntry> {
        Ok(DiaryEntry {
            date: parse_date(&self.date)?,
            initial_reflection: self.initial_reflection,
            initial_feedback: self.initial_feedback,
            debrief: self.debrief,
            final_feedback: self.final_feedback,
            grade: self.grade,
        })
    }
}

#[derive(FromRow)]
struct WishRecord {
    id: String,
    description: String,
    explanation: Option<String>,
    label: Option<String>,
}

impl WishRecord {
    fn to_wish(self) -> PortResult<Wish> {
        Ok(Wish {
            id: parse_uuid(&self.id)?,
            description: self.description,
            explanation: self.explanation,
            label: self.label,
        })
    }

    fn to_core_task(self) -> PortResult<CoreTask> {
        Ok(CoreTask {
            id: parse_uuid(&self.id)?,
            description: self.description,
            explanation: self.explanation,
            label: self.label,
        })
    }
}

//=========================================================================================
// Write helpers (full-row persists after an in-memory merge)
//=========================================================================================

impl DbAdapter {
    async fn fetch_task(&self, owner: Uuid, id: Uuid) -> PortResult<Option<Task>> {
        let record = sqlx::query_as::<_, TaskRecord>(
            "SELECT id, date, description, difficulty, completed, category, estimated_time, \
             actual_time, story, recurring_master_id, goal_alignment, aligned_goal_id, \
             justification, time, bet_amount, bet_multiplier, bet_placed, bet_won, \
             recurrence_rule FROM tasks WHERE id = ? AND user_id = ?",
        )
        .bind(id.to_string())
        .bind(owner.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        record.map(TaskRecord::to_domain).transpose()
    }

    async fn persist_task(&self, owner: Uuid, task: &Task, insert: bool) -> PortResult<()> {
        let query = if insert {
            "INSERT INTO tasks (date, description, difficulty, completed, category, \
             estimated_time, actual_time, story, recurring_master_id, goal_alignment, \
             aligned_goal_id, justification, time, bet_amount, bet_multiplier, bet_placed, \
             bet_won, recurrence_rule, id, user_id) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        } else {
            "UPDATE tasks SET date = ?, description = ?, difficulty = ?, completed = ?, \
             category = ?, estimated_time = ?, actual_time = ?, story = ?, \
             recurring_master_id = ?, goal_alignment = ?, aligned_goal_id = ?, \
             justification = ?, time = ?, bet_amount = ?, bet_multiplier = ?, \
             bet_placed = ?, bet_won = ?, recurrence_rule = ? \
             WHERE id = ? AND user_id = ?"
        };
        sqlx::query(query)
            .bind(task.date.to_string())
            .bind(&task.description)
            .bind(task.difficulty.as_str())
            .bind(task.completed)
            .bind(&task.category)
            .bind(task.estimated_time)
            .bind(task.actual_time)
            .bind(&task.story)
            .bind(task.recurring_master_id.map(|u| u.to_string()))
            .bind(task.goal_alignment)
            .bind(task.aligned_goal_id.map(|u| u.to_string()))
            .bind(&task.justification)
            .bind(&task.time)
            .bind(task.bet_amount)
            .bind(task.bet_multiplier)
            .bind(task.bet_placed)
            .bind(task.bet_won)
            .bind(task.recurrence_rule.map(|r| r.as_str()))
            .bind(task.id.to_string())
            .bind(owner.to_string())
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn fetch_recurring_task(
        &self,
        owner: Uuid,
        id: Uuid,
    ) -> PortResult<Option<RecurringTask>> {
        let record = sqlx::query_as::<_, RecurringTaskRecord>(
            "SELECT id, description, difficulty, category, recurrence_rule, start_date, \
             estimated_time, goal_alignment, aligned_goal_id, justification, time, completions \
             FROM recurring_tasks WHERE id = ? AND user_id = ?",
        )
        .bind(id.to_string())
        .bind(owner.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        record.map(RecurringTaskRecord::to_domain).transpose()
    }

    async fn persist_recurring_task(
        &self,
        owner: Uuid,
        task: &RecurringTask,
        insert: bool,
    ) -> PortResult<()> {
        let query = if insert {
            "INSERT INTO recurring_tasks (description, difficulty, category, recurrence_rule, \
             start_date, estimated_time, goal_alignment, aligned_goal_id, justification, time, \
             completions, id, user_id) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        } else {
            "UPDATE recurring_tasks SET description = ?, difficulty = ?, category = ?, \
             recurrence_rule = ?, start_date = ?, estimated_time = ?, goal_alignment = ?, \
             aligned_goal_id = ?, justification = ?, time = ?, completions = ? \
             WHERE id = ? AND user_id = ?"
        };
        sqlx::query(query)
            .bind(&task.description)
            .bind(task.difficulty.as_str())
            .bind(&task.category)
            .bind(task.recurrence_rule.as_str())
            .bind(task.start_date.to_string())
            .bind(task.estimated_time)
            .bind(task.goal_alignment)
            .bind(task.aligned_goal_id.map(|u| u.to_string()))
            .bind(&task.justification)
            .bind(&task.time)
            .bind(Json(&task.completions))
            .bind(task.id.to_string())
            .bind(owner.to_string())
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn fetch_goal(&self, owner: Uuid, id: Uuid) -> PortResult<Option<Goal>> {
        let record = sqlx::query_as::<_, GoalRecord>(
            "SELECT id, description, target_date, label, completed, completion_date, \
             completion_proof, completion_feedback, system, contract \
             FROM goals WHERE id = ? AND user_id = ?",
        )
        .bind(id.to_string())
        .bind(owner.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        record.map(GoalRecord::to_domain).transpose()
    }

    async fn persist_goal(&self, owner: Uuid, goal: &Goal, insert: bool) -> PortResult<()> {
        let query = if insert {
            "INSERT INTO goals (description, target_date, label, completed, completion_date, \
             completion_proof, completion_feedback, system, contract, id, user_id) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        } else {
            "UPDATE goals SET description = ?, target_date = ?, label = ?, completed = ?, \
             completion_date = ?, completion_proof = ?, completion_feedback = ?, system = ?, \
             contract = ? WHERE id = ? AND user_id = ?"
        };
        sqlx::query(query)
            .bind(&goal.description)
            .bind(goal.target_date.to_string())
            .bind(&goal.label)
            .bind(goal.completed)
            .bind(goal.completion_date.map(|d| d.to_string()))
            .bind(&goal.completion_proof)
            .bind(&goal.completion_feedback)
            .bind(goal.system.as_ref().map(Json))
            .bind(goal.contract.as_ref().map(Json))
            .bind(goal.id.to_string())
            .bind(owner.to_string())
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn fetch_weekly_goal(&self, owner: Uuid, id: Uuid) -> PortResult<Option<WeeklyGoal>> {
        let record = sqlx::query_as::<_, WeeklyGoalRecord>(
            "SELECT id, description, target_date, aligned_goal_id, goal_alignment, label, \
             evaluation, contract FROM weekly_goals WHERE id = ? AND user_id = ?",
        )
        .bind(id.to_string())
        .bind(owner.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        record.map(WeeklyGoalRecord::to_domain).transpose()
    }

    async fn persist_weekly_goal(
        &self,
        owner: Uuid,
        goal: &WeeklyGoal,
        insert: bool,
    ) -> PortResult<()> {
        let query = if insert {
            "INSERT INTO weekly_goals (description, target_date, aligned_goal_id, \
             goal_alignment, label, evaluation, contract, id, user_id) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
        } else {
            "UPDATE weekly_goals SET description = ?, target_date = ?, aligned_goal_id = ?, \
             goal_alignment = ?, label = ?, evaluation = ?, contract = ? \
             WHERE id = ? AND user_id = ?"
        };
        sqlx::query(query)
            .bind(&goal.description)
            .bind(goal.target_date.to_string())
            .bind(goal.aligned_goal_id.map(|u| u.to_string()))
            .bind(goal.goal_alignment)
            .bind(&goal.label)
            .bind(goal.evaluation.as_ref().map(Json))
            .bind(goal.contract.as_ref().map(Json))
            .bind(goal.id.to_string())
            .bind(owner.to_string())
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn fetch_side_quest(&self, owner: Uuid, id: Uuid) -> PortResult<Option<SideQuest>> {
        let record = sqlx::query_as::<_, SideQuestRecord>(
            "SELECT id, description, difficulty, daily_goal, completions \
             FROM side_quests WHERE id = ? AND user_id = ?",
        )
        .bind(id.to_string())
        .bind(owner.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        record.map(SideQuestRecord::to_domain).transpose()
    }

    async fn persist_side_quest(
        &self,
        owner: Uuid,
        quest: &SideQuest,
        insert: bool,
    ) -> PortResult<()> {
        let query = if insert {
            "INSERT INTO side_quests (description, difficulty, daily_goal, completions, id, \
             user_id) VALUES (?, ?, ?, ?, ?, ?)"
        } else {
            "UPDATE side_quests SET description = ?, difficulty = ?, daily_goal = ?, \
             completions = ? WHERE id = ? AND user_id = ?"
        };
        sqlx::query(query)
            .bind(&quest.description)
            .bind(quest.difficulty.as_str())
            .bind(quest.daily_goal)
            .bind(Json(&quest.completions))
            .bind(quest.id.to_string())
            .bind(owner.to_string())
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    /// Owner-scoped idempotent delete shared by every id-keyed table.
    async fn delete_by_id(&self, table: &str, owner: Uuid, id: Uuid) -> PortResult<()> {
        let query = format!("DELETE FROM {table} WHERE id = ? AND user_id = ?");
        sqlx::query(&query)
            .bind(id.to_string())
            .bind(owner.to_string())
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    // --- Users ---

    async fn create_user(
        &self,
        username: &str,
        password_hash: Option<&str>,
        api_key: Option<&str>,
    ) -> PortResult<User> {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO users (id, username, password_hash, api_key) VALUES (?, ?, ?, ?)")
            .bind(id.to_string())
            .bind(username)
            .bind(password_hash)
            .bind(api_key)
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    PortError::Conflict("Username already exists".to_string())
                }
                _ => unexpected(e),
            })?;
        Ok(User {
            id,
            username: username.to_string(),
            api_key: api_key.map(str::to_string),
        })
    }

    async fn get_user_credentials(&self, username: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, password_hash, api_key FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound("User not found".to_string()))?;
        record.to_credentials()
    }

    async fn get_user_by_id(&self, id: Uuid) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, password_hash, api_key FROM users WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound(format!("User {id} not found")))?;
        record.to_user()
    }

    async fn first_user(&self) -> PortResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, password_hash, api_key FROM users LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        record.map(UserRecord::to_user).transpose()
    }

    async fn set_user_api_key(&self, id: Uuid, api_key: Option<&str>) -> PortResult<User> {
        sqlx::query("UPDATE users SET api_key = ? WHERE id = ?")
            .bind(api_key)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        self.get_user_by_id(id).await
    }

    // --- Character ---

    async fn get_or_create_character(&self, owner: Uuid) -> PortResult<Character> {
        let existing = sqlx::query_as::<_, CharacterRecord>(
            "SELECT spent, bonuses FROM character WHERE id = ?",
        )
        .bind(owner.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        if let Some(record) = existing {
            return Ok(record.to_domain());
        }

        let fresh = Character::zero();
        sqlx::query("INSERT INTO character (id, spent, bonuses) VALUES (?, ?, ?)")
            .bind(owner.to_string())
            .bind(fresh.spent)
            .bind(fresh.bonuses)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(fresh)
    }

    async fn put_character(&self, owner: Uuid, state: Character) -> PortResult<Character> {
        sqlx::query(
            "INSERT INTO character (id, spent, bonuses) VALUES (?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET spent = excluded.spent, bonuses = excluded.bonuses",
        )
        .bind(owner.to_string())
        .bind(state.spent)
        .bind(state.bonuses)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(state)
    }

    // --- Tasks ---

    async fn list_tasks(
        &self,
        owner: Uuid,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> PortResult<Vec<Task>> {
        let select = "SELECT id, date, description, difficulty, completed, category, \
             estimated_time, actual_time, story, recurring_master_id, goal_alignment, \
             aligned_goal_id, justification, time, bet_amount, bet_multiplier, bet_placed, \
             bet_won, recurrence_rule FROM tasks WHERE user_id = ?";

        let records = match range {
            // Inclusive on both ends; ISO dates compare correctly as text.
            Some((start, end)) => {
                let query = format!("{select} AND date >= ? AND date <= ?");
                sqlx::query_as::<_, TaskRecord>(&query)
                    .bind(owner.to_string())
                    .bind(start.to_string())
                    .bind(end.to_string())
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                sqlx::query_as::<_, TaskRecord>(select)
                    .bind(owner.to_string())
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(unexpected)?;

        records.into_iter().map(TaskRecord::to_domain).collect()
    }

    async fn create_task(&self, owner: Uuid, new: NewTask) -> PortResult<Task> {
        let task = new.into_task(Uuid::new_v4());
        self.persist_task(owner, &task, true).await?;
        Ok(task)
    }

    async fn update_task(&self, owner: Uuid, id: Uuid, patch: TaskPatch) -> PortResult<Task> {
        let mut task = self
            .fetch_task(owner, id)
            .await?
            .ok_or_else(|| PortError::NotFound("Task not found".to_string()))?;
        patch.apply(&mut task);
        self.persist_task(owner, &task, false).await?;
        Ok(task)
    }

    async fn delete_task(&self, owner: Uuid, id: Uuid) -> PortResult<()> {
        self.delete_by_id("tasks", owner, id).await
    }

    // --- Recurring Tasks ---

    async fn list_recurring_tasks(&self, owner: Uuid) -> PortResult<Vec<RecurringTask>> {
        let records = sqlx::query_as::<_, RecurringTaskRecord>(
            "SELECT id, description, difficulty, category, recurrence_rule, start_date, \
             estimated_time, goal_alignment, aligned_goal_id, justification, time, completions \
             FROM recurring_tasks WHERE user_id = ?",
        )
        .bind(owner.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records
            .into_iter()
            .map(RecurringTaskRecord::to_domain)
            .collect()
    }

    async fn create_recurring_task(
        &self,
        owner: Uuid,
        new: NewRecurringTask,
    ) -> PortResult<RecurringTask> {
        let task = new.into_recurring_task(Uuid::new_v4());
        self.persist_recurring_task(owner, &task, true).await?;
        Ok(task)
    }

    async fn update_recurring_task(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: RecurringTaskPatch,
    ) -> PortResult<RecurringTask> {
        let mut task = self
            .fetch_recurring_task(owner, id)
            .await?
            .ok_or_else(|| PortError::NotFound("Recurring Task not found".to_string()))?;
        patch.apply(&mut task);
        self.persist_recurring_task(owner, &task, false).await?;
        Ok(task)
    }

    async fn delete_recurring_task(&self, owner: Uuid, id: Uuid) -> PortResult<()> {
        self.delete_by_id("recurring_tasks", owner, id).await
    }

    // --- Side Quests ---

    async fn list_side_quests(&self, owner: Uuid) -> PortResult<Vec<SideQuest>> {
        let records = sqlx::query_as::<_, SideQuestRecord>(
            "SELECT id, description, difficulty, daily_goal, completions \
             FROM side_quests WHERE user_id = ?",
        )
        .bind(owner.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(SideQuestRecord::to_domain).collect()
    }

    async fn create_side_quest(&self, owner: Uuid, new: NewSideQuest) -> PortResult<SideQuest> {
        let quest = new.into_side_quest(Uuid::new_v4());
        self.persist_side_quest(owner, &quest, true).await?;
        Ok(quest)
    }

    async fn update_side_quest(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: SideQuestPatch,
    ) -> PortResult<SideQuest> {
        let mut quest = self
            .fetch_side_quest(owner, id)
            .await?
            .ok_or_else(|| PortError::NotFound("Side Quest not found".to_string()))?;
        patch.apply(&mut quest);
        self.persist_side_quest(owner, &quest, false).await?;
        Ok(quest)
    }

    async fn delete_side_quest(&self, owner: Uuid, id: Uuid) -> PortResult<()> {
        self.delete_by_id("side_quests", owner, id).await
    }

    // --- Goals ---

    async fn list_goals(&self, owner: Uuid) -> PortResult<Vec<Goal>> {
        let records = sqlx::query_as::<_, GoalRecord>(
            "SELECT id, description, target_date, label, completed, completion_date, \
             completion_proof, completion_feedback, system, contract \
             FROM goals WHERE user_id = ?",
        )
        .bind(owner.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(GoalRecord::to_domain).collect()
    }

    async fn create_goal(&self, owner: Uuid, new: NewGoal) -> PortResult<Goal> {
        let goal = new.into_goal(Uuid::new_v4());
        self.persist_goal(owner, &goal, true).await?;
        Ok(goal)
    }

    async fn update_goal(&self, owner: Uuid, id: Uuid, patch: GoalPatch) -> PortResult<Goal> {
        let mut goal = self
            .fetch_goal(owner, id)
            .await?
            .ok_or_else(|| PortError::NotFound("Goal not found".to_string()))?;
        patch.apply(&mut goal);
        self.persist_goal(owner, &goal, false).await?;
        Ok(goal)
    }

    async fn delete_goal(&self, owner: Uuid, id: Uuid) -> PortResult<()> {
        self.delete_by_id("goals", owner, id).await
    }

    // --- Weekly Goals ---

    async fn list_weekly_goals(&self, owner: Uuid) -> PortResult<Vec<WeeklyGoal>> {
        let records = sqlx::query_as::<_, WeeklyGoalRecord>(
            "SELECT id, description, target_date, aligned_goal_id, goal_alignment, label, \
             evaluation, contract FROM weekly_goals WHERE user_id = ?",
        )
        .bind(owner.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records
            .into_iter()
            .map(WeeklyGoalRecord::to_domain)
            .collect()
    }

    async fn create_weekly_goal(&self, owner: Uuid, new: NewWeeklyGoal) -> PortResult<WeeklyGoal> {
        let goal = new.into_weekly_goal(Uuid::new_v4());
        self.persist_weekly_goal(owner, &goal, true).await?;
        Ok(goal)
    }

    async fn update_weekly_goal(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: WeeklyGoalPatch,
    ) -> PortResult<WeeklyGoal> {
        let mut goal = self
            .fetch_weekly_goal(owner, id)
            .await?
            .ok_or_else(|| PortError::NotFound("Weekly Goal not found".to_string()))?;
        patch.apply(&mut goal);
        self.persist_weekly_goal(owner, &goal, false).await?;
        Ok(goal)
    }

    async fn delete_weekly_goal(&self, owner: Uuid, id: Uuid) -> PortResult<()> {
        self.delete_by_id("weekly_goals", owner, id).await
    }

    // --- Rewards ---

    async fn list_rewards(&self, owner: Uuid) -> PortResult<Vec<Reward>> {
        let records = sqlx::query_as::<_, RewardRecord>(
            "SELECT id, name, cost FROM rewards WHERE user_id = ?",
        )
        .bind(owner.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(RewardRecord::to_domain).collect()
    }

    async fn create_reward(&self, owner: Uuid, new: NewReward) -> PortResult<Reward> {
        let reward = new.into_reward(Uuid::new_v4());
        sqlx::query("INSERT INTO rewards (id, user_id, name, cost) VALUES (?, ?, ?, ?)")
            .bind(reward.id.to_string())
            .bind(owner.to_string())
            .bind(&reward.name)
            .bind(reward.cost)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(reward)
    }

    async fn update_reward(&self, owner: Uuid, id: Uuid, patch: RewardPatch) -> PortResult<Reward> {
        let mut reward = sqlx::query_as::<_, RewardRecord>(
            "SELECT id, name, cost FROM rewards WHERE id = ? AND user_id = ?",
        )
        .bind(id.to_string())
        .bind(owner.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound("Reward not found".to_string()))?
        .to_domain()?;

        patch.apply(&mut reward);
        sqlx::query("UPDATE rewards SET name = ?, cost = ? WHERE id = ? AND user_id = ?")
            .bind(&reward.name)
            .bind(reward.cost)
            .bind(reward.id.to_string())
            .bind(owner.to_string())
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(reward)
    }

    async fn delete_reward(&self, owner: Uuid, id: Uuid) -> PortResult<()> {
        self.delete_by_id("rewards", owner, id).await
    }

    // --- Purchased Rewards ---

    async fn list_purchased_rewards(&self, owner: Uuid) -> PortResult<Vec<PurchasedReward>> {
        let records = sqlx::query_as::<_, PurchasedRewardRecord>(
            "SELECT id, reward_id, name, cost, purchase_date \
             FROM purchased_rewards WHERE user_id = ?",
        )
        .bind(owner.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records
            .into_iter()
            .map(PurchasedRewardRecord::to_domain)
            .collect()
    }

    async fn create_purchased_reward(
        &self,
        owner: Uuid,
        new: NewPurchasedReward,
    ) -> PortResult<PurchasedReward> {
        let purchase = new.into_purchased_reward(Uuid::new_v4());
        sqlx::query(
            "INSERT INTO purchased_rewards (id, user_id, reward_id, name, cost, purchase_date) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(purchase.id.to_string())
        .bind(owner.to_string())
        .bind(purchase.reward_id.to_string())
        .bind(&purchase.name)
        .bind(purchase.cost)
        .bind(purchase.purchase_date.to_string())
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(purchase)
    }

    async fn update_purchased_reward(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: PurchasedRewardPatch,
    ) -> PortResult<PurchasedReward> {
        let mut purchase = sqlx::query_as::<_, PurchasedRewardRecord>(
            "SELECT id, reward_id, name, cost, purchase_date \
             FROM purchased_rewards WHERE id = ? AND user_id = ?",
        )
        .bind(id.to_string())
        .bind(owner.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound("Purchased Reward not found".to_string()))?
        .to_domain()?;

        patch.apply(&mut purchase);
        sqlx::query(
            "UPDATE purchased_rewards SET reward_id = ?, name = ?, cost = ?, purchase_date = ? \
             WHERE id = ? AND user_id = ?",
        )
        .bind(purchase.reward_id.to_string())
        .bind(&purchase.name)
        .bind(purchase.cost)
        .bind(purchase.purchase_date.to_string())
        .bind(purchase.id.to_string())
        .bind(owner.to_string())
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(purchase)
    }

    async fn delete_purchased_reward(&self, owner: Uuid, id: Uuid) -> PortResult<()> {
        self.delete_by_id("purchased_rewards", owner, id).await
    }

    // --- Diary Entries ---

    async fn list_diary_entries(&self, owner: Uuid) -> PortResult<Vec<DiaryEntry>> {
        let records = sqlx::query_as::<_, DiaryEntryRecord>(
            "SELECT date, initial_reflection, initial_feedback, debrief, final_feedback, grade \
             FROM diary_entries WHERE user_id = ?",
        )
        .bind(owner.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(DiaryEntryRecord::to_domain).collect()
    }

    async fn upsert_diary_entry(
        &self,
        owner: Uuid,
        date: NaiveDate,
        patch: DiaryEntryPatch,
    ) -> PortResult<DiaryEntry> {
        let existing = sqlx::query_as::<_, DiaryEntryRecord>(
            "SELECT date, initial_reflection, initial_feedback, debrief, final_feedback, grade \
             FROM diary_entries WHERE date = ? AND user_id = ?",
        )
        .bind(date.to_string())
        .bind(owner.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        match existing {
            Some(record) => {
                let mut entry = record.to_domain()?;
                patch.apply(&mut entry);
                sqlx::query(
                    "UPDATE diary_entries SET initial_reflection = ?, initial_feedback = ?, \
                     debrief = ?, final_feedback = ?, grade = ? WHERE date = ? AND user_id = ?",
                )
                .bind(&entry.initial_reflection)
                .bind(&entry.initial_feedback)
                .bind(&entry.debrief)
                .bind(&entry.final_feedback)
                .bind(&entry.grade)
                .bind(date.to_string())
                .bind(owner.to_string())
                .execute(&self.pool)
                .await
                .map_err(unexpected)?;
                Ok(entry)
            }
            None => {
                let mut entry = DiaryEntry::empty(date);
                patch.apply(&mut entry);
                sqlx::query(
                    "INSERT INTO diary_entries (date, user_id, initial_reflection, \
                     initial_feedback, debrief, final_feedback, grade) \
                     VALUES (?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(date.to_string())
                .bind(owner.to_string())
                .bind(&entry.initial_reflection)
                .bind(&entry.initial_feedback)
                .bind(&entry.debrief)
                .bind(&entry.final_feedback)
                .bind(&entry.grade)
                .execute(&self.pool)
                .await
                .map_err(unexpected)?;
                Ok(entry)
            }
        }
    }

    async fn delete_diary_entry(&self, owner: Uuid, date: NaiveDate) -> PortResult<()> {
        sqlx::query("DELETE FROM diary_entries WHERE date = ? AND user_id = ?")
            .bind(date.to_string())
            .bind(owner.to_string())
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    // --- Wish List ---

    async fn list_wishes(&self, owner: Uuid) -> PortResult<Vec<Wish>> {
        let records = sqlx::query_as::<_, WishRecord>(
            "SELECT id, description, explanation, label FROM wish_list WHERE user_id = ?",
        )
        .bind(owner.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(WishRecord::to_wish).collect()
    }

    async fn create_wish(&self, owner: Uuid, new: NewWish) -> PortResult<Wish> {
        let wish = new.into_wish(Uuid::new_v4());
        sqlx::query(
            "INSERT INTO wish_list (id, user_id, description, explanation, label) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(wish.id.to_string())
        .bind(owner.to_string())
        .bind(&wish.description)
        .bind(&wish.explanation)
        .bind(&wish.label)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(wish)
    }

    async fn update_wish(&self, owner: Uuid, id: Uuid, patch: WishPatch) -> PortResult<Wish> {
        let mut wish = sqlx::query_as::<_, WishRecord>(
            "SELECT id, description, explanation, label \
             FROM wish_list WHERE id = ? AND user_id = ?",
        )
        .bind(id.to_string())
        .bind(owner.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound("Wish not found".to_string()))?
        .to_wish()?;

        patch.apply(&mut wish);
        sqlx::query(
            "UPDATE wish_list SET description = ?, explanation = ?, label = ? \
             WHERE id = ? AND user_id = ?",
        )
        .bind(&wish.description)
        .bind(&wish.explanation)
        .bind(&wish.label)
        .bind(wish.id.to_string())
        .bind(owner.to_string())
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(wish)
    }

    async fn delete_wish(&self, owner: Uuid, id: Uuid) -> PortResult<()> {
        self.delete_by_id("wish_list", owner, id).await
    }

    // --- Core List ---

    async fn list_core_tasks(&self, owner: Uuid) -> PortResult<Vec<CoreTask>> {
        let records = sqlx::query_as::<_, WishRecord>(
            "SELECT id, description, explanation, label FROM core_list WHERE user_id = ?",
        )
        .bind(owner.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(WishRecord::to_core_task).collect()
    }

    async fn create_core_task(&self, owner: Uuid, new: NewCoreTask) -> PortResult<CoreTask> {
        let task = new.into_core_task(Uuid::new_v4());
        sqlx::query(
            "INSERT INTO core_list (id, user_id, description, explanation, label) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(task.id.to_string())
        .bind(owner.to_string())
        .bind(&task.description)
        .bind(&task.explanation)
        .bind(&task.label)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(task)
    }

    async fn update_core_task(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: CoreTaskPatch,
    ) -> PortResult<CoreTask> {
        let mut task = sqlx::query_as::<_, WishRecord>(
            "SELECT id, description, explanation, label \
             FROM core_list WHERE id = ? AND user_id = ?",
        )
        .bind(id.to_string())
        .bind(owner.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound("Core Task not found".to_string()))?
        .to_core_task()?;

        patch.apply(&mut task);
        sqlx::query(
            "UPDATE core_list SET description = ?, explanation = ?, label = ? \
             WHERE id = ? AND user_id = ?",
        )
        .bind(&task.description)
        .bind(&task.explanation)
        .bind(&task.label)
        .bind(task.id.to_string())
        .bind(owner.to_string())
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(task)
    }

    async fn delete_core_task(&self, owner: Uuid, id: Uuid) -> PortResult<()> {
        self.delete_by_id("core_list", owner, id).await
    }
}
