pub mod domain;
pub mod patch;
pub mod ports;

pub use domain::{
    AtomicHabitsSuggestions, Character, CoreTask, DiaryEntry, Difficulty, Goal, GoalContract,
    GoalKind, GoalKpi, PurchasedReward, RecurrenceRule, RecurringCompletion, RecurringTask, Reward,
    SideQuest, Task, User, UserCredentials, WeeklyGoal, WeeklyGoalEvaluation, Wish,
};
pub use patch::Patch;
pub use ports::{DatabaseService, PortError, PortResult, TextGenerationService};
