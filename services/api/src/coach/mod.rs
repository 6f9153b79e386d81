//! services/api/src/coach/mod.rs
//!
//! The coach wraps the generative-text port with the drill-instructor persona
//! and one method per coaching operation. Every operation is total: if the
//! model call fails for any reason (network, timeout, bad credentials,
//! malformed JSON) the method logs a warning and returns a hard-coded
//! fallback reply instead of an error.

pub mod types;

use goggins_core::domain::{AtomicHabitsSuggestions, Goal, GoalContract, WeeklyGoalEvaluation};
use goggins_core::ports::{PortError, PortResult, TextGenerationService};
use serde::de::DeserializeOwned;
use std::sync::Arc;

pub use types::*;

//=========================================================================================
// Persona
//=========================================================================================

pub const GOGGINS_PERSONA: &str = "\
You are David Goggins. You are the hardest man alive. \n\
Your tone is intense, military, uncompromising, but ultimately supportive of growth through suffering.\n\
You do not coddle. You do not accept excuses. You demand calloused minds.\n\
Use phrases like \"Stay hard\", \"Who's gonna carry the boats\", \"Merry Christmas\", \"Roger that\", \"Taking souls\".\n";

//=========================================================================================
// Reply wrapper
//=========================================================================================

/// Marks whether a reply came from the model or from the offline fallback.
/// Handlers serialize the inner value either way; the flag only drives
/// logging.
#[derive(Debug)]
pub enum CoachReply<T> {
    Generated(T),
    Fallback(T),
}

impl<T> CoachReply<T> {
    pub fn into_inner(self) -> T {
        match self {
            CoachReply::Generated(inner) | CoachReply::Fallback(inner) => inner,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, CoachReply::Fallback(_))
    }
}

//=========================================================================================
// The Coach
//=========================================================================================

#[derive(Clone)]
pub struct Coach {
    gateway: Arc<dyn TextGenerationService>,
}

fn goal_descriptions(goals: &[Goal]) -> Vec<&str> {
    goals.iter().map(|g| g.description.as_str()).collect()
}

impl Coach {
    pub fn new(gateway: Arc<dyn TextGenerationService>) -> Self {
        Self { gateway }
    }

    async fn ask_text(&self, api_key: &str, prompt: &str) -> PortResult<String> {
        self.gateway.generate_text(api_key, prompt).await
    }

    async fn ask_json<T: DeserializeOwned>(&self, api_key: &str, prompt: &str) -> PortResult<T> {
        let value = self.gateway.generate_json(api_key, prompt).await?;
        serde_json::from_value(value)
            .map_err(|e| PortError::Unexpected(format!("reply did not match schema: {e}")))
    }

    fn fallback<T>(&self, operation: &str, error: &PortError, value: T) -> CoachReply<T> {
        tracing::warn!(operation, %error, "coach falling back to canned reply");
        CoachReply::Fallback(value)
    }

    //=====================================================================================
    // Operations
    //=====================================================================================

    pub async fn story(
        &self,
        api_key: &str,
        username: &str,
        request: StoryRequest,
    ) -> CoachReply<StoryReply> {
        let prompt = format!(
            "{GOGGINS_PERSONA}\n\
             User: {username}\n\
             Generate a very short, intense motivational story (max 3 sentences) for a user finding a task.\n\
             Task: {}\n\
             Difficulty: {}\n\
             Category: {}\n\
             Estimated Time: {} mins.\n\
             Justification: {}\n\
             Goals: {:?}\n\n\
             The story should be about overcoming the specific resistance of this task.",
            request.task.description,
            request.task.difficulty,
            request.task.category,
            request.task.estimated_time,
            request.justification.as_deref().unwrap_or("None"),
            goal_descriptions(&request.goals),
        );
        match self.ask_text(api_key, &prompt).await {
            Ok(story) => CoachReply::Generated(StoryReply { story }),
            Err(e) => self.fallback(
                "story",
                &e,
                StoryReply {
                    story: format!("Stay hard, {username}. The AI is offline, but you are not."),
                },
            ),
        }
    }

    pub async fn label(&self, api_key: &str, request: LabelRequest) -> CoachReply<LabelReply> {
        let prompt = format!(
            "Classify this text into one of these exact categories: 'Physical Training', \
             'Mental Fortitude', 'Discipline', 'Uncomfortable Zone', 'Side Quest', 'Recovery'.\n\
             Text: \"{}\"\n\
             Return ONLY the category name.",
            request.text,
        );
        match self.ask_text(api_key, &prompt).await {
            Ok(label) => CoachReply::Generated(LabelReply {
                label: label.replace('\'', "").replace('"', ""),
            }),
            Err(e) => self.fallback(
                "label",
                &e,
                LabelReply {
                    label: "General".to_string(),
                },
            ),
        }
    }

    pub async fn analyze_goal_alignment(
        &self,
        api_key: &str,
        request: AlignmentRequest,
    ) -> CoachReply<AlignmentVerdict> {
        let goals = if request.active_goals.is_empty() {
            "No active goals.".to_string()
        } else {
            request
                .active_goals
                .iter()
                .map(|g| format!("- {}: {}", g.id, g.description))
                .collect::<Vec<_>>()
                .join("\n")
        };
        let prompt = format!(
            "Analyze if this task aligns with any active goals.\n\
             Task: \"{}\"\n\
             Active Goals:\n{goals}\n\n\
             Return JSON with:\n\
             - alignmentScore (1-10)\n\
             - justification (Why?)\n\
             - alignedGoalId (The ID of the aligned goal, or null)",
            request.task_description,
        );
        match self.ask_json(api_key, &prompt).await {
            Ok(verdict) => CoachReply::Generated(verdict),
            Err(e) => self.fallback(
                "analyze-goal-alignment",
                &e,
                AlignmentVerdict {
                    alignment_score: 5.0,
                    justification: "Analysis failed. Assuming neutral impact.".to_string(),
                    aligned_goal_id: None,
                },
            ),
        }
    }

    pub async fn reflection_feedback(
        &self,
        api_key: &str,
        request: ReflectionRequest,
    ) -> CoachReply<FeedbackReply> {
        let prompt = format!(
            "{GOGGINS_PERSONA}\n\
             The user wrote this reflection for their morning briefing:\n\
             \"{}\"\n\
             Goals: {:?}\n\n\
             Give them intense feedback. 1-2 sentences.",
            request.reflection,
            goal_descriptions(&request.goals),
        );
        match self.ask_text(api_key, &prompt).await {
            Ok(feedback) => CoachReply::Generated(FeedbackReply { feedback }),
            Err(e) => self.fallback(
                "reflection-feedback",
                &e,
                FeedbackReply {
                    feedback: "Good morning. Get after it. (Offline)".to_string(),
                },
            ),
        }
    }

    pub async fn diary_feedback(
        &self,
        api_key: &str,
        request: DiaryFeedbackRequest,
    ) -> CoachReply<DiaryVerdict> {
        let debrief = &request.debrief;
        let done = debrief.tasks.iter().filter(|t| t.completed).count();
        let prompt = format!(
            "{GOGGINS_PERSONA}\n\
             Analyze this daily debrief.\n\
             Morning Reflection: {}\n\
             Debrief Entry: {}\n\
             Tasks Completed: {done}/{}\n\
             Earnings: ${}\n\n\
             Return JSON:\n\
             - feedback (Intense Goggins commentary)\n\
             - grade (A, B, C, D, or F)",
            debrief.initial_reflection.as_deref().unwrap_or("N/A"),
            debrief.debrief_entry.as_deref().unwrap_or(""),
            debrief.tasks.len(),
            debrief.earnings.unwrap_or(0.0),
        );
        match self.ask_json(api_key, &prompt).await {
            Ok(verdict) => CoachReply::Generated(verdict),
            Err(e) => self.fallback(
                "diary-feedback",
                &e,
                DiaryVerdict {
                    feedback: "Log received. Stay hard.".to_string(),
                    grade: "N/A".to_string(),
                },
            ),
        }
    }

    pub async fn review(&self, api_key: &str, request: ReviewRequest) -> CoachReply<ReviewReport> {
        let prompt = format!(
            "{GOGGINS_PERSONA}\n\
             Review this performance.\n\
             Data: {}\n\
             Goals: {:?}\n\n\
             Return JSON:\n\
             - good (List of strings, what they did well)\n\
             - bad (List of strings, where they were weak)\n\
             - suggestions (Object with 'keep', 'remove', 'add' lists of strings)",
            request.review_data,
            goal_descriptions(&request.goals),
        );
        match self.ask_json(api_key, &prompt).await {
            Ok(report) => CoachReply::Generated(report),
            Err(e) => self.fallback(
                "review",
                &e,
                ReviewReport {
                    good: vec!["You showed up".to_string()],
                    bad: vec!["Data unavailable".to_string()],
                    suggestions: ReviewSuggestions {
                        keep: vec![],
                        remove: vec![],
                        add: vec![],
                    },
                },
            ),
        }
    }

    pub async fn goal_change_verdict(
        &self,
        api_key: &str,
        request: GoalChangeRequest,
    ) -> CoachReply<Verdict> {
        let prompt = format!(
            "{GOGGINS_PERSONA}\n\
             User says: \"{}\" for changing goal: \"{}\"\n\n\
             Is this a valid strategic pivot or cowardice?\n\
             Return JSON:\n\
             - approved (boolean)\n\
             - feedback (string, intense criticism or approval)",
            request.justification, request.current_goal,
        );
        match self.ask_json(api_key, &prompt).await {
            Ok(verdict) => CoachReply::Generated(verdict),
            Err(e) => self.fallback(
                "goal-change-verdict",
                &e,
                Verdict {
                    approved: false,
                    feedback: "System offline. Hold the line.".to_string(),
                },
            ),
        }
    }

    pub async fn goal_completion_verdict(
        &self,
        api_key: &str,
        request: GoalCompletionRequest,
    ) -> CoachReply<Verdict> {
        let prompt = format!(
            "{GOGGINS_PERSONA}\n\
             User claims completion of: \"{}\"\n\
             Proof provided: \"{}\"\n\n\
             Evaluate the truth.\n\
             Return JSON:\n\
             - approved (boolean)\n\
             - feedback (string)",
            request.goal_description, request.completion_proof,
        );
        match self.ask_json(api_key, &prompt).await {
            Ok(verdict) => CoachReply::Generated(verdict),
            Err(e) => self.fallback(
                "goal-completion-verdict",
                &e,
                Verdict {
                    approved: true,
                    feedback: "Logged. (Offline)".to_string(),
                },
            ),
        }
    }

    pub async fn atomic_system(
        &self,
        api_key: &str,
        request: AtomicSystemRequest,
    ) -> CoachReply<AtomicHabitsSuggestions> {
        let prompt = format!(
            "Generate Atomic Habits system (James Clear style) for goal: \"{}\".\n\
             User context: {:?}\n\
             Accomplishments so far: {}\n\
             Return JSON with 4 keys: obvious, attractive, easy, satisfying (each a list of strings).",
            request.new_goal.description,
            goal_descriptions(&request.all_goals),
            request.accomplishments_summary,
        );
        match self.ask_json(api_key, &prompt).await {
            Ok(system) => CoachReply::Generated(system),
            Err(e) => self.fallback(
                "atomic-system",
                &e,
                AtomicHabitsSuggestions {
                    obvious: vec!["Define the goal clearly".to_string()],
                    attractive: vec!["Visualize success".to_string()],
                    easy: vec!["Start small".to_string()],
                    satisfying: vec!["Track progress".to_string()],
                },
            ),
        }
    }

    pub async fn weekly_briefing(
        &self,
        api_key: &str,
        username: &str,
        request: WeeklyBriefingRequest,
    ) -> CoachReply<BriefingReply> {
        let evals = request
            .previous_week_evaluations
            .iter()
            .map(|e| format!("{} ({})", e.feedback, e.alignment_score))
            .collect::<Vec<_>>();
        let next_week = request
            .next_week_goals
            .iter()
            .map(|g| g.description.as_str())
            .collect::<Vec<_>>();
        let prompt = format!(
            "{GOGGINS_PERSONA}\n\
             Write a weekly briefing for {username}.\n\
             Prev Week Evals: {evals:?}\n\
             Next Week Goals: {next_week:?}\n\
             Long Term Goals: {:?}\n\n\
             Keep it short, brutal, and directive.",
            goal_descriptions(&request.long_term_goals),
        );
        match self.ask_text(api_key, &prompt).await {
            Ok(briefing) => CoachReply::Generated(BriefingReply { briefing }),
            Err(e) => self.fallback(
                "weekly-briefing",
                &e,
                BriefingReply {
                    briefing: "New week. New war. Get after it.".to_string(),
                },
            ),
        }
    }

    pub async fn enhance_text(
        &self,
        api_key: &str,
        request: EnhanceTextRequest,
    ) -> CoachReply<EnhanceReply> {
        let prompt = format!(
            "{GOGGINS_PERSONA}\n\
             Rewrite this to be more intense, clearer, and harder.\n\
             Text: \"{}\"\n\
             Type: {}",
            request.text, request.kind,
        );
        match self.ask_text(api_key, &prompt).await {
            Ok(enhanced) => CoachReply::Generated(EnhanceReply {
                enhanced_text: enhanced,
            }),
            Err(e) => self.fallback(
                "enhance-text",
                &e,
                EnhanceReply {
                    enhanced_text: request.text,
                },
            ),
        }
    }

    pub async fn chat(
        &self,
        api_key: &str,
        username: &str,
        request: ChatRequest,
    ) -> CoachReply<ChatReply> {
        let mut conversation = format!("{GOGGINS_PERSONA}\nUser: {username}\n");
        // Only the last 10 messages are sent; older context is dropped.
        let start = request.messages.len().saturating_sub(10);
        for message in &request.messages[start..] {
            let role = if message.sender == "user" {
                "User"
            } else {
                "David Goggins"
            };
            conversation.push_str(&format!("{role}: {}\n", message.content));
        }
        conversation.push_str("David Goggins:");

        match self.ask_text(api_key, &conversation).await {
            Ok(response) => CoachReply::Generated(ChatReply { response }),
            Err(e) => self.fallback(
                "chat",
                &e,
                ChatReply {
                    response: "Radio silence. (Offline)".to_string(),
                },
            ),
        }
    }

    pub async fn contract(
        &self,
        api_key: &str,
        request: ContractRequest,
    ) -> CoachReply<GoalContract> {
        let prompt = format!(
            "{GOGGINS_PERSONA}\n\
             Generate a binding Goal Contract for: \"{}\".\n\
             Type: {}\n\n\
             Return JSON matching this schema:\n\
             {{\n\
                 \"primaryObjective\": \"string\",\n\
                 \"contractStatement\": \"intense goggins pledge\",\n\
                 \"rewardPayout\": float (GP value),\n\
                 \"kpis\": [{{ \"description\": \"string\", \"type\": \"Internal Metric\" | \"External Metric\", \"target\": \"string\" }}],\n\
                 \"preStateAnswers\": [],\n\
                 \"fiveWhys\": [\"string\", \"string\", \"string\", \"string\", \"string\"]\n\
             }}",
            request.description, request.kind,
        );
        match self.ask_json(api_key, &prompt).await {
            Ok(contract) => CoachReply::Generated(contract),
            Err(e) => self.fallback(
                "contract",
                &e,
                GoalContract {
                    primary_objective: request.description,
                    contract_statement: "I will not fail.".to_string(),
                    reward_payout: 100.0,
                    kpis: vec![],
                    pre_state_answers: vec![],
                    five_whys: vec!["Stub".to_string(); 5],
                },
            ),
        }
    }

    pub async fn betting_odds(
        &self,
        api_key: &str,
        request: BettingOddsRequest,
    ) -> CoachReply<BettingOdds> {
        let context = request
            .context
            .map(|c| c.to_string())
            .unwrap_or_else(|| "None".to_string());
        let prompt = format!(
            "{GOGGINS_PERSONA}\n\
             Calculate betting odds for this task:\n\
             Description: {}\n\
             Difficulty: {}\n\
             Category: {}\n\
             Estimated Time: {} mins\n\
             Context: {context}\n\n\
             Return JSON:\n\
             - multiplier (float, usually 1.5 to 5.0 depending on risk)\n\
             - rationale (string, why these odds?)",
            request.description, request.difficulty, request.category, request.estimated_time,
        );
        match self.ask_json(api_key, &prompt).await {
            Ok(odds) => CoachReply::Generated(odds),
            Err(e) => self.fallback(
                "betting-odds",
                &e,
                BettingOdds {
                    multiplier: 2.0,
                    rationale: "Standard risk. Get after it.".to_string(),
                },
            ),
        }
    }

    pub async fn evaluate_weekly(
        &self,
        api_key: &str,
        request: EvaluateWeeklyRequest,
    ) -> CoachReply<WeeklyGoalEvaluation> {
        let completed = serde_json::Value::Array(request.completed_tasks);
        let purchased = serde_json::Value::Array(request.purchased_rewards);
        let prompt = format!(
            "{GOGGINS_PERSONA}\n\
             Evaluate this weekly goal: \"{}\"\n\
             Completed tasks: {completed}\n\
             Rewards purchased: {purchased}\n\n\
             Return JSON:\n\
             - alignmentScore (float 1-10)\n\
             - feedback (string, brutal honesty)",
            request.description,
        );
        match self.ask_json(api_key, &prompt).await {
            Ok(evaluation) => CoachReply::Generated(evaluation),
            Err(e) => self.fallback(
                "evaluate-weekly",
                &e,
                WeeklyGoalEvaluation {
                    alignment_score: 5.0,
                    feedback: "Evaluation offline. Keep grinding.".to_string(),
                },
            ),
        }
    }
}

//=========================================================================================
// Tests
//=========================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// A gateway that always fails, to exercise the fallback paths.
    struct OfflineGateway;

    #[async_trait]
    impl TextGenerationService for OfflineGateway {
        async fn generate_text(&self, _: &str, _: &str) -> PortResult<String> {
            Err(PortError::Unexpected("offline".to_string()))
        }

        async fn generate_json(&self, _: &str, _: &str) -> PortResult<serde_json::Value> {
            Err(PortError::Unexpected("offline".to_string()))
        }
    }

    /// A gateway that records prompts and replies with fixed content.
    struct CannedGateway {
        text: String,
        json: serde_json::Value,
        prompts: Mutex<Vec<String>>,
    }

    impl CannedGateway {
        fn new(text: &str, json: serde_json::Value) -> Self {
            Self {
                text: text.to_string(),
                json,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextGenerationService for CannedGateway {
        async fn generate_text(&self, _: &str, prompt: &str) -> PortResult<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.text.clone())
        }

        async fn generate_json(&self, _: &str, prompt: &str) -> PortResult<serde_json::Value> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.json.clone())
        }
    }

    fn offline_coach() -> Coach {
        Coach::new(Arc::new(OfflineGateway))
    }

    #[tokio::test]
    async fn story_fallback_names_the_user() {
        let reply = offline_coach()
            .story(
                "key",
                "david",
                serde_json::from_value(serde_json::json!({
                    "task": {
                        "id": "11111111-1111-1111-1111-111111111111",
                        "date": "2025-01-06",
                        "description": "Run 5 miles",
                        "difficulty": "Hard",
                        "completed": false,
                        "category": "Physical Training",
                        "estimatedTime": 45.0
                    },
                    "goals": []
                }))
                .unwrap(),
            )
            .await;
        assert!(reply.is_fallback());
        assert_eq!(
            reply.into_inner().story,
            "Stay hard, david. The AI is offline, but you are not."
        );
    }

    #[tokio::test]
    async fn label_strips_quotes_from_genuine_reply() {
        let coach = Coach::new(Arc::new(CannedGateway::new(
            "'Discipline'",
            serde_json::Value::Null,
        )));
        let reply = coach
            .label(
                "key",
                LabelRequest {
                    text: "cold shower".to_string(),
                },
            )
            .await;
        assert!(!reply.is_fallback());
        assert_eq!(reply.into_inner().label, "Discipline");
    }

    #[tokio::test]
    async fn alignment_fallback_is_neutral() {
        let reply = offline_coach()
            .analyze_goal_alignment(
                "key",
                AlignmentRequest {
                    task_description: "read".to_string(),
                    active_goals: vec![],
                },
            )
            .await;
        let verdict = reply.into_inner();
        assert_eq!(verdict.alignment_score, 5.0);
        assert_eq!(verdict.justification, "Analysis failed. Assuming neutral impact.");
        assert!(verdict.aligned_goal_id.is_none());
    }

    #[tokio::test]
    async fn contract_fallback_echoes_description() {
        let reply = offline_coach()
            .contract(
                "key",
                ContractRequest {
                    description: "Deadlift 400".to_string(),
                    kind: "goal".to_string(),
                },
            )
            .await;
        let contract = reply.into_inner();
        assert_eq!(contract.primary_objective, "Deadlift 400");
        assert_eq!(contract.contract_statement, "I will not fail.");
        assert_eq!(contract.five_whys.len(), 5);
    }

    #[tokio::test]
    async fn enhance_fallback_echoes_input() {
        let reply = offline_coach()
            .enhance_text(
                "key",
                EnhanceTextRequest {
                    text: "do stuff".to_string(),
                    kind: "task".to_string(),
                },
            )
            .await;
        assert_eq!(reply.into_inner().enhanced_text, "do stuff");
    }

    #[tokio::test]
    async fn chat_keeps_only_the_last_ten_messages() {
        let gateway = Arc::new(CannedGateway::new("Roger that.", serde_json::Value::Null));
        let coach = Coach::new(gateway.clone());

        let messages = (0..15)
            .map(|i| ChatMessage {
                sender: "user".to_string(),
                content: format!("message-{i}"),
            })
            .collect();
        let reply = coach.chat("key", "david", ChatRequest { messages }).await;
        assert_eq!(reply.into_inner().response, "Roger that.");

        let prompts = gateway.prompts.lock().unwrap();
        let prompt = &prompts[0];
        assert!(!prompt.contains("message-4"));
        assert!(prompt.contains("message-5"));
        assert!(prompt.contains("message-14"));
        assert!(prompt.ends_with("David Goggins:"));
    }

    #[tokio::test]
    async fn structured_reply_that_fails_schema_falls_back() {
        let coach = Coach::new(Arc::new(CannedGateway::new(
            "",
            serde_json::json!({"totally": "unrelated"}),
        )));
        let reply = coach
            .goal_change_verdict(
                "key",
                GoalChangeRequest {
                    justification: "new job".to_string(),
                    current_goal: "old goal".to_string(),
                },
            )
            .await;
        assert!(reply.is_fallback());
        let verdict = reply.into_inner();
        assert!(!verdict.approved);
        assert_eq!(verdict.feedback, "System offline. Hold the line.");
    }
}
