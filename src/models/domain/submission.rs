use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::scoring::ScoreResult;

/// The scored record of one accepted submission. Immutable once created;
/// the orchestrator is the only writer.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SubmissionResult {
    pub id: String,
    pub student_id: String,
    pub quiz_id: String,
    /// question id -> selected option index, as submitted.
    pub answers: HashMap<String, i16>,
    /// 0-100, half-up rounded.
    pub score: i16,
    pub correct_count: i16,
    pub total_questions: i16,
    pub question_results: Vec<QuestionResult>,
    pub time_spent_seconds: i64,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuestionResult {
    pub question_id: String,
    pub selected_option: Option<i16>,
    pub correct: bool,
}

impl SubmissionResult {
    pub fn from_score(
        student_id: &str,
        quiz_id: &str,
        answers: HashMap<String, i16>,
        score: ScoreResult,
        time_spent_seconds: i64,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            student_id: student_id.to_string(),
            quiz_id: quiz_id.to_string(),
            answers,
            score: score.score,
            correct_count: score.correct_count,
            total_questions: score.total_questions,
            question_results: score.question_results,
            time_spent_seconds,
            submitted_at,
            created_at: Some(submitted_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submission_result_round_trip_preserves_scoring_fields() {
        let result = SubmissionResult {
            id: "result-1".to_string(),
            student_id: "s1".to_string(),
            quiz_id: "quiz-1".to_string(),
            answers: HashMap::from([("q1".to_string(), 2)]),
            score: 80,
            correct_count: 4,
            total_questions: 5,
            question_results: vec![QuestionResult {
                question_id: "q1".to_string(),
                selected_option: Some(2),
                correct: true,
            }],
            time_spent_seconds: 1800,
            submitted_at: Utc::now(),
            created_at: Some(Utc::now()),
        };

        let json = serde_json::to_string(&result).expect("result should serialize");
        let parsed: SubmissionResult =
            serde_json::from_str(&json).expect("result should deserialize");

        assert_eq!(parsed.score, 80);
        assert_eq!(parsed.correct_count, 4);
        assert_eq!(parsed.total_questions, 5);
        assert_eq!(parsed.answers.get("q1"), Some(&2));
        assert!(parsed.question_results[0].correct);
    }
}
