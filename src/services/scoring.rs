use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::domain::{QuestionResult, QuizQuestion};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ScoreResult {
    /// 0-100, half-up rounded.
    pub score: i16,
    pub correct_count: i16,
    pub total_questions: i16,
    pub question_results: Vec<QuestionResult>,
}

/// Deterministic auto-marking of a multiple-choice submission.
///
/// Missing answers count as incorrect; question ids not present on the quiz
/// are ignored. `total_questions` is the quiz's question count regardless of
/// how many questions were answered.
pub fn score(questions: &[QuizQuestion], submitted: &HashMap<String, i16>) -> ScoreResult {
    let total_questions = questions.len() as i16;
    let mut correct_count: i16 = 0;
    let mut question_results = Vec::with_capacity(questions.len());

    for question in questions {
        let selected_option = submitted.get(&question.id).copied();
        let correct = selected_option == Some(question.correct_option);
        if correct {
            correct_count += 1;
        }

        question_results.push(QuestionResult {
            question_id: question.id.clone(),
            selected_option,
            correct,
        });
    }

    ScoreResult {
        score: percentage(correct_count, total_questions),
        correct_count,
        total_questions,
        question_results,
    }
}

// Half-up rounding of correct/total*100 in integer arithmetic.
fn percentage(correct: i16, total: i16) -> i16 {
    if total == 0 {
        return 0;
    }
    ((correct as i32 * 200 + total as i32) / (2 * total as i32)) as i16
}
