pub mod fixtures {
    use chrono::{Duration, Utc};
    use std::collections::HashMap;

    use crate::models::domain::{Quiz, QuizQuestion};

    /// An open five-question quiz: window [now-1h, now+1h], no access code,
    /// no IP restriction, no assignment.
    pub fn open_quiz() -> Quiz {
        let now = Utc::now();
        Quiz {
            id: "quiz-1".to_string(),
            title: "Midterm".to_string(),
            created_by_user_id: "teacher-1".to_string(),
            starts_at: now - Duration::hours(1),
            ends_at: Some(now + Duration::hours(1)),
            access_code_hash: None,
            allowed_networks: vec![],
            assigned_student_ids: vec![],
            questions: five_questions(),
            created_at: Some(now),
            modified_at: Some(now),
        }
    }

    pub fn five_questions() -> Vec<QuizQuestion> {
        (0..5)
            .map(|i| QuizQuestion {
                id: format!("q{}", i + 1),
                prompt: format!("Question {}", i + 1),
                option_count: 4,
                correct_option: (i % 4) as i16,
                order: i as i16,
            })
            .collect()
    }

    /// Answers matching the key on four of the five questions.
    pub fn four_of_five_answers(questions: &[QuizQuestion]) -> HashMap<String, i16> {
        let mut answers: HashMap<String, i16> = questions
            .iter()
            .map(|q| (q.id.clone(), q.correct_option))
            .collect();
        let last = &questions[questions.len() - 1];
        answers.insert(last.id.clone(), (last.correct_option + 1) % last.option_count);
        answers
    }
}

pub mod mocks {
    use chrono::{DateTime, Utc};
    use mockall::mock;

    use crate::errors::AppResult;
    use crate::models::domain::{Quiz, SubmissionResult, UsedTicket};
    use crate::repositories::{QuizRepository, SubmissionRepository, TicketRepository};

    mock! {
        pub QuizRepo {}

        #[async_trait::async_trait]
        impl QuizRepository for QuizRepo {
            async fn find_by_id(&self, id: &str) -> AppResult<Option<Quiz>>;
        }
    }

    mock! {
        pub SubmissionRepo {}

        #[async_trait::async_trait]
        impl SubmissionRepository for SubmissionRepo {
            async fn insert(&self, result: SubmissionResult) -> AppResult<SubmissionResult>;
            async fn find_by_student_and_quiz(
                &self,
                student_id: &str,
                quiz_id: &str,
            ) -> AppResult<Option<SubmissionResult>>;
        }
    }

    mock! {
        pub TicketRepo {}

        #[async_trait::async_trait]
        impl TicketRepository for TicketRepo {
            async fn find(&self, student_id: &str, quiz_id: &str) -> AppResult<Option<UsedTicket>>;
            async fn try_insert(&self, ticket: &UsedTicket) -> AppResult<bool>;
            async fn reissue_expired(
                &self,
                student_id: &str,
                quiz_id: &str,
                now: DateTime<Utc>,
                new_expires_at: DateTime<Utc>,
            ) -> AppResult<Option<UsedTicket>>;
            async fn consume(
                &self,
                student_id: &str,
                quiz_id: &str,
                now: DateTime<Utc>,
            ) -> AppResult<Option<UsedTicket>>;
            async fn delete_expired_issued(&self, now: DateTime<Utc>) -> AppResult<u64>;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;

    #[test]
    fn test_fixture_open_quiz_has_no_restrictions() {
        let quiz = open_quiz();
        assert!(quiz.access_code_hash.is_none());
        assert!(quiz.allowed_networks.is_empty());
        assert!(quiz.assigned_student_ids.is_empty());
        assert_eq!(quiz.questions.len(), 5);
    }

    #[test]
    fn test_fixture_four_of_five_answers() {
        let quiz = open_quiz();
        let answers = four_of_five_answers(&quiz.questions);

        let correct = quiz
            .questions
            .iter()
            .filter(|q| answers.get(&q.id) == Some(&q.correct_option))
            .count();
        assert_eq!(correct, 4);
    }
}
