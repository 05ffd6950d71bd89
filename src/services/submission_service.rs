use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{Quiz, SubmissionResult, UsedTicket},
    repositories::{QuizRepository, SubmissionRepository},
    services::{
        eligibility::{self, EligibilityContext, EligibilityVerdict, PriorSubmission},
        scoring,
        ticket_service::{ConsumeOutcome, TicketService},
    },
};

/// Composes eligibility evaluation, ticket consumption, scoring and result
/// persistence into the single logical submission operation.
///
/// Gate order per attempt: eligibility is always revalidated server-side,
/// then the ticket consume is the authoritative duplicate gate (it is atomic
/// where the eligibility predicate is only a read), then scoring, then the
/// insert-only result write.
pub struct SubmissionService {
    quizzes: Arc<dyn QuizRepository>,
    submissions: Arc<dyn SubmissionRepository>,
    tickets: TicketService,
}

impl SubmissionService {
    pub fn new(
        quizzes: Arc<dyn QuizRepository>,
        submissions: Arc<dyn SubmissionRepository>,
        tickets: TicketService,
    ) -> Self {
        Self {
            quizzes,
            submissions,
            tickets,
        }
    }

    pub async fn get_quiz(&self, quiz_id: &str) -> AppResult<Quiz> {
        self.quizzes
            .find_by_id(quiz_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quiz with id '{}' not found", quiz_id)))
    }

    /// Read-only eligibility check. Ineligibility is a normal outcome here,
    /// not an error; only an unknown quiz or storage trouble fails.
    pub async fn check_eligibility(
        &self,
        quiz_id: &str,
        student_id: &str,
        context: &EligibilityContext,
    ) -> AppResult<EligibilityVerdict> {
        let quiz = self.get_quiz(quiz_id).await?;
        let prior = self.prior_submission(student_id, quiz_id).await?;
        Ok(eligibility::evaluate(&quiz, student_id, context, prior))
    }

    /// Begin an attempt: revalidate eligibility, then issue (or return) the
    /// single-use ticket for the pair.
    pub async fn start_attempt(
        &self,
        quiz_id: &str,
        student_id: &str,
        context: &EligibilityContext,
    ) -> AppResult<UsedTicket> {
        let verdict = self.check_eligibility(quiz_id, student_id, context).await?;
        if !verdict.is_eligible {
            return Err(AppError::NotEligible(verdict));
        }

        self.tickets.issue(student_id, quiz_id, context.now).await
    }

    /// The submission operation proper. Malformed input is rejected before
    /// any ticket interaction; once the ticket consume succeeds the attempt
    /// is committed and cannot be retried.
    pub async fn submit(
        &self,
        quiz_id: &str,
        student_id: &str,
        context: &EligibilityContext,
        answers: HashMap<String, i16>,
        time_spent_seconds: i64,
    ) -> AppResult<SubmissionResult> {
        if answers.values().any(|&selected| selected < 0) {
            return Err(AppError::ValidationError(
                "answer map contains a negative option index".to_string(),
            ));
        }
        if time_spent_seconds < 0 {
            return Err(AppError::ValidationError(
                "time_spent_seconds must not be negative".to_string(),
            ));
        }

        let quiz = self.get_quiz(quiz_id).await?;

        // Never trust a client-cached verdict: time, IP and concurrent
        // submissions can all change between check and submit.
        let prior = self.prior_submission(student_id, quiz_id).await?;
        let verdict = eligibility::evaluate(&quiz, student_id, context, prior);
        if !verdict.is_eligible {
            return Err(AppError::NotEligible(verdict));
        }

        let ticket = match self.tickets.consume(student_id, quiz_id, context.now).await? {
            ConsumeOutcome::Consumed(ticket) => ticket,
            ConsumeOutcome::AlreadyConsumed(_) => {
                return Err(AppError::DuplicateSubmission(format!(
                    "student '{}' already submitted quiz '{}'",
                    student_id, quiz_id
                )));
            }
            ConsumeOutcome::Expired => {
                return Err(AppError::AttemptExpired(format!(
                    "attempt ticket for quiz '{}' expired before submission",
                    quiz_id
                )));
            }
            ConsumeOutcome::NotFound => {
                return Err(AppError::AttemptExpired(format!(
                    "no active attempt for quiz '{}'; start an attempt first",
                    quiz_id
                )));
            }
        };

        // The answers must be recoverable from the logs if the result write
        // below fails: the ticket is spent either way.
        log::info!(
            "Consumed attempt ticket student={} quiz={} consumed_at={:?} answers={}",
            student_id,
            quiz_id,
            ticket.consumed_at,
            serde_json::to_string(&answers).unwrap_or_else(|_| "<unserializable>".to_string())
        );

        let score = scoring::score(&quiz.questions, &answers);
        let result = SubmissionResult::from_score(
            student_id,
            quiz_id,
            answers,
            score,
            time_spent_seconds,
            context.now,
        );

        match self.submissions.insert(result).await {
            Ok(result) => Ok(result),
            Err(err) => {
                log::error!(
                    "Result write failed after ticket consumption student={} quiz={}: {}",
                    student_id,
                    quiz_id,
                    err
                );
                Err(AppError::PostConsumptionFailure(format!(
                    "submission for quiz '{}' was accepted but the result could not be stored",
                    quiz_id
                )))
            }
        }
    }

    /// Submission history for the eligibility predicate: the stored result
    /// when present, otherwise the consumed ticket (covers the window where
    /// a result write failed after consumption).
    async fn prior_submission(
        &self,
        student_id: &str,
        quiz_id: &str,
    ) -> AppResult<Option<PriorSubmission>> {
        if let Some(result) = self
            .submissions
            .find_by_student_and_quiz(student_id, quiz_id)
            .await?
        {
            return Ok(Some(PriorSubmission {
                submitted_at: result.submitted_at,
                score: Some(result.score),
            }));
        }

        let consumed = self.tickets.find_consumed(student_id, quiz_id).await?;
        Ok(consumed.map(|ticket| PriorSubmission {
            submitted_at: ticket
                .consumed_at
                .unwrap_or(ticket.issued_at)
                .to_chrono(),
            score: None,
        }))
    }
}
