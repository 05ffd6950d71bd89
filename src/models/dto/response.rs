use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::domain::{SubmissionResult, UsedTicket};

/// What the client gets back when an attempt is started: when the ticket
/// runs out, not the ticket internals.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptTicketDto {
    pub quiz_id: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<UsedTicket> for AttemptTicketDto {
    fn from(ticket: UsedTicket) -> Self {
        AttemptTicketDto {
            quiz_id: ticket.quiz_id,
            issued_at: ticket.issued_at.to_chrono(),
            expires_at: ticket.expires_at.to_chrono(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionResponseDto {
    pub score: i16,
    pub correct_count: i16,
    pub total_questions: i16,
    pub submitted_at: DateTime<Utc>,
}

impl From<SubmissionResult> for SubmissionResponseDto {
    fn from(result: SubmissionResult) -> Self {
        SubmissionResponseDto {
            score: result.score,
            correct_count: result.correct_count,
            total_questions: result.total_questions,
            submitted_at: result.submitted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_attempt_ticket_dto_converts_timestamps() {
        let now = bson::DateTime::now().to_chrono();
        let ticket = UsedTicket::issue("s1", "quiz-1", Duration::minutes(30), now);

        let dto: AttemptTicketDto = ticket.into();
        assert_eq!(dto.quiz_id, "quiz-1");
        assert_eq!(dto.expires_at, now + Duration::minutes(30));
    }
}
