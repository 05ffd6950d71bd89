use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::{
    errors::{AppError, AppResult},
    models::domain::UsedTicket,
    repositories::TicketRepository,
};

/// Outcome of a consume call. Exactly one caller per (student, quiz) pair
/// ever sees `Consumed`; everyone else gets one of the loser variants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConsumeOutcome {
    Consumed(UsedTicket),
    AlreadyConsumed(UsedTicket),
    Expired,
    NotFound,
}

/// Issues and consumes single-use submission tickets. All coordination is
/// delegated to the repository's conditional updates, so the manager itself
/// holds no shared state and is safe across server processes.
pub struct TicketService {
    repository: Arc<dyn TicketRepository>,
    ttl: Duration,
}

impl TicketService {
    pub fn new(repository: Arc<dyn TicketRepository>, ttl_minutes: i64) -> Self {
        Self {
            repository,
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Create or return the active Issued ticket for the pair. An expired
    /// Issued ticket is re-issued with a fresh lifetime; a Consumed ticket
    /// means the quiz was already submitted.
    pub async fn issue(
        &self,
        student_id: &str,
        quiz_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<UsedTicket> {
        // Two passes cover the insert/reissue races: a loser re-reads the
        // winner's ticket on the second pass.
        for _ in 0..2 {
            match self.repository.find(student_id, quiz_id).await? {
                Some(ticket) if ticket.is_consumed() => {
                    return Err(AppError::DuplicateSubmission(format!(
                        "student '{}' already submitted quiz '{}'",
                        student_id, quiz_id
                    )));
                }
                Some(ticket) if !ticket.is_expired(now) => return Ok(ticket),
                Some(_) => {
                    if let Some(ticket) = self
                        .repository
                        .reissue_expired(student_id, quiz_id, now, now + self.ttl)
                        .await?
                    {
                        return Ok(ticket);
                    }
                }
                None => {
                    let ticket = UsedTicket::issue(student_id, quiz_id, self.ttl, now);
                    if self.repository.try_insert(&ticket).await? {
                        return Ok(ticket);
                    }
                }
            }
        }

        Err(AppError::TransientError(format!(
            "could not issue attempt ticket for student '{}' quiz '{}' under contention",
            student_id, quiz_id
        )))
    }

    /// Atomically transition the pair's ticket from Issued to Consumed.
    /// Expired-but-present tickets are treated as absent; the follow-up read
    /// only classifies the failure for the caller.
    pub async fn consume(
        &self,
        student_id: &str,
        quiz_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<ConsumeOutcome> {
        if let Some(ticket) = self.repository.consume(student_id, quiz_id, now).await? {
            return Ok(ConsumeOutcome::Consumed(ticket));
        }

        match self.repository.find(student_id, quiz_id).await? {
            None => Ok(ConsumeOutcome::NotFound),
            Some(ticket) if ticket.is_consumed() => Ok(ConsumeOutcome::AlreadyConsumed(ticket)),
            Some(_) => Ok(ConsumeOutcome::Expired),
        }
    }

    /// The consumed ticket for the pair, if any. Used to detect a prior
    /// submission when no result record exists (the reconciliation case).
    pub async fn find_consumed(
        &self,
        student_id: &str,
        quiz_id: &str,
    ) -> AppResult<Option<UsedTicket>> {
        let ticket = self.repository.find(student_id, quiz_id).await?;
        Ok(ticket.filter(|t| t.is_consumed()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::TicketState;
    use crate::test_utils::mocks::MockTicketRepo;
    use mockall::predicate::*;

    // bson::DateTime truncates to milliseconds; use a truncated clock so
    // round-trip comparisons are exact.
    fn now_ms() -> DateTime<Utc> {
        bson::DateTime::now().to_chrono()
    }

    fn issued_ticket(now: DateTime<Utc>, ttl_secs: i64) -> UsedTicket {
        UsedTicket::issue("s1", "quiz-1", Duration::seconds(ttl_secs), now)
    }

    fn consumed_ticket(now: DateTime<Utc>) -> UsedTicket {
        let mut ticket = issued_ticket(now, 3600);
        ticket.state = TicketState::Consumed;
        ticket.consumed_at = Some(bson::DateTime::from_chrono(now));
        ticket
    }

    #[actix_rt::test]
    async fn issue_returns_existing_unexpired_ticket() {
        let now = now_ms();
        let existing = issued_ticket(now, 3600);

        let mut repo = MockTicketRepo::new();
        let found = existing.clone();
        repo.expect_find()
            .with(eq("s1"), eq("quiz-1"))
            .returning(move |_, _| Ok(Some(found.clone())));
        repo.expect_try_insert().never();

        let service = TicketService::new(Arc::new(repo), 120);
        let ticket = service.issue("s1", "quiz-1", now).await.unwrap();

        assert_eq!(ticket, existing);
    }

    #[actix_rt::test]
    async fn issue_fails_when_already_consumed() {
        let now = now_ms();
        let consumed = consumed_ticket(now);

        let mut repo = MockTicketRepo::new();
        repo.expect_find()
            .returning(move |_, _| Ok(Some(consumed.clone())));

        let service = TicketService::new(Arc::new(repo), 120);
        let err = service.issue("s1", "quiz-1", now).await.unwrap_err();

        assert!(matches!(err, AppError::DuplicateSubmission(_)));
    }

    #[actix_rt::test]
    async fn issue_creates_ticket_when_none_exists() {
        let now = now_ms();

        let mut repo = MockTicketRepo::new();
        repo.expect_find().returning(|_, _| Ok(None));
        repo.expect_try_insert().returning(|_| Ok(true));

        let service = TicketService::new(Arc::new(repo), 120);
        let ticket = service.issue("s1", "quiz-1", now).await.unwrap();

        assert_eq!(ticket.state, TicketState::Issued);
        assert_eq!(ticket.expires_at.to_chrono(), now + Duration::minutes(120));
    }

    #[actix_rt::test]
    async fn consume_classifies_not_found() {
        let now = now_ms();

        let mut repo = MockTicketRepo::new();
        repo.expect_consume().returning(|_, _, _| Ok(None));
        repo.expect_find().returning(|_, _| Ok(None));

        let service = TicketService::new(Arc::new(repo), 120);
        let outcome = service.consume("s1", "quiz-1", now).await.unwrap();

        assert_eq!(outcome, ConsumeOutcome::NotFound);
    }

    #[actix_rt::test]
    async fn consume_classifies_already_consumed() {
        let now = now_ms();
        let consumed = consumed_ticket(now);

        let mut repo = MockTicketRepo::new();
        repo.expect_consume().returning(|_, _, _| Ok(None));
        repo.expect_find()
            .returning(move |_, _| Ok(Some(consumed.clone())));

        let service = TicketService::new(Arc::new(repo), 120);
        let outcome = service.consume("s1", "quiz-1", now).await.unwrap();

        assert!(matches!(outcome, ConsumeOutcome::AlreadyConsumed(_)));
    }

    #[actix_rt::test]
    async fn consume_classifies_expired_issued_ticket() {
        let now = now_ms();
        // Issued an hour ago with a 60s lifetime
        let stale = issued_ticket(now - Duration::hours(1), 60);

        let mut repo = MockTicketRepo::new();
        repo.expect_consume().returning(|_, _, _| Ok(None));
        repo.expect_find()
            .returning(move |_, _| Ok(Some(stale.clone())));

        let service = TicketService::new(Arc::new(repo), 120);
        let outcome = service.consume("s1", "quiz-1", now).await.unwrap();

        assert_eq!(outcome, ConsumeOutcome::Expired);
    }
}
