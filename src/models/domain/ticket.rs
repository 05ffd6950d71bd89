use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketState {
    Issued,
    Consumed,
}

/// Single-use claim on "this student is attempting this quiz", keyed by
/// (student_id, quiz_id). At most one ticket per pair ever reaches
/// `Consumed`; that record is the permanent anti-replay proof and is never
/// removed by cleanup.
///
/// Timestamps are `bson::DateTime` so the Issued->Consumed transition and the
/// expiry sweep can filter on them inside a single conditional update.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct UsedTicket {
    pub student_id: String,
    pub quiz_id: String,
    pub state: TicketState,
    pub issued_at: bson::DateTime,
    pub expires_at: bson::DateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumed_at: Option<bson::DateTime>,
}

impl UsedTicket {
    pub fn issue(student_id: &str, quiz_id: &str, ttl: Duration, now: DateTime<Utc>) -> Self {
        Self {
            student_id: student_id.to_string(),
            quiz_id: quiz_id.to_string(),
            state: TicketState::Issued,
            issued_at: bson::DateTime::from_chrono(now),
            expires_at: bson::DateTime::from_chrono(now + ttl),
            consumed_at: None,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.to_chrono() < now
    }

    pub fn is_consumed(&self) -> bool {
        self.state == TicketState::Consumed
    }
}
