use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::{
    bson::doc,
    error::{ErrorKind, WriteFailure},
    options::{IndexOptions, ReturnDocument},
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::AppResult,
    models::domain::UsedTicket,
};

const DUPLICATE_KEY_CODE: i32 = 11000;

/// Storage primitives for single-use submission tickets. The Issued->Consumed
/// edge and the expiry checks are expressed as single conditional updates so
/// that correctness holds across concurrent server processes; no application
/// lock is involved.
#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn find(&self, student_id: &str, quiz_id: &str) -> AppResult<Option<UsedTicket>>;

    /// Insert a fresh Issued ticket. Returns `false` when a ticket for the
    /// pair already exists (unique composite index), leaving the existing
    /// record untouched.
    async fn try_insert(&self, ticket: &UsedTicket) -> AppResult<bool>;

    /// Reset an Issued ticket whose expiry has passed to the given fresh
    /// lifetime. Returns `None` when no such ticket exists (including when a
    /// racing caller already reset or consumed it).
    async fn reissue_expired(
        &self,
        student_id: &str,
        quiz_id: &str,
        now: DateTime<Utc>,
        new_expires_at: DateTime<Utc>,
    ) -> AppResult<Option<UsedTicket>>;

    /// The atomic Issued->Consumed transition. Succeeds for exactly one
    /// caller per pair: the filter requires the current state to be Issued
    /// and unexpired, so concurrent callers lose deterministically.
    async fn consume(
        &self,
        student_id: &str,
        quiz_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<UsedTicket>>;

    /// Delete Issued tickets whose expiry has passed. Consumed tickets are
    /// never touched.
    async fn delete_expired_issued(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

pub struct MongoTicketRepository {
    collection: Collection<UsedTicket>,
}

impl MongoTicketRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("used_tickets");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for used_tickets collection");

        let pair_index = IndexModel::builder()
            .keys(doc! { "student_id": 1, "quiz_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("student_quiz_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(pair_index).await?;

        Ok(())
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY_CODE
        }
        _ => false,
    }
}

#[async_trait]
impl TicketRepository for MongoTicketRepository {
    async fn find(&self, student_id: &str, quiz_id: &str) -> AppResult<Option<UsedTicket>> {
        let ticket = self
            .collection
            .find_one(doc! { "student_id": student_id, "quiz_id": quiz_id })
            .await?;
        Ok(ticket)
    }

    async fn try_insert(&self, ticket: &UsedTicket) -> AppResult<bool> {
        match self.collection.insert_one(ticket).await {
            Ok(_) => Ok(true),
            Err(err) if is_duplicate_key(&err) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    async fn reissue_expired(
        &self,
        student_id: &str,
        quiz_id: &str,
        now: DateTime<Utc>,
        new_expires_at: DateTime<Utc>,
    ) -> AppResult<Option<UsedTicket>> {
        let now_bson = bson::DateTime::from_chrono(now);

        let ticket = self
            .collection
            .find_one_and_update(
                doc! {
                    "student_id": student_id,
                    "quiz_id": quiz_id,
                    "state": "issued",
                    "expires_at": { "$lt": now_bson }
                },
                doc! {
                    "$set": {
                        "issued_at": now_bson,
                        "expires_at": bson::DateTime::from_chrono(new_expires_at)
                    }
                },
            )
            .return_document(ReturnDocument::After)
            .await?;

        Ok(ticket)
    }

    async fn consume(
        &self,
        student_id: &str,
        quiz_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<UsedTicket>> {
        let now_bson = bson::DateTime::from_chrono(now);

        let ticket = self
            .collection
            .find_one_and_update(
                doc! {
                    "student_id": student_id,
                    "quiz_id": quiz_id,
                    "state": "issued",
                    "expires_at": { "$gte": now_bson }
                },
                doc! {
                    "$set": {
                        "state": "consumed",
                        "consumed_at": now_bson
                    }
                },
            )
            .return_document(ReturnDocument::After)
            .await?;

        Ok(ticket)
    }

    async fn delete_expired_issued(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = self
            .collection
            .delete_many(doc! {
                "state": "issued",
                "expires_at": { "$lt": bson::DateTime::from_chrono(now) }
            })
            .await?;

        Ok(result.deleted_count)
    }
}
