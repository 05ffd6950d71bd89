use async_trait::async_trait;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{db::Database, errors::AppResult, models::domain::SubmissionResult};

/// Insert-only store of scored submissions. The orchestrator is the sole
/// writer; results are never updated or deleted.
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    async fn insert(&self, result: SubmissionResult) -> AppResult<SubmissionResult>;
    async fn find_by_student_and_quiz(
        &self,
        student_id: &str,
        quiz_id: &str,
    ) -> AppResult<Option<SubmissionResult>>;
}

pub struct MongoSubmissionRepository {
    collection: Collection<SubmissionResult>,
}

impl MongoSubmissionRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("submission_results");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for submission_results collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        // Second guard behind the ticket: one result per (student, quiz).
        let pair_index = IndexModel::builder()
            .keys(doc! { "student_id": 1, "quiz_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("student_quiz_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(pair_index).await?;

        Ok(())
    }
}

#[async_trait]
impl SubmissionRepository for MongoSubmissionRepository {
    async fn insert(&self, result: SubmissionResult) -> AppResult<SubmissionResult> {
        self.collection.insert_one(&result).await?;
        Ok(result)
    }

    async fn find_by_student_and_quiz(
        &self,
        student_id: &str,
        quiz_id: &str,
    ) -> AppResult<Option<SubmissionResult>> {
        let result = self
            .collection
            .find_one(doc! { "student_id": student_id, "quiz_id": quiz_id })
            .await?;
        Ok(result)
    }
}
