use std::sync::Arc;

use crate::{
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        MongoQuizRepository, MongoSubmissionRepository, MongoTicketRepository, TicketRepository,
    },
    services::{SubmissionService, TicketService},
};

#[derive(Clone)]
pub struct AppState {
    pub submission_service: Arc<SubmissionService>,
    pub ticket_repository: Arc<dyn TicketRepository>,
    pub config: Arc<Config>,
    pub db: Database,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let quiz_repository = Arc::new(MongoQuizRepository::new(&db));
        quiz_repository.ensure_indexes().await?;

        let ticket_repository = Arc::new(MongoTicketRepository::new(&db));
        ticket_repository.ensure_indexes().await?;

        let submission_repository = Arc::new(MongoSubmissionRepository::new(&db));
        submission_repository.ensure_indexes().await?;

        let ticket_service =
            TicketService::new(ticket_repository.clone(), config.ticket_ttl_minutes);
        let submission_service = Arc::new(SubmissionService::new(
            quiz_repository,
            submission_repository,
            ticket_service,
        ));

        Ok(Self {
            submission_service,
            ticket_repository,
            config: Arc::new(config),
            db,
        })
    }
}
