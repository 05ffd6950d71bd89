use actix_web::{post, web, HttpRequest, HttpResponse};
use chrono::Utc;
use validator::Validate;

use crate::{
    app_state::AppState,
    auth::AuthenticatedStudent,
    errors::AppError,
    handlers::client_ip,
    models::dto::{
        request::{StartAttemptRequest, SubmitQuizRequest},
        response::{AttemptTicketDto, SubmissionResponseDto},
    },
    services::eligibility::EligibilityContext,
};

#[post("/quizzes/{id}/attempts")]
async fn start_attempt(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<StartAttemptRequest>,
    auth: AuthenticatedStudent,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let context = EligibilityContext {
        now: Utc::now(),
        source_ip: client_ip(&req),
        access_code: request.access_code,
    };

    let ticket = state
        .submission_service
        .start_attempt(&id, auth.student_id(), &context)
        .await?;

    Ok(HttpResponse::Created().json(AttemptTicketDto::from(ticket)))
}

#[post("/quizzes/{id}/submissions")]
async fn submit_quiz(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<SubmitQuizRequest>,
    auth: AuthenticatedStudent,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let context = EligibilityContext {
        now: Utc::now(),
        source_ip: client_ip(&req),
        access_code: request.access_code,
    };

    let result = state
        .submission_service
        .submit(
            &id,
            auth.student_id(),
            &context,
            request.answers,
            request.time_spent_seconds,
        )
        .await?;

    Ok(HttpResponse::Created().json(SubmissionResponseDto::from(result)))
}
