use actix_web::{get, web, HttpRequest, HttpResponse};
use chrono::Utc;

use crate::{
    app_state::AppState,
    auth::AuthenticatedStudent,
    errors::AppError,
    handlers::client_ip,
    models::dto::request::EligibilityQuery,
    services::eligibility::EligibilityContext,
};

/// Read-only check; ineligibility is reported with 200 and the full
/// per-predicate breakdown, never as an error status.
#[get("/quizzes/{id}/eligibility")]
async fn check_eligibility(
    state: web::Data<AppState>,
    id: web::Path<String>,
    query: web::Query<EligibilityQuery>,
    auth: AuthenticatedStudent,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let context = EligibilityContext {
        now: Utc::now(),
        source_ip: client_ip(&req),
        access_code: query.into_inner().access_code,
    };

    let verdict = state
        .submission_service
        .check_eligibility(&id, auth.student_id(), &context)
        .await?;

    Ok(HttpResponse::Ok().json(verdict))
}
