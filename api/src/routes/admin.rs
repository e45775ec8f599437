//! Operator endpoints, all behind `X-Admin-Token`

use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::app::AppState;
use crate::dto::{DailyStatsResponse, UnblockRequest, UnblockResponse};
use crate::handlers::error::{verification_error_response, ApiError, Language};
use crate::middleware::AdminAuth;

/// `POST /api/v1/admin/rate-limit/unblock`
pub async fn unblock(
    _auth: AdminAuth,
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<UnblockRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;

    Ok(match state.engine().unblock(&body.phone).await {
        Ok(cleared) => HttpResponse::Ok().json(UnblockResponse { cleared }),
        Err(err) => verification_error_response(&err, Language::from_request(&req)),
    })
}

/// `GET /api/v1/admin/cost/prediction`
pub async fn cost_prediction(_auth: AdminAuth, state: web::Data<AppState>) -> HttpResponse {
    let prediction = state.engine().cost_guard().predict_monthly_cost().await;
    HttpResponse::Ok().json(prediction)
}

/// `GET /api/v1/admin/cost/daily`
pub async fn daily_stats(_auth: AdminAuth, state: web::Data<AppState>) -> HttpResponse {
    let guard = state.engine().cost_guard();
    let stats = guard.daily_stats().await;
    HttpResponse::Ok().json(DailyStatsResponse::new(&stats, guard.config().daily_limit))
}
