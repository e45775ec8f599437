//! Verification endpoints used by the chat widget

use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use lc_core::VerificationResponse;
use lc_shared::phone::mask_phone_number;

use crate::app::AppState;
use crate::dto::{RequestCodeRequest, SubmitCodeRequest};
use crate::handlers::error::{verification_error_response, ApiError, Language};

/// Handler for `POST /api/v1/verification/request`
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// { "success": true, "message": "Verification code sent | 인증번호가 발송되었습니다", "expires_in": 180 }
/// ```
///
/// ## Throttled (429 Too Many Requests, `Retry-After` header)
/// ```json
/// { "success": false, "error": "THROTTLED", "message": "...", "retry_after": 240 }
/// ```
pub async fn request_code(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<RequestCodeRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;

    tracing::debug!(
        phone = %mask_phone_number(&body.phone),
        event = "http_request_code",
        "Verification code requested"
    );

    Ok(match state.engine().request_code(&body.phone).await {
        Ok(result) => HttpResponse::Ok().json(VerificationResponse::from(&result)),
        Err(err) => verification_error_response(&err, Language::from_request(&req)),
    })
}

/// Handler for `POST /api/v1/verification/submit`
///
/// Answers 200 with `"verified": true` on a match; mismatches answer 422
/// with `remaining_attempts`.
pub async fn submit_code(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<SubmitCodeRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;

    Ok(match state.engine().submit_code(&body.phone, &body.code).await {
        Ok(result) => HttpResponse::Ok().json(VerificationResponse::from(&result)),
        Err(err) => verification_error_response(&err, Language::from_request(&req)),
    })
}
