//! HTTP mapping for verification and request errors
//!
//! Engine errors are answered with the same `VerificationResponse` body the
//! success path uses, so the chat widget parses one shape. Everything else
//! uses the shared `ErrorResponse`.

use actix_web::{
    http::{header, StatusCode},
    HttpRequest, HttpResponse, ResponseError,
};
use std::fmt;
use validator::ValidationErrors;

use lc_core::{VerificationError, VerificationResponse};
use lc_shared::{error_codes, ErrorResponse};

/// Language preference for error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    /// `English | 한국어`
    Bilingual,
    English,
    Korean,
}

impl Language {
    /// Detect language preference from the Accept-Language header
    ///
    /// Only a header whose first entry is English or Korean selects a single
    /// language; anything else keeps both.
    pub fn from_request(req: &HttpRequest) -> Self {
        let first = req
            .headers()
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|tag| tag.split(';').next().unwrap_or("").trim().to_lowercase());

        match first.as_deref() {
            Some(tag) if tag.starts_with("ko") => Language::Korean,
            Some(tag) if tag.starts_with("en") => Language::English,
            _ => Language::Bilingual,
        }
    }

    fn pick(self, err: &VerificationError) -> String {
        match self {
            Language::Bilingual => err.to_string(),
            Language::English => err.english_message(),
            Language::Korean => err.korean_message(),
        }
    }
}

/// HTTP status for an engine error
pub fn status_for(err: &VerificationError) -> StatusCode {
    match err {
        VerificationError::InvalidPhoneFormat | VerificationError::InvalidCodeFormat { .. } => {
            StatusCode::BAD_REQUEST
        }
        VerificationError::Throttled { .. } | VerificationError::AttemptsExhausted => {
            StatusCode::TOO_MANY_REQUESTS
        }
        VerificationError::CodeNotFound => StatusCode::NOT_FOUND,
        VerificationError::CodeExpired => StatusCode::GONE,
        VerificationError::CodeMismatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        VerificationError::AlreadyRegistered => StatusCode::CONFLICT,
        VerificationError::SmsDeliveryFailed { .. } => StatusCode::BAD_GATEWAY,
        VerificationError::StorageUnavailable => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Build the response for an engine error
pub fn verification_error_response(err: &VerificationError, lang: Language) -> HttpResponse {
    let mut body = VerificationResponse::from(err);
    body.message = Some(lang.pick(err));

    let mut response = HttpResponse::build(status_for(err));
    if let Some(seconds) = err.retry_after_seconds() {
        response.insert_header((header::RETRY_AFTER, seconds.to_string()));
    }
    response.json(body)
}

/// Errors raised by the HTTP layer itself
#[derive(Debug)]
pub enum ApiError {
    /// Request body failed validation
    Validation(ValidationErrors),
    /// Missing or wrong admin token
    Unauthorized,
    /// Admin endpoints are disabled because no token is configured
    AdminDisabled,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(_) => {
                f.write_str("Invalid request data | 요청 형식이 올바르지 않습니다")
            }
            ApiError::Unauthorized => f.write_str("Admin token required | 관리자 토큰이 필요합니다"),
            ApiError::AdminDisabled => {
                f.write_str("Admin endpoints are disabled | 관리자 기능이 비활성화되어 있습니다")
            }
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::AdminDisabled => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::Validation(errors) => {
                let fields: Vec<String> = errors
                    .field_errors()
                    .keys()
                    .map(|field| field.to_string())
                    .collect();
                ErrorResponse::new(error_codes::VALIDATION_ERROR, self.to_string())
                    .add_detail("fields", fields)
            }
            ApiError::Unauthorized => ErrorResponse::new(error_codes::UNAUTHORIZED, self.to_string()),
            ApiError::AdminDisabled => ErrorResponse::new(error_codes::NOT_FOUND, self.to_string()),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
