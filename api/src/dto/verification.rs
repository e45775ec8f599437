use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST /api/v1/verification/request`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RequestCodeRequest {
    /// Mobile number in any common format (`010-1234-5678`, `01012345678`)
    #[validate(length(min = 10, max = 20, message = "phone must be 10-20 characters"))]
    pub phone: String,
}

/// Body of `POST /api/v1/verification/submit`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitCodeRequest {
    #[validate(length(min = 10, max = 20, message = "phone must be 10-20 characters"))]
    pub phone: String,

    // Exact digit count is checked by the engine against its configured length
    #[validate(length(min = 1, max = 10, message = "code must be 1-10 characters"))]
    pub code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_validation() {
        let ok = RequestCodeRequest {
            phone: "010-1234-5678".to_string(),
        };
        assert!(ok.validate().is_ok());

        let short = RequestCodeRequest {
            phone: "0101".to_string(),
        };
        assert!(short.validate().is_err());
    }

    #[test]
    fn test_submit_validation() {
        let empty_code = SubmitCodeRequest {
            phone: "01012345678".to_string(),
            code: String::new(),
        };
        let errors = empty_code.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("code"));
    }
}
