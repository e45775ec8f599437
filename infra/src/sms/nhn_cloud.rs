//! NHN Cloud Notification SMS provider
//!
//! Sends through `POST {base}/sms/v3.0/appKeys/{appKey}/sender/sms` with the
//! secret key in the `X-Secret-Key` header. The HTTP status and the
//! `header.isSuccessful` flag of the JSON reply both have to agree before a
//! message counts as accepted.

use async_trait::async_trait;
use lc_shared::phone::{mask_phone_number, normalize_phone_number};
use lc_shared::config::NhnCloudCredentials;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

use lc_core::services::dispatch::{SmsError, SmsSender};

use crate::InfrastructureError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendRequest<'a> {
    body: &'a str,
    send_no: &'a str,
    recipient_list: Vec<Recipient>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Recipient {
    recipient_no: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendResponse {
    header: ResponseHeader,
    #[serde(default)]
    body: Option<ResponseBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseHeader {
    is_successful: bool,
    result_code: i64,
    #[serde(default)]
    result_message: String,
}

#[derive(Debug, Deserialize)]
struct ResponseBody {
    #[serde(default)]
    data: Option<ResponseData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseData {
    request_id: String,
    #[serde(default)]
    send_result_list: Vec<SendResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendResult {
    result_code: i64,
    #[serde(default)]
    result_message: String,
}

/// NHN Cloud SMS sender
pub struct NhnCloudSmsSender {
    client: reqwest::Client,
    credentials: NhnCloudCredentials,
}

impl NhnCloudSmsSender {
    pub fn new(credentials: NhnCloudCredentials, timeout: Duration) -> Result<Self, InfrastructureError> {
        if credentials.app_key.is_empty() || credentials.secret_key.is_empty() {
            return Err(InfrastructureError::Config(
                "NHN Cloud app key and secret key are required".to_string(),
            ));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        info!(
            sender = %mask_phone_number(&credentials.sender_number),
            "NHN Cloud SMS sender initialized"
        );
        Ok(Self { client, credentials })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/sms/v3.0/appKeys/{}/sender/sms",
            self.credentials.base_url.trim_end_matches('/'),
            self.credentials.app_key
        )
    }
}

fn classify_status(status: StatusCode, detail: String) -> SmsError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        SmsError::RateLimited(detail)
    } else if status.is_server_error() {
        SmsError::Provider(detail)
    } else {
        SmsError::Rejected(detail)
    }
}

fn classify_transport(err: reqwest::Error) -> SmsError {
    if err.is_timeout() {
        SmsError::Transport(format!("request timed out: {}", err))
    } else if err.is_connect() || err.is_request() {
        SmsError::Transport(err.to_string())
    } else {
        SmsError::Provider(err.to_string())
    }
}

/// Interpret a 2xx reply
fn interpret(reply: SendResponse) -> Result<String, SmsError> {
    if !reply.header.is_successful {
        return Err(SmsError::Rejected(format!(
            "{} ({})",
            reply.header.result_message, reply.header.result_code
        )));
    }

    let data = reply
        .body
        .and_then(|b| b.data)
        .ok_or_else(|| SmsError::Provider("response missing body.data".to_string()))?;

    if let Some(failed) = data.send_result_list.iter().find(|r| r.result_code != 0) {
        return Err(SmsError::InvalidRecipient(format!(
            "{} ({})",
            failed.result_message, failed.result_code
        )));
    }

    Ok(data.request_id)
}

#[async_trait]
impl SmsSender for NhnCloudSmsSender {
    async fn send(&self, phone: &str, message: &str) -> Result<String, SmsError> {
        let request = SendRequest {
            body: message,
            send_no: &self.credentials.sender_number,
            recipient_list: vec![Recipient {
                recipient_no: normalize_phone_number(phone),
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("X-Secret-Key", &self.credentials.secret_key)
            .json(&request)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            error!(
                provider = "nhn",
                phone = %mask_phone_number(phone),
                status = status.as_u16(),
                "NHN Cloud returned an error status"
            );
            return Err(classify_status(status, format!("HTTP {}: {}", status.as_u16(), detail)));
        }

        let reply: SendResponse = response
            .json()
            .await
            .map_err(|e| SmsError::Provider(format!("unreadable response: {}", e)))?;

        let request_id = interpret(reply)?;
        debug!(
            provider = "nhn",
            phone = %mask_phone_number(phone),
            request_id = %request_id,
            "NHN Cloud accepted SMS"
        );
        Ok(request_id)
    }

    async fn health_check(&self) -> bool {
        // Credentials are validated at construction; reachability is
        // only known per send
        true
    }

    fn provider_name(&self) -> &str {
        "nhn"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sender(base_url: String) -> NhnCloudSmsSender {
        NhnCloudSmsSender::new(
            NhnCloudCredentials {
                app_key: "app-key".to_string(),
                secret_key: "secret".to_string(),
                sender_number: "0212345678".to_string(),
                base_url,
            },
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn success_body() -> serde_json::Value {
        json!({
            "header": { "isSuccessful": true, "resultCode": 0, "resultMessage": "SUCCESS" },
            "body": { "data": {
                "requestId": "20240510-req-1",
                "statusCode": "2",
                "sendResultList": [
                    { "recipientNo": "01012345678", "resultCode": 0, "resultMessage": "" }
                ]
            }}
        })
    }

    #[tokio::test]
    async fn test_send_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sms/v3.0/appKeys/app-key/sender/sms"))
            .and(header("X-Secret-Key", "secret"))
            .and(body_partial_json(json!({
                "sendNo": "0212345678",
                "recipientList": [{ "recipientNo": "01012345678" }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
            .expect(1)
            .mount(&server)
            .await;

        let id = sender(server.uri())
            .send("010-1234-5678", "[LeadCall] 123456")
            .await
            .unwrap();
        assert_eq!(id, "20240510-req-1");
    }

    #[tokio::test]
    async fn test_unsuccessful_header_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "header": { "isSuccessful": false, "resultCode": -1000, "resultMessage": "Invalid appKey" }
            })))
            .mount(&server)
            .await;

        let err = sender(server.uri()).send("01012345678", "hi").await.unwrap_err();
        assert!(matches!(err, SmsError::Rejected(ref m) if m.contains("Invalid appKey")));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_recipient_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "header": { "isSuccessful": true, "resultCode": 0, "resultMessage": "SUCCESS" },
                "body": { "data": {
                    "requestId": "req-2",
                    "sendResultList": [
                        { "recipientNo": "01012345678", "resultCode": -2008, "resultMessage": "Invalid recipient" }
                    ]
                }}
            })))
            .mount(&server)
            .await;

        let err = sender(server.uri()).send("01012345678", "hi").await.unwrap_err();
        assert!(matches!(err, SmsError::InvalidRecipient(_)));
    }

    #[tokio::test]
    async fn test_status_classification() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let sender = sender(server.uri());
        assert!(matches!(
            sender.send("01012345678", "hi").await,
            Err(SmsError::Provider(_))
        ));
        assert!(matches!(
            sender.send("01012345678", "hi").await,
            Err(SmsError::RateLimited(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let err = sender("http://127.0.0.1:9".to_string())
            .send("01012345678", "hi")
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_missing_credentials() {
        let result = NhnCloudSmsSender::new(
            NhnCloudCredentials {
                app_key: String::new(),
                secret_key: String::new(),
                sender_number: "0212345678".to_string(),
                base_url: "https://api-sms.cloud.toast.com".to_string(),
            },
            Duration::from_secs(5),
        );
        assert!(matches!(result, Err(InfrastructureError::Config(_))));
    }
}
