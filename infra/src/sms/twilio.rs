//! Twilio SMS provider
//!
//! Backup route for numbers NHN Cloud cannot reach. Twilio wants E.164
//! recipients, so domestic numbers are converted before sending.

use async_trait::async_trait;
use lc_shared::config::TwilioCredentials;
use lc_shared::phone::{mask_phone_number, to_e164};
use tracing::{error, info};
use twilio::{Client, OutboundMessage};

use lc_core::services::dispatch::{SmsError, SmsSender};

use crate::InfrastructureError;

/// Twilio limit for a single message body
const MAX_BODY_CHARS: usize = 1600;

/// Twilio SMS sender
pub struct TwilioSmsSender {
    client: Client,
    from_number: String,
}

impl TwilioSmsSender {
    pub fn new(credentials: TwilioCredentials) -> Result<Self, InfrastructureError> {
        if !credentials.from_number.starts_with('+') {
            return Err(InfrastructureError::Config(
                "TWILIO_FROM_NUMBER must be in E.164 format (starting with '+')".to_string(),
            ));
        }

        let client = Client::new(&credentials.account_sid, &credentials.auth_token);
        info!(
            from = %mask_phone_number(&credentials.from_number),
            "Twilio SMS sender initialized"
        );

        Ok(Self {
            client,
            from_number: credentials.from_number,
        })
    }
}

/// Map a Twilio client error onto the dispatch taxonomy
///
/// The SDK only exposes errors as text, so classification goes by the
/// status code or wording it carries.
fn classify_error(message: &str) -> SmsError {
    let lower = message.to_lowercase();
    if lower.contains("429") || lower.contains("rate") {
        SmsError::RateLimited(message.to_string())
    } else if ["500", "502", "503", "504"].iter().any(|code| lower.contains(code)) {
        SmsError::Provider(message.to_string())
    } else if lower.contains("400") || lower.contains("invalid") {
        SmsError::Rejected(message.to_string())
    } else {
        SmsError::Transport(message.to_string())
    }
}

#[async_trait]
impl SmsSender for TwilioSmsSender {
    async fn send(&self, phone: &str, message: &str) -> Result<String, SmsError> {
        let to = to_e164(phone).ok_or_else(|| SmsError::InvalidRecipient(mask_phone_number(phone)))?;

        if message.chars().count() > MAX_BODY_CHARS {
            return Err(SmsError::Rejected(format!(
                "message exceeds {} characters",
                MAX_BODY_CHARS
            )));
        }

        let outbound = OutboundMessage::new(&self.from_number, &to, message);
        match self.client.send_message(outbound).await {
            Ok(response) => {
                info!(
                    provider = "twilio",
                    phone = %mask_phone_number(phone),
                    sid = %response.sid,
                    "Twilio accepted SMS"
                );
                Ok(response.sid)
            }
            Err(e) => {
                let err = classify_error(&e.to_string());
                error!(
                    provider = "twilio",
                    phone = %mask_phone_number(phone),
                    error = %err,
                    "Twilio send failed"
                );
                Err(err)
            }
        }
    }

    fn provider_name(&self) -> &str {
        "twilio"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(from: &str) -> TwilioCredentials {
        TwilioCredentials {
            account_sid: "AC00000000000000000000000000000000".to_string(),
            auth_token: "token".to_string(),
            from_number: from.to_string(),
        }
    }

    #[test]
    fn test_from_number_must_be_e164() {
        assert!(TwilioSmsSender::new(credentials("01012345678")).is_err());
        assert!(TwilioSmsSender::new(credentials("+15005550006")).is_ok());
    }

    #[test]
    fn test_error_classification() {
        assert!(matches!(classify_error("HTTP 429 Too Many Requests"), SmsError::RateLimited(_)));
        assert!(matches!(classify_error("status 503"), SmsError::Provider(_)));
        assert!(matches!(classify_error("400: invalid 'To' number"), SmsError::Rejected(_)));
        assert!(matches!(classify_error("connection reset"), SmsError::Transport(_)));
    }

    #[tokio::test]
    async fn test_invalid_recipient_is_not_sent() {
        let sender = TwilioSmsSender::new(credentials("+15005550006")).unwrap();
        let err = sender.send("12345", "hello").await.unwrap_err();
        assert!(matches!(err, SmsError::InvalidRecipient(_)));
    }
}
