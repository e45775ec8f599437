//! SMS provider adapters
//!
//! Implementations of the core `SmsSender` seam:
//!
//! - **Mock**: logs messages for development
//! - **NHN Cloud**: domestic production provider
//! - **Twilio**: international backup (feature `twilio-sms`)
//! - **Failover**: NHN Cloud primary with Twilio backup

use std::sync::Arc;

use lc_core::services::dispatch::SmsSender;
use lc_shared::{SmsConfig, SmsProvider};

use crate::InfrastructureError;

pub mod failover_sms;
pub mod mock_sms;
pub mod nhn_cloud;

#[cfg(feature = "twilio-sms")]
pub mod twilio;

pub use failover_sms::FailoverSmsSender;
pub use mock_sms::MockSmsSender;
pub use nhn_cloud::NhnCloudSmsSender;

#[cfg(feature = "twilio-sms")]
pub use twilio::TwilioSmsSender;

/// Build the sender selected by `config.provider`
///
/// Missing credentials for the selected provider are a configuration error;
/// there is no silent fallback to the mock sender.
pub fn create_sms_sender(config: &SmsConfig) -> Result<Arc<dyn SmsSender>, InfrastructureError> {
    let sender: Arc<dyn SmsSender> = match config.provider {
        SmsProvider::Mock => Arc::new(MockSmsSender::new()),
        SmsProvider::Nhn => Arc::new(nhn_sender(config)?),
        SmsProvider::Twilio => twilio_sender(config)?,
        SmsProvider::Failover => Arc::new(FailoverSmsSender::new(
            Arc::new(nhn_sender(config)?),
            twilio_sender(config)?,
            config.failover_timeout(),
        )),
    };

    tracing::info!(provider = sender.provider_name(), "SMS sender ready");
    Ok(sender)
}

fn nhn_sender(config: &SmsConfig) -> Result<NhnCloudSmsSender, InfrastructureError> {
    let credentials = config.nhn.clone().ok_or_else(|| {
        InfrastructureError::Config(
            "NHN_SMS_APP_KEY, NHN_SMS_SECRET_KEY and NHN_SMS_SENDER_NUMBER must be set".to_string(),
        )
    })?;
    NhnCloudSmsSender::new(credentials, config.request_timeout())
}

#[cfg(feature = "twilio-sms")]
fn twilio_sender(config: &SmsConfig) -> Result<Arc<dyn SmsSender>, InfrastructureError> {
    let credentials = config.twilio.clone().ok_or_else(|| {
        InfrastructureError::Config(
            "TWILIO_ACCOUNT_SID, TWILIO_AUTH_TOKEN and TWILIO_FROM_NUMBER must be set".to_string(),
        )
    })?;
    Ok(Arc::new(TwilioSmsSender::new(credentials)?))
}

#[cfg(not(feature = "twilio-sms"))]
fn twilio_sender(_config: &SmsConfig) -> Result<Arc<dyn SmsSender>, InfrastructureError> {
    Err(InfrastructureError::Config(
        "Twilio support requires the twilio-sms feature".to_string(),
    ))
}
