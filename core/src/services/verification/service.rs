//! Main verification engine implementation

use constant_time_eq::constant_time_eq;
use lc_shared::phone::{is_valid_korean_mobile, mask_phone_number, normalize_phone_number};
use std::sync::Arc;

use crate::clock::Clock;
use crate::domain::entities::VerificationCode;
use crate::errors::{DomainError, ThrottleReason, VerificationError, VerificationResult};
use crate::repositories::{CodeStore, LeadStore};
use crate::services::cost::{CostDenyReason, CostGuard, CostReservation};
use crate::services::dispatch::{DispatchReceipt, RetryingDispatcher};
use crate::services::rate_limit::RateLimiter;

use super::config::VerificationServiceConfig;
use super::locks::PhoneLocks;
use super::types::{SendCodeResult, VerifyCodeResult};

/// Verification engine for SMS phone verification
///
/// Every operation on a phone runs under that phone's lock, so concurrent
/// requests for one number are processed one at a time while different
/// numbers proceed in parallel.
#[derive(Clone)]
pub struct VerificationEngine {
    code_store: Arc<dyn CodeStore>,
    lead_store: Arc<dyn LeadStore>,
    dispatcher: Arc<RetryingDispatcher>,
    rate_limiter: Arc<RateLimiter>,
    cost_guard: Arc<CostGuard>,
    clock: Arc<dyn Clock>,
    locks: Arc<PhoneLocks>,
    config: Arc<VerificationServiceConfig>,
}

impl VerificationEngine {
    /// Create a new verification engine
    ///
    /// # Arguments
    ///
    /// * `code_store` - Storage for outstanding codes
    /// * `lead_store` - Existing leads, for duplicate-registration checks
    /// * `dispatcher` - SMS dispatch with retry
    /// * `rate_limiter` - Per-phone request limits
    /// * `cost_guard` - Duplicate window, daily and monthly caps
    /// * `clock` - Time source
    /// * `config` - Engine configuration
    pub fn new(
        code_store: Arc<dyn CodeStore>,
        lead_store: Arc<dyn LeadStore>,
        dispatcher: Arc<RetryingDispatcher>,
        rate_limiter: Arc<RateLimiter>,
        cost_guard: Arc<CostGuard>,
        clock: Arc<dyn Clock>,
        config: VerificationServiceConfig,
    ) -> Self {
        Self {
            code_store,
            lead_store,
            dispatcher,
            rate_limiter,
            cost_guard,
            clock,
            locks: Arc::new(PhoneLocks::new()),
            config: Arc::new(config),
        }
    }

    /// Issue a new code for `phone` and send it by SMS
    ///
    /// This method:
    /// 1. Validates and normalizes the phone number
    /// 2. Reserves a send slot with the cost guard, then consults the rate limiter
    /// 3. Enforces the minimum resend interval against any live code
    /// 4. Rejects phones that already belong to a lead
    /// 5. Generates and stores a new code, replacing any previous one
    /// 6. Dispatches the SMS with retry, rolling the code back on failure
    ///
    /// The dispatch step runs on its own task and keeps the phone lock until it
    /// finishes, so dropping the returned future part-way leaves the stored
    /// code and counters consistent.
    ///
    /// # Arguments
    ///
    /// * `phone` - Phone number in any common format (`010-1234-5678`, `01012345678`)
    ///
    /// # Returns
    ///
    /// * `Ok(SendCodeResult)` - Code stored and accepted by the provider
    /// * `Err(VerificationError)` - Validation, throttling, duplicate registration or delivery failure
    pub async fn request_code(&self, phone: &str) -> VerificationResult<SendCodeResult> {
        let phone = normalize_phone_number(phone);
        if !is_valid_korean_mobile(&phone) {
            tracing::debug!(event = "otp_invalid_phone", "Rejected malformed phone number");
            return Err(VerificationError::InvalidPhoneFormat);
        }
        let masked = mask_phone_number(&phone);

        let guard = self.locks.lock(&phone).await;
        let now = self.clock.now();

        // Dropped on every early return below, freeing the slot
        let reservation = match self.cost_guard.reserve(&phone).await {
            Ok(reservation) => reservation,
            Err(denied) => {
                let reason = denied.reason.unwrap_or(CostDenyReason::DailyLimitReached);
                return Err(VerificationError::throttled(reason.into(), denied.wait_time_seconds));
            }
        };

        let limit = self.rate_limiter.is_allowed(&phone).await;
        if let Some(reason) = limit.reason.filter(|_| !limit.allowed) {
            return Err(VerificationError::throttled(
                reason.into(),
                limit.retry_after_seconds(now),
            ));
        }

        if let Some(existing) = self.code_store.get(&phone).await.map_err(|e| storage_failure(&masked, e))? {
            if !existing.is_expired_at(now) {
                if let Some(wait) = existing.resend_wait(now, self.config.min_resend_interval()) {
                    let wait_seconds = (wait.num_milliseconds().max(0) as u64 + 999) / 1000;
                    tracing::info!(
                        phone = %masked,
                        wait_seconds = wait_seconds,
                        event = "otp_resend_too_soon",
                        "Verification code requested before resend interval"
                    );
                    return Err(VerificationError::throttled(
                        ThrottleReason::ResendInterval,
                        Some(wait_seconds),
                    ));
                }
            }
        }

        if self.lead_store.exists(&phone).await.map_err(|e| storage_failure(&masked, e))? {
            tracing::info!(
                phone = %masked,
                event = "otp_already_registered",
                "Verification requested for an existing lead"
            );
            return Err(VerificationError::AlreadyRegistered);
        }

        // Generate new verification code using CSPRNG
        let code = VerificationCode::generate_code(self.config.code_length);
        let record = VerificationCode::issue(phone.clone(), code, now, self.config.code_ttl());

        self.code_store
            .put(&record)
            .await
            .map_err(|e| storage_failure(&masked, e))?;

        tracing::info!(
            phone = %masked,
            expires_at = %record.expires_at,
            event = "otp_generated",
            "Generated new verification code"
        );

        let message = self.format_message(&record.code);
        let engine = self.clone();
        let dispatch_phone = phone.clone();
        let dispatch = tokio::spawn(async move {
            let _guard = guard;
            engine
                .dispatch_and_record(&dispatch_phone, &message, reservation)
                .await
        });

        let receipt = match dispatch.await {
            Ok(result) => result?,
            Err(e) => {
                tracing::error!(
                    phone = %masked,
                    error = %e,
                    event = "otp_dispatch_task_failed",
                    "SMS dispatch task did not complete"
                );
                return Err(VerificationError::SmsDeliveryFailed { attempts: 0 });
            }
        };

        Ok(SendCodeResult {
            phone,
            message_id: receipt.message_id,
            dispatch_attempts: receipt.attempts,
            expires_at: record.expires_at,
            expires_in_seconds: record.ttl_seconds(now),
            next_resend_at: now + self.config.min_resend_interval(),
            demo_code: self.config.expose_demo_code.then(|| record.code.clone()),
        })
    }

    /// Send the SMS and settle the bookkeeping for its outcome
    async fn dispatch_and_record(
        &self,
        phone: &str,
        message: &str,
        reservation: CostReservation,
    ) -> VerificationResult<DispatchReceipt> {
        match self.dispatcher.send(phone, message).await {
            Ok(receipt) => {
                self.rate_limiter.record_attempt(phone).await;
                self.cost_guard
                    .settle(reservation, true, &receipt.provider)
                    .await;

                tracing::info!(
                    phone = %mask_phone_number(phone),
                    provider = %receipt.provider,
                    attempts = receipt.attempts,
                    event = "otp_sent",
                    "Verification code sent"
                );
                Ok(receipt)
            }
            Err(e) => {
                if let Err(delete_err) = self.code_store.delete(phone).await {
                    tracing::error!(
                        phone = %mask_phone_number(phone),
                        error = %delete_err,
                        event = "otp_rollback_failed",
                        "Failed to remove undeliverable verification code"
                    );
                }
                self.cost_guard.settle(reservation, false, &e.provider).await;

                tracing::error!(
                    phone = %mask_phone_number(phone),
                    provider = %e.provider,
                    attempts = e.attempts,
                    error = %e.last_error,
                    event = "otp_dispatch_failed",
                    "Verification SMS could not be delivered"
                );
                Err(VerificationError::SmsDeliveryFailed {
                    attempts: e.attempts,
                })
            }
        }
    }

    /// Check a submitted code against the live code for `phone`
    ///
    /// A mismatch counts against the code's attempt budget; once the budget is
    /// spent the code is discarded even if the next guess would be right. A
    /// correct code is consumed and clears the phone's rate-limit history.
    ///
    /// # Arguments
    ///
    /// * `phone` - Phone number in any common format
    /// * `submitted` - The code the user typed
    ///
    /// # Returns
    ///
    /// * `Ok(VerifyCodeResult)` - The code matched
    /// * `Err(VerificationError)` - Format, not found, expired, exhausted or mismatch
    pub async fn submit_code(&self, phone: &str, submitted: &str) -> VerificationResult<VerifyCodeResult> {
        let phone = normalize_phone_number(phone);
        if !is_valid_korean_mobile(&phone) {
            return Err(VerificationError::InvalidPhoneFormat);
        }

        let submitted = submitted.trim();
        if submitted.len() != self.config.code_length || !submitted.chars().all(|c| c.is_ascii_digit()) {
            return Err(VerificationError::InvalidCodeFormat {
                length: self.config.code_length,
            });
        }
        let masked = mask_phone_number(&phone);

        let _guard = self.locks.lock(&phone).await;
        let now = self.clock.now();

        let record = self
            .code_store
            .get(&phone)
            .await
            .map_err(|e| storage_failure(&masked, e))?
            .ok_or(VerificationError::CodeNotFound)?;

        if record.is_expired_at(now) {
            self.discard(&phone, &masked).await;
            tracing::info!(phone = %masked, event = "otp_expired", "Verification code expired");
            return Err(VerificationError::CodeExpired);
        }

        if record.attempts >= self.config.max_attempts {
            self.discard(&phone, &masked).await;
            tracing::warn!(
                phone = %masked,
                attempts = record.attempts,
                event = "otp_attempts_exhausted",
                "Verification attempts exhausted"
            );
            return Err(VerificationError::AttemptsExhausted);
        }

        if !constant_time_eq(record.code.as_bytes(), submitted.as_bytes()) {
            let attempts = self
                .code_store
                .increment_attempts(&phone)
                .await
                .map_err(|e| storage_failure(&masked, e))?
                .unwrap_or(self.config.max_attempts);
            let remaining = self.config.max_attempts.saturating_sub(attempts);

            tracing::warn!(
                phone = %masked,
                attempts = attempts,
                remaining = remaining,
                event = "otp_mismatch",
                "Verification code mismatch"
            );
            return Err(VerificationError::CodeMismatch { remaining });
        }

        self.code_store
            .delete(&phone)
            .await
            .map_err(|e| storage_failure(&masked, e))?;
        self.rate_limiter.record_success(&phone).await;

        tracing::info!(phone = %masked, event = "otp_verified", "Phone number verified");

        Ok(VerifyCodeResult {
            phone,
            verified: true,
        })
    }

    /// Clear rate-limit state and any block for `phone`
    ///
    /// # Returns
    /// `true` if the phone had rate-limit state
    pub async fn unblock(&self, phone: &str) -> VerificationResult<bool> {
        let phone = normalize_phone_number(phone);
        if !is_valid_korean_mobile(&phone) {
            return Err(VerificationError::InvalidPhoneFormat);
        }
        Ok(self.rate_limiter.unblock(&phone).await)
    }

    /// Delete every stored code past its expiry
    pub async fn purge_expired_codes(&self) -> Result<usize, DomainError> {
        self.code_store.purge_expired(self.clock.now()).await
    }

    /// Whether the SMS provider currently looks reachable
    pub async fn sms_healthy(&self) -> bool {
        self.dispatcher.health_check().await
    }

    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.rate_limiter
    }

    pub fn cost_guard(&self) -> &Arc<CostGuard> {
        &self.cost_guard
    }

    pub fn config(&self) -> &VerificationServiceConfig {
        &self.config
    }

    fn format_message(&self, code: &str) -> String {
        format!(
            "[{}] 인증번호 [{}]를 입력해주세요. ({}분 내 유효)",
            self.config.brand_name,
            code,
            self.config.code_ttl_minutes()
        )
    }

    async fn discard(&self, phone: &str, masked: &str) {
        if let Err(e) = self.code_store.delete(phone).await {
            tracing::warn!(
                phone = %masked,
                error = %e,
                event = "otp_delete_failed",
                "Failed to delete spent verification code"
            );
        }
    }
}

fn storage_failure(masked_phone: &str, err: DomainError) -> VerificationError {
    tracing::error!(
        phone = %masked_phone,
        error = %err,
        event = "otp_storage_failed",
        "Verification storage operation failed"
    );
    VerificationError::StorageUnavailable
}

impl std::fmt::Debug for VerificationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
