//! Main code service implementation

use std::sync::Arc;

use cg_shared::utils::phone::{is_valid_phone, mask_phone_number};

use crate::context::Context;
use crate::domain::entities::verification_code::{
    effective_code_length, generate_code, is_well_formed_code,
};
use crate::errors::{CodeError, DomainError, DomainResult};
use crate::services::sms::{SmsServiceTrait, TemplateArgs};

use super::config::CodeServiceConfig;
use super::traits::CodeCacheTrait;
use super::types::SendCodeResult;

/// Template argument carrying the generated code
pub const CODE_TEMPLATE_ARG: &str = "code";

/// Issues codes through a store and delivers them through a sender stack
pub struct CodeService<C: CodeCacheTrait + ?Sized, S: SmsServiceTrait + ?Sized> {
    /// Atomic code store
    cache: Arc<C>,
    /// Provider, failover chain or decorator stack
    sms: Arc<S>,
    /// Service configuration
    config: CodeServiceConfig,
}

/// Code service over trait objects, as produced by configuration-driven wiring
pub type DynCodeService = CodeService<dyn CodeCacheTrait, dyn SmsServiceTrait>;

impl<C: CodeCacheTrait + ?Sized, S: SmsServiceTrait + ?Sized> CodeService<C, S> {
    /// Create a new code service
    ///
    /// # Arguments
    ///
    /// * `cache` - Code store implementation
    /// * `sms` - Sender used to deliver codes
    /// * `config` - Service configuration; `code_length` is clamped to the
    ///   generator's range so issued codes always pass the input check
    pub fn new(cache: Arc<C>, sms: Arc<S>, mut config: CodeServiceConfig) -> Self {
        config.code_length = effective_code_length(config.code_length);
        Self { cache, sms, config }
    }

    pub fn config(&self) -> &CodeServiceConfig {
        &self.config
    }

    /// Generate a code for `phone`, store it, then deliver it.
    ///
    /// Store errors are returned before anything is sent. A delivery failure
    /// after a successful store is returned as-is; the stored code stays.
    ///
    /// # Errors
    ///
    /// * `DomainError::Validation` - empty scope or malformed phone number
    /// * `DomainError::Store` - e.g. `SendTooFrequent` during the cooldown
    /// * `DomainError::Delivery` - rate limited, providers exhausted, cancelled
    pub async fn send(&self, ctx: &Context, scope: &str, phone: &str) -> DomainResult<SendCodeResult> {
        validate_target(scope, phone)?;
        let masked = mask_phone_number(phone);

        let code = generate_code(self.config.code_length);

        self.cache.set(ctx, scope, phone, &code).await.map_err(|e| {
            match &e {
                CodeError::SendTooFrequent => tracing::warn!(
                    phone = %masked,
                    scope = scope,
                    event = "code_send_too_frequent",
                    "Verification code requested within resend interval"
                ),
                _ => tracing::error!(
                    phone = %masked,
                    scope = scope,
                    error = %e,
                    event = "code_store_failed",
                    "Failed to store verification code"
                ),
            }
            DomainError::Store(e)
        })?;

        tracing::debug!(phone = %masked, scope = scope, event = "code_stored", "Stored verification code");

        let mut args = TemplateArgs::new();
        args.insert(CODE_TEMPLATE_ARG.to_string(), code);

        self.sms
            .send(ctx, &self.config.template_id, &args, &[phone.to_string()])
            .await
            .map_err(|e| {
                tracing::error!(
                    phone = %masked,
                    scope = scope,
                    provider = self.sms.provider_name(),
                    error = %e,
                    event = "code_delivery_failed",
                    "Failed to deliver verification code"
                );
                DomainError::Delivery(e)
            })?;

        tracing::info!(
            phone = %masked,
            scope = scope,
            provider = self.sms.provider_name(),
            event = "code_sent",
            "Verification code sent"
        );

        Ok(SendCodeResult {
            expires_in: self.config.ttl,
            resend_after: self.config.resend_interval,
        })
    }

    /// Check `input` against the code issued to `phone` in `scope`.
    ///
    /// Running out of attempts reads as `Ok(false)`, the same as a wrong
    /// guess. Inputs that cannot be a generated code are rejected without
    /// spending an attempt.
    ///
    /// # Errors
    ///
    /// * `DomainError::Validation` - empty scope or malformed phone number
    /// * `DomainError::Store` - no code to verify, backend failure, cancelled
    pub async fn verify(
        &self,
        ctx: &Context,
        scope: &str,
        phone: &str,
        input: &str,
    ) -> DomainResult<bool> {
        validate_target(scope, phone)?;
        let masked = mask_phone_number(phone);

        if !is_well_formed_code(input, self.config.code_length) {
            tracing::debug!(phone = %masked, scope = scope, "Rejected malformed verification input");
            return Ok(false);
        }

        match self.cache.verify(ctx, scope, phone, input).await {
            Ok(matched) => {
                tracing::info!(
                    phone = %masked,
                    scope = scope,
                    matched = matched,
                    event = "code_verified",
                    "Verification attempt completed"
                );
                Ok(matched)
            }
            Err(CodeError::VerifyTooMany) => {
                tracing::warn!(
                    phone = %masked,
                    scope = scope,
                    event = "code_verify_too_many",
                    "Verification attempts exhausted"
                );
                Ok(false)
            }
            Err(e) => Err(DomainError::Store(e)),
        }
    }
}

fn validate_target(scope: &str, phone: &str) -> DomainResult<()> {
    if scope.is_empty() {
        return Err(DomainError::Validation {
            message: "Scope must not be empty".to_string(),
        });
    }
    if !is_valid_phone(phone) {
        return Err(DomainError::Validation {
            message: format!("Invalid phone number format: {}", mask_phone_number(phone)),
        });
    }
    Ok(())
}
