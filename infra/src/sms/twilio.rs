//! Twilio SMS Service Implementation
//!
//! Renders the requested template and sends one message per recipient
//! through the Twilio API, with bounded retry on rate limiting and server
//! errors. Every network call and backoff runs under the caller context.

use async_trait::async_trait;
use phonenumber::{Mode, PhoneNumber};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use twilio::{Client, OutboundMessage};

use cg_core::{Context, SmsError, SmsServiceTrait, TemplateArgs};
use cg_shared::phone::{is_valid_chinese_mobile, mask_phone_number};
use cg_shared::TwilioSettings;

use super::template::Templates;
use crate::InfrastructureError;

const PROVIDER: &str = "twilio";

/// Twilio SMS service implementation
pub struct TwilioSmsService {
    client: Client,
    settings: TwilioSettings,
    templates: Templates,
}

impl TwilioSmsService {
    /// Create a new Twilio SMS service
    pub fn new(settings: TwilioSettings, templates: Templates) -> Result<Self, InfrastructureError> {
        if !settings.from_number.starts_with('+') {
            return Err(InfrastructureError::Config(
                "Twilio from number must be in E.164 format (starting with '+')".to_string(),
            ));
        }
        if settings.max_retries == 0 {
            return Err(InfrastructureError::Config(
                "Twilio max_retries must be at least 1".to_string(),
            ));
        }

        let client = Client::new(&settings.account_sid, &settings.auth_token);

        info!(
            "Twilio SMS service initialized with from number: {}",
            mask_phone_number(&settings.from_number)
        );

        Ok(Self {
            client,
            settings,
            templates,
        })
    }

    /// Normalize a recipient to E.164; bare mainland mobile numbers get +86
    fn normalize_recipient(phone: &str) -> Result<String, SmsError> {
        let candidate = if is_valid_chinese_mobile(phone) {
            format!("+86{}", phone)
        } else {
            phone.to_string()
        };

        candidate
            .parse::<PhoneNumber>()
            .map(|parsed| parsed.format().mode(Mode::E164).to_string())
            .map_err(|e| {
                error!("Invalid phone number format: {}", e);
                SmsError::InvalidRecipient {
                    recipient: mask_phone_number(phone),
                }
            })
    }

    /// Send one message with retry; returns the message SID
    async fn send_with_retry(&self, ctx: &Context, to: &str, body: &str) -> Result<String, SmsError> {
        let mut attempts = 0;
        let mut delay = Duration::from_millis(self.settings.retry_delay_ms);

        loop {
            attempts += 1;
            debug!(
                "Sending SMS attempt {}/{} to {}",
                attempts,
                self.settings.max_retries,
                mask_phone_number(to)
            );

            let msg = OutboundMessage::new(&self.settings.from_number, to, body);

            match ctx.run(self.client.send_message(msg)).await? {
                Ok(response) => {
                    info!(
                        "SMS sent successfully to {} with SID: {}",
                        mask_phone_number(to),
                        response.sid
                    );
                    return Ok(response.sid);
                }
                Err(e) => {
                    let error_msg = e.to_string();
                    error!(
                        "Failed to send SMS (attempt {}/{}): {}",
                        attempts, self.settings.max_retries, error_msg
                    );

                    if attempts >= self.settings.max_retries {
                        return Err(SmsError::provider(
                            PROVIDER,
                            format!("failed after {} attempts: {}", attempts, error_msg),
                        ));
                    }

                    if error_msg.contains("429") || error_msg.contains("rate") {
                        warn!("Rate limit detected, backing off for {:?}", delay);
                    } else if is_server_error(&error_msg) {
                        warn!("Server error detected, retrying after {:?}", delay);
                    } else {
                        // Client errors will not succeed on retry
                        return Err(SmsError::provider(PROVIDER, format!("invalid request: {}", error_msg)));
                    }

                    ctx.run(tokio::time::sleep(delay)).await?;
                    delay *= 2;
                }
            }
        }
    }
}

fn is_server_error(message: &str) -> bool {
    ["500", "502", "503", "504"].iter().any(|code| message.contains(code))
}

#[async_trait]
impl SmsServiceTrait for TwilioSmsService {
    async fn send(
        &self,
        ctx: &Context,
        template_id: &str,
        args: &TemplateArgs,
        numbers: &[String],
    ) -> Result<(), SmsError> {
        let body = self.templates.render(template_id, args).ok_or_else(|| {
            SmsError::provider(PROVIDER, format!("unknown template: {}", template_id))
        })?;

        let recipients = numbers
            .iter()
            .map(|n| Self::normalize_recipient(n))
            .collect::<Result<Vec<_>, _>>()?;

        for to in &recipients {
            self.send_with_retry(ctx, to, &body).await?;
        }
        Ok(())
    }

    fn provider_name(&self) -> &str {
        PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> TwilioSettings {
        TwilioSettings {
            account_sid: "ACtest".to_string(),
            auth_token: "token".to_string(),
            from_number: "+15005550006".to_string(),
            max_retries: 3,
            retry_delay_ms: 10,
        }
    }

    #[test]
    fn test_from_number_must_be_e164() {
        let mut bad = settings();
        bad.from_number = "15005550006".to_string();
        assert!(TwilioSmsService::new(bad, Templates::default()).is_err());
        assert!(TwilioSmsService::new(settings(), Templates::default()).is_ok());
    }

    #[test]
    fn test_normalize_recipient() {
        assert_eq!(
            TwilioSmsService::normalize_recipient("15212345678").unwrap(),
            "+8615212345678"
        );
        assert_eq!(
            TwilioSmsService::normalize_recipient("+14155552671").unwrap(),
            "+14155552671"
        );
        assert!(matches!(
            TwilioSmsService::normalize_recipient("not a number"),
            Err(SmsError::InvalidRecipient { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_template_fails_before_sending() {
        let service = TwilioSmsService::new(settings(), Templates::default()).unwrap();
        let result = service
            .send(
                &Context::background(),
                "missing",
                &TemplateArgs::new(),
                &["+14155552671".to_string()],
            )
            .await;
        assert!(matches!(result, Err(SmsError::Provider { .. })));
    }
}
