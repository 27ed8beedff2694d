//! Integration tests for composed SMS sender stacks

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cg_core::{
    CodeService, CodeServiceConfig, Context, DomainError, SmsError, SmsServiceTrait, TemplateArgs,
};
use cg_infra::cache::LocalCodeCache;
use cg_infra::services::LocalSlidingWindowLimiter;
use cg_infra::sms::{
    FailoverSmsService, LocalSmsService, ProviderState, RateLimitSmsService,
    TimeoutFailoverSmsService,
};
use cg_shared::CodeConfig;

const PHONE: &str = "15212345678";

/// Provider keeping the last code it was asked to deliver
#[derive(Default)]
struct CapturingProvider {
    last_code: Mutex<Option<String>>,
    calls: AtomicUsize,
}

#[async_trait]
impl SmsServiceTrait for CapturingProvider {
    async fn send(
        &self,
        ctx: &Context,
        _template_id: &str,
        args: &TemplateArgs,
        _numbers: &[String],
    ) -> Result<(), SmsError> {
        if let Some(err) = ctx.err() {
            return Err(err.into());
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_code.lock().unwrap() = args.get("code").cloned();
        Ok(())
    }

    fn provider_name(&self) -> &str {
        "capturing"
    }
}

fn numbers() -> Vec<String> {
    vec![PHONE.to_string()]
}

#[tokio::test]
async fn test_failover_skips_broken_provider() {
    let a = LocalSmsService::new("a").failing();
    let b = LocalSmsService::new("b");
    let c = LocalSmsService::new("c");
    let providers: Vec<Arc<dyn SmsServiceTrait>> =
        vec![Arc::new(a.clone()), Arc::new(b.clone()), Arc::new(c.clone())];
    let service = FailoverSmsService::new(providers);

    service
        .send(&Context::background(), "login_code", &TemplateArgs::new(), &numbers())
        .await
        .unwrap();

    assert_eq!(a.call_count(), 1);
    assert_eq!(b.message_count(), 1);
    assert_eq!(c.call_count(), 0);
}

#[tokio::test]
async fn test_shared_state_rotates_across_chains() {
    let a = LocalSmsService::new("a");
    let b = LocalSmsService::new("b");
    let state = Arc::new(ProviderState::new());
    let providers: Vec<Arc<dyn SmsServiceTrait>> = vec![Arc::new(a.clone()), Arc::new(b.clone())];

    let first = FailoverSmsService::with_state(providers.clone(), state.clone());
    let second = FailoverSmsService::with_state(providers, state.clone());
    let ctx = Context::background();

    first.send(&ctx, "login_code", &TemplateArgs::new(), &numbers()).await.unwrap();
    second.send(&ctx, "login_code", &TemplateArgs::new(), &numbers()).await.unwrap();

    assert_eq!(state.sequence(), 2);
    assert_eq!(a.message_count(), 1);
    assert_eq!(b.message_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limited_timeout_chain() {
    let slow = LocalSmsService::new("slow").with_latency(Duration::from_secs(10));
    let fast = LocalSmsService::new("fast");
    let providers: Vec<Arc<dyn SmsServiceTrait>> = vec![Arc::new(slow.clone()), Arc::new(fast.clone())];
    let chain = TimeoutFailoverSmsService::new(providers, 1)
        .with_send_timeout(Duration::from_millis(200));
    let limiter = Arc::new(LocalSlidingWindowLimiter::new(Duration::from_secs(60), 3));
    let service = RateLimitSmsService::new(Arc::new(chain), limiter);
    let ctx = Context::background();

    // Two timeouts exceed the threshold of one; the third send switches
    for _ in 0..2 {
        assert_eq!(
            service.send(&ctx, "login_code", &TemplateArgs::new(), &numbers()).await,
            Err(SmsError::DeadlineExceeded)
        );
    }
    service
        .send(&ctx, "login_code", &TemplateArgs::new(), &numbers())
        .await
        .unwrap();
    assert_eq!(fast.message_count(), 1);

    // Quota of three is spent, timeouts included
    assert_eq!(
        service.send(&ctx, "login_code", &TemplateArgs::new(), &numbers()).await,
        Err(SmsError::RateLimited)
    );
}

#[tokio::test(start_paused = true)]
async fn test_code_service_round_trip_over_local_stack() {
    let provider = Arc::new(CapturingProvider::default());
    let limiter = Arc::new(LocalSlidingWindowLimiter::new(Duration::from_secs(1), 1000));
    let sms = Arc::new(RateLimitSmsService::new(provider.clone(), limiter));
    let cache = Arc::new(LocalCodeCache::new(1024, &CodeConfig::default()));
    let service = CodeService::new(cache, sms, CodeServiceConfig::default());
    let ctx = Context::background();

    service.send(&ctx, "login", PHONE).await.unwrap();
    let code = provider.last_code.lock().unwrap().clone().unwrap();

    assert_eq!(service.verify(&ctx, "login", PHONE, &code).await, Ok(true));

    // Within the resend interval a second send is refused before delivery
    let err = service.send(&ctx, "login", PHONE).await.unwrap_err();
    assert!(matches!(err, DomainError::Store(_)));
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

    // After the code expires there is nothing left to verify
    tokio::time::advance(Duration::from_secs(601)).await;
    assert!(matches!(
        service.verify(&ctx, "login", PHONE, &code).await,
        Err(DomainError::Store(_))
    ));
}
