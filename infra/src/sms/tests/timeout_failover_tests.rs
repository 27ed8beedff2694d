//! Unit tests for the timeout circuit breaker

use std::sync::Arc;
use std::time::Duration;

use cg_core::{Context, SmsError, SmsServiceTrait, TemplateArgs};

use super::mocks::{chain, numbers, Outcome, ScriptedProvider};
use crate::sms::{LocalSmsService, ProviderState, TimeoutFailoverSmsService};

async fn send(service: &TimeoutFailoverSmsService) -> Result<(), SmsError> {
    service
        .send(&Context::background(), "login_code", &TemplateArgs::new(), &numbers())
        .await
}

#[tokio::test]
async fn test_switches_after_threshold_plus_one_timeouts() {
    let p0 = ScriptedProvider::new("p0", Outcome::Timeout);
    let p1 = ScriptedProvider::new("p1", Outcome::Ok);
    let service = TimeoutFailoverSmsService::new(chain(&[p0.clone(), p1.clone()]), 3);

    for _ in 0..4 {
        assert_eq!(send(&service).await, Err(SmsError::DeadlineExceeded));
    }
    assert_eq!(service.state().consecutive_failures(), 4);
    assert_eq!(p1.calls(), 0);

    send(&service).await.unwrap();
    assert_eq!(p0.calls(), 4);
    assert_eq!(p1.calls(), 1);
    assert_eq!(service.state().current_index(), 1);
    assert_eq!(service.state().consecutive_failures(), 0);
}

#[tokio::test]
async fn test_stays_while_at_threshold() {
    let p0 = ScriptedProvider::new("p0", Outcome::Timeout);
    let p1 = ScriptedProvider::new("p1", Outcome::Ok);
    let service = TimeoutFailoverSmsService::new(chain(&[p0.clone(), p1.clone()]), 3);

    for _ in 0..3 {
        let _ = send(&service).await;
    }
    p0.set_outcome(Outcome::Ok);

    send(&service).await.unwrap();
    assert_eq!(p0.calls(), 4);
    assert_eq!(p1.calls(), 0);
    assert_eq!(service.state().consecutive_failures(), 0);
}

#[tokio::test]
async fn test_success_resets_failures() {
    let p0 = ScriptedProvider::new("p0", Outcome::Timeout);
    let service = TimeoutFailoverSmsService::new(chain(&[p0.clone()]), 3);

    let _ = send(&service).await;
    let _ = send(&service).await;
    assert_eq!(service.state().consecutive_failures(), 2);

    p0.set_outcome(Outcome::Ok);
    send(&service).await.unwrap();
    assert_eq!(service.state().consecutive_failures(), 0);
}

#[tokio::test]
async fn test_other_errors_leave_breaker_alone() {
    let p0 = ScriptedProvider::new("p0", Outcome::Timeout);
    let p1 = ScriptedProvider::new("p1", Outcome::Ok);
    let service = TimeoutFailoverSmsService::new(chain(&[p0.clone(), p1.clone()]), 0);

    let _ = send(&service).await;
    assert_eq!(service.state().consecutive_failures(), 1);

    // Breaker trips on the next call, which then hits a plain failure
    p1.set_outcome(Outcome::Fail);
    let err = send(&service).await.unwrap_err();
    assert!(matches!(err, SmsError::Provider { .. }));
    assert_eq!(service.state().current_index(), 1);
    assert_eq!(service.state().consecutive_failures(), 0);

    let err = send(&service).await.unwrap_err();
    assert!(matches!(err, SmsError::Provider { .. }));
    assert_eq!(service.state().current_index(), 1);
    assert_eq!(p1.calls(), 2);
}

#[tokio::test]
async fn test_sends_only_through_current_provider() {
    let p0 = ScriptedProvider::new("p0", Outcome::Fail);
    let p1 = ScriptedProvider::new("p1", Outcome::Ok);
    let service = TimeoutFailoverSmsService::new(chain(&[p0.clone(), p1.clone()]), 3);

    assert!(send(&service).await.is_err());
    assert_eq!(p1.calls(), 0);
}

#[tokio::test]
async fn test_wraps_around() {
    let p0 = ScriptedProvider::new("p0", Outcome::Ok);
    let p1 = ScriptedProvider::new("p1", Outcome::Timeout);
    let state = Arc::new(ProviderState::new());
    assert!(state.try_advance(state.snapshot(), 2));
    let service =
        TimeoutFailoverSmsService::with_state(chain(&[p0.clone(), p1.clone()]), 1, state.clone());

    for _ in 0..2 {
        let _ = send(&service).await;
    }
    send(&service).await.unwrap();
    assert_eq!(state.current_index(), 0);
    assert_eq!(p0.calls(), 1);
}

#[tokio::test]
async fn test_cancelled_context_leaves_state_untouched() {
    let p0 = ScriptedProvider::new("p0", Outcome::Ok);
    let service = TimeoutFailoverSmsService::new(chain(&[p0.clone()]), 3);
    let ctx = Context::background();
    ctx.cancel();

    let err = service
        .send(&ctx, "login_code", &TemplateArgs::new(), &numbers())
        .await
        .unwrap_err();
    assert_eq!(err, SmsError::Cancelled);
    assert_eq!(p0.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_send_timeout_counts_slow_provider() {
    let slow = LocalSmsService::new("slow").with_latency(Duration::from_secs(5));
    let fast = LocalSmsService::new("fast");
    let providers: Vec<Arc<dyn SmsServiceTrait>> =
        vec![Arc::new(slow.clone()), Arc::new(fast.clone())];
    let service = TimeoutFailoverSmsService::new(providers, 0)
        .with_send_timeout(Duration::from_millis(100));

    assert_eq!(send(&service).await, Err(SmsError::DeadlineExceeded));
    send(&service).await.unwrap();

    assert_eq!(slow.message_count(), 0);
    assert_eq!(fast.message_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_senders_advance_once() {
    let p0 = ScriptedProvider::new("p0", Outcome::Timeout);
    let p1 = ScriptedProvider::new("p1", Outcome::Ok);
    let p2 = ScriptedProvider::new("p2", Outcome::Ok);
    let state = Arc::new(ProviderState::new());
    let service = Arc::new(TimeoutFailoverSmsService::with_state(
        chain(&[p0.clone(), p1.clone(), p2.clone()]),
        3,
        state.clone(),
    ));

    for _ in 0..4 {
        let _ = send(&service).await;
    }

    let mut handles = Vec::new();
    for _ in 0..16 {
        let service = service.clone();
        handles.push(tokio::spawn(async move { send(&service).await }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(state.current_index(), 1);
    assert_eq!(p1.calls(), 16);
    assert_eq!(p2.calls(), 0);
}
