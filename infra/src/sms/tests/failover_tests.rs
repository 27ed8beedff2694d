//! Unit tests for round-robin failover

use std::sync::Arc;

use cg_core::{Context, SmsError, SmsServiceTrait, TemplateArgs};

use super::mocks::{chain, numbers, Outcome, ScriptedProvider};
use crate::sms::{FailoverSmsService, ProviderState};

#[tokio::test]
async fn test_first_failure_moves_to_next_provider() {
    let a = ScriptedProvider::new("a", Outcome::Fail);
    let b = ScriptedProvider::new("b", Outcome::Ok);
    let c = ScriptedProvider::new("c", Outcome::Ok);
    let service = FailoverSmsService::new(chain(&[a.clone(), b.clone(), c.clone()]));

    let result = service
        .send(&Context::background(), "login_code", &TemplateArgs::new(), &numbers())
        .await;

    assert!(result.is_ok());
    assert_eq!(a.calls(), 1);
    assert_eq!(b.calls(), 1);
    assert_eq!(c.calls(), 0);
}

#[tokio::test]
async fn test_all_failing_tries_each_provider_once() {
    let providers = [
        ScriptedProvider::new("a", Outcome::Fail),
        ScriptedProvider::new("b", Outcome::Fail),
        ScriptedProvider::new("c", Outcome::Fail),
    ];
    let service = FailoverSmsService::new(chain(&providers));

    let err = service
        .send(&Context::background(), "login_code", &TemplateArgs::new(), &numbers())
        .await
        .unwrap_err();

    match err {
        SmsError::ProvidersExhausted { attempts, last_error } => {
            assert_eq!(attempts, 3);
            assert!(matches!(*last_error, SmsError::Provider { .. }));
        }
        other => panic!("Expected exhausted providers, got {:?}", other),
    }
    for p in &providers {
        assert_eq!(p.calls(), 1);
    }
}

#[tokio::test]
async fn test_start_rotates_per_send() {
    let providers = [
        ScriptedProvider::new("a", Outcome::Ok),
        ScriptedProvider::new("b", Outcome::Ok),
        ScriptedProvider::new("c", Outcome::Ok),
    ];
    let service = FailoverSmsService::new(chain(&providers));
    let ctx = Context::background();

    for _ in 0..6 {
        service
            .send(&ctx, "login_code", &TemplateArgs::new(), &numbers())
            .await
            .unwrap();
    }
    for p in &providers {
        assert_eq!(p.calls(), 2);
    }
}

#[tokio::test]
async fn test_cancellation_from_provider_stops_walk() {
    let a = ScriptedProvider::new("a", Outcome::Cancelled);
    let b = ScriptedProvider::new("b", Outcome::Ok);
    let service = FailoverSmsService::new(chain(&[a.clone(), b.clone()]));

    let err = service
        .send(&Context::background(), "login_code", &TemplateArgs::new(), &numbers())
        .await
        .unwrap_err();

    assert_eq!(err, SmsError::Cancelled);
    assert_eq!(b.calls(), 0);
}

#[tokio::test]
async fn test_deadline_from_provider_stops_walk() {
    let a = ScriptedProvider::new("a", Outcome::Timeout);
    let b = ScriptedProvider::new("b", Outcome::Ok);
    let service = FailoverSmsService::new(chain(&[a, b.clone()]));

    let err = service
        .send(&Context::background(), "login_code", &TemplateArgs::new(), &numbers())
        .await
        .unwrap_err();

    assert_eq!(err, SmsError::DeadlineExceeded);
    assert_eq!(b.calls(), 0);
}

#[tokio::test]
async fn test_cancelled_context_does_not_advance_sequence() {
    let a = ScriptedProvider::new("a", Outcome::Ok);
    let state = Arc::new(ProviderState::new());
    let service = FailoverSmsService::with_state(chain(&[a.clone()]), state.clone());

    let ctx = Context::background();
    ctx.cancel();
    let err = service
        .send(&ctx, "login_code", &TemplateArgs::new(), &numbers())
        .await
        .unwrap_err();

    assert_eq!(err, SmsError::Cancelled);
    assert_eq!(state.sequence(), 0);
    assert_eq!(a.calls(), 0);
}

#[tokio::test]
async fn test_empty_chain() {
    let service = FailoverSmsService::new(Vec::new());
    let err = service
        .send(&Context::background(), "login_code", &TemplateArgs::new(), &numbers())
        .await
        .unwrap_err();
    assert_eq!(err, SmsError::NoProviders);
}
