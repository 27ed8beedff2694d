//! Send and verify a code through the configured stack
//!
//! Run with: cargo run -p cg_infra --example code_service_demo -- 15212345678
//!
//! Without a config file the development defaults apply: in-process store
//! and the local provider, which logs the rendered message.

use anyhow::Context as _;
use std::time::Duration;

use cg_core::{Context, DomainError};
use cg_infra::{logging, wiring};
use cg_shared::{AppConfig, Environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = match Environment::from_env() {
        Environment::Development => AppConfig::development(),
        _ => AppConfig::load().context("Failed to load configuration")?,
    };
    logging::init_tracing(&config.logging)?;

    let phone = std::env::args().nth(1).unwrap_or_else(|| "15212345678".to_string());
    let scope = config.code.scope.clone();
    let service = wiring::build_code_service(&config).await?;

    let ctx = Context::with_timeout(Duration::from_secs(5));
    let result = service.send(&ctx, &scope, &phone).await?;
    println!(
        "Code sent to {}: expires in {}s, resend after {}s",
        phone,
        result.expires_in.as_secs(),
        result.resend_after.as_secs()
    );

    match service.send(&ctx, &scope, &phone).await {
        Err(DomainError::Store(err)) => println!("Immediate resend refused: {}", err),
        other => println!("Immediate resend: {:?}", other.map(|_| ())),
    }

    for guess in ["000000", "111111", "222222", "333333"] {
        let matched = service.verify(&ctx, &scope, &phone, guess).await?;
        println!("Guess {}: matched = {}", guess, matched);
    }

    Ok(())
}
