//! Walks a token pair through its lifecycle against the in-memory store.
//!
//! $ cargo run --bin token_demo

use chrono::{TimeDelta, Utc};
use latchkey::application_impl::*;
use latchkey::application_port::*;
use latchkey::domain_port::*;
use latchkey::infra_memory::*;
use latchkey::logger::*;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let logger = Logger::new_bootstrap()?;
    logger.reload("debug")?;

    let clock = Arc::new(ManualClock::new(Utc::now()));
    let codec = Arc::new(JwtTokenCodec::try_new(
        TokenConfig::new(b"demo-secret".to_vec()),
        clock.clone(),
    )?);
    let store = Arc::new(MemoryRevocationStore::new(clock.clone()));
    let sessions = RealSessionService::new(codec, store.clone(), clock.clone());

    let pair = sessions.issue("alice@example.com").await?;
    info!(access = %pair.access_token, "minted pair");

    let payload = sessions.authenticate(&pair.access_token).await?;
    info!(subject = %payload.subject, expires_at = %payload.expires_at, "authenticated");

    let rotated = sessions.refresh(&pair.refresh_token).await?;
    info!(refresh = %rotated.refresh_token, "rotated refresh token");

    let replay = sessions.refresh(&pair.refresh_token).await;
    info!(?replay, "replayed the old refresh token");

    sessions.revoke(&rotated.refresh_token).await?;
    info!(entries = store.len(), "revoked the new refresh token");

    clock.advance(TimeDelta::minutes(31));
    let late = sessions.authenticate(&pair.access_token).await;
    info!(?late, "authenticated after access expiry");

    Ok(())
}
