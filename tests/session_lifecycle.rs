use chrono::{DateTime, TimeDelta};
use latchkey::application_impl::*;
use latchkey::application_port::*;
use latchkey::domain_model::*;
use latchkey::domain_port::*;
use latchkey::infra_memory::*;
use std::sync::Arc;
use std::time::Duration;

struct Harness {
    clock: Arc<ManualClock>,
    codec: Arc<JwtTokenCodec>,
    sessions: RealSessionService,
}

fn harness() -> Harness {
    let clock = Arc::new(ManualClock::new(
        DateTime::from_timestamp(1_750_000_000, 0).unwrap(),
    ));
    let mut cfg = TokenConfig::new(b"integration-secret".to_vec());
    cfg.access_ttl = Duration::from_secs(30 * 60);
    cfg.refresh_ttl = Duration::from_secs(7 * 24 * 60 * 60);
    let codec = Arc::new(JwtTokenCodec::try_new(cfg, clock.clone()).unwrap());
    let store = Arc::new(MemoryRevocationStore::new(clock.clone()));
    let sessions = RealSessionService::new(codec.clone(), store, clock.clone());
    Harness {
        clock,
        codec,
        sessions,
    }
}

#[tokio::test]
async fn alice_scenario() {
    let h = harness();
    let pair = h.sessions.issue("alice@example.com").await.unwrap();

    let payload = h.sessions.authenticate(&pair.access_token).await.unwrap();
    assert_eq!(payload.subject, "alice@example.com");
    assert_eq!(payload.token_type, TokenType::Access);

    h.sessions.revoke(&pair.refresh_token).await.unwrap();
    assert_eq!(
        h.sessions.refresh(&pair.refresh_token).await,
        Err(SessionError::InvalidCredentials)
    );

    h.clock.advance(TimeDelta::minutes(30) + TimeDelta::seconds(1));
    assert_eq!(
        h.sessions.authenticate(&pair.access_token).await,
        Err(SessionError::Expired)
    );
}

#[tokio::test]
async fn rotated_refresh_token_stays_dead_for_its_whole_lifetime() {
    let h = harness();
    let pair = h.sessions.issue("bob@example.com").await.unwrap();

    let mut current = h.sessions.refresh(&pair.refresh_token).await.unwrap();
    for day in 1..7 {
        h.clock.advance(TimeDelta::days(1));
        assert_eq!(
            h.sessions.refresh(&pair.refresh_token).await,
            Err(SessionError::InvalidCredentials),
            "old token accepted on day {day}"
        );
        current = h.sessions.refresh(&current.refresh_token).await.unwrap();
    }

    h.clock.advance(TimeDelta::days(2));
    assert_eq!(
        h.sessions.refresh(&pair.refresh_token).await,
        Err(SessionError::Expired)
    );
    assert!(h.sessions.authenticate(&current.access_token).await.is_err());
}

#[tokio::test]
async fn revocation_entry_matches_token_lifetime() {
    let h = harness();
    let token = h
        .codec
        .mint("carol@example.com", TokenType::Access, Duration::from_secs(120))
        .unwrap();

    h.clock.advance(TimeDelta::seconds(20));
    h.sessions.revoke(&token).await.unwrap();
    assert!(h.sessions.is_revoked(&token).await.unwrap());

    h.clock.advance(TimeDelta::seconds(99));
    assert!(h.sessions.is_revoked(&token).await.unwrap());
    assert_eq!(
        h.sessions.authenticate(&token).await,
        Err(SessionError::InvalidCredentials)
    );

    h.clock.advance(TimeDelta::seconds(1));
    assert!(!h.sessions.is_revoked(&token).await.unwrap());
    assert_eq!(
        h.sessions.authenticate(&token).await,
        Err(SessionError::Expired)
    );
}

#[tokio::test]
async fn type_tags_are_enforced_end_to_end() {
    let h = harness();
    let pair = h.sessions.issue("dave@example.com").await.unwrap();

    assert!(matches!(
        h.codec.parse_as_type(&pair.access_token, TokenType::Refresh),
        Err(TokenError::WrongTokenType { .. })
    ));
    assert_eq!(
        h.sessions.refresh(&pair.access_token).await,
        Err(SessionError::InvalidCredentials)
    );
    assert_eq!(
        h.sessions.authenticate(&pair.refresh_token).await,
        Err(SessionError::InvalidCredentials)
    );
}
