//! End-to-end session lifecycle tests over in-memory backends.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use authgate_blacklist::{Blacklist, BlacklistConfig, MemoryBackend, RevocationBackend, UnreachableBackend};
use authgate_core::{Credential, Role, UserId};
use authgate_ledger::MemoryLedger;
use authgate_session::{MemoryCredentialStore, SessionError, SessionManager};
use authgate_throttle::{AttemptThrottle, ThrottleConfig};
use authgate_token::{
    HashPolicy, PasswordError, PasswordHasherService, PasswordVerifier, TokenCodec, TokenConfig,
    TokenKind, TokenSubject,
};
use chrono::Utc;

/// Counts verifier invocations so tests can prove lockout and rate
/// limiting short-circuit before any bcrypt work.
struct SpyVerifier {
    inner: PasswordHasherService,
    calls: AtomicUsize,
}

impl SpyVerifier {
    fn new() -> Self {
        Self {
            inner: PasswordHasherService::new(HashPolicy::new().cost(4)),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PasswordVerifier for SpyVerifier {
    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.verify(password, hash)
    }
}

struct Engine {
    manager: SessionManager,
    codec: Arc<TokenCodec>,
    store: Arc<MemoryCredentialStore>,
    verifier: Arc<SpyVerifier>,
}

impl Engine {
    fn new(throttle: ThrottleConfig, backend: Arc<dyn RevocationBackend>) -> Self {
        let codec = Arc::new(TokenCodec::new(TokenConfig::new("test-secret")));
        let verifier = Arc::new(SpyVerifier::new());
        let store = Arc::new(MemoryCredentialStore::new());

        let manager = SessionManager::new(
            Arc::clone(&codec),
            Arc::clone(&verifier) as Arc<dyn PasswordVerifier>,
            Arc::clone(&store) as _,
            Arc::new(AttemptThrottle::new(throttle)),
            Arc::new(Blacklist::new(backend, BlacklistConfig::default())),
            Arc::new(MemoryLedger::new()),
        );

        Self {
            manager,
            codec,
            store,
            verifier,
        }
    }

    fn with_defaults() -> Self {
        Self::new(ThrottleConfig::default(), Arc::new(MemoryBackend::new()))
    }

    fn register(&self, email: &str, password: &str) -> UserId {
        let hasher = PasswordHasherService::new(HashPolicy::new().cost(4));
        let user_id = UserId::generate();
        self.store.insert(Credential {
            user_id,
            email: email.to_string(),
            role: Role::User,
            password_hash: hasher.hash(password).unwrap(),
        });
        user_id
    }
}

#[tokio::test]
async fn login_authorize_refresh_logout() {
    let engine = Engine::with_defaults();
    let user_id = engine.register("user@example.com", "Str0ng!pass");

    let session = engine
        .manager
        .authenticate("user@example.com", "Str0ng!pass", "10.0.0.1")
        .await
        .unwrap();
    assert_eq!(session.user_id, user_id);
    assert_eq!(session.role, Role::User);

    let claims = engine
        .manager
        .authorize_request(&session.tokens.access.token)
        .await
        .unwrap();
    assert_eq!(claims.email, "user@example.com");
    assert_eq!(claims.user_id().unwrap(), user_id);

    let rotated = engine
        .manager
        .refresh(&session.tokens.refresh.token, "10.0.0.1")
        .await
        .unwrap();
    assert_ne!(rotated.refresh.token, session.tokens.refresh.token);

    engine
        .manager
        .logout(
            &rotated.access.token,
            Some(rotated.refresh.token.as_str()),
            "10.0.0.1",
        )
        .await
        .unwrap();

    let denied = engine.manager.authorize_request(&rotated.access.token).await;
    assert!(matches!(denied, Err(SessionError::TokenRevoked)));
}

#[tokio::test]
async fn wrong_password_and_unknown_email_look_identical() {
    let engine = Engine::with_defaults();
    engine.register("user@example.com", "Str0ng!pass");

    let wrong = engine
        .manager
        .authenticate("user@example.com", "wrong", "10.0.0.1")
        .await;
    let unknown = engine
        .manager
        .authenticate("ghost@example.com", "whatever", "10.0.0.1")
        .await;

    assert!(matches!(wrong, Err(SessionError::InvalidCredentials)));
    assert!(matches!(unknown, Err(SessionError::InvalidCredentials)));
}

#[tokio::test]
async fn lockout_fails_fast_without_password_verification() {
    let throttle = ThrottleConfig {
        lockout_threshold: 3,
        ..ThrottleConfig::default()
    };
    let engine = Engine::new(throttle, Arc::new(MemoryBackend::new()));
    engine.register("user@example.com", "Str0ng!pass");

    for _ in 0..3 {
        let result = engine
            .manager
            .authenticate("user@example.com", "wrong", "10.0.0.1")
            .await;
        assert!(matches!(result, Err(SessionError::InvalidCredentials)));
    }
    assert_eq!(engine.verifier.calls(), 3);

    // Locked now, even with the right password, and no bcrypt is spent.
    let locked = engine
        .manager
        .authenticate("user@example.com", "Str0ng!pass", "10.0.0.1")
        .await;
    assert!(matches!(locked, Err(SessionError::AccountLocked { .. })));
    assert_eq!(engine.verifier.calls(), 3);

    // A different source address is not locked out.
    let elsewhere = engine
        .manager
        .authenticate("user@example.com", "Str0ng!pass", "10.9.9.9")
        .await;
    assert!(elsewhere.is_ok());
}

#[tokio::test]
async fn rate_limit_rejects_before_verification() {
    let throttle = ThrottleConfig {
        rate_limit: 2,
        rate_window: Duration::from_secs(60),
        ..ThrottleConfig::default()
    };
    let engine = Engine::new(throttle, Arc::new(MemoryBackend::new()));
    engine.register("user@example.com", "Str0ng!pass");

    for _ in 0..2 {
        engine
            .manager
            .authenticate("user@example.com", "Str0ng!pass", "10.0.0.1")
            .await
            .unwrap();
    }

    let limited = engine
        .manager
        .authenticate("user@example.com", "Str0ng!pass", "10.0.0.1")
        .await;
    assert!(matches!(
        limited,
        Err(SessionError::RateLimited { retry_after_seconds }) if retry_after_seconds <= 60
    ));
    assert_eq!(engine.verifier.calls(), 2);
}

#[tokio::test]
async fn refresh_reuse_revokes_all_sessions() {
    let engine = Engine::with_defaults();
    engine.register("user@example.com", "Str0ng!pass");

    let session = engine
        .manager
        .authenticate("user@example.com", "Str0ng!pass", "10.0.0.1")
        .await
        .unwrap();

    let rotated = engine
        .manager
        .refresh(&session.tokens.refresh.token, "10.0.0.1")
        .await
        .unwrap();

    // Replaying the consumed token trips reuse detection...
    let replay = engine.manager.refresh(&session.tokens.refresh.token, "10.0.0.1").await;
    assert!(matches!(replay, Err(SessionError::TokenReused)));

    // ...which kills the rotated token too.
    let collateral = engine.manager.refresh(&rotated.refresh.token, "10.0.0.1").await;
    assert!(matches!(collateral, Err(SessionError::TokenReused)));
}

#[tokio::test]
async fn concurrent_refresh_has_exactly_one_winner() {
    let engine = Engine::with_defaults();
    engine.register("user@example.com", "Str0ng!pass");

    let session = engine
        .manager
        .authenticate("user@example.com", "Str0ng!pass", "10.0.0.1")
        .await
        .unwrap();

    let manager = Arc::new(engine.manager);
    let token = session.tokens.refresh.token;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let manager = Arc::clone(&manager);
        let token = token.clone();
        handles.push(tokio::spawn(async move { manager.refresh(&token, "10.0.0.1").await }));
    }

    let mut wins = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            wins += 1;
        }
    }
    assert_eq!(wins, 1);
}

#[tokio::test]
async fn access_token_rejected_for_refresh() {
    let engine = Engine::with_defaults();
    engine.register("user@example.com", "Str0ng!pass");

    let session = engine
        .manager
        .authenticate("user@example.com", "Str0ng!pass", "10.0.0.1")
        .await
        .unwrap();

    let result = engine.manager.refresh(&session.tokens.access.token, "10.0.0.1").await;
    assert!(matches!(result, Err(SessionError::TokenTypeMismatch)));
}

#[tokio::test]
async fn blacklist_outage_fails_open() {
    let engine = Engine::new(ThrottleConfig::default(), Arc::new(UnreachableBackend));
    engine.register("user@example.com", "Str0ng!pass");

    let session = engine
        .manager
        .authenticate("user@example.com", "Str0ng!pass", "10.0.0.1")
        .await
        .unwrap();

    // Logout cannot write the blacklist entry but still succeeds.
    engine
        .manager
        .logout(&session.tokens.access.token, None, "10.0.0.1")
        .await
        .unwrap();

    // And verification stays available rather than failing closed.
    let claims = engine
        .manager
        .authorize_request(&session.tokens.access.token)
        .await
        .unwrap();
    assert_eq!(claims.email, "user@example.com");
}

#[tokio::test]
async fn logout_with_expired_access_token_succeeds() {
    let engine = Engine::with_defaults();

    let subject = TokenSubject {
        user_id: UserId::generate(),
        email: "user@example.com".to_string(),
        role: Role::User,
    };
    let stale = engine
        .codec
        .issue_at(&subject, TokenKind::Access, Utc::now() - chrono::Duration::hours(2))
        .unwrap();

    engine.manager.logout(&stale.token, None, "10.0.0.1").await.unwrap();
}

#[tokio::test]
async fn logout_all_revokes_every_refresh_token() {
    let engine = Engine::with_defaults();
    engine.register("user@example.com", "Str0ng!pass");

    let first = engine
        .manager
        .authenticate("user@example.com", "Str0ng!pass", "10.0.0.1")
        .await
        .unwrap();
    let second = engine
        .manager
        .authenticate("user@example.com", "Str0ng!pass", "10.0.0.2")
        .await
        .unwrap();

    let revoked = engine
        .manager
        .logout_all(&first.tokens.access.token, "10.0.0.1")
        .await
        .unwrap();
    assert_eq!(revoked, 2);

    let result = engine.manager.refresh(&second.tokens.refresh.token, "10.0.0.1").await;
    assert!(matches!(result, Err(SessionError::TokenReused)));
}

#[tokio::test]
async fn refresh_flood_of_garbage_tokens_is_rate_limited() {
    let throttle = ThrottleConfig {
        rate_limit: 2,
        ..ThrottleConfig::default()
    };
    let engine = Engine::new(throttle, Arc::new(MemoryBackend::new()));

    // Tokens that fail verification still consume the caller's window.
    for _ in 0..2 {
        let result = engine.manager.refresh("not.a.token", "10.0.0.1").await;
        assert!(matches!(result, Err(SessionError::TokenMalformed(_))));
    }

    let limited = engine.manager.refresh("not.a.token", "10.0.0.1").await;
    assert!(matches!(limited, Err(SessionError::RateLimited { .. })));
}

#[tokio::test]
async fn logout_is_rate_limited() {
    let throttle = ThrottleConfig {
        rate_limit: 2,
        ..ThrottleConfig::default()
    };
    let engine = Engine::new(throttle, Arc::new(MemoryBackend::new()));
    engine.register("user@example.com", "Str0ng!pass");

    let session = engine
        .manager
        .authenticate("user@example.com", "Str0ng!pass", "10.0.0.1")
        .await
        .unwrap();

    for _ in 0..2 {
        engine
            .manager
            .logout(&session.tokens.access.token, None, "10.0.0.1")
            .await
            .unwrap();
    }

    let limited = engine
        .manager
        .logout(&session.tokens.access.token, None, "10.0.0.1")
        .await;
    assert!(matches!(limited, Err(SessionError::RateLimited { .. })));
}
