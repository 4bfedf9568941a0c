//! The session lifecycle orchestrator.
//!
//! Login order matters and is fixed: rate limit, lockout check, credential
//! lookup, password verification. The two throttle gates run before any
//! lookup or bcrypt work so a locked or rate-limited caller costs nothing,
//! and an unknown email still records a failure so response behavior does
//! not reveal which emails exist.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use authgate_blacklist::Blacklist;
use authgate_core::{Role, UserId};
use authgate_ledger::{LedgerError, RefreshRecord, RefreshTokenLedger};
use authgate_throttle::AttemptThrottle;
use authgate_token::{Claims, IssuedToken, PasswordVerifier, TokenCodec, TokenKind, TokenSubject};

use crate::error::{Result, SessionError};
use crate::store::CredentialStore;

/// An access/refresh token pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    /// Short-lived access token.
    pub access: IssuedToken,
    /// Long-lived refresh token, recorded in the ledger.
    pub refresh: IssuedToken,
}

/// The result of a successful login.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    /// The authenticated user.
    pub user_id: UserId,
    /// The user's email.
    pub email: String,
    /// The user's role.
    pub role: Role,
    /// The issued token pair.
    pub tokens: TokenPair,
}

/// Orchestrates login, request authorization, refresh rotation, and logout.
///
/// Holds no mutable state of its own; all state lives in the collaborators,
/// so the manager is cheap to share across request handlers.
pub struct SessionManager {
    codec: Arc<TokenCodec>,
    verifier: Arc<dyn PasswordVerifier>,
    credentials: Arc<dyn CredentialStore>,
    throttle: Arc<AttemptThrottle>,
    blacklist: Arc<Blacklist>,
    ledger: Arc<dyn RefreshTokenLedger>,
}

impl SessionManager {
    /// Wire up a manager from its collaborators.
    #[must_use]
    pub fn new(
        codec: Arc<TokenCodec>,
        verifier: Arc<dyn PasswordVerifier>,
        credentials: Arc<dyn CredentialStore>,
        throttle: Arc<AttemptThrottle>,
        blacklist: Arc<Blacklist>,
        ledger: Arc<dyn RefreshTokenLedger>,
    ) -> Self {
        Self {
            codec,
            verifier,
            credentials,
            throttle,
            blacklist,
            ledger,
        }
    }

    /// Log in with an email and password.
    ///
    /// `client_ip` scopes the lockout counter so an attacker hammering one
    /// account from one address does not lock out the account's real owner
    /// elsewhere.
    ///
    /// # Errors
    ///
    /// - `RateLimited` before anything else when the caller is over the
    ///   request window
    /// - `AccountLocked` when the `email:ip` pair is locked out
    /// - `InvalidCredentials` for an unknown email or wrong password
    /// - `DependencyUnavailable` when the credential store is down
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
        client_ip: &str,
    ) -> Result<AuthenticatedSession> {
        self.throttle.check_request(email)?;

        let lock_key = format!("{email}:{client_ip}");
        self.throttle.check_locked(&lock_key)?;

        let Some(credential) = self.credentials.find_by_email(email).await? else {
            // Unknown emails burn a failure too, so timing aside, the
            // response is indistinguishable from a wrong password.
            self.throttle.record_failure(&lock_key);
            return Err(SessionError::InvalidCredentials);
        };

        let verified = {
            let verifier = Arc::clone(&self.verifier);
            let password = password.to_string();
            let hash = credential.password_hash.clone();
            // bcrypt takes tens of milliseconds on purpose; keep it off
            // the async workers.
            tokio::task::spawn_blocking(move || verifier.verify(&password, &hash))
                .await
                .map_err(|e| SessionError::Internal(e.to_string()))??
        };

        if !verified {
            self.throttle.record_failure(&lock_key);
            return Err(SessionError::InvalidCredentials);
        }

        self.throttle.clear_failures(&lock_key);

        let subject = TokenSubject {
            user_id: credential.user_id,
            email: credential.email.clone(),
            role: credential.role,
        };
        let tokens = self.issue_pair(&subject).await?;

        info!(user_id = %credential.user_id, "login succeeded");
        Ok(AuthenticatedSession {
            user_id: credential.user_id,
            email: credential.email,
            role: credential.role,
            tokens,
        })
    }

    /// Authorize a request bearing an access token.
    ///
    /// Returns the verified claims for the request handler to act on.
    ///
    /// # Errors
    ///
    /// Token verification errors, plus `TokenRevoked` when the token is on
    /// the blacklist. A blacklist outage fails open and does not error.
    pub async fn authorize_request(&self, access_token: &str) -> Result<Claims> {
        let claims = self.codec.verify(access_token, TokenKind::Access)?;

        if self.blacklist.is_revoked(access_token).await {
            return Err(SessionError::TokenRevoked);
        }

        Ok(claims)
    }

    /// Exchange a refresh token for a new token pair.
    ///
    /// The presented token is consumed; it can never be used again. A
    /// token that was already consumed is treated as stolen and every
    /// refresh token belonging to its owner is revoked.
    ///
    /// The rate gate runs before verification, keyed on `client_ip`: the
    /// token's subject is unknown until it verifies, and a flood of
    /// garbage tokens must still be throttled.
    ///
    /// # Errors
    ///
    /// - `RateLimited` when `client_ip` is over the request window
    /// - `TokenExpired`, `TokenMalformed`, `TokenTypeMismatch` from
    ///   verification
    /// - `TokenReused` on second use, `TokenRevoked` when the ledger has
    ///   no record
    pub async fn refresh(&self, refresh_token: &str, client_ip: &str) -> Result<TokenPair> {
        self.throttle.check_request(client_ip)?;

        let claims = self.codec.verify(refresh_token, TokenKind::Refresh)?;
        let user_id = claims.user_id()?;

        match self.ledger.validate_and_consume(refresh_token).await {
            Ok(_) => {}
            Err(LedgerError::Reused) => {
                let revoked = self.ledger.revoke_all(user_id).await.unwrap_or(0);
                warn!(
                    security = true,
                    user_id = %user_id,
                    revoked,
                    "refresh token reuse detected, revoked all sessions"
                );
                return Err(SessionError::TokenReused);
            }
            Err(err) => return Err(err.into()),
        }

        let subject = TokenSubject {
            user_id,
            email: claims.email,
            role: claims.role,
        };
        self.issue_pair(&subject).await
    }

    /// Log out: revoke the access token and, if given, the refresh token.
    ///
    /// An already-expired access token needs no blacklist entry; logout
    /// still succeeds and still revokes the refresh token.
    ///
    /// # Errors
    ///
    /// `RateLimited` when `client_ip` is over the request window;
    /// `TokenMalformed` and friends for a structurally bad access token;
    /// ledger failures for the refresh revocation.
    pub async fn logout(
        &self,
        access_token: &str,
        refresh_token: Option<&str>,
        client_ip: &str,
    ) -> Result<()> {
        self.throttle.check_request(client_ip)?;

        match self.codec.verify(access_token, TokenKind::Access) {
            Ok(claims) => {
                self.blacklist
                    .add_until(access_token, claims.expires_at())
                    .await;
            }
            // Expired means already unusable; nothing to revoke.
            Err(authgate_token::TokenError::Expired) => {}
            Err(err) => return Err(err.into()),
        }

        if let Some(token) = refresh_token {
            self.ledger.revoke(token).await?;
        }

        Ok(())
    }

    /// Log out everywhere: revoke the access token and every refresh token
    /// belonging to its subject.
    ///
    /// Returns the number of refresh tokens revoked.
    ///
    /// # Errors
    ///
    /// `RateLimited` when `client_ip` is over the request window; access
    /// token verification errors; ledger failures.
    pub async fn logout_all(&self, access_token: &str, client_ip: &str) -> Result<u64> {
        self.throttle.check_request(client_ip)?;

        let claims = self.codec.verify(access_token, TokenKind::Access)?;
        let user_id = claims.user_id()?;

        self.blacklist
            .add_until(access_token, claims.expires_at())
            .await;

        let revoked = self.ledger.revoke_all(user_id).await?;
        info!(user_id = %user_id, revoked, "logged out everywhere");
        Ok(revoked)
    }

    async fn issue_pair(&self, subject: &TokenSubject) -> Result<TokenPair> {
        let access = self.codec.issue_access(subject)?;
        let refresh = self.codec.issue_refresh(subject)?;

        self.ledger
            .persist(RefreshRecord::new(
                refresh.token.clone(),
                subject.user_id,
                Utc::now(),
                refresh.expires_at,
            ))
            .await?;

        Ok(TokenPair { access, refresh })
    }
}
