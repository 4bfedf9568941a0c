//! Stateless JWT issuance and verification.
//!
//! Access and refresh tokens are signed with the same HS256 secret and
//! differ only in their `type` claim and lifetime. The `type` check at
//! verification time is therefore the only thing preventing a refresh token
//! from being accepted as an access token, so [`TokenCodec::verify`] always
//! enforces it.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;

use authgate_core::{Role, UserId};

use crate::error::{Result, TokenError};
use crate::TokenConfig;

/// The two token kinds issued by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived token authorizing individual requests.
    Access,
    /// Long-lived token exchanged for new token pairs.
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Access => write!(f, "access"),
            Self::Refresh => write!(f, "refresh"),
        }
    }
}

/// The identity a token is issued for.
#[derive(Debug, Clone)]
pub struct TokenSubject {
    /// The user's identifier; stringified into `sub`.
    pub user_id: UserId,
    /// The user's email address.
    pub email: String,
    /// The user's role.
    pub role: Role,
}

/// Verified claims extracted from a token.
///
/// Field names are the wire contract: `sub`, `email`, `role`, `iat`, `exp`,
/// `type`, `aud`, `iss`, `jti`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id, stringified.
    pub sub: String,
    /// The user's email address.
    pub email: String,
    /// The user's role.
    pub role: Role,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
    /// Token kind discriminator.
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// Audience.
    pub aud: String,
    /// Issuer.
    pub iss: String,
    /// Unique token id. Timestamps are second-resolution, so without this
    /// two tokens issued to one subject in the same second would be
    /// byte-identical; the ledger keys refresh records by token string and
    /// needs every issued token to be distinct.
    pub jti: String,
}

impl Claims {
    /// The expiry as a UTC timestamp.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }

    /// Parse the `sub` claim back into a [`UserId`].
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Malformed` if `sub` is not a UUID.
    pub fn user_id(&self) -> Result<UserId> {
        self.sub
            .parse()
            .map_err(|_| TokenError::Malformed("sub is not a valid user id".to_string()))
    }
}

/// Raw claims as decoded from the wire, before structural checks.
#[derive(Debug, Deserialize)]
struct RawClaims {
    sub: Option<String>,
    email: String,
    role: Role,
    iat: i64,
    exp: i64,
    #[serde(rename = "type")]
    kind: TokenKind,
    aud: String,
    iss: String,
    jti: String,
}

/// A freshly issued token with its expiry.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// The signed three-part token string.
    pub token: String,
    /// When the token expires.
    pub expires_at: DateTime<Utc>,
}

/// Stateless JWT codec for access and refresh tokens.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    config: TokenConfig,
}

impl TokenCodec {
    /// Create a codec from the given configuration.
    #[must_use]
    pub fn new(config: TokenConfig) -> Self {
        let encoding = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            encoding,
            decoding,
            config,
        }
    }

    /// The codec configuration.
    #[must_use]
    pub const fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Issue an access token for the given subject.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Malformed` if signing fails.
    pub fn issue_access(&self, subject: &TokenSubject) -> Result<IssuedToken> {
        self.issue_at(subject, TokenKind::Access, Utc::now())
    }

    /// Issue a refresh token for the given subject.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Malformed` if signing fails.
    pub fn issue_refresh(&self, subject: &TokenSubject) -> Result<IssuedToken> {
        self.issue_at(subject, TokenKind::Refresh, Utc::now())
    }

    /// Issue a token of the given kind with `iat` anchored at `now`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Malformed` if signing fails.
    pub fn issue_at(
        &self,
        subject: &TokenSubject,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken> {
        let ttl = match kind {
            TokenKind::Access => self.config.access_ttl_seconds,
            TokenKind::Refresh => self.config.refresh_ttl_seconds,
        };
        let ttl = i64::try_from(ttl).unwrap_or(i64::MAX);
        let expires_at = now + chrono::Duration::seconds(ttl);

        let claims = Claims {
            sub: subject.user_id.to_string(),
            email: subject.email.clone(),
            role: subject.role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            kind,
            aud: self.config.audience.clone(),
            iss: self.config.issuer.clone(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Malformed(e.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify a token and require it to be of the given kind.
    ///
    /// # Errors
    ///
    /// - `TokenError::Expired` when `exp` has passed
    /// - `TokenError::Malformed` when signature, structure, audience, or
    ///   issuer checks fail
    /// - `TokenError::MissingSubject` when `sub` is absent or empty
    /// - `TokenError::TypeMismatch` when `type` differs from `expected`
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);

        let data =
            decode::<RawClaims>(token, &self.decoding, &validation).map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed(e.to_string()),
            })?;

        let raw = data.claims;

        let sub = match raw.sub {
            Some(s) if !s.is_empty() => s,
            _ => return Err(TokenError::MissingSubject),
        };

        if raw.kind != expected {
            return Err(TokenError::TypeMismatch {
                expected,
                actual: raw.kind,
            });
        }

        Ok(Claims {
            sub,
            email: raw.email,
            role: raw.role,
            iat: raw.iat,
            exp: raw.exp,
            kind: raw.kind,
            aud: raw.aud,
            iss: raw.iss,
            jti: raw.jti,
        })
    }
}
