//! Signed, time-limited bearer tokens.
//!
//! Tokens are compact JWS strings signed with HMAC-SHA256 using the
//! process-wide [`AuthSecret`]. Expiry is checked against an injected
//! [`Clock`] rather than the system time so tests can move time forward.
//!
//! The header algorithm is inspected before signature verification: anything
//! other than `HS256` is rejected as an invalid signature, which closes the
//! algorithm-substitution hole where a forged header downgrades the check.

use std::fmt;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;
use zeroize::Zeroizing;

use super::Handle;

/// Default token lifetime: six hours.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 6 * 60 * 60;

const BEARER_PREFIX: &str = "Bearer ";
const EXPECTED_ALGORITHM: &str = "HS256";

/// Token failures surfaced by [`TokenService`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The token is not a well-formed compact JWS or its claims are invalid.
    #[error("token is malformed")]
    Malformed,
    /// The MAC does not verify or the header names another algorithm.
    #[error("token signature is invalid")]
    SignatureInvalid,
    /// The current time is past the token's expiry.
    #[error("token has expired")]
    Expired,
    /// The signing primitive failed.
    #[error("token signing failed: {message}")]
    SigningFailure {
        /// Primitive failure detail.
        message: String,
    },
}

/// HMAC key material shared read-only by the token service.
///
/// The bytes are zeroized on drop and never printed.
#[derive(Clone)]
pub struct AuthSecret(Zeroizing<Vec<u8>>);

impl AuthSecret {
    /// Wrap raw key bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }

    /// Number of key bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no key bytes are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Short SHA-256 fingerprint safe to log.
    ///
    /// # Examples
    /// ```
    /// use agora_backend::domain::token::AuthSecret;
    ///
    /// let secret = AuthSecret::new(vec![7; 32]);
    /// assert_eq!(secret.fingerprint().len(), 16);
    /// ```
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.as_bytes());
        let result = hasher.finalize();
        hex::encode(&result[..8])
    }
}

impl fmt::Debug for AuthSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AuthSecret").field(&"<redacted>").finish()
    }
}

/// Claims carried by every bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Handle the token was issued to.
    pub sub: String,
    /// Always `true` for issued tokens.
    pub authorized: bool,
    /// Issue time, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Encoded compact JWS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BearerToken(String);

impl BearerToken {
    /// Compact serialisation.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for BearerToken {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strip the `Bearer ` prefix from an `Authorization` header value.
///
/// Absent or malformed headers yield the empty string, which fails
/// validation as [`TokenError::Malformed`].
///
/// # Examples
/// ```
/// use agora_backend::domain::token::bearer_token;
///
/// assert_eq!(bearer_token(Some("Bearer abc")), "abc");
/// assert_eq!(bearer_token(Some("Basic abc")), "");
/// assert_eq!(bearer_token(None), "");
/// ```
pub fn bearer_token(header: Option<&str>) -> &str {
    header
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .unwrap_or_default()
}

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// Issues and validates bearer tokens.
#[derive(Clone)]
pub struct TokenService {
    secret: AuthSecret,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl TokenService {
    /// Build a token service around an immutable secret.
    ///
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use chrono::Duration;
    /// # use mockable::DefaultClock;
    /// use agora_backend::domain::Handle;
    /// use agora_backend::domain::token::{AuthSecret, TokenService};
    ///
    /// let tokens = TokenService::new(
    ///     AuthSecret::new(vec![1; 32]),
    ///     Arc::new(DefaultClock),
    ///     Duration::hours(6),
    /// );
    /// let _ = tokens.issue(&Handle::new("ada").expect("valid handle"));
    /// ```
    pub fn new(secret: AuthSecret, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self { secret, clock, ttl }
    }

    /// Issue a token for `subject` expiring after the configured lifetime.
    pub fn issue(&self, subject: &Handle) -> Result<BearerToken, TokenError> {
        let now = self.clock.utc();
        let claims = Claims {
            sub: subject.to_string(),
            authorized: true,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map(BearerToken)
        .map_err(|err| TokenError::SigningFailure {
            message: err.to_string(),
        })
    }

    /// Check shape, algorithm, signature, and expiry of `raw`.
    pub fn validate(&self, raw: &str) -> Result<(), TokenError> {
        self.verified_claims(raw).map(|_| ())
    }

    /// Validate `raw` and return its subject handle.
    pub fn resolve_subject(&self, raw: &str) -> Result<Handle, TokenError> {
        let claims = self.verified_claims(raw)?;
        if !claims.authorized {
            return Err(TokenError::Malformed);
        }
        Handle::new(&claims.sub).map_err(|_| TokenError::Malformed)
    }

    fn verified_claims(&self, raw: &str) -> Result<Claims, TokenError> {
        if header_algorithm(raw)? != EXPECTED_ALGORITHM {
            return Err(TokenError::SignatureInvalid);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        let data = decode::<Claims>(
            raw,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|err| {
            debug!(error = %err, "token rejected");
            match err.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::SignatureInvalid
                }
                _ => TokenError::Malformed,
            }
        })?;

        if self.clock.utc().timestamp() > data.claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(data.claims)
    }
}

fn header_algorithm(raw: &str) -> Result<String, TokenError> {
    let segments: Vec<&str> = raw.split('.').collect();
    let [header, _, _] = segments.as_slice() else {
        return Err(TokenError::Malformed);
    };
    let bytes = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|_| TokenError::Malformed)?;
    let parsed: RawHeader = serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)?;
    Ok(parsed.alg)
}
