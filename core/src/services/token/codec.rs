//! JWT encoding and validation of session claims

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{crypto, decode, encode, Header, Validation};
use tracing::debug;
use uuid::Uuid;

use crate::domain::entities::principal::Principal;
use crate::domain::entities::token::{RefreshRecord, TokenClaims, TokenKind};
use crate::errors::TokenError;

use super::config::TokenServiceConfig;
use super::key_manager::SigningKeys;

/// Signs and verifies session tokens
///
/// Decoding checks, in order: signature and algorithm, expiry (with the
/// configured clock skew), issuer and audience. Failures map to
/// `InvalidSignature`, `Expired` and `Malformed` respectively. A
/// three-segment token whose header cannot be parsed is reported as
/// `InvalidSignature` unless its signature still verifies.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    keys: SigningKeys,
    validation: Validation,
    issuer: String,
    audience: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenCodec {
    /// Creates a codec from already loaded keys
    pub fn new(keys: SigningKeys, config: &TokenServiceConfig) -> Self {
        let mut validation = Validation::new(keys.algorithm());
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
        validation.leeway = config.clock_skew_seconds;
        validation.validate_exp = true;

        debug!(algorithm = ?keys.algorithm(), source = ?keys.source(), "Token codec ready");

        Self {
            keys,
            validation,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            access_ttl: config.access_ttl(),
            refresh_ttl: config.refresh_ttl(),
        }
    }

    /// Loads keys as configured and creates a codec
    pub fn from_config(config: &TokenServiceConfig) -> Result<Self, TokenError> {
        Ok(Self::new(SigningKeys::from_config(config)?, config))
    }

    /// Sign claims into a compact JWT
    pub fn encode(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        let header = Header::new(self.keys.algorithm());
        encode(&header, claims, self.keys.encoding_key()).map_err(|e| TokenError::EncodingError {
            message: e.to_string(),
        })
    }

    /// Verify a JWT and return its claims
    pub fn decode(&self, token: &str) -> Result<TokenClaims, TokenError> {
        decode::<TokenClaims>(token, self.keys.decoding_key(), &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(kind = ?e.kind(), "Token rejected");
                match e.kind() {
                    ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_)
                        if !self.signature_matches(token) =>
                    {
                        TokenError::InvalidSignature
                    }
                    _ => TokenError::from(e),
                }
            })
    }

    /// Checks the signature over `header.payload` without parsing either
    ///
    /// Tokens that do not have exactly three segments count as matching so
    /// they stay `Malformed`.
    fn signature_matches(&self, token: &str) -> bool {
        let Some((message, signature)) = token.rsplit_once('.') else {
            return true;
        };
        if message.matches('.').count() != 1 {
            return true;
        }

        crypto::verify(
            signature,
            message.as_bytes(),
            self.keys.decoding_key(),
            self.keys.algorithm(),
        )
        .unwrap_or(false)
    }

    /// Verify a JWT and require it to be of the given kind
    pub fn decode_kind(&self, token: &str, kind: TokenKind) -> Result<TokenClaims, TokenError> {
        let claims = self.decode(token)?;
        if claims.typ != kind {
            debug!(expected = ?kind, actual = ?claims.typ, "Token kind mismatch");
            return Err(TokenError::Malformed);
        }
        Ok(claims)
    }

    /// Access token claims for a principal, with a fresh `jti`
    pub fn access_claims(&self, principal: &Principal, issued_at: DateTime<Utc>) -> TokenClaims {
        TokenClaims::access(
            principal,
            Uuid::new_v4().to_string(),
            issued_at,
            issued_at + self.access_ttl,
        )
        .with_issuer(&self.issuer, &self.audience)
    }

    /// Refresh token claims for a stored record
    pub fn refresh_claims(&self, record: &RefreshRecord) -> TokenClaims {
        TokenClaims::refresh(record).with_issuer(&self.issuer, &self.audience)
    }

    /// New refresh record with a random id, valid for the refresh lifetime
    pub fn new_refresh_record(&self, subject: &str, issued_at: DateTime<Utc>) -> RefreshRecord {
        RefreshRecord::new(
            Uuid::new_v4().to_string(),
            subject,
            issued_at,
            issued_at + self.refresh_ttl,
        )
    }

    pub fn access_ttl_seconds(&self) -> i64 {
        self.access_ttl.num_seconds()
    }

    pub fn refresh_ttl_seconds(&self) -> i64 {
        self.refresh_ttl.num_seconds()
    }
}
