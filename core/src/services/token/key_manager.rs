//! Signing key material for JWT operations

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};
use std::fs;
use std::path::Path;

use super::config::TokenServiceConfig;
use crate::errors::TokenError;

/// Where the key material came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    /// Shared HMAC secret
    Secret,
    /// PEM pair read from disk
    Files {
        private_key_path: String,
        public_key_path: String,
    },
    /// PEM pair supplied in memory
    Memory,
}

/// Immutable signing and verification keys
///
/// Built once at startup and handed to the codec. Key bytes are never
/// printed by `Debug`.
#[derive(Clone)]
pub struct SigningKeys {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    source: KeySource,
}

impl std::fmt::Debug for SigningKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeys")
            .field("algorithm", &self.algorithm)
            .field("source", &self.source)
            .finish()
    }
}

fn key_load(message: impl Into<String>) -> TokenError {
    TokenError::KeyLoad {
        message: message.into(),
    }
}

fn is_hmac(algorithm: Algorithm) -> bool {
    matches!(
        algorithm,
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
    )
}

fn is_rsa(algorithm: Algorithm) -> bool {
    matches!(
        algorithm,
        Algorithm::RS256 | Algorithm::RS384 | Algorithm::RS512
    )
}

impl SigningKeys {
    /// Symmetric keys from a shared secret
    pub fn hmac(algorithm: Algorithm, secret: &[u8]) -> Result<Self, TokenError> {
        if !is_hmac(algorithm) {
            return Err(key_load(format!("{:?} is not an HMAC algorithm", algorithm)));
        }
        if secret.is_empty() {
            return Err(key_load("JWT secret must not be empty"));
        }

        Ok(Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            source: KeySource::Secret,
        })
    }

    /// RSA keys from PEM-encoded bytes
    pub fn rsa_pem(
        algorithm: Algorithm,
        private_key_pem: &[u8],
        public_key_pem: &[u8],
    ) -> Result<Self, TokenError> {
        if !is_rsa(algorithm) {
            return Err(key_load(format!("{:?} is not an RSA algorithm", algorithm)));
        }

        let encoding_key = EncodingKey::from_rsa_pem(private_key_pem)
            .map_err(|e| key_load(format!("Invalid private key format: {}", e)))?;
        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem)
            .map_err(|e| key_load(format!("Invalid public key format: {}", e)))?;

        Ok(Self {
            algorithm,
            encoding_key,
            decoding_key,
            source: KeySource::Memory,
        })
    }

    /// RSA keys from PEM files
    pub fn rsa_files<P: AsRef<Path>>(
        algorithm: Algorithm,
        private_key_path: P,
        public_key_path: P,
    ) -> Result<Self, TokenError> {
        let private_key_path = private_key_path.as_ref();
        let public_key_path = public_key_path.as_ref();

        let private_key_pem = fs::read(private_key_path)
            .map_err(|e| key_load(format!("Failed to read private key: {}", e)))?;
        let public_key_pem = fs::read(public_key_path)
            .map_err(|e| key_load(format!("Failed to read public key: {}", e)))?;

        let mut keys = Self::rsa_pem(algorithm, &private_key_pem, &public_key_pem)?;
        keys.source = KeySource::Files {
            private_key_path: private_key_path.display().to_string(),
            public_key_path: public_key_path.display().to_string(),
        };
        Ok(keys)
    }

    /// Load the keys the configuration asks for
    pub fn from_config(config: &TokenServiceConfig) -> Result<Self, TokenError> {
        if is_rsa(config.algorithm) {
            match (&config.private_key_path, &config.public_key_path) {
                (Some(private_key), Some(public_key)) => {
                    Self::rsa_files(config.algorithm, private_key, public_key)
                }
                _ => Err(key_load(format!(
                    "{:?} requires both private_key_path and public_key_path",
                    config.algorithm
                ))),
            }
        } else {
            Self::hmac(config.algorithm, config.jwt_secret.as_bytes())
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn source(&self) -> &KeySource {
        &self.source
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}
