//! Temporary access tokens
//!
//! Issued by the reset-password flow so a user can sign in once and choose a
//! new password. Tokens are HS256 JWTs signed with the configured secret.

use async_trait::async_trait;
use chrono::Utc;
use ident_config::TokenConfig;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::tsid::TsidGenerator;
use crate::usecase::UseCaseError;
use crate::user::User;

/// Claim `typ` of every token issued here.
pub const TEMPORARY_TOKEN_TYPE: &str = "TEMPORARY_TOKEN";

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Token signing secret is not configured")]
    MissingSecret,

    #[error("Token error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl From<TokenError> for UseCaseError {
    fn from(err: TokenError) -> Self {
        UseCaseError::commit(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporaryTokenClaims {
    /// user_id
    pub sub: String,
    pub did: String,
    pub iss: String,
    pub typ: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

#[async_trait]
pub trait TokenIssuer: Send + Sync {
    async fn issue_temporary_token(&self, user: &User, timeout_secs: u64) -> Result<String, TokenError>;
}

pub struct JwtTokenIssuer {
    issuer: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtTokenIssuer {
    pub fn new(config: &TokenConfig) -> Result<Self, TokenError> {
        if config.signing_secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }
        Ok(Self {
            issuer: config.issuer.clone(),
            encoding_key: EncodingKey::from_secret(config.signing_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.signing_secret.as_bytes()),
        })
    }

    /// Check signature, issuer and expiry.
    pub fn decode(&self, token: &str) -> Result<TemporaryTokenClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        Ok(decode::<TemporaryTokenClaims>(token, &self.decoding_key, &validation)?.claims)
    }
}

#[async_trait]
impl TokenIssuer for JwtTokenIssuer {
    async fn issue_temporary_token(&self, user: &User, timeout_secs: u64) -> Result<String, TokenError> {
        let iat = Utc::now().timestamp();
        let timeout = i64::try_from(timeout_secs).unwrap_or(i64::MAX);
        let claims = TemporaryTokenClaims {
            sub: user.user_id.clone(),
            did: user.domain_id.clone(),
            iss: self.issuer.clone(),
            typ: TEMPORARY_TOKEN_TYPE.to_string(),
            jti: TsidGenerator::generate(),
            iat,
            exp: iat.saturating_add(timeout),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }
}
