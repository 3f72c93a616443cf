//! Verification Codes
//!
//! Short numeric codes sent by email and checked once. Issuing a code for a
//! key replaces the previous one; a code is consumed by its first successful
//! check and is rejected after it expires.

use async_trait::async_trait;
use bson::doc;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use mongodb::{Collection, Database};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::shared::error::Result;

pub const VERIFY_CODES_COLLECTION: &str = "verify_codes";

/// What a code confirms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodePurpose {
    Mfa,
    Email,
}

impl CodePurpose {
    pub fn key(&self, domain_id: &str, user_id: &str) -> String {
        let purpose = match self {
            Self::Mfa => "mfa",
            Self::Email => "email",
        };
        format!("{}:{}:{}", purpose, domain_id, user_id)
    }
}

/// Random decimal code of `length` digits.
pub fn generate_code(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length.max(1))
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

#[async_trait]
pub trait VerifyCodeStore: Send + Sync {
    async fn issue(&self, key: &str, code: &str, ttl_secs: u64) -> Result<()>;

    /// True when `code` is the live code for `key`; the code is removed then.
    async fn consume(&self, key: &str, code: &str) -> Result<bool>;
}

fn expiry(ttl_secs: u64) -> DateTime<Utc> {
    let ttl = i64::try_from(ttl_secs).unwrap_or(i64::MAX);
    Duration::try_seconds(ttl)
        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[derive(Default)]
pub struct MemoryVerifyCodeStore {
    codes: DashMap<String, (String, DateTime<Utc>)>,
}

impl MemoryVerifyCodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live code for `key`, for tests that read what was sent.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.codes
            .get(key)
            .filter(|entry| entry.1 > Utc::now())
            .map(|entry| entry.0.clone())
    }
}

#[async_trait]
impl VerifyCodeStore for MemoryVerifyCodeStore {
    async fn issue(&self, key: &str, code: &str, ttl_secs: u64) -> Result<()> {
        self.codes
            .insert(key.to_string(), (code.to_string(), expiry(ttl_secs)));
        Ok(())
    }

    async fn consume(&self, key: &str, code: &str) -> Result<bool> {
        let now = Utc::now();
        Ok(self
            .codes
            .remove_if(key, |_, (stored, expires_at)| stored == code && *expires_at > now)
            .is_some())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyCodeDocument {
    #[serde(rename = "_id")]
    key: String,
    code: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    expires_at: DateTime<Utc>,
}

pub struct MongoVerifyCodeStore {
    collection: Collection<VerifyCodeDocument>,
}

impl MongoVerifyCodeStore {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(VERIFY_CODES_COLLECTION),
        }
    }
}

#[async_trait]
impl VerifyCodeStore for MongoVerifyCodeStore {
    async fn issue(&self, key: &str, code: &str, ttl_secs: u64) -> Result<()> {
        let document = VerifyCodeDocument {
            key: key.to_string(),
            code: code.to_string(),
            expires_at: expiry(ttl_secs),
        };
        self.collection
            .replace_one(doc! { "_id": key }, &document)
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn consume(&self, key: &str, code: &str) -> Result<bool> {
        let now = bson::DateTime::from_chrono(Utc::now());
        let removed = self
            .collection
            .find_one_and_delete(doc! {
                "_id": key,
                "code": code,
                "expiresAt": { "$gt": now },
            })
            .await?;
        Ok(removed.is_some())
    }
}
