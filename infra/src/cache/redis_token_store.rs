//! Redis implementation of the TokenStore trait.
//!
//! Layout, all keys under the configured prefix:
//! - `refresh_record:{id}`: hash with `subject`, `issued_at`, `expires_at`
//!   (epoch millis), `revoked` ("0"/"1") and `replaced_by`; expires with the token
//! - `refresh_subject:{subject}`: set of record ids issued to a subject
//! - `refresh_expiry`: sorted set of record ids scored by expiry millis
//!
//! Every mutation is a Lua script and runs atomically on the server. The
//! scripts derive record and subject keys from ids, so all keys of one
//! prefix must live on the same node.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use redis::{AsyncCommands, Script};
use std::collections::HashMap;
use tracing::{debug, warn};

use wc_core::domain::RefreshRecord;
use wc_core::errors::StoreError;
use wc_core::repositories::TokenStore;

use super::redis_client::RedisClient;
use crate::InfrastructureError;

const RECORD_KEY: &str = "refresh_record:";
const SUBJECT_KEY: &str = "refresh_subject:";
const EXPIRY_INDEX_KEY: &str = "refresh_expiry";

const OK: i64 = 1;
const NOT_FOUND: i64 = -1;
const ALREADY_REVOKED: i64 = -2;
const DUPLICATE_ID: i64 = -3;

// Shared by RECORD and ROTATE: store the hash, index it, and keep the
// subject set alive at least as long as its newest record.
const INSERT_RECORD_LUA: &str = r#"
local function insert_record(record_key, subject_key, index_key, id, subject, issued, expires, revoked, replaced_by, now)
  redis.call('HSET', record_key, 'subject', subject, 'issued_at', issued,
    'expires_at', expires, 'revoked', revoked, 'replaced_by', replaced_by)
  redis.call('PEXPIREAT', record_key, expires)
  redis.call('SADD', subject_key, id)
  local remaining = tonumber(expires) - tonumber(now)
  if redis.call('PTTL', subject_key) < remaining then
    redis.call('PEXPIREAT', subject_key, expires)
  end
  redis.call('ZADD', index_key, expires, id)
end
"#;

// KEYS: record, subject set, expiry index
// ARGV: id, subject, issued, expires, revoked, replaced_by, now
const RECORD_BODY: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 1 then
  return -3
end
insert_record(KEYS[1], KEYS[2], KEYS[3], ARGV[1], ARGV[2], ARGV[3], ARGV[4], ARGV[5], ARGV[6], ARGV[7])
return 1
"#;

// KEYS: record
const REVOKE_SCRIPT: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 0 then
  return -1
end
redis.call('HSET', KEYS[1], 'revoked', '1')
return 1
"#;

// KEYS: old record, new record, subject set, expiry index
// ARGV: new id, subject, issued, expires, now
const ROTATE_BODY: &str = r#"
local old = redis.call('HMGET', KEYS[1], 'expires_at', 'revoked')
if not old[1] or tonumber(old[1]) <= tonumber(ARGV[5]) then
  return -1
end
if old[2] == '1' then
  return -2
end
if redis.call('EXISTS', KEYS[2]) == 1 then
  return -3
end
redis.call('HSET', KEYS[1], 'revoked', '1', 'replaced_by', ARGV[1])
insert_record(KEYS[2], KEYS[3], KEYS[4], ARGV[1], ARGV[2], ARGV[3], ARGV[4], '0', '', ARGV[5])
return 1
"#;

// KEYS: subject set
// ARGV: record key prefix, now
const REVOKE_SUBJECT_SCRIPT: &str = r#"
local count = 0
for _, id in ipairs(redis.call('SMEMBERS', KEYS[1])) do
  local record = redis.call('HMGET', ARGV[1] .. id, 'expires_at', 'revoked')
  if not record[1] then
    redis.call('SREM', KEYS[1], id)
  elseif record[2] == '0' and tonumber(record[1]) > tonumber(ARGV[2]) then
    redis.call('HSET', ARGV[1] .. id, 'revoked', '1')
    count = count + 1
  end
end
return count
"#;

// KEYS: expiry index
// ARGV: now, record key prefix, subject key prefix
const SWEEP_SCRIPT: &str = r#"
local ids = redis.call('ZRANGEBYSCORE', KEYS[1], '-inf', ARGV[1])
for _, id in ipairs(ids) do
  local record_key = ARGV[2] .. id
  local subject = redis.call('HGET', record_key, 'subject')
  if subject then
    redis.call('SREM', ARGV[3] .. subject, id)
    redis.call('DEL', record_key)
  end
end
redis.call('ZREMRANGEBYSCORE', KEYS[1], '-inf', ARGV[1])
return #ids
"#;

/// Redis-backed token store
///
/// Records expire on their own through key TTLs; `sweep_expired` prunes the
/// expiry index and subject sets and deletes records expired at the given
/// instant that Redis has not evicted yet.
pub struct RedisTokenStore {
    client: RedisClient,
    record_script: Script,
    revoke_script: Script,
    rotate_script: Script,
    revoke_subject_script: Script,
    sweep_script: Script,
}

impl RedisTokenStore {
    pub fn new(client: RedisClient) -> Self {
        Self {
            client,
            record_script: Script::new(&format!("{}{}", INSERT_RECORD_LUA, RECORD_BODY)),
            revoke_script: Script::new(REVOKE_SCRIPT),
            rotate_script: Script::new(&format!("{}{}", INSERT_RECORD_LUA, ROTATE_BODY)),
            revoke_subject_script: Script::new(REVOKE_SUBJECT_SCRIPT),
            sweep_script: Script::new(SWEEP_SCRIPT),
        }
    }

    fn record_key(&self, token_id: &str) -> String {
        self.client.make_key(&format!("{}{}", RECORD_KEY, token_id))
    }

    fn subject_key(&self, subject: &str) -> String {
        self.client.make_key(&format!("{}{}", SUBJECT_KEY, subject))
    }

    fn expiry_index_key(&self) -> String {
        self.client.make_key(EXPIRY_INDEX_KEY)
    }

    fn record_key_prefix(&self) -> String {
        self.client.make_key(RECORD_KEY)
    }

    fn subject_key_prefix(&self) -> String {
        self.client.make_key(SUBJECT_KEY)
    }
}

fn not_found(token_id: &str) -> StoreError {
    StoreError::NotFound {
        token_id: token_id.to_string(),
    }
}

fn unexpected_reply(reply: i64) -> StoreError {
    StoreError::unavailable(format!("unexpected script reply {}", reply))
}

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

/// Rebuild a record from its hash fields
///
/// An empty hash means the key does not exist.
pub(crate) fn record_from_hash(
    token_id: &str,
    fields: &HashMap<String, String>,
) -> Result<Option<RefreshRecord>, StoreError> {
    if fields.is_empty() {
        return Ok(None);
    }

    let field = |name: &str| {
        fields.get(name).ok_or_else(|| {
            StoreError::unavailable(format!("refresh record {} has no field {}", token_id, name))
        })
    };

    let subject = field("subject")?.clone();
    let issued_at = parse_millis(token_id, field("issued_at")?)?;
    let expires_at = parse_millis(token_id, field("expires_at")?)?;
    let revoked = field("revoked")? == "1";
    let replaced_by = fields
        .get("replaced_by")
        .filter(|value| !value.is_empty())
        .cloned();

    Ok(Some(RefreshRecord {
        token_id: token_id.to_string(),
        subject,
        issued_at,
        expires_at,
        revoked,
        replaced_by,
    }))
}

fn parse_millis(token_id: &str, value: &str) -> Result<DateTime<Utc>, StoreError> {
    value
        .parse::<i64>()
        .ok()
        .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
        .ok_or_else(|| {
            StoreError::unavailable(format!(
                "refresh record {} has invalid timestamp {}",
                token_id, value
            ))
        })
}

#[async_trait]
impl TokenStore for RedisTokenStore {
    async fn record(&self, record: RefreshRecord) -> Result<(), StoreError> {
        let mut conn = self.client.connection();

        let reply: i64 = self
            .record_script
            .key(self.record_key(&record.token_id))
            .key(self.subject_key(&record.subject))
            .key(self.expiry_index_key())
            .arg(&record.token_id)
            .arg(&record.subject)
            .arg(record.issued_at.timestamp_millis())
            .arg(record.expires_at.timestamp_millis())
            .arg(flag(record.revoked))
            .arg(record.replaced_by.as_deref().unwrap_or(""))
            .arg(Utc::now().timestamp_millis())
            .invoke_async(&mut conn)
            .await
            .map_err(InfrastructureError::Cache)?;

        match reply {
            OK => Ok(()),
            DUPLICATE_ID => Err(StoreError::DuplicateId {
                token_id: record.token_id,
            }),
            other => Err(unexpected_reply(other)),
        }
    }

    async fn lookup(&self, token_id: &str) -> Result<RefreshRecord, StoreError> {
        let mut conn = self.client.connection();

        let fields: HashMap<String, String> = conn
            .hgetall(self.record_key(token_id))
            .await
            .map_err(InfrastructureError::Cache)?;

        match record_from_hash(token_id, &fields)? {
            Some(record) if !record.is_expired_at(Utc::now()) => Ok(record),
            Some(_) => {
                debug!(token_id, "Refresh record expired");
                Err(not_found(token_id))
            }
            None => Err(not_found(token_id)),
        }
    }

    async fn revoke(&self, token_id: &str) -> Result<(), StoreError> {
        let mut conn = self.client.connection();

        let reply: i64 = self
            .revoke_script
            .key(self.record_key(token_id))
            .invoke_async(&mut conn)
            .await
            .map_err(InfrastructureError::Cache)?;

        match reply {
            OK => Ok(()),
            NOT_FOUND => Err(not_found(token_id)),
            other => Err(unexpected_reply(other)),
        }
    }

    async fn rotate(
        &self,
        old_token_id: &str,
        new_record: RefreshRecord,
    ) -> Result<(), StoreError> {
        let mut conn = self.client.connection();

        let reply: i64 = self
            .rotate_script
            .key(self.record_key(old_token_id))
            .key(self.record_key(&new_record.token_id))
            .key(self.subject_key(&new_record.subject))
            .key(self.expiry_index_key())
            .arg(&new_record.token_id)
            .arg(&new_record.subject)
            .arg(new_record.issued_at.timestamp_millis())
            .arg(new_record.expires_at.timestamp_millis())
            .arg(Utc::now().timestamp_millis())
            .invoke_async(&mut conn)
            .await
            .map_err(InfrastructureError::Cache)?;

        match reply {
            OK => Ok(()),
            NOT_FOUND => Err(not_found(old_token_id)),
            ALREADY_REVOKED => Err(StoreError::AlreadyRevoked {
                token_id: old_token_id.to_string(),
            }),
            DUPLICATE_ID => Err(StoreError::DuplicateId {
                token_id: new_record.token_id,
            }),
            other => Err(unexpected_reply(other)),
        }
    }

    async fn revoke_subject(&self, subject: &str) -> Result<usize, StoreError> {
        let mut conn = self.client.connection();

        let revoked: usize = self
            .revoke_subject_script
            .key(self.subject_key(subject))
            .arg(self.record_key_prefix())
            .arg(Utc::now().timestamp_millis())
            .invoke_async(&mut conn)
            .await
            .map_err(InfrastructureError::Cache)?;

        Ok(revoked)
    }

    async fn active_for_subject(&self, subject: &str) -> Result<Vec<RefreshRecord>, StoreError> {
        let mut conn = self.client.connection();

        let ids: Vec<String> = conn
            .smembers(self.subject_key(subject))
            .await
            .map_err(InfrastructureError::Cache)?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut pipe = redis::pipe();
        for id in &ids {
            pipe.hgetall(self.record_key(id));
        }
        let hashes: Vec<HashMap<String, String>> = pipe
            .query_async(&mut conn)
            .await
            .map_err(InfrastructureError::Cache)?;

        let now = Utc::now();
        let mut active = Vec::new();
        for (id, fields) in ids.iter().zip(hashes.iter()) {
            match record_from_hash(id, fields) {
                Ok(Some(record)) if record.subject == subject && record.is_active_at(now) => {
                    active.push(record)
                }
                Ok(_) => {}
                Err(e) => warn!(token_id = %id, error = %e, "Skipping unreadable refresh record"),
            }
        }
        Ok(active)
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut conn = self.client.connection();

        let removed: usize = self
            .sweep_script
            .key(self.expiry_index_key())
            .arg(now.timestamp_millis())
            .arg(self.record_key_prefix())
            .arg(self.subject_key_prefix())
            .invoke_async(&mut conn)
            .await
            .map_err(InfrastructureError::Cache)?;

        Ok(removed)
    }
}
