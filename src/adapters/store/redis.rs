//! Redis-backed conversation store for production deployments.
//!
//! Layout per session identity:
//! - `debate:session:{token}:gen` - generation counter (INCR on reset)
//! - `debate:session:{token}:seq` - sequence counter (INCR on append)
//! - `debate:session:{token}:log` - list of JSON-encoded messages
//!
//! Appends run as a Lua script so the generation check, the sequence
//! assignment, and the list push are one atomic step; Redis executes
//! scripts serially, which provides the required per-session append
//! ordering across servers. All keys carry a TTL so abandoned sessions
//! age out instead of accumulating.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Script};

use crate::domain::conversation::{Generation, Message, Role};
use crate::domain::foundation::{DebateError, SessionToken};
use crate::ports::{ConversationStore, StoreError};

/// Fenced append: check the generation, assign the next sequence, patch
/// it into the message JSON, push. Returns {1, seq} on commit and
/// {0, current_generation} when fenced.
const APPEND_SCRIPT: &str = r#"
local current = tonumber(redis.call('GET', KEYS[1]) or '0')
if current ~= tonumber(ARGV[1]) then
    return {0, current}
end
local seq = redis.call('INCR', KEYS[2])
local msg = cjson.decode(ARGV[2])
msg['sequence'] = seq
redis.call('RPUSH', KEYS[3], cjson.encode(msg))
redis.call('EXPIRE', KEYS[1], ARGV[3])
redis.call('EXPIRE', KEYS[2], ARGV[3])
redis.call('EXPIRE', KEYS[3], ARGV[3])
return {1, seq}
"#;

/// Reset: bump the generation, drop the log and sequence counter. The
/// generation key survives (with a TTL) so late appends from turns that
/// started before the reset still hit the fence.
const RESET_SCRIPT: &str = r#"
local gen = redis.call('INCR', KEYS[1])
redis.call('DEL', KEYS[2], KEYS[3])
redis.call('EXPIRE', KEYS[1], ARGV[1])
return gen
"#;

/// Redis-backed conversation store.
#[derive(Clone)]
pub struct RedisConversationStore {
    conn: MultiplexedConnection,
    ttl_secs: i64,
}

impl RedisConversationStore {
    /// Creates a store over an established connection.
    pub fn new(conn: MultiplexedConnection, ttl_secs: u64) -> Self {
        Self {
            conn,
            ttl_secs: ttl_secs as i64,
        }
    }

    /// Connects to Redis and creates a store.
    ///
    /// # Errors
    ///
    /// - `Unavailable` if the URL is invalid or the server is unreachable
    pub async fn connect(url: &str, ttl_secs: u64) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)
            .map_err(|e| StoreError::Unavailable(format!("invalid redis url: {}", e)))?;
        let conn = client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(Self::new(conn, ttl_secs))
    }

    fn gen_key(session: &SessionToken) -> String {
        format!("debate:session:{}:gen", session)
    }

    fn seq_key(session: &SessionToken) -> String {
        format!("debate:session:{}:seq", session)
    }

    fn log_key(session: &SessionToken) -> String {
        format!("debate:session:{}:log", session)
    }
}

#[async_trait]
impl ConversationStore for RedisConversationStore {
    async fn history(&self, session: &SessionToken) -> Result<Vec<Message>, StoreError> {
        let mut conn = self.conn.clone();

        let raw: Vec<String> = conn
            .lrange(Self::log_key(session), 0, -1)
            .await
            .map_err(|e: redis::RedisError| StoreError::Unavailable(e.to_string()))?;

        raw.iter()
            .map(|entry| {
                serde_json::from_str(entry).map_err(|e| {
                    StoreError::Unavailable(format!("corrupt message in session log: {}", e))
                })
            })
            .collect()
    }

    async fn generation(&self, session: &SessionToken) -> Result<Generation, StoreError> {
        let mut conn = self.conn.clone();

        let value: Option<u64> = conn
            .get(Self::gen_key(session))
            .await
            .map_err(|e: redis::RedisError| StoreError::Unavailable(e.to_string()))?;

        Ok(value.map(Generation::from_value).unwrap_or(Generation::INITIAL))
    }

    async fn append(
        &self,
        session: &SessionToken,
        role: Role,
        content: &str,
        observed: Generation,
    ) -> Result<Message, StoreError> {
        // Validate and timestamp before touching the wire; the script
        // patches in the real sequence number.
        let draft = Message::new(role, content, 0).map_err(|e| match e {
            DebateError::Validation { reason, .. } => StoreError::InvalidContent(reason),
            other => StoreError::InvalidContent(other.to_string()),
        })?;
        let mut encoded = serde_json::to_value(&draft)
            .map_err(|e| StoreError::Unavailable(format!("message encoding failed: {}", e)))?;

        let mut conn = self.conn.clone();
        let (committed, value): (i64, i64) = Script::new(APPEND_SCRIPT)
            .key(Self::gen_key(session))
            .key(Self::seq_key(session))
            .key(Self::log_key(session))
            .arg(observed.value())
            .arg(encoded.to_string())
            .arg(self.ttl_secs)
            .invoke_async(&mut conn)
            .await
            .map_err(|e: redis::RedisError| StoreError::Unavailable(e.to_string()))?;

        if committed == 0 {
            return Err(StoreError::StaleGeneration {
                observed: observed.value(),
                current: value as u64,
            });
        }

        encoded["sequence"] = serde_json::Value::from(value);
        serde_json::from_value(encoded)
            .map_err(|e| StoreError::Unavailable(format!("message decoding failed: {}", e)))
    }

    async fn reset(&self, session: &SessionToken) -> Result<Generation, StoreError> {
        let mut conn = self.conn.clone();

        let generation: u64 = Script::new(RESET_SCRIPT)
            .key(Self::gen_key(session))
            .key(Self::seq_key(session))
            .key(Self::log_key(session))
            .arg(self.ttl_secs)
            .invoke_async(&mut conn)
            .await
            .map_err(|e: redis::RedisError| StoreError::Unavailable(e.to_string()))?;

        Ok(Generation::from_value(generation))
    }
}
