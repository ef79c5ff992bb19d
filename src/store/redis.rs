//! Redis-backed [`RemoteStore`].
//!
//! Uses a multiplexed async connection (cheap to clone, safe to share across
//! tasks). Compare-and-delete runs as a server-side Lua script so release of
//! a lock is atomic: GET + compare + DEL in one step, never a blind delete.

use std::time::Duration;

use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, Script};

use super::error::{StoreError, StoreResult};
use super::RemoteStore;

/// Atomic "delete key only if its value equals the argument".
const COMPARE_AND_DELETE: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
else
    return 0
end
"#;

/// How many keys a single SCAN iteration asks for.
const SCAN_COUNT: usize = 100;

#[derive(Clone)]
/// Production store client over Redis.
pub struct RedisStore {
    conn: MultiplexedConnection,
    url: String,
}

impl RedisStore {
    /// Connects to `url` and verifies the connection with a PING.
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let client = Client::open(url).map_err(|e| StoreError::Connection {
            message: e.to_string(),
        })?;

        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StoreError::Connection {
                message: e.to_string(),
            })?;

        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(StoreError::from)?;

        Ok(Self {
            conn,
            url: url.to_string(),
        })
    }

    /// Returns the configured URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn conn(&self) -> MultiplexedConnection {
        self.conn.clone()
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore").field("url", &self.url).finish()
    }
}

impl RemoteStore for RedisStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let mut conn = self.conn();
        let value: Option<Vec<u8>> = conn.get(key).await.map_err(StoreError::from)?;
        Ok(value)
    }

    async fn set_with_ttl(&self, key: &str, value: &[u8], ttl: Duration) -> StoreResult<()> {
        let mut conn = self.conn();
        let secs = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, secs)
            .await
            .map_err(StoreError::from)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<u64> {
        let mut conn = self.conn();
        let removed: i64 = conn.del(key).await.map_err(StoreError::from)?;
        Ok(removed.max(0) as u64)
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        let mut conn = self.conn();
        let exists: bool = conn.exists(key).await.map_err(StoreError::from)?;
        Ok(exists)
    }

    async fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<String>> {
        // Cursor-based SCAN, never KEYS: bounded per-iteration work on a
        // shared server.
        let mut conn = self.conn();
        let pattern = format!("{prefix}*");
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;

        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut conn)
                .await
                .map_err(StoreError::from)?;

            keys.extend(batch);
            cursor = next;
            if cursor == 0 {
                break;
            }
        }

        Ok(keys)
    }

    async fn set_if_absent(&self, key: &str, value: &[u8], ttl: Duration) -> StoreResult<bool> {
        let mut conn = self.conn();
        let secs = ttl.as_secs().max(1);
        // SET NX EX returns OK on acquisition, nil otherwise.
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(secs)
            .query_async(&mut conn)
            .await
            .map_err(StoreError::from)?;
        Ok(reply.is_some())
    }

    async fn delete_if_equals(&self, key: &str, expected: &[u8]) -> StoreResult<bool> {
        let mut conn = self.conn();
        let deleted: i64 = Script::new(COMPARE_AND_DELETE)
            .key(key)
            .arg(expected)
            .invoke_async(&mut conn)
            .await
            .map_err(StoreError::from)?;
        Ok(deleted > 0)
    }

    async fn delete_many(&self, keys: &[String]) -> StoreResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn();
        let mut pipe = redis::pipe();
        for key in keys {
            pipe.del(key);
        }

        let counts: Vec<i64> = pipe.query_async(&mut conn).await.map_err(StoreError::from)?;
        Ok(counts.into_iter().filter(|n| *n > 0).count() as u64)
    }

    async fn flush_all(&self) -> StoreResult<()> {
        let mut conn = self.conn();
        let _: () = redis::cmd("FLUSHDB")
            .query_async(&mut conn)
            .await
            .map_err(StoreError::from)?;
        Ok(())
    }
}
