//! Redis cache backend over a deadpool connection pool.
//!
//! Multi-step writes (increment + expire, hash write + expire, list append +
//! expire) run as `MULTI`/`EXEC` pipelines so no key is ever observable
//! without its TTL.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{Connection, Pool};
use redis::AsyncCommands;

use crate::error::CacheResult;
use crate::store::CacheStore;

/// Whole seconds for a TTL; Redis rejects a zero expiry.
fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

/// Cache backend shared across processes through Redis.
#[derive(Clone)]
pub struct RedisCache {
    pool: Pool,
}

impl RedisCache {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Check if Redis is reachable (for health checks).
    pub async fn is_available(&self) -> bool {
        self.pool.get().await.is_ok()
    }

    async fn conn(&self) -> CacheResult<Connection> {
        Ok(self.pool.get().await?)
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.conn().await?;
        Ok(conn.get(key).await?)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.conn().await?;
        let _: () = conn.set_ex(key, value, ttl_secs(ttl)).await?;
        tracing::debug!(key = %key, ttl_secs = ttl_secs(ttl), "cache set");
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.conn().await?;
        let _: () = conn.del(key).await?;
        tracing::debug!(key = %key, "cache delete");
        Ok(())
    }

    async fn incr(&self, key: &str, ttl: Duration) -> CacheResult<i64> {
        let mut conn = self.conn().await?;
        let (count,): (i64,) = redis::pipe()
            .atomic()
            .incr(key, 1)
            .expire(key, ttl_secs(ttl) as i64)
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(count)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> CacheResult<bool> {
        let mut conn = self.conn().await?;
        Ok(conn.expire(key, ttl_secs(ttl) as i64).await?)
    }

    async fn ttl(&self, key: &str) -> CacheResult<Option<Duration>> {
        let mut conn = self.conn().await?;
        // -2: missing key, -1: no expiry
        let secs: i64 = conn.ttl(key).await?;
        Ok((secs >= 0).then(|| Duration::from_secs(secs as u64)))
    }

    async fn hset_fields(
        &self,
        key: &str,
        fields: &[(&str, String)],
        ttl: Duration,
    ) -> CacheResult<()> {
        if fields.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn().await?;
        let _: () = redis::pipe()
            .atomic()
            .hset_multiple(key, fields)
            .ignore()
            .expire(key, ttl_secs(ttl) as i64)
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn hget_all(&self, key: &str) -> CacheResult<HashMap<String, String>> {
        let mut conn = self.conn().await?;
        Ok(conn.hgetall(key).await?)
    }

    async fn list_append(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<u64> {
        let mut conn = self.conn().await?;
        let (len,): (u64,) = redis::pipe()
            .atomic()
            .rpush(key, value)
            .expire(key, ttl_secs(ttl) as i64)
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(len)
    }

    async fn list_range(&self, key: &str, start: isize, stop: isize) -> CacheResult<Vec<String>> {
        let mut conn = self.conn().await?;
        Ok(conn.lrange(key, start, stop).await?)
    }

    async fn list_trim(&self, key: &str, start: isize, stop: isize) -> CacheResult<()> {
        let mut conn = self.conn().await?;
        let _: () = conn.ltrim(key, start, stop).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_secs_never_zero() {
        assert_eq!(ttl_secs(Duration::from_millis(10)), 1);
        assert_eq!(ttl_secs(Duration::from_secs(1800)), 1800);
    }
}
