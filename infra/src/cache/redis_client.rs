//! Redis client used by the revocation registry
//!
//! Connection setup retries with exponential backoff. Once connected, every
//! command is a single round-trip bounded by `response_timeout_ms`; callers
//! surface failures instead of retrying, so an unreachable registry turns
//! into an immediate error rather than a stalled request.

use std::future::Future;
use std::time::Duration;

use redis::{aio::MultiplexedConnection, AsyncCommands, Client, RedisError, RedisResult, Script};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use cbt_shared::config::CacheConfig;

use crate::InfrastructureError;

/// Cap for the backoff between connection attempts
const MAX_CONNECT_DELAY_MS: u64 = 5000;

/// SADD a member and extend the set's TTL, never shorten it
const ADD_MEMBER_SCRIPT: &str = r"
redis.call('SADD', KEYS[1], ARGV[1])
local ttl = redis.call('PTTL', KEYS[1])
if ttl < tonumber(ARGV[2]) then
    redis.call('PEXPIRE', KEYS[1], ARGV[2])
end
return 1
";

/// DEL every member (prefixed with ARGV[1]) and the set; returns keys removed
const DELETE_MEMBERS_SCRIPT: &str = r"
local members = redis.call('SMEMBERS', KEYS[1])
local removed = 0
for _, member in ipairs(members) do
    removed = removed + redis.call('DEL', ARGV[1] .. member)
end
redis.call('DEL', KEYS[1])
return removed
";

/// Redis client over a multiplexed connection
///
/// Cloning is cheap; clones share the underlying connection.
#[derive(Clone)]
pub struct RedisClient {
    /// Redis multiplexed connection for async operations
    connection: MultiplexedConnection,
    /// Configuration used to create this client
    config: CacheConfig,
    response_timeout: Duration,
}

impl std::fmt::Debug for RedisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisClient")
            .field("url", &mask_url(&self.config.url))
            .field("key_prefix", &self.config.key_prefix)
            .field("response_timeout", &self.response_timeout)
            .finish()
    }
}

impl RedisClient {
    /// Connect to Redis
    ///
    /// # Arguments
    /// * `config` - Cache configuration settings
    ///
    /// # Returns
    /// * `Ok(RedisClient)` - Connected client
    /// * `Err(InfrastructureError::Config)` - The URL could not be parsed
    /// * `Err(InfrastructureError::Cache)` - No connection after all attempts
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        info!(url = %mask_url(&config.url), "Creating Redis client");

        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!("Failed to parse Redis URL: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let connection =
            Self::create_connection_with_retry(client, config.connect_retries, config.retry_delay_ms)
                .await?;

        info!("Redis client created successfully");

        Ok(Self {
            connection,
            response_timeout: Duration::from_millis(config.response_timeout_ms),
            config,
        })
    }

    /// Create multiplexed connection with retry logic
    async fn create_connection_with_retry(
        client: Client,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let max_retries = max_retries.max(1);
        let mut attempts = 0;
        let mut delay = retry_delay_ms;

        loop {
            attempts += 1;
            debug!("Attempting to connect to Redis (attempt {})", attempts);

            match client.get_multiplexed_async_connection().await {
                Ok(connection) => {
                    info!("Successfully connected to Redis");
                    return Ok(connection);
                }
                Err(e) if attempts < max_retries && is_retriable_error(&e) => {
                    warn!(
                        "Failed to connect to Redis (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(MAX_CONNECT_DELAY_MS);
                }
                Err(e) => {
                    error!(
                        "Failed to connect to Redis after {} attempts: {}",
                        attempts, e
                    );
                    return Err(InfrastructureError::Cache(e));
                }
            }
        }
    }

    /// Configuration this client was created with
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Apply the configured key prefix
    pub fn key(&self, key: &str) -> String {
        self.config.prefixed_key(key)
    }

    /// Store an integer under `key` with a millisecond TTL (PSETEX)
    pub async fn set_i64_with_ttl_ms(
        &self,
        key: &str,
        value: i64,
        ttl_ms: u64,
    ) -> Result<(), InfrastructureError> {
        debug!(key, ttl_ms, "PSETEX");
        let mut conn = self.connection.clone();
        let key = self.key(key);

        self.bounded("PSETEX", async move {
            redis::cmd("PSETEX")
                .arg(&key)
                .arg(ttl_ms)
                .arg(value)
                .query_async::<_, ()>(&mut conn)
                .await
        })
        .await
    }

    /// Read an integer value
    ///
    /// Returns `Ok(None)` for a missing or lapsed key.
    pub async fn get_i64(&self, key: &str) -> Result<Option<i64>, InfrastructureError> {
        let mut conn = self.connection.clone();
        let key = self.key(key);

        self.bounded("GET", async move { conn.get::<_, Option<i64>>(&key).await })
            .await
    }

    /// Delete a key
    ///
    /// # Returns
    /// * `Ok(true)` - The key existed and was removed by this call
    /// * `Ok(false)` - The key was absent
    pub async fn delete(&self, key: &str) -> Result<bool, InfrastructureError> {
        let mut conn = self.connection.clone();
        let key = self.key(key);

        let removed = self
            .bounded("DEL", async move { conn.del::<_, u32>(&key).await })
            .await?;
        Ok(removed > 0)
    }

    /// Add `member` to the set at `key`, keeping the set alive for at least `ttl_ms`
    pub async fn add_member_with_ttl_ms(
        &self,
        key: &str,
        member: &str,
        ttl_ms: u64,
    ) -> Result<(), InfrastructureError> {
        let mut conn = self.connection.clone();
        let key = self.key(key);
        let script = Script::new(ADD_MEMBER_SCRIPT);

        self.bounded("SADD", async move {
            script
                .key(&key)
                .arg(member)
                .arg(ttl_ms)
                .invoke_async::<_, i64>(&mut conn)
                .await
        })
        .await?;
        Ok(())
    }

    /// Delete every key named by the members of the set at `key`, then the set
    ///
    /// Members are stored without the key prefix. Runs as one script, so no
    /// member added concurrently is left behind half-deleted.
    ///
    /// # Returns
    /// * `Ok(n)` - Number of member keys that existed and were removed
    pub async fn delete_members(&self, key: &str) -> Result<usize, InfrastructureError> {
        let mut conn = self.connection.clone();
        let key = self.key(key);
        let prefix = self.key("");
        let script = Script::new(DELETE_MEMBERS_SCRIPT);

        let removed = self
            .bounded("DEL members", async move {
                script
                    .key(&key)
                    .arg(prefix)
                    .invoke_async::<_, i64>(&mut conn)
                    .await
            })
            .await?;
        Ok(usize::try_from(removed).unwrap_or(0))
    }

    /// Ping the server
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        debug!("Performing Redis health check");
        let mut conn = self.connection.clone();

        let response = self
            .bounded("PING", async move {
                redis::cmd("PING").query_async::<_, String>(&mut conn).await
            })
            .await?;

        if response == "PONG" {
            Ok(true)
        } else {
            warn!("Redis health check returned unexpected response: {}", response);
            Ok(false)
        }
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T, InfrastructureError>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match tokio::time::timeout(self.response_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!(operation, error = %e, "Redis command failed");
                Err(InfrastructureError::Cache(e))
            }
            Err(_) => {
                let timeout_ms = self.response_timeout.as_millis() as u64;
                warn!(operation, timeout_ms, "Redis command timed out");
                Err(InfrastructureError::Timeout {
                    operation,
                    timeout_ms,
                })
            }
        }
    }
}

/// Whether a connection error is worth another attempt
pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::IoError
            | redis::ErrorKind::ClientError
            | redis::ErrorKind::BusyLoadingError
            | redis::ErrorKind::TryAgain
    )
}

/// Mask credentials in a Redis URL for logging
pub(crate) fn mask_url(url: &str) -> String {
    if let (Some(at_pos), Some(proto_end)) = (url.rfind('@'), url.find("://")) {
        return format!("{}****{}", &url[..proto_end + 3], &url[at_pos..]);
    }
    url.to_string()
}
