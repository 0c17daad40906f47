use redis::aio::ConnectionManager;
use redis::RedisResult;

/// Shared Redis handle. Cloning is cheap and every clone multiplexes over the
/// same connection, reconnecting on failure.
pub type RedisPool = ConnectionManager;

/// Open the Redis handle and make sure the server answers.
pub async fn create_pool(redis_url: &str) -> RedisResult<RedisPool> {
    let client = redis::Client::open(redis_url)?;
    let mut conn = ConnectionManager::new(client).await?;
    let _: String = redis::cmd("PING").query_async(&mut conn).await?;
    Ok(conn)
}
