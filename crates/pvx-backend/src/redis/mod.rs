//! [`LeaseStore`] over Redis `SET NX` / `DEL`.
use async_trait::async_trait;
use ::redis::{Client, ErrorKind, RedisError, aio::MultiplexedConnection};
use tracing::{debug, info};

use pvx_core::{LeaseStore, StoreError};

use crate::BackendError;

/// Value written under a lease key when no holder is configured.
pub const DEFAULT_HOLDER: &str = "pvx";

/// Redis-backed lease store sharing one multiplexed connection.
#[derive(Clone)]
pub struct RedisLeaseStore {
    con: MultiplexedConnection,
    holder: String,
}

impl RedisLeaseStore {
    /// Open a connection to `url` (`redis://host:port/db`).
    pub async fn connect(url: &str, holder: Option<&str>) -> Result<Self, BackendError> {
        let client = Client::open(url).map_err(|e| BackendError::InvalidConfig(e.to_string()))?;
        let con = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| BackendError::Store(e.to_string()))?;

        let holder = holder.unwrap_or(DEFAULT_HOLDER).to_string();
        info!(%holder, "connected to redis lease store");
        Ok(Self { con, holder })
    }

    pub fn holder(&self) -> &str {
        &self.holder
    }
}

#[async_trait]
impl LeaseStore for RedisLeaseStore {
    async fn set_if_absent(&self, key: &str) -> Result<bool, StoreError> {
        let mut con = self.con.clone();
        let reply: Option<String> = ::redis::cmd("SET")
            .arg(key)
            .arg(&self.holder)
            .arg("NX")
            .query_async(&mut con)
            .await
            .map_err(store_error)?;

        let created = is_ok_reply(reply.as_deref());
        debug!(lease_key = key, created, "redis SET NX");
        Ok(created)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut con = self.con.clone();
        let removed: i64 = ::redis::cmd("DEL")
            .arg(key)
            .query_async(&mut con)
            .await
            .map_err(store_error)?;
        debug!(lease_key = key, removed, "redis DEL");
        Ok(())
    }
}

/// `SET ... NX` replies `OK` on creation and nil when the key exists.
fn is_ok_reply(reply: Option<&str>) -> bool {
    reply == Some("OK")
}

fn store_error(e: RedisError) -> StoreError {
    if e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal() || e.is_timeout() {
        return StoreError::Unavailable(e.to_string());
    }
    match e.kind() {
        ErrorKind::IoError | ErrorKind::ClusterDown | ErrorKind::BusyLoadingError => {
            StoreError::Unavailable(e.to_string())
        }
        _ => StoreError::Command(e.to_string()),
    }
}
