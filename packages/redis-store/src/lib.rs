//! Redis-backed store for remotemap.
//!
//! `RedisStore` maps every [`KvStore`] primitive onto exactly one Redis
//! command over a blocking connection:
//!
//! | primitive | command |
//! |---|---|
//! | `exists` / `shape_of` / `get` / `put` / `delete` / `keys` | `EXISTS` / `TYPE` / `GET` / `SET` / `DEL` / `KEYS *` |
//! | `list_*` | `LLEN` `LINDEX` `LSET` `LRANGE` `LTRIM` `LPUSH` `RPUSH` `LPOP` `RPOP` |
//! | `hash_*` | `HEXISTS` `HGET` `HSET` `HDEL` `HKEYS` `HLEN` |
//! | `set_*` | `SISMEMBER` `SMEMBERS` `SCARD` `SADD` `SREM` `SPOP` |
//!
//! ```ignore
//! use remotemap_redis_store::RedisStore;
//!
//! let store = RedisStore::connect("localhost", 6379, 0)?;
//! store.put("greeting", "hello".into())?;
//! ```

use bytes::Bytes;
use parking_lot::Mutex;
use redis::{Client, Cmd, Connection, FromRedisValue, RedisError};
use remotemap_kv_store::{KvStore, Shape, StoreError};

/// A [`KvStore`] backed by a single Redis connection.
///
/// The connection is guarded by a mutex so one store can be shared by any
/// number of views; commands from different views are serialized on it.
pub struct RedisStore {
    conn: Mutex<Connection>,
}

impl RedisStore {
    /// Open a connection from a Redis URL (`redis://host:port/db`).
    pub fn open(url: &str) -> Result<Self, StoreError> {
        let client = Client::open(url).map_err(StoreError::transport)?;
        let conn = client.get_connection().map_err(StoreError::transport)?;
        log::debug!("connected to {}", url);
        Ok(Self::with_connection(conn))
    }

    /// Open a connection to `host:port`, selecting database `db`.
    pub fn connect(host: &str, port: u16, db: i64) -> Result<Self, StoreError> {
        Self::open(&connection_url(host, port, db))
    }

    /// Wrap an already established connection.
    pub fn with_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn query<T: FromRedisValue>(&self, cmd: &Cmd) -> Result<T, StoreError> {
        let mut conn = self.conn.lock();
        cmd.query(&mut *conn).map_err(StoreError::transport)
    }
}

/// Build the URL for `host:port` and database `db`.
pub fn connection_url(host: &str, port: u16, db: i64) -> String {
    format!("redis://{}:{}/{}", host, port, db)
}

/// Translate a `TYPE` reply into a shape. `none` means the key is absent.
fn parse_type(name: &str) -> Result<Option<Shape>, StoreError> {
    match name {
        "none" => Ok(None),
        other => other.parse().map(Some),
    }
}

fn lossy_strings(raw: Vec<Vec<u8>>) -> Vec<String> {
    raw.into_iter()
        .map(|k| String::from_utf8_lossy(&k).into_owned())
        .collect()
}

fn to_bytes(raw: Option<Vec<u8>>) -> Option<Bytes> {
    raw.map(Bytes::from)
}

fn is_index_error(e: &RedisError) -> bool {
    e.detail()
        .is_some_and(|detail| detail.contains("index out of range"))
}

impl KvStore for RedisStore {
    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        self.query(redis::cmd("EXISTS").arg(key))
    }

    fn shape_of(&self, key: &str) -> Result<Option<Shape>, StoreError> {
        let name: String = self.query(redis::cmd("TYPE").arg(key))?;
        parse_type(&name)
    }

    fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        self.query(redis::cmd("GET").arg(key)).map(to_bytes)
    }

    fn put(&self, key: &str, value: Bytes) -> Result<(), StoreError> {
        self.query(redis::cmd("SET").arg(key).arg(&value[..]))
    }

    fn delete(&self, key: &str) -> Result<u64, StoreError> {
        self.query(redis::cmd("DEL").arg(key))
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        self.query(redis::cmd("KEYS").arg("*")).map(lossy_strings)
    }

    fn list_len(&self, key: &str) -> Result<usize, StoreError> {
        self.query(redis::cmd("LLEN").arg(key))
    }

    fn list_get(&self, key: &str, index: i64) -> Result<Option<Bytes>, StoreError> {
        self.query(redis::cmd("LINDEX").arg(key).arg(index)).map(to_bytes)
    }

    fn list_set(&self, key: &str, index: i64, value: Bytes) -> Result<(), StoreError> {
        let mut conn = self.conn.lock();
        redis::cmd("LSET")
            .arg(key)
            .arg(index)
            .arg(&value[..])
            .query(&mut *conn)
            .map_err(|e| {
                // A missing key is reported as "no such key"; both mean there
                // is no element at `index`.
                if is_index_error(&e) || e.detail().is_some_and(|d| d.contains("no such key")) {
                    StoreError::IndexOutOfRange {
                        key: key.to_string(),
                        index,
                    }
                } else {
                    StoreError::transport(e)
                }
            })
    }

    fn list_range(&self, key: &str, start: i64, stop: i64) -> Result<Vec<Bytes>, StoreError> {
        let raw: Vec<Vec<u8>> = self.query(redis::cmd("LRANGE").arg(key).arg(start).arg(stop))?;
        Ok(raw.into_iter().map(Bytes::from).collect())
    }

    fn list_trim(&self, key: &str, start: i64, stop: i64) -> Result<(), StoreError> {
        self.query(redis::cmd("LTRIM").arg(key).arg(start).arg(stop))
    }

    fn list_push_left(&self, key: &str, value: Bytes) -> Result<usize, StoreError> {
        self.query(redis::cmd("LPUSH").arg(key).arg(&value[..]))
    }

    fn list_push_right(&self, key: &str, value: Bytes) -> Result<usize, StoreError> {
        self.query(redis::cmd("RPUSH").arg(key).arg(&value[..]))
    }

    fn list_pop_left(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        self.query(redis::cmd("LPOP").arg(key)).map(to_bytes)
    }

    fn list_pop_right(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        self.query(redis::cmd("RPOP").arg(key)).map(to_bytes)
    }

    fn hash_exists(&self, key: &str, field: &str) -> Result<bool, StoreError> {
        self.query(redis::cmd("HEXISTS").arg(key).arg(field))
    }

    fn hash_get(&self, key: &str, field: &str) -> Result<Option<Bytes>, StoreError> {
        self.query(redis::cmd("HGET").arg(key).arg(field)).map(to_bytes)
    }

    fn hash_set(&self, key: &str, field: &str, value: Bytes) -> Result<(), StoreError> {
        let _added: u64 = self.query(redis::cmd("HSET").arg(key).arg(field).arg(&value[..]))?;
        Ok(())
    }

    fn hash_delete(&self, key: &str, field: &str) -> Result<u64, StoreError> {
        self.query(redis::cmd("HDEL").arg(key).arg(field))
    }

    fn hash_fields(&self, key: &str) -> Result<Vec<String>, StoreError> {
        self.query(redis::cmd("HKEYS").arg(key)).map(lossy_strings)
    }

    fn hash_len(&self, key: &str) -> Result<usize, StoreError> {
        self.query(redis::cmd("HLEN").arg(key))
    }

    fn set_contains(&self, key: &str, member: &[u8]) -> Result<bool, StoreError> {
        self.query(redis::cmd("SISMEMBER").arg(key).arg(member))
    }

    fn set_members(&self, key: &str) -> Result<Vec<Bytes>, StoreError> {
        let raw: Vec<Vec<u8>> = self.query(redis::cmd("SMEMBERS").arg(key))?;
        Ok(raw.into_iter().map(Bytes::from).collect())
    }

    fn set_len(&self, key: &str) -> Result<usize, StoreError> {
        self.query(redis::cmd("SCARD").arg(key))
    }

    fn set_add(&self, key: &str, member: Bytes) -> Result<bool, StoreError> {
        let added: u64 = self.query(redis::cmd("SADD").arg(key).arg(&member[..]))?;
        Ok(added > 0)
    }

    fn set_remove(&self, key: &str, member: &[u8]) -> Result<bool, StoreError> {
        let removed: u64 = self.query(redis::cmd("SREM").arg(key).arg(member))?;
        Ok(removed > 0)
    }

    fn set_pop(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        self.query(redis::cmd("SPOP").arg(key)).map(to_bytes)
    }
}
