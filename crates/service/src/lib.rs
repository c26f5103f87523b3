//! Service layer for the key-value server.
//! - `storage`: JSON snapshot file and the lock-guarded map built on it.
//! - `file`: the file-backed `KvStore` used in production.
//! - `access`: shared-secret check gating every mutation.
//! - `kv`: the store abstraction and `KvService`, the contract the HTTP layer calls.

pub mod errors;
pub mod access;
pub mod runtime;
#[cfg(test)]
pub mod test_support;
pub mod storage;
pub mod file;
pub mod kv;
