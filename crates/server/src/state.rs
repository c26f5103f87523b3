use std::sync::Arc;

use service::{access::AccessController, kv::{service::KvService, store::KvStore}};

/// Shared handler state; one instance per server, cloned into every request.
#[derive(Clone)]
pub struct ServerState {
    pub kv: KvService,
}

impl ServerState {
    pub fn new(store: Arc<dyn KvStore>, access: AccessController) -> Self {
        Self { kv: KvService::new(store, access) }
    }
}
