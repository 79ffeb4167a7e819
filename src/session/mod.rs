pub mod store;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Mutex, OnceLock};
use tracing::{info, warn};
use uuid::Uuid;

use crate::kernel::time;
pub use store::{FileSessionStore, MemorySessionStore, SessionStore};

pub const SESSION_KEY: &str = "sessionId";

const SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// `session_<unix millis>_<9 base-36 chars>`
    pub fn generate() -> Self {
        let mut bits = Uuid::new_v4().as_u128();
        let mut suffix = String::with_capacity(SUFFIX_LEN);
        for _ in 0..SUFFIX_LEN {
            suffix.push(BASE36[(bits % 36) as usize] as char);
            bits /= 36;
        }
        SessionId(format!("session_{}_{}", time::now_millis(), suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        SessionId(s)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lazily created, then immutable, per-tab identity.
///
/// First access wins: creation happens under the store lock, so concurrent
/// first-time callers all observe the same id. Later reads hit the cache only.
pub struct SessionIdentity {
    store: Mutex<Box<dyn SessionStore>>,
    cached: OnceLock<SessionId>,
}

impl SessionIdentity {
    pub fn new(store: Box<dyn SessionStore>) -> Self {
        Self {
            store: Mutex::new(store),
            cached: OnceLock::new(),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemorySessionStore::new()))
    }

    pub fn id(&self) -> SessionId {
        if let Some(id) = self.cached.get() {
            return id.clone();
        }

        let mut store = self.store.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(id) = self.cached.get() {
            return id.clone();
        }

        let id = match store.get(SESSION_KEY) {
            Some(existing) => SessionId::from(existing),
            None => {
                let fresh = SessionId::generate();
                // A write failure only costs persistence; the id is still valid for this tab.
                if let Err(e) = store.set(SESSION_KEY, fresh.as_str()) {
                    warn!("could not persist session id: {}", e);
                }
                info!(session = %fresh, "session created");
                fresh
            }
        };

        self.cached.get_or_init(|| id).clone()
    }
}
