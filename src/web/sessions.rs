use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::{HeaderMap, header};
use log::debug;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::app::UserSession;

pub const SESSION_COOKIE: &str = "ytchat_session";

/// Idle time after which a browser's session is dropped
pub const SESSION_TTL: Duration = Duration::from_secs(2 * 60 * 60);

type Slot = Arc<tokio::sync::Mutex<UserSession>>;

struct Entry {
    slot: Slot,
    last_used: Instant,
}

/// One `UserSession` slot per browser. The async mutex is held for a whole
/// handler, so a browser never has two loads or asks in flight.
pub struct Sessions {
    slots: Mutex<HashMap<Uuid, Entry>>,
    ttl: Duration,
}

impl Default for Sessions {
    fn default() -> Self {
        Self::with_ttl(SESSION_TTL)
    }
}

impl Sessions {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// The slot for `id`, created if this browser has none yet
    pub fn slot(&self, id: Uuid) -> Slot {
        let now = Instant::now();
        self.evict_idle(now);

        let mut slots = self.slots.lock();
        let entry = slots.entry(id).or_insert_with(|| {
            debug!("New browser session {id}");
            Entry {
                slot: Arc::default(),
                last_used: now,
            }
        });
        entry.last_used = now;
        Arc::clone(&entry.slot)
    }

    /// The slot for `id` only if one already exists
    pub fn existing(&self, id: Uuid) -> Option<Slot> {
        let now = Instant::now();
        self.evict_idle(now);

        let mut slots = self.slots.lock();
        let entry = slots.get_mut(&id)?;
        entry.last_used = now;
        Some(Arc::clone(&entry.slot))
    }

    /// Drop slots idle for longer than the TTL. Slots a handler still holds are kept.
    fn evict_idle(&self, now: Instant) {
        let mut slots = self.slots.lock();
        let before = slots.len();
        slots.retain(|_, entry| {
            Arc::strong_count(&entry.slot) > 1 || now.saturating_duration_since(entry.last_used) <= self.ttl
        });
        let evicted = before - slots.len();
        if evicted > 0 {
            debug!("Evicted {evicted} idle browser sessions");
        }
    }

    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Browser session ID carried in the request's cookies, if any
pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

pub fn session_cookie(id: Uuid) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}
