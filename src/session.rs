use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

use axum::http::{header::COOKIE, HeaderMap};
use log::debug;
use serde_json::Value;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "audit_session";

/// Server-side per-session slot storage.
pub trait SessionStore: Send + Sync {
    /// Value stored for `id`, unless absent or expired.
    fn get(&self, id: &str) -> Option<Value>;

    /// Stores `value` for `id`, replacing any previous value, for `ttl`.
    fn set(&self, id: &str, value: Value, ttl: Duration);

    /// Drops the value stored for `id`.
    fn expire(&self, id: &str);
}

struct SessionEntry {
    value: Value,
    expires_at: Instant,
}

#[derive(Default)]
pub struct MemorySessionStore {
    entries: RwLock<HashMap<String, SessionEntry>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every expired entry and returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, id: &str) -> Option<Value> {
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            match entries.get(id) {
                None => return None,
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Some(entry.value.clone())
                }
                Some(_) => {}
            }
        }

        debug!("Session {id} expired");
        self.expire(id);
        None
    }

    fn set(&self, id: &str, value: Value, ttl: Duration) {
        let entry = SessionEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.to_string(), entry);
    }

    fn expire(&self, id: &str) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
    }
}

pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// Session id carried by the request's `Cookie` header(s), if any.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value for a session. Cross-origin credentialed use needs `SameSite=None; Secure`.
pub fn session_cookie(id: &str, ttl: Duration, secure: bool) -> String {
    let site = if secure {
        "Secure; SameSite=None"
    } else {
        "SameSite=Lax"
    };
    format!(
        "{SESSION_COOKIE}={id}; Path=/; HttpOnly; Max-Age={}; {site}",
        ttl.as_secs()
    )
}
