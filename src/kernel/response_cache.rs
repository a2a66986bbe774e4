//! TTL cache for assistant replies.
//!
//! Chat questions repeat heavily (parents ask the same recovery questions),
//! so identical conversations within the TTL window are served from memory
//! instead of hitting the assistant again.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::kernel::traits::ChatMessage;

const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const MAX_ENTRIES: usize = 100;

struct Entry {
    reply: String,
    inserted_at: Instant,
}

pub struct ResponseCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry>>,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Cache key over the user's side of the conversation, case-insensitive.
    pub fn key(messages: &[ChatMessage]) -> String {
        let joined = messages
            .iter()
            .filter(|m| m.role == "user")
            .map(|m| m.content.trim().to_lowercase())
            .collect::<Vec<_>>()
            .join("\n");
        format!("{:x}", md5::compute(joined.as_bytes()))
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => Some(entry.reply.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, key: String, reply: String) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if entries.len() >= MAX_ENTRIES {
            // Evict expired entries first; if none expired, drop the oldest.
            let ttl = self.ttl;
            entries.retain(|_, e| e.inserted_at.elapsed() < ttl);
            if entries.len() >= MAX_ENTRIES {
                if let Some(oldest) = entries
                    .iter()
                    .min_by_key(|(_, e)| e.inserted_at)
                    .map(|(k, _)| k.clone())
                {
                    entries.remove(&oldest);
                }
            }
        }
        entries.insert(
            key,
            Entry {
                reply,
                inserted_at: Instant::now(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(role: &str, content: &str) -> ChatMessage {
        ChatMessage {
            role: role.into(),
            content: content.into(),
        }
    }

    #[test]
    fn key_ignores_assistant_turns_and_case() {
        let a = [msg("user", "How long for an ankle sprain?")];
        let b = [
            msg("user", "  how long for an ankle sprain?  "),
            msg("assistant", "About two weeks."),
        ];
        assert_eq!(ResponseCache::key(&a), ResponseCache::key(&b));
    }

    #[test]
    fn get_returns_cached_reply_within_ttl() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.put("k".into(), "cached".into());
        assert_eq!(cache.get("k").as_deref(), Some("cached"));
    }

    #[test]
    fn expired_entries_are_dropped() {
        let cache = ResponseCache::new(Duration::ZERO);
        cache.put("k".into(), "cached".into());
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn cache_stays_bounded() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        for i in 0..(MAX_ENTRIES + 20) {
            cache.put(format!("k{i}"), "r".into());
        }
        let entries = cache.entries.lock().unwrap();
        assert!(entries.len() <= MAX_ENTRIES);
    }
}
