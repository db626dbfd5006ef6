//! Short-lived tokens standing in for request payloads too long for a URL.

use crate::request::PreviewPayload;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

/// Issues and redeems payload tokens. Implementations decide storage.
pub trait PreviewTokenStore: Send + Sync {
    fn issue(&self, payload: PreviewPayload) -> String;

    /// Look a token up. Expired or unknown tokens yield `None`.
    fn redeem(&self, token: &str) -> Option<PreviewPayload>;
}

/// In-process store with a fixed time-to-live.
#[derive(Debug)]
pub struct MemoryTokenStore {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, PreviewPayload)>>,
}

impl MemoryTokenStore {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryTokenStore {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TTL)
    }
}

impl PreviewTokenStore for MemoryTokenStore {
    fn issue(&self, payload: PreviewPayload) -> String {
        let token = uuid::Uuid::new_v4().simple().to_string();
        if let Ok(mut entries) = self.entries.lock() {
            let now = Instant::now();
            let ttl = self.ttl;
            entries.retain(|_, (issued, _)| now.duration_since(*issued) < ttl);
            entries.insert(token.clone(), (now, payload));
        }
        token
    }

    fn redeem(&self, token: &str) -> Option<PreviewPayload> {
        let entries = self.entries.lock().ok()?;
        let (issued, payload) = entries.get(token)?;
        if issued.elapsed() >= self.ttl {
            debug!("preview token expired");
            return None;
        }
        Some(payload.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> PreviewPayload {
        PreviewPayload {
            code: "<p>hi</p>".into(),
            ..PreviewPayload::default()
        }
    }

    #[test]
    fn test_issue_and_redeem() {
        let store = MemoryTokenStore::default();
        let token = store.issue(payload());
        assert_eq!(store.redeem(&token).unwrap().code, "<p>hi</p>");
        // Redeeming does not consume; a reload can fetch the same payload.
        assert!(store.redeem(&token).is_some());
    }

    #[test]
    fn test_unknown_token() {
        assert!(MemoryTokenStore::default().redeem("nope").is_none());
    }

    #[test]
    fn test_expired_token() {
        let store = MemoryTokenStore::new(Duration::ZERO);
        let token = store.issue(payload());
        assert!(store.redeem(&token).is_none());
    }

    #[test]
    fn test_expired_entries_are_pruned_on_issue() {
        let store = MemoryTokenStore::new(Duration::ZERO);
        store.issue(payload());
        store.issue(payload());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_tokens_are_unique() {
        let store = MemoryTokenStore::default();
        assert_ne!(store.issue(payload()), store.issue(payload()));
    }
}
