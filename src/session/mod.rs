//! Server-held state of open screens.
//!
//! Every open registration form or form-builder draft is an isolated session keyed by a random
//! id and bound to the identity that opened it. Idle sessions expire after the configured TTL.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::Principal;

struct Entry<T> {
    owner: Option<Principal>,
    screen: Arc<Mutex<T>>,
    touched: Instant,
}

pub struct SessionStore<T> {
    ttl: Duration,
    entries: Mutex<HashMap<Uuid, Entry<T>>>,
}

impl<T> SessionStore<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Store a new screen and return its id with a handle to it.
    pub async fn open(&self, owner: Option<Principal>, screen: T) -> (Uuid, Arc<Mutex<T>>) {
        let mut entries = self.entries.lock().await;

        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, entry| now.duration_since(entry.touched) < self.ttl);
        if entries.len() < before {
            tracing::debug!("Purged {} idle screen sessions", before - entries.len());
        }

        let id = Uuid::new_v4();
        let screen = Arc::new(Mutex::new(screen));
        entries.insert(
            id,
            Entry {
                owner,
                screen: Arc::clone(&screen),
                touched: now,
            },
        );
        (id, screen)
    }

    /// Look up a session owned by `owner`. Sessions of other identities are not found.
    pub async fn get(&self, id: Uuid, owner: Option<&Principal>) -> Result<Arc<Mutex<T>>, AppError> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        let expired = match entries.get(&id) {
            Some(entry) if entry.owner.as_ref() == owner => {
                now.duration_since(entry.touched) >= self.ttl
            }
            _ => return Err(not_found(id)),
        };
        if expired {
            entries.remove(&id);
            return Err(not_found(id));
        }

        let entry = entries.get_mut(&id).ok_or_else(|| not_found(id))?;
        entry.touched = now;
        Ok(Arc::clone(&entry.screen))
    }

    pub async fn close(&self, id: Uuid, owner: Option<&Principal>) -> Result<(), AppError> {
        let mut entries = self.entries.lock().await;
        match entries.get(&id) {
            Some(entry) if entry.owner.as_ref() == owner => {
                entries.remove(&id);
                Ok(())
            }
            _ => Err(not_found(id)),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {} not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sessions_are_isolated_by_owner() {
        let store = SessionStore::new(Duration::from_secs(60));
        let alice = Principal::new("alice");
        let (id, screen) = store.open(Some(alice.clone()), 1u32).await;

        *screen.lock().await += 1;
        let again = store.get(id, Some(&alice)).await.unwrap();
        assert_eq!(*again.lock().await, 2);

        assert!(store.get(id, None).await.is_err());
        assert!(store
            .get(id, Some(&Principal::new("bob")))
            .await
            .is_err());
        assert!(store.close(id, None).await.is_err());

        store.close(id, Some(&alice)).await.unwrap();
        assert!(store.get(id, Some(&alice)).await.is_err());
    }

    #[tokio::test]
    async fn test_idle_sessions_expire() {
        let store = SessionStore::new(Duration::from_millis(20));
        let (stale, _) = store.open(None, "old").await;
        tokio::time::sleep(Duration::from_millis(40)).await;

        assert!(matches!(
            store.get(stale, None).await,
            Err(AppError::NotFound(_))
        ));

        let (_, _) = store.open(None, "new").await;
        assert_eq!(store.len().await, 1);
    }
}
