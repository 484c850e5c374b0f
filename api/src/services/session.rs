//! In-memory session state.
//!
//! A session holds one user's conversation history, the latest successfully
//! extracted schedule, and whether a schedule has been requested yet. Sessions
//! are created and removed explicitly; nothing survives a restart.
//!
//! Each session sits behind its own `Mutex`, so one submission per session
//! runs at a time while different sessions proceed independently.
//!
//! Sessions idle longer than the store's TTL are dropped whenever a new
//! session is created.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::models::{ChatMessage, IrrigationDayRecord, Role, TranscriptEntry};

#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    last_activity_at: DateTime<Utc>,
    history: Vec<TranscriptEntry>,
    schedule: Vec<IrrigationDayRecord>,
    /// Set after the first completed schedule request.
    has_reply: bool,
}

impl Session {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            last_activity_at: now,
            history: Vec::new(),
            schedule: Vec::new(),
            has_reply: false,
        }
    }

    /// Append-only; earlier entries are never touched.
    pub fn append(&mut self, message: ChatMessage) {
        if message.role == Role::Assistant {
            self.has_reply = true;
        }
        let now = Utc::now();
        self.last_activity_at = now;
        self.history.push(TranscriptEntry {
            message,
            appended_at: now,
        });
    }

    pub fn last_activity_at(&self) -> DateTime<Utc> {
        self.last_activity_at
    }

    fn is_idle(&self, now: DateTime<Utc>, idle_ttl: Duration) -> bool {
        now - self.last_activity_at > idle_ttl
    }

    pub fn history(&self) -> &[TranscriptEntry] {
        &self.history
    }

    pub fn has_reply(&self) -> bool {
        self.has_reply
    }

    /// Most recent assistant message, if any.
    pub fn last_reply(&self) -> Option<&str> {
        self.history
            .iter()
            .rev()
            .find(|e| e.message.role == Role::Assistant)
            .map(|e| e.message.content.as_str())
    }

    pub fn schedule(&self) -> &[IrrigationDayRecord] {
        &self.schedule
    }

    /// Replace the stored schedule wholesale.
    pub fn replace_schedule(&mut self, records: Vec<IrrigationDayRecord>) {
        self.schedule = records;
        self.last_activity_at = Utc::now();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

pub type SharedSession = Arc<Mutex<Session>>;

/// All live sessions, keyed by id.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SharedSession>>>,
    idle_ttl: Duration,
}

impl SessionStore {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_ttl,
        }
    }

    /// Start a new session, first dropping any that have gone idle.
    /// Returns the new session's id and creation time.
    pub async fn create(&self) -> (Uuid, DateTime<Utc>) {
        let session = Session::new();
        let id = session.id;
        let created_at = session.created_at;

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        // A session whose lock is held has a submission in flight; keep it.
        sessions.retain(|_, shared| match shared.try_lock() {
            Ok(s) => !s.is_idle(created_at, self.idle_ttl),
            Err(_) => true,
        });
        let pruned = before - sessions.len();
        if pruned > 0 {
            tracing::info!("Dropped {} idle session(s)", pruned);
        }

        sessions.insert(id, Arc::new(Mutex::new(session)));
        tracing::debug!("Session {} created", id);
        (id, created_at)
    }

    pub async fn get(&self, id: Uuid) -> Option<SharedSession> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// End a session, discarding its state. Returns false if it did not exist.
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            tracing::debug!("Session {} ended", id);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(day: u32) -> IrrigationDayRecord {
        IrrigationDayRecord {
            day,
            time_slot: "Morning".to_string(),
            watering_depth_cm: 2.0,
            water_volume_per_hour_liters: 600.0,
            total_water_volume_liters: 6000.0,
            tips: "Tip".to_string(),
        }
    }

    #[test]
    fn test_new_session_is_empty() {
        let s = Session::new();
        assert!(s.history().is_empty());
        assert!(s.schedule().is_empty());
        assert!(!s.has_reply());
        assert_eq!(s.last_reply(), None);
    }

    #[test]
    fn test_append_keeps_order_and_sets_reply_flag() {
        let mut s = Session::new();
        s.append(ChatMessage::user("first"));
        assert!(!s.has_reply());
        s.append(ChatMessage::assistant("reply one"));
        s.append(ChatMessage::user("second"));
        s.append(ChatMessage::assistant("reply two"));

        let contents: Vec<&str> = s
            .history()
            .iter()
            .map(|e| e.message.content.as_str())
            .collect();
        assert_eq!(contents, vec!["first", "reply one", "second", "reply two"]);
        assert!(s.has_reply());
        assert_eq!(s.last_reply(), Some("reply two"));
    }

    #[test]
    fn test_replace_schedule() {
        let mut s = Session::new();
        s.replace_schedule(vec![record(1), record(2)]);
        assert_eq!(s.schedule().len(), 2);
        s.replace_schedule(vec![record(3)]);
        assert_eq!(s.schedule(), &[record(3)]);
    }

    #[test]
    fn test_activity_updates_last_activity() {
        let mut s = Session::new();
        s.last_activity_at = Utc::now() - Duration::hours(2);
        s.append(ChatMessage::user("hello"));
        assert!(Utc::now() - s.last_activity_at() < Duration::minutes(1));

        s.last_activity_at = Utc::now() - Duration::hours(2);
        s.replace_schedule(vec![record(1)]);
        assert!(Utc::now() - s.last_activity_at() < Duration::minutes(1));
    }

    #[tokio::test]
    async fn test_create_drops_idle_sessions() {
        let store = SessionStore::new(Duration::minutes(30));
        let (stale, _) = store.create().await;
        let (fresh, _) = store.create().await;

        store.get(stale).await.unwrap().lock().await.last_activity_at =
            Utc::now() - Duration::minutes(31);
        store.get(fresh).await.unwrap().lock().await.last_activity_at =
            Utc::now() - Duration::minutes(29);

        let (newest, _) = store.create().await;

        assert!(store.get(stale).await.is_none());
        assert!(store.get(fresh).await.is_some());
        assert!(store.get(newest).await.is_some());
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_create_keeps_busy_sessions() {
        let store = SessionStore::new(Duration::minutes(30));
        let (busy, _) = store.create().await;

        let shared = store.get(busy).await.unwrap();
        let mut guard = shared.lock().await;
        guard.last_activity_at = Utc::now() - Duration::hours(5);

        store.create().await;
        assert!(store.get(busy).await.is_some());
        drop(guard);
    }

    #[tokio::test]
    async fn test_store_lifecycle() {
        let store = SessionStore::new(Duration::hours(1));
        let (a, created_at) = store.create().await;
        let (b, _) = store.create().await;
        assert_eq!(store.get(a).await.unwrap().lock().await.created_at, created_at);
        assert_ne!(a, b);
        assert_eq!(store.len().await, 2);

        let session = store.get(a).await.unwrap();
        session.lock().await.append(ChatMessage::user("hello"));

        // Sessions do not share state.
        let other = store.get(b).await.unwrap();
        assert!(other.lock().await.history().is_empty());

        assert!(store.remove(a).await);
        assert!(!store.remove(a).await);
        assert!(store.get(a).await.is_none());
        assert_eq!(store.len().await, 1);
    }
}
