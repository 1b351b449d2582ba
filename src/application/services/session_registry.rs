//! Session Registry
//!
//! Holds one record per connected producer. The map is sharded (`DashMap`)
//! and every record carries its own lock, so operations on one session never
//! wait on another.

use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::application::dto::{LatestFrame, SessionSummary};
use crate::domain::Session;
use crate::infrastructure::metrics;

/// Shared handle to one session record
pub type SessionHandle = Arc<Mutex<Session>>;

/// Registry of connected producer sessions
pub struct SessionRegistry {
    sessions: DashMap<String, SessionHandle>,
    window_capacity: usize,
}

impl SessionRegistry {
    /// Create a registry whose sessions use a detection window of
    /// `window_capacity` frames.
    pub fn new(window_capacity: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            window_capacity,
        }
    }

    /// Register a session. If `id` is already present the existing record is
    /// returned untouched.
    pub fn create(&self, id: &str) -> SessionHandle {
        let handle = self
            .sessions
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Session::new(id, self.window_capacity))))
            .value()
            .clone();

        metrics::set_active_sessions(self.sessions.len());
        tracing::info!(client_id = %id, "Session registered");
        handle
    }

    pub fn get(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.get(id).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    /// Remove a session with its window and cooldown. Idempotent.
    ///
    /// The record is marked disconnected while its shard is still locked, so
    /// no reader can find the entry gone while the record still looks live.
    /// Lock order is shard, then record; nothing takes them the other way.
    pub fn remove(&self, id: &str) -> bool {
        let removed = self.sessions.remove_if(id, |_, handle| {
            handle.lock().close();
            true
        });
        match removed {
            Some(_) => {
                metrics::set_active_sessions(self.sessions.len());
                tracing::info!(client_id = %id, "Session unregistered");
                true
            }
            None => false,
        }
    }

    /// Get session count
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Handles are cloned out first so no shard lock is held while records
    /// are locked.
    fn handles(&self) -> Vec<SessionHandle> {
        self.sessions
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Summaries of all live sessions, ordered by id.
    pub fn snapshot(&self) -> Vec<SessionSummary> {
        let handles = self.handles();

        let mut summaries: Vec<SessionSummary> = handles
            .iter()
            .map(|handle| SessionSummary::from(&*handle.lock()))
            .collect();
        summaries.sort_by(|a, b| a.client_id.cmp(&b.client_id));
        summaries
    }

    /// Summary of one session.
    pub fn summary(&self, id: &str) -> Option<SessionSummary> {
        self.get(id).map(|handle| SessionSummary::from(&*handle.lock()))
    }

    /// Latest annotated frame of every live session that has one.
    pub fn latest_frames(&self) -> BTreeMap<String, String> {
        self.handles()
            .iter()
            .filter_map(|handle| {
                let session = handle.lock();
                if session.is_closed() {
                    return None;
                }
                let frame = session.last_frame.clone()?;
                Some((session.id.clone(), frame))
            })
            .collect()
    }

    /// Latest annotated frame of one session, if it has produced one.
    pub fn latest_frame(&self, id: &str) -> Option<LatestFrame> {
        self.get(id)
            .and_then(|handle| LatestFrame::from_session(&handle.lock()))
    }
}
