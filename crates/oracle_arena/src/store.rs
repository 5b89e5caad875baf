//! Session storage for single- and multi-client use.

use crate::error::ArenaError;
use crate::oracle::OracleRegistry;
use crate::session::{Session, SessionId, SessionSettings};
use crate::snapshot::Snapshot;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, instrument, warn};

/// Id of the session served by the un-keyed operations.
pub const DEFAULT_SESSION_ID: &str = "default";

type SharedSession = Arc<Mutex<Session>>;

/// Locks a mutex, recovering the data if a previous holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Holds the default session plus a keyed table of extra sessions.
///
/// Every session sits behind its own mutex, so operations on one session
/// are serialized while different sessions proceed independently. Cloning
/// the store is cheap and shares the same sessions.
#[derive(Debug, Clone)]
pub struct SessionStore {
    oracles: Arc<OracleRegistry>,
    settings: SessionSettings,
    default: SharedSession,
    sessions: Arc<Mutex<HashMap<SessionId, SharedSession>>>,
    next_id: Arc<AtomicU64>,
}

impl SessionStore {
    /// Creates a store whose sessions share `oracles` and `settings`.
    #[instrument(skip(oracles), fields(oracles = oracles.len()))]
    pub fn new(oracles: Arc<OracleRegistry>, settings: SessionSettings) -> Self {
        info!("Creating session store");
        let default = Session::new(DEFAULT_SESSION_ID.to_string(), Arc::clone(&oracles), settings);
        Self {
            oracles,
            settings,
            default: Arc::new(Mutex::new(default)),
            sessions: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Runs `f` with exclusive access to the default session.
    pub fn with_default<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        f(&mut lock(&self.default))
    }

    /// Snapshot of the default session.
    #[instrument(skip(self))]
    pub fn get(&self) -> Snapshot {
        debug!("Reading default session");
        self.with_default(|s| s.snapshot())
    }

    /// Resets the default session.
    #[instrument(skip(self))]
    pub fn reset(&self) -> Snapshot {
        self.with_default(Session::reset)
    }

    /// Creates a keyed session.
    ///
    /// # Errors
    ///
    /// Returns a session-exists error if `id` is taken.
    #[instrument(skip(self))]
    pub fn create(&self, id: SessionId) -> Result<Snapshot, ArenaError> {
        let mut sessions = lock(&self.sessions);

        if id == DEFAULT_SESSION_ID || sessions.contains_key(&id) {
            warn!(session_id = %id, "Session already exists");
            return Err(ArenaError::session_exists(id));
        }

        let session = Session::new(id.clone(), Arc::clone(&self.oracles), self.settings);
        let snapshot = session.snapshot();
        sessions.insert(id.clone(), Arc::new(Mutex::new(session)));

        info!(session_id = %id, count = sessions.len(), "Created new session");
        Ok(snapshot)
    }

    /// Creates a keyed session under a freshly generated id.
    #[instrument(skip(self))]
    pub fn create_generated(&self) -> Snapshot {
        loop {
            let id = format!("session-{}", self.next_id.fetch_add(1, Ordering::Relaxed));
            match self.create(id) {
                Ok(snapshot) => return snapshot,
                Err(e) => debug!(error = %e, "Generated id taken, trying next"),
            }
        }
    }

    /// Runs `f` with exclusive access to a keyed session.
    ///
    /// [`DEFAULT_SESSION_ID`] addresses the default session. The table lock
    /// is released before the session lock is taken.
    ///
    /// # Errors
    ///
    /// Returns a session-not-found error for an unknown id.
    pub fn with_session<R>(
        &self,
        id: &str,
        f: impl FnOnce(&mut Session) -> R,
    ) -> Result<R, ArenaError> {
        if id == DEFAULT_SESSION_ID {
            return Ok(self.with_default(f));
        }
        let session = lock(&self.sessions).get(id).cloned().ok_or_else(|| {
            debug!(session_id = id, "Session not found");
            ArenaError::session_not_found(id)
        })?;
        let mut guard = lock(&session);
        Ok(f(&mut guard))
    }

    /// Snapshot of a keyed session.
    ///
    /// # Errors
    ///
    /// Returns a session-not-found error for an unknown id.
    #[instrument(skip(self))]
    pub fn get_session(&self, id: &str) -> Result<Snapshot, ArenaError> {
        self.with_session(id, |s| s.snapshot())
    }

    /// Removes a keyed session, returning its final snapshot.
    ///
    /// # Errors
    ///
    /// Returns a session-not-found error for an unknown id, and a
    /// reserved-session error for [`DEFAULT_SESSION_ID`].
    #[instrument(skip(self))]
    pub fn drop_session(&self, id: &str) -> Result<Snapshot, ArenaError> {
        if id == DEFAULT_SESSION_ID {
            warn!("Refusing to drop the default session");
            return Err(ArenaError::reserved_session(id));
        }
        let session = lock(&self.sessions).remove(id).ok_or_else(|| {
            warn!(session_id = id, "Cannot drop unknown session");
            ArenaError::session_not_found(id)
        })?;
        info!(session_id = id, "Dropped session");
        let snapshot = lock(&session).snapshot();
        Ok(snapshot)
    }

    /// Lists keyed session ids, sorted. The default session is not listed.
    #[instrument(skip(self))]
    pub fn list(&self) -> Vec<SessionId> {
        let mut ids: Vec<_> = lock(&self.sessions).keys().cloned().collect();
        ids.sort();
        debug!(count = ids.len(), "Listed sessions");
        ids
    }
}
