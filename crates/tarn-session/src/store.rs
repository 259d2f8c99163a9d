//! In-memory session store with two-level LRU eviction.
//!
//! The store keeps the most recently used `nb_sessions` sessions and, for
//! each session, the most recently used `nb_states` states. Everything
//! lives in process memory; when either cache overflows, the coldest
//! entry disappears silently and its absence surfaces as [`Error::Expired`]
//! on the next access. Payloads are opaque byte blobs; serialization is
//! the caller's concern.

use std::num::NonZeroUsize;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::lock::{LockFactory, SessionLock, ThreadLockFactory};
use crate::lru::LruCache;

/// One session record: metadata plus a bounded cache of its states.
struct Session {
    /// Monotonic counter, advanced by [`SessionStore::store`] unless the
    /// caller reuses the current state.
    last_state_id: u64,

    /// Created once at session creation and never replaced.
    lock: SessionLock,

    /// Anti-tampering value owned by the caller; stored, never interpreted.
    secure_token: Vec<u8>,

    /// Session-wide payload, absent until the first `store`.
    session_data: Option<Vec<u8>>,

    /// Bounded LRU cache of state payloads, keyed by state id.
    states: LruCache<u64, Vec<u8>>,
}

/// What [`SessionStore::create`] hands back to the caller.
#[derive(Debug, Clone)]
pub struct CreatedSession {
    /// The id the session was created under.
    pub session_id: String,

    /// Id of the first state, always 0.
    pub state_id: u64,

    /// The secure token as stored.
    pub secure_token: Vec<u8>,

    /// Handle for serializing requests against this session.
    pub lock: SessionLock,
}

/// What [`SessionStore::fetch`] hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedState {
    /// Id of the latest state of the session.
    pub last_state_id: u64,

    /// The secure token as stored.
    pub secure_token: Vec<u8>,

    /// Session-wide payload, if any `store` has set one.
    pub session_data: Option<Vec<u8>>,

    /// Payload of the requested state.
    pub state_data: Vec<u8>,
}

/// Session count and capacity snapshot.
#[derive(Debug, Clone)]
pub struct StoreStats {
    /// Current number of live sessions.
    pub sessions: usize,

    /// Maximum number of sessions.
    pub capacity: usize,
}

/// Thread-safe, capacity-bounded session store.
///
/// All operations are serialized through one coarse mutex owned by the
/// store instance, so eviction decisions never race and the recency
/// ordering is linearizable. The mutex is held only for the O(1) cache
/// work, never across the lock factory or caller code. Independent store
/// instances never contend.
///
/// The per-session [`SessionLock`] returned by [`create`](Self::create)
/// and [`get_lock`](Self::get_lock) is a separate concern: the store
/// never acquires it; the request layer uses it to serialize requests
/// that target the same session.
pub struct SessionStore<F: LockFactory = ThreadLockFactory> {
    sessions: Mutex<LruCache<String, Session>>,
    nb_states: NonZeroUsize,
    lock_factory: F,
    config: StoreConfig,
}

impl SessionStore<ThreadLockFactory> {
    /// Create a store with the default in-process lock factory.
    pub fn new(config: StoreConfig) -> Result<Self> {
        Self::with_lock_factory(config, ThreadLockFactory)
    }
}

impl<F: LockFactory> SessionStore<F> {
    /// Create a store with a caller-supplied lock factory.
    ///
    /// Fails with [`Error::Config`] if either capacity is zero.
    pub fn with_lock_factory(config: StoreConfig, lock_factory: F) -> Result<Self> {
        let (nb_sessions, nb_states) = config.validate()?;
        Ok(Self {
            sessions: Mutex::new(LruCache::new(nb_sessions)),
            nb_states,
            lock_factory,
            config,
        })
    }

    /// Get the store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Reject deployment modes this store cannot serve.
    ///
    /// The store is single-process only; `multi_threads` is unconstrained
    /// because every operation goes through the coarse mutex.
    pub fn check_concurrence(&self, multi_processes: bool, _multi_threads: bool) -> Result<()> {
        if multi_processes {
            return Err(Error::Config(
                "in-memory session store can't run multi-process".into(),
            ));
        }
        Ok(())
    }

    /// Test whether a session exists, without touching the recency order.
    pub fn check_session_id(&self, session_id: &str) -> bool {
        self.sessions.lock().contains(session_id)
    }

    /// Retrieve the lock handle of a session.
    ///
    /// Fails with [`Error::Expired`] if the session is absent, whether it
    /// was never created, deleted or evicted.
    pub fn get_lock(&self, session_id: &str) -> Result<SessionLock> {
        let mut sessions = self.sessions.lock();
        let session = sessions
            .get(session_id)
            .map_err(|_| Error::Expired(format!("lock not found for session {session_id}")))?;
        Ok(session.lock.clone())
    }

    /// Create a new session under `session_id`.
    ///
    /// Allocates a fresh lock from the factory, starts the state counter
    /// at 0 and inserts the record at the most-recently-used position. If
    /// the store is full, the coldest session is dropped silently.
    /// Creating over an existing id replaces that session wholesale.
    pub fn create(&self, session_id: &str, secure_token: Vec<u8>) -> CreatedSession {
        // Outside the store mutex: factories may do arbitrary work.
        let lock = self.lock_factory.create_lock();

        let session = Session {
            last_state_id: 0,
            lock: lock.clone(),
            secure_token: secure_token.clone(),
            session_data: None,
            states: LruCache::new(self.nb_states),
        };

        let mut sessions = self.sessions.lock();
        if sessions.len() == sessions.capacity() && !sessions.contains(session_id) {
            debug!(session_id = %session_id, "store full, evicting coldest session");
        }
        sessions.set(session_id.to_string(), session);

        debug!(
            session_id = %session_id,
            store_size = sessions.len(),
            "session created"
        );

        CreatedSession {
            session_id: session_id.to_string(),
            state_id: 0,
            secure_token,
            lock,
        }
    }

    /// Delete a session explicitly.
    ///
    /// Not idempotent: deleting an absent session fails with
    /// [`Error::NotFound`].
    pub fn delete(&self, session_id: &str) -> Result<()> {
        self.sessions.lock().delete(session_id)?;
        debug!(session_id = %session_id, "session deleted");
        Ok(())
    }

    /// Retrieve a state and its session's metadata.
    ///
    /// Fails with [`Error::Expired`] if the session or the state is
    /// absent. On success both the session and the state are promoted to
    /// most-recently-used in their respective caches.
    pub fn fetch(&self, session_id: &str, state_id: u64) -> Result<FetchedState> {
        let mut sessions = self.sessions.lock();
        let session = sessions
            .get_mut(session_id)
            .map_err(|_| Error::Expired(format!("no session {session_id}")))?;
        let state_data = session.states.get(&state_id).map_err(|_| {
            Error::Expired(format!("no state {state_id} in session {session_id}"))
        })?;

        trace!(session_id = %session_id, state_id, "state fetched");

        Ok(FetchedState {
            last_state_id: session.last_state_id,
            secure_token: session.secure_token.clone(),
            session_data: session.session_data.clone(),
            state_data: state_data.clone(),
        })
    }

    /// Store a state and refresh its session's metadata.
    ///
    /// Fails with [`Error::Expired`] if the session is absent (it may
    /// have been evicted between requests). Advances `last_state_id` by
    /// exactly 1 unless `use_same_state` asks to overwrite the current
    /// snapshot. The secure token and session payload are always
    /// replaced. If the session already holds `nb_states` states, the
    /// coldest one is dropped silently.
    pub fn store(
        &self,
        session_id: &str,
        state_id: u64,
        secure_token: Vec<u8>,
        use_same_state: bool,
        session_data: Option<Vec<u8>>,
        state_data: Vec<u8>,
    ) -> Result<()> {
        let mut sessions = self.sessions.lock();
        let session = sessions
            .get_mut(session_id)
            .map_err(|_| Error::Expired(format!("no session {session_id}")))?;

        if !use_same_state {
            session.last_state_id += 1;
        }
        session.secure_token = secure_token;
        session.session_data = session_data;
        session.states.set(state_id, state_data);

        trace!(
            session_id = %session_id,
            state_id,
            last_state_id = session.last_state_id,
            "state stored"
        );

        Ok(())
    }

    /// Current number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Whether the store holds no sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }

    /// Session count and capacity snapshot.
    pub fn stats(&self) -> StoreStats {
        let sessions = self.sessions.lock();
        StoreStats {
            sessions: sessions.len(),
            capacity: sessions.capacity(),
        }
    }
}
