//! In-memory session store with two-level LRU eviction.
//!
//! This crate keeps short-lived session state entirely in process memory,
//! bounded at two nesting levels:
//! - the store keeps at most `nb_sessions` sessions,
//! - each session keeps at most `nb_states` states.
//!
//! When either bound is crossed, the least recently used entry is dropped
//! silently; its absence shows up as [`Error::Expired`] on the next
//! access. There is no persistence, no cross-process sharing and no
//! interpretation of payloads.
//!
//! # Example
//!
//! ```rust
//! use tarn_session::{SessionStore, StoreConfig};
//!
//! let store = SessionStore::new(
//!     StoreConfig::new().with_nb_sessions(100).with_nb_states(5),
//! )?;
//!
//! let created = store.create("session-1", b"token".to_vec());
//! store.store("session-1", created.state_id, b"token".to_vec(), true, None, b"payload".to_vec())?;
//!
//! let fetched = store.fetch("session-1", created.state_id)?;
//! assert_eq!(fetched.state_data, b"payload");
//! # Ok::<(), tarn_session::Error>(())
//! ```

mod config;
mod error;
mod lock;
mod lru;
mod store;

pub use config::{StoreConfig, DEFAULT_NB_SESSIONS, DEFAULT_NB_STATES};
pub use error::{Error, Result};
pub use lock::{LockFactory, SessionLock, SessionLockGuard, ThreadLockFactory};
pub use lru::LruCache;
pub use store::{CreatedSession, FetchedState, SessionStore, StoreStats};
