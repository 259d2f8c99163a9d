//! Configuration for the session store.

use std::num::NonZeroUsize;

use crate::error::{Error, Result};

/// Default maximum number of sessions kept in memory.
pub const DEFAULT_NB_SESSIONS: usize = 10_000;

/// Default maximum number of states kept per session.
pub const DEFAULT_NB_STATES: usize = 20;

/// Configuration for the session store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Maximum number of sessions before LRU eviction.
    pub nb_sessions: usize,

    /// Maximum number of states, for each session, before LRU eviction.
    pub nb_states: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            nb_sessions: DEFAULT_NB_SESSIONS,
            nb_states: DEFAULT_NB_STATES,
        }
    }
}

impl StoreConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of sessions to keep.
    pub fn with_nb_sessions(mut self, nb_sessions: usize) -> Self {
        self.nb_sessions = nb_sessions;
        self
    }

    /// Set the maximum number of states to keep per session.
    pub fn with_nb_states(mut self, nb_states: usize) -> Self {
        self.nb_states = nb_states;
        self
    }

    /// Check both capacities, returning them as non-zero values.
    ///
    /// Called once at store construction; a zero capacity is a
    /// configuration error, not a runtime condition.
    pub(crate) fn validate(&self) -> Result<(NonZeroUsize, NonZeroUsize)> {
        let nb_sessions = NonZeroUsize::new(self.nb_sessions)
            .ok_or_else(|| Error::Config("nb_sessions must be positive".into()))?;
        let nb_states = NonZeroUsize::new(self.nb_states)
            .ok_or_else(|| Error::Config("nb_states must be positive".into()))?;
        Ok((nb_sessions, nb_states))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.nb_sessions, 10_000);
        assert_eq!(config.nb_states, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_overrides() {
        let config = StoreConfig::new().with_nb_sessions(2).with_nb_states(5);
        let (nb_sessions, nb_states) = config.validate().unwrap();
        assert_eq!(nb_sessions.get(), 2);
        assert_eq!(nb_states.get(), 5);
    }

    #[test]
    fn zero_capacities_are_rejected() {
        let err = StoreConfig::new().with_nb_sessions(0).validate();
        assert!(matches!(err, Err(Error::Config(_))));

        let err = StoreConfig::new().with_nb_states(0).validate();
        assert!(matches!(err, Err(Error::Config(_))));
    }
}
