//! Authentication and local cache state of the simulated client
//!
//! Transitions are pure: each takes the current state by value and returns
//! the next one, or an error that leaves the caller's state untouched.

use nexus_manifest::{resolve_command, Manifest, ResolvedCommand};
use std::sync::Arc;
use thiserror::Error;

/// Required prefix of every API key
pub const API_KEY_PREFIX: &str = "nxs_";

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("Invalid API key format. Expected starts with \"nxs_\"")]
    InvalidApiKey,

    #[error("Error: You must be logged in. Run \"nexus login <key>\" first.")]
    NotLoggedIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Empty,
    Synced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    LoggedOut,
    LoggedIn(CacheState),
}

impl SessionState {
    pub fn is_logged_in(self) -> bool {
        matches!(self, SessionState::LoggedIn(_))
    }

    /// Authenticate with `key`. A fresh login starts with an empty cache;
    /// logging in again keeps the current cache status.
    pub fn login(self, key: Option<&str>) -> Result<SessionState, SessionError> {
        if !key.is_some_and(|k| k.starts_with(API_KEY_PREFIX)) {
            return Err(SessionError::InvalidApiKey);
        }
        Ok(match self {
            SessionState::LoggedOut => SessionState::LoggedIn(CacheState::Empty),
            logged_in @ SessionState::LoggedIn(_) => logged_in,
        })
    }

    pub fn require_auth(self) -> Result<(), SessionError> {
        if self.is_logged_in() {
            Ok(())
        } else {
            Err(SessionError::NotLoggedIn)
        }
    }

    /// Replace the local cache with a registry snapshot
    pub fn sync(self, snapshot: Vec<Arc<Manifest>>) -> Result<(SessionState, LocalCache), SessionError> {
        self.require_auth()?;
        Ok((
            SessionState::LoggedIn(CacheState::Synced),
            LocalCache::from_snapshot(snapshot),
        ))
    }
}

/// Manifests copied from the registry at the last sync
#[derive(Debug, Clone, Default)]
pub struct LocalCache {
    manifests: Vec<Arc<Manifest>>,
}

impl LocalCache {
    pub fn from_snapshot(manifests: Vec<Arc<Manifest>>) -> Self {
        Self { manifests }
    }

    pub fn is_empty(&self) -> bool {
        self.manifests.is_empty()
    }

    pub fn len(&self) -> usize {
        self.manifests.len()
    }

    pub fn manifests(&self) -> &[Arc<Manifest>] {
        &self.manifests
    }

    /// Same two-tier resolution the registry uses
    pub fn lookup(&self, target: &str) -> Option<ResolvedCommand<'_>> {
        resolve_command(&self.manifests, target)
    }
}
