// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transform sessions.
//!
//! A session groups the pan/zoom state that belongs to one image. When the
//! image identity changes, the session id is bumped and the transform engine
//! must start over instead of carrying gesture state across unrelated images.

use core::fmt;

/// Identifier of a transform session.
///
/// The first session of a mounted viewport is [`SessionId::FIRST`]; each
/// confirmed source change moves to [`SessionId::next`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(u64);

impl SessionId {
    /// The session created at mount.
    pub const FIRST: Self = Self(1);

    /// Returns the session following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Returns the raw counter value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionId").field(&self.0).finish()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

/// Load progress of the rendered image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Nothing has started loading for this session.
    #[default]
    Unloaded,
    /// The renderer reported load start.
    Loading,
    /// The renderer reported a successful load.
    Loaded,
}

/// Session bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Session {
    /// Current session id.
    pub id: SessionId,
    /// Load progress of the current image.
    pub load: LoadState,
    /// Whether the next computed initial scale must also be pushed to the
    /// live engine as a reset. Cleared as soon as the reset is issued.
    pub pending_reset: bool,
}

impl Session {
    /// Creates the mount-time session.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            id: SessionId::FIRST,
            load: LoadState::Unloaded,
            pending_reset: false,
        }
    }

    /// Returns `true` once the current image has finished loading.
    #[must_use]
    pub fn image_loaded(&self) -> bool {
        self.load == LoadState::Loaded
    }

    /// Starts the session for a new image.
    ///
    /// The id moves forward, load progress is forgotten and the pending
    /// reset is set to `reset`.
    pub fn restart(&mut self, reset: bool) {
        self.id = self.id.next();
        self.load = LoadState::Unloaded;
        self.pending_reset = reset;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
