// Copyright 2025 the Mixboard Authors
// SPDX-License-Identifier: Apache-2.0

//! Sessions and the source wrapping one for a transition.
//!
//! The views never look inside a `Session`; the transition view only moves a
//! `SessionSource` along its timeline and hands the session back on detach.

use super::EntityId;

/// An opaque mixing session (a full set of sources and their settings)
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    uid: EntityId,
    pub name: String,
}

impl Session {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uid: EntityId::next(),
            name: name.into(),
        }
    }

    pub fn uid(&self) -> EntityId {
        self.uid
    }
}

/// A source presenting a whole session, used as the target of a transition
#[derive(Debug, Clone)]
pub struct SessionSource {
    session: Session,
    progress: f64,
    pub aspect_ratio: f64,
}

impl SessionSource {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            progress: 0.0,
            aspect_ratio: 16.0 / 9.0,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Give the session back, consuming the wrapper
    pub fn into_session(self) -> Session {
        self.session
    }

    /// Transition progress in `[0, 1]`
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn set_progress(&mut self, progress: f64) {
        self.progress = progress.clamp(0.0, 1.0);
    }

    /// Opacity of the incoming session during a cross fade
    pub fn alpha(&self) -> f64 {
        self.progress
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_clamped() {
        let mut source = SessionSource::new(Session::new("next"));
        source.set_progress(1.7);
        assert_eq!(source.progress(), 1.0);
        source.set_progress(-0.2);
        assert_eq!(source.progress(), 0.0);
    }

    #[test]
    fn into_session_returns_same_session() {
        let session = Session::new("next");
        let uid = session.uid();
        let source = SessionSource::new(session);
        assert_eq!(source.into_session().uid(), uid);
    }
}
