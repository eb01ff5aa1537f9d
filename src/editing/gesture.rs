// Copyright 2025 the Mixboard Authors
// SPDX-License-Identifier: Apache-2.0

//! Gesture bracket state machine.
//!
//! A gesture is `initiate → (drag | grab)* → terminate`. Starting a gesture
//! captures the state every later step is computed from, so a grab always
//! measures from where the pointer went down even when the dragged object has
//! moved since.

use super::viewport::ViewPort;
use crate::mixer::Mixer;
use crate::model::{Source, SourceId};
use std::collections::HashMap;

/// State captured when a gesture starts
#[derive(Debug, Clone)]
pub struct GestureStart {
    pub viewport: ViewPort,
    pub sources: HashMap<SourceId, Source>,
    pub fading: f64,
}

impl GestureStart {
    pub fn capture(viewport: ViewPort, mixer: &Mixer) -> Self {
        Self {
            viewport,
            sources: mixer
                .sources
                .iter()
                .map(|(id, source)| (id, source.clone()))
                .collect(),
            fading: mixer.fading(),
        }
    }

    /// A source as it was when the gesture started
    pub fn source(&self, id: SourceId) -> Option<&Source> {
        self.sources.get(&id)
    }
}

/// Whether a view is between `initiate` and `terminate`
#[derive(Debug, Clone, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Active(GestureStart),
}

impl Gesture {
    pub fn is_active(&self) -> bool {
        matches!(self, Gesture::Active(_))
    }

    /// # Panics
    ///
    /// Panics if a gesture is already in progress.
    pub fn begin(&mut self, start: GestureStart) {
        assert!(
            !self.is_active(),
            "initiate called while a gesture is already in progress"
        );
        *self = Gesture::Active(start);
    }

    /// # Panics
    ///
    /// Panics if no gesture is in progress.
    pub fn end(&mut self) -> GestureStart {
        match std::mem::take(self) {
            Gesture::Active(start) => start,
            Gesture::Idle => panic!("terminate called without a matching initiate"),
        }
    }

    /// State captured at `initiate`.
    ///
    /// # Panics
    ///
    /// Panics outside of an `initiate`/`terminate` bracket.
    pub fn start(&self) -> &GestureStart {
        match self {
            Gesture::Active(start) => start,
            Gesture::Idle => panic!("grab or drag called outside of an initiate/terminate bracket"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> GestureStart {
        GestureStart::capture(ViewPort::default(), &Mixer::new())
    }

    #[test]
    fn bracket_round_trip() {
        let mut gesture = Gesture::default();
        assert!(!gesture.is_active());
        gesture.begin(start());
        assert!(gesture.is_active());
        gesture.end();
        assert!(!gesture.is_active());
    }

    #[test]
    #[should_panic(expected = "already in progress")]
    fn nested_initiate_panics() {
        let mut gesture = Gesture::default();
        gesture.begin(start());
        gesture.begin(start());
    }

    #[test]
    #[should_panic(expected = "without a matching initiate")]
    fn unmatched_terminate_panics() {
        Gesture::default().end();
    }

    #[test]
    #[should_panic(expected = "outside of an initiate/terminate bracket")]
    fn grab_without_gesture_panics() {
        Gesture::default().start();
    }
}
