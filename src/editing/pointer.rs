// Copyright 2025 the Mixboard Authors
// SPDX-License-Identifier: Apache-2.0

//! Press-to-release pointer state for the pick-once, grab-repeatedly protocol

use crate::model::SourceId;
use crate::scene::Pick;
use kurbo::Point;

/// What the pointer went down on, kept unchanged until release
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerGesture {
    /// Screen point of the press
    pub origin: Point,
    /// Latest screen point seen
    pub last: Point,
    /// Pick captured at the press
    pub pick: Option<Pick>,
    /// Source resolved from the pick
    pub source: Option<SourceId>,
}

impl PointerGesture {
    pub fn new(origin: Point, pick: Option<Pick>, source: Option<SourceId>) -> Self {
        Self {
            origin,
            last: origin,
            pick,
            source,
        }
    }
}
