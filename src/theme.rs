// Copyright 2025 the Mixboard Authors
// SPDX-License-Identifier: Apache-2.0

//! Theme colors and constants
//!
//! All colors use hexadecimal format: Color::from_rgb8(0xRR, 0xGG, 0xBB)

use masonry::vello::peniko::Color;

// ============================================================================
// BASE COLORS -- Generic colors for UI, a dark to light gradient by default
// ============================================================================
const BASE_A: Color = Color::from_rgb8(0x10, 0x10, 0x10);
const BASE_B: Color = Color::from_rgb8(0x20, 0x20, 0x20);
const BASE_C: Color = Color::from_rgb8(0x30, 0x30, 0x30);
const BASE_D: Color = Color::from_rgb8(0x40, 0x40, 0x40);
const BASE_F: Color = Color::from_rgb8(0x60, 0x60, 0x60);
const BASE_H: Color = Color::from_rgb8(0x80, 0x80, 0x80);
const BASE_J: Color = Color::from_rgb8(0xa0, 0xa0, 0xa0);
const BASE_L: Color = Color::from_rgb8(0xc0, 0xc0, 0xc0);
const BASE_O: Color = Color::from_rgb8(0xf0, 0xf0, 0xf0);

// ============================================================================
// GLOBAL BACKGROUNDS
// ============================================================================
const APP_BACKGROUND: Color = BASE_B;

// ============================================================================
// SCENE DEFAULTS
// ============================================================================
const SCENE_DEFAULT: Color = BASE_L;
const SCENE_LINE_WIDTH: f64 = 1.5;

// ============================================================================
// SOURCES
// ============================================================================
const SOURCE_FILL: Color = BASE_H;
const SOURCE_OUTLINE: Color = BASE_L;
const SOURCE_CURRENT: Color = Color::from_rgb8(0xff, 0xaa, 0x33);
const SOURCE_SELECTED: Color = Color::from_rgb8(0xff, 0xee, 0x55);
const SOURCE_LOCKED: Color = BASE_F;

// ============================================================================
// MIXING VIEW
// ============================================================================
const MIXING_CIRCLE: Color = BASE_C;
const MIXING_LIMBO: Color = BASE_A;
const MIXING_STASH: Color = BASE_D;
const MIXING_SLIDER: Color = Color::from_rgb8(0x57, 0x9a, 0xff);
const MIXING_BUTTON_WHITE: Color = BASE_O;
const MIXING_BUTTON_BLACK: Color = BASE_A;

// ============================================================================
// GEOMETRY VIEW
// ============================================================================
const GEOMETRY_OUTPUT_FRAME: Color = BASE_J;
const GEOMETRY_HANDLE: Color = Color::from_rgb8(0x6a, 0xe7, 0x56);
const GEOMETRY_GUIDE: Color = Color::from_rgb8(0x20, 0x8e, 0x56);

// ============================================================================
// LAYER VIEW
// ============================================================================
const LAYER_AXIS: Color = BASE_F;

// ============================================================================
// TRANSITION VIEW
// ============================================================================
const TRANSITION_CROSS_FADE: Color = Color::from_rgb8(0x66, 0xcc, 0xdd);
const TRANSITION_FADE: Color = BASE_D;
const TRANSITION_MARK: Color = BASE_J;
const TRANSITION_OUTPUT: Color = BASE_H;

// ============================================================================
// APPEARANCE VIEW
// ============================================================================
const APPEARANCE_CHECKER: Color = BASE_D;
const APPEARANCE_FRAME: Color = BASE_L;
const APPEARANCE_HANDLE: Color = Color::from_rgb8(0xcc, 0x99, 0xff);
const APPEARANCE_SCALE_LINE: Color = Color::from_rgb8(0x99, 0x00, 0xff);

// ============================================================================
// PUBLIC API - Don't edit below this line unless you know what you're doing
// ============================================================================

/// Global application background color
pub mod app {
    use super::Color;
    pub const BACKGROUND: Color = super::APP_BACKGROUND;
}

/// Defaults applied to every scene node
pub mod scene {
    use super::Color;
    pub const DEFAULT: Color = super::SCENE_DEFAULT;
    /// Width of stroked outlines, in pixels
    pub const LINE_WIDTH: f64 = super::SCENE_LINE_WIDTH;
}

/// Colors for source tokens, cards and frames
pub mod source {
    use super::Color;
    pub const FILL: Color = super::SOURCE_FILL;
    pub const OUTLINE: Color = super::SOURCE_OUTLINE;
    /// Highlight of the current source
    pub const CURRENT: Color = super::SOURCE_CURRENT;
    pub const SELECTED: Color = super::SOURCE_SELECTED;
    pub const LOCKED: Color = super::SOURCE_LOCKED;
}

/// Colors for the mixing disk and its affordances
pub mod mixing {
    use super::Color;
    pub const CIRCLE: Color = super::MIXING_CIRCLE;
    pub const LIMBO: Color = super::MIXING_LIMBO;
    pub const STASH: Color = super::MIXING_STASH;
    pub const SLIDER: Color = super::MIXING_SLIDER;
    pub const BUTTON_WHITE: Color = super::MIXING_BUTTON_WHITE;
    pub const BUTTON_BLACK: Color = super::MIXING_BUTTON_BLACK;
}

/// Colors for the geometry view overlays
pub mod geometry {
    use super::Color;
    pub const OUTPUT_FRAME: Color = super::GEOMETRY_OUTPUT_FRAME;
    pub const HANDLE: Color = super::GEOMETRY_HANDLE;
    /// Transient guides shown while rotating or scaling
    pub const GUIDE: Color = super::GEOMETRY_GUIDE;
}

pub mod layer {
    use super::Color;
    pub const AXIS: Color = super::LAYER_AXIS;
}

/// Colors for the transition timeline
pub mod transition {
    use super::Color;
    pub const CROSS_FADE: Color = super::TRANSITION_CROSS_FADE;
    pub const FADE: Color = super::TRANSITION_FADE;
    pub const MARK: Color = super::TRANSITION_MARK;
    pub const OUTPUT: Color = super::TRANSITION_OUTPUT;
}

/// Colors for texture editing
pub mod appearance {
    use super::Color;
    pub const CHECKER: Color = super::APPEARANCE_CHECKER;
    pub const FRAME: Color = super::APPEARANCE_FRAME;
    pub const HANDLE: Color = super::APPEARANCE_HANDLE;
    pub const SCALE_LINE: Color = super::APPEARANCE_SCALE_LINE;
}

/// Colors for the output fading overlay
pub mod render {
    use super::Color;
    pub const FADE_BLACK: Color = super::BASE_A;
    pub const FADE_WHITE: Color = super::BASE_O;
}
