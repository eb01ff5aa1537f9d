// Copyright 2025 the Mixboard Authors
// SPDX-License-Identifier: Apache-2.0

//! Interaction plumbing shared by every view

pub mod cursor;
pub mod gesture;
pub mod pointer;
pub mod selection;
pub mod viewport;

pub use cursor::{Cursor, CursorType};
pub use gesture::{Gesture, GestureStart};
pub use pointer::PointerGesture;
pub use selection::Selection;
pub use viewport::{ViewPort, ZoomRange};
