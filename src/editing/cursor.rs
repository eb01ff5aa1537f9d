// Copyright 2025 the Mixboard Authors
// SPDX-License-Identifier: Apache-2.0

//! Cursor feedback returned by gesture steps

use serde::Serialize;

/// Pointer icon requested by a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorType {
    #[default]
    Arrow,
    TextInput,
    ResizeAll,
    ResizeNS,
    ResizeEW,
    ResizeNESW,
    ResizeNWSE,
    Hand,
    NotAllowed,
}

/// Icon plus tooltip text, consumed immediately by the input layer.
///
/// The default cursor (arrow, no info) from `grab` means nothing was grabbed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Cursor {
    #[serde(rename = "type")]
    pub kind: CursorType,
    pub info: String,
}

impl Cursor {
    pub fn new(kind: CursorType, info: impl Into<String>) -> Self {
        Self {
            kind,
            info: info.into(),
        }
    }

    pub fn of(kind: CursorType) -> Self {
        Self {
            kind,
            info: String::new(),
        }
    }

    /// Whether this is the "nothing grabbed" cursor
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}
