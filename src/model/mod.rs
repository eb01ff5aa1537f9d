// Copyright 2025 the Mixboard Authors
// SPDX-License-Identifier: Apache-2.0

//! Data model: sources, sessions and their identities

pub mod entity_id;
pub mod session;
pub mod source;

pub use entity_id::EntityId;
pub use session::{Session, SessionSource};
pub use source::{Appearance, Source, SourceId, SourceList, SourceStore};
