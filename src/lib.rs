// Copyright 2025 the Mixboard Authors
// SPDX-License-Identifier: Apache-2.0

//! Mixboard: the interaction core of a live video mixer.
//!
//! Sources are shown by several editing views at once (mixing, geometry,
//! layers, appearance, transition, output), each with its own scene graph,
//! camera and gesture handling over the shared [`mixer::Mixer`] state.

use anyhow::Context;
use std::path::PathBuf;

pub mod compositor;
pub mod editing;
pub mod error;
pub mod frame_buffer;
pub mod mixer;
pub mod model;
pub mod preferences;
pub mod scene;
pub mod script;
pub mod settings;
pub mod theme;
pub mod views;

use compositor::Compositor;
use preferences::Preferences;
use script::Script;

/// Entry point for the replay driver
///
/// Usage: `mixboard <script.json> [preferences.toml]`
pub fn run() -> anyhow::Result<()> {
    // Initialize tracing subscriber (can be controlled via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mixboard=info".parse().context("Invalid log directive")?),
        )
        .init();

    let mut args = std::env::args_os().skip(1);
    let Some(script_path) = args.next().map(PathBuf::from) else {
        anyhow::bail!("Usage: mixboard <script.json> [preferences.toml]");
    };
    let prefs_path = args.next().map(PathBuf::from);

    let mut prefs = match &prefs_path {
        Some(path) if path.exists() => Preferences::load(path)?,
        _ => Preferences::default(),
    };

    let script = Script::load(&script_path)?;
    let mut compositor = Compositor::new(&prefs);
    let report = script::replay(&script, &mut compositor)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("Failed to encode report")?
    );

    if let Some(path) = prefs_path {
        compositor.save_settings(&mut prefs);
        prefs.save(&path)?;
    }
    Ok(())
}
