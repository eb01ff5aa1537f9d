// Copyright 2025 the Mixboard Authors
// SPDX-License-Identifier: Apache-2.0

//! Mixboard replay driver

fn main() -> anyhow::Result<()> {
    mixboard::run()
}
