// Copyright 2026 Webcheck Contributors
// SPDX-License-Identifier: Apache-2.0

//! Webcheck runtime: extractors, renderers, and the batch runner that feed
//! the core constraint verifier.
//!
//! This library crate exposes the modules for integration testing.

pub mod batch;
pub mod cli;
pub mod config;
pub mod extraction;
pub mod renderer;
