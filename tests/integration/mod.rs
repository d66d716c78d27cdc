//! Integration test suite for cato.
//!
//! These tests drive the public API the way a dashboard would: load a
//! snapshot, analyze it, scrub and play through its timeline, and swap in
//! newer snapshots mid-playback.
//!
//! # Test Categories
//!
//! - `analysis`: diagnostics and health scoring over realistic task sets
//! - `time_travel`: scale, axis and resolver working together
//! - `playback`: the playback clock driving a dashboard
//! - `dashboard`: snapshot swaps and frame consistency
//! - `configuration`: TOML config on disk
//! - `performance`: timing thresholds for large runs

mod fixtures;

mod configuration;
mod dashboard;
mod time_travel;
