//! Integration tests for gex-dashboard.
//!
//! These tests drive the refresh pipeline against a local mock of the
//! market API:
//! - Single-flight and pause gating
//! - Per-card error isolation
//! - Filter and theme triggers

pub mod common;
