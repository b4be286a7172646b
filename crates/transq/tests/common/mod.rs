//! Shared test utilities for transq integration tests.
//!
//! This module provides:
//! - `TestHarness` wiring an in-memory store, a notification channel and a
//!   fake watch subsystem around a temp directory
//! - Builders for queue items and history records

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::{FakeWatchSubsystem, TestHarness};
