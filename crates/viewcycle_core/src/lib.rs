//! viewcycle_core: host-agnostic lifecycle delegates for UI containers.
//!
//! Design goals:
//! - Pure, testable logic (no host framework deps).
//! - Explicit types; no macro wizardry.
//! - Single control thread; reentrancy handled by staging, not locks.

pub mod error;

/// Lifecycle delegates, controller contract and observer registry.
pub mod lifecycle;
