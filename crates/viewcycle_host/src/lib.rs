//! viewcycle_host
//!
//! Host-facing adapter layer on top of `viewcycle_core`.
//! A concrete host-bound type owns one of the hosts here and forwards its
//! notifications as events; lifecycle semantics stay in the core crate.

pub mod activity;
pub mod config;
pub mod error;
pub mod fragment;

pub use activity::{ActivityEvent, ActivityHost};
pub use config::HostConfig;
pub use error::log_core_error;
pub use fragment::{FragmentEvent, FragmentEventFor, FragmentHost};

// Re-export core types host users commonly need.
pub use viewcycle_core::error::{CoreError, Result};
pub use viewcycle_core::lifecycle::{HostCapabilities, HostCall, LifecycleOwner};
