//! viewcycle_core::lifecycle
//!
//! Host-agnostic lifecycle normalization for UI containers.
//! This module intentionally contains **no** host integration code.
//!
//! Key ideas:
//! - The host forwards its (quirky, partly optional) notification stream into a delegate
//! - The delegate emits a small, strictly ordered set of controller callbacks
//! - A registry fans the same callbacks out to secondary observers, with catch-up for
//!   late joiners and compensating teardown for early leavers
//! - Finish requests and focus reports raised mid-callback are staged and drained
//!   when the running call returns

mod activity;
mod call;
mod capabilities;
mod content;
mod controller;
mod finish;
mod fragment;
mod registry;
mod state;
mod tracker;

pub use activity::ActivityDelegate;
pub use call::HostCall;
pub use capabilities::HostCapabilities;
pub use content::{ContentView, Inflater, LayoutId, ViewId, WindowFocusListener};
pub use controller::{DialogController, LifecycleObserver, ObserverRef, ViewController};
pub use finish::FinishHandle;
pub use fragment::FragmentDelegate;
pub use registry::{ControllerLifecycle, LifecycleOwner, LifecycleRegistry};
pub use state::{
    ActivityState, ControllerState, FragmentState, ALL_ACTIVITY_STATES, ALL_FRAGMENT_STATES,
};
pub use tracker::LifecycleTracker;
