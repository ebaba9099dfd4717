//! # defs-core
//!
//! `Value`, `FunctionData`, the `Function`/`Service` trait objects, their
//! name-keyed registries, the transport-abstract `Portal` contract, and the
//! in-process (`LocalPortal`), mock/recording (`TestingPortal`), and
//! scheme-dispatching (`PortalRegistry`) implementations of it. HTTP and
//! WebSocket portals live in their own crates (`modules/portal-http`,
//! `modules/portal-ws`) since they pull in a much heavier dependency stack.

pub mod error;
pub mod function;
pub mod function_data;
pub mod function_registry;
pub mod local_portal;
pub mod portal;
pub mod portal_registry;
pub mod service;
pub mod service_registry;
pub mod testing_portal;

pub use error::CallError;
pub use function::{Function, SimpleFunction};
pub use function_data::FunctionData;
pub use function_registry::FunctionRegistry;
pub use local_portal::LocalPortal;
pub use portal::Portal;
pub use portal_registry::PortalRegistry;
pub use service::{Service, ServiceLifecycle, ServiceState};
pub use service_registry::ServiceRegistry;
pub use testing_portal::{FunctionCall, TestingPortal};

/// Arbitrary dynamic value validated against a `Schema`. Re-exported from
/// `serde_json` rather than hand-rolled — see SPEC_FULL.md §3.2.
pub use serde_json::Value;
