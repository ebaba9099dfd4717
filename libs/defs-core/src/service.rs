use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use defs_schema::ServiceSchema;
use tokio_util::sync::CancellationToken;

use crate::function::Function;

/// A Service binds a `ServiceSchema` to a set of method `Function`s.
/// Lifecycle transitions (`start`/`stop`) and the `Healthy` flag are the
/// implementor's responsibility to synchronize — `ServiceLifecycle` below
/// is a ready-made helper for the common case.
#[async_trait]
pub trait Service: Send + Sync {
    fn name(&self) -> &str;

    fn schema(&self) -> &ServiceSchema;

    fn get_method(&self, name: &str) -> Option<Arc<dyn Function>>;

    async fn start(&self, _ctx: CancellationToken) -> anyhow::Result<()> {
        Ok(())
    }

    async fn stop(&self, _ctx: CancellationToken) -> anyhow::Result<()> {
        Ok(())
    }

    fn status(&self) -> ServiceState {
        ServiceState::Running
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ServiceState {
    Stopped = 0,
    Starting = 1,
    Running = 2,
    Stopping = 3,
}

impl ServiceState {
    const fn from_u8(v: u8) -> Self {
        match v {
            1 => ServiceState::Starting,
            2 => ServiceState::Running,
            3 => ServiceState::Stopping,
            _ => ServiceState::Stopped,
        }
    }
}

/// Shared state-machine helper for `Service` implementors that don't need
/// anything fancier than `Stopped -> Starting -> Running -> Stopping ->
/// Stopped` plus a `healthy` flag, grounded on the same atomic-repr
/// pattern used elsewhere in this codebase for lock-free status reads.
#[derive(Default)]
pub struct ServiceLifecycle {
    state: AtomicU8,
    healthy: AtomicBool,
}

impl ServiceLifecycle {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(ServiceState::Stopped as u8),
            healthy: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> ServiceState {
        ServiceState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn set_state(&self, state: ServiceState) {
        self.state.store(state as u8, Ordering::Release);
    }

    pub fn healthy(&self) -> bool {
        self.healthy.load(Ordering::Acquire)
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_starts_stopped_and_unhealthy() {
        let lc = ServiceLifecycle::new();
        assert_eq!(lc.state(), ServiceState::Stopped);
        assert!(!lc.healthy());
        lc.set_state(ServiceState::Running);
        lc.set_healthy(true);
        assert_eq!(lc.state(), ServiceState::Running);
        assert!(lc.healthy());
    }
}
