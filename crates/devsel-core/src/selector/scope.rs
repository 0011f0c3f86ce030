//! Thread-local scope stack and the RAII guard for scoped overrides.
//!
//! Every thread owns one stack shared by all selectors; entries are tagged
//! with the selector that pushed them so independent selectors never see
//! each other's overrides.

use crate::core::device::Device;
use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Identity of a [`DeviceSelector`](super::DeviceSelector).
#[repr(transparent)]
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub(crate) struct SelectorId(usize);

impl SelectorId {
    pub(crate) fn new() -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

#[repr(transparent)]
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
struct ScopeId(usize);

impl ScopeId {
    fn new() -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Copy, Clone, Debug)]
struct ScopeEntry {
    selector: SelectorId,
    scope: ScopeId,
    device: Device,
}

thread_local! {
    static SCOPE_STACK: RefCell<Vec<ScopeEntry>> = const { RefCell::new(Vec::new()) };
}

/// Device of the innermost scope opened by `selector` on this thread.
pub(crate) fn innermost_device(selector: SelectorId) -> Option<Device> {
    SCOPE_STACK.with(|stack| {
        stack
            .borrow()
            .iter()
            .rev()
            .find(|entry| entry.selector == selector)
            .map(|entry| entry.device)
    })
}

/// Number of scopes opened by `selector` on this thread.
pub(crate) fn depth(selector: SelectorId) -> usize {
    SCOPE_STACK.with(|stack| {
        stack
            .borrow()
            .iter()
            .filter(|entry| entry.selector == selector)
            .count()
    })
}

fn push_scope(selector: SelectorId, device: Device) -> ScopeId {
    let scope = ScopeId::new();
    SCOPE_STACK.with(|stack| {
        stack.borrow_mut().push(ScopeEntry {
            selector,
            scope,
            device,
        });
    });
    scope
}

fn pop_scope(scope: ScopeId) {
    // The stack may already be gone while the thread is shutting down.
    let _ = SCOPE_STACK.try_with(|stack| {
        let mut stack = stack.borrow_mut();
        if let Some(pos) = stack.iter().rposition(|entry| entry.scope == scope) {
            stack.remove(pos);
        }
    });
}

/// Guard for a scoped device override.
///
/// While the guard is alive, its device is the effective device of the
/// selector that created it on the current thread. Dropping the guard
/// restores whatever was effective before, on every exit path: normal
/// completion, `?` early returns and unwinding panics alike.
///
/// The guard is neither `Send` nor `Sync`: a scope belongs to the thread
/// that opened it.
#[must_use = "the override ends as soon as the guard is dropped"]
#[derive(Debug)]
pub struct DeviceScope {
    scope: ScopeId,
    device: Device,
    previous: Device,
    _not_send: PhantomData<*const ()>,
}

impl DeviceScope {
    pub(crate) fn enter(selector: SelectorId, device: Device, previous: Device) -> Self {
        let scope = push_scope(selector, device);
        debug!(%device, %previous, "entered device scope");
        Self {
            scope,
            device,
            previous,
            _not_send: PhantomData,
        }
    }

    /// Device this scope makes effective.
    pub fn device(&self) -> Device {
        self.device
    }

    /// Device that was effective when the scope was entered.
    pub fn previous(&self) -> Device {
        self.previous
    }
}

impl Drop for DeviceScope {
    fn drop(&mut self) {
        pop_scope(self.scope);
        debug!(device = %self.device, "left device scope");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_push_and_pop() {
        let selector = SelectorId::new();
        assert_eq!(innermost_device(selector), None);
        assert_eq!(depth(selector), 0);

        let outer = DeviceScope::enter(selector, Device::Cpu, Device::Gpu);
        assert_eq!(innermost_device(selector), Some(Device::Cpu));
        assert_eq!(outer.previous(), Device::Gpu);

        {
            let inner = DeviceScope::enter(selector, Device::Gpu, Device::Cpu);
            assert_eq!(inner.device(), Device::Gpu);
            assert_eq!(innermost_device(selector), Some(Device::Gpu));
            assert_eq!(depth(selector), 2);
        }

        assert_eq!(innermost_device(selector), Some(Device::Cpu));
        drop(outer);
        assert_eq!(innermost_device(selector), None);
    }

    #[test]
    fn test_scopes_are_tagged_by_selector() {
        let a = SelectorId::new();
        let b = SelectorId::new();
        assert_ne!(a, b);

        let _scope_a = DeviceScope::enter(a, Device::Cpu, Device::Gpu);
        assert_eq!(innermost_device(a), Some(Device::Cpu));
        assert_eq!(innermost_device(b), None);

        let _scope_b = DeviceScope::enter(b, Device::Gpu, Device::Gpu);
        assert_eq!(innermost_device(a), Some(Device::Cpu));
        assert_eq!(innermost_device(b), Some(Device::Gpu));
    }

    #[test]
    fn test_out_of_order_drop() {
        let selector = SelectorId::new();
        let outer = DeviceScope::enter(selector, Device::Cpu, Device::Gpu);
        let inner = DeviceScope::enter(selector, Device::Gpu, Device::Cpu);

        // Dropping the outer guard first only removes its own entry
        drop(outer);
        assert_eq!(innermost_device(selector), Some(Device::Gpu));
        assert_eq!(depth(selector), 1);

        drop(inner);
        assert_eq!(innermost_device(selector), None);
    }
}
