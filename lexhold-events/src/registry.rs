//! Hook registry: class-keyed handler lists and de-duplicating dispatch.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use lexhold_core::{ClassName, HoldResult, StorageError};

use super::hooks::{HoldEvent, HoldHook, HookPoint};

/// Identifies one registration. Handles are ordered by registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HookHandle(u64);

struct Registration {
    point: HookPoint,
    class: ClassName,
    hook: Arc<dyn HoldHook>,
}

#[derive(Default)]
struct RegistryInner {
    next_handle: u64,
    registrations: HashMap<HookHandle, Registration>,
    hook_index: HashMap<(HookPoint, ClassName), Vec<HookHandle>>,
}

/// Registry of hold hooks, organized by hook point and class name.
///
/// Dispatch snapshots the matching handlers and releases the lock before
/// invoking them, so handlers may register or unregister hooks.
#[derive(Default)]
pub struct HookRegistry {
    inner: RwLock<RegistryInner>,
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.inner.read().map(|i| i.registrations.len()).ok();
        f.debug_struct("HookRegistry")
            .field("registrations", &count)
            .finish()
    }
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `point` on nodes of `class`.
    pub fn register(
        &self,
        point: HookPoint,
        class: impl Into<ClassName>,
        hook: Arc<dyn HoldHook>,
    ) -> HoldResult<HookHandle> {
        let class = class.into();
        let mut inner = self.inner.write().map_err(|_| StorageError::LockPoisoned)?;
        let handle = HookHandle(inner.next_handle);
        inner.next_handle += 1;
        inner
            .hook_index
            .entry((point, class.clone()))
            .or_default()
            .push(handle);
        tracing::debug!(point = %point, class = %class, handle = handle.0, "Hook registered");
        inner.registrations.insert(handle, Registration { point, class, hook });
        Ok(handle)
    }

    /// Register a closure handler.
    pub fn register_fn<F>(
        &self,
        point: HookPoint,
        class: impl Into<ClassName>,
        hook: F,
    ) -> HoldResult<HookHandle>
    where
        F: Fn(&HoldEvent) -> HoldResult<()> + Send + Sync + 'static,
    {
        self.register(point, class, Arc::new(hook))
    }

    /// Remove a registration. Returns whether it existed.
    pub fn unregister(&self, handle: HookHandle) -> HoldResult<bool> {
        let mut inner = self.inner.write().map_err(|_| StorageError::LockPoisoned)?;
        let Some(registration) = inner.registrations.remove(&handle) else {
            return Ok(false);
        };
        let key = (registration.point, registration.class);
        if let Some(handles) = inner.hook_index.get_mut(&key) {
            handles.retain(|h| *h != handle);
            if handles.is_empty() {
                inner.hook_index.remove(&key);
            }
        }
        Ok(true)
    }

    /// Number of registrations for a hook point across all classes.
    pub fn handler_count(&self, point: HookPoint) -> HoldResult<usize> {
        let inner = self.inner.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(inner
            .registrations
            .values()
            .filter(|r| r.point == point)
            .count())
    }

    /// Invoke every handler registered for the event's point on any class
    /// in `classes`.
    ///
    /// Each distinct handler runs once, in registration order. The first
    /// handler error stops dispatch and is returned.
    pub fn dispatch(&self, event: &HoldEvent, classes: &[ClassName]) -> HoldResult<()> {
        let point = event.hook_point();
        let hooks = self.matching(point, classes)?;
        if hooks.is_empty() {
            return Ok(());
        }

        tracing::debug!(point = %point, handlers = hooks.len(), "Dispatching hold hook");
        for hook in hooks {
            if let Err(e) = hook.handle(event) {
                tracing::warn!(point = %point, error = %e, "Hold hook failed");
                return Err(e);
            }
        }
        Ok(())
    }

    fn matching(&self, point: HookPoint, classes: &[ClassName]) -> HoldResult<Vec<Arc<dyn HoldHook>>> {
        let inner = self.inner.read().map_err(|_| StorageError::LockPoisoned)?;

        let mut handles: Vec<HookHandle> = classes
            .iter()
            .filter_map(|class| inner.hook_index.get(&(point, class.clone())))
            .flatten()
            .copied()
            .collect();
        handles.sort_unstable();
        handles.dedup();

        let mut seen = HashSet::new();
        let mut hooks = Vec::with_capacity(handles.len());
        for handle in handles {
            if let Some(registration) = inner.registrations.get(&handle) {
                let identity = Arc::as_ptr(&registration.hook) as *const () as usize;
                if seen.insert(identity) {
                    hooks.push(Arc::clone(&registration.hook));
                }
            }
        }
        Ok(hooks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexhold_core::{Aspect, IntegrityError, NodeId, NodeType};
    use std::sync::Mutex;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) -> Arc<dyn HoldHook>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_for_make = Arc::clone(&log);
        let make = move |tag: &str| -> Arc<dyn HoldHook> {
            let log = Arc::clone(&log_for_make);
            let tag = tag.to_string();
            Arc::new(move |_: &HoldEvent| -> HoldResult<()> {
                log.lock().unwrap().push(tag.clone());
                Ok(())
            })
        };
        (log, make)
    }

    fn created() -> HoldEvent {
        HoldEvent::OnCreateHold {
            hold: NodeId::new(),
        }
    }

    #[test]
    fn test_zero_handlers_is_noop() {
        let registry = HookRegistry::new();
        registry
            .dispatch(&created(), &[ClassName::Type(NodeType::Hold)])
            .unwrap();
        assert_eq!(registry.handler_count(HookPoint::OnCreateHold).unwrap(), 0);
    }

    #[test]
    fn test_dispatch_unions_classes_in_registration_order() {
        let registry = HookRegistry::new();
        let (log, make) = recorder();
        registry
            .register(HookPoint::OnCreateHold, Aspect::Custom("audited".into()), make("aspect"))
            .unwrap();
        registry
            .register(HookPoint::OnCreateHold, NodeType::Hold, make("type"))
            .unwrap();
        registry
            .register(HookPoint::OnCreateHold, NodeType::Folder, make("other"))
            .unwrap();

        registry
            .dispatch(
                &created(),
                &[
                    ClassName::Type(NodeType::Hold),
                    ClassName::Aspect(Aspect::Custom("audited".into())),
                ],
            )
            .unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["aspect", "type"]);
    }

    #[test]
    fn test_same_handler_on_two_classes_runs_once() {
        let registry = HookRegistry::new();
        let (log, make) = recorder();
        let shared = make("shared");
        registry
            .register(HookPoint::OnCreateHold, NodeType::Hold, Arc::clone(&shared))
            .unwrap();
        registry
            .register(HookPoint::OnCreateHold, Aspect::Frozen, shared)
            .unwrap();

        registry
            .dispatch(
                &created(),
                &[
                    ClassName::Type(NodeType::Hold),
                    ClassName::Aspect(Aspect::Frozen),
                ],
            )
            .unwrap();

        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_point_mismatch_not_invoked() {
        let registry = HookRegistry::new();
        let (log, make) = recorder();
        registry
            .register(HookPoint::OnDeleteHold, NodeType::Hold, make("delete"))
            .unwrap();
        registry
            .dispatch(&created(), &[ClassName::Type(NodeType::Hold)])
            .unwrap();
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_first_error_aborts_dispatch() {
        let registry = HookRegistry::new();
        let (log, make) = recorder();
        registry
            .register_fn(HookPoint::OnCreateHold, NodeType::Hold, |_: &HoldEvent| {
                Err(IntegrityError::InvalidHoldItemType {
                    name: "veto".to_string(),
                }
                .into())
            })
            .unwrap();
        registry
            .register(HookPoint::OnCreateHold, NodeType::Hold, make("after"))
            .unwrap();

        let result = registry.dispatch(&created(), &[ClassName::Type(NodeType::Hold)]);
        assert!(result.is_err());
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unregister() {
        let registry = HookRegistry::new();
        let (log, make) = recorder();
        let handle = registry
            .register(HookPoint::OnCreateHold, NodeType::Hold, make("gone"))
            .unwrap();
        assert_eq!(registry.handler_count(HookPoint::OnCreateHold).unwrap(), 1);

        assert!(registry.unregister(handle).unwrap());
        assert!(!registry.unregister(handle).unwrap());
        assert_eq!(registry.handler_count(HookPoint::OnCreateHold).unwrap(), 0);

        registry
            .dispatch(&created(), &[ClassName::Type(NodeType::Hold)])
            .unwrap();
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_handler_may_register_during_dispatch() {
        let registry = Arc::new(HookRegistry::new());
        let inner = Arc::clone(&registry);
        registry
            .register_fn(HookPoint::OnCreateHold, NodeType::Hold, move |_: &HoldEvent| {
                inner.register_fn(HookPoint::OnDeleteHold, NodeType::Hold, |_: &HoldEvent| Ok(()))?;
                Ok(())
            })
            .unwrap();

        registry
            .dispatch(&created(), &[ClassName::Type(NodeType::Hold)])
            .unwrap();
        assert_eq!(registry.handler_count(HookPoint::OnDeleteHold).unwrap(), 1);
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use lexhold_core::{NodeId, NodeType};
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// A handler registered under any number of the dispatched classes runs once.
        #[test]
        fn prop_dedup_by_identity(copies in 1usize..6) {
            let registry = HookRegistry::new();
            let calls = Arc::new(AtomicUsize::new(0));
            let counter = Arc::clone(&calls);
            let hook: Arc<dyn HoldHook> = Arc::new(move |_: &HoldEvent| -> HoldResult<()> {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
            let classes = [
                ClassName::Type(NodeType::Hold),
                ClassName::Type(NodeType::Content),
                ClassName::Type(NodeType::Folder),
                ClassName::Type(NodeType::RecordFolder),
                ClassName::Type(NodeType::FilePlan),
            ];
            for class in classes.iter().take(copies) {
                registry.register(HookPoint::OnCreateHold, class.clone(), Arc::clone(&hook)).unwrap();
            }

            registry.dispatch(&HoldEvent::OnCreateHold { hold: NodeId::new() }, &classes).unwrap();
            prop_assert_eq!(calls.load(Ordering::SeqCst), 1);
            prop_assert_eq!(registry.handler_count(HookPoint::OnCreateHold).unwrap(), copies);
        }
    }
}
