//! LEXHOLD Test Utilities
//!
//! Centralized test infrastructure for the LEXHOLD workspace:
//! - Proptest generators for hold names and operation sequences
//! - A file plan fixture wired to in-memory store, oracle and hooks
//! - A recording hook that captures every dispatched event
//! - Custom assertions, including the frozen-state invariant checker

use lexhold_core::{ClassName, HoldResult};
use lexhold_events::{HoldEvent, HoldHook, HookHandle, HookPoint, HookRegistry};
use std::sync::{Arc, Mutex, Once};

// ============================================================================
// TRACING
// ============================================================================

static TRACING: Once = Once::new();

/// Install a test-writer subscriber filtered by `RUST_LOG`. Safe to call
/// from every test.
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// RECORDING HOOK
// ============================================================================

/// Hook that records every event it receives.
#[derive(Debug, Default)]
pub struct RecordingHook {
    events: Mutex<Vec<HoldEvent>>,
}

impl RecordingHook {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register this hook for every hook point on `class`.
    pub fn attach(
        self: &Arc<Self>,
        registry: &HookRegistry,
        class: impl Into<ClassName>,
    ) -> HoldResult<Vec<HookHandle>> {
        let class = class.into();
        HookPoint::ALL
            .into_iter()
            .map(|point| registry.register(point, class.clone(), Arc::clone(self) as Arc<dyn HoldHook>))
            .collect()
    }

    pub fn events(&self) -> Vec<HoldEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn points(&self) -> Vec<HookPoint> {
        self.events().iter().map(HoldEvent::hook_point).collect()
    }

    pub fn count(&self, point: HookPoint) -> usize {
        self.points().into_iter().filter(|p| *p == point).count()
    }

    pub fn is_empty(&self) -> bool {
        self.events().is_empty()
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl HoldHook for RecordingHook {
    fn handle(&self, event: &HoldEvent) -> HoldResult<()> {
        tracing::debug!(point = %event.hook_point(), "Recorded hold event");
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
        Ok(())
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for hold scenarios.

    use proptest::prelude::*;

    /// A valid, non-blank hold name.
    pub fn arb_hold_name() -> impl Strategy<Value = String> {
        "[A-Z][A-Za-z0-9 _-]{0,24}[A-Za-z0-9]"
    }

    /// A non-blank hold reason.
    pub fn arb_hold_reason() -> impl Strategy<Value = String> {
        "[a-z]{3,12}( [a-z]{2,10}){0,4}"
    }

    /// One step of a hold membership scenario. Indices refer to the
    /// scenario's hold and item lists.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum HoldOp {
        Add { hold: usize, item: usize },
        Remove { hold: usize, item: usize },
        RemoveFromAll { item: usize },
        DeleteHold { hold: usize },
    }

    pub fn arb_hold_op(holds: usize, items: usize) -> impl Strategy<Value = HoldOp> {
        let holds = holds.max(1);
        let items = items.max(1);
        prop_oneof![
            4 => (0..holds, 0..items).prop_map(|(hold, item)| HoldOp::Add { hold, item }),
            3 => (0..holds, 0..items).prop_map(|(hold, item)| HoldOp::Remove { hold, item }),
            1 => (0..items).prop_map(|item| HoldOp::RemoveFromAll { item }),
            1 => (0..holds).prop_map(|hold| HoldOp::DeleteHold { hold }),
        ]
    }

    pub fn arb_hold_op_sequence(
        holds: usize,
        items: usize,
        max_len: usize,
    ) -> impl Strategy<Value = Vec<HoldOp>> {
        proptest::collection::vec(arb_hold_op(holds, items), 1..=max_len.max(1))
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! A file plan wired to in-memory collaborators.

    use lexhold_core::{Aspect, HoldConfig, NodeId, NodeType, PropertyMap, Relation};
    use lexhold_engine::{HoldContext, HoldService};
    use lexhold_events::HookRegistry;
    use lexhold_storage::{MockNodeStore, MockPermissionOracle, NodeStore, PermissionOracle};
    use std::sync::Arc;

    /// Name of the user fixtures act as.
    pub const ADMIN: &str = "admin";

    pub struct FilePlanFixture {
        pub store: Arc<MockNodeStore>,
        pub oracle: Arc<MockPermissionOracle>,
        pub hooks: Arc<HookRegistry>,
        pub service: HoldService,
        pub file_plan: NodeId,
        documents: NodeId,
    }

    impl FilePlanFixture {
        pub fn new() -> Self {
            Self::with_config(HoldConfig::default())
        }

        pub fn with_config(config: HoldConfig) -> Self {
            let store = Arc::new(MockNodeStore::new());
            let oracle = Arc::new(MockPermissionOracle::new());
            let hooks = Arc::new(HookRegistry::new());
            let service = HoldService::new(
                Arc::clone(&store) as Arc<dyn NodeStore>,
                Arc::clone(&oracle) as Arc<dyn PermissionOracle>,
                Arc::clone(&hooks),
                config,
            )
            .expect("valid hold config");
            let file_plan = store
                .create_root("File Plan", NodeType::FilePlan, PropertyMap::new())
                .expect("create file plan");
            let documents = store
                .create_root("Documents", NodeType::Folder, PropertyMap::new())
                .expect("create document library");
            Self {
                store,
                oracle,
                hooks,
                service,
                file_plan,
                documents,
            }
        }

        /// Context for the fixture admin.
        pub fn admin(&self) -> HoldContext {
            self.service.context(ADMIN)
        }

        pub fn ctx(&self, user: &str) -> HoldContext {
            self.service.context(user)
        }

        pub fn record_folder(&self, name: &str) -> NodeId {
            self.store
                .create_node(
                    self.file_plan,
                    Relation::Contains,
                    name,
                    NodeType::RecordFolder,
                    PropertyMap::new(),
                )
                .expect("create record folder")
        }

        /// A declared record filed in `folder`.
        pub fn record(&self, folder: NodeId, name: &str) -> NodeId {
            let record = self
                .store
                .create_node(folder, Relation::Contains, name, NodeType::Content, PropertyMap::new())
                .expect("create record");
            self.store
                .add_aspect(record, Aspect::Record, PropertyMap::new())
                .expect("declare record");
            record
        }

        /// Generic content outside the file plan.
        pub fn content(&self, name: &str) -> NodeId {
            self.store
                .create_node(
                    self.documents,
                    Relation::Contains,
                    name,
                    NodeType::Content,
                    PropertyMap::new(),
                )
                .expect("create content")
        }

        pub fn hold(&self, name: &str) -> NodeId {
            self.service
                .create_hold(&self.admin(), self.file_plan, name, "Fixture reason", None)
                .expect("create hold")
        }

        /// Another file plan sharing the fixture's store.
        pub fn second_file_plan(&self, name: &str) -> NodeId {
            self.store
                .create_root(name, NodeType::FilePlan, PropertyMap::new())
                .expect("create file plan")
        }
    }

    impl Default for FilePlanFixture {
        fn default() -> Self {
            Self::new()
        }
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Custom assertion functions for LEXHOLD-specific validation.

    use lexhold_core::{Aspect, ErrorKind, HoldResult, NodeId, Relation};
    use lexhold_engine::HoldService;
    use lexhold_storage::NodeStoreExt;

    #[track_caller]
    pub fn assert_frozen(service: &HoldService, node: NodeId) {
        assert!(
            service.is_frozen(node).expect("frozen lookup"),
            "Expected {} to be frozen",
            node
        );
    }

    #[track_caller]
    pub fn assert_not_frozen(service: &HoldService, node: NodeId) {
        assert!(
            !service.is_frozen(node).expect("frozen lookup"),
            "Expected {} not to be frozen",
            node
        );
    }

    /// Assert that a result failed with the given error kind.
    #[track_caller]
    pub fn assert_error_kind<T: std::fmt::Debug>(result: &HoldResult<T>, kind: ErrorKind) {
        match result {
            Err(e) => assert_eq!(e.kind(), kind, "Wrong error kind for {:?}", e),
            Ok(v) => panic!("Expected {} error, got Ok({:?})", kind, v),
        }
    }

    /// Assert that each node is frozen exactly when some hold holds it
    /// directly, or it is a record filed in a frozen record folder.
    #[track_caller]
    pub fn assert_frozen_invariant(service: &HoldService, nodes: &[NodeId]) {
        let store = service.store();
        for &node in nodes {
            if !store.exists(node).expect("exists") {
                continue;
            }
            let directly_held = !store
                .get_parents(node, Relation::FrozenContent)
                .expect("frozen-by parents")
                .is_empty();
            let via_folder = store.is_record(node).expect("record check")
                && store
                    .record_folders_of(node)
                    .expect("record folders")
                    .into_iter()
                    .any(|folder| store.has_aspect(folder, &Aspect::Frozen).unwrap_or(false));
            let expected = directly_held || via_folder;
            let actual = service.is_frozen(node).expect("frozen lookup");
            assert_eq!(
                actual, expected,
                "Frozen invariant broken for {}: frozen={}, directly_held={}, via_folder={}",
                node, actual, directly_held, via_folder
            );
        }
    }
}
