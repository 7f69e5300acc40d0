//! Hold service: queries and hold lifecycle

use crate::context::{HoldContext, Suppression};
use lexhold_core::{
    AccessError, AccessStatus, Actor, Aspect, Capability, ClassName, HoldConfig, HoldError,
    HoldResult, IntegrityError, NodeId, NodeType, Property, PropertyMap, PropertyValue, Relation,
    ValidationError,
};
use lexhold_events::{HoldEvent, HookRegistry};
use lexhold_storage::{NodeStore, NodeStoreExt, PermissionOracle};
use std::sync::Arc;

/// The hold engine.
///
/// Read operations take no context. Mutations take the [`HoldContext`] of
/// the calling operation; build one with [`HoldService::context`].
pub struct HoldService {
    pub(crate) store: Arc<dyn NodeStore>,
    pub(crate) oracle: Arc<dyn PermissionOracle>,
    pub(crate) hooks: Arc<HookRegistry>,
    pub(crate) config: HoldConfig,
}

impl std::fmt::Debug for HoldService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HoldService")
            .field("hooks", &self.hooks)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HoldService {
    pub fn new(
        store: Arc<dyn NodeStore>,
        oracle: Arc<dyn PermissionOracle>,
        hooks: Arc<HookRegistry>,
        config: HoldConfig,
    ) -> HoldResult<Self> {
        config.validate()?;
        Ok(Self {
            store,
            oracle,
            hooks,
            config,
        })
    }

    /// Context for an operation run by the user named `user`.
    pub fn context(&self, user: &str) -> HoldContext {
        HoldContext::new(Actor::user(user), Actor::system(&self.config.system_actor))
    }

    pub fn config(&self) -> &HoldConfig {
        &self.config
    }

    pub fn hooks(&self) -> &Arc<HookRegistry> {
        &self.hooks
    }

    pub fn store(&self) -> &Arc<dyn NodeStore> {
        &self.store
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Whether the node exists and is a hold.
    pub fn is_hold(&self, node: NodeId) -> HoldResult<bool> {
        Ok(self.store.exists(node)? && self.store.node_type(node)? == NodeType::Hold)
    }

    /// Holds of a file plan, in creation order.
    pub fn get_holds(&self, file_plan: NodeId) -> HoldResult<Vec<NodeId>> {
        self.require_present("file_plan", file_plan)?;
        let Some(container) = self.store.hold_container(file_plan)? else {
            return Ok(Vec::new());
        };
        let mut holds = Vec::new();
        for child in self.store.get_children(container, Relation::Contains)? {
            if self.is_hold(child)? {
                holds.push(child);
            }
        }
        Ok(holds)
    }

    /// Hold of a file plan by exact name.
    pub fn get_hold(&self, file_plan: NodeId, name: &str) -> HoldResult<Option<NodeId>> {
        self.require_present("file_plan", file_plan)?;
        if name.trim().is_empty() {
            return Err(HoldError::required("name"));
        }
        let Some(container) = self.store.hold_container(file_plan)? else {
            return Ok(None);
        };
        match self
            .store
            .get_child_by_name(container, Relation::Contains, name)?
        {
            Some(node) if !self.is_hold(node)? => Err(IntegrityError::NotAHold {
                node,
                name: name.to_string(),
            }
            .into()),
            found => Ok(found),
        }
    }

    /// Holds containing `item` (`included_in_hold`), or every other hold.
    ///
    /// A record is also held by the holds of every record folder it is
    /// filed in.
    pub fn held_by(&self, item: NodeId, included_in_hold: bool) -> HoldResult<Vec<NodeId>> {
        let mut holds = self.direct_holds(item)?;
        if self.store.is_record(item)? {
            for folder in self.store.record_folders_of(item)? {
                for hold in self.direct_holds(folder)? {
                    if !holds.contains(&hold) {
                        holds.push(hold);
                    }
                }
            }
        }

        if included_in_hold {
            return Ok(holds);
        }

        let mut others = Vec::new();
        for file_plan in self.store.file_plans()? {
            for hold in self.get_holds(file_plan)? {
                if !holds.contains(&hold) {
                    others.push(hold);
                }
            }
        }
        Ok(others)
    }

    fn direct_holds(&self, node: NodeId) -> HoldResult<Vec<NodeId>> {
        let mut holds = Vec::new();
        for parent in self.store.get_parents(node, Relation::FrozenContent)? {
            if self.is_hold(parent)? && !holds.contains(&parent) {
                holds.push(parent);
            }
        }
        Ok(holds)
    }

    /// Items frozen by a hold.
    pub fn get_held(&self, hold: NodeId) -> HoldResult<Vec<NodeId>> {
        self.require_hold(hold)?;
        self.store.get_children(hold, Relation::FrozenContent)
    }

    /// Hold reason, or `None` when `hold` is missing or not a hold.
    pub fn get_hold_reason(&self, hold: NodeId) -> HoldResult<Option<String>> {
        if !self.is_hold(hold)? {
            return Ok(None);
        }
        Ok(self
            .store
            .get_property(hold, &Property::HoldReason)?
            .and_then(|v| v.as_text().map(str::to_string)))
    }

    /// Whether the node carries the frozen marker.
    pub fn is_frozen(&self, node: NodeId) -> HoldResult<bool> {
        Ok(self.store.exists(node)? && self.store.has_aspect(node, &Aspect::Frozen)?)
    }

    /// Whether any contained child carries the frozen marker.
    pub fn has_frozen_children(&self, node: NodeId) -> HoldResult<bool> {
        for child in self.store.get_children(node, Relation::Contains)? {
            if self.is_frozen(child)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    // ========================================================================
    // HOLD LIFECYCLE
    // ========================================================================

    /// Create a hold in a file plan, creating the plan's hold container if
    /// it has none yet.
    ///
    /// The container is created before `BeforeCreateHold` fires. A vetoing
    /// hook on a fresh plan leaves the empty container behind for the host
    /// transaction to roll back.
    pub fn create_hold(
        &self,
        ctx: &HoldContext,
        file_plan: NodeId,
        name: &str,
        reason: &str,
        description: Option<&str>,
    ) -> HoldResult<NodeId> {
        if name.trim().is_empty() {
            return Err(HoldError::required("name"));
        }
        if reason.trim().is_empty() {
            return Err(HoldError::required("reason"));
        }
        self.require_present("file_plan", file_plan)?;
        let _op = ctx.enter();

        let container = match self.store.hold_container(file_plan)? {
            Some(container) => container,
            None => {
                let container = self.store.create_node(
                    file_plan,
                    Relation::Contains,
                    &self.config.hold_container_name,
                    NodeType::HoldContainer,
                    PropertyMap::new(),
                )?;
                tracing::info!(file_plan = %file_plan, container = %container, "Hold container created");
                container
            }
        };

        self.dispatch(
            &HoldEvent::BeforeCreateHold {
                name: name.to_string(),
                reason: reason.to_string(),
            },
            &self.store.class_names(container)?,
        )?;

        let mut props = PropertyMap::new();
        props.insert(Property::HoldReason, PropertyValue::from(reason));
        if let Some(description) = description.filter(|d| !d.trim().is_empty()) {
            props.insert(Property::Description, PropertyValue::from(description));
        }
        let hold = self.store.create_node(
            container,
            Relation::Contains,
            name,
            NodeType::Hold,
            props,
        )?;

        self.dispatch(
            &HoldEvent::OnCreateHold { hold },
            &self.store.class_names(hold)?,
        )?;

        tracing::info!(
            hold = %hold,
            name = %name,
            actor = %ctx.authenticated(),
            "Hold created"
        );
        Ok(hold)
    }

    /// Replace a hold's reason. No-op when `hold` is missing or not a hold.
    pub fn set_hold_reason(&self, ctx: &HoldContext, hold: NodeId, reason: &str) -> HoldResult<()> {
        if reason.trim().is_empty() {
            return Err(HoldError::required("reason"));
        }
        if !self.is_hold(hold)? {
            return Ok(());
        }
        self.store
            .set_property(hold, Property::HoldReason, PropertyValue::from(reason))?;
        tracing::debug!(hold = %hold, actor = %ctx.effective_actor(), "Hold reason updated");
        Ok(())
    }

    /// Delete a hold, unfreezing every item it alone was keeping frozen.
    ///
    /// Fails without mutating anything when the caller lacks access to any
    /// held item.
    pub fn delete_hold(&self, ctx: &HoldContext, hold: NodeId) -> HoldResult<()> {
        self.require_hold(hold)?;
        let _op = ctx.enter();

        self.check_held_items_accessible(ctx, hold)?;

        self.dispatch(
            &HoldEvent::BeforeDeleteHold { hold },
            &self.store.class_names(hold)?,
        )?;

        let name = self.store.name_of(hold)?;
        let classes = self.store.class_names(hold)?;

        {
            let _elevated = ctx.elevate();
            for item in self.get_held(hold)? {
                ctx.suppress(Suppression::FrozenGuard, item);
                self.retract(ctx, item, 1)?;
            }
            ctx.suppress(Suppression::BeforeDeleteNode, hold);
            self.store.delete_node(hold)?;
        }

        self.dispatch(&HoldEvent::OnDeleteHold { name: name.clone() }, &classes)?;

        tracing::info!(
            hold = %hold,
            name = %name,
            actor = %ctx.authenticated(),
            "Hold deleted"
        );
        Ok(())
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    pub(crate) fn dispatch(&self, event: &HoldEvent, classes: &[ClassName]) -> HoldResult<()> {
        self.hooks.dispatch(event, classes)
    }

    pub(crate) fn require_hold(&self, node: NodeId) -> HoldResult<()> {
        if self.is_hold(node)? {
            return Ok(());
        }
        let name = if self.store.exists(node)? {
            self.store.name_of(node)?
        } else {
            node.to_string()
        };
        Err(IntegrityError::NotAHold { node, name }.into())
    }

    pub(crate) fn require_present(&self, field: &str, node: NodeId) -> HoldResult<()> {
        if self.store.exists(node)? {
            Ok(())
        } else {
            Err(ValidationError::NodeAbsent {
                field: field.to_string(),
                node,
            }
            .into())
        }
    }

    pub(crate) fn require_capability(
        &self,
        ctx: &HoldContext,
        hold: NodeId,
        capability: Capability,
    ) -> HoldResult<()> {
        let actor = ctx.effective_actor();
        match self.oracle.capability_access_state(&actor, hold, capability)? {
            AccessStatus::Allowed => Ok(()),
            AccessStatus::Denied => {
                tracing::warn!(actor = %actor, hold = %hold, capability = %capability, "Hold capability denied");
                Err(AccessError::Denied {
                    actor: actor.name().to_string(),
                    action: capability.to_string(),
                    node: hold,
                }
                .into())
            }
        }
    }
}
