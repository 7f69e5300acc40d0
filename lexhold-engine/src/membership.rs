//! Hold membership: add, remove and frozen-marker retraction

use crate::context::{HoldContext, Suppression};
use crate::service::HoldService;
use lexhold_core::{
    AccessError, Aspect, Capability, HoldError, HoldResult, IntegrityError, NodeId, Permission,
    Property, PropertyMap, PropertyValue, Relation,
};
use lexhold_events::HoldEvent;
use lexhold_storage::NodeStoreExt;

impl HoldService {
    // ========================================================================
    // ADD
    // ========================================================================

    pub fn add_to_hold(&self, ctx: &HoldContext, hold: NodeId, item: NodeId) -> HoldResult<()> {
        self.add_all(ctx, &[hold], &[item])
    }

    /// Add several items to one hold. An empty list is a no-op.
    pub fn add_items_to_hold(
        &self,
        ctx: &HoldContext,
        hold: NodeId,
        items: &[NodeId],
    ) -> HoldResult<()> {
        self.add_all(ctx, &[hold], items)
    }

    pub fn add_to_holds(&self, ctx: &HoldContext, holds: &[NodeId], item: NodeId) -> HoldResult<()> {
        if holds.is_empty() {
            return Err(HoldError::empty_collection("holds"));
        }
        self.add_all(ctx, holds, &[item])
    }

    pub fn add_items_to_holds(
        &self,
        ctx: &HoldContext,
        holds: &[NodeId],
        items: &[NodeId],
    ) -> HoldResult<()> {
        if holds.is_empty() {
            return Err(HoldError::empty_collection("holds"));
        }
        if items.is_empty() {
            return Err(HoldError::empty_collection("items"));
        }
        self.add_all(ctx, holds, items)
    }

    fn add_all(&self, ctx: &HoldContext, holds: &[NodeId], items: &[NodeId]) -> HoldResult<()> {
        let _op = ctx.enter();
        for &item in items {
            self.check_item_can_be_held(ctx, item)?;
            for &hold in holds {
                self.add_pair(ctx, hold, item)?;
            }
        }
        Ok(())
    }

    /// Only record folders and generic content that is neither archived nor
    /// locked can be held, and the caller must be allowed to file or write it.
    fn check_item_can_be_held(&self, ctx: &HoldContext, item: NodeId) -> HoldResult<()> {
        self.require_present("item", item)?;
        let name = self.store.name_of(item)?;

        let is_folder = self.store.is_record_folder(item)?;
        if !is_folder && !self.store.is_content(item)? {
            return Err(IntegrityError::InvalidHoldItemType { name }.into());
        }
        if self.store.has_aspect(item, &Aspect::Archived)? {
            return Err(IntegrityError::ArchivedItem { name }.into());
        }
        if self.store.has_aspect(item, &Aspect::Lockable)? {
            return Err(IntegrityError::LockedItem { name }.into());
        }

        let permission = if is_folder {
            Permission::Filing
        } else {
            Permission::Write
        };
        let actor = ctx.effective_actor();
        if !self.oracle.has_permission(&actor, item, permission)?.is_allowed() {
            tracing::warn!(actor = %actor, item = %item, permission = %permission, "Hold item permission denied");
            return Err(AccessError::Denied {
                actor: actor.name().to_string(),
                action: permission.to_string(),
                node: item,
            }
            .into());
        }
        Ok(())
    }

    fn add_pair(&self, ctx: &HoldContext, hold: NodeId, item: NodeId) -> HoldResult<()> {
        self.require_hold(hold)?;
        self.require_capability(ctx, hold, Capability::AddToHold)?;

        if self.get_held(hold)?.contains(&item) {
            tracing::debug!(hold = %hold, item = %item, "Item already held");
            return Ok(());
        }

        let classes = self.store.class_names(hold)?;
        self.dispatch(&HoldEvent::BeforeAddToHold { hold, item }, &classes)?;

        {
            let _elevated = ctx.elevate();
            ctx.suppress(Suppression::FrozenGuard, item);
            let mut marker = PropertyMap::new();
            marker.insert(Property::FrozenAt, PropertyValue::from(chrono::Utc::now()));
            marker.insert(
                Property::FrozenBy,
                PropertyValue::from(ctx.authenticated().name()),
            );

            self.freeze(ctx, item, &marker)?;

            let assoc_name = match self.store.primary_parent_assoc_name(item)? {
                Some(name) => name,
                None => self.store.name_of(item)?,
            };
            self.store
                .add_child(hold, item, Relation::FrozenContent, &assoc_name)?;
            self.store
                .add_child(hold, item, Relation::Contains, &assoc_name)?;

            if self.store.is_record_folder(item)? {
                for record in self.store.records_in_folder(item)? {
                    self.freeze(ctx, record, &marker)?;
                }
            }
        }

        self.dispatch(&HoldEvent::OnAddToHold { hold, item }, &classes)?;
        Ok(())
    }

    fn freeze(&self, ctx: &HoldContext, node: NodeId, marker: &PropertyMap) -> HoldResult<()> {
        if self.store.has_aspect(node, &Aspect::Frozen)? {
            return Ok(());
        }
        ctx.suppress(Suppression::FrozenGuard, node);
        self.check_frozen_update(ctx, node)?;
        self.store.add_aspect(node, Aspect::Frozen, marker.clone())?;
        tracing::debug!(node = %node, "Frozen marker applied");
        Ok(())
    }

    // ========================================================================
    // REMOVE
    // ========================================================================

    pub fn remove_from_hold(&self, ctx: &HoldContext, hold: NodeId, item: NodeId) -> HoldResult<()> {
        self.remove_all(ctx, &[hold], &[item])
    }

    /// Remove several items from one hold. An empty list is a no-op.
    pub fn remove_items_from_hold(
        &self,
        ctx: &HoldContext,
        hold: NodeId,
        items: &[NodeId],
    ) -> HoldResult<()> {
        self.remove_all(ctx, &[hold], items)
    }

    /// Remove one item from several holds. An empty list is a no-op.
    pub fn remove_from_holds(
        &self,
        ctx: &HoldContext,
        holds: &[NodeId],
        item: NodeId,
    ) -> HoldResult<()> {
        self.remove_all(ctx, holds, &[item])
    }

    pub fn remove_items_from_holds(
        &self,
        ctx: &HoldContext,
        holds: &[NodeId],
        items: &[NodeId],
    ) -> HoldResult<()> {
        if holds.is_empty() {
            return Err(HoldError::empty_collection("holds"));
        }
        if items.is_empty() {
            return Err(HoldError::empty_collection("items"));
        }
        self.remove_all(ctx, holds, items)
    }

    /// Remove an item from every hold holding it, directly or through its
    /// record folder.
    pub fn remove_from_all_holds(&self, ctx: &HoldContext, item: NodeId) -> HoldResult<()> {
        let _op = ctx.enter();
        for hold in self.held_by(item, true)? {
            self.remove_from_hold(ctx, hold, item)?;
        }
        Ok(())
    }

    pub fn remove_items_from_all_holds(&self, ctx: &HoldContext, items: &[NodeId]) -> HoldResult<()> {
        let _op = ctx.enter();
        for &item in items {
            self.remove_from_all_holds(ctx, item)?;
        }
        Ok(())
    }

    fn remove_all(&self, ctx: &HoldContext, holds: &[NodeId], items: &[NodeId]) -> HoldResult<()> {
        if holds.is_empty() {
            return Ok(());
        }
        let _op = ctx.enter();
        for &item in items {
            self.remove_item(ctx, holds, item)?;
        }
        Ok(())
    }

    fn remove_item(&self, ctx: &HoldContext, holds: &[NodeId], item: NodeId) -> HoldResult<()> {
        let mut removed = Vec::new();
        for &hold in holds {
            self.require_hold(hold)?;
            self.require_capability(ctx, hold, Capability::RemoveFromHold)?;

            if !self.get_held(hold)?.contains(&item) {
                continue;
            }

            let classes = self.store.class_names(hold)?;
            self.dispatch(&HoldEvent::BeforeRemoveFromHold { hold, item }, &classes)?;
            {
                let _elevated = ctx.elevate();
                ctx.suppress(Suppression::FrozenGuard, item);
                self.store.remove_child(hold, item)?;
            }
            removed.push((hold, classes));
        }

        ctx.run_as_system(|| self.retract(ctx, item, 0))?;

        for (hold, classes) in removed {
            self.dispatch(&HoldEvent::OnRemoveFromHold { hold, item }, &classes)?;
        }
        Ok(())
    }

    // ========================================================================
    // RETRACTION
    // ========================================================================

    /// Strip the frozen marker from `item` when exactly `expected` holds
    /// still hold it, then re-evaluate each frozen record of a record folder
    /// the same way.
    ///
    /// `expected` is 1 while the hold being deleted still exists, 0 after a
    /// membership was removed.
    pub(crate) fn retract(&self, ctx: &HoldContext, item: NodeId, expected: usize) -> HoldResult<()> {
        if self.held_by(item, true)?.len() != expected {
            return Ok(());
        }

        self.unfreeze(ctx, item)?;

        if self.store.is_record_folder(item)? {
            for record in self.store.records_in_folder(item)? {
                if self.store.has_aspect(record, &Aspect::Frozen)?
                    && self.held_by(record, true)?.len() == expected
                {
                    self.unfreeze(ctx, record)?;
                }
            }
        }
        Ok(())
    }

    fn unfreeze(&self, ctx: &HoldContext, node: NodeId) -> HoldResult<()> {
        if !self.store.has_aspect(node, &Aspect::Frozen)? {
            return Ok(());
        }
        ctx.suppress(Suppression::FrozenGuard, node);
        self.check_frozen_update(ctx, node)?;
        self.store.remove_aspect(node, &Aspect::Frozen)?;
        tracing::debug!(node = %node, "Frozen marker removed");
        Ok(())
    }
}
