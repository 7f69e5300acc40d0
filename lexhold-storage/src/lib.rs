//! LEXHOLD Storage - Node Store Contract and In-Memory Implementation
//!
//! Defines the node/relationship store the hold engine consumes, the
//! permission oracle it asks, and navigation helpers over the records model.
//! A real content repository implements [`NodeStore`] and
//! [`PermissionOracle`]; [`MockNodeStore`] and [`MockPermissionOracle`] back
//! the tests and embedders that want an in-memory store.

mod mock;
mod naming;
mod navigation;
mod oracle;

pub use mock::{AssocSnapshot, MockNodeStore, NodeSnapshot, StoreSnapshot};
pub use naming::validate_node_name;
pub use navigation::NodeStoreExt;
pub use oracle::{MockPermissionOracle, PermissionOracle};

use lexhold_core::{
    Aspect, HoldResult, NodeId, NodeType, Property, PropertyMap, PropertyValue, Relation,
};

// ============================================================================
// NODE STORE TRAIT
// ============================================================================

/// Node and child-association store.
///
/// Every method except [`NodeStore::exists`] fails with
/// `StorageError::NotFound` when a node it is asked about does not exist.
/// Child lists are returned in association creation order.
pub trait NodeStore: Send + Sync {
    // === Node Operations ===

    /// Whether the node exists.
    fn exists(&self, node: NodeId) -> HoldResult<bool>;

    /// The node's type.
    fn node_type(&self, node: NodeId) -> HoldResult<NodeType>;

    /// Create a root node (no primary parent).
    fn create_root(&self, name: &str, node_type: NodeType, props: PropertyMap)
        -> HoldResult<NodeId>;

    /// Create a node under `parent` through a primary association named `name`.
    ///
    /// The node's `Name` property is set to `name`. Fails with
    /// `StorageError::DuplicateName` if a sibling under the same relation
    /// already carries that name.
    fn create_node(
        &self,
        parent: NodeId,
        relation: Relation,
        name: &str,
        node_type: NodeType,
        props: PropertyMap,
    ) -> HoldResult<NodeId>;

    /// Delete a node, its primary children recursively, and every
    /// association it participates in. Secondary children survive.
    fn delete_node(&self, node: NodeId) -> HoldResult<()>;

    /// All nodes of a type, in creation order.
    fn find_by_type(&self, node_type: NodeType) -> HoldResult<Vec<NodeId>>;

    // === Aspect Operations ===

    /// Aspects attached to the node, in attach order.
    fn aspects(&self, node: NodeId) -> HoldResult<Vec<Aspect>>;

    fn has_aspect(&self, node: NodeId, aspect: &Aspect) -> HoldResult<bool>;

    /// Attach an aspect and merge its properties. Re-adding is a property merge.
    fn add_aspect(&self, node: NodeId, aspect: Aspect, props: PropertyMap) -> HoldResult<()>;

    /// Detach an aspect together with the properties it owns.
    fn remove_aspect(&self, node: NodeId, aspect: &Aspect) -> HoldResult<()>;

    // === Property Operations ===

    fn get_property(&self, node: NodeId, property: &Property) -> HoldResult<Option<PropertyValue>>;

    fn set_property(&self, node: NodeId, property: Property, value: PropertyValue)
        -> HoldResult<()>;

    fn add_properties(&self, node: NodeId, props: PropertyMap) -> HoldResult<()>;

    // === Association Operations ===

    /// Add a secondary association from `parent` to `child`.
    fn add_child(
        &self,
        parent: NodeId,
        child: NodeId,
        relation: Relation,
        assoc_name: &str,
    ) -> HoldResult<()>;

    /// Remove every association between `parent` and `child`.
    fn remove_child(&self, parent: NodeId, child: NodeId) -> HoldResult<()>;

    fn get_children(&self, parent: NodeId, relation: Relation) -> HoldResult<Vec<NodeId>>;

    /// Child under `relation` whose `Name` property equals `name`.
    fn get_child_by_name(
        &self,
        parent: NodeId,
        relation: Relation,
        name: &str,
    ) -> HoldResult<Option<NodeId>>;

    fn get_parents(&self, child: NodeId, relation: Relation) -> HoldResult<Vec<NodeId>>;

    /// Name of the node's primary parent association. `None` for roots.
    fn primary_parent_assoc_name(&self, node: NodeId) -> HoldResult<Option<String>>;
}
