//! In-memory node store

use crate::{validate_node_name, NodeStore};
use lexhold_core::{
    Aspect, HoldResult, NodeId, NodeType, Property, PropertyMap, PropertyValue, Relation,
    StorageError,
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Clone)]
struct NodeRecord {
    node_type: NodeType,
    aspects: Vec<Aspect>,
    properties: PropertyMap,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ChildAssoc {
    parent: NodeId,
    child: NodeId,
    relation: Relation,
    name: String,
    primary: bool,
}

#[derive(Debug, Default)]
struct StoreState {
    nodes: HashMap<NodeId, NodeRecord>,
    /// Creation order of live nodes
    order: Vec<NodeId>,
    assocs: Vec<ChildAssoc>,
}

impl StoreState {
    fn node(&self, id: NodeId) -> HoldResult<&NodeRecord> {
        self.nodes
            .get(&id)
            .ok_or_else(|| StorageError::NotFound { node: id }.into())
    }

    fn node_mut(&mut self, id: NodeId) -> HoldResult<&mut NodeRecord> {
        self.nodes
            .get_mut(&id)
            .ok_or_else(|| StorageError::NotFound { node: id }.into())
    }

    fn name_taken(&self, parent: NodeId, relation: Relation, name: &str) -> bool {
        self.assocs
            .iter()
            .filter(|a| a.parent == parent && a.relation == relation)
            .filter_map(|a| self.nodes.get(&a.child))
            .any(|n| {
                n.properties
                    .get(&Property::Name)
                    .and_then(PropertyValue::as_text)
                    == Some(name)
            })
    }

    fn insert_node(&mut self, node_type: NodeType, name: &str, mut props: PropertyMap) -> NodeId {
        let id = NodeId::new();
        props.insert(Property::Name, PropertyValue::from(name));
        self.nodes.insert(
            id,
            NodeRecord {
                node_type,
                aspects: Vec::new(),
                properties: props,
            },
        );
        self.order.push(id);
        id
    }

    /// The node plus every node reachable through primary associations.
    fn primary_subtree(&self, root: NodeId) -> HashSet<NodeId> {
        let mut doomed = HashSet::new();
        let mut pending = vec![root];
        while let Some(current) = pending.pop() {
            if !doomed.insert(current) {
                continue;
            }
            pending.extend(
                self.assocs
                    .iter()
                    .filter(|a| a.primary && a.parent == current)
                    .map(|a| a.child),
            );
        }
        doomed
    }
}

// ============================================================================
// SNAPSHOTS
// ============================================================================

/// Serializable point-in-time copy of a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub node_type: NodeType,
    pub aspects: Vec<Aspect>,
    pub properties: Vec<(Property, PropertyValue)>,
}

/// Serializable point-in-time copy of an association.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssocSnapshot {
    pub parent: NodeId,
    pub child: NodeId,
    pub relation: Relation,
    pub name: String,
    pub primary: bool,
}

/// Full store contents. Two snapshots compare equal iff nothing changed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreSnapshot {
    pub nodes: Vec<NodeSnapshot>,
    pub assocs: Vec<AssocSnapshot>,
}

impl StoreSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

// ============================================================================
// MOCK NODE STORE
// ============================================================================

/// In-memory node store.
#[derive(Debug, Clone, Default)]
pub struct MockNodeStore {
    state: Arc<RwLock<StoreState>>,
}

impl MockNodeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> HoldResult<RwLockReadGuard<'_, StoreState>> {
        self.state
            .read()
            .map_err(|_| StorageError::LockPoisoned.into())
    }

    fn write(&self) -> HoldResult<RwLockWriteGuard<'_, StoreState>> {
        self.state
            .write()
            .map_err(|_| StorageError::LockPoisoned.into())
    }

    /// Get count of live nodes.
    pub fn node_count(&self) -> HoldResult<usize> {
        Ok(self.read()?.nodes.len())
    }

    /// Get count of associations.
    pub fn assoc_count(&self) -> HoldResult<usize> {
        Ok(self.read()?.assocs.len())
    }

    /// Capture the whole store for before/after comparison.
    pub fn snapshot(&self) -> HoldResult<StoreSnapshot> {
        let state = self.read()?;
        let nodes = state
            .order
            .iter()
            .filter_map(|id| state.nodes.get(id).map(|n| (id, n)))
            .map(|(id, n)| NodeSnapshot {
                id: *id,
                node_type: n.node_type,
                aspects: n.aspects.clone(),
                properties: n
                    .properties
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            })
            .collect();
        let assocs = state
            .assocs
            .iter()
            .map(|a| AssocSnapshot {
                parent: a.parent,
                child: a.child,
                relation: a.relation,
                name: a.name.clone(),
                primary: a.primary,
            })
            .collect();
        Ok(StoreSnapshot { nodes, assocs })
    }

    /// Clear all stored data.
    pub fn clear(&self) -> HoldResult<()> {
        let mut state = self.write()?;
        state.nodes.clear();
        state.order.clear();
        state.assocs.clear();
        Ok(())
    }
}

impl NodeStore for MockNodeStore {
    // === Node Operations ===

    fn exists(&self, node: NodeId) -> HoldResult<bool> {
        Ok(self.read()?.nodes.contains_key(&node))
    }

    fn node_type(&self, node: NodeId) -> HoldResult<NodeType> {
        Ok(self.read()?.node(node)?.node_type)
    }

    fn create_root(
        &self,
        name: &str,
        node_type: NodeType,
        props: PropertyMap,
    ) -> HoldResult<NodeId> {
        validate_node_name(name)?;
        let mut state = self.write()?;
        Ok(state.insert_node(node_type, name, props))
    }

    fn create_node(
        &self,
        parent: NodeId,
        relation: Relation,
        name: &str,
        node_type: NodeType,
        props: PropertyMap,
    ) -> HoldResult<NodeId> {
        validate_node_name(name)?;
        let mut state = self.write()?;
        state.node(parent)?;
        if state.name_taken(parent, relation, name) {
            return Err(StorageError::DuplicateName {
                parent,
                name: name.to_string(),
            }
            .into());
        }
        let id = state.insert_node(node_type, name, props);
        state.assocs.push(ChildAssoc {
            parent,
            child: id,
            relation,
            name: name.to_string(),
            primary: true,
        });
        Ok(id)
    }

    fn delete_node(&self, node: NodeId) -> HoldResult<()> {
        let mut state = self.write()?;
        state.node(node)?;
        let doomed = state.primary_subtree(node);
        state
            .assocs
            .retain(|a| !doomed.contains(&a.parent) && !doomed.contains(&a.child));
        state.order.retain(|id| !doomed.contains(id));
        for id in &doomed {
            state.nodes.remove(id);
        }
        tracing::debug!(node = %node, removed = doomed.len(), "Deleted node subtree");
        Ok(())
    }

    fn find_by_type(&self, node_type: NodeType) -> HoldResult<Vec<NodeId>> {
        let state = self.read()?;
        Ok(state
            .order
            .iter()
            .filter(|id| {
                state
                    .nodes
                    .get(id)
                    .map(|n| n.node_type == node_type)
                    .unwrap_or(false)
            })
            .copied()
            .collect())
    }

    // === Aspect Operations ===

    fn aspects(&self, node: NodeId) -> HoldResult<Vec<Aspect>> {
        Ok(self.read()?.node(node)?.aspects.clone())
    }

    fn has_aspect(&self, node: NodeId, aspect: &Aspect) -> HoldResult<bool> {
        Ok(self.read()?.node(node)?.aspects.contains(aspect))
    }

    fn add_aspect(&self, node: NodeId, aspect: Aspect, props: PropertyMap) -> HoldResult<()> {
        let mut state = self.write()?;
        let record = state.node_mut(node)?;
        if !record.aspects.contains(&aspect) {
            record.aspects.push(aspect);
        }
        record.properties.extend(props);
        Ok(())
    }

    fn remove_aspect(&self, node: NodeId, aspect: &Aspect) -> HoldResult<()> {
        let mut state = self.write()?;
        let record = state.node_mut(node)?;
        record.aspects.retain(|a| a != aspect);
        for owned in aspect.properties() {
            record.properties.remove(owned);
        }
        Ok(())
    }

    // === Property Operations ===

    fn get_property(
        &self,
        node: NodeId,
        property: &Property,
    ) -> HoldResult<Option<PropertyValue>> {
        Ok(self.read()?.node(node)?.properties.get(property).cloned())
    }

    fn set_property(
        &self,
        node: NodeId,
        property: Property,
        value: PropertyValue,
    ) -> HoldResult<()> {
        let mut state = self.write()?;
        state.node_mut(node)?.properties.insert(property, value);
        Ok(())
    }

    fn add_properties(&self, node: NodeId, props: PropertyMap) -> HoldResult<()> {
        let mut state = self.write()?;
        state.node_mut(node)?.properties.extend(props);
        Ok(())
    }

    // === Association Operations ===

    fn add_child(
        &self,
        parent: NodeId,
        child: NodeId,
        relation: Relation,
        assoc_name: &str,
    ) -> HoldResult<()> {
        let mut state = self.write()?;
        state.node(parent)?;
        state.node(child)?;
        if parent == child {
            return Err(StorageError::AssociationFailed {
                reason: format!("{} can't be its own child", parent),
            }
            .into());
        }
        if state
            .assocs
            .iter()
            .any(|a| a.parent == parent && a.child == child && a.relation == relation)
        {
            return Err(StorageError::AssociationFailed {
                reason: format!("{} already has {} child {}", parent, relation, child),
            }
            .into());
        }
        state.assocs.push(ChildAssoc {
            parent,
            child,
            relation,
            name: assoc_name.to_string(),
            primary: false,
        });
        Ok(())
    }

    fn remove_child(&self, parent: NodeId, child: NodeId) -> HoldResult<()> {
        let mut state = self.write()?;
        state.node(parent)?;
        state.node(child)?;
        state
            .assocs
            .retain(|a| !(a.parent == parent && a.child == child));
        Ok(())
    }

    fn get_children(&self, parent: NodeId, relation: Relation) -> HoldResult<Vec<NodeId>> {
        let state = self.read()?;
        state.node(parent)?;
        Ok(state
            .assocs
            .iter()
            .filter(|a| a.parent == parent && a.relation == relation)
            .map(|a| a.child)
            .collect())
    }

    fn get_child_by_name(
        &self,
        parent: NodeId,
        relation: Relation,
        name: &str,
    ) -> HoldResult<Option<NodeId>> {
        let state = self.read()?;
        state.node(parent)?;
        Ok(state
            .assocs
            .iter()
            .filter(|a| a.parent == parent && a.relation == relation)
            .map(|a| a.child)
            .find(|child| {
                state
                    .nodes
                    .get(child)
                    .and_then(|n| n.properties.get(&Property::Name))
                    .and_then(PropertyValue::as_text)
                    == Some(name)
            }))
    }

    fn get_parents(&self, child: NodeId, relation: Relation) -> HoldResult<Vec<NodeId>> {
        let state = self.read()?;
        state.node(child)?;
        Ok(state
            .assocs
            .iter()
            .filter(|a| a.child == child && a.relation == relation)
            .map(|a| a.parent)
            .collect())
    }

    fn primary_parent_assoc_name(&self, node: NodeId) -> HoldResult<Option<String>> {
        let state = self.read()?;
        state.node(node)?;
        Ok(state
            .assocs
            .iter()
            .find(|a| a.primary && a.child == node)
            .map(|a| a.name.clone()))
    }
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Deleting the root of a primary chain removes every node in it.
        #[test]
        fn prop_delete_removes_primary_chain(depth in 1usize..8) {
            let store = MockNodeStore::new();
            let root = store.create_root("root", NodeType::Folder, PropertyMap::new()).unwrap();
            let mut parent = root;
            for level in 0..depth {
                parent = store
                    .create_node(parent, Relation::Contains, &format!("n{level}"), NodeType::Folder, PropertyMap::new())
                    .unwrap();
            }
            prop_assert_eq!(store.node_count().unwrap(), depth + 1);

            store.delete_node(root).unwrap();
            prop_assert_eq!(store.node_count().unwrap(), 0);
            prop_assert_eq!(store.assoc_count().unwrap(), 0);
        }

        /// Children come back in association creation order.
        #[test]
        fn prop_children_in_creation_order(count in 1usize..12) {
            let store = MockNodeStore::new();
            let root = store.create_root("root", NodeType::HoldContainer, PropertyMap::new()).unwrap();
            let created: Vec<NodeId> = (0..count)
                .map(|i| {
                    store
                        .create_node(root, Relation::Contains, &format!("hold {i}"), NodeType::Hold, PropertyMap::new())
                        .unwrap()
                })
                .collect();
            prop_assert_eq!(store.get_children(root, Relation::Contains).unwrap(), created);
        }
    }
}
