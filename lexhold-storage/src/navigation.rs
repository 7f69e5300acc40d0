//! Records model navigation over any node store

use crate::NodeStore;
use lexhold_core::{Aspect, ClassName, HoldResult, NodeId, NodeType, Property, Relation};

/// Convenience queries over the records management content model.
///
/// Type predicates answer `false` for nodes that do not exist.
pub trait NodeStoreExt: NodeStore {
    /// The node's type followed by its aspects.
    fn class_names(&self, node: NodeId) -> HoldResult<Vec<ClassName>> {
        let mut classes = vec![ClassName::Type(self.node_type(node)?)];
        classes.extend(self.aspects(node)?.into_iter().map(ClassName::Aspect));
        Ok(classes)
    }

    /// Display name of the node, falling back to its id.
    fn name_of(&self, node: NodeId) -> HoldResult<String> {
        Ok(self
            .get_property(node, &Property::Name)?
            .and_then(|v| v.as_text().map(str::to_string))
            .unwrap_or_else(|| node.to_string()))
    }

    /// Content declared as a record.
    fn is_record(&self, node: NodeId) -> HoldResult<bool> {
        if !self.exists(node)? {
            return Ok(false);
        }
        Ok(self.node_type(node)? == NodeType::Content && self.has_aspect(node, &Aspect::Record)?)
    }

    fn is_record_folder(&self, node: NodeId) -> HoldResult<bool> {
        if !self.exists(node)? {
            return Ok(false);
        }
        Ok(self.node_type(node)? == NodeType::RecordFolder)
    }

    /// Generic content, i.e. content not declared as a record.
    fn is_content(&self, node: NodeId) -> HoldResult<bool> {
        if !self.exists(node)? {
            return Ok(false);
        }
        Ok(self.node_type(node)? == NodeType::Content && !self.has_aspect(node, &Aspect::Record)?)
    }

    /// Records filed directly in a record folder.
    fn records_in_folder(&self, folder: NodeId) -> HoldResult<Vec<NodeId>> {
        let mut records = Vec::new();
        for child in self.get_children(folder, Relation::Contains)? {
            if self.is_record(child)? {
                records.push(child);
            }
        }
        Ok(records)
    }

    /// Record folders a record is filed in.
    fn record_folders_of(&self, record: NodeId) -> HoldResult<Vec<NodeId>> {
        let mut folders = Vec::new();
        for parent in self.get_parents(record, Relation::Contains)? {
            if self.is_record_folder(parent)? {
                folders.push(parent);
            }
        }
        Ok(folders)
    }

    /// The hold container of a file plan, if one has been created.
    fn hold_container(&self, file_plan: NodeId) -> HoldResult<Option<NodeId>> {
        for child in self.get_children(file_plan, Relation::Contains)? {
            if self.node_type(child)? == NodeType::HoldContainer {
                return Ok(Some(child));
            }
        }
        Ok(None)
    }

    fn file_plans(&self) -> HoldResult<Vec<NodeId>> {
        self.find_by_type(NodeType::FilePlan)
    }
}

// Blanket implementation: every NodeStore, sized or not, gets NodeStoreExt
impl<S: NodeStore + ?Sized> NodeStoreExt for S {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockNodeStore;
    use lexhold_core::PropertyMap;

    struct Plan {
        store: MockNodeStore,
        file_plan: NodeId,
        folder: NodeId,
        record: NodeId,
        document: NodeId,
    }

    fn make_test_plan() -> Plan {
        let store = MockNodeStore::new();
        let file_plan = store
            .create_root("File Plan", NodeType::FilePlan, PropertyMap::new())
            .unwrap();
        let folder = store
            .create_node(
                file_plan,
                Relation::Contains,
                "Folder",
                NodeType::RecordFolder,
                PropertyMap::new(),
            )
            .unwrap();
        let record = store
            .create_node(
                folder,
                Relation::Contains,
                "record.pdf",
                NodeType::Content,
                PropertyMap::new(),
            )
            .unwrap();
        store
            .add_aspect(record, Aspect::Record, PropertyMap::new())
            .unwrap();
        let document = store
            .create_node(
                folder,
                Relation::Contains,
                "draft.docx",
                NodeType::Content,
                PropertyMap::new(),
            )
            .unwrap();
        Plan {
            store,
            file_plan,
            folder,
            record,
            document,
        }
    }

    #[test]
    fn test_type_predicates() {
        let plan = make_test_plan();
        let store = &plan.store;
        assert!(store.is_record(plan.record).unwrap());
        assert!(!store.is_content(plan.record).unwrap());
        assert!(store.is_content(plan.document).unwrap());
        assert!(!store.is_record(plan.document).unwrap());
        assert!(store.is_record_folder(plan.folder).unwrap());
        assert!(!store.is_record_folder(NodeId::new()).unwrap());
        assert!(!store.is_record(NodeId::new()).unwrap());
    }

    #[test]
    fn test_records_in_folder_skips_plain_content() {
        let plan = make_test_plan();
        assert_eq!(
            plan.store.records_in_folder(plan.folder).unwrap(),
            vec![plan.record]
        );
        assert_eq!(
            plan.store.record_folders_of(plan.record).unwrap(),
            vec![plan.folder]
        );
    }

    #[test]
    fn test_class_names_type_first() {
        let plan = make_test_plan();
        assert_eq!(
            plan.store.class_names(plan.record).unwrap(),
            vec![
                ClassName::Type(NodeType::Content),
                ClassName::Aspect(Aspect::Record)
            ]
        );
    }

    #[test]
    fn test_hold_container_lookup() {
        let plan = make_test_plan();
        assert_eq!(plan.store.hold_container(plan.file_plan).unwrap(), None);

        let container = plan
            .store
            .create_node(
                plan.file_plan,
                Relation::Contains,
                "Holds",
                NodeType::HoldContainer,
                PropertyMap::new(),
            )
            .unwrap();
        assert_eq!(
            plan.store.hold_container(plan.file_plan).unwrap(),
            Some(container)
        );
        assert_eq!(plan.store.file_plans().unwrap(), vec![plan.file_plan]);
    }

    #[test]
    fn test_name_of_and_dyn_dispatch() {
        let plan = make_test_plan();
        let dyn_store: &dyn NodeStore = &plan.store;
        assert_eq!(dyn_store.name_of(plan.folder).unwrap(), "Folder");
    }
}
