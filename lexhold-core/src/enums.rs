//! Enum types for the LEXHOLD content model

use crate::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// CONTENT MODEL
// ============================================================================

/// Node type. Every node has exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    /// Root of a records management file plan
    FilePlan,
    /// Container of the holds of one file plan
    HoldContainer,
    /// A hold
    Hold,
    /// Folder of records
    RecordFolder,
    /// Generic content (records are content with the record aspect)
    Content,
    /// Plain folder
    Folder,
}

impl NodeType {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            NodeType::FilePlan => "file_plan",
            NodeType::HoldContainer => "hold_container",
            NodeType::Hold => "hold",
            NodeType::RecordFolder => "record_folder",
            NodeType::Content => "content",
            NodeType::Folder => "folder",
        }
    }

    pub fn from_db_str(s: &str) -> Result<Self, ClassParseError> {
        match s.to_lowercase().as_str() {
            "file_plan" => Ok(NodeType::FilePlan),
            "hold_container" => Ok(NodeType::HoldContainer),
            "hold" => Ok(NodeType::Hold),
            "record_folder" => Ok(NodeType::RecordFolder),
            "content" => Ok(NodeType::Content),
            "folder" => Ok(NodeType::Folder),
            _ => Err(ClassParseError(s.to_string())),
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

impl FromStr for NodeType {
    type Err = ClassParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s)
    }
}

/// Aspect (tag) attachable to any node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aspect {
    /// Marks content as a declared record
    Record,
    /// Derived marker: the node is held, directly or through its folder
    Frozen,
    /// The node has been archived
    Archived,
    /// The node is locked for editing
    Lockable,
    /// Extension aspect declared by a host
    Custom(String),
}

impl Aspect {
    pub fn as_str(&self) -> &str {
        match self {
            Aspect::Record => "record",
            Aspect::Frozen => "frozen",
            Aspect::Archived => "archived",
            Aspect::Lockable => "lockable",
            Aspect::Custom(name) => name,
        }
    }

    /// Properties owned by the aspect. Removing the aspect removes them.
    pub fn properties(&self) -> &'static [Property] {
        match self {
            Aspect::Frozen => &[Property::FrozenAt, Property::FrozenBy],
            _ => &[],
        }
    }
}

impl fmt::Display for Aspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Aspect {
    type Err = ClassParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Err(ClassParseError(s.to_string())),
            "record" => Ok(Aspect::Record),
            "frozen" => Ok(Aspect::Frozen),
            "archived" => Ok(Aspect::Archived),
            "lockable" => Ok(Aspect::Lockable),
            other => Ok(Aspect::Custom(other.to_string())),
        }
    }
}

/// A node's type or one of its aspects.
///
/// Hook handlers bind to class names; a node's class set is its type
/// plus every aspect currently attached.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassName {
    Type(NodeType),
    Aspect(Aspect),
}

impl From<NodeType> for ClassName {
    fn from(node_type: NodeType) -> Self {
        ClassName::Type(node_type)
    }
}

impl From<Aspect> for ClassName {
    fn from(aspect: Aspect) -> Self {
        ClassName::Aspect(aspect)
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassName::Type(t) => write!(f, "type:{}", t),
            ClassName::Aspect(a) => write!(f, "aspect:{}", a),
        }
    }
}

/// Error when parsing an invalid type or aspect string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassParseError(pub String);

impl fmt::Display for ClassParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid class name: {}", self.0)
    }
}

impl std::error::Error for ClassParseError {}

/// Child association kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// Structural containment
    Contains,
    /// A hold freezes the child
    FrozenContent,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::Contains => write!(f, "contains"),
            Relation::FrozenContent => write!(f, "frozen_content"),
        }
    }
}

// ============================================================================
// PROPERTIES
// ============================================================================

/// Property key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    Name,
    Description,
    HoldReason,
    FrozenAt,
    FrozenBy,
    Custom(String),
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Property::Name => write!(f, "name"),
            Property::Description => write!(f, "description"),
            Property::HoldReason => write!(f, "hold_reason"),
            Property::FrozenAt => write!(f, "frozen_at"),
            Property::FrozenBy => write!(f, "frozen_by"),
            Property::Custom(name) => write!(f, "{}", name),
        }
    }
}

/// Property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PropertyValue {
    Text(String),
    Timestamp(Timestamp),
    Bool(bool),
}

impl PropertyValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            PropertyValue::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Text(s)
    }
}

impl From<Timestamp> for PropertyValue {
    fn from(ts: Timestamp) -> Self {
        PropertyValue::Timestamp(ts)
    }
}

/// Property bag of a node.
pub type PropertyMap = BTreeMap<Property, PropertyValue>;

// ============================================================================
// SECURITY
// ============================================================================

/// Node-level permission checked through the permission oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Read,
    Write,
    /// Records management filing permission
    Filing,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::Read => write!(f, "Read"),
            Permission::Write => write!(f, "Write"),
            Permission::Filing => write!(f, "Filing"),
        }
    }
}

/// Hold-specific capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    AddToHold,
    RemoveFromHold,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::AddToHold => write!(f, "AddToHold"),
            Capability::RemoveFromHold => write!(f, "RemoveFromHold"),
        }
    }
}

/// Answer of the permission oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessStatus {
    Allowed,
    Denied,
}

impl AccessStatus {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessStatus::Allowed)
    }
}

impl From<bool> for AccessStatus {
    fn from(allowed: bool) -> Self {
        if allowed {
            AccessStatus::Allowed
        } else {
            AccessStatus::Denied
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_type_roundtrip() {
        for t in [
            NodeType::FilePlan,
            NodeType::HoldContainer,
            NodeType::Hold,
            NodeType::RecordFolder,
            NodeType::Content,
            NodeType::Folder,
        ] {
            assert_eq!(NodeType::from_db_str(t.as_db_str()).unwrap(), t);
        }
        assert!(NodeType::from_db_str("trajectory").is_err());
    }

    #[test]
    fn test_aspect_parse_custom() {
        assert_eq!("frozen".parse::<Aspect>().unwrap(), Aspect::Frozen);
        assert_eq!(
            "legal_review".parse::<Aspect>().unwrap(),
            Aspect::Custom("legal_review".to_string())
        );
        assert!("  ".parse::<Aspect>().is_err());
    }

    #[test]
    fn test_frozen_aspect_owns_marker_properties() {
        assert_eq!(
            Aspect::Frozen.properties(),
            &[Property::FrozenAt, Property::FrozenBy]
        );
        assert!(Aspect::Record.properties().is_empty());
    }

    #[test]
    fn test_class_name_display() {
        assert_eq!(ClassName::from(NodeType::Hold).to_string(), "type:hold");
        assert_eq!(ClassName::from(Aspect::Frozen).to_string(), "aspect:frozen");
    }

    #[test]
    fn test_property_value_accessors() {
        let text = PropertyValue::from("litigation");
        assert_eq!(text.as_text(), Some("litigation"));
        assert!(text.as_timestamp().is_none());
    }

    #[test]
    fn test_access_status_from_bool() {
        assert!(AccessStatus::from(true).is_allowed());
        assert!(!AccessStatus::from(false).is_allowed());
    }
}
