//! Entity types for diagram graphs
//!
//! This module contains the fundamental types used throughout Trellis:
//! component types, relationship direction, diagram lifecycle status, and the
//! entity structs they hang off.

use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Free-form key/value annotations carried by components and relationships.
///
/// Insertion-ordered; equality is by content.
pub type Metadata = IndexMap<String, String>;

/// The closed set of component types a diagram can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    /// Generic component: `[Name]` or `participant Name`
    #[default]
    Component,
    /// Interface: `interface "Name"`
    Interface,
    /// Human or external agent: `actor Name`
    Actor,
    /// Package/grouping: `package "Name"`
    Package,
    /// Database: `database "Name"`
    Database,
    /// Message queue: `queue "Name"`
    Queue,
    /// System boundary: `system Name`
    SystemBoundary,
    /// External system: `external "Name"`
    ExternalSystem,
}

impl ComponentType {
    /// Stable textual form, also used when deriving deterministic identifiers.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::Component => "component",
            ComponentType::Interface => "interface",
            ComponentType::Actor => "actor",
            ComponentType::Package => "package",
            ComponentType::Database => "database",
            ComponentType::Queue => "queue",
            ComponentType::SystemBoundary => "system_boundary",
            ComponentType::ExternalSystem => "external_system",
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a relationship between two components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipDirection {
    /// Plain arrow: `A --> B`
    #[default]
    Unidirectional,
    /// Double-headed arrow: `A <--> B`
    Bidirectional,
}

impl RelationshipDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipDirection::Unidirectional => "unidirectional",
            RelationshipDirection::Bidirectional => "bidirectional",
        }
    }

    /// Returns true for the `<-->` form.
    pub fn is_bidirectional(&self) -> bool {
        matches!(self, RelationshipDirection::Bidirectional)
    }
}

impl fmt::Display for RelationshipDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of an uploaded diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagramStatus {
    /// Source text stored, never parsed
    #[default]
    Uploaded,
    /// Last parse succeeded; graph is current
    Parsed,
    /// Graph enriched by downstream analysis
    AnalysisReady,
    /// Last parse failed; graph may be stale
    Failed,
}

impl DiagramStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagramStatus::Uploaded => "uploaded",
            DiagramStatus::Parsed => "parsed",
            DiagramStatus::AnalysisReady => "analysis_ready",
            DiagramStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for DiagramStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An uploaded diagram: raw source text plus lifecycle bookkeeping.
///
/// The node/edge graph is stored separately (see
/// [`GraphStore`](crate::core::GraphStore)) and rebuilt on every parse; the
/// diagram row itself only changes status and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    pub id: Uuid,
    pub name: String,
    pub content: String,
    pub checksum: String,
    pub status: DiagramStatus,
    pub uploaded_at: DateTime<Utc>,
    pub parsed_at: Option<DateTime<Utc>>,
}

impl Diagram {
    /// Create a freshly uploaded diagram.
    pub fn new(
        name: impl Into<String>,
        content: impl Into<String>,
        checksum: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            content: content.into(),
            checksum: checksum.into(),
            status: DiagramStatus::Uploaded,
            uploaded_at: Utc::now(),
            parsed_at: None,
        }
    }

    pub fn mark_parsed(&mut self) {
        self.status = DiagramStatus::Parsed;
        self.parsed_at = Some(Utc::now());
    }

    pub fn mark_failed(&mut self) {
        self.status = DiagramStatus::Failed;
    }

    pub fn mark_analysis_ready(&mut self) {
        self.status = DiagramStatus::AnalysisReady;
    }
}

/// A named, typed node in a diagram's graph.
///
/// Identity is diagram-scoped: within one synchronized diagram no two
/// components share the same case-insensitive, whitespace-normalized name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub id: Uuid,
    pub diagram_id: Uuid,
    /// Display name exactly as written in the diagram source
    pub name: String,
    pub component_type: ComponentType,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Component {
    /// Create a new component with a random identifier and empty metadata.
    pub fn new(diagram_id: Uuid, name: impl Into<String>, component_type: ComponentType) -> Self {
        Self {
            id: Uuid::new_v4(),
            diagram_id,
            name: name.into(),
            component_type,
            metadata: Metadata::new(),
        }
    }

    /// Create a new component with metadata attached.
    pub fn with_metadata(
        diagram_id: Uuid,
        name: impl Into<String>,
        component_type: ComponentType,
        metadata: Metadata,
    ) -> Self {
        Self {
            metadata,
            ..Self::new(diagram_id, name, component_type)
        }
    }
}

/// A directed or bidirectional connection between two components of the same
/// diagram.
///
/// Relationships are wholesale-replaced on every re-parse; their identifiers
/// carry no cross-parse meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: Uuid,
    pub diagram_id: Uuid,
    pub source_id: Uuid,
    pub target_id: Uuid,
    pub label: Option<String>,
    pub direction: RelationshipDirection,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Relationship {
    /// Create a new unidirectional, unlabeled relationship.
    pub fn new(diagram_id: Uuid, source_id: Uuid, target_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            diagram_id,
            source_id,
            target_id,
            label: None,
            direction: RelationshipDirection::Unidirectional,
            metadata: Metadata::new(),
        }
    }

    /// Create a new relationship with a label.
    pub fn with_label(
        diagram_id: Uuid,
        source_id: Uuid,
        target_id: Uuid,
        label: impl Into<String>,
    ) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::new(diagram_id, source_id, target_id)
        }
    }

    /// Create a new relationship with an explicit direction.
    pub fn with_direction(
        diagram_id: Uuid,
        source_id: Uuid,
        target_id: Uuid,
        direction: RelationshipDirection,
    ) -> Self {
        Self {
            direction,
            ..Self::new(diagram_id, source_id, target_id)
        }
    }
}
