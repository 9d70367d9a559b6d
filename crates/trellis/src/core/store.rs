//! Collaborator store contracts
//!
//! The core never talks to storage directly; it returns decisions and the
//! caller executes them through these two narrow ports. Implementations
//! (in-memory, relational) are swappable adapters.

use anyhow::Result;
use uuid::Uuid;

use super::{Component, Diagram, Relationship};

/// Port for the per-diagram node/edge graph.
///
/// Contract the implementation must uphold:
///
/// - **Referential integrity**: deleting a component removes its dependent
///   relationships and any external annotations keyed by the component id.
/// - **Apply order**: `apply_component_changes` processes deletes first, then
///   inserts, then updates, so a re-parse never trips transient constraint
///   violations.
/// - **Per-diagram serialization**: at most one synchronize-and-persist cycle
///   may be in flight per diagram. Concurrent read-modify-write cycles racing
///   each other can leave duplicate or orphaned components; nothing in this
///   crate detects that after the fact.
pub trait GraphStore: Send + Sync {
    /// All components of a diagram, in insertion order.
    fn get_components(&self, diagram_id: Uuid) -> Result<Vec<Component>>;

    /// All relationships of a diagram, in insertion order.
    fn get_relationships(&self, diagram_id: Uuid) -> Result<Vec<Relationship>>;

    /// Apply a synchronization decision: delete, then insert, then update.
    fn apply_component_changes(
        &mut self,
        diagram_id: Uuid,
        insert: &[Component],
        update: &[Component],
        delete: &[Uuid],
    ) -> Result<()>;

    /// Drop every relationship of the diagram and store the given set instead.
    fn replace_relationships(
        &mut self,
        diagram_id: Uuid,
        relationships: Vec<Relationship>,
    ) -> Result<()>;
}

/// Port for diagram records (source text, checksum, lifecycle status).
///
/// The pipeline only emits transition intent (`mark_parsed`/`mark_failed` on
/// the entity followed by `update`); the store performs the write.
pub trait DiagramStore: Send + Sync {
    /// Persist a new diagram record.
    fn add(&mut self, diagram: Diagram) -> Result<()>;

    /// Overwrite an existing diagram record; fails if it was never added.
    fn update(&mut self, diagram: &Diagram) -> Result<()>;

    /// Fetch a diagram by id.
    fn get(&self, diagram_id: Uuid) -> Option<Diagram>;

    /// All diagrams in upload order.
    fn list(&self) -> Vec<Diagram>;

    /// Fetch a diagram by content checksum, for upload de-duplication.
    fn find_by_checksum(&self, checksum: &str) -> Option<Diagram>;
}
