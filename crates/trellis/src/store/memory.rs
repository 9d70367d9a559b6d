//! In-memory store adapters
//!
//! Reference implementations of [`GraphStore`] and [`DiagramStore`], used by
//! the tests and the CLI. Both keep insertion order for deterministic
//! listings. The `&mut self` receivers make a single owner the single
//! writer, which is exactly the per-diagram serialization the synchronizer
//! relies on.

use std::collections::{HashMap, HashSet};

use anyhow::{bail, Result};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::core::{Component, Diagram, DiagramStore, GraphStore, Relationship};

/// In-memory node/edge graph store, grouped per diagram.
#[derive(Debug, Default)]
pub struct InMemoryGraphStore {
    components: HashMap<Uuid, Vec<Component>>,
    relationships: HashMap<Uuid, Vec<Relationship>>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of components stored for a diagram.
    pub fn component_count(&self, diagram_id: Uuid) -> usize {
        self.components.get(&diagram_id).map_or(0, Vec::len)
    }

    /// Number of relationships stored for a diagram.
    pub fn relationship_count(&self, diagram_id: Uuid) -> usize {
        self.relationships.get(&diagram_id).map_or(0, Vec::len)
    }
}

impl GraphStore for InMemoryGraphStore {
    fn get_components(&self, diagram_id: Uuid) -> Result<Vec<Component>> {
        Ok(self.components.get(&diagram_id).cloned().unwrap_or_default())
    }

    fn get_relationships(&self, diagram_id: Uuid) -> Result<Vec<Relationship>> {
        Ok(self
            .relationships
            .get(&diagram_id)
            .cloned()
            .unwrap_or_default())
    }

    fn apply_component_changes(
        &mut self,
        diagram_id: Uuid,
        insert: &[Component],
        update: &[Component],
        delete: &[Uuid],
    ) -> Result<()> {
        trace!(
            diagram_id = %diagram_id,
            insert = insert.len(),
            update = update.len(),
            delete = delete.len(),
            "applying component changes"
        );

        // Deletes first, cascading to dependent relationships
        if !delete.is_empty() {
            let removed: HashSet<Uuid> = delete.iter().copied().collect();
            if let Some(components) = self.components.get_mut(&diagram_id) {
                components.retain(|component| !removed.contains(&component.id));
            }
            if let Some(relationships) = self.relationships.get_mut(&diagram_id) {
                relationships.retain(|relationship| {
                    !removed.contains(&relationship.source_id)
                        && !removed.contains(&relationship.target_id)
                });
            }
        }

        let components = self.components.entry(diagram_id).or_default();
        for component in insert {
            components.push(component.clone());
        }
        for component in update {
            if let Some(slot) = components.iter_mut().find(|c| c.id == component.id) {
                *slot = component.clone();
            }
        }

        debug!(
            diagram_id = %diagram_id,
            component_count = components.len(),
            "component changes applied"
        );
        Ok(())
    }

    fn replace_relationships(
        &mut self,
        diagram_id: Uuid,
        relationships: Vec<Relationship>,
    ) -> Result<()> {
        debug!(
            diagram_id = %diagram_id,
            relationship_count = relationships.len(),
            "replacing relationship set"
        );
        self.relationships.insert(diagram_id, relationships);
        Ok(())
    }
}

/// In-memory diagram record store with a checksum index for upload
/// de-duplication.
#[derive(Debug, Default)]
pub struct InMemoryDiagramStore {
    diagrams: HashMap<Uuid, Diagram>,
    order: Vec<Uuid>,
    by_checksum: HashMap<String, Uuid>,
}

impl InMemoryDiagramStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DiagramStore for InMemoryDiagramStore {
    fn add(&mut self, diagram: Diagram) -> Result<()> {
        trace!(diagram_id = %diagram.id, name = %diagram.name, "adding diagram");
        if !self.diagrams.contains_key(&diagram.id) {
            self.order.push(diagram.id);
        }
        self.by_checksum.insert(diagram.checksum.clone(), diagram.id);
        self.diagrams.insert(diagram.id, diagram);
        Ok(())
    }

    fn update(&mut self, diagram: &Diagram) -> Result<()> {
        if !self.diagrams.contains_key(&diagram.id) {
            bail!("diagram {} does not exist", diagram.id);
        }
        self.by_checksum.insert(diagram.checksum.clone(), diagram.id);
        self.diagrams.insert(diagram.id, diagram.clone());
        Ok(())
    }

    fn get(&self, diagram_id: Uuid) -> Option<Diagram> {
        self.diagrams.get(&diagram_id).cloned()
    }

    fn list(&self) -> Vec<Diagram> {
        self.order
            .iter()
            .filter_map(|id| self.diagrams.get(id))
            .cloned()
            .collect()
    }

    fn find_by_checksum(&self, checksum: &str) -> Option<Diagram> {
        self.by_checksum
            .get(checksum)
            .and_then(|id| self.diagrams.get(id))
            .cloned()
    }
}
