//! Name-keyed structural diff between two diagrams
//!
//! Compares two independently synchronized graphs by semantic identity
//! (normalized component name), never by internal identifier, so diagrams
//! with disjoint identifier spaces diff cleanly. Pure and deterministic:
//! neither input is mutated and identical inputs always produce an identical
//! report.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Serialize;
use uuid::Uuid;

use crate::core::{Component, ComponentType, Relationship, RelationshipDirection};
use crate::parser::ParsedGraph;
use crate::sync::normalize_name;

/// What happened to a component or relationship between base and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeKind::Added => f.write_str("added"),
            ChangeKind::Removed => f.write_str("removed"),
            ChangeKind::Modified => f.write_str("modified"),
        }
    }
}

/// A component-level change record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentDiff {
    pub name: String,
    pub change: ChangeKind,
    pub previous_type: Option<ComponentType>,
    pub new_type: Option<ComponentType>,
}

/// A relationship-level change record, keyed by endpoint names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationshipDiff {
    pub source: String,
    pub target: String,
    pub change: ChangeKind,
    pub previous_label: Option<String>,
    pub new_label: Option<String>,
    pub previous_direction: Option<RelationshipDirection>,
    pub new_direction: Option<RelationshipDirection>,
}

/// The full change report for one base/target pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiffReport {
    pub components: Vec<ComponentDiff>,
    pub relationships: Vec<RelationshipDiff>,
}

impl DiffReport {
    pub fn is_empty(&self) -> bool {
        self.components.is_empty() && self.relationships.is_empty()
    }
}

/// A synchronized graph: components plus relationships resolved to persisted
/// identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphSnapshot {
    pub components: Vec<Component>,
    pub relationships: Vec<Relationship>,
}

impl GraphSnapshot {
    pub fn new(components: Vec<Component>, relationships: Vec<Relationship>) -> Self {
        Self {
            components,
            relationships,
        }
    }

    /// Build a snapshot from a raw parse result by synchronizing it against
    /// an empty persisted set under the given diagram id.
    pub fn from_parsed(diagram_id: Uuid, graph: &ParsedGraph) -> Self {
        let synchronizer = crate::sync::IdentitySynchronizer::new();
        let plan = synchronizer.synchronize(diagram_id, &graph.nodes, &[]);
        let relationships = synchronizer.rewrite_edges(diagram_id, &graph.edges, &plan.id_mapping);
        Self {
            components: plan.to_insert,
            relationships,
        }
    }
}

/// Compare two synchronized graphs and report structural changes by name.
///
/// Components match on normalized name; a matched pair whose type differs is
/// `Modified` (metadata-only changes are not reported). Relationships match
/// on the `(source name, target name)` pair resolved through each graph's own
/// component table; a matched pair reports `Modified` when label or direction
/// differs. Duplicate relationship keys collapse last-wins on both sides.
///
/// # Example
/// ```rust
/// use trellis::diff::{diff, GraphSnapshot};
///
/// let empty = GraphSnapshot::default();
/// assert!(diff(&empty, &empty).is_empty());
/// ```
pub fn diff(base: &GraphSnapshot, target: &GraphSnapshot) -> DiffReport {
    DiffReport {
        components: diff_components(&base.components, &target.components),
        relationships: diff_relationships(base, target),
    }
}

fn diff_components(base: &[Component], target: &[Component]) -> Vec<ComponentDiff> {
    let base_by_name: IndexMap<String, &Component> = base
        .iter()
        .map(|component| (normalize_name(&component.name), component))
        .collect();
    let target_by_name: IndexMap<String, &Component> = target
        .iter()
        .map(|component| (normalize_name(&component.name), component))
        .collect();

    let mut diffs = Vec::new();

    for (key, target_component) in &target_by_name {
        match base_by_name.get(key) {
            None => diffs.push(ComponentDiff {
                name: target_component.name.clone(),
                change: ChangeKind::Added,
                previous_type: None,
                new_type: Some(target_component.component_type),
            }),
            Some(base_component)
                if base_component.component_type != target_component.component_type =>
            {
                diffs.push(ComponentDiff {
                    name: target_component.name.clone(),
                    change: ChangeKind::Modified,
                    previous_type: Some(base_component.component_type),
                    new_type: Some(target_component.component_type),
                });
            }
            Some(_) => {}
        }
    }

    for (key, base_component) in &base_by_name {
        if !target_by_name.contains_key(key) {
            diffs.push(ComponentDiff {
                name: base_component.name.clone(),
                change: ChangeKind::Removed,
                previous_type: Some(base_component.component_type),
                new_type: None,
            });
        }
    }

    diffs
}

struct KeyedRelationship<'a> {
    source_name: &'a str,
    target_name: &'a str,
    relationship: &'a Relationship,
}

/// Key every relationship by its endpoints' normalized names, resolved
/// through the snapshot's own component table. Relationships referencing
/// unknown component ids are skipped; duplicate keys keep the last-seen
/// relationship.
fn relationship_keys(snapshot: &GraphSnapshot) -> IndexMap<(String, String), KeyedRelationship<'_>> {
    let names_by_id: HashMap<Uuid, &str> = snapshot
        .components
        .iter()
        .map(|component| (component.id, component.name.as_str()))
        .collect();

    let mut keyed = IndexMap::new();
    for relationship in &snapshot.relationships {
        let (Some(source_name), Some(target_name)) = (
            names_by_id.get(&relationship.source_id).copied(),
            names_by_id.get(&relationship.target_id).copied(),
        ) else {
            continue;
        };
        keyed.insert(
            (normalize_name(source_name), normalize_name(target_name)),
            KeyedRelationship {
                source_name,
                target_name,
                relationship,
            },
        );
    }
    keyed
}

fn diff_relationships(base: &GraphSnapshot, target: &GraphSnapshot) -> Vec<RelationshipDiff> {
    let mut base_by_key = relationship_keys(base);
    let target_by_key = relationship_keys(target);

    let mut diffs = Vec::new();

    for (key, entry) in &target_by_key {
        match base_by_key.shift_remove(key) {
            None => diffs.push(RelationshipDiff {
                source: entry.source_name.to_string(),
                target: entry.target_name.to_string(),
                change: ChangeKind::Added,
                previous_label: None,
                new_label: entry.relationship.label.clone(),
                previous_direction: None,
                new_direction: Some(entry.relationship.direction),
            }),
            Some(base_entry) => {
                if base_entry.relationship.label != entry.relationship.label
                    || base_entry.relationship.direction != entry.relationship.direction
                {
                    diffs.push(RelationshipDiff {
                        source: entry.source_name.to_string(),
                        target: entry.target_name.to_string(),
                        change: ChangeKind::Modified,
                        previous_label: base_entry.relationship.label.clone(),
                        new_label: entry.relationship.label.clone(),
                        previous_direction: Some(base_entry.relationship.direction),
                        new_direction: Some(entry.relationship.direction),
                    });
                }
            }
        }
    }

    // Whatever was not consumed by a matching target key was removed
    for entry in base_by_key.values() {
        diffs.push(RelationshipDiff {
            source: entry.source_name.to_string(),
            target: entry.target_name.to_string(),
            change: ChangeKind::Removed,
            previous_label: entry.relationship.label.clone(),
            new_label: None,
            previous_direction: Some(entry.relationship.direction),
            new_direction: None,
        });
    }

    diffs
}
