//! Identity synchronization between parse results and persisted graphs
//!
//! Re-parsing a diagram must not orphan external references (impact-matrix
//! cells, UI selections) to components that conceptually still exist. The
//! synchronizer matches freshly parsed nodes against the previously persisted
//! set by normalized name, reuses persisted identifiers where names match,
//! mints deterministic identifiers for genuinely new nodes, and schedules
//! everything else for deletion.
//!
//! The synchronizer has no side effects: it returns a [`SyncPlan`] and the
//! graph store executes it. Edges are never matched against persisted edges;
//! every re-parse replaces the whole edge set.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};
use uuid::Uuid;

use crate::core::{Component, ComponentType, Relationship};
use crate::parser::{LocalId, ParsedEdge, ParsedNode};

/// Normalize a display name into the cross-parse matching key: trimmed,
/// internal whitespace runs collapsed to single spaces, lowercased.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Deterministic component identifier derived from
/// `(diagram id, normalized name, type)`.
///
/// Re-parsing identical source regenerates identical identifiers even when no
/// persisted copy exists to match against, which keeps crash-and-retry and
/// concurrent-first-parse scenarios idempotent.
pub fn stable_component_id(
    diagram_id: Uuid,
    normalized_name: &str,
    component_type: ComponentType,
) -> Uuid {
    let key = format!("{}::{}", normalized_name, component_type.as_str());
    Uuid::new_v5(&diagram_id, key.as_bytes())
}

/// The reconciliation decision for one diagram.
///
/// Apply order matters: delete obsolete components first, then insert, then
/// update, then replace the edge set (see
/// [`GraphStore`](crate::core::GraphStore)).
#[derive(Debug, Clone, Default)]
pub struct SyncPlan {
    /// Parser-local id → final persisted id, for edge rewriting
    pub id_mapping: HashMap<LocalId, Uuid>,
    pub to_insert: Vec<Component>,
    pub to_update: Vec<Component>,
    pub to_delete: Vec<Uuid>,
}

impl SyncPlan {
    /// True when applying the plan would not change the persisted node set.
    pub fn is_noop(&self) -> bool {
        self.to_insert.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }
}

/// Reconciles fresh parse results with a diagram's persisted component set.
pub struct IdentitySynchronizer;

impl IdentitySynchronizer {
    pub fn new() -> Self {
        Self
    }

    /// Compute the insert/update/delete sets and the local→persisted id
    /// mapping for a freshly parsed node list.
    ///
    /// Never fails; empty inputs yield empty outputs. The match key is the
    /// normalized name only, so a node whose type changed but whose name did
    /// not is the *same* node, flagged for update rather than replaced.
    pub fn synchronize(
        &self,
        diagram_id: Uuid,
        fresh: &[ParsedNode],
        persisted: &[Component],
    ) -> SyncPlan {
        let persisted_by_name: HashMap<String, &Component> = persisted
            .iter()
            .map(|component| (normalize_name(&component.name), component))
            .collect();

        let mut plan = SyncPlan::default();
        let mut final_ids: HashSet<Uuid> = HashSet::new();
        let mut claimed: HashMap<String, Uuid> = HashMap::new();

        for node in fresh {
            let key = normalize_name(&node.name);

            if let Some(&id) = claimed.get(&key) {
                // An earlier fresh node already owns this name; map the
                // duplicate onto the same identifier without another insert.
                trace!(name = %node.name, "normalized-name duplicate within parse");
                plan.id_mapping.insert(node.local_id, id);
                continue;
            }

            if let Some(existing) = persisted_by_name.get(&key) {
                plan.id_mapping.insert(node.local_id, existing.id);
                final_ids.insert(existing.id);
                claimed.insert(key, existing.id);

                if existing.name != node.name
                    || existing.component_type != node.component_type
                    || existing.metadata != node.metadata
                {
                    plan.to_update.push(Component {
                        id: existing.id,
                        diagram_id,
                        name: node.name.clone(),
                        component_type: node.component_type,
                        metadata: node.metadata.clone(),
                    });
                }
            } else {
                let id = stable_component_id(diagram_id, &key, node.component_type);
                plan.id_mapping.insert(node.local_id, id);
                final_ids.insert(id);
                claimed.insert(key, id);
                plan.to_insert.push(Component {
                    id,
                    diagram_id,
                    name: node.name.clone(),
                    component_type: node.component_type,
                    metadata: node.metadata.clone(),
                });
            }
        }

        for component in persisted {
            if !final_ids.contains(&component.id) {
                plan.to_delete.push(component.id);
            }
        }

        debug!(
            inserted = plan.to_insert.len(),
            updated = plan.to_update.len(),
            deleted = plan.to_delete.len(),
            mapped = plan.id_mapping.len(),
            "synchronization plan computed"
        );
        plan
    }

    /// Rewrite parsed edges through the id mapping into persistable
    /// relationships.
    ///
    /// The result is meant for a wholesale replace of the diagram's edge set;
    /// edges are never diffed against persisted edges. An edge whose endpoint
    /// is missing from the mapping is dropped.
    pub fn rewrite_edges(
        &self,
        diagram_id: Uuid,
        edges: &[ParsedEdge],
        id_mapping: &HashMap<LocalId, Uuid>,
    ) -> Vec<Relationship> {
        edges
            .iter()
            .filter_map(|edge| {
                let source_id = *id_mapping.get(&edge.source)?;
                let target_id = *id_mapping.get(&edge.target)?;
                Some(Relationship {
                    id: Uuid::new_v4(),
                    diagram_id,
                    source_id,
                    target_id,
                    label: edge.label.clone(),
                    direction: edge.direction,
                    metadata: edge.metadata.clone(),
                })
            })
            .collect()
    }
}

impl Default for IdentitySynchronizer {
    fn default() -> Self {
        Self::new()
    }
}
