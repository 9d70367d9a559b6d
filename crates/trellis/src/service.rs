//! Diagram pipeline service
//!
//! Wires the parser, identity synchronizer, and diff engine to the store
//! ports: upload with checksum de-duplication, parse-and-synchronize with
//! lifecycle transitions, and read-only diffing of two diagrams.
//!
//! `parse_diagram` takes `&mut self`, so one service instance runs at most
//! one synchronize-and-persist cycle at a time. Callers sharing a graph
//! store across several services must serialize those cycles per diagram
//! themselves (see [`GraphStore`]).

use sha2::{Digest, Sha256};
use tracing::{debug, info, span, Level};
use uuid::Uuid;

use crate::core::{
    Component, Diagram, DiagramError, DiagramStatus, DiagramStore, GraphStore, Relationship,
};
use crate::diff::{diff, DiffReport, GraphSnapshot};
use crate::parser::PlantUmlParser;
use crate::sync::IdentitySynchronizer;

/// SHA-256 content checksum, hex-encoded, used for upload de-duplication.
pub fn content_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect()
}

/// Orchestrates the upload → parse → synchronize → diff pipeline over a pair
/// of store adapters.
pub struct DiagramService<D: DiagramStore, G: GraphStore> {
    diagrams: D,
    graph: G,
    parser: PlantUmlParser,
    synchronizer: IdentitySynchronizer,
}

impl<D: DiagramStore, G: GraphStore> DiagramService<D, G> {
    pub fn new(diagrams: D, graph: G) -> Self {
        Self {
            diagrams,
            graph,
            parser: PlantUmlParser::new(),
            synchronizer: IdentitySynchronizer::new(),
        }
    }

    /// Register a new diagram from raw source text.
    ///
    /// Fails with [`DiagramError::AlreadyExists`] when a diagram with the
    /// same content checksum was uploaded before.
    pub fn upload(&mut self, name: &str, content: &str) -> Result<Diagram, DiagramError> {
        let checksum = content_checksum(content);
        if let Some(existing) = self.diagrams.find_by_checksum(&checksum) {
            return Err(DiagramError::already_exists(existing.id));
        }

        let diagram = Diagram::new(name, content, checksum);
        info!(diagram_id = %diagram.id, name = %diagram.name, "diagram uploaded");
        self.diagrams.add(diagram.clone())?;
        Ok(diagram)
    }

    /// Replace a diagram's source text ahead of a re-parse.
    ///
    /// Resets the lifecycle to `uploaded`; the graph keeps its previous state
    /// until the next [`parse_diagram`](Self::parse_diagram).
    pub fn update_source(
        &mut self,
        diagram_id: Uuid,
        content: &str,
    ) -> Result<Diagram, DiagramError> {
        let mut diagram = self
            .diagrams
            .get(diagram_id)
            .ok_or_else(|| DiagramError::not_found(diagram_id))?;
        diagram.content = content.to_string();
        diagram.checksum = content_checksum(content);
        diagram.status = DiagramStatus::Uploaded;
        self.diagrams.update(&diagram)?;
        Ok(diagram)
    }

    /// Fetch a diagram record.
    pub fn get(&self, diagram_id: Uuid) -> Option<Diagram> {
        self.diagrams.get(diagram_id)
    }

    /// All diagram records in upload order.
    pub fn list(&self) -> Vec<Diagram> {
        self.diagrams.list()
    }

    /// Parse a diagram's source and reconcile the persisted graph with it.
    ///
    /// On parse failure the diagram is marked `failed` and the error is
    /// propagated; the previously persisted graph is left untouched. On
    /// success the component set is synchronized (identifiers preserved for
    /// matching names), the relationship set is wholesale-replaced, and the
    /// diagram is marked `parsed`.
    pub fn parse_diagram(
        &mut self,
        diagram_id: Uuid,
    ) -> Result<(Vec<Component>, Vec<Relationship>), DiagramError> {
        let parse_span = span!(Level::INFO, "parse_diagram", diagram_id = %diagram_id);
        let _enter = parse_span.enter();

        let mut diagram = self
            .diagrams
            .get(diagram_id)
            .ok_or_else(|| DiagramError::not_found(diagram_id))?;

        let parsed = match self.parser.parse(&diagram.content) {
            Ok(parsed) => parsed,
            Err(error) => {
                diagram.mark_failed();
                self.diagrams.update(&diagram)?;
                return Err(error);
            }
        };

        let persisted = self.graph.get_components(diagram_id)?;
        let plan = self
            .synchronizer
            .synchronize(diagram_id, &parsed.nodes, &persisted);
        let relationships =
            self.synchronizer
                .rewrite_edges(diagram_id, &parsed.edges, &plan.id_mapping);

        self.graph.apply_component_changes(
            diagram_id,
            &plan.to_insert,
            &plan.to_update,
            &plan.to_delete,
        )?;
        self.graph
            .replace_relationships(diagram_id, relationships.clone())?;

        diagram.mark_parsed();
        self.diagrams.update(&diagram)?;

        let components = self.graph.get_components(diagram_id)?;
        debug!(
            component_count = components.len(),
            relationship_count = relationships.len(),
            "diagram parsed and synchronized"
        );
        Ok((components, relationships))
    }

    /// The persisted graph of one diagram.
    pub fn snapshot(&self, diagram_id: Uuid) -> Result<GraphSnapshot, DiagramError> {
        if self.diagrams.get(diagram_id).is_none() {
            return Err(DiagramError::not_found(diagram_id));
        }
        Ok(GraphSnapshot::new(
            self.graph.get_components(diagram_id)?,
            self.graph.get_relationships(diagram_id)?,
        ))
    }

    /// Compare two synchronized diagrams by name.
    pub fn diff_diagrams(
        &self,
        base_id: Uuid,
        target_id: Uuid,
    ) -> Result<DiffReport, DiagramError> {
        let base = self.snapshot(base_id)?;
        let target = self.snapshot(target_id)?;
        Ok(diff(&base, &target))
    }
}
