//! Trellis - Parse architecture diagrams into stable component graphs
//!
//! A library for parsing PlantUML-like architecture diagram text into a typed
//! graph of components and relationships, keeping component identity stable
//! across re-parses of the same diagram, and diffing two diagrams by name.
//!
//! # Quick Start
//!
//! ```rust
//! use trellis::parse;
//!
//! let graph = parse("[Frontend] as FE\n[Backend] as BE\nFE --> BE : HTTP").unwrap();
//! assert_eq!(graph.node_count(), 2);
//! assert_eq!(graph.edge_count(), 1);
//! ```
//!
//! # The full pipeline
//!
//! For persistence-aware use, the [`service::DiagramService`] composes the
//! parser, the identity synchronizer, and a pair of store adapters:
//!
//! ```rust
//! use trellis::prelude::*;
//!
//! let mut service =
//!     DiagramService::new(InMemoryDiagramStore::new(), InMemoryGraphStore::new());
//!
//! let diagram = service.upload("demo", "[A]\n[B]\nA --> B : call").unwrap();
//! let (components, relationships) = service.parse_diagram(diagram.id).unwrap();
//! assert_eq!(components.len(), 2);
//! assert_eq!(relationships.len(), 1);
//!
//! // Re-parsing identical source keeps every component identifier stable.
//! let (reparsed, _) = service.parse_diagram(diagram.id).unwrap();
//! assert_eq!(
//!     components.iter().map(|c| c.id).collect::<Vec<_>>(),
//!     reparsed.iter().map(|c| c.id).collect::<Vec<_>>(),
//! );
//! ```

pub mod core;
pub mod diff;
pub mod parser;
pub mod service;
pub mod store;
pub mod sync;

pub use core::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        Component, ComponentType, Diagram, DiagramError, DiagramStatus, DiagramStore, GraphStore,
        Metadata, Relationship, RelationshipDirection,
    };
    pub use crate::diff::{diff, ChangeKind, ComponentDiff, DiffReport, GraphSnapshot, RelationshipDiff};
    pub use crate::parser::{ParsedEdge, ParsedGraph, ParsedNode, PlantUmlParser};
    pub use crate::service::DiagramService;
    pub use crate::store::{InMemoryDiagramStore, InMemoryGraphStore};
    pub use crate::sync::{IdentitySynchronizer, SyncPlan};
}

/// Parse diagram source into a diagram-local graph.
///
/// This is the simplest entry point when no persistence is involved. Fails
/// only on blank input; anything unrecognized inside the text is skipped.
///
/// # Example
/// ```rust
/// use trellis::parse;
///
/// let graph = parse("database \"Main DB\" as DB\n[API]\nAPI --> DB : SQL").unwrap();
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.edges[0].label.as_deref(), Some("SQL"));
/// ```
pub fn parse(input: &str) -> Result<parser::ParsedGraph, DiagramError> {
    parser::PlantUmlParser::new().parse(input)
}
