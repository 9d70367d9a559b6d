//! Integration tests for the text parser's public API

use trellis::parse;
use trellis::prelude::*;

#[test]
fn test_frontend_backend_database_scenario() {
    let graph = parse(
        "[Frontend] as FE\n[Backend] as BE\ndatabase \"Main DB\" as DB\nFE --> BE : HTTP\nBE --> DB : SQL",
    )
    .unwrap();

    assert_eq!(graph.node_count(), 3);
    let names: Vec<_> = graph.nodes.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["Frontend", "Backend", "Main DB"]);
    assert_eq!(graph.nodes[0].component_type, ComponentType::Component);
    assert_eq!(graph.nodes[1].component_type, ComponentType::Component);
    assert_eq!(graph.nodes[2].component_type, ComponentType::Database);

    assert_eq!(graph.edge_count(), 2);
    for edge in &graph.edges {
        assert_eq!(edge.direction, RelationshipDirection::Unidirectional);
    }
    assert_eq!(graph.edges[0].label.as_deref(), Some("HTTP"));
    assert_eq!(graph.edges[1].label.as_deref(), Some("SQL"));
    assert_eq!(graph.node(graph.edges[1].source).unwrap().name, "Backend");
    assert_eq!(graph.node(graph.edges[1].target).unwrap().name, "Main DB");
}

#[test]
fn test_bidirectional_scenario() {
    let graph = parse("[Client]\n[Server]\nClient <--> Server").unwrap();
    assert_eq!(graph.edge_count(), 1);
    assert_eq!(
        graph.edges[0].direction,
        RelationshipDirection::Bidirectional
    );
}

#[test]
fn test_blank_input_is_a_parse_error() {
    for blank in ["", "   ", "\n\t\n", "  \r\n "] {
        let error = parse(blank).unwrap_err();
        assert!(error.is_parse_error(), "expected parse error for {:?}", blank);
    }
}

#[test]
fn test_unrecognized_lines_are_ignored_not_errors() {
    let graph = parse(
        "@startuml\ntitle Order flow\nskinparam monochrome true\n[API]\nnote left of API\n@enduml",
    )
    .unwrap();
    assert_eq!(graph.node_count(), 1);
    assert_eq!(graph.nodes[0].name, "API");
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn test_every_declaration_keyword_maps_to_its_type() {
    let graph = parse(
        "actor Customer\nparticipant Billing\nsystem Warehouse\ninterface \"Payments API\"\npackage \"Shared Kernel\"\ndatabase \"Ledger\"\nqueue \"Events\"\nexternal \"Tax Service\"\n[Plain]",
    )
    .unwrap();

    let types: Vec<_> = graph
        .nodes
        .iter()
        .map(|n| (n.name.as_str(), n.component_type))
        .collect();
    assert_eq!(
        types,
        vec![
            ("Customer", ComponentType::Actor),
            ("Billing", ComponentType::Component),
            ("Warehouse", ComponentType::SystemBoundary),
            ("Payments API", ComponentType::Interface),
            ("Shared Kernel", ComponentType::Package),
            ("Ledger", ComponentType::Database),
            ("Events", ComponentType::Queue),
            ("Tax Service", ComponentType::ExternalSystem),
            ("Plain", ComponentType::Component),
        ]
    );
}

#[test]
fn test_alias_is_used_for_resolution_but_display_name_is_kept() {
    let graph = parse("queue \"Message Bus\" as BUS\n[Producer]\nProducer --> BUS : events").unwrap();

    assert_eq!(graph.nodes[0].name, "Message Bus");
    assert_eq!(graph.edge_count(), 1);
    assert_eq!(
        graph.node(graph.edges[0].target).unwrap().name,
        "Message Bus"
    );
}

#[test]
fn test_duplicate_exact_names_keep_first_declaration() {
    let graph = parse("[Gateway]\nqueue \"Gateway\"\n[Gateway]").unwrap();
    assert_eq!(graph.node_count(), 1);
    assert_eq!(graph.nodes[0].component_type, ComponentType::Component);
}

#[test]
fn test_relationships_with_undeclared_endpoints_are_dropped() {
    let graph = parse("[A]\nA --> Missing : x\nMissing --> A\nNobody <--> NoOne").unwrap();
    assert_eq!(graph.node_count(), 1);
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn test_mixed_realistic_document() {
    let content = r#"
        @startuml
        ' Architecture sketch, rev 3
        actor Customer
        [Storefront] as SF
        [Checkout] as CO
        database "Orders DB" as ODB
        queue "Fulfillment Queue" as FQ
        external "Payment Gateway" as PG

        Customer --> SF
        SF --> CO : add to cart
        CO --> ODB : persist order
        CO <--> PG : authorize
        CO --> FQ : enqueue
        @enduml
    "#;

    let graph = parse(content).unwrap();
    assert_eq!(graph.node_count(), 6);
    assert_eq!(graph.edge_count(), 5);

    let bidirectional: Vec<_> = graph
        .edges
        .iter()
        .filter(|e| e.direction.is_bidirectional())
        .collect();
    assert_eq!(bidirectional.len(), 1);
    assert_eq!(
        graph.node(bidirectional[0].target).unwrap().name,
        "Payment Gateway"
    );
}

#[test]
fn test_parser_output_is_byte_for_byte_deterministic() {
    let content = "[A] as X\nactor Bob\nqueue \"Q\"\nA --> Bob : ping\nBob <--> X\njunk line";
    let first = parse(content).unwrap();
    let second = parse(content).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}
