//! Integration tests for the diff engine

use trellis::diff::{diff, ChangeKind, GraphSnapshot};
use trellis::parse;
use trellis::prelude::*;
use uuid::Uuid;

fn snapshot(content: &str) -> GraphSnapshot {
    GraphSnapshot::from_parsed(Uuid::new_v4(), &parse(content).unwrap())
}

#[test]
fn test_diagram_compared_to_itself_is_empty() {
    let content = "[Frontend] as FE\n[Backend] as BE\ndatabase \"Main DB\" as DB\nFE --> BE : HTTP\nBE --> DB : SQL";
    let graph = snapshot(content);
    let report = diff(&graph, &graph);
    assert!(report.is_empty());
}

#[test]
fn test_identifier_spaces_are_independent() {
    // Two separately synchronized diagrams have disjoint component ids; the
    // diff must match on names alone.
    let content = "[A]\nqueue \"Q\"\nA --> Q : enqueue";
    let base = snapshot(content);
    let target = snapshot(content);
    assert_ne!(base.components[0].id, target.components[0].id);
    assert!(diff(&base, &target).is_empty());
}

#[test]
fn test_modified_edge_label_scenario() {
    let base = snapshot("[BE]\ndatabase \"DB\"\nBE --> DB : SQL");
    let target = snapshot("[BE]\ndatabase \"DB\"\nBE --> DB : SQL(read)");

    let report = diff(&base, &target);
    assert!(report.components.is_empty());
    assert_eq!(report.relationships.len(), 1);

    let entry = &report.relationships[0];
    assert_eq!(entry.change, ChangeKind::Modified);
    assert_eq!(entry.source, "BE");
    assert_eq!(entry.target, "DB");
    assert_eq!(entry.previous_label.as_deref(), Some("SQL"));
    assert_eq!(entry.new_label.as_deref(), Some("SQL(read)"));
}

#[test]
fn test_added_queue_scenario() {
    let base = snapshot("[API]");
    let target = snapshot("[API]\nqueue \"Cache\" as CACHE");

    let report = diff(&base, &target);
    assert_eq!(report.components.len(), 1);
    let entry = &report.components[0];
    assert_eq!(entry.change, ChangeKind::Added);
    assert_eq!(entry.name, "Cache");
    assert_eq!(entry.new_type, Some(ComponentType::Queue));
}

#[test]
fn test_removed_component_reports_previous_type() {
    let base = snapshot("[API]\nexternal \"Tax Service\"");
    let target = snapshot("[API]");

    let report = diff(&base, &target);
    assert_eq!(report.components.len(), 1);
    let entry = &report.components[0];
    assert_eq!(entry.change, ChangeKind::Removed);
    assert_eq!(entry.name, "Tax Service");
    assert_eq!(entry.previous_type, Some(ComponentType::ExternalSystem));
    assert_eq!(entry.new_type, None);
}

#[test]
fn test_type_change_with_same_name_is_modified() {
    let base = snapshot("database \"Storage\"");
    let target = snapshot("queue \"Storage\"");

    let report = diff(&base, &target);
    assert_eq!(report.components.len(), 1);
    assert_eq!(report.components[0].change, ChangeKind::Modified);
    assert_eq!(
        report.components[0].previous_type,
        Some(ComponentType::Database)
    );
    assert_eq!(report.components[0].new_type, Some(ComponentType::Queue));
}

#[test]
fn test_direction_flip_is_modified() {
    let base = snapshot("[Client]\n[Server]\nClient --> Server");
    let target = snapshot("[Client]\n[Server]\nClient <--> Server");

    let report = diff(&base, &target);
    assert_eq!(report.relationships.len(), 1);
    assert_eq!(report.relationships[0].change, ChangeKind::Modified);
    assert_eq!(
        report.relationships[0].new_direction,
        Some(RelationshipDirection::Bidirectional)
    );
}

#[test]
fn test_report_order_is_target_first_then_removed() {
    let base = snapshot("[A]\n[B]\n[C]");
    let target = snapshot("[A]\n[D]\n[E]");

    let report = diff(&base, &target);
    let changes: Vec<_> = report
        .components
        .iter()
        .map(|c| (c.name.as_str(), c.change))
        .collect();
    assert_eq!(
        changes,
        vec![
            ("D", ChangeKind::Added),
            ("E", ChangeKind::Added),
            ("B", ChangeKind::Removed),
            ("C", ChangeKind::Removed),
        ]
    );
}

#[test]
fn test_edge_endpoint_rename_reads_as_add_plus_remove() {
    let base = snapshot("[A]\n[B]\nA --> B");
    let target = snapshot("[A]\n[B2]\nA --> B2");

    let report = diff(&base, &target);
    // Component rename is not tracked; the edge key changes wholesale
    let kinds: Vec<_> = report.relationships.iter().map(|r| r.change).collect();
    assert_eq!(kinds, vec![ChangeKind::Added, ChangeKind::Removed]);
}

#[test]
fn test_duplicate_keys_only_last_edge_participates() {
    // Base has two edges A->B; only the second takes part in the comparison
    let base = snapshot("[A]\n[B]\nA --> B : old\nA --> B : final");
    let matching_target = snapshot("[A]\n[B]\nA --> B : final");
    assert!(diff(&base, &matching_target).is_empty());

    let differing_target = snapshot("[A]\n[B]\nA --> B : other");
    let report = diff(&base, &differing_target);
    assert_eq!(report.relationships.len(), 1);
    assert_eq!(report.relationships[0].change, ChangeKind::Modified);
    assert_eq!(
        report.relationships[0].previous_label.as_deref(),
        Some("final")
    );
}

#[test]
fn test_diff_does_not_mutate_inputs() {
    let base = snapshot("[A]\n[B]\nA --> B");
    let target = snapshot("[A]\n[C]\nA --> C");
    let base_copy = base.clone();
    let target_copy = target.clone();

    let _ = diff(&base, &target);
    assert_eq!(base, base_copy);
    assert_eq!(target, target_copy);
}

#[test]
fn test_reports_serialize_for_downstream_tooling() {
    let base = snapshot("[A]");
    let target = snapshot("queue \"A\"");
    let report = diff(&base, &target);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["components"][0]["change"], "modified");
    assert_eq!(json["components"][0]["previous_type"], "component");
    assert_eq!(json["components"][0]["new_type"], "queue");
}
