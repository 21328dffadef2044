//! End-to-end tests for the definition (.sii) pipeline:
//! parse -> structuralize -> merge -> resolve.

use std::path::Path;

use pretty_assertions::assert_eq;
use scs_world::{
    Diagnostics, DiagnosticKind, Float2, Float3, Format, Graph, Value, parse_definition_str,
};

fn build_graph(sources: &[(&str, &str)]) -> (Graph, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let mut graph = Graph::new();
    for (name, source) in sources {
        let path = Path::new(name);
        let tree = parse_definition_str(source, path, &mut diagnostics).unwrap();
        graph.merge_file_tree(tree, Format::Definition, path, &mut diagnostics);
    }
    graph.resolve(&mut diagnostics);
    (graph, diagnostics)
}

// ============================================================================
// 1. One file, full literal coverage
// ============================================================================

#[test]
fn test_single_file_literals() {
    let (graph, diagnostics) = build_graph(&[(
        "world.sii",
        r#"
        SiiNunit {
        road_look : road.look3 {
            name: "Road 3"
            road_size: 3.5e-1
            target_white: &3f000000
            bloom_minimal_color: (&3f800000, &3f800000, &3f800000)
            slow_time: true
            lane_offsets_right[]: (1.25, 0)
            lane_offsets_right[]: (1.25, 3.75)
        }
        }
        "#,
    )]);
    assert!(diagnostics.is_empty());

    assert_eq!(graph.lookup("road.look3.name"), Some(&Value::String("Road 3".into())));
    assert_eq!(graph.lookup("road.look3.road_size"), Some(&Value::Double(0.35)));
    assert_eq!(graph.lookup("road.look3.target_white"), Some(&Value::Float(0.5)));
    assert_eq!(
        graph.lookup("road.look3.bloom_minimal_color"),
        Some(&Value::Float3(Float3::new(1.0, 1.0, 1.0))),
    );
    assert_eq!(graph.lookup("road.look3.slow_time"), Some(&Value::Bool(true)));
    assert_eq!(
        graph.lookup("road.look3.lane_offsets_right"),
        Some(&Value::List(vec![
            Value::Float2(Float2::new(1.25, 0.0)),
            Value::Float2(Float2::new(1.25, 3.75)),
        ])),
    );
}

// ============================================================================
// 2. Cross references resolve into links, in and out of arrays
// ============================================================================

#[test]
fn test_cross_references_resolve() {
    let (graph, diagnostics) = build_graph(&[
        (
            "looks.sii",
            r#"
            road_look : road.look5 {
                reference: traffic_lane.road.divided
                lanes[]: traffic_lane.road.local
                lanes[]: traffic_lane.road.highway
            }
            "#,
        ),
        (
            "lanes.sii",
            r#"
            lane : traffic_lane.road.divided { lane_count: 2 }
            lane : traffic_lane.road.local { lane_count: 1 }
            lane : traffic_lane.road.highway { lane_count: 3 }
            "#,
        ),
    ]);
    assert!(diagnostics.is_empty());

    let link = graph
        .lookup("road.look5.reference")
        .and_then(Value::as_link)
        .expect("reference should be a link");
    assert_eq!(
        graph.entry(link, "lane_count"),
        Some(&scs_world::Slot::Value(Value::Int(2))),
    );

    let lanes = graph.lookup("road.look5.lanes").unwrap().as_list().unwrap();
    assert_eq!(lanes.len(), 2);
    assert!(lanes.iter().all(|lane| lane.as_link().is_some()));
}

// ============================================================================
// 3. Unresolved references stay as placeholders, with diagnostics
// ============================================================================

#[test]
fn test_unresolved_reference_keeps_placeholder() {
    let (graph, diagnostics) = build_graph(&[(
        "world.sii",
        "road_look : road.look5 { reference: traffic_lane.road.divided }",
    )]);

    assert_eq!(diagnostics.count_of(DiagnosticKind::UnresolvedReference), 1);
    assert_eq!(
        graph.lookup("road.look5.reference"),
        Some(&Value::Unresolved("traffic_lane.road.divided".into())),
    );
}

// ============================================================================
// 4. Namespace merging across files: union + conflict policy
// ============================================================================

#[test]
fn test_namespace_merge_union_and_conflict() {
    let (graph, diagnostics) = build_graph(&[
        ("one.sii", "a : road.look3 { size: 3 name: \"first\" }"),
        ("two.sii", "a : road.look3 { size: 4 width: 7 }"),
    ]);

    assert_eq!(diagnostics.count_of(DiagnosticKind::MergeConflict), 1);
    assert_eq!(graph.lookup("road.look3.size"), Some(&Value::Int(4)));
    assert_eq!(graph.lookup("road.look3.name"), Some(&Value::String("first".into())));
    assert_eq!(graph.lookup("road.look3.width"), Some(&Value::Int(7)));
}

// ============================================================================
// 5. Duplicate property within one file warns and keeps the later value
// ============================================================================

#[test]
fn test_duplicate_property_diagnostic() {
    let (graph, diagnostics) = build_graph(&[(
        "world.sii",
        r#"
        a : road.look3 {
            size: 3
            size: 5
        }
        "#,
    )]);

    assert_eq!(diagnostics.count_of(DiagnosticKind::DuplicateValue), 1);
    assert_eq!(graph.lookup("road.look3.size"), Some(&Value::Int(5)));
}

// ============================================================================
// 6. Resolution is idempotent once the graph is fully resolved
// ============================================================================

#[test]
fn test_resolution_idempotence() {
    let (mut graph, diagnostics) = build_graph(&[
        ("a.sii", "a : road.look5 { reference: lane.local }"),
        ("b.sii", "b : lane.local { width: 4 }"),
    ]);
    assert!(diagnostics.is_empty());
    let snapshot = graph.clone();

    let mut second_pass = Diagnostics::new();
    graph.resolve(&mut second_pass);

    assert!(second_pass.is_empty());
    assert_eq!(graph, snapshot);
}

// ============================================================================
// 7. The resolved graph round-trips through serde losslessly
// ============================================================================

#[test]
fn test_graph_serde_round_trip() {
    let (graph, diagnostics) = build_graph(&[
        (
            "looks.sii",
            r#"
            road_look : road.look5 {
                reference: traffic_lane.road.divided
                offsets[]: (1.25, 0)
                missing: lane.nowhere
            }
            "#,
        ),
        ("lanes.sii", "lane : traffic_lane.road.divided { lane_count: 2 }"),
    ]);
    assert_eq!(diagnostics.count_of(DiagnosticKind::UnresolvedReference), 1);

    let json = serde_json::to_string(&graph).unwrap();
    let restored: Graph = serde_json::from_str(&json).unwrap();

    // Lossless: links, placeholders and lists all survive the trip.
    assert_eq!(restored, graph);
    assert!(restored.lookup("road.look5.reference").unwrap().as_link().is_some());
    assert_eq!(
        restored.lookup("road.look5.missing"),
        Some(&Value::Unresolved("lane.nowhere".into())),
    );
}

// ============================================================================
// 8. Mutually referencing entries form a cycle of links
// ============================================================================

#[test]
fn test_cyclic_links() {
    let (graph, diagnostics) = build_graph(&[(
        "world.sii",
        r#"
        junction : road.east { opposite: road.west }
        junction : road.west { opposite: road.east }
        "#,
    )]);
    assert!(diagnostics.is_empty());

    let east = graph.lookup("road.east.opposite").unwrap().as_link().unwrap();
    let west = graph.lookup("road.west.opposite").unwrap().as_link().unwrap();
    assert_eq!(
        graph.entry(east, "opposite"),
        Some(&scs_world::Slot::Value(Value::Link(west))),
    );
    assert_eq!(
        graph.entry(west, "opposite"),
        Some(&scs_world::Slot::Value(Value::Link(east))),
    );
}
