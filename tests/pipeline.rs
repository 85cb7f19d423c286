use std::path::PathBuf;
use std::sync::mpsc;

use hearing_graph::config::LayoutConfig;
use hearing_graph::dataset::{Dataset, load_dataset};
use hearing_graph::geometry::{EdgePath, layout_edges};
use hearing_graph::graph::{EDGE_PALETTE, GraphData, PaletteCursor, build_graph_model, node_size};
use hearing_graph::layout::{LayoutEngine, Viewport};
use hearing_graph::search::{DocumentKind, SearchService};
use hearing_graph::selection::{SelectionEvent, SelectionSink, SelectionState};

const APPROPRIATIONS: &str = "cx:cluster-appropriations-intake";
const HEARINGS: &str = "cx:cluster-hearings-modernization";
const WITNESS: &str = "cx:cluster-witness-management";

fn fixture() -> Dataset {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sample.jsonld");
    load_dataset(&path).expect("fixture loads")
}

fn graph() -> GraphData {
    build_graph_model(&fixture(), PaletteCursor::new()).0
}

#[test]
fn fixture_loads_with_metadata() {
    let dataset = fixture();
    assert_eq!(dataset.title, "Committee Modernization Breakout");
    assert_eq!(dataset.clusters.len(), 4);
    assert_eq!(dataset.relations.len(), 6);
    assert_eq!(dataset.comment_count(), 5);
    assert_eq!(dataset.author_name("cx:person-1"), "Kirsten");
    assert_eq!(dataset.author_name("Guest Speaker"), "Guest Speaker");
}

#[test]
fn missing_file_reports_path() {
    let error = load_dataset(&PathBuf::from("/nonexistent/hearing.jsonld")).unwrap_err();
    assert!(format!("{error:#}").contains("/nonexistent/hearing.jsonld"));
}

#[test]
fn graph_marks_hub_and_parallel_edges() {
    let graph = graph();
    assert_eq!(graph.nodes.len(), 4);
    assert_eq!(graph.edges.len(), 6);

    let witness = graph.node(WITNESS).expect("witness cluster");
    assert_eq!(witness.comment_count, 3);
    assert_eq!(witness.size, node_size(3));

    let from_hub = graph
        .edges
        .iter()
        .filter(|edge| edge.source == APPROPRIATIONS)
        .collect::<Vec<_>>();
    assert_eq!(from_hub.len(), 4);
    assert!(from_hub.iter().all(|edge| edge.is_hub && edge.is_multiple && edge.hub_total == 4));

    let parallel = format!("{APPROPRIATIONS}->{HEARINGS}");
    let first = graph.edge(&format!("{parallel}-0")).expect("first parallel edge");
    let second = graph.edge(&format!("{parallel}-1")).expect("second parallel edge");
    assert_eq!(first.curve_offset, 0.0);
    assert_eq!(second.curve_offset, 30.0);
    assert_eq!(first.group_total, 2);

    let fanned = &graph.edges[1];
    assert_eq!(fanned.group_total, 1);
    assert!(fanned.curve_offset < 0.0);
    assert!((fanned.curve_offset + graph.edges[2].curve_offset).abs() < 1e-4);

    let plain = &graph.edges[4];
    assert!(!plain.is_hub && !plain.is_multiple);
    assert_eq!(plain.curve_offset, 0.0);
    assert_eq!(plain.relation, "tagging and retrieval");
    assert_eq!(plain.strength, 0.6);
    assert_eq!(first.strength, 1.0);
}

#[test]
fn reload_keeps_edge_colors() {
    let (first, cursor) = build_graph_model(&fixture(), PaletteCursor::new());
    assert_eq!(
        first.edges.iter().map(|edge| edge.color).collect::<Vec<_>>(),
        EDGE_PALETTE[..6].to_vec()
    );

    let mut reloaded = fixture();
    reloaded.relations.reverse();
    let (second, cursor) = build_graph_model(&reloaded, cursor);
    for edge in &second.edges {
        let before = first
            .edges
            .iter()
            .find(|candidate| candidate.color_key() == edge.color_key())
            .expect("same relation set");
        assert_eq!(before.color, edge.color);
    }
    assert_eq!(cursor.next_index(), 6);
}

#[test]
fn search_ranks_cluster_title_first() {
    let mut service = SearchService::new();
    assert!(service.query("witness").is_empty());
    service.rebuild(&fixture());

    let results = service.query("witness");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].kind, DocumentKind::Cluster);
    assert_eq!(results[0].id, format!("cluster:{WITNESS}"));
    assert_eq!(results[0].text, "Witness Management");
    assert_eq!(results[1].kind, DocumentKind::Comment);
    assert_eq!(results[1].cluster_id, WITNESS);
    assert!(results[1].timestamp.as_ref().is_some_and(|stamp| stamp.to_string() == "1:02:09"));
}

#[test]
fn search_matches_authors_and_combines_terms() {
    let mut service = SearchService::new();
    service.rebuild(&fixture());

    let by_author = service.query("Kirsten");
    assert_eq!(by_author.len(), 2);
    assert!(by_author.iter().all(|result| result.kind == DocumentKind::Comment));
    assert!(by_author.iter().all(|result| result.author.as_deref() == Some("Kirsten")));

    let mut both = service
        .query("intake form")
        .into_iter()
        .map(|result| result.id)
        .collect::<Vec<_>>();
    both.sort();
    assert_eq!(
        both,
        vec![
            format!("idea:{APPROPRIATIONS}:cx:idea-approps-1"),
            format!("thread:{APPROPRIATIONS}:cx:thread-approps-1"),
        ]
    );

    assert!(service.query("").is_empty());
    assert!(service.query("witness spreadsheet").is_empty());
}

#[test]
fn layout_settles_and_geometry_stays_finite() {
    let graph = graph();
    let mut engine = LayoutEngine::new(LayoutConfig::default());
    engine.start(&graph.nodes, &graph.edges, Viewport::new(1280.0, 800.0));

    let mut steps = 0;
    while engine.tick() {
        steps += 1;
        assert!(steps < 2000, "layout never settled");
    }

    let snapshot = engine.snapshot().expect("started");
    let positions = graph
        .nodes
        .iter()
        .map(|node| snapshot.position(&node.id).expect("every node placed"))
        .collect::<Vec<_>>();
    for (index, position) in positions.iter().enumerate() {
        assert!(position.x.is_finite() && position.y.is_finite());
        for other in &positions[index + 1..] {
            assert!((*position - *other).length() > 1.0);
        }
    }

    let geometry = layout_edges(&graph.edges, &snapshot);
    assert_eq!(geometry.len(), 6);
    for (_, edge_geometry) in &geometry {
        assert!(edge_geometry.path.is_finite());
        assert!(edge_geometry.label_anchor.x.is_finite());
        assert!(edge_geometry.label_anchor.y.is_finite());
    }
    assert!(matches!(geometry[0].1.path, EdgePath::Line { .. }));
    assert!(matches!(geometry[1].1.path, EdgePath::Quadratic { .. }));
    assert!(matches!(geometry[3].1.path, EdgePath::Quadratic { .. }));
    assert!(matches!(geometry[4].1.path, EdgePath::Line { .. }));
}

#[test]
fn selection_events_reach_state_and_channel() {
    let (mut tx, rx) = mpsc::channel();
    let mut state = SelectionState::default();

    for event in [
        SelectionEvent::NodeSelected(Some(WITNESS.to_owned())),
        SelectionEvent::EdgeSelected(Some(format!("{APPROPRIATIONS}->{HEARINGS}-1"))),
    ] {
        tx.emit(event.clone());
        state.emit(event);
    }

    assert_eq!(rx.try_iter().count(), 2);
    assert_eq!(state.selected_node(), None);
    assert_eq!(state.selected_edge(), Some(format!("{APPROPRIATIONS}->{HEARINGS}-1").as_str()));
    assert!(state.detail_pane_open());
}
