mod disambiguate;
mod palette;
mod policy;

use std::collections::{HashMap, HashSet};

use eframe::egui::Color32;
use tracing::{debug, info};

use crate::dataset::{Dataset, Idea, Thread};

pub use disambiguate::{
    EdgeLayout, FAN_ANGLE_SCALE, HUB_MIN_FAN_OUT, LARGE_HUB_FAN_ARC, LARGE_HUB_FAN_OUT,
    PARALLEL_OFFSET_STEP, SMALL_HUB_FAN_ARC, disambiguate, fan_offset, pair_key, parallel_offset,
};
pub use palette::{ColorKey, EDGE_PALETTE, PaletteCursor};
pub use policy::{
    DEFAULT_CLUSTER_COLOR, DEFAULT_RELATION_STRENGTH, color_for_cluster, strength_for_relation,
};

const BASE_NODE_SIZE: f32 = 20.0;
const NODE_SIZE_SCALE: f32 = 5.0;

#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
    pub id: String,
    pub name: String,
    pub description: String,
    pub size: f32,
    pub color: Color32,
    pub ideas: Vec<Idea>,
    pub threads: Vec<Thread>,
    pub comment_count: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub relation: String,
    pub strength: f32,
    pub color: Color32,
    pub curve_offset: f32,
    pub is_multiple: bool,
    pub group_index: usize,
    pub group_total: usize,
    pub is_hub: bool,
    pub hub_index: usize,
    pub hub_total: usize,
}

impl GraphEdge {
    pub fn color_key(&self) -> ColorKey {
        ColorKey {
            source: self.source.clone(),
            target: self.target.clone(),
            relation: self.relation.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl GraphData {
    pub fn node(&self, node_id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == node_id)
    }

    pub fn edge(&self, edge_id: &str) -> Option<&GraphEdge> {
        self.edges.iter().find(|edge| edge.id == edge_id)
    }

    pub fn index_by_id(&self) -> HashMap<&str, usize> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.as_str(), index))
            .collect()
    }

    /// Edges whose endpoints are not both present in the node set.
    pub fn dangling_edges(&self) -> impl Iterator<Item = &GraphEdge> {
        let ids = self
            .nodes
            .iter()
            .map(|node| node.id.as_str())
            .collect::<HashSet<_>>();
        self.edges.iter().filter(move |edge| {
            !ids.contains(edge.source.as_str()) || !ids.contains(edge.target.as_str())
        })
    }
}

/// `20 + 5 ln(c + 1)`: strictly increasing and sub-linear.
pub fn node_size(comment_count: usize) -> f32 {
    BASE_NODE_SIZE + ((comment_count as f32) + 1.0).ln() * NODE_SIZE_SCALE
}

pub fn build_graph_model(dataset: &Dataset, mut cursor: PaletteCursor) -> (GraphData, PaletteCursor) {
    let nodes = dataset
        .clusters
        .iter()
        .map(|cluster| {
            let comment_count = cluster.comment_count();
            GraphNode {
                id: cluster.id.clone(),
                name: cluster.name.clone(),
                description: cluster.description.clone(),
                size: node_size(comment_count),
                color: color_for_cluster(&cluster.id),
                ideas: cluster.ideas.clone(),
                threads: cluster.threads.clone(),
                comment_count,
            }
        })
        .collect::<Vec<_>>();

    let layouts = disambiguate(&dataset.relations);
    let mut issued_ids = HashSet::with_capacity(layouts.len());
    let mut edges = Vec::with_capacity(layouts.len());

    for (relation, layout) in dataset.relations.iter().zip(layouts) {
        let id = unique_edge_id(
            format!("{}-{}", layout.group_key, layout.group_index),
            &mut issued_ids,
        );
        let color = cursor.color_for(ColorKey {
            source: relation.source.clone(),
            target: relation.target.clone(),
            relation: relation.relation.clone(),
        });

        edges.push(GraphEdge {
            id,
            source: relation.source.clone(),
            target: relation.target.clone(),
            relation: relation.relation.clone(),
            strength: strength_for_relation(&relation.relation),
            color,
            curve_offset: layout.curve_offset,
            is_multiple: layout.is_multiple,
            group_index: layout.group_index,
            group_total: layout.group_total,
            is_hub: layout.is_hub,
            hub_index: layout.hub_index,
            hub_total: layout.hub_total,
        });
    }

    let graph = GraphData { nodes, edges };
    let dangling = graph.dangling_edges().count();
    if dangling > 0 {
        debug!(dangling, "graph contains edges with unknown endpoints");
    }
    info!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        hub_edges = graph.edges.iter().filter(|edge| edge.is_hub).count(),
        palette_next = cursor.next_index(),
        "built graph model"
    );

    (graph, cursor)
}

// Endpoint ids may themselves contain `->`, so two pairs can format to the same id.
fn unique_edge_id(candidate: String, issued: &mut HashSet<String>) -> String {
    if issued.insert(candidate.clone()) {
        return candidate;
    }

    let mut suffix = 1usize;
    loop {
        let id = format!("{candidate}#{suffix}");
        if issued.insert(id.clone()) {
            return id;
        }
        suffix += 1;
    }
}
