mod forces;
mod quadtree;

use std::collections::HashMap;
use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};
use tracing::debug;

use crate::config::LayoutConfig;
use crate::graph::{GraphEdge, GraphNode};

use forces::{ChargeParams, Link, apply_center, apply_charge, apply_collisions, apply_links, link_bias};
use quadtree::Quad;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    pub fn center(self) -> Vec2 {
        vec2(self.width * 0.5, self.height * 0.5)
    }

    pub fn min_side(self) -> f32 {
        self.width.min(self.height)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeState {
    pub id: String,
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub pinned: Option<Vec2>,
}

/// Read-only view of one simulation step, handed to tick callbacks.
#[derive(Clone, Copy)]
pub struct LayoutSnapshot<'a> {
    pub nodes: &'a [NodeState],
    pub alpha: f32,
    pub tick: u64,
    index_by_id: &'a HashMap<String, usize>,
}

impl<'a> LayoutSnapshot<'a> {
    pub fn position(&self, node_id: &str) -> Option<Vec2> {
        self.index_by_id
            .get(node_id)
            .and_then(|&index| self.nodes.get(index))
            .map(|node| node.position)
    }

    pub fn node(&self, node_id: &str) -> Option<&'a NodeState> {
        self.index_by_id
            .get(node_id)
            .and_then(|&index| self.nodes.get(index))
    }
}

pub type TickCallback = Box<dyn FnMut(&LayoutSnapshot<'_>)>;

struct Simulation {
    nodes: Vec<NodeState>,
    index_by_id: HashMap<String, usize>,
    links: Vec<Link>,
    center: Vec2,
    alpha: f32,
    alpha_target: f32,
    running: bool,
    ticks: u64,
    scratch: Scratch,
}

#[derive(Default)]
struct Scratch {
    positions: Vec<Vec2>,
    velocities: Vec<Vec2>,
    predicted: Vec<Vec2>,
    radii: Vec<f32>,
    impulses: Vec<Vec2>,
}

impl Simulation {
    fn snapshot(&self) -> LayoutSnapshot<'_> {
        LayoutSnapshot {
            nodes: &self.nodes,
            alpha: self.alpha,
            tick: self.ticks,
            index_by_id: &self.index_by_id,
        }
    }

    fn step(&mut self, config: &LayoutConfig) {
        self.alpha += (self.alpha_target - self.alpha) * config.alpha_decay;
        let alpha = self.alpha;
        let node_count = self.nodes.len();

        let scratch = &mut self.scratch;
        scratch.positions.clear();
        scratch.velocities.clear();
        scratch.radii.clear();
        for node in &self.nodes {
            scratch.positions.push(node.position);
            scratch.velocities.push(node.velocity);
            scratch.radii.push(node.radius);
        }

        apply_links(
            &self.links,
            &scratch.positions,
            &mut scratch.velocities,
            config.link_distance,
            config.link_strength,
            alpha,
        );

        if let Some(tree) = Quad::build(&scratch.positions, &scratch.radii) {
            let theta = config.barnes_hut_theta.max(0.01);
            apply_charge(
                &tree,
                &scratch.positions,
                &mut scratch.velocities,
                ChargeParams {
                    strength: config.charge_strength,
                    distance_min_sq: config.charge_distance_min * config.charge_distance_min,
                    distance_max_sq: config.charge_distance_max * config.charge_distance_max,
                    theta_sq: theta * theta,
                },
                alpha,
            );
        }

        apply_center(&mut scratch.positions, self.center);

        scratch.predicted.clear();
        scratch
            .predicted
            .extend(scratch.positions.iter().zip(&scratch.velocities).map(|(p, v)| *p + *v));
        scratch.impulses.clear();
        scratch.impulses.resize(node_count, Vec2::ZERO);
        if let Some(tree) = Quad::build(&scratch.predicted, &scratch.radii) {
            apply_collisions(
                &tree,
                &scratch.predicted,
                &scratch.radii,
                config.collision_strength,
                &mut scratch.impulses,
            );
        }

        let retained = 1.0 - config.velocity_decay.clamp(0.0, 1.0);
        for (index, node) in self.nodes.iter_mut().enumerate() {
            if let Some(pinned) = node.pinned {
                node.position = pinned;
                node.velocity = Vec2::ZERO;
                continue;
            }

            let velocity = (scratch.velocities[index] + scratch.impulses[index]) * retained;
            node.velocity = velocity;
            node.position = scratch.positions[index] + velocity;
        }

        self.ticks += 1;
        if self.alpha < config.alpha_min {
            self.running = false;
            debug!(ticks = self.ticks, "layout settled");
        }
    }
}

/// Owns node positions for one mounted view. Positions are written here
/// and nowhere else; callers read them through snapshots.
pub struct LayoutEngine {
    config: LayoutConfig,
    simulation: Option<Simulation>,
    callbacks: Vec<TickCallback>,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            simulation: None,
            callbacks: Vec::new(),
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Discards any previous run, seeds nodes on a circle around the
    /// viewport center and starts integrating.
    pub fn start(&mut self, nodes: &[GraphNode], edges: &[GraphEdge], viewport: Viewport) {
        if self.simulation.take().is_some() {
            debug!("replacing running layout");
        }

        let center = viewport.center();
        let seed_radius = viewport.min_side() * self.config.seed_radius_fraction;
        let count = nodes.len().max(1) as f32;

        let states = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| {
                let angle = (index as f32 / count) * TAU;
                NodeState {
                    id: node.id.clone(),
                    position: center + vec2(angle.cos(), angle.sin()) * seed_radius,
                    velocity: Vec2::ZERO,
                    radius: node.size + self.config.collision_padding,
                    pinned: None,
                }
            })
            .collect::<Vec<_>>();

        let mut index_by_id = HashMap::with_capacity(states.len());
        for (index, state) in states.iter().enumerate() {
            index_by_id.entry(state.id.clone()).or_insert(index);
        }

        let resolved = edges
            .iter()
            .filter_map(|edge| {
                let source = *index_by_id.get(&edge.source)?;
                let target = *index_by_id.get(&edge.target)?;
                (source != target).then_some((source, target))
            })
            .collect::<Vec<_>>();

        let mut degrees = vec![0usize; states.len()];
        for &(source, target) in &resolved {
            degrees[source] += 1;
            degrees[target] += 1;
        }
        let links = resolved
            .into_iter()
            .map(|(source, target)| Link {
                source,
                target,
                bias: link_bias(&degrees, source, target),
            })
            .collect::<Vec<_>>();

        debug!(
            nodes = states.len(),
            links = links.len(),
            skipped = edges.len() - links.len(),
            "starting layout"
        );

        self.simulation = Some(Simulation {
            nodes: states,
            index_by_id,
            links,
            center,
            alpha: self.config.initial_alpha,
            alpha_target: 0.0,
            running: true,
            ticks: 0,
            scratch: Scratch::default(),
        });
    }

    pub fn on_tick(&mut self, callback: impl FnMut(&LayoutSnapshot<'_>) + 'static) {
        self.callbacks.push(Box::new(callback));
    }

    /// Advances one integration step if the run is still warm, then
    /// notifies tick callbacks. Returns whether a step happened.
    pub fn tick(&mut self) -> bool {
        let Self {
            config,
            simulation,
            callbacks,
        } = self;
        let Some(simulation) = simulation.as_mut() else {
            return false;
        };
        if !simulation.running {
            return false;
        }

        simulation.step(config);
        let snapshot = simulation.snapshot();
        for callback in callbacks.iter_mut() {
            callback(&snapshot);
        }
        true
    }

    /// Raises the temperature of the existing run without reseeding.
    pub fn reheat(&mut self, alpha: f32) {
        let Some(simulation) = self.simulation.as_mut() else {
            return;
        };
        simulation.alpha = simulation.alpha.max(alpha.clamp(0.0, 1.0));
        simulation.running = true;
        debug!(alpha = simulation.alpha, "layout reheated");
    }

    pub fn resize(&mut self, viewport: Viewport) {
        let Some(simulation) = self.simulation.as_mut() else {
            return;
        };
        let center = viewport.center();
        if simulation.center == center {
            return;
        }
        simulation.center = center;
        self.reheat(self.config.resize_alpha);
    }

    /// Pins a node for dragging. The simulation keeps running warm while
    /// any node is pinned.
    pub fn set_fixed_position(&mut self, node_id: &str, x: f32, y: f32) -> bool {
        let Some(simulation) = self.simulation.as_mut() else {
            return false;
        };
        let Some(&index) = simulation.index_by_id.get(node_id) else {
            return false;
        };

        let pinned = vec2(x, y);
        let node = &mut simulation.nodes[index];
        node.pinned = Some(pinned);
        node.position = pinned;
        node.velocity = Vec2::ZERO;

        simulation.alpha_target = self.config.drag_alpha_target;
        simulation.running = true;
        true
    }

    pub fn release_fixed_position(&mut self, node_id: &str) -> bool {
        let Some(simulation) = self.simulation.as_mut() else {
            return false;
        };
        let Some(&index) = simulation.index_by_id.get(node_id) else {
            return false;
        };
        if simulation.nodes[index].pinned.take().is_none() {
            return false;
        }

        if simulation.nodes.iter().all(|node| node.pinned.is_none()) {
            simulation.alpha_target = 0.0;
        }
        true
    }

    /// Halts integration and drops the run along with its tick callbacks.
    pub fn stop(&mut self) {
        if self.simulation.take().is_some() {
            debug!("layout stopped");
        }
        self.callbacks.clear();
    }

    pub fn is_started(&self) -> bool {
        self.simulation.is_some()
    }

    pub fn is_running(&self) -> bool {
        self.simulation
            .as_ref()
            .is_some_and(|simulation| simulation.running)
    }

    pub fn alpha(&self) -> Option<f32> {
        self.simulation.as_ref().map(|simulation| simulation.alpha)
    }

    pub fn snapshot(&self) -> Option<LayoutSnapshot<'_>> {
        self.simulation.as_ref().map(Simulation::snapshot)
    }

    pub fn position(&self, node_id: &str) -> Option<Vec2> {
        self.snapshot()?.position(node_id)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::dataset::{Dataset, Relation};
    use crate::graph::{GraphData, PaletteCursor, build_graph_model};

    fn graph(ids: &[&str], relations: &[(&str, &str)]) -> GraphData {
        let dataset = Dataset {
            clusters: ids
                .iter()
                .map(|id| crate::dataset::Cluster {
                    id: (*id).into(),
                    name: (*id).into(),
                    description: String::new(),
                    ideas: Vec::new(),
                    threads: Vec::new(),
                })
                .collect(),
            relations: relations
                .iter()
                .map(|(source, target)| Relation::new(*source, *target, "link"))
                .collect(),
            ..Dataset::default()
        };
        build_graph_model(&dataset, PaletteCursor::new()).0
    }

    fn started(graph: &GraphData, viewport: Viewport) -> LayoutEngine {
        let mut engine = LayoutEngine::new(LayoutConfig::default());
        engine.start(&graph.nodes, &graph.edges, viewport);
        engine
    }

    #[test]
    fn seeds_nodes_on_a_circle() {
        let graph = graph(&["A", "B", "C", "D"], &[]);
        let viewport = Viewport::new(800.0, 600.0);
        let engine = started(&graph, viewport);

        let expected_radius = 600.0 * 0.45 * 1.45;
        let snapshot = engine.snapshot().expect("started");
        for node in snapshot.nodes {
            let distance = (node.position - viewport.center()).length();
            assert!((distance - expected_radius).abs() < 1e-2);
        }
        let first = snapshot.position("A").expect("A");
        assert!((first - (viewport.center() + vec2(expected_radius, 0.0))).length() < 1e-2);
    }

    #[test]
    fn tick_invokes_callbacks_with_positions() {
        let graph = graph(&["A", "B"], &[("A", "B")]);
        let mut engine = started(&graph, Viewport::new(800.0, 600.0));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        engine.on_tick(move |snapshot| {
            sink.borrow_mut()
                .push((snapshot.tick, snapshot.position("A").is_some()));
        });

        assert!(engine.tick());
        assert!(engine.tick());
        assert_eq!(*seen.borrow(), vec![(1, true), (2, true)]);
    }

    #[test]
    fn simulation_cools_down_on_its_own() {
        let graph = graph(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);
        let mut engine = started(&graph, Viewport::new(1200.0, 900.0));

        let mut steps = 0;
        while engine.tick() {
            steps += 1;
            assert!(steps < 2000, "layout never settled");
        }
        assert!(!engine.is_running());
        assert!(engine.alpha().is_some_and(|alpha| alpha < 0.001));

        for node in engine.snapshot().expect("started").nodes {
            assert!(node.position.x.is_finite() && node.position.y.is_finite());
        }
    }

    #[test]
    fn layout_stays_centered() {
        let graph = graph(&["A", "B", "C", "D", "E"], &[("A", "B"), ("A", "C")]);
        let viewport = Viewport::new(1000.0, 800.0);
        let mut engine = started(&graph, viewport);
        for _ in 0..50 {
            engine.tick();
        }

        let snapshot = engine.snapshot().expect("started");
        let mean = snapshot
            .nodes
            .iter()
            .fold(Vec2::ZERO, |sum, node| sum + node.position)
            / snapshot.nodes.len() as f32;
        assert!((mean - viewport.center()).length() < 50.0);
    }

    #[test]
    fn pinned_node_holds_until_released() {
        let graph = graph(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);
        let mut engine = started(&graph, Viewport::new(800.0, 600.0));

        assert!(engine.set_fixed_position("B", 10.0, 20.0));
        for _ in 0..20 {
            engine.tick();
        }
        assert_eq!(engine.position("B"), Some(vec2(10.0, 20.0)));

        assert!(engine.release_fixed_position("B"));
        assert!(!engine.release_fixed_position("B"));
        for _ in 0..20 {
            engine.tick();
        }
        assert_ne!(engine.position("B"), Some(vec2(10.0, 20.0)));
    }

    #[test]
    fn drag_keeps_the_run_warm() {
        let graph = graph(&["A", "B"], &[("A", "B")]);
        let mut engine = started(&graph, Viewport::new(800.0, 600.0));
        while engine.tick() {}
        assert!(!engine.is_running());

        engine.set_fixed_position("A", 0.0, 0.0);
        for _ in 0..1000 {
            assert!(engine.tick());
        }
        assert!(engine.alpha().is_some_and(|alpha| alpha > 0.2));
    }

    #[test]
    fn resize_reheats_existing_run() {
        let graph = graph(&["A", "B"], &[("A", "B")]);
        let mut engine = started(&graph, Viewport::new(800.0, 600.0));
        while engine.tick() {}

        engine.resize(Viewport::new(1600.0, 1200.0));
        assert!(engine.is_running());
        assert!(engine.alpha().is_some_and(|alpha| (alpha - 0.15).abs() < 1e-6));

        engine.resize(Viewport::new(1600.0, 1200.0));
        assert!(engine.alpha().is_some_and(|alpha| alpha <= 0.15));
    }

    #[test]
    fn reheat_only_raises_alpha() {
        let graph = graph(&["A", "B"], &[("A", "B")]);
        let mut engine = started(&graph, Viewport::new(800.0, 600.0));
        engine.tick();
        let warm = engine.alpha().expect("started");

        engine.reheat(0.1);
        assert_eq!(engine.alpha(), Some(warm));

        while engine.tick() {}
        assert!(!engine.is_running());

        engine.reheat(0.3);
        assert!(engine.is_running());
        assert_eq!(engine.alpha(), Some(0.3));
        engine.reheat(0.2);
        assert_eq!(engine.alpha(), Some(0.3));
        engine.reheat(4.0);
        assert_eq!(engine.alpha(), Some(1.0));
        assert!(engine.tick());
    }

    #[test]
    fn stop_drops_tick_callbacks() {
        let graph = graph(&["A", "B"], &[("A", "B")]);
        let mut engine = started(&graph, Viewport::new(800.0, 600.0));
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        engine.on_tick(move |_| *counter.borrow_mut() += 1);

        assert!(engine.tick());
        assert_eq!(*calls.borrow(), 1);

        engine.stop();
        engine.start(&graph.nodes, &graph.edges, Viewport::new(800.0, 600.0));
        assert!(engine.tick());
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn unknown_nodes_and_dangling_edges_are_ignored() {
        let graph = graph(&["A", "B"], &[("A", "ghost"), ("A", "B")]);
        let mut engine = started(&graph, Viewport::new(800.0, 600.0));

        assert!(!engine.set_fixed_position("ghost", 0.0, 0.0));
        assert!(!engine.release_fixed_position("A"));
        assert!(engine.tick());
        assert!(engine.position("ghost").is_none());
    }

    #[test]
    fn restart_replaces_previous_run_and_stop_releases_it() {
        let first = graph(&["A", "B"], &[("A", "B")]);
        let second = graph(&["X", "Y", "Z"], &[]);
        let mut engine = started(&first, Viewport::new(800.0, 600.0));
        engine.tick();

        engine.start(&second.nodes, &second.edges, Viewport::new(800.0, 600.0));
        let snapshot = engine.snapshot().expect("started");
        assert_eq!(snapshot.nodes.len(), 3);
        assert_eq!(snapshot.tick, 0);
        assert!(engine.position("A").is_none());

        engine.stop();
        assert!(!engine.is_started());
        assert!(!engine.tick());
        engine.reheat(0.5);
        assert!(!engine.is_running());
    }

    #[test]
    fn empty_graph_runs_without_panicking() {
        let graph = graph(&[], &[]);
        let mut engine = started(&graph, Viewport::new(0.0, 0.0));
        assert!(engine.tick());
    }
}
