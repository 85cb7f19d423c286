use std::collections::HashMap;

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Ui, vec2};
use tracing::debug;

use hearing_graph::geometry::{EdgePath, layout_edges};
use hearing_graph::selection::{SelectionEvent, SelectionSink};

use super::super::ViewModel;
use super::super::render_utils::{
    blend_color, circle_visible, dim_color, distance_to_path, draw_arrowhead, draw_background,
    draw_edge_path, path_to_screen, path_visible, world_to_screen,
};

const EDGE_HOVER_DISTANCE: f32 = 6.0;

struct ScreenNode {
    index: usize,
    position: Pos2,
    radius: f32,
}

struct ScreenEdge {
    index: usize,
    path: EdgePath,
    label: Pos2,
}

enum Hovered {
    Node(usize),
    Edge(usize),
}

fn node_at(nodes: &[ScreenNode], point: Pos2) -> Option<usize> {
    nodes
        .iter()
        .filter_map(|node| {
            let distance = node.position.distance(point);
            (distance <= node.radius).then_some((node.index, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}

fn edge_at(edges: &[ScreenEdge], point: Pos2) -> Option<usize> {
    edges
        .iter()
        .map(|edge| (edge.index, distance_to_path(&edge.path, point)))
        .filter(|(_, distance)| *distance <= EDGE_HOVER_DISTANCE)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}

impl ViewModel {
    fn screen_scene(&self, rect: Rect) -> (Vec<ScreenNode>, Vec<ScreenEdge>) {
        let Some(snapshot) = self.engine.snapshot() else {
            return (Vec::new(), Vec::new());
        };

        let nodes = self
            .graph
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                let world = snapshot.position(&node.id)?;
                Some(ScreenNode {
                    index,
                    position: world_to_screen(rect, self.pan, self.zoom, world),
                    radius: (node.size * self.zoom).clamp(4.0, 80.0),
                })
            })
            .collect();

        let edges = layout_edges(&self.graph.edges, &snapshot)
            .into_iter()
            .map(|(index, geometry)| ScreenEdge {
                index,
                path: path_to_screen(rect, self.pan, self.zoom, geometry.path),
                label: world_to_screen(rect, self.pan, self.zoom, geometry.label_anchor.to_vec2()),
            })
            .collect();

        (nodes, edges)
    }

    fn emit_pointer_events(
        &self,
        sink: &mut dyn SelectionSink,
        hovered: Option<&Hovered>,
        clicked: bool,
    ) {
        let hovered_node = match hovered {
            Some(Hovered::Node(index)) => self.graph.nodes.get(*index).map(|node| node.id.as_str()),
            _ => None,
        };
        let hovered_edge = match hovered {
            Some(Hovered::Edge(index)) => self.graph.edges.get(*index).map(|edge| edge.id.as_str()),
            _ => None,
        };

        if hovered_node != self.selection.hovered_node() {
            sink.emit(SelectionEvent::NodeHovered(hovered_node.map(str::to_owned)));
        }
        if hovered_edge != self.selection.hovered_edge() {
            sink.emit(SelectionEvent::EdgeHovered(hovered_edge.map(str::to_owned)));
        }

        if !clicked {
            return;
        }
        match (hovered_node, hovered_edge) {
            (Some(node), _) => sink.emit(SelectionEvent::NodeSelected(Some(node.to_owned()))),
            (None, Some(edge)) => sink.emit(SelectionEvent::EdgeSelected(Some(edge.to_owned()))),
            (None, None) => sink.emit(SelectionEvent::NodeSelected(None)),
        }
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.pan, self.zoom);

        self.sync_viewport(rect);
        self.handle_graph_zoom(ui, rect, &response);

        if self.engine.tick() {
            ui.ctx().request_repaint();
        }

        let (nodes, edges) = self.screen_scene(rect);
        if nodes.is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "This dataset has no clusters to draw.",
                FontId::proportional(14.0),
                Color32::from_gray(200),
            );
            return;
        }

        let pointer = ui.input(|input| input.pointer.hover_pos());
        let hovered = pointer.and_then(|point| {
            node_at(&nodes, point)
                .map(Hovered::Node)
                .or_else(|| edge_at(&edges, point).map(Hovered::Edge))
        });
        if hovered.is_some() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        }

        let press_node = ui
            .input(|input| input.pointer.press_origin())
            .and_then(|origin| node_at(&nodes, origin));
        self.handle_node_drag(rect, &response, press_node);
        self.handle_graph_pan(&response);

        let mut events: Vec<SelectionEvent> = Vec::new();
        self.emit_pointer_events(
            &mut events,
            hovered.as_ref(),
            response.clicked_by(egui::PointerButton::Primary),
        );
        for event in events {
            debug!(?event, "selection event");
            self.selection.emit(event);
        }

        self.paint_edges(&painter, rect, &nodes, &edges);
        self.paint_nodes(&painter, rect, &nodes);
        self.paint_hover_summary(&painter, rect, hovered.as_ref());
    }

    fn edge_is_focused(&self, index: usize) -> bool {
        let Some(edge) = self.graph.edges.get(index) else {
            return false;
        };
        self.selection.selected_edge() == Some(edge.id.as_str())
            || self.selection.hovered_edge() == Some(edge.id.as_str())
            || self
                .selection
                .selected_node()
                .is_some_and(|node| node == edge.source || node == edge.target)
    }

    fn paint_edges(&self, painter: &egui::Painter, rect: Rect, nodes: &[ScreenNode], edges: &[ScreenEdge]) {
        let selection_active =
            self.selection.selected_node().is_some() || self.selection.selected_edge().is_some();
        let zoom_sqrt = self.zoom.sqrt();
        let radius_by_id = nodes
            .iter()
            .map(|node| (self.graph.nodes[node.index].id.as_str(), node.radius))
            .collect::<HashMap<_, _>>();

        for screen_edge in edges {
            if !path_visible(rect, &screen_edge.path, 12.0) {
                continue;
            }
            let edge = &self.graph.edges[screen_edge.index];
            let focused = self.edge_is_focused(screen_edge.index);

            let (width, color) = if focused {
                ((2.8 * zoom_sqrt).clamp(1.6, 5.0), edge.color)
            } else if selection_active {
                ((1.0 * zoom_sqrt).clamp(0.5, 2.0), dim_color(edge.color, 0.35))
            } else {
                ((0.8 + edge.strength * 1.6) * zoom_sqrt, dim_color(edge.color, 0.85))
            };
            draw_edge_path(painter, &screen_edge.path, Stroke::new(width, color));

            let target_radius = radius_by_id
                .get(edge.target.as_str())
                .copied()
                .unwrap_or(0.0);
            draw_arrowhead(painter, &screen_edge.path, target_radius, color);

            let show_label = focused || (self.show_edge_labels && self.zoom > 0.45);
            if show_label && rect.contains(screen_edge.label) {
                let text_color = if focused {
                    Color32::from_gray(245)
                } else {
                    Color32::from_gray(170)
                };
                painter.text(
                    screen_edge.label,
                    Align2::CENTER_CENTER,
                    &edge.relation,
                    FontId::proportional(11.0),
                    text_color,
                );
            }
        }
    }

    fn paint_nodes(&self, painter: &egui::Painter, rect: Rect, nodes: &[ScreenNode]) {
        let selected_color = Color32::from_rgb(245, 206, 93);
        let search_color = Color32::from_rgb(103, 196, 255);
        let search_active = !self.search_clusters.is_empty();
        let selected_edge = self
            .selection
            .selected_edge()
            .and_then(|id| self.graph.edge(id));

        for screen_node in nodes {
            if !circle_visible(rect, screen_node.position, screen_node.radius + 40.0) {
                continue;
            }
            let node = &self.graph.nodes[screen_node.index];
            let id = node.id.as_str();

            let is_selected = self.selection.selected_node() == Some(id);
            let is_hovered = self.selection.hovered_node() == Some(id);
            let is_endpoint =
                selected_edge.is_some_and(|edge| edge.source == id || edge.target == id);
            let is_search_match = self.search_clusters.contains(id);

            let color = if is_selected {
                blend_color(node.color, selected_color, 0.55)
            } else if is_hovered {
                blend_color(node.color, Color32::WHITE, 0.25)
            } else if is_search_match {
                blend_color(node.color, search_color, 0.45)
            } else if search_active || selected_edge.is_some_and(|_| !is_endpoint) {
                dim_color(node.color, 0.5)
            } else {
                node.color
            };

            painter.circle_filled(screen_node.position, screen_node.radius, color);
            let ring = if is_selected || is_endpoint {
                Stroke::new(2.4, selected_color)
            } else {
                Stroke::new(1.0, Color32::from_rgba_unmultiplied(15, 15, 15, 190))
            };
            painter.circle_stroke(screen_node.position, screen_node.radius, ring);

            painter.text(
                screen_node.position + vec2(0.0, screen_node.radius + 6.0),
                Align2::CENTER_TOP,
                &node.name,
                FontId::proportional(13.0),
                Color32::from_gray(235),
            );
        }
    }

    fn paint_hover_summary(&self, painter: &egui::Painter, rect: Rect, hovered: Option<&Hovered>) {
        let text = match hovered {
            Some(Hovered::Node(index)) => {
                let Some(node) = self.graph.nodes.get(*index) else {
                    return;
                };
                format!(
                    "{}  |  ideas {}  |  threads {}  |  comments {}",
                    node.name,
                    node.ideas.len(),
                    node.threads.len(),
                    node.comment_count
                )
            }
            Some(Hovered::Edge(index)) => {
                let Some(edge) = self.graph.edges.get(*index) else {
                    return;
                };
                format!(
                    "{} -> {}  |  {}",
                    self.cluster_name(&edge.source),
                    self.cluster_name(&edge.target),
                    edge.relation
                )
            }
            None => return,
        };

        painter.text(
            rect.left_top() + vec2(10.0, 10.0),
            Align2::LEFT_TOP,
            text,
            FontId::proportional(13.0),
            Color32::from_gray(240),
        );
    }

    pub(in crate::app) fn cluster_name<'a>(&'a self, cluster_id: &'a str) -> &'a str {
        self.graph
            .node(cluster_id)
            .map(|node| node.name.as_str())
            .unwrap_or(cluster_id)
    }
}
