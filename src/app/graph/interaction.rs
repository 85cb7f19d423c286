use eframe::egui::{self, Rect, Ui};
use tracing::debug;

use hearing_graph::layout::Viewport;

use super::super::render_utils::screen_to_world;
use super::super::{DEFAULT_ZOOM, MAX_ZOOM, MIN_ZOOM, ViewModel};

/// Zoom level after one wheel step, kept within the allowed range.
fn zoom_after_scroll(zoom: f32, scroll: f32) -> f32 {
    let factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
    (zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM)
}

impl ViewModel {
    /// Starts the layout on the first frame the canvas size is known and
    /// recenters it when the canvas changes size.
    pub(in crate::app) fn sync_viewport(&mut self, rect: Rect) {
        let viewport = Viewport::new(rect.width(), rect.height());
        match self.viewport {
            Some(previous) if previous == viewport => {}
            Some(_) => {
                self.viewport = Some(viewport);
                self.engine.resize(viewport);
            }
            None => {
                self.viewport = Some(viewport);
                self.engine
                    .start(&self.graph.nodes, &self.graph.edges, viewport);
            }
        }
    }

    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        self.zoom = zoom_after_scroll(self.zoom, scroll);
        self.pan = pointer - rect.center() - ((world_before - rect.size() * 0.5) * self.zoom);
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        let background_drag =
            self.dragging.is_none() && response.dragged_by(egui::PointerButton::Primary);
        if background_drag
            || response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
    }

    /// Primary-dragging a cluster pins it under the pointer; releasing hands
    /// it back to the simulation.
    pub(in crate::app) fn handle_node_drag(
        &mut self,
        rect: Rect,
        response: &egui::Response,
        press_node: Option<usize>,
    ) {
        if response.drag_started_by(egui::PointerButton::Primary) {
            self.dragging = press_node
                .and_then(|index| self.graph.nodes.get(index))
                .map(|node| node.id.clone());
        }

        let Some(node_id) = self.dragging.clone() else {
            return;
        };

        if response.dragged_by(egui::PointerButton::Primary)
            && let Some(pointer) = response.interact_pointer_pos()
        {
            let world = screen_to_world(rect, self.pan, self.zoom, pointer);
            self.engine.set_fixed_position(&node_id, world.x, world.y);
        }

        if response.drag_stopped() {
            self.engine.release_fixed_position(&node_id);
            self.dragging = None;
            debug!(node = node_id.as_str(), "drag released");
        }
    }

    pub(in crate::app) fn reset_view(&mut self) {
        self.pan = egui::Vec2::ZERO;
        self.zoom = DEFAULT_ZOOM;
    }

    /// Pans so the cluster sits in the middle of the canvas.
    pub(in crate::app) fn focus_cluster(&mut self, cluster_id: &str) {
        let (Some(viewport), Some(world)) = (self.viewport, self.engine.position(cluster_id)) else {
            return;
        };
        self.pan = (viewport.center() - world) * self.zoom;
    }
}
