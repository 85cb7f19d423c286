use std::sync::mpsc::Sender;

use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionEvent {
    NodeSelected(Option<String>),
    EdgeSelected(Option<String>),
    NodeHovered(Option<String>),
    EdgeHovered(Option<String>),
}

/// Receiver of pointer-driven selection and hover changes from the graph view.
pub trait SelectionSink {
    fn emit(&mut self, event: SelectionEvent);
}

impl SelectionSink for Sender<SelectionEvent> {
    fn emit(&mut self, event: SelectionEvent) {
        if self.send(event).is_err() {
            debug!("selection receiver dropped");
        }
    }
}

impl SelectionSink for Vec<SelectionEvent> {
    fn emit(&mut self, event: SelectionEvent) {
        self.push(event);
    }
}

/// At most one of node and edge is selected at a time; the detail pane is
/// open whenever either is.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected_node: Option<String>,
    selected_edge: Option<String>,
    hovered_node: Option<String>,
    hovered_edge: Option<String>,
    detail_pane_open: bool,
}

impl SelectionState {
    pub fn selected_node(&self) -> Option<&str> {
        self.selected_node.as_deref()
    }

    pub fn selected_edge(&self) -> Option<&str> {
        self.selected_edge.as_deref()
    }

    pub fn hovered_node(&self) -> Option<&str> {
        self.hovered_node.as_deref()
    }

    pub fn hovered_edge(&self) -> Option<&str> {
        self.hovered_edge.as_deref()
    }

    pub fn detail_pane_open(&self) -> bool {
        self.detail_pane_open
    }

    /// Hides the pane while keeping the selection highlighted.
    pub fn close_detail_pane(&mut self) {
        self.detail_pane_open = false;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Drops references to ids that no longer exist after a rebuild.
    pub fn retain_known(&mut self, node_exists: impl Fn(&str) -> bool, edge_exists: impl Fn(&str) -> bool) {
        for slot in [&mut self.selected_node, &mut self.hovered_node] {
            if slot.as_deref().is_some_and(|id| !node_exists(id)) {
                *slot = None;
            }
        }
        for slot in [&mut self.selected_edge, &mut self.hovered_edge] {
            if slot.as_deref().is_some_and(|id| !edge_exists(id)) {
                *slot = None;
            }
        }
        self.detail_pane_open &= self.selected_node.is_some() || self.selected_edge.is_some();
    }
}

impl SelectionSink for SelectionState {
    fn emit(&mut self, event: SelectionEvent) {
        match event {
            SelectionEvent::NodeSelected(id) => {
                self.detail_pane_open = id.is_some();
                self.selected_node = id;
                self.selected_edge = None;
            }
            SelectionEvent::EdgeSelected(id) => {
                self.detail_pane_open = id.is_some();
                self.selected_edge = id;
                self.selected_node = None;
            }
            SelectionEvent::NodeHovered(id) => self.hovered_node = id,
            SelectionEvent::EdgeHovered(id) => self.hovered_edge = id,
        }
    }
}
