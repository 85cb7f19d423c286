use eframe::egui::{self, Color32, RichText, Stroke, Ui, vec2};

use hearing_graph::dataset::Thread;
use hearing_graph::graph::{GraphEdge, GraphNode};
use hearing_graph::selection::{SelectionEvent, SelectionSink};

use super::super::ViewModel;

fn color_swatch(ui: &mut Ui, color: Color32) {
    let (rect, _) = ui.allocate_exact_size(vec2(12.0, 12.0), egui::Sense::hover());
    ui.painter().rect_filled(rect, 2.0, color);
    ui.painter()
        .rect_stroke(rect, 2.0, Stroke::new(1.0, Color32::from_gray(30)), egui::StrokeKind::Inside);
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.heading("Details");
            if ui.small_button("Close").clicked() {
                self.selection.close_detail_pane();
            }
        });
        ui.add_space(6.0);

        let mut follow = None;
        egui::ScrollArea::vertical()
            .id_salt("details_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                if let Some(node) = self
                    .selection
                    .selected_node()
                    .and_then(|id| self.graph.node(id))
                {
                    self.draw_cluster_details(ui, node);
                } else if let Some(edge) = self
                    .selection
                    .selected_edge()
                    .and_then(|id| self.graph.edge(id))
                {
                    follow = self.draw_relation_details(ui, edge);
                } else {
                    ui.label("Select a cluster or relation in the graph.");
                }
            });

        if let Some(cluster_id) = follow {
            self.selection.emit(SelectionEvent::NodeSelected(Some(cluster_id)));
        }
    }

    fn draw_cluster_details(&self, ui: &mut Ui, node: &GraphNode) {
        ui.horizontal(|ui| {
            color_swatch(ui, node.color);
            ui.label(RichText::new(&node.name).strong().size(16.0));
        });
        ui.small(node.id.as_str());
        ui.add_space(4.0);
        if !node.description.is_empty() {
            ui.label(node.description.as_str());
        }
        ui.label(format!(
            "{} ideas  |  {} threads  |  {} comments",
            node.ideas.len(),
            node.threads.len(),
            node.comment_count
        ));

        if !node.ideas.is_empty() {
            ui.separator();
            ui.label(RichText::new("Ideas").strong());
            for idea in &node.ideas {
                ui.label(format!("- {}", idea.text));
            }
        }

        if !node.threads.is_empty() {
            ui.separator();
            ui.label(RichText::new("Threads").strong());
            for thread in &node.threads {
                self.draw_thread(ui, node, thread);
            }
        }
    }

    fn draw_thread(&self, ui: &mut Ui, node: &GraphNode, thread: &Thread) {
        let title = if thread.name.is_empty() {
            thread.id.as_str()
        } else {
            thread.name.as_str()
        };

        egui::CollapsingHeader::new(format!("{title} ({})", thread.comments.len()))
            .id_salt(("thread", node.id.as_str(), thread.id.as_str()))
            .show(ui, |ui| {
                if !thread.summary.is_empty() {
                    ui.label(RichText::new(&thread.summary).italics());
                }
                if !thread.idea_id.is_empty() {
                    // The idea may belong to another cluster or be missing.
                    let idea = node
                        .ideas
                        .iter()
                        .find(|idea| idea.id == thread.idea_id)
                        .or_else(|| {
                            self.dataset
                                .clusters
                                .iter()
                                .find_map(|cluster| cluster.idea(&thread.idea_id))
                        });
                    match idea {
                        Some(idea) => ui.small(format!("idea: {}", idea.text)),
                        None => ui.small(format!("idea: {}", thread.idea_id)),
                    };
                }

                let mut comments = thread.comments.iter().collect::<Vec<_>>();
                comments.sort_by_key(|comment| comment.start_time.sort_key());
                for comment in comments {
                    ui.add_space(4.0);
                    ui.horizontal(|ui| {
                        ui.label(
                            RichText::new(comment.start_time.to_string())
                                .monospace()
                                .color(Color32::from_rgb(147, 197, 253)),
                        );
                        ui.label(RichText::new(self.dataset.author_name(&comment.author)).strong());
                    });
                    ui.label(comment.text.as_str());
                }
            });
    }

    /// Returns the cluster the user chose to jump to, if any.
    fn draw_relation_details(&self, ui: &mut Ui, edge: &GraphEdge) -> Option<String> {
        let mut follow = None;

        ui.horizontal(|ui| {
            color_swatch(ui, edge.color);
            ui.label(RichText::new(&edge.relation).strong().size(16.0));
        });
        ui.small(edge.id.as_str());
        ui.add_space(4.0);

        ui.horizontal(|ui| {
            ui.label("from");
            if ui.link(self.cluster_name(&edge.source)).clicked() {
                follow = Some(edge.source.clone());
            }
        });
        ui.horizontal(|ui| {
            ui.label("to");
            if ui.link(self.cluster_name(&edge.target)).clicked() {
                follow = Some(edge.target.clone());
            }
        });

        ui.separator();
        ui.label(format!("strength: {:.2}", edge.strength));
        if edge.group_total > 1 {
            ui.label(format!(
                "parallel relation {} of {}",
                edge.group_index + 1,
                edge.group_total
            ));
        }
        if edge.is_hub {
            ui.label(format!(
                "fan-out {} of {} from this cluster",
                edge.hub_index + 1,
                edge.hub_total
            ));
        }
        if self.graph.node(&edge.source).is_none() || self.graph.node(&edge.target).is_none() {
            ui.colored_label(
                Color32::from_rgb(248, 113, 113),
                "One endpoint is not a known cluster; this relation is not drawn.",
            );
        }

        follow
    }
}
