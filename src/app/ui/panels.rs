use std::path::Path;

use eframe::egui::{self, Align, Context, Layout};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        dataset_path: &Path,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let title = if self.dataset.title.is_empty() {
                        "hearing-graph"
                    } else {
                        self.dataset.title.as_str()
                    };
                    ui.heading(title);
                    ui.separator();
                    ui.label(format!("dataset: {}", dataset_path.display()));
                    ui.label(format!("clusters: {}", self.graph.nodes.len()));
                    ui.label(format!("relations: {}", self.graph.edges.len()));
                    ui.label(format!("comments: {}", self.dataset.comment_count()));

                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload dataset"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    if ui.button("Rebuild graph").clicked() {
                        self.rebuild();
                    }
                    if ui.button("Reheat layout").clicked() {
                        self.engine.reheat(self.engine.config().initial_alpha);
                    }
                    if ui.button("Reset view").clicked() {
                        self.reset_view();
                    }
                    ui.checkbox(&mut self.show_edge_labels, "Edge labels");

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(status) = self.layout_status_text() {
                            ui.label(status);
                        }
                    });
                });
            });

        egui::SidePanel::left("search")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_search(ui));

        if self.selection.detail_pane_open() {
            egui::SidePanel::right("details")
                .resizable(true)
                .default_width(380.0)
                .show(ctx, |ui| self.draw_details(ui));
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                if is_loading {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Reloading hearing dataset...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                } else {
                    self.draw_graph(ui);
                }
            });
    }

    fn layout_status_text(&self) -> Option<String> {
        let alpha = self.engine.alpha()?;
        let state = if self.engine.is_running() {
            "settling"
        } else {
            "settled"
        };
        Some(format!("layout {state}  |  alpha {alpha:.3}"))
    }
}
