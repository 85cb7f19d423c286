use eframe::egui::text::LayoutJob;
use eframe::egui::{self, Color32, FontId, RichText, Sense, TextFormat, Ui};

use hearing_graph::search::{DocumentKind, SearchResult};
use hearing_graph::selection::{SelectionEvent, SelectionSink};

use super::super::ViewModel;

const MAX_RESULT_ROWS: usize = 200;

fn kind_color(kind: DocumentKind) -> Color32 {
    match kind {
        DocumentKind::Cluster => Color32::from_rgb(96, 165, 250),
        DocumentKind::Idea => Color32::from_rgb(250, 204, 21),
        DocumentKind::Thread => Color32::from_rgb(52, 211, 153),
        DocumentKind::Comment => Color32::from_rgb(244, 114, 182),
    }
}

fn highlighted_text(result: &SearchResult) -> LayoutJob {
    let plain = TextFormat {
        font_id: FontId::proportional(13.0),
        color: Color32::from_gray(220),
        ..Default::default()
    };
    let marked = TextFormat {
        color: Color32::from_rgb(255, 214, 102),
        background: Color32::from_rgba_unmultiplied(255, 214, 102, 28),
        ..plain.clone()
    };

    let mut job = LayoutJob::default();
    let mut next_highlight = result.highlights.iter().peekable();
    let mut buffer = [0u8; 4];
    for (index, ch) in result.text.chars().enumerate() {
        let is_marked = next_highlight.next_if_eq(&&index).is_some();
        let format = if is_marked { &marked } else { &plain };
        job.append(ch.encode_utf8(&mut buffer), 0.0, format.clone());
    }
    job
}

impl ViewModel {
    pub(in crate::app) fn draw_search(&mut self, ui: &mut Ui) {
        ui.heading("Search");
        ui.add_space(4.0);

        let response = ui.add(
            egui::TextEdit::singleline(&mut self.search_query)
                .hint_text("clusters, ideas, threads, comments")
                .desired_width(f32::INFINITY),
        );
        if response.changed() {
            self.refresh_search();
        }

        ui.add_space(6.0);
        if self.search_query.trim().is_empty() {
            ui.label("Type to search the hearing record.");
            return;
        }
        if self.search_results.is_empty() {
            ui.label("No matches.");
            return;
        }

        ui.small(format!("{} results", self.search_results.len()));
        ui.separator();

        let mut picked = None;
        egui::ScrollArea::vertical()
            .id_salt("search_results_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for (row, result) in self.search_results.iter().take(MAX_RESULT_ROWS).enumerate() {
                    ui.push_id(row, |ui| {
                        ui.horizontal(|ui| {
                            ui.label(
                                RichText::new(result.kind.as_str())
                                    .small()
                                    .color(kind_color(result.kind)),
                            );
                            ui.small(self.cluster_name(&result.cluster_id));
                            if let Some(timestamp) = &result.timestamp {
                                ui.small(timestamp.to_string());
                            }
                        });

                        let label = ui
                            .add(egui::Label::new(highlighted_text(result)).sense(Sense::click()))
                            .on_hover_text(format!(
                                "{}\nscore {:.2}\nmatched: {}",
                                result.id,
                                result.score,
                                result.matched_terms.join(", ")
                            ));
                        if label.clicked() {
                            picked = Some(result.cluster_id.clone());
                        }
                        ui.separator();
                    });
                }
            });

        if let Some(cluster_id) = picked {
            self.selection
                .emit(SelectionEvent::NodeSelected(Some(cluster_id.clone())));
            self.focus_cluster(&cluster_id);
        }
    }
}
