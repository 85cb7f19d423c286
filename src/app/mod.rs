use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Vec2};
use tracing::{error, info};

use hearing_graph::config::LayoutConfig;
use hearing_graph::dataset::{Dataset, load_dataset};
use hearing_graph::graph::{GraphData, PaletteCursor, build_graph_model};
use hearing_graph::layout::{LayoutEngine, Viewport};
use hearing_graph::search::{SearchResult, SearchService};
use hearing_graph::selection::SelectionState;

mod graph;
mod render_utils;
mod ui;

type LoadResult = Result<Dataset, String>;

const DEFAULT_ZOOM: f32 = 0.8;
const MIN_ZOOM: f32 = 0.3;
const MAX_ZOOM: f32 = 3.0;

pub struct ExplorerApp {
    dataset_path: PathBuf,
    config: LayoutConfig,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    dataset: Dataset,
    graph: GraphData,
    palette: PaletteCursor,
    engine: LayoutEngine,
    viewport: Option<Viewport>,
    search: SearchService,
    search_query: String,
    search_results: Vec<SearchResult>,
    search_clusters: HashSet<String>,
    selection: SelectionState,
    dragging: Option<String>,
    pan: Vec2,
    zoom: f32,
    show_edge_labels: bool,
}

impl ExplorerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, dataset_path: PathBuf, config: LayoutConfig) -> Self {
        let state = Self::start_load(dataset_path.clone());
        Self {
            dataset_path,
            config,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(dataset_path: PathBuf) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_dataset(&dataset_path).map_err(|error| {
                error!(error = format!("{error:#}"), "dataset load failed");
                format!("{error:#}")
            });
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(dataset_path: PathBuf) -> AppState {
        info!(path = %dataset_path.display(), "loading dataset");
        AppState::Loading {
            rx: Self::spawn_load(dataset_path),
        }
    }
}

impl eframe::App for ExplorerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(dataset)) => {
                        transition = Some(AppState::Ready(Box::new(ViewModel::new(
                            dataset,
                            self.config,
                        ))));
                    }
                    Ok(Err(error)) => transition = Some(AppState::Error(error)),
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition =
                            Some(AppState::Error("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading hearing dataset...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load hearing dataset");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.dataset_path.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.dataset_path, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.dataset_path.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(dataset)) => model.replace_dataset(dataset),
                        Ok(Err(error)) => transition = Some(AppState::Error(error)),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(AppState::Error("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            if let AppState::Ready(model) = &mut self.state {
                model.engine.stop();
            }
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}

impl ViewModel {
    fn new(dataset: Dataset, config: LayoutConfig) -> Self {
        let mut model = Self {
            dataset,
            graph: GraphData::default(),
            palette: PaletteCursor::new(),
            engine: LayoutEngine::new(config),
            viewport: None,
            search: SearchService::new(),
            search_query: String::new(),
            search_results: Vec::new(),
            search_clusters: HashSet::new(),
            selection: SelectionState::default(),
            dragging: None,
            pan: Vec2::ZERO,
            zoom: DEFAULT_ZOOM,
            show_edge_labels: true,
        };
        model.rebuild();
        model
    }

    /// Swaps in a freshly loaded dataset, keeping edge colors stable.
    fn replace_dataset(&mut self, dataset: Dataset) {
        self.dataset = dataset;
        self.rebuild();
    }

    /// Rebuilds the graph model and search index from the current dataset and
    /// restarts the layout. The previous simulation is discarded.
    fn rebuild(&mut self) {
        let palette = std::mem::take(&mut self.palette);
        let (graph, palette) = build_graph_model(&self.dataset, palette);
        self.graph = graph;
        self.palette = palette;

        self.search.rebuild(&self.dataset);
        self.refresh_search();

        let graph = &self.graph;
        self.selection.retain_known(
            |id| graph.node(id).is_some(),
            |id| graph.edge(id).is_some(),
        );
        self.dragging = None;

        match self.viewport {
            Some(viewport) => self
                .engine
                .start(&self.graph.nodes, &self.graph.edges, viewport),
            None => self.engine.stop(),
        }
    }

    fn refresh_search(&mut self) {
        self.search_results = self.search.query(&self.search_query);
        self.search_clusters = self
            .search_results
            .iter()
            .map(|result| result.cluster_id.clone())
            .collect();
    }
}
