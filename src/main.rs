mod app;

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;
use hearing_graph::config::LayoutConfig;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON-LD dataset with clusters and their relations.
    dataset: PathBuf,

    /// JSON file overriding layout force constants.
    #[arg(long)]
    layout_config: Option<PathBuf>,

    #[arg(long)]
    link_distance: Option<f32>,

    #[arg(long, allow_negative_numbers = true)]
    charge_strength: Option<f32>,

    #[arg(long)]
    collision_padding: Option<f32>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hearing_graph=info")),
        )
        .init();

    let args = Args::parse();
    let config = match &args.layout_config {
        Some(path) => LayoutConfig::from_json_file(path)?,
        None => LayoutConfig::default(),
    }
    .with_overrides(
        args.link_distance,
        args.charge_strength,
        args.collision_padding,
    );

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "hearing-graph",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::ExplorerApp::new(
                cc,
                args.dataset.clone(),
                config,
            )))
        }),
    )
    .map_err(|error| anyhow!("viewer exited with an error: {error}"))
}
