mod model;
mod parse;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

pub use model::{Cluster, Comment, Dataset, Idea, Relation, Thread, Timestamp};
pub use parse::{DatasetError, parse_dataset};

pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset {}", path.display()))?;
    let dataset = parse_dataset(&raw)
        .with_context(|| format!("failed to decode dataset {}", path.display()))?;

    info!(
        path = %path.display(),
        clusters = dataset.clusters.len(),
        relations = dataset.relations.len(),
        comments = dataset.comment_count(),
        "loaded dataset"
    );

    Ok(dataset)
}
