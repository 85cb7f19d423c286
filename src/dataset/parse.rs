use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::model::{Cluster, Comment, Dataset, Idea, Relation, Thread, Timestamp};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("invalid JSON-LD document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a JSON object at the document root")]
    NotAnObject,
    #[error("document has no `hasPart` cluster list")]
    MissingClusters,
    #[error("cluster #{index} has an empty `@id`")]
    EmptyClusterId { index: usize },
}

#[derive(Clone, Debug, Deserialize)]
struct RawAuthor {
    #[serde(rename = "@id")]
    id: String,
    #[serde(default)]
    name: String,
}

#[derive(Clone, Debug, Deserialize)]
struct RawIdea {
    #[serde(rename = "@id")]
    id: String,
    #[serde(default)]
    text: String,
}

#[derive(Clone, Debug, Deserialize)]
struct RawIdeaRef {
    #[serde(default, rename = "@id")]
    id: String,
}

#[derive(Clone, Debug, Deserialize)]
struct RawComment {
    #[serde(rename = "@id")]
    id: String,
    #[serde(default, rename = "startTime")]
    start_time: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    author: String,
}

#[derive(Clone, Debug, Deserialize)]
struct RawThread {
    #[serde(rename = "@id")]
    id: String,
    #[serde(default, rename = "ref:idea")]
    idea: Option<RawIdeaRef>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    summary: String,
    #[serde(default, rename = "cx:comments")]
    comments: Vec<RawComment>,
}

#[derive(Clone, Debug, Deserialize)]
struct RawCluster {
    #[serde(rename = "@id")]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default, rename = "itemListElement")]
    ideas: Vec<RawIdea>,
    #[serde(default, rename = "cx:threads")]
    threads: Vec<RawThread>,
}

#[derive(Clone, Debug, Deserialize)]
struct RawEdge {
    from: String,
    to: String,
    #[serde(default)]
    relation: String,
}

pub fn parse_dataset(raw: &str) -> Result<Dataset, DatasetError> {
    let parsed: Value = serde_json::from_str(raw)?;
    let object = parsed.as_object().ok_or(DatasetError::NotAnObject)?;

    let raw_clusters = object
        .get("hasPart")
        .ok_or(DatasetError::MissingClusters)?;
    let raw_clusters = Vec::<RawCluster>::deserialize(raw_clusters)?;

    let mut clusters = Vec::with_capacity(raw_clusters.len());
    for (index, cluster) in raw_clusters.into_iter().enumerate() {
        if cluster.id.trim().is_empty() {
            return Err(DatasetError::EmptyClusterId { index });
        }
        clusters.push(convert_cluster(cluster));
    }

    let relations = match object.get("cx:edges") {
        Some(value) => Vec::<RawEdge>::deserialize(value)?
            .into_iter()
            .map(|edge| Relation::new(edge.from, edge.to, edge.relation))
            .collect(),
        None => Vec::new(),
    };

    let title = object
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let keywords = object
        .get("keywords")
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let mut authors = HashMap::new();
    if let Some(value) = object.get("authors") {
        for author in Vec::<RawAuthor>::deserialize(value)? {
            if !author.name.is_empty() {
                authors.insert(author.id, author.name);
            }
        }
    }

    Ok(Dataset {
        title,
        keywords,
        authors,
        clusters,
        relations,
    })
}

fn convert_cluster(raw: RawCluster) -> Cluster {
    Cluster {
        id: raw.id,
        name: raw.name,
        description: raw.description,
        ideas: raw
            .ideas
            .into_iter()
            .map(|idea| Idea {
                id: idea.id,
                text: idea.text,
            })
            .collect(),
        threads: raw.threads.into_iter().map(convert_thread).collect(),
    }
}

fn convert_thread(raw: RawThread) -> Thread {
    Thread {
        id: raw.id,
        name: raw.name,
        summary: raw.summary,
        idea_id: raw.idea.map(|idea| idea.id).unwrap_or_default(),
        comments: raw
            .comments
            .into_iter()
            .map(|comment| Comment {
                id: comment.id,
                author: comment.author,
                start_time: Timestamp::parse(&comment.start_time),
                text: comment.text,
            })
            .collect(),
    }
}
