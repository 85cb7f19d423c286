use std::collections::BTreeMap;
use std::fmt;
use std::ops::Bound;

use crate::dataset::{Dataset, Timestamp};

use super::tokenize::tokenize;

const TITLE_CHARS: usize = 60;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocumentKind {
    Cluster,
    Idea,
    Thread,
    Comment,
}

impl DocumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cluster => "cluster",
            Self::Idea => "idea",
            Self::Thread => "thread",
            Self::Comment => "comment",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(super) enum Field {
    Title = 0,
    Text = 1,
    Author = 2,
}

impl Field {
    pub(super) const ALL: [Self; 3] = [Self::Title, Self::Text, Self::Author];

    pub(super) fn boost(self) -> f32 {
        match self {
            Self::Title => 3.0,
            Self::Text => 2.0,
            Self::Author => 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SearchDocument {
    pub kind: DocumentKind,
    pub id: String,
    pub cluster_id: String,
    pub title: String,
    pub text: String,
    pub author: Option<String>,
    pub timestamp: Option<Timestamp>,
}

impl SearchDocument {
    /// Title when present, otherwise the body text.
    pub fn display_text(&self) -> &str {
        if self.title.is_empty() {
            &self.text
        } else {
            &self.title
        }
    }

    fn field(&self, field: Field) -> Option<&str> {
        match field {
            Field::Title => Some(&self.title),
            Field::Text => Some(&self.text),
            Field::Author => self.author.as_deref(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct Posting {
    pub(super) document: usize,
    pub(super) field: Field,
    pub(super) frequency: u32,
}

/// Inverted index over the four document kinds. Document identity is the
/// position in `documents`, so colliding composite ids still stay apart.
#[derive(Clone, Debug, Default)]
pub struct SearchIndex {
    documents: Vec<SearchDocument>,
    field_lengths: Vec<[u32; 3]>,
    average_field_length: [f32; 3],
    postings: BTreeMap<String, Vec<Posting>>,
}

impl SearchIndex {
    pub fn from_documents(documents: Vec<SearchDocument>) -> Self {
        let mut postings: BTreeMap<String, Vec<Posting>> = BTreeMap::new();
        let mut field_lengths = Vec::with_capacity(documents.len());
        let mut totals = [0u64; 3];
        let mut present = [0u64; 3];

        for (document_index, document) in documents.iter().enumerate() {
            let mut lengths = [0u32; 3];
            for field in Field::ALL {
                let Some(value) = document.field(field) else {
                    continue;
                };

                let tokens = tokenize(value);
                let slot = field as usize;
                lengths[slot] = tokens.len() as u32;
                totals[slot] += tokens.len() as u64;
                present[slot] += 1;

                let mut counts: BTreeMap<String, u32> = BTreeMap::new();
                for token in tokens {
                    *counts.entry(token).or_default() += 1;
                }
                for (term, frequency) in counts {
                    postings.entry(term).or_default().push(Posting {
                        document: document_index,
                        field,
                        frequency,
                    });
                }
            }
            field_lengths.push(lengths);
        }

        let average_field_length = std::array::from_fn(|slot| {
            if present[slot] == 0 {
                0.0
            } else {
                totals[slot] as f32 / present[slot] as f32
            }
        });

        Self {
            documents,
            field_lengths,
            average_field_length,
            postings,
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    pub fn documents(&self) -> &[SearchDocument] {
        &self.documents
    }

    pub(super) fn document(&self, index: usize) -> &SearchDocument {
        &self.documents[index]
    }

    pub(super) fn field_length(&self, document: usize, field: Field) -> f32 {
        self.field_lengths[document][field as usize] as f32
    }

    pub(super) fn average_field_length(&self, field: Field) -> f32 {
        self.average_field_length[field as usize]
    }

    pub(super) fn postings(&self, term: &str) -> Option<&[Posting]> {
        self.postings.get(term).map(Vec::as_slice)
    }

    /// Indexed terms starting with `prefix`, in lexical order.
    pub(super) fn terms_with_prefix<'a, 'p>(
        &'a self,
        prefix: &'p str,
    ) -> impl Iterator<Item = &'a str> + use<'a, 'p> {
        self.postings
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .map(|(term, _)| term.as_str())
            .take_while(move |term| term.starts_with(prefix))
    }

    pub(super) fn terms(&self) -> impl Iterator<Item = &str> {
        self.postings.keys().map(String::as_str)
    }
}

fn leading_chars(text: &str, count: usize) -> String {
    text.chars().take(count).collect()
}

pub fn build_search_index(dataset: &Dataset) -> SearchIndex {
    let mut documents = Vec::new();

    for cluster in &dataset.clusters {
        let cluster_id = &cluster.id;
        documents.push(SearchDocument {
            kind: DocumentKind::Cluster,
            id: format!("cluster:{cluster_id}"),
            cluster_id: cluster_id.clone(),
            title: cluster.name.clone(),
            text: cluster.description.clone(),
            author: None,
            timestamp: None,
        });

        for idea in &cluster.ideas {
            documents.push(SearchDocument {
                kind: DocumentKind::Idea,
                id: format!("idea:{cluster_id}:{}", idea.id),
                cluster_id: cluster_id.clone(),
                title: leading_chars(&idea.text, TITLE_CHARS),
                text: idea.text.clone(),
                author: None,
                timestamp: None,
            });
        }

        for thread in &cluster.threads {
            documents.push(SearchDocument {
                kind: DocumentKind::Thread,
                id: format!("thread:{cluster_id}:{}", thread.id),
                cluster_id: cluster_id.clone(),
                title: thread.name.clone(),
                text: thread.summary.clone(),
                author: None,
                timestamp: None,
            });

            for comment in &thread.comments {
                documents.push(SearchDocument {
                    kind: DocumentKind::Comment,
                    id: format!("comment:{cluster_id}:{}:{}", thread.id, comment.id),
                    cluster_id: cluster_id.clone(),
                    title: leading_chars(&comment.text, TITLE_CHARS),
                    text: comment.text.clone(),
                    author: Some(dataset.author_name(&comment.author).to_owned()),
                    timestamp: Some(comment.start_time.clone()),
                });
            }
        }
    }

    SearchIndex::from_documents(documents)
}
