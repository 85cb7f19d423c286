use std::collections::HashMap;
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub struct Idea {
    pub id: String,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub start_time: Timestamp,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Thread {
    pub id: String,
    pub name: String,
    pub summary: String,
    /// Weak reference; the idea may live in another cluster or not exist.
    pub idea_id: String,
    pub comments: Vec<Comment>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Cluster {
    pub id: String,
    pub name: String,
    pub description: String,
    pub ideas: Vec<Idea>,
    pub threads: Vec<Thread>,
}

impl Cluster {
    pub fn comment_count(&self) -> usize {
        self.threads.iter().map(|thread| thread.comments.len()).sum()
    }

    pub fn idea(&self, idea_id: &str) -> Option<&Idea> {
        self.ideas.iter().find(|idea| idea.id == idea_id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Relation {
    pub source: String,
    pub target: String,
    pub relation: String,
}

impl Relation {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        relation: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            relation: relation.into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    pub title: String,
    pub keywords: Vec<String>,
    pub authors: HashMap<String, String>,
    pub clusters: Vec<Cluster>,
    pub relations: Vec<Relation>,
}

impl Dataset {
    pub fn cluster(&self, cluster_id: &str) -> Option<&Cluster> {
        self.clusters.iter().find(|cluster| cluster.id == cluster_id)
    }

    pub fn comment_count(&self) -> usize {
        self.clusters.iter().map(Cluster::comment_count).sum()
    }

    /// Resolves an author reference to a display name, falling back to the raw reference.
    pub fn author_name<'a>(&'a self, reference: &'a str) -> &'a str {
        self.authors
            .get(reference)
            .map(String::as_str)
            .unwrap_or(reference)
    }
}

/// Transcript offset. Keeps the raw text when it is not `M:SS` or `H:MM:SS`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timestamp {
    raw: String,
    seconds: Option<u32>,
}

impl Timestamp {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let parts = raw
            .split(':')
            .map(|part| part.parse::<u32>().ok())
            .collect::<Option<Vec<_>>>();

        let seconds = match parts.as_deref() {
            Some([minutes, seconds]) if *seconds < 60 => minutes
                .checked_mul(60)
                .and_then(|total| total.checked_add(*seconds)),
            Some([hours, minutes, seconds]) if *minutes < 60 && *seconds < 60 => hours
                .checked_mul(3600)
                .and_then(|total| total.checked_add(minutes * 60 + seconds)),
            _ => None,
        };

        Self {
            raw: raw.to_owned(),
            seconds,
        }
    }

    pub fn seconds(&self) -> Option<u32> {
        self.seconds
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Ordering key; unparseable timestamps sort after every valid one.
    pub fn sort_key(&self) -> u32 {
        self.seconds.unwrap_or(u32::MAX)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(total) = self.seconds else {
            return f.write_str(&self.raw);
        };

        let hours = total / 3600;
        let minutes = (total % 3600) / 60;
        let seconds = total % 60;
        if self.raw.matches(':').count() == 2 {
            write!(f, "{hours}:{minutes:02}:{seconds:02}")
        } else {
            write!(f, "{}:{seconds:02}", total / 60)
        }
    }
}
