use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Language bucket used for repositories that do not declare one.
pub const NO_LANGUAGE: &str = "No Language Specified";

/// A repository hosting provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Github,
    Bitbucket,
}

impl Source {
    pub const ALL: [Source; 2] = [Source::Github, Source::Bitbucket];

    pub fn as_str(self) -> &'static str {
        match self {
            Source::Github => "github",
            Source::Bitbucket => "bitbucket",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "github" => Ok(Source::Github),
            "bitbucket" => Ok(Source::Bitbucket),
            other => Err(format!("unknown source '{}'", other)),
        }
    }
}

/// Normalized, source-agnostic view of one repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryFact {
    pub is_private: bool,
    pub language: Option<String>,
    pub is_fork: bool,
    pub watcher_count: u64,
    pub topics: Vec<String>,
}

/// Running aggregate for one organization.
///
/// Private repositories never contribute, so `original_repositories +
/// forked_repositories` is the number of public facts accumulated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrgSummary {
    pub original_repositories: u64,
    pub forked_repositories: u64,
    pub watcher_total: u64,
    pub language_counts: BTreeMap<String, u64>,
    pub topic_counts: BTreeMap<String, u64>,
}

/// Serializable, read-only view of an [`OrgSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarySnapshot {
    pub original_repositories: u64,
    pub forked_repositories: u64,
    pub watchers_count: u64,
    pub languages: BTreeMap<String, u64>,
    pub topics: BTreeMap<String, u64>,
}

impl OrgSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accumulate(&mut self, fact: &RepositoryFact) {
        if fact.is_private {
            return;
        }

        if fact.is_fork {
            self.forked_repositories += 1;
        } else {
            self.original_repositories += 1;
        }

        for topic in &fact.topics {
            *self.topic_counts.entry(topic.clone()).or_insert(0) += 1;
        }

        self.watcher_total += fact.watcher_count;

        let language = fact.language.as_deref().unwrap_or(NO_LANGUAGE);
        *self.language_counts.entry(language.to_string()).or_insert(0) += 1;
    }

    pub fn repository_count(&self) -> u64 {
        self.original_repositories + self.forked_repositories
    }

    pub fn snapshot(&self) -> SummarySnapshot {
        SummarySnapshot {
            original_repositories: self.original_repositories,
            forked_repositories: self.forked_repositories,
            watchers_count: self.watcher_total,
            languages: self.language_counts.clone(),
            topics: self.topic_counts.clone(),
        }
    }
}

fn merge_counts(a: &BTreeMap<String, u64>, b: &BTreeMap<String, u64>) -> BTreeMap<String, u64> {
    let mut merged = a.clone();
    for (key, count) in b {
        *merged.entry(key.clone()).or_insert(0) += count;
    }
    merged
}

/// Merges two summaries into a new one. Neither input is modified.
pub fn combine(a: &OrgSummary, b: &OrgSummary) -> OrgSummary {
    OrgSummary {
        original_repositories: a.original_repositories + b.original_repositories,
        forked_repositories: a.forked_repositories + b.forked_repositories,
        watcher_total: a.watcher_total + b.watcher_total,
        language_counts: merge_counts(&a.language_counts, &b.language_counts),
        topic_counts: merge_counts(&a.topic_counts, &b.topic_counts),
    }
}

pub fn combine_all<'a, I>(summaries: I) -> OrgSummary
where
    I: IntoIterator<Item = &'a OrgSummary>,
{
    summaries
        .into_iter()
        .fold(OrgSummary::default(), |acc, s| combine(&acc, s))
}
