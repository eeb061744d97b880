//! Jaccard-similarity duplicate and title-collision detection over studio content.
//!
//! Similarity is measured on token sets (or k-word shingles) of the body text.
//! Titles are compared separately so a fresh body under a recycled headline is
//! still caught.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

const MIN_TOKEN_LEN: usize = 3;

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "your", "all", "any", "can", "had", "her",
    "was", "one", "our", "out", "has", "him", "his", "how", "its", "may", "who", "did", "get",
    "she", "too", "use", "with", "that", "this", "from", "they", "will", "what", "when", "where",
    "which", "while", "have", "into", "more", "than", "then", "them", "their", "there", "these",
    "those", "been", "were", "also", "just", "only", "over", "such", "very", "about", "after",
    "before", "because", "each", "other", "some", "would", "could", "should", "here", "why",
];

/// Lowercased alphanumeric tokens in reading order, stopwords and short tokens removed.
fn token_stream(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= MIN_TOKEN_LEN)
        .map(|t| t.to_lowercase())
        .filter(|t| !STOPWORDS.contains(&t.as_str()))
        .collect()
}

/// Token set of a piece of text.
pub fn tokenize(text: &str) -> HashSet<String> {
    token_stream(text).into_iter().collect()
}

/// k-word shingles over the token stream.
///
/// Falls back to the plain token set when `k <= 1` or the text is shorter than `k` tokens.
pub fn shingles(text: &str, k: usize) -> HashSet<String> {
    let tokens = token_stream(text);
    if k <= 1 || tokens.len() < k {
        return tokens.into_iter().collect();
    }
    tokens.windows(k).map(|w| w.join(" ")).collect()
}

/// J(A, B) = |A ∩ B| / |A ∪ B|. Returns 0.0 if both sets are empty.
pub fn jaccard_similarity(set_a: &HashSet<String>, set_b: &HashSet<String>) -> f64 {
    if set_a.is_empty() && set_b.is_empty() {
        return 0.0;
    }
    let intersection = set_a.intersection(set_b).count();
    let union = set_a.union(set_b).count();
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

/// Lowercase, strip punctuation, collapse whitespace.
pub fn normalize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .flat_map(char::to_lowercase)
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// A piece of content to compare. `id` is `None` for content not yet persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentSample {
    pub id: Option<Uuid>,
    pub category: String,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityVerdict {
    Duplicate,
    NearDuplicate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityMatch {
    pub id: Option<Uuid>,
    pub title: String,
    pub similarity: f64,
    pub verdict: SimilarityVerdict,
    pub title_collision: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateReport {
    pub is_duplicate: bool,
    pub title_collision: bool,
    /// Title of the first existing item whose title collides, if any.
    pub colliding_title: Option<String>,
    pub max_similarity: f64,
    /// Sorted by descending similarity.
    pub matches: Vec<SimilarityMatch>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicatePair {
    pub a: Option<Uuid>,
    pub b: Option<Uuid>,
    pub title_a: String,
    pub title_b: String,
    pub similarity: f64,
    pub verdict: SimilarityVerdict,
}

/// Threshold-driven duplicate detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateDetector {
    /// At or above: the body is a duplicate.
    pub duplicate_threshold: f64,
    /// At or above (and below `duplicate_threshold`): flagged for review.
    pub near_duplicate_threshold: f64,
    /// Title token overlap at or above this counts as a collision.
    pub title_threshold: f64,
    pub shingle_size: usize,
}

impl Default for DuplicateDetector {
    fn default() -> Self {
        Self {
            duplicate_threshold: 0.80,
            near_duplicate_threshold: 0.50,
            title_threshold: 0.80,
            shingle_size: 1,
        }
    }
}

impl DuplicateDetector {
    fn features(&self, text: &str) -> HashSet<String> {
        shingles(text, self.shingle_size)
    }

    fn verdict(&self, similarity: f64) -> Option<SimilarityVerdict> {
        if similarity >= self.duplicate_threshold {
            Some(SimilarityVerdict::Duplicate)
        } else if similarity >= self.near_duplicate_threshold {
            Some(SimilarityVerdict::NearDuplicate)
        } else {
            None
        }
    }

    /// True when two titles are the same after normalization, or share most of their tokens.
    pub fn titles_collide(&self, a: &str, b: &str) -> bool {
        let norm_a = normalize_title(a);
        let norm_b = normalize_title(b);
        if norm_a.is_empty() || norm_b.is_empty() {
            return false;
        }
        if norm_a == norm_b {
            return true;
        }
        jaccard_similarity(&tokenize(&norm_a), &tokenize(&norm_b)) >= self.title_threshold
    }

    /// Compares a candidate against existing content.
    pub fn check(&self, candidate: &ContentSample, existing: &[ContentSample]) -> DuplicateReport {
        let candidate_features = self.features(&candidate.body);
        let mut matches = Vec::new();
        let mut max_similarity: f64 = 0.0;
        let mut colliding_title = None;

        for other in existing {
            if candidate.id.is_some() && candidate.id == other.id {
                continue;
            }

            let similarity = jaccard_similarity(&candidate_features, &self.features(&other.body));
            let title_collision = self.titles_collide(&candidate.title, &other.title);
            max_similarity = max_similarity.max(similarity);

            if title_collision && colliding_title.is_none() {
                colliding_title = Some(other.title.clone());
            }

            if let Some(verdict) = self.verdict(similarity) {
                matches.push(SimilarityMatch {
                    id: other.id,
                    title: other.title.clone(),
                    similarity,
                    verdict,
                    title_collision,
                });
            }
        }

        matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));

        DuplicateReport {
            is_duplicate: matches
                .iter()
                .any(|m| m.verdict == SimilarityVerdict::Duplicate),
            title_collision: colliding_title.is_some(),
            colliding_title,
            max_similarity,
            matches,
        }
    }

    /// Pairwise near-duplicate detection within a batch. Only same-category items are compared.
    pub fn find_duplicates(&self, items: &[ContentSample]) -> Vec<DuplicatePair> {
        let mut by_category: HashMap<&str, Vec<(&ContentSample, HashSet<String>)>> =
            HashMap::new();
        for item in items {
            by_category
                .entry(item.category.as_str())
                .or_default()
                .push((item, self.features(&item.body)));
        }

        let mut pairs = Vec::new();
        for group in by_category.values() {
            for i in 0..group.len() {
                for j in (i + 1)..group.len() {
                    let similarity = jaccard_similarity(&group[i].1, &group[j].1);
                    if let Some(verdict) = self.verdict(similarity) {
                        pairs.push(DuplicatePair {
                            a: group[i].0.id,
                            b: group[j].0.id,
                            title_a: group[i].0.title.clone(),
                            title_b: group[j].0.title.clone(),
                            similarity,
                            verdict,
                        });
                    }
                }
            }
        }

        pairs.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        pairs
    }
}
