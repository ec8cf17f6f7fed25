//! Text vectorization for sentiment model inference.
//!
//! The vectorizer is an externally fitted artifact. This module only applies
//! it: raw review text in, sparse feature vector out, in the exact index space
//! the classifier was trained against.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Sparse feature vector produced by a [`Vectorizer`].
///
/// Entries are sorted by feature index and hold no duplicates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureVector {
    dim: usize,
    entries: Vec<(usize, f32)>,
}

impl FeatureVector {
    /// Build a vector from `(index, value)` pairs. Duplicate indices are summed.
    pub fn new(dim: usize, entries: impl IntoIterator<Item = (usize, f32)>) -> Result<Self> {
        let mut merged: BTreeMap<usize, f32> = BTreeMap::new();
        for (idx, value) in entries {
            if idx >= dim {
                bail!("feature index {} out of range for dimension {}", idx, dim);
            }
            *merged.entry(idx).or_insert(0.0) += value;
        }
        Ok(Self {
            dim,
            entries: merged.into_iter().collect(),
        })
    }

    /// Dense vector of a single dimension filled from a slice.
    pub fn from_dense(values: &[f32]) -> Self {
        Self {
            dim: values.len(),
            entries: values
                .iter()
                .enumerate()
                .filter(|(_, &v)| v != 0.0)
                .map(|(i, &v)| (i, v))
                .collect(),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn entries(&self) -> &[(usize, f32)] {
        &self.entries
    }

    /// Number of non-zero entries
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn to_dense(&self) -> Vec<f32> {
        let mut dense = vec![0.0; self.dim];
        for &(idx, value) in &self.entries {
            dense[idx] = value;
        }
        dense
    }

    /// Dot product against a weight row of the same dimension.
    pub fn dot(&self, weights: &[f64]) -> Result<f64> {
        if weights.len() != self.dim {
            bail!(
                "weight row has {} features, input has {}",
                weights.len(),
                self.dim
            );
        }
        Ok(self
            .entries
            .iter()
            .map(|&(idx, value)| weights[idx] * value as f64)
            .sum())
    }
}

/// A pre-fitted text transform. Implementations must not mutate state in `transform`.
pub trait Vectorizer: Send + Sync {
    /// Transform one document into the fitted feature space.
    fn transform(&self, text: &str) -> Result<FeatureVector>;

    /// Dimension of the produced feature space.
    fn feature_count(&self) -> usize;

    /// Short name for logging
    fn name(&self) -> &str;
}

/// Vector normalization applied after weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    #[default]
    L2,
    L1,
    None,
}

/// An explicit `null` norm means no normalization; an absent one means l2.
fn deserialize_norm<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Norm, D::Error> {
    Ok(Option::<Norm>::deserialize(deserializer)?.unwrap_or(Norm::None))
}

fn default_true() -> bool {
    true
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

/// Serialized TF-IDF vectorizer.
///
/// Tokenization follows the usual word pattern: maximal runs of alphanumeric
/// or `_` characters, at least two characters long. Stop words are dropped
/// before n-grams are formed; n-gram parts are joined with a single space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    /// Term -> column index
    pub vocabulary: HashMap<String, usize>,
    /// Inverse document frequency per column; absent means raw term frequency
    #[serde(default)]
    pub idf: Option<Vec<f64>>,
    #[serde(default = "default_true")]
    pub lowercase: bool,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default)]
    pub stop_words: HashSet<String>,
    #[serde(default, deserialize_with = "deserialize_norm")]
    pub norm: Norm,
    #[serde(default)]
    pub sublinear_tf: bool,
}

impl TfidfVectorizer {
    /// Create a vectorizer with default options over a vocabulary and idf weights.
    pub fn new(vocabulary: HashMap<String, usize>, idf: Option<Vec<f64>>) -> Self {
        Self {
            vocabulary,
            idf,
            lowercase: true,
            ngram_range: default_ngram_range(),
            stop_words: HashSet::new(),
            norm: Norm::L2,
            sublinear_tf: false,
        }
    }

    /// Split a document into analyzed terms (tokens and n-grams).
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        let tokens: Vec<&str> = text
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|t| t.chars().count() >= 2)
            .filter(|t| !self.stop_words.contains(*t))
            .collect();

        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::with_capacity(tokens.len());
        for n in min_n.max(1)..=max_n {
            if n > tokens.len() {
                break;
            }
            for window in tokens.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }
}

impl Vectorizer for TfidfVectorizer {
    fn transform(&self, text: &str) -> Result<FeatureVector> {
        let dim = self.feature_count();
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in self.analyze(text) {
            if let Some(&idx) = self.vocabulary.get(&term) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut weighted = Vec::with_capacity(counts.len());
        for (idx, mut tf) in counts {
            if self.sublinear_tf {
                tf = 1.0 + tf.ln();
            }
            let weight = match &self.idf {
                Some(idf) => {
                    let w = idf
                        .get(idx)
                        .with_context(|| format!("no idf weight for column {}", idx))?;
                    tf * w
                }
                None => tf,
            };
            weighted.push((idx, weight));
        }

        let scale = match self.norm {
            Norm::L2 => weighted.iter().map(|(_, w)| w * w).sum::<f64>().sqrt(),
            Norm::L1 => weighted.iter().map(|(_, w)| w.abs()).sum::<f64>(),
            Norm::None => 1.0,
        };
        let scale = if scale > 0.0 { scale } else { 1.0 };

        FeatureVector::new(
            dim,
            weighted
                .into_iter()
                .map(|(idx, w)| (idx, (w / scale) as f32)),
        )
    }

    fn feature_count(&self) -> usize {
        match &self.idf {
            Some(idf) => idf.len(),
            None => self.vocabulary.len(),
        }
    }

    fn name(&self) -> &str {
        "tfidf"
    }
}
