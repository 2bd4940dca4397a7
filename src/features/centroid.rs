use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

const COSINE_SHARE: f64 = 0.6;
const JACCARD_SHARE: f64 = 0.4;

/// Weighted token-frequency vector describing a cluster's vocabulary.
///
/// Updates are additive and return a new value; a centroid is never
/// mutated through a shared reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenCentroid {
    pub weights: HashMap<String, f64>,
    pub total_weight: f64,
}

impl TokenCentroid {
    /// Builds a centroid from token lists. `list_weights[i]` applies to every
    /// occurrence in `token_lists[i]`; missing entries default to 1.0.
    pub fn create(token_lists: &[Vec<String>], list_weights: Option<&[f64]>) -> Self {
        token_lists
            .iter()
            .enumerate()
            .fold(Self::default(), |centroid, (idx, tokens)| {
                let weight = list_weights
                    .and_then(|weights| weights.get(idx).copied())
                    .unwrap_or(1.0);
                centroid.update(tokens, weight)
            })
    }

    pub fn update(&self, tokens: &[String], weight: f64) -> Self {
        let weight = weight.max(0.0);
        let mut next = self.clone();
        for token in tokens {
            *next.weights.entry(token.clone()).or_insert(0.0) += weight;
        }
        next.total_weight += weight * tokens.len() as f64;
        next
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn weight_of(&self, token: &str) -> f64 {
        self.weights.get(token).copied().unwrap_or(0.0)
    }

    /// Cosine between the centroid weights and a unit vector over the
    /// distinct incoming tokens.
    pub fn cosine_similarity(&self, tokens: &[String]) -> f64 {
        let incoming = unique(tokens);
        if self.is_empty() || incoming.is_empty() {
            return 0.0;
        }

        let dot: f64 = incoming.iter().map(|token| self.weight_of(token)).sum();
        let centroid_norm = self.weights.values().map(|w| w * w).sum::<f64>().sqrt();
        let incoming_norm = (incoming.len() as f64).sqrt();
        if centroid_norm == 0.0 {
            return 0.0;
        }

        (dot / (centroid_norm * incoming_norm)).clamp(0.0, 1.0)
    }

    /// Set overlap between the centroid's keys and the incoming tokens.
    pub fn jaccard_similarity(&self, tokens: &[String]) -> f64 {
        let incoming = unique(tokens);
        if self.is_empty() || incoming.is_empty() {
            return 0.0;
        }

        let intersection = incoming
            .iter()
            .filter(|token| self.weights.contains_key(**token))
            .count();
        let union = self.weights.len() + incoming.len() - intersection;
        intersection as f64 / union as f64
    }

    pub fn weighted_similarity(&self, tokens: &[String]) -> f64 {
        COSINE_SHARE * self.cosine_similarity(tokens) + JACCARD_SHARE * self.jaccard_similarity(tokens)
    }
}

fn unique(tokens: &[String]) -> HashSet<&str> {
    tokens.iter().map(String::as_str).collect()
}
