use super::accumulate::Tally;
use crate::config::{Archetype, ScoreRange};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Floor for the normalization denominator, so an all-zero projection
/// rescales to zeros instead of dividing by zero.
const MAX_SCORE_FLOOR: f64 = 1e-4;

/// Profile mode: clamp every bucket to the configured range, then rescale
/// linearly to 0..100 integers.
pub fn profile(tally: &Tally, range: ScoreRange) -> BTreeMap<String, i64> {
    tally
        .buckets
        .iter()
        .map(|(name, value)| {
            let clamped = value.clamp(range.min, range.max);
            let scaled = (clamped - range.min) / (range.max - range.min) * 100.0;
            (name.clone(), scaled.round() as i64)
        })
        .collect()
}

/// One ranked classification entry.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ArchetypeScore {
    pub key: String,
    pub name: String,
    /// 0..100 relative to the best-scoring archetype.
    pub score: i64,
}

/// Archetype mode: project the bucket space through each archetype's weight
/// vector, rescale against the best raw score, and rank descending.
///
/// The sort is stable, so archetypes with equal rescaled scores keep their
/// declaration order.
pub fn rank(archetypes: &[Archetype], tally: &Tally) -> Vec<ArchetypeScore> {
    let raw: Vec<f64> = archetypes
        .iter()
        .map(|archetype| {
            archetype
                .vector
                .iter()
                .map(|(tag, weight)| weight * tally.get(tag))
                .sum()
        })
        .collect();

    let max = raw.iter().copied().fold(MAX_SCORE_FLOOR, f64::max);

    let mut ranked: Vec<ArchetypeScore> = archetypes
        .iter()
        .zip(&raw)
        .map(|(archetype, raw_score)| ArchetypeScore {
            key: archetype.key.clone(),
            name: archetype.display_name().to_string(),
            score: (raw_score / max * 100.0).round() as i64,
        })
        .collect();

    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}
