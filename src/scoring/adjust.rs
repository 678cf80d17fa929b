use super::accumulate::Tally;

// Structural corrections for archetype (tag-vector) scoring. These are
// properties of the scoring domain, not user-configurable rules, and run in
// a fixed order: each step reads the output of the previous one.

/// Tags that reinforce each other when both present.
const SYNERGY_PAIR: (&str, &str) = ("creativity", "experimentation");
const SYNERGY_FACTOR: f64 = 1.10;

/// Tags that dampen each other when both present.
const CONFLICT_PAIR: (&str, &str) = ("stability", "novelty");
const CONFLICT_FACTOR: f64 = 0.92;

/// A high boundary tally feeds a logarithmic bonus into planning.
const GOVERNOR_SOURCE: &str = "boundary";
const GOVERNOR_TARGET: &str = "planning";
const GOVERNOR_THRESHOLD: f64 = 2.0;
const GOVERNOR_GAIN: f64 = 0.2;

/// Above this ceiling a tally grows only logarithmically, so no single tag
/// can dominate the projection.
const SATURATION_CEILING: f64 = 4.0;

/// Apply the fixed corrections in order: synergy, conflict, governor,
/// saturation.
pub fn apply_structural(tally: &Tally) -> Tally {
    let mut adjusted = tally.clone();
    apply_pair(&mut adjusted, SYNERGY_PAIR, SYNERGY_FACTOR);
    apply_pair(&mut adjusted, CONFLICT_PAIR, CONFLICT_FACTOR);
    apply_governor(&mut adjusted);
    apply_saturation(&mut adjusted);
    adjusted
}

/// Multiply both buckets of a pair by `factor` when both are present (> 0).
fn apply_pair(tally: &mut Tally, pair: (&str, &str), factor: f64) {
    if tally.get(pair.0) > 0.0 && tally.get(pair.1) > 0.0 {
        scale_bucket(tally, pair.0, factor);
        scale_bucket(tally, pair.1, factor);
    }
}

fn scale_bucket(tally: &mut Tally, bucket: &str, factor: f64) {
    if let Some(value) = tally.buckets.get_mut(bucket) {
        *value *= factor;
    }
}

fn apply_governor(tally: &mut Tally) {
    let source = tally.get(GOVERNOR_SOURCE);
    if source > GOVERNOR_THRESHOLD {
        // Dropped if the target bucket is undeclared, like any other
        // unresolved reference.
        tally.add(GOVERNOR_TARGET, GOVERNOR_GAIN * (1.0 + source).ln());
    }
}

fn apply_saturation(tally: &mut Tally) {
    for value in tally.buckets.values_mut() {
        if *value > SATURATION_CEILING {
            *value = SATURATION_CEILING + (1.0 + (*value - SATURATION_CEILING)).ln();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally_of(pairs: &[(&str, f64)]) -> Tally {
        let names: Vec<String> = pairs.iter().map(|(k, _)| k.to_string()).collect();
        let mut tally = Tally::new(&names);
        for (k, v) in pairs {
            tally.add(k, *v);
        }
        tally
    }

    #[test]
    fn test_synergy_boosts_both() {
        let tally = tally_of(&[("creativity", 2.0), ("experimentation", 1.0)]);
        let adjusted = apply_structural(&tally);
        assert!((adjusted.get("creativity") - 2.2).abs() < 1e-9);
        assert!((adjusted.get("experimentation") - 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_synergy_needs_both_present() {
        let tally = tally_of(&[("creativity", 2.0), ("experimentation", 0.0)]);
        let adjusted = apply_structural(&tally);
        assert_eq!(adjusted.get("creativity"), 2.0);
    }

    #[test]
    fn test_conflict_dampens_both() {
        let tally = tally_of(&[("stability", 1.0), ("novelty", 2.0)]);
        let adjusted = apply_structural(&tally);
        assert!((adjusted.get("stability") - 0.92).abs() < 1e-9);
        assert!((adjusted.get("novelty") - 1.84).abs() < 1e-9);
    }

    #[test]
    fn test_governor_bonus_above_threshold() {
        let tally = tally_of(&[("boundary", 3.0), ("planning", 1.0)]);
        let adjusted = apply_structural(&tally);
        let expected = 1.0 + 0.2 * (4.0_f64).ln();
        assert!((adjusted.get("planning") - expected).abs() < 1e-9);

        // At the threshold exactly, no bonus
        let tally = tally_of(&[("boundary", 2.0), ("planning", 1.0)]);
        let adjusted = apply_structural(&tally);
        assert_eq!(adjusted.get("planning"), 1.0);
    }

    #[test]
    fn test_governor_target_must_be_declared() {
        let tally = tally_of(&[("boundary", 3.0)]);
        let adjusted = apply_structural(&tally);
        assert!(!adjusted.buckets.contains_key("planning"));
    }

    #[test]
    fn test_saturation_monotone_but_sublinear() {
        let low = apply_structural(&tally_of(&[("care", 5.0)]));
        let high = apply_structural(&tally_of(&[("care", 8.0)]));

        let s1 = low.get("care");
        let s2 = high.get("care");
        assert!(s1 > 4.0 && s2 > 4.0);
        assert!(s2 > s1);
        assert!(s2 - s1 < 8.0 - 5.0);
        // Exact form: C + ln(1 + (v - C))
        assert!((s1 - (4.0 + 2.0_f64.ln())).abs() < 1e-9);
    }

    #[test]
    fn test_saturation_leaves_values_below_ceiling() {
        let adjusted = apply_structural(&tally_of(&[("care", 4.0)]));
        assert_eq!(adjusted.get("care"), 4.0);
    }

    #[test]
    fn test_order_synergy_feeds_saturation() {
        // creativity 3.8 with synergy -> 4.18, which then saturates.
        let tally = tally_of(&[("creativity", 3.8), ("experimentation", 1.0)]);
        let adjusted = apply_structural(&tally);
        let boosted = 3.8_f64 * 1.10;
        let expected = 4.0 + (1.0 + (boosted - 4.0)).ln();
        assert!((adjusted.get("creativity") - expected).abs() < 1e-9);
    }
}
