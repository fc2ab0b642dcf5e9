//! Composite feature compositor
//!
//! Merges pairs of concentric circles into counterbore features. A
//! counterbore on a drawing appears as two circles with (nearly) the same
//! center whose radius ratio falls in a configured band; the through-hole
//! depth comes from the processing requirement, never from geometry.
//!
//! Source circles are marked consumed rather than removed, and the merge
//! order is fully deterministic: candidate pairs are enumerated in
//! feature-id order and taken greedily by smallest center distance.

use partcam_core::{CompilerConfig, Feature, FeatureId, ProcessingRequirement, Shape};
use std::collections::HashSet;

/// Warning attached to a circle left ambiguous by composition
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionWarning {
    /// The circle that could not be merged cleanly.
    pub feature: FeatureId,
    /// Human-readable description.
    pub message: String,
}

/// Result of one composition pass
#[derive(Debug, Clone)]
pub struct CompositionOutcome {
    /// All input features (merged circles marked consumed) followed by the
    /// synthesized counterbores.
    pub features: Vec<Feature>,
    /// Ambiguity warnings, one per penalized circle.
    pub warnings: Vec<CompositionWarning>,
}

/// Merge concentric circle pairs into counterbores
pub fn compose(
    features: &[Feature],
    requirement: &ProcessingRequirement,
    config: &CompilerConfig,
) -> CompositionOutcome {
    // Active circles in id order; ids drive every deterministic choice.
    let mut circles: Vec<usize> = features
        .iter()
        .enumerate()
        .filter(|(_, f)| f.is_active() && f.is_circle())
        .map(|(i, _)| i)
        .collect();
    circles.sort_by_key(|&i| features[i].id);

    let mut candidates = Vec::new();
    for (a, &i) in circles.iter().enumerate() {
        for &j in &circles[a + 1..] {
            let (fa, fb) = (&features[i], &features[j]);
            let distance = fa.distance_to(fb);
            if distance >= config.duplicate_distance_threshold {
                continue;
            }
            let (ra, rb) = (
                fa.circle_radius().unwrap_or(0.0),
                fb.circle_radius().unwrap_or(0.0),
            );
            let ratio = ra.max(rb) / ra.min(rb).max(f64::EPSILON);
            if ratio < config.radius_ratio_min || ratio > config.radius_ratio_max {
                continue;
            }
            candidates.push((distance, i, j));
        }
    }
    candidates.sort_by(|a, b| {
        a.0.total_cmp(&b.0)
            .then_with(|| features[a.1].id.cmp(&features[b.1].id))
            .then_with(|| features[a.2].id.cmp(&features[b.2].id))
    });

    // Greedy by distance: each circle merges at most once, so in a nested
    // triple only the closest valid pair fuses.
    let mut merged: HashSet<usize> = HashSet::new();
    let mut pairs = Vec::new();
    for &(_, i, j) in &candidates {
        if merged.contains(&i) || merged.contains(&j) {
            continue;
        }
        merged.insert(i);
        merged.insert(j);
        pairs.push((i, j));
    }

    let mut result: Vec<Feature> = features.to_vec();
    let mut warnings = Vec::new();

    // Leftover circles crowding a merged pair are ambiguous detections.
    for &i in &circles {
        if merged.contains(&i) {
            continue;
        }
        let crowded = merged
            .iter()
            .any(|&m| features[i].distance_to(&features[m]) < config.duplicate_distance_threshold);
        if crowded {
            result[i].confidence *= 0.8;
            let id = result[i].id;
            tracing::warn!(feature = %id, "ambiguous circle near a merged counterbore pair");
            warnings.push(CompositionWarning {
                feature: id,
                message: format!("{id} overlaps a merged counterbore pair; confidence reduced"),
            });
        }
    }

    let mut next_id = features.iter().map(|f| f.id.0).max().unwrap_or(0) + 1;
    let depth = requirement.depth.unwrap_or(config.default_depth);
    for &(i, j) in &pairs {
        result[i].consumed = true;
        result[j].consumed = true;
        let (outer, inner) = if features[i].circle_radius() >= features[j].circle_radius() {
            (&features[i], &features[j])
        } else {
            (&features[j], &features[i])
        };
        let outer_radius = outer.circle_radius().unwrap_or(0.0);
        let inner_radius = inner.circle_radius().unwrap_or(0.0);
        let outer_diameter = outer_radius * 2.0;
        let mut counterbore = Feature::shape(
            next_id,
            Shape::Counterbore {
                outer_diameter,
                inner_diameter: inner_radius * 2.0,
                depth,
            },
            outer.center,
            (outer_diameter, outer_diameter),
        )
        .with_area(std::f64::consts::PI * outer_radius * outer_radius)
        .with_confidence(outer.confidence.min(inner.confidence));
        counterbore.original_center = outer.original_center;
        result.push(counterbore);
        next_id += 1;
    }

    tracing::debug!(
        input = features.len(),
        counterbores = pairs.len(),
        ambiguous = warnings.len(),
        "composition pass complete"
    );
    CompositionOutcome {
        features: result,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use partcam_core::{ProcessingRequirement, ProcessingType};

    fn requirement() -> ProcessingRequirement {
        ProcessingRequirement::new(ProcessingType::Counterbore).with_depth(10.0)
    }

    #[test]
    fn test_concentric_pair_becomes_counterbore() {
        let features = vec![
            Feature::circle(1, (10.0, 10.0), 11.0, 1.0),
            Feature::circle(2, (10.0, 10.1), 7.25, 1.0),
        ];
        let outcome = compose(&features, &requirement(), &CompilerConfig::default());

        assert_eq!(outcome.features.len(), 3);
        assert!(outcome.features[0].consumed);
        assert!(outcome.features[1].consumed);
        let cb = &outcome.features[2];
        assert_eq!(cb.id, FeatureId(3));
        assert_eq!(cb.center, (10.0, 10.0));
        match cb.shape {
            Shape::Counterbore {
                outer_diameter,
                inner_diameter,
                depth,
            } => {
                assert_eq!(outer_diameter, 22.0);
                assert_eq!(inner_diameter, 14.5);
                assert_eq!(depth, 10.0);
            }
            _ => panic!("expected counterbore"),
        }
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_distant_circles_pass_through() {
        let features = vec![
            Feature::circle(1, (0.0, 0.0), 11.0, 1.0),
            Feature::circle(2, (50.0, 0.0), 7.25, 1.0),
        ];
        let outcome = compose(&features, &requirement(), &CompilerConfig::default());
        assert_eq!(outcome.features.len(), 2);
        assert!(outcome.features.iter().all(|f| f.is_active()));
    }

    #[test]
    fn test_ratio_outside_band_not_merged() {
        // ratio 1.05, below the 1.2 minimum: duplicate detection, not a
        // counterbore
        let features = vec![
            Feature::circle(1, (0.0, 0.0), 10.0, 1.0),
            Feature::circle(2, (0.1, 0.0), 9.5, 1.0),
        ];
        let outcome = compose(&features, &requirement(), &CompilerConfig::default());
        assert_eq!(outcome.features.len(), 2);
        assert!(outcome.features.iter().all(|f| f.is_active()));
    }

    #[test]
    fn test_nested_triple_merges_closest_pair_and_penalizes_leftover() {
        let features = vec![
            Feature::circle(1, (0.0, 0.0), 11.0, 1.0),
            Feature::circle(2, (0.0, 0.1), 7.25, 1.0),
            Feature::circle(3, (0.5, 0.0), 5.0, 1.0),
        ];
        let outcome = compose(&features, &requirement(), &CompilerConfig::default());

        let counterbores: Vec<_> = outcome
            .features
            .iter()
            .filter(|f| matches!(f.shape, Shape::Counterbore { .. }))
            .collect();
        assert_eq!(counterbores.len(), 1);

        let leftover = &outcome.features[2];
        assert!(leftover.is_active());
        assert!((leftover.confidence - 0.8).abs() < 1e-9);
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].feature, FeatureId(3));
    }

    #[test]
    fn test_composition_is_deterministic() {
        let features = vec![
            Feature::circle(1, (10.0, 10.0), 11.0, 1.0),
            Feature::circle(2, (10.0, 10.1), 7.25, 1.0),
            Feature::circle(3, (60.0, 30.0), 11.0, 1.0),
            Feature::circle(4, (60.0, 30.2), 7.25, 1.0),
        ];
        let config = CompilerConfig::default();
        let first = compose(&features, &requirement(), &config);
        let second = compose(&features, &requirement(), &config);
        assert_eq!(first.features, second.features);
    }

    #[test]
    fn test_depth_defaults_when_requirement_silent() {
        let features = vec![
            Feature::circle(1, (0.0, 0.0), 11.0, 1.0),
            Feature::circle(2, (0.0, 0.1), 7.25, 1.0),
        ];
        let req = ProcessingRequirement::new(ProcessingType::Counterbore);
        let outcome = compose(&features, &req, &CompilerConfig::default());
        match outcome.features[2].shape {
            Shape::Counterbore { depth, .. } => assert_eq!(depth, 14.0),
            _ => panic!("expected counterbore"),
        }
    }
}
