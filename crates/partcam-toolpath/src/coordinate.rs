//! Coordinate reference resolution
//!
//! Picks the machining origin from a configurable strategy and rewrites
//! every feature relative to it. Both functions are pure: `transform`
//! returns a new feature list and keeps each feature's original center for
//! traceability, so raw detector output stays auditable.

use partcam_core::{CoordinateReference, CoordinateStrategy, Feature, InputError};

/// Resolve the machining origin for a drawing
///
/// Extrema strategies select a feature by its bounding box and use that
/// feature's center as the origin; `Center`/`GeometricCenter` use the
/// unweighted centroid of all feature centers. `Custom` performs no
/// search. Fails with `NoFeatures` when the list is empty and a search is
/// required, and hard-fails on structurally invalid features.
pub fn resolve(
    features: &[Feature],
    strategy: CoordinateStrategy,
) -> Result<CoordinateReference, InputError> {
    if let CoordinateStrategy::Custom { x, y } = strategy {
        return Ok(CoordinateReference { x, y, strategy });
    }
    if features.is_empty() {
        return Err(InputError::NoFeatures);
    }
    for feature in features {
        feature.validate()?;
    }

    let point = match strategy {
        // Image coordinates grow downward, so "highest" = minimum y.
        CoordinateStrategy::HighestY => {
            select(features, |f| (f.bounding_box.y, f.bounding_box.x))
        }
        CoordinateStrategy::LowestY => {
            select(features, |f| (-f.bounding_box.bottom(), f.bounding_box.x))
        }
        CoordinateStrategy::LeftmostX => {
            select(features, |f| (f.bounding_box.x, f.bounding_box.y))
        }
        CoordinateStrategy::RightmostX => {
            select(features, |f| (-f.bounding_box.right(), f.bounding_box.y))
        }
        CoordinateStrategy::Center | CoordinateStrategy::GeometricCenter => centroid(features),
        CoordinateStrategy::Custom { .. } => unreachable!("handled above"),
    };

    Ok(CoordinateReference {
        x: point.0,
        y: point.1,
        strategy,
    })
}

/// Center of the feature minimizing the lexicographic selection key
fn select<K>(features: &[Feature], key: K) -> (f64, f64)
where
    K: Fn(&Feature) -> (f64, f64),
{
    let best = features
        .iter()
        .min_by(|a, b| {
            let (ka, kb) = (key(a), key(b));
            ka.0.total_cmp(&kb.0).then(ka.1.total_cmp(&kb.1))
        })
        .unwrap_or(&features[0]);
    best.center
}

fn centroid(features: &[Feature]) -> (f64, f64) {
    let n = features.len() as f64;
    let sum = features
        .iter()
        .fold((0.0, 0.0), |acc, f| (acc.0 + f.center.0, acc.1 + f.center.1));
    (sum.0 / n, sum.1 / n)
}

/// Rewrite every feature relative to the reference point
///
/// Produces a new list; the untransformed center is retained as
/// `original_center` the first time a feature passes through, which makes
/// repeated transforms against the zero reference idempotent.
pub fn transform(features: &[Feature], reference: &CoordinateReference) -> Vec<Feature> {
    features
        .iter()
        .map(|feature| {
            let mut moved = feature.clone();
            if moved.original_center.is_none() {
                moved.original_center = Some(feature.center);
            }
            moved.center = (
                feature.center.0 - reference.x,
                feature.center.1 - reference.y,
            );
            moved.bounding_box.x -= reference.x;
            moved.bounding_box.y -= reference.y;
            moved
        })
        .collect()
}
