//! Feature grouper
//!
//! Partitions active features into batches sharing one parameter
//! signature, so the compiler emits one canned cycle per batch instead of
//! one per feature. Purely structural; batch order is first-seen order.

use partcam_core::{Feature, FeatureKind, Shape};
use std::collections::HashMap;

/// Machining-relevant parameters of a feature, rounded for exact equality
///
/// Values are stored as tenths of a unit (`i64`) so `Eq` and `Hash` hold
/// exactly: two features share a cycle when every parameter matches to
/// one decimal place.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterSignature {
    kind: FeatureKind,
    tenths: Vec<i64>,
}

impl ParameterSignature {
    /// Signature of a feature
    pub fn of(feature: &Feature) -> Self {
        let tenths = match feature.shape {
            Shape::Circle { radius, .. } => vec![to_tenths(radius * 2.0)],
            Shape::Counterbore {
                outer_diameter,
                inner_diameter,
                depth,
            } => vec![
                to_tenths(outer_diameter),
                to_tenths(inner_diameter),
                to_tenths(depth),
            ],
            _ => vec![
                to_tenths(feature.dimensions.0),
                to_tenths(feature.dimensions.1),
            ],
        };
        Self {
            kind: feature.kind(),
            tenths,
        }
    }

    /// Shape classification shared by every feature in the batch
    pub fn kind(&self) -> FeatureKind {
        self.kind
    }
}

fn to_tenths(value: f64) -> i64 {
    (value * 10.0).round() as i64
}

/// A non-empty run of features sharing one parameter signature
#[derive(Debug, Clone)]
pub struct FeatureBatch {
    /// The shared signature.
    pub signature: ParameterSignature,
    /// Member features, in input order.
    pub features: Vec<Feature>,
}

impl FeatureBatch {
    /// Number of features in the batch
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Always false; batches are non-empty by construction
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Partition active features into parameter-signature batches
///
/// Consumed features are skipped; every active feature lands in exactly
/// one batch, and batches appear in the order their signature was first
/// seen.
pub fn group(features: &[Feature]) -> Vec<FeatureBatch> {
    let mut batches: Vec<FeatureBatch> = Vec::new();
    let mut index: HashMap<ParameterSignature, usize> = HashMap::new();

    for feature in features.iter().filter(|f| f.is_active()) {
        let signature = ParameterSignature::of(feature);
        match index.get(&signature) {
            Some(&at) => batches[at].features.push(feature.clone()),
            None => {
                index.insert(signature.clone(), batches.len());
                batches.push(FeatureBatch {
                    signature,
                    features: vec![feature.clone()],
                });
            }
        }
    }

    tracing::debug!(
        features = features.len(),
        batches = batches.len(),
        "grouped features by parameter signature"
    );
    batches
}
