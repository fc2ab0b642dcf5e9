//! Coordinate reference types
//!
//! The strategy enum and the resolved reference point live here so the
//! compiler configuration can embed a strategy; the resolution and
//! transform logic lives in the toolpath crate.

use serde::{Deserialize, Serialize};

/// Strategy for choosing the machining origin of a drawing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum CoordinateStrategy {
    /// Feature whose bounding-box top edge has the smallest y
    /// (image coordinates grow downward). Ties broken by smallest x.
    HighestY,
    /// Feature whose bounding-box bottom edge has the largest y.
    LowestY,
    /// Feature whose bounding-box left edge has the smallest x.
    LeftmostX,
    /// Feature whose bounding-box right edge has the largest x.
    RightmostX,
    /// Unweighted centroid of all feature centers.
    Center,
    /// Alias of `Center`; kept as a distinct value for the external
    /// configuration contract.
    GeometricCenter,
    /// Caller-supplied explicit origin; no search is performed.
    Custom { x: f64, y: f64 },
}

impl std::fmt::Display for CoordinateStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HighestY => write!(f, "highest_y"),
            Self::LowestY => write!(f, "lowest_y"),
            Self::LeftmostX => write!(f, "leftmost_x"),
            Self::RightmostX => write!(f, "rightmost_x"),
            Self::Center => write!(f, "center"),
            Self::GeometricCenter => write!(f, "geometric_center"),
            Self::Custom { x, y } => write!(f, "custom({x}, {y})"),
        }
    }
}

/// Machining origin of a drawing
///
/// Immutable once computed; the toolpath crate rewrites every feature
/// relative to this point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateReference {
    /// Origin x in drawing units.
    pub x: f64,
    /// Origin y in drawing units.
    pub y: f64,
    /// The strategy that produced this reference.
    pub strategy: CoordinateStrategy,
}

impl CoordinateReference {
    /// Reference at the drawing origin
    pub fn origin() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            strategy: CoordinateStrategy::Custom { x: 0.0, y: 0.0 },
        }
    }

    /// The reference point as a tuple
    pub fn point(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_display() {
        assert_eq!(CoordinateStrategy::HighestY.to_string(), "highest_y");
        assert_eq!(
            CoordinateStrategy::Custom { x: 1.0, y: 2.0 }.to_string(),
            "custom(1, 2)"
        );
    }

    #[test]
    fn test_strategy_serde_round_trip() {
        let json = serde_json::to_string(&CoordinateStrategy::HighestY).unwrap();
        assert_eq!(json, r#"{"strategy":"highest_y"}"#);
        let back: CoordinateStrategy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, CoordinateStrategy::HighestY);

        let custom = CoordinateStrategy::Custom { x: 3.0, y: -4.5 };
        let json = serde_json::to_string(&custom).unwrap();
        let back: CoordinateStrategy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, custom);
    }

    #[test]
    fn test_origin() {
        let r = CoordinateReference::origin();
        assert_eq!(r.point(), (0.0, 0.0));
    }
}
