//! Feature model
//!
//! Canonical in-memory representation of a geometric primitive detected on
//! a part drawing. Features arrive from an external CV detector as plain
//! records; this module gives them a strongly typed shape so that missing
//! fields become compile-time errors rather than runtime surprises.
//!
//! Features are never mutated in place and never deleted: the coordinate
//! transform produces a new list, and counterbore composition marks its
//! source circles `consumed` so the raw detections stay auditable.

use crate::error::InputError;
use serde::{Deserialize, Serialize};

/// Feature identifier
///
/// Assigned by the caller in detection order. Every deterministic sort in
/// the compiler (pairing, grouping, batch order) keys off this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FeatureId(
    /// The numeric id, unique within one drawing.
    pub u32,
);

impl std::fmt::Display for FeatureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "F{}", self.0)
    }
}

/// Axis-aligned bounding box in drawing space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge.
    pub x: f64,
    /// Top edge (image coordinates grow downward).
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl BoundingBox {
    /// Bounding box around a center point
    pub fn around(center: (f64, f64), width: f64, height: f64) -> Self {
        Self {
            x: center.0 - width / 2.0,
            y: center.1 - height / 2.0,
            width,
            height,
        }
    }

    /// Bottom edge y
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Right edge x
    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}

/// Shape-specific data of a feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    /// Circular hole
    Circle {
        /// Radius in drawing units.
        radius: f64,
        /// Circularity metric from the detector, 1.0 = perfect circle.
        circularity: f64,
    },
    /// Rectangular pocket
    Rectangle,
    /// Square pocket
    Square,
    /// General polygon pocket
    Polygon,
    /// Triangular pocket
    Triangle,
    /// Elliptical pocket
    Ellipse,
    /// Two-diameter hole synthesized from a pair of concentric circles.
    /// Never produced by detection, only by the compositor.
    Counterbore {
        /// Diameter of the wide shallow recess.
        outer_diameter: f64,
        /// Diameter of the through-hole.
        inner_diameter: f64,
        /// Drawing depth of the through-hole.
        depth: f64,
    },
}

/// Shape classification, used for parameter signatures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureKind {
    Circle,
    Rectangle,
    Square,
    Polygon,
    Triangle,
    Ellipse,
    Counterbore,
}

impl std::fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Circle => write!(f, "circle"),
            Self::Rectangle => write!(f, "rectangle"),
            Self::Square => write!(f, "square"),
            Self::Polygon => write!(f, "polygon"),
            Self::Triangle => write!(f, "triangle"),
            Self::Ellipse => write!(f, "ellipse"),
            Self::Counterbore => write!(f, "counterbore"),
        }
    }
}

/// A detected (or composed) geometric feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Unique id within the drawing.
    pub id: FeatureId,
    /// Shape tag and shape-specific data.
    pub shape: Shape,
    /// Center point in drawing units.
    pub center: (f64, f64),
    /// Width/height of the shape.
    pub dimensions: (f64, f64),
    /// Area in drawing units squared.
    pub area: f64,
    /// Detector confidence in [0, 1].
    pub confidence: f64,
    /// Axis-aligned bounding box.
    pub bounding_box: BoundingBox,
    /// Center before the coordinate transform, for traceability.
    #[serde(default)]
    pub original_center: Option<(f64, f64)>,
    /// Set when a circle has been merged into a counterbore. Consumed
    /// features are kept for auditing but skipped by later stages.
    #[serde(default)]
    pub consumed: bool,
}

impl Feature {
    /// Create a circle feature from detector output
    pub fn circle(id: u32, center: (f64, f64), radius: f64, circularity: f64) -> Self {
        let diameter = radius * 2.0;
        Self {
            id: FeatureId(id),
            shape: Shape::Circle {
                radius,
                circularity,
            },
            center,
            dimensions: (diameter, diameter),
            area: std::f64::consts::PI * radius * radius,
            confidence: 1.0,
            bounding_box: BoundingBox::around(center, diameter, diameter),
            original_center: None,
            consumed: false,
        }
    }

    /// Create a non-circular feature from detector output
    pub fn shape(id: u32, shape: Shape, center: (f64, f64), dimensions: (f64, f64)) -> Self {
        Self {
            id: FeatureId(id),
            shape,
            center,
            dimensions,
            area: dimensions.0 * dimensions.1,
            confidence: 1.0,
            bounding_box: BoundingBox::around(center, dimensions.0, dimensions.1),
            original_center: None,
            consumed: false,
        }
    }

    /// Set the detector confidence
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Set the area reported by the detector
    pub fn with_area(mut self, area: f64) -> Self {
        self.area = area;
        self
    }

    /// Shape classification of this feature
    pub fn kind(&self) -> FeatureKind {
        match self.shape {
            Shape::Circle { .. } => FeatureKind::Circle,
            Shape::Rectangle => FeatureKind::Rectangle,
            Shape::Square => FeatureKind::Square,
            Shape::Polygon => FeatureKind::Polygon,
            Shape::Triangle => FeatureKind::Triangle,
            Shape::Ellipse => FeatureKind::Ellipse,
            Shape::Counterbore { .. } => FeatureKind::Counterbore,
        }
    }

    /// True for circle features
    pub fn is_circle(&self) -> bool {
        matches!(self.shape, Shape::Circle { .. })
    }

    /// Radius if this is a circle
    pub fn circle_radius(&self) -> Option<f64> {
        match self.shape {
            Shape::Circle { radius, .. } => Some(radius),
            _ => None,
        }
    }

    /// True when the feature still participates in machining
    pub fn is_active(&self) -> bool {
        !self.consumed
    }

    /// Center distance to another feature
    pub fn distance_to(&self, other: &Feature) -> f64 {
        let dx = self.center.0 - other.center.0;
        let dy = self.center.1 - other.center.1;
        (dx * dx + dy * dy).sqrt()
    }

    /// Check structural invariants
    ///
    /// Non-finite coordinates and impossible geometry are hard input
    /// errors; everything softer is left to confidence annotations.
    pub fn validate(&self) -> Result<(), InputError> {
        let values = [
            self.center.0,
            self.center.1,
            self.dimensions.0,
            self.dimensions.1,
            self.area,
            self.bounding_box.x,
            self.bounding_box.y,
            self.bounding_box.width,
            self.bounding_box.height,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(InputError::NonFiniteCoordinate { feature: self.id });
        }
        match self.shape {
            Shape::Circle { radius, .. } => {
                if !radius.is_finite() || radius <= 0.0 {
                    return Err(InputError::InvalidDimension {
                        feature: self.id,
                        name: "radius",
                        value: radius,
                    });
                }
            }
            Shape::Counterbore {
                outer_diameter,
                inner_diameter,
                depth,
            } => {
                if !(outer_diameter.is_finite() && inner_diameter.is_finite() && depth.is_finite())
                {
                    return Err(InputError::NonFiniteCoordinate { feature: self.id });
                }
                if !(outer_diameter > inner_diameter && inner_diameter > 0.0) {
                    return Err(InputError::InvalidCounterbore { feature: self.id });
                }
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_constructor() {
        let f = Feature::circle(1, (10.0, 20.0), 5.0, 0.97);
        assert_eq!(f.id.to_string(), "F1");
        assert_eq!(f.dimensions, (10.0, 10.0));
        assert_eq!(f.bounding_box.x, 5.0);
        assert_eq!(f.bounding_box.y, 15.0);
        assert!(f.is_circle());
        assert_eq!(f.circle_radius(), Some(5.0));
        assert!(f.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        let f = Feature::circle(2, (f64::NAN, 0.0), 5.0, 1.0);
        assert_eq!(
            f.validate(),
            Err(InputError::NonFiniteCoordinate {
                feature: FeatureId(2)
            })
        );
    }

    #[test]
    fn test_validate_rejects_negative_radius() {
        let mut f = Feature::circle(3, (0.0, 0.0), 5.0, 1.0);
        f.shape = Shape::Circle {
            radius: -1.0,
            circularity: 1.0,
        };
        assert!(matches!(
            f.validate(),
            Err(InputError::InvalidDimension { name: "radius", .. })
        ));
    }

    #[test]
    fn test_validate_counterbore_invariant() {
        let mut f = Feature::shape(4, Shape::Rectangle, (0.0, 0.0), (10.0, 5.0));
        f.shape = Shape::Counterbore {
            outer_diameter: 10.0,
            inner_diameter: 12.0,
            depth: 14.0,
        };
        assert_eq!(
            f.validate(),
            Err(InputError::InvalidCounterbore {
                feature: FeatureId(4)
            })
        );
    }

    #[test]
    fn test_kind_display() {
        let f = Feature::shape(5, Shape::Ellipse, (0.0, 0.0), (4.0, 2.0));
        assert_eq!(f.kind().to_string(), "ellipse");
        assert!(f.is_active());
    }
}
