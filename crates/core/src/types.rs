use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Annotation ink: opaque red.
pub const STROKE_COLOR: [u8; 4] = [255, 0, 0, 255];

/// Annotation nib width in image pixels.
pub const STROKE_WIDTH: f32 = 2.0;

/// A 2-D coordinate in image-pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One finished freehand pointer drag, recorded in image-pixel space.
///
/// Color and width are fixed constants today but travel with the stroke
/// so stored scripts stay forward-compatible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub points: Vec<Point>,
    pub color: [u8; 4],
    pub width: f32,
}

impl Stroke {
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            color: STROKE_COLOR,
            width: STROKE_WIDTH,
        }
    }

    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    /// A stroke needs at least two points to mark anything.
    pub fn is_drawable(&self) -> bool {
        self.points.len() >= 2
    }
}

impl Default for Stroke {
    fn default() -> Self {
        Self::new()
    }
}

/// Three-level condition outcome, plus the `Drawing` sentinel the
/// assessment service returns when an image is itself a red drawing
/// rather than a photographed component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionGrade {
    Poor,
    Fair,
    Good,
    Drawing,
}

impl ConditionGrade {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionGrade::Poor => "Poor",
            ConditionGrade::Fair => "Fair",
            ConditionGrade::Good => "Good",
            ConditionGrade::Drawing => "DRAWING",
        }
    }

    /// Ordered rank of the grade (1 = Poor, 3 = Good).
    /// `None` for the sentinel, which is not part of the scale.
    pub fn rank(&self) -> Option<u8> {
        match self {
            ConditionGrade::Poor => Some(1),
            ConditionGrade::Fair => Some(2),
            ConditionGrade::Good => Some(3),
            ConditionGrade::Drawing => None,
        }
    }

    fn from_rank(rank: u64) -> Option<Self> {
        match rank {
            1 => Some(ConditionGrade::Poor),
            2 => Some(ConditionGrade::Fair),
            3 => Some(ConditionGrade::Good),
            _ => None,
        }
    }
}

impl fmt::Display for ConditionGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ConditionGrade {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Accepts both encodings seen on the wire: the string form
/// ("Poor"/"Fair"/"Good"/"DRAWING", any case) and the numeric form (1/2/3).
impl<'de> Deserialize<'de> for ConditionGrade {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct GradeVisitor;

        impl<'de> Visitor<'de> for GradeVisitor {
            type Value = ConditionGrade;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a condition grade string or its numeric rank")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                match value.to_ascii_lowercase().as_str() {
                    "poor" => Ok(ConditionGrade::Poor),
                    "fair" => Ok(ConditionGrade::Fair),
                    "good" => Ok(ConditionGrade::Good),
                    "drawing" => Ok(ConditionGrade::Drawing),
                    other => Err(E::unknown_variant(
                        other,
                        &["Poor", "Fair", "Good", "DRAWING"],
                    )),
                }
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
                ConditionGrade::from_rank(value)
                    .ok_or_else(|| E::custom(format!("condition rank {} out of range", value)))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
                u64::try_from(value)
                    .ok()
                    .and_then(ConditionGrade::from_rank)
                    .ok_or_else(|| E::custom(format!("condition rank {} out of range", value)))
            }

            fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
                if value.fract() == 0.0 && value >= 1.0 && value <= 3.0 {
                    self.visit_u64(value as u64)
                } else {
                    Err(E::custom(format!("condition rank {} out of range", value)))
                }
            }
        }

        deserializer.deserialize_any(GradeVisitor)
    }
}

/// Structured outcome of assessing one component image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub component_type: String,
    pub condition_grade: ConditionGrade,
    pub condition_description: String,
    pub maintenance_recommendations: String,
}

impl AssessmentResult {
    /// True when the service flagged the image as a drawing rather than
    /// a photographed component.
    pub fn is_drawing(&self) -> bool {
        self.condition_grade == ConditionGrade::Drawing
    }
}

/// Narrative text produced by the report service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportText {
    pub introduction: String,
    pub summary: String,
}
