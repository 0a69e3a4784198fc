//! Bounding-box annotation types and the corner-click state machine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of an image in the labeling project.
pub type ImageId = u64;

/// Opaque identifier of an annotation.
///
/// Server-provided label sets carry their own string keys, so ids are kept as
/// strings. Fresh ids are random UUIDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(String);

impl AnnotationId {
    /// Generate a fresh, unique id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Wrap an existing id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AnnotationId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A pointer position in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position2D {
    pub x: f64,
    pub y: f64,
}

impl Position2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Rectangle stored as two corners.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoxLabel {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoxLabel {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Round every coordinate to the nearest integer.
    ///
    /// Halves round toward positive infinity, so `-2.5` becomes `-2`.
    pub fn rounded(self) -> Self {
        Self {
            x1: round_half_up(self.x1),
            y1: round_half_up(self.y1),
            x2: round_half_up(self.x2),
            y2: round_half_up(self.y2),
        }
    }

    /// Swap corners so that `x1 <= x2` and `y1 <= y2`.
    pub fn ordered(self) -> Self {
        let mut label = self;
        if label.x1 > label.x2 {
            std::mem::swap(&mut label.x1, &mut label.x2);
        }
        if label.y1 > label.y2 {
            std::mem::swap(&mut label.y1, &mut label.y2);
        }
        label
    }

    /// Round, then order the corners.
    pub fn normalized(self) -> Self {
        self.rounded().ordered()
    }

    /// Whether both corners fall on the same integer pixel.
    pub fn is_degenerate(&self) -> bool {
        self.x1.trunc() == self.x2.trunc() && self.y1.trunc() == self.y2.trunc()
    }

    pub fn is_ordered(&self) -> bool {
        self.x1 <= self.x2 && self.y1 <= self.y2
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }
}

// `(v + 0.5).floor()` misrounds 0.49999999999999994; compare the fraction.
fn round_half_up(v: f64) -> f64 {
    let floor = v.floor();
    if v - floor >= 0.5 { floor + 1.0 } else { floor }
}

/// How many corner clicks an annotation has received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnnotationState {
    /// No corner placed yet.
    #[default]
    Empty,
    /// First corner placed; the box collapses onto that point.
    P1Added,
    /// Both corners placed.
    Finish,
}

/// One bounding box on one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: AnnotationId,
    /// Image this box belongs to, if assigned.
    #[serde(default)]
    pub image: Option<ImageId>,
    pub label: BoxLabel,
    #[serde(default)]
    pub annotation_state: AnnotationState,
}

impl Annotation {
    /// A fresh, empty annotation with a generated id.
    pub fn init(image: Option<ImageId>) -> Self {
        Self {
            id: AnnotationId::generate(),
            image,
            label: BoxLabel::default(),
            annotation_state: AnnotationState::Empty,
        }
    }

    /// A fresh annotation with its first corner already placed.
    pub fn with_point(point: Position2D, image: Option<ImageId>) -> Self {
        Self::init(image).add(point)
    }

    /// Apply one corner click and return the resulting annotation.
    ///
    /// The receiver is left untouched. A finished annotation is returned as an
    /// unchanged (but normalized) copy.
    pub fn add(&self, Position2D { x, y }: Position2D) -> Self {
        let mut next = self.clone();

        match self.annotation_state {
            AnnotationState::Empty => {
                next.label = BoxLabel::new(x, y, x, y);
                next.annotation_state = AnnotationState::P1Added;
            }
            AnnotationState::P1Added => {
                next.label.x2 = x;
                next.label.y2 = y;
                next.annotation_state = AnnotationState::Finish;
            }
            AnnotationState::Finish => {}
        }

        next.label = next.label.normalized();
        next
    }

    pub fn is_finished(&self) -> bool {
        self.annotation_state == AnnotationState::Finish
    }
}
