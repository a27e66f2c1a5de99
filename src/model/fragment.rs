//! Positioned text fragments.

use serde::{Deserialize, Serialize};

/// Axis-aligned box in page (or image) coordinates, origin at the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest box enclosing every corner point.
    ///
    /// Returns `None` for an empty point set.
    pub fn from_points(points: &[(f32, f32)]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (mut min_x, mut min_y) = *first;
        let (mut max_x, mut max_y) = *first;
        for &(x, y) in rest {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// One unit of recognized text with the top-left coordinate where it starts.
///
/// Produced by digital extraction and by OCR alike, so both paths feed the
/// same column reconstruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedFragment {
    /// The text content
    pub text: String,
    /// Left edge (grows to the right)
    pub x: f32,
    /// Top edge (grows downwards)
    pub y: f32,
    /// Full extent, when the producer knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
}

impl PositionedFragment {
    /// Create a fragment at a point.
    pub fn new(text: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            bbox: None,
        }
    }

    /// Create a fragment positioned at the top-left of a bounding box.
    pub fn with_bbox(text: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            text: text.into(),
            x: bbox.x,
            y: bbox.y,
            bbox: Some(bbox),
        }
    }

    /// Attach a bounding box without moving the fragment's anchor point.
    pub fn with_bounds(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    /// Check if the fragment carries no visible text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_from_points() {
        let bbox =
            BoundingBox::from_points(&[(10.0, 20.0), (110.0, 20.0), (110.0, 45.0), (10.0, 45.0)])
                .unwrap();
        assert_eq!(bbox, BoundingBox::new(10.0, 20.0, 100.0, 25.0));
        assert_eq!(bbox.right(), 110.0);
        assert_eq!(bbox.bottom(), 45.0);
        assert!(BoundingBox::from_points(&[]).is_none());
    }

    #[test]
    fn test_fragment_with_bbox() {
        let frag = PositionedFragment::with_bbox("hello", BoundingBox::new(5.0, 7.0, 30.0, 10.0));
        assert_eq!(frag.x, 5.0);
        assert_eq!(frag.y, 7.0);
        assert!(!frag.is_blank());
        assert!(PositionedFragment::new("  \n", 0.0, 0.0).is_blank());
    }

    #[test]
    fn test_with_bounds_keeps_anchor() {
        let frag = PositionedFragment::new("tilted", 30.0, 5.0)
            .with_bounds(BoundingBox::new(28.0, 5.0, 62.0, 15.0));
        assert_eq!((frag.x, frag.y), (30.0, 5.0));
        assert_eq!(frag.bbox.map(|b| b.x), Some(28.0));
    }
}
