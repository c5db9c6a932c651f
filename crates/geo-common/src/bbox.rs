//! Bounding box types and operations.

use std::str::FromStr;

use geo::{coord, Polygon, Rect};
use serde::{Deserialize, Serialize};

/// An axis-aligned extent in the coordinate units of its dataset.
///
/// For geographic data `x` is longitude and `y` is latitude, in degrees.
/// Edges are inclusive: a box touching another along an edge intersects it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Parse a comma separated extent: `"minx,miny,maxx,maxy"`.
    pub fn from_string(s: &str) -> Result<Self, BboxParseError> {
        s.parse()
    }

    pub fn from_rect(rect: &Rect<f64>) -> Self {
        let (lo, hi) = (rect.min(), rect.max());
        Self::new(lo.x, lo.y, hi.x, hi.y)
    }

    /// Smallest box holding every `(x, y)` pair, or `None` for no points.
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        points.into_iter().fold(None, |acc, (x, y)| {
            let point = Self::new(x, y, x, y);
            Some(acc.map_or(point, |bbox: Self| bbox.expand_to(&point)))
        })
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn intersects(&self, other: &BoundingBox) -> bool {
        let overlap_x = self.min_x <= other.max_x && other.min_x <= self.max_x;
        let overlap_y = self.min_y <= other.max_y && other.min_y <= self.max_y;
        overlap_x && overlap_y
    }

    /// Shared part of two boxes; degenerate when they only touch.
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        self.intersects(other).then(|| {
            BoundingBox::new(
                self.min_x.max(other.min_x),
                self.min_y.max(other.min_y),
                self.max_x.min(other.max_x),
                self.max_y.min(other.max_y),
            )
        })
    }

    pub fn expand_to(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }

    /// The box as a closed polygon, counter-clockwise from the lower-left corner.
    pub fn to_polygon(&self) -> Polygon<f64> {
        Rect::new(
            coord! { x: self.min_x, y: self.min_y },
            coord! { x: self.max_x, y: self.max_y },
        )
        .to_polygon()
    }
}

impl FromStr for BoundingBox {
    type Err = BboxParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<f64>()
                    .map_err(|_| BboxParseError::InvalidNumber(part.to_string()))
            })
            .collect::<Result<Vec<_>, _>>();

        let bbox = match values.as_deref() {
            Ok([min_x, min_y, max_x, max_y]) => Self::new(*min_x, *min_y, *max_x, *max_y),
            // A wrong field count is reported before any bad number
            _ if s.split(',').count() != 4 => {
                return Err(BboxParseError::InvalidFormat(s.to_string()))
            }
            Ok(_) => return Err(BboxParseError::InvalidFormat(s.to_string())),
            Err(e) => return Err(e.clone()),
        };

        if bbox.min_x > bbox.max_x || bbox.min_y > bbox.max_y {
            return Err(BboxParseError::Inverted(s.to_string()));
        }
        Ok(bbox)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BboxParseError {
    #[error("Invalid extent format: {0}. Expected 'minx,miny,maxx,maxy'")]
    InvalidFormat(String),

    #[error("Invalid number in extent: {0}")]
    InvalidNumber(String),

    #[error("Extent minimum exceeds maximum: {0}")]
    Inverted(String),
}
