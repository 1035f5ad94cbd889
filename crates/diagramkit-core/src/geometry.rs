//! Geometry primitives shared by every diagram layer.
//!
//! Coordinates follow screen conventions: `x` grows to the right and `y`
//! grows downwards, so the `n` anchor sits on the minimum `y` edge.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A point in diagram (world) space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Returns a copy moved by `(dx, dy)`.
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Angle in radians of the vector from `self` to `other`.
    pub fn angle_to(&self, other: &Position) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }
}

/// Width and height of an entity's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_finite(&self) -> bool {
        self.width.is_finite() && self.height.is_finite()
    }
}

/// Axis-aligned rectangle `{x, y, width, height}` with `(x, y)` at the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_position_dimensions(position: Position, dimensions: Dimensions) -> Self {
        Self::new(position.x, position.y, dimensions.width, dimensions.height)
    }

    /// Smallest box containing every point, or `None` for an empty iterator.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Position>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in iter {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    pub fn min_x(&self) -> f64 {
        self.x
    }

    pub fn min_y(&self) -> f64 {
        self.y
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    pub fn center(&self) -> Position {
        Position::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Inclusive point-in-rectangle test.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x() && x <= self.max_x() && y >= self.min_y() && y <= self.max_y()
    }

    /// True when the two rectangles overlap or touch.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min_x() <= other.max_x()
            && self.max_x() >= other.min_x()
            && self.min_y() <= other.max_y()
            && self.max_y() >= other.min_y()
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        let min_x = self.min_x().min(other.min_x());
        let min_y = self.min_y().min(other.min_y());
        let max_x = self.max_x().max(other.max_x());
        let max_y = self.max_y().max(other.max_y());
        Bounds::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Grows the rectangle by `padding` on every side.
    pub fn expand(&self, padding: f64) -> Bounds {
        Bounds::new(
            self.x - padding,
            self.y - padding,
            self.width + padding * 2.0,
            self.height + padding * 2.0,
        )
    }

    /// World-space location of `anchor` on this rectangle.
    pub fn anchor_point(&self, anchor: AnchorPosition) -> Position {
        let cx = self.x + self.width / 2.0;
        let cy = self.y + self.height / 2.0;
        let (x, y) = match anchor {
            AnchorPosition::N => (cx, self.min_y()),
            AnchorPosition::S => (cx, self.max_y()),
            AnchorPosition::E => (self.max_x(), cy),
            AnchorPosition::W => (self.min_x(), cy),
            AnchorPosition::NE => (self.max_x(), self.min_y()),
            AnchorPosition::NW => (self.min_x(), self.min_y()),
            AnchorPosition::SE => (self.max_x(), self.max_y()),
            AnchorPosition::SW => (self.min_x(), self.max_y()),
            AnchorPosition::Center => (cx, cy),
        };
        Position::new(x, y)
    }
}

/// Outward direction of an anchor, as a unit vector (zero for `center`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Direction {
    pub dx: f64,
    pub dy: f64,
}

impl Direction {
    pub const NONE: Direction = Direction { dx: 0.0, dy: 0.0 };

    pub fn new(dx: f64, dy: f64) -> Self {
        let len = (dx * dx + dy * dy).sqrt();
        if len == 0.0 {
            Self::NONE
        } else {
            Self {
                dx: dx / len,
                dy: dy / len,
            }
        }
    }

    pub fn is_none(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }

    /// Horizontal when the x component dominates; diagonals count as horizontal.
    pub fn is_horizontal(&self) -> bool {
        !self.is_none() && self.dx.abs() >= self.dy.abs()
    }

    pub fn is_vertical(&self) -> bool {
        !self.is_none() && self.dy.abs() > self.dx.abs()
    }
}

/// One of the nine attachment points on a shape's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorPosition {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
    #[default]
    Center,
}

impl AnchorPosition {
    pub const ALL: [AnchorPosition; 9] = [
        AnchorPosition::N,
        AnchorPosition::S,
        AnchorPosition::E,
        AnchorPosition::W,
        AnchorPosition::NE,
        AnchorPosition::NW,
        AnchorPosition::SE,
        AnchorPosition::SW,
        AnchorPosition::Center,
    ];

    /// The eight anchors on the box perimeter, in clockwise order from `n`.
    pub const PERIMETER: [AnchorPosition; 8] = [
        AnchorPosition::N,
        AnchorPosition::NE,
        AnchorPosition::E,
        AnchorPosition::SE,
        AnchorPosition::S,
        AnchorPosition::SW,
        AnchorPosition::W,
        AnchorPosition::NW,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnchorPosition::N => "n",
            AnchorPosition::S => "s",
            AnchorPosition::E => "e",
            AnchorPosition::W => "w",
            AnchorPosition::NE => "ne",
            AnchorPosition::NW => "nw",
            AnchorPosition::SE => "se",
            AnchorPosition::SW => "sw",
            AnchorPosition::Center => "center",
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            AnchorPosition::N => Direction::new(0.0, -1.0),
            AnchorPosition::S => Direction::new(0.0, 1.0),
            AnchorPosition::E => Direction::new(1.0, 0.0),
            AnchorPosition::W => Direction::new(-1.0, 0.0),
            AnchorPosition::NE => Direction::new(1.0, -1.0),
            AnchorPosition::NW => Direction::new(-1.0, -1.0),
            AnchorPosition::SE => Direction::new(1.0, 1.0),
            AnchorPosition::SW => Direction::new(-1.0, 1.0),
            AnchorPosition::Center => Direction::NONE,
        }
    }
}

impl fmt::Display for AnchorPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an anchor token outside the nine-token vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid anchor '{0}': expected one of n, s, e, w, ne, nw, se, sw, center")]
pub struct ParseAnchorError(pub String);

impl FromStr for AnchorPosition {
    type Err = ParseAnchorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnchorPosition::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| ParseAnchorError(s.to_string()))
    }
}
