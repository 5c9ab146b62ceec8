use anyhow::Result;
use serde::{Deserialize, Serialize};

/// A position in the planar coordinate space of the recordings. No projection is applied.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pt2D {
    x: f64,
    y: f64,
}

impl Pt2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn x(self) -> f64 {
        self.x
    }

    pub fn y(self) -> f64 {
        self.y
    }

    pub fn dist_to(self, other: Pt2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A finite segment used as a tripwire. It always has two distinct endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[[f64; 2]; 2]", into = "[[f64; 2]; 2]")]
pub struct ReferenceLine {
    pt1: Pt2D,
    pt2: Pt2D,
}

impl ReferenceLine {
    pub fn new(pt1: Pt2D, pt2: Pt2D) -> Result<Self> {
        if !pt1.is_finite() || !pt2.is_finite() {
            bail!("Reference line {:?} to {:?} isn't finite", pt1, pt2);
        }
        if pt1 == pt2 {
            bail!("Reference line has zero length at {:?}", pt1);
        }
        Ok(Self { pt1, pt2 })
    }

    pub fn pt1(&self) -> Pt2D {
        self.pt1
    }

    pub fn pt2(&self) -> Pt2D {
        self.pt2
    }
}

impl TryFrom<[[f64; 2]; 2]> for ReferenceLine {
    type Error = anyhow::Error;

    fn try_from(raw: [[f64; 2]; 2]) -> Result<Self> {
        let [[x1, y1], [x2, y2]] = raw;
        Self::new(Pt2D::new(x1, y1), Pt2D::new(x2, y2))
    }
}

impl From<ReferenceLine> for [[f64; 2]; 2] {
    fn from(line: ReferenceLine) -> Self {
        [
            [line.pt1.x, line.pt1.y],
            [line.pt2.x, line.pt2.y],
        ]
    }
}

/// An axis-aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn new() -> Self {
        Self {
            min_x: f64::MAX,
            max_x: f64::MIN,
            min_y: f64::MAX,
            max_y: f64::MIN,
        }
    }

    pub fn update(&mut self, pt: Pt2D) {
        self.min_x = self.min_x.min(pt.x);
        self.max_x = self.max_x.max(pt.x);
        self.min_y = self.min_y.min(pt.y);
        self.max_y = self.max_y.max(pt.y);
    }

    pub fn union(&mut self, other: &Bounds) {
        self.min_x = self.min_x.min(other.min_x);
        self.max_x = self.max_x.max(other.max_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_y = self.max_y.max(other.max_y);
    }

    /// Nothing has been added yet
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_length_line() {
        let pt = Pt2D::new(3.0, 4.0);
        assert!(ReferenceLine::new(pt, pt).is_err());
        assert!(ReferenceLine::new(pt, Pt2D::new(f64::NAN, 0.0)).is_err());
        assert!(ReferenceLine::new(Pt2D::new(0.0, 0.0), pt).is_ok());
    }

    #[test]
    fn line_from_pairs() {
        let line = ReferenceLine::try_from([[0.0, 1.0], [2.0, 3.0]]).unwrap();
        assert_eq!(line.pt1(), Pt2D::new(0.0, 1.0));
        assert_eq!(line.pt2(), Pt2D::new(2.0, 3.0));
        assert!(ReferenceLine::try_from([[1.0, 1.0], [1.0, 1.0]]).is_err());
    }

    #[test]
    fn bounds() {
        let mut bounds = Bounds::new();
        assert!(bounds.is_empty());
        bounds.update(Pt2D::new(1.0, -2.0));
        bounds.update(Pt2D::new(-3.0, 5.0));
        assert!(!bounds.is_empty());
        assert_eq!(
            bounds,
            Bounds {
                min_x: -3.0,
                max_x: 1.0,
                min_y: -2.0,
                max_y: 5.0,
            }
        );
    }
}
