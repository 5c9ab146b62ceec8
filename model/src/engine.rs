use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Closest, ClosestPoint, Coord, Intersects, Line, Point};

use crate::{Pt2D, ReferenceLine};

/// How a path meets a reference line
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Intersection {
    Empty,
    /// All contact happens at exactly one point. Passing through a vertex of the path counts as one
    /// point, even though two segments touch the line there.
    Point(Pt2D),
    /// The path overlaps the line, or touches it at more than one place
    Complex,
}

/// The geometric predicates needed for crossing detection. A path is the polyline through the
/// given points, in order; callers guarantee at least 2 points.
pub trait GeometryEngine {
    fn intersection(&self, path: &[Pt2D], line: &ReferenceLine) -> Intersection;

    /// The point on the path closest to the line. Path segments are scanned in order and only a
    /// strictly closer candidate replaces the current one, so the earliest segment wins ties. When
    /// a segment overlaps the line, the end of the overlap nearest the segment's start is used.
    ///
    /// None only for an empty path.
    fn nearest_point(&self, path: &[Pt2D], line: &ReferenceLine) -> Option<Pt2D>;
}

/// Implements the predicates with the `geo` crate
#[derive(Clone, Copy, Debug, Default)]
pub struct GeoEngine;

enum Contact {
    Point(Coord<f64>),
    Overlap(Line<f64>),
}

impl GeoEngine {
    fn contact(segment: Line<f64>, line: Line<f64>) -> Option<Contact> {
        // Repeated positions in the path
        if segment.start == segment.end {
            return if line.intersects(&segment.start) {
                Some(Contact::Point(segment.start))
            } else {
                None
            };
        }
        match line_intersection(segment, line)? {
            LineIntersection::SinglePoint { intersection, .. } => {
                Some(Contact::Point(intersection))
            }
            LineIntersection::Collinear { intersection } => Some(Contact::Overlap(intersection)),
        }
    }
}

impl GeometryEngine for GeoEngine {
    fn intersection(&self, path: &[Pt2D], line: &ReferenceLine) -> Intersection {
        let line = to_line(line);
        let mut found: Option<Coord<f64>> = None;
        for segment in segments(path) {
            match Self::contact(segment, line) {
                None => {}
                Some(Contact::Overlap(_)) => {
                    return Intersection::Complex;
                }
                Some(Contact::Point(pt)) => match found {
                    None => {
                        found = Some(pt);
                    }
                    Some(prev) if prev == pt => {}
                    Some(_) => {
                        return Intersection::Complex;
                    }
                },
            }
        }
        match found {
            Some(pt) => Intersection::Point(pt.into()),
            None => Intersection::Empty,
        }
    }

    fn nearest_point(&self, path: &[Pt2D], line: &ReferenceLine) -> Option<Pt2D> {
        if path.len() == 1 {
            return Some(path[0]);
        }

        let line = to_line(line);
        let mut best: Option<(f64, Coord<f64>)> = None;
        for segment in segments(path) {
            let (d, pt) = match Self::contact(segment, line) {
                Some(Contact::Point(pt)) => (0.0, pt),
                Some(Contact::Overlap(overlap)) => {
                    let to_start = dist(segment.start, overlap.start);
                    let pt = if to_start <= dist(segment.start, overlap.end) {
                        overlap.start
                    } else {
                        overlap.end
                    };
                    (0.0, pt)
                }
                None => closest_approach(segment, line),
            };
            if best.map_or(true, |(best_d, _)| d < best_d) {
                best = Some((d, pt));
            }
            if d == 0.0 {
                break;
            }
        }
        best.map(|(_, pt)| pt.into())
    }
}

// The point on `segment` closest to `line`, when they don't touch. The answer involves an endpoint
// of one of them.
fn closest_approach(segment: Line<f64>, line: Line<f64>) -> (f64, Coord<f64>) {
    let candidates = [
        segment.start,
        segment.end,
        project(segment, line.start),
        project(segment, line.end),
    ];
    let mut best = (f64::INFINITY, segment.start);
    for pt in candidates {
        let d = dist(pt, project(line, pt));
        if d < best.0 {
            best = (d, pt);
        }
    }
    best
}

fn project(line: Line<f64>, pt: Coord<f64>) -> Coord<f64> {
    match line.closest_point(&Point::from(pt)) {
        Closest::Intersection(p) | Closest::SinglePoint(p) => p.0,
        Closest::Indeterminate => line.start,
    }
}

fn dist(a: Coord<f64>, b: Coord<f64>) -> f64 {
    Pt2D::from(a).dist_to(b.into())
}

fn segments(path: &[Pt2D]) -> impl Iterator<Item = Line<f64>> + '_ {
    path.windows(2)
        .map(|pair| Line::new(Coord::from(pair[0]), Coord::from(pair[1])))
}

fn to_line(line: &ReferenceLine) -> Line<f64> {
    Line::new(Coord::from(line.pt1()), Coord::from(line.pt2()))
}

impl From<Pt2D> for Coord<f64> {
    fn from(pt: Pt2D) -> Self {
        Coord {
            x: pt.x(),
            y: pt.y(),
        }
    }
}

impl From<Coord<f64>> for Pt2D {
    fn from(c: Coord<f64>) -> Self {
        Pt2D::new(c.x, c.y)
    }
}
