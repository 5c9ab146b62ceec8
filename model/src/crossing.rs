use serde::Serialize;

use crate::{
    GeoEngine, GeometryEngine, Intersection, ObjectID, Pt2D, ReferenceLine, Time, Trajectory,
};

/// Where and when a trajectory crossed a reference line. `intersection` and `time` are both
/// present or both absent.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CrossingEvent {
    pub line: ReferenceLine,
    pub intersection: Option<Pt2D>,
    /// The time of the sample nearest to the intersection. This isn't interpolated; the true
    /// crossing happened somewhere between neighboring samples.
    pub time: Option<Time>,
}

impl CrossingEvent {
    pub fn crossed(&self) -> bool {
        self.time.is_some()
    }
}

/// Whether a trajectory travelled through a pair of lines in the wrong order
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DirectionalityVerdict {
    pub trajectory: ObjectID,
    pub is_wrong_way: bool,
    pub arrival_time: Option<Time>,
    pub departure_time: Time,
}

impl DirectionalityVerdict {
    /// None if the departure line wasn't crossed. Crossing the departure line after the arrival
    /// line is the wrong way; which line comes first along the expected direction of travel is up
    /// to whoever places the lines.
    pub fn from_events(
        trajectory: ObjectID,
        arrival: &CrossingEvent,
        departure: &CrossingEvent,
    ) -> Option<Self> {
        let departure_time = departure.time?;
        let is_wrong_way = match arrival.time {
            Some(arrival_time) => departure_time > arrival_time,
            // Need both crossings to compare
            None => false,
        };
        Some(Self {
            trajectory,
            is_wrong_way,
            arrival_time: arrival.time,
            departure_time,
        })
    }
}

/// Detects when trajectories cross reference lines. Stateless; results only depend on the inputs.
pub struct CrossingAnalyzer<E = GeoEngine> {
    engine: E,
}

impl CrossingAnalyzer<GeoEngine> {
    pub fn new() -> Self {
        Self { engine: GeoEngine }
    }
}

impl Default for CrossingAnalyzer<GeoEngine> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: GeometryEngine> CrossingAnalyzer<E> {
    pub fn with_engine(engine: E) -> Self {
        Self { engine }
    }

    pub fn detect_crossing(&self, trajectory: &Trajectory, line: &ReferenceLine) -> CrossingEvent {
        // Straight lines between samples; whatever happened in between isn't modeled
        let path = trajectory.positions();
        let intersection = match self.engine.intersection(&path, line) {
            Intersection::Empty => None,
            Intersection::Point(pt) => Some(pt),
            Intersection::Complex => self.engine.nearest_point(&path, line),
        };
        let time = intersection.map(|pt| trajectory.nearest_sample_time(pt));
        CrossingEvent {
            line: *line,
            intersection,
            time,
        }
    }

    pub fn detect_directionality(
        &self,
        trajectory: &Trajectory,
        arrival_line: &ReferenceLine,
        departure_line: &ReferenceLine,
    ) -> Option<DirectionalityVerdict> {
        let arrival = self.detect_crossing(trajectory, arrival_line);
        let departure = self.detect_crossing(trajectory, departure_line);
        DirectionalityVerdict::from_events(trajectory.id(), &arrival, &departure)
    }
}
