use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;

use model::{
    Category, CrossingAnalyzer, CrossingEvent, DirectionalityVerdict, ObjectID, Trajectory,
};

use crate::scenario::ReferenceLines;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineRole {
    Reference,
    Arrival,
    Departure,
}

#[derive(Debug, Serialize)]
pub struct Crossing {
    pub role: LineRole,
    #[serde(flatten)]
    pub event: CrossingEvent,
}

#[derive(Debug, Serialize)]
pub struct TrajectoryAnalysis {
    pub identifier: ObjectID,
    pub category: Category,
    /// One per reference line, crossed or not
    pub crossings: Vec<Crossing>,
    /// Only with arrival and departure lines, when the departure line was crossed
    pub verdict: Option<DirectionalityVerdict>,
}

/// Crossings for every selected trajectory against the scenario's lines
#[derive(Debug, Default, Serialize)]
pub struct Analysis {
    pub trajectories: BTreeMap<ObjectID, TrajectoryAnalysis>,
}

impl Analysis {
    pub fn run(lines: &ReferenceLines, trajectories: &[&Trajectory]) -> Self {
        let analyzer = CrossingAnalyzer::new();
        let mut analysis = Analysis::default();
        for trajectory in trajectories {
            let (crossings, verdict) = match lines {
                ReferenceLines::None => continue,
                ReferenceLines::Single { line } => {
                    let event = analyzer.detect_crossing(trajectory, line);
                    (
                        vec![Crossing {
                            role: LineRole::Reference,
                            event,
                        }],
                        None,
                    )
                }
                ReferenceLines::ArrivalDeparture { arrival, departure } => {
                    let arrival = analyzer.detect_crossing(trajectory, arrival);
                    let departure = analyzer.detect_crossing(trajectory, departure);
                    let verdict =
                        DirectionalityVerdict::from_events(trajectory.id(), &arrival, &departure);
                    (
                        vec![
                            Crossing {
                                role: LineRole::Arrival,
                                event: arrival,
                            },
                            Crossing {
                                role: LineRole::Departure,
                                event: departure,
                            },
                        ],
                        verdict,
                    )
                }
            };
            analysis.trajectories.insert(
                trajectory.id(),
                TrajectoryAnalysis {
                    identifier: trajectory.id(),
                    category: trajectory.category(),
                    crossings,
                    verdict,
                },
            );
        }

        let crossed = analysis
            .trajectories
            .values()
            .filter(|t| t.crossings.iter().any(|c| c.event.crossed()))
            .count();
        info!(
            "{} of {} trajectories crossed a reference line",
            crossed,
            trajectories.len()
        );
        analysis
    }

    pub fn is_wrong_way(&self, id: ObjectID) -> bool {
        self.trajectories
            .get(&id)
            .and_then(|t| t.verdict.as_ref())
            .map_or(false, |v| v.is_wrong_way)
    }

    /// The human-readable report, one line per event
    pub fn describe(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for t in self.trajectories.values() {
            let name = format!("Trajectory {} (Category: {})", t.identifier, t.category);
            if let Some(ref verdict) = t.verdict {
                if verdict.is_wrong_way {
                    lines.push(format!("Warning: {name} is going the wrong way!"));
                }
                lines.push(format!(
                    "{name} crossed the departure line at {}",
                    verdict.departure_time
                ));
                continue;
            }
            for crossing in &t.crossings {
                if let (LineRole::Reference, Some(time)) = (crossing.role, crossing.event.time) {
                    lines.push(format!("{name} crossed the reference line at {time}"));
                }
            }
        }
        lines
    }

    pub fn print_report(&self) {
        for t in self.trajectories.values() {
            if self.is_wrong_way(t.identifier) {
                warn!("Trajectory {} is going the wrong way", t.identifier);
            }
        }
        for line in self.describe() {
            println!("{line}");
        }
    }

    pub fn write_json(&self, path: &str) -> Result<()> {
        fs_err::write(path, serde_json::to_string_pretty(self)?)?;
        info!("Wrote crossing report to {}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::{Pt2D, ReferenceLine, Time};

    fn traj(id: u64, pts: &[(f64, f64)]) -> Trajectory {
        Trajectory::new(
            ObjectID(id),
            Category(1),
            pts.iter()
                .enumerate()
                .map(|(i, (x, y))| {
                    (
                        Pt2D::new(*x, *y),
                        Time::seconds_since_epoch(1_714_557_600.0 + i as f64),
                    )
                })
                .collect(),
        )
        .unwrap()
    }

    fn vertical(x: f64) -> ReferenceLine {
        ReferenceLine::new(Pt2D::new(x, -5.0), Pt2D::new(x, 5.0)).unwrap()
    }

    #[test]
    fn single_line_report() {
        let crosses = traj(1, &[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)]);
        let misses = traj(2, &[(0.0, 0.0), (1.0, 0.0)]);
        let lines = ReferenceLines::Single {
            line: vertical(12.0),
        };
        let analysis = Analysis::run(&lines, &[&crosses, &misses]);

        assert_eq!(analysis.trajectories.len(), 2);
        assert_eq!(
            analysis.describe(),
            vec!["Trajectory 1 (Category: 1) crossed the reference line at 2024-05-01 10:00:01.000"]
        );
        assert!(!analysis.is_wrong_way(ObjectID(1)));
    }

    #[test]
    fn wrong_way_report() {
        let eastbound = traj(1, &[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0), (30.0, 0.0)]);
        let westbound = traj(2, &[(30.0, 0.0), (20.0, 0.0), (10.0, 0.0), (0.0, 0.0)]);
        let only_arrival = traj(3, &[(0.0, 0.0), (15.0, 0.0)]);
        let lines = ReferenceLines::ArrivalDeparture {
            arrival: vertical(10.0),
            departure: vertical(20.0),
        };
        let analysis = Analysis::run(&lines, &[&eastbound, &westbound, &only_arrival]);

        assert!(analysis.is_wrong_way(ObjectID(1)));
        assert!(!analysis.is_wrong_way(ObjectID(2)));
        assert!(!analysis.is_wrong_way(ObjectID(3)));
        assert!(analysis.trajectories[&ObjectID(3)].verdict.is_none());
        assert!(analysis.trajectories[&ObjectID(3)].crossings[0].event.crossed());

        assert_eq!(
            analysis.describe(),
            vec![
                "Warning: Trajectory 1 (Category: 1) is going the wrong way!",
                "Trajectory 1 (Category: 1) crossed the departure line at 2024-05-01 10:00:02.000",
                "Trajectory 2 (Category: 1) crossed the departure line at 2024-05-01 10:00:01.000",
            ]
        );
    }

    #[test]
    fn no_lines_no_analysis() {
        let t = traj(1, &[(0.0, 0.0), (10.0, 0.0)]);
        assert!(Analysis::run(&ReferenceLines::None, &[&t])
            .trajectories
            .is_empty());
    }

    #[test]
    fn json_shape() {
        let t = traj(4, &[(0.0, 0.0), (10.0, 0.0)]);
        let lines = ReferenceLines::Single {
            line: vertical(2.0),
        };
        let json = serde_json::to_value(Analysis::run(&lines, &[&t])).unwrap();
        let crossing = &json["trajectories"]["4"]["crossings"][0];
        assert_eq!(crossing["role"], "reference");
        assert_eq!(crossing["intersection"]["x"], 2.0);
        assert_eq!(crossing["time"], 1_714_557_600.0);
        assert_eq!(crossing["line"][0][0], 2.0);
    }
}
