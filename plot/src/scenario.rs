use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::Deserialize;

use model::{Bounds, Category, ObjectID, ReferenceLine, Trajectory};

/// Everything that describes one plot or analysis: the view, styling, and reference lines. Read
/// fresh for every invocation.
#[derive(Clone, Debug, Deserialize)]
pub struct Scenario {
    /// Output size in pixels
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// (left, right). Defaults to the extent of the trajectories.
    #[serde(default)]
    pub x_limits: Option<(f64, f64)>,
    /// (bottom, top). Bottom can be larger than top, to match image coordinates.
    #[serde(default)]
    pub y_limits: Option<(f64, f64)>,
    #[serde(default)]
    pub background: Option<Background>,
    #[serde(default = "default_category_colors")]
    pub category_colors: Vec<CategoryColor>,
    #[serde(default = "default_linewidth")]
    pub linewidth: f32,
    #[serde(default = "default_alpha")]
    pub alpha: f32,
    #[serde(default)]
    pub lines: ReferenceLines,
    /// Tagged onto exported GeoJSON
    #[serde(default = "default_crs")]
    pub crs: String,
}

/// An image drawn underneath everything. The top row of the image sits at `min_y`.
#[derive(Clone, Debug, Deserialize)]
pub struct Background {
    pub path: String,
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CategoryColor {
    pub category: Category,
    pub color: [u8; 3],
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReferenceLines {
    #[default]
    None,
    Single {
        line: ReferenceLine,
    },
    /// Crossing the departure line after the arrival line is flagged as the wrong way
    ArrivalDeparture {
        arrival: ReferenceLine,
        departure: ReferenceLine,
    },
}

pub const GRAY: [u8; 3] = [128, 128, 128];

fn default_width() -> u32 {
    1600
}

fn default_height() -> u32 {
    800
}

fn default_linewidth() -> f32 {
    2.0
}

fn default_alpha() -> f32 {
    0.35
}

fn default_crs() -> String {
    "EPSG:4326".to_string()
}

fn default_category_colors() -> Vec<CategoryColor> {
    vec![
        // darkorange
        (0, [255, 140, 0]),
        // blue
        (1, [0, 0, 255]),
        // orange
        (2, [255, 165, 0]),
        // darkgreen
        (3, [0, 100, 0]),
        // olive
        (4, [128, 128, 0]),
        // black
        (5, [0, 0, 0]),
    ]
    .into_iter()
    .map(|(category, color)| CategoryColor {
        category: Category(category),
        color,
    })
    .collect()
}

impl Scenario {
    pub fn load(path: &str) -> Result<Self> {
        let raw = fs_err::read_to_string(path)?;
        let scenario = Self::parse(&raw).with_context(|| format!("scenario {path}"))?;
        Ok(scenario)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let scenario: Scenario = serde_json::from_str(raw)?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            bail!("Output size {}x{} is empty", self.width, self.height);
        }
        if !(0.0..=1.0).contains(&self.alpha) {
            bail!("alpha must be between 0 and 1, not {}", self.alpha);
        }
        if !(self.linewidth > 0.0) {
            bail!("linewidth must be positive, not {}", self.linewidth);
        }
        for (name, limits) in [("x_limits", self.x_limits), ("y_limits", self.y_limits)] {
            if let Some((a, b)) = limits {
                if !a.is_finite() || !b.is_finite() || a == b {
                    bail!("{name} ({a}, {b}) don't describe a range");
                }
            }
        }
        if let ReferenceLines::ArrivalDeparture {
            ref arrival,
            ref departure,
        } = self.lines
        {
            let reversed = (arrival.pt1(), arrival.pt2()) == (departure.pt2(), departure.pt1());
            if arrival == departure || reversed {
                bail!("The arrival and departure lines must be different; both are {:?}", arrival);
            }
        }
        if let Some(ref bg) = self.background {
            if bg.min_x == bg.max_x || bg.min_y == bg.max_y {
                bail!("Background {} has an empty extent", bg.path);
            }
        }
        Ok(())
    }

    pub fn color_for(&self, category: Category) -> Option<[u8; 3]> {
        self.category_colors
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.color)
    }

    /// The trajectories to draw and analyze. When a category is given, it must have a color.
    pub fn select<'a>(
        &self,
        trajectories: &'a BTreeMap<ObjectID, Trajectory>,
        category: Option<Category>,
    ) -> Result<Vec<&'a Trajectory>> {
        if let Some(category) = category {
            if self.color_for(category).is_none() {
                bail!("Category {category} not recognized. Use a valid category.");
            }
        }
        Ok(trajectories
            .values()
            .filter(|t| category.map_or(true, |c| t.category() == c))
            .collect())
    }

    /// The (left, right) and (bottom, top) view of the world
    pub fn view(&self, trajectories: &[&Trajectory]) -> ((f64, f64), (f64, f64)) {
        let mut bounds = Bounds::new();
        for t in trajectories {
            bounds.union(&t.bounds());
        }
        if bounds.is_empty() || bounds.min_x == bounds.max_x || bounds.min_y == bounds.max_y {
            if let Some(ref bg) = self.background {
                bounds = Bounds {
                    min_x: bg.min_x,
                    max_x: bg.max_x,
                    min_y: bg.min_y,
                    max_y: bg.max_y,
                };
            } else if bounds.is_empty() {
                bounds = Bounds {
                    min_x: 0.0,
                    max_x: 1.0,
                    min_y: 0.0,
                    max_y: 1.0,
                };
            } else {
                bounds.min_x -= 0.5;
                bounds.max_x += 0.5;
                bounds.min_y -= 0.5;
                bounds.max_y += 0.5;
            }
        }
        (
            self.x_limits.unwrap_or((bounds.min_x, bounds.max_x)),
            self.y_limits.unwrap_or((bounds.min_y, bounds.max_y)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::{Pt2D, Time};

    #[test]
    fn defaults() {
        let scenario = Scenario::parse("{}").unwrap();
        assert_eq!((scenario.width, scenario.height), (1600, 800));
        assert_eq!(scenario.linewidth, 2.0);
        assert_eq!(scenario.alpha, 0.35);
        assert_eq!(scenario.crs, "EPSG:4326");
        assert!(matches!(scenario.lines, ReferenceLines::None));
        assert_eq!(scenario.color_for(Category(1)), Some([0, 0, 255]));
        assert_eq!(scenario.color_for(Category(9)), None);
    }

    #[test]
    fn two_lines() {
        let scenario = Scenario::parse(
            r#"{
                "x_limits": [50, 1800],
                "y_limits": [900, 0],
                "background": {"path": "bg.jpg", "min_x": 50, "max_x": 1800, "min_y": 0, "max_y": 990},
                "lines": {
                    "kind": "arrival_departure",
                    "arrival": [[50, 500], [1800, 500]],
                    "departure": [[50, 100], [1800, 100]]
                }
            }"#,
        )
        .unwrap();
        assert_eq!(scenario.y_limits, Some((900.0, 0.0)));
        match scenario.lines {
            ReferenceLines::ArrivalDeparture { arrival, departure } => {
                assert_eq!(arrival.pt1(), Pt2D::new(50.0, 500.0));
                assert_eq!(departure.pt2(), Pt2D::new(1800.0, 100.0));
            }
            _ => panic!("wrong lines"),
        }
    }

    #[test]
    fn rejects_bad_input() {
        // Zero-length line
        assert!(Scenario::parse(
            r#"{"lines": {"kind": "single", "line": [[1, 1], [1, 1]]}}"#
        )
        .is_err());
        assert!(Scenario::parse(r#"{"alpha": 1.5}"#).is_err());
        assert!(Scenario::parse(r#"{"width": 0}"#).is_err());
        assert!(Scenario::parse(r#"{"x_limits": [3, 3]}"#).is_err());
        assert!(Scenario::parse(r#"{"linewidth": -1}"#).is_err());
    }

    #[test]
    fn arrival_and_departure_must_differ() {
        let lines = |arrival: &str, departure: &str| {
            Scenario::parse(&format!(
                r#"{{"lines": {{"kind": "arrival_departure", "arrival": {arrival}, "departure": {departure}}}}}"#
            ))
        };
        let err = lines("[[0, 5], [10, 5]]", "[[0, 5], [10, 5]]").unwrap_err();
        assert!(err.to_string().contains("must be different"), "{err}");
        // The same segment, just drawn the other way
        assert!(lines("[[0, 5], [10, 5]]", "[[10, 5], [0, 5]]").is_err());
        assert!(lines("[[0, 5], [10, 5]]", "[[0, 1], [10, 1]]").is_ok());
    }

    fn traj(id: u64, category: u32, pts: &[(f64, f64)]) -> Trajectory {
        Trajectory::new(
            ObjectID(id),
            Category(category),
            pts.iter()
                .enumerate()
                .map(|(i, (x, y))| (Pt2D::new(*x, *y), Time::seconds_since_epoch(i as f64)))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn select_by_category() {
        let mut trajectories = BTreeMap::new();
        trajectories.insert(ObjectID(1), traj(1, 0, &[(0.0, 0.0), (1.0, 1.0)]));
        trajectories.insert(ObjectID(2), traj(2, 1, &[(0.0, 0.0), (1.0, 1.0)]));
        trajectories.insert(ObjectID(3), traj(3, 9, &[(0.0, 0.0), (1.0, 1.0)]));

        let scenario = Scenario::parse("{}").unwrap();
        assert_eq!(scenario.select(&trajectories, None).unwrap().len(), 3);
        let selected = scenario.select(&trajectories, Some(Category(1))).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id(), ObjectID(2));
        assert!(scenario.select(&trajectories, Some(Category(9))).is_err());
    }

    #[test]
    fn view_defaults_to_data() {
        let a = traj(1, 0, &[(0.0, 5.0), (10.0, 7.0)]);
        let b = traj(2, 0, &[(-4.0, 1.0), (2.0, 2.0)]);
        let scenario = Scenario::parse("{}").unwrap();
        assert_eq!(scenario.view(&[&a, &b]), ((-4.0, 10.0), (1.0, 7.0)));

        let scenario = Scenario::parse(r#"{"y_limits": [100, 0]}"#).unwrap();
        assert_eq!(scenario.view(&[&a, &b]), ((-4.0, 10.0), (100.0, 0.0)));
    }
}
