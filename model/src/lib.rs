#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod assemble;
mod crossing;
mod engine;
mod geometry;
mod time;
mod trajectory;

pub use recordings::{Category, ObjectID, Sample};

pub use self::assemble::{assemble, load_csv, ShortPathPolicy};
pub use self::crossing::{CrossingAnalyzer, CrossingEvent, DirectionalityVerdict};
pub use self::engine::{GeoEngine, GeometryEngine, Intersection};
pub use self::geometry::{Bounds, Pt2D, ReferenceLine};
pub use self::time::Time;
pub use self::trajectory::Trajectory;
