//! Raw trajectory recordings: the line-oriented text format produced by the tracker, and the flat
//! CSV table it gets converted into.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod table;
mod text;

use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub use table::{read_csv, write_csv};
pub use text::{parse_line, parse_text, TimeFormat};

/// Identifies one tracked object across all of its samples
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectID(pub u64);

/// What kind of object the tracker thinks this is (pedestrian, car, bus...). The numbering is
/// decided by the tracker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Category(pub u32);

impl fmt::Display for ObjectID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One row of the tabular form
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Sample {
    pub identifier: ObjectID,
    pub category: Category,
    /// Seconds since the Unix epoch
    pub timestamp: f64,
    pub x: f64,
    pub y: f64,
}

/// Converts a raw text recording into a CSV file. Returns the number of samples written.
pub fn convert(txt_path: &str, csv_path: &str, format: TimeFormat) -> Result<usize> {
    let samples = parse_text(fs_err::File::open(txt_path)?, format)?;
    write_csv(fs_err::File::create(csv_path)?, &samples)?;
    info!(
        "Converted {} samples from {} into {}",
        samples.len(),
        txt_path,
        csv_path
    );
    Ok(samples.len())
}

// Some recordings write IDs as floats ("3.0"), so accept that, as long as it's really an
// integer. `u64::MAX as f64` rounds up to 2^64, which is already out of range.
fn parse_integral(value: f64, what: &str) -> Result<u64> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value >= u64::MAX as f64 {
        bail!("{what} must be a non-negative integer, not {value}");
    }
    Ok(value as u64)
}

fn parse_category(value: f64) -> Result<Category> {
    let x = parse_integral(value, "category")?;
    let x = u32::try_from(x).map_err(|_| anyhow!("category {x} is too large"))?;
    Ok(Category(x))
}
