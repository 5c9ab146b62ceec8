use anyhow::Result;

use crate::{Bounds, Category, ObjectID, Pt2D, Time};

/// The path of one tracked object. Always has at least 2 samples, ordered by time, with finite
/// positions and times.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    id: ObjectID,
    category: Category,
    // TODO Figure out how to represent/compress staying in the same position for a long time
    inner: Vec<(Pt2D, Time)>,
}

impl Trajectory {
    pub fn new(id: ObjectID, category: Category, raw: Vec<(Pt2D, Time)>) -> Result<Self> {
        if raw.len() < 2 {
            bail!("Trajectory {} doesn't have at least 2 points", id);
        }
        for (pos, time) in &raw {
            if !pos.is_finite() || !time.is_finite() {
                bail!("Trajectory {} has a bad sample: {:?} at {:?}", id, pos, time);
            }
        }
        for pair in raw.windows(2) {
            if pair[0].1 > pair[1].1 {
                bail!(
                    "Trajectory {} input out-of-order: {} then {}",
                    id,
                    pair[0].1,
                    pair[1].1
                );
            }
        }
        Ok(Self {
            id,
            category,
            inner: raw,
        })
    }

    pub fn id(&self) -> ObjectID {
        self.id
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn positions(&self) -> Vec<Pt2D> {
        self.inner.iter().map(|(pos, _)| *pos).collect()
    }

    pub fn start_time(&self) -> Time {
        self.inner[0].1
    }

    pub fn end_time(&self) -> Time {
        self.inner[self.inner.len() - 1].1
    }

    pub fn bounds(&self) -> Bounds {
        let mut bounds = Bounds::new();
        for (pos, _) in &self.inner {
            bounds.update(*pos);
        }
        bounds
    }

    /// The time of the sample closest to `pt`. When several samples are equally close, the
    /// earliest one wins.
    pub fn nearest_sample_time(&self, pt: Pt2D) -> Time {
        let (first_pos, first_time) = self.inner[0];
        let mut closest_distance = first_pos.dist_to(pt);
        let mut closest_time = first_time;
        for (pos, time) in &self.inner[1..] {
            let distance = pos.dist_to(pt);
            if distance < closest_distance {
                closest_distance = distance;
                closest_time = *time;
            }
        }
        closest_time
    }
}
