use std::collections::BTreeMap;

use anyhow::{Context, Result};

use crate::{ObjectID, Pt2D, Sample, Time, Trajectory};

/// What to do with objects that have fewer than 2 samples, which can't form a path
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShortPathPolicy {
    /// Log a warning and leave the object out
    Skip,
    /// Fail the whole assembly
    Reject,
}

/// Groups samples by object and orders each group by time
pub fn assemble(
    samples: Vec<Sample>,
    policy: ShortPathPolicy,
) -> Result<BTreeMap<ObjectID, Trajectory>> {
    let mut samples_per_object: BTreeMap<ObjectID, Vec<Sample>> = BTreeMap::new();
    for sample in samples {
        samples_per_object
            .entry(sample.identifier)
            .or_insert_with(Vec::new)
            .push(sample);
    }

    let mut results = BTreeMap::new();
    for (id, mut samples) in samples_per_object {
        if samples.len() < 2 {
            match policy {
                ShortPathPolicy::Skip => {
                    warn!("Skipping object {}, which only has 1 sample", id);
                    continue;
                }
                ShortPathPolicy::Reject => {
                    bail!("Object {} only has 1 sample", id);
                }
            }
        }

        // Stable, so samples with equal times keep their input order
        samples.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));

        // The earliest sample decides the category
        let category = samples[0].category;
        if samples.iter().any(|s| s.category != category) {
            debug!("Object {} changes category; using {}", id, category);
        }

        let points = samples
            .into_iter()
            .map(|s| (Pt2D::new(s.x, s.y), Time::seconds_since_epoch(s.timestamp)))
            .collect();
        results.insert(id, Trajectory::new(id, category, points)?);
    }
    Ok(results)
}

/// Reads the CSV form and assembles trajectories from it
pub fn load_csv<R: std::io::Read>(
    reader: R,
    policy: ShortPathPolicy,
) -> Result<BTreeMap<ObjectID, Trajectory>> {
    let samples = recordings::read_csv(reader).context("reading samples")?;
    info!("Assembling trajectories from {} samples", samples.len());
    assemble(samples, policy)
}
