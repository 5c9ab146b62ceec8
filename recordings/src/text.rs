use std::io::{BufRead, BufReader, Read};

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, TimeZone, Utc};

use crate::{parse_category, parse_integral, ObjectID, Sample};

/// How the start and end times of each record are written
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeFormat {
    /// Plain seconds, like `1714557600.5`
    Seconds,
    /// `2024-05-01 10:00:00.500000`, interpreted as UTC
    DateTime,
}

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Parses every record in a text recording. Blank lines are skipped.
pub fn parse_text<R: Read>(reader: R, format: TimeFormat) -> Result<Vec<Sample>> {
    let mut samples = Vec::new();
    for (idx, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        samples.extend(parse_line(&line, format).with_context(|| format!("line {}", idx + 1))?);
    }
    Ok(samples)
}

/// Parses one record: `identifier, category, start, end, [(x, y), (x, y), ...]`.
///
/// The tracker only records the overall time span, so the points get evenly spaced timestamps:
/// point `i` of `n` happens at `start + i * (end - start) / n`.
pub fn parse_line(line: &str, format: TimeFormat) -> Result<Vec<Sample>> {
    let mut parts = line.trim().splitn(5, ", ");
    let mut next = |what: &str| {
        parts
            .next()
            .map(str::trim)
            .ok_or_else(|| anyhow!("record is missing the {what}"))
    };

    let identifier = ObjectID(parse_integral(parse_f64(next("identifier")?)?, "identifier")?);
    let category = parse_category(parse_f64(next("category")?)?)?;
    let start = parse_time(next("start time")?, format)?;
    let end = parse_time(next("end time")?, format)?;
    let points = parse_points(next("points")?)?;

    if points.is_empty() {
        bail!("object {identifier} has no points");
    }
    let interval = (end - start) / points.len() as f64;

    Ok(points
        .into_iter()
        .enumerate()
        .map(|(i, (x, y))| Sample {
            identifier,
            category,
            timestamp: start + (i as f64) * interval,
            x,
            y,
        })
        .collect())
}

fn parse_f64(raw: &str) -> Result<f64> {
    raw.parse::<f64>()
        .map_err(|err| anyhow!("bad number {raw:?}: {err}"))
}

// Returns seconds since the epoch
fn parse_time(raw: &str, format: TimeFormat) -> Result<f64> {
    let secs = match format {
        TimeFormat::Seconds => parse_f64(raw)?,
        TimeFormat::DateTime => {
            let datetime = NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT)
                .map_err(|err| anyhow!("bad date-time {raw:?}: {err}"))?;
            let micros = Utc.from_utc_datetime(&datetime).timestamp_micros();
            micros as f64 / 1_000_000.0
        }
    };
    if !secs.is_finite() {
        bail!("time {raw:?} isn't finite");
    }
    Ok(secs)
}

// Handles `[(1, 2), (3.5, 4)]`. Points may also be written as `[1, 2]`.
fn parse_points(raw: &str) -> Result<Vec<(f64, f64)>> {
    let mut rest = raw
        .trim()
        .strip_prefix('[')
        .and_then(|x| x.strip_suffix(']'))
        .ok_or_else(|| anyhow!("point list isn't wrapped in [ ]: {raw}"))?
        .trim();

    let mut points = Vec::new();
    while !rest.is_empty() {
        let close = match rest.chars().next() {
            Some('(') => ')',
            Some('[') => ']',
            _ => bail!("expected a point, found {rest:?}"),
        };
        let end = rest
            .find(close)
            .ok_or_else(|| anyhow!("unterminated point in {rest:?}"))?;
        let pair = &rest[1..end];

        let coords = pair
            .split(',')
            .map(|x| parse_f64(x.trim()))
            .collect::<Result<Vec<_>>>()?;
        if coords.len() != 2 {
            bail!("a point needs exactly 2 coordinates, not {pair:?}");
        }
        points.push((coords[0], coords[1]));

        rest = rest[end + 1..].trim_start();
        if let Some(after_comma) = rest.strip_prefix(',') {
            rest = after_comma.trim_start();
        }
    }
    Ok(points)
}
