use std::io::{Read, Write};

use anyhow::Result;
use serde::Deserialize;

use crate::{parse_category, parse_integral, ObjectID, Sample};

/// Writes samples with the header `identifier,category,timestamp,x,y`
pub fn write_csv<W: Write>(writer: W, samples: &[Sample]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for sample in samples {
        writer.serialize(sample)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_csv<R: Read>(reader: R) -> Result<Vec<Sample>> {
    let mut samples = Vec::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Record = rec?;
        samples.push(Sample {
            identifier: ObjectID(parse_integral(rec.identifier, "identifier")?),
            category: parse_category(rec.category)?,
            timestamp: rec.timestamp,
            x: rec.x,
            y: rec.y,
        });
    }
    debug!("Read {} samples", samples.len());
    Ok(samples)
}

#[derive(Deserialize)]
struct Record {
    // Older exports wrote these as floats
    identifier: f64,
    category: f64,
    timestamp: f64,
    x: f64,
    y: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_text, Category, TimeFormat};

    #[test]
    fn text_to_table() {
        let samples = parse_text(
            "4, 1, 10, 12, [(0.5, 1), (2, 3)]\n9, 3, 0, 1, [(7, 8), (9, 10)]\n".as_bytes(),
            TimeFormat::Seconds,
        )
        .unwrap();

        let mut out = Vec::new();
        write_csv(&mut out, &samples).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("identifier,category,timestamp,x,y"));
        assert_eq!(lines.next(), Some("4,1,10.0,0.5,1.0"));
        assert_eq!(lines.count(), 3);

        assert_eq!(read_csv(text.as_bytes()).unwrap(), samples);
    }

    #[test]
    fn reads_float_identifiers() {
        let input = "identifier,category,timestamp,x,y\n3.0,2.0,1.5,10,20\n";
        let samples = read_csv(input.as_bytes()).unwrap();
        assert_eq!(
            samples,
            vec![Sample {
                identifier: ObjectID(3),
                category: Category(2),
                timestamp: 1.5,
                x: 10.0,
                y: 20.0,
            }]
        );
    }

    #[test]
    fn rejects_fractional_category() {
        let input = "identifier,category,timestamp,x,y\n3,2.5,1.5,10,20\n";
        assert!(read_csv(input.as_bytes()).is_err());
    }
}
