use anyhow::Result;
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};

use model::{Pt2D, Trajectory};

use crate::report::Analysis;
use crate::scenario::Scenario;

/// Trajectories become LineStrings and crossings become Points. Coordinates are written exactly as
/// recorded; the scenario's `crs` just labels them.
pub fn to_geojson(
    scenario: &Scenario,
    trajectories: &[&Trajectory],
    analysis: &Analysis,
) -> GeoJson {
    let mut features = Vec::new();

    for trajectory in trajectories {
        let mut feature = new_feature(Value::LineString(
            trajectory.positions().into_iter().map(position).collect(),
        ));
        feature.set_property("type", "trajectory");
        feature.set_property("identifier", trajectory.id().0);
        feature.set_property("category", trajectory.category().0);
        feature.set_property("wrong_way", analysis.is_wrong_way(trajectory.id()));
        features.push(feature);
    }

    for t in analysis.trajectories.values() {
        for crossing in &t.crossings {
            let (pt, time) = match (crossing.event.intersection, crossing.event.time) {
                (Some(pt), Some(time)) => (pt, time),
                _ => continue,
            };
            let mut feature = new_feature(Value::Point(position(pt)));
            feature.set_property("type", "crossing");
            feature.set_property("identifier", t.identifier.0);
            feature.set_property(
                "line",
                serde_json::to_value(crossing.role).unwrap_or_default(),
            );
            feature.set_property("time", time.inner_seconds());
            feature.set_property("time_formatted", time.to_string());
            features.push(feature);
        }
    }

    let mut crs = JsonObject::new();
    crs.insert(
        "crs".to_string(),
        serde_json::json!({
            "type": "name",
            "properties": { "name": scenario.crs },
        }),
    );

    GeoJson::FeatureCollection(FeatureCollection {
        features,
        bbox: None,
        foreign_members: Some(crs),
    })
}

pub fn write_geojson(
    path: &str,
    scenario: &Scenario,
    trajectories: &[&Trajectory],
    analysis: &Analysis,
) -> Result<()> {
    let gj = to_geojson(scenario, trajectories, analysis);
    fs_err::write(path, serde_json::to_string_pretty(&gj)?)?;
    info!("Wrote {} trajectories to {}", trajectories.len(), path);
    Ok(())
}

fn new_feature(value: Value) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: None,
        foreign_members: None,
    }
}

fn position(pt: Pt2D) -> Vec<f64> {
    vec![pt.x(), pt.y()]
}
