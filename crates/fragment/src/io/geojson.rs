//! GeoJSON export of fragment outlines.
//!
//! Each fragment becomes one Polygon feature: the outer contour as the
//! exterior ring, the holes as interior rings, in canvas coordinates.
//! Useful for inspecting extraction results in any GeoJSON viewer.

use std::fs;
use std::path::Path;

use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};

use crate::{
    error::Result,
    fragment::FragmentRecord,
    project::{GroupFilter, Project},
    types::Ring,
};

fn closed_ring_positions(ring: &Ring) -> Vec<Vec<f64>> {
    let mut positions: Vec<Vec<f64>> = ring
        .iter()
        .map(|&[x, y]| vec![x as f64, y as f64])
        .collect();
    if let Some(first) = positions.first().cloned() {
        positions.push(first);
    }
    positions
}

impl FragmentRecord {
    /// Export as a GeoJSON Polygon feature with `id`, `group_id` and
    /// `note` properties. Fragments without geometry yield a feature
    /// with no geometry.
    pub fn to_geojson_feature(&self) -> Feature {
        let geometry = if self.geometry.is_empty() {
            None
        } else {
            let mut rings = vec![closed_ring_positions(&self.geometry.outer)];
            rings.extend(self.geometry.holes.iter().map(closed_ring_positions));
            Some(Geometry::new(Value::Polygon(rings)))
        };

        let mut properties = JsonObject::new();
        properties.insert("id".to_string(), self.id.into());
        properties.insert("group_id".to_string(), self.group_id.into());
        properties.insert("note".to_string(), self.note.clone().into());

        Feature {
            bbox: None,
            geometry,
            id: Some(geojson::feature::Id::Number(self.id.into())),
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

impl Project {
    /// Export every fragment's outline as a feature collection.
    pub fn to_geojson(&self) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features: self
                .fragments(GroupFilter::All)
                .map(FragmentRecord::to_geojson_feature)
                .collect(),
            foreign_members: None,
        }
    }

    /// Write the project outlines to a `.geojson` file.
    pub fn save_geojson(&self, path: impl AsRef<Path>) -> Result<()> {
        let geojson = GeoJson::FeatureCollection(self.to_geojson());
        fs::write(path, geojson.to_string())?;
        Ok(())
    }
}
