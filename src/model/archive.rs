//! Persisted shape of a [`Model`].
//!
//! Only the Base shelf is stored; the Construction shelf holds work in
//! progress and is dropped. Loaded polygons are re-validated.

use super::{Model, ModelFlags, ShelfId};
use crate::errors::ModelError;
use crate::float_types::{Real, tolerance};
use crate::model::plane::Plane;
use crate::model::polygon::{Polygon, PolygonRecord};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArchive {
    polygons: Vec<PolygonRecord>,
    #[serde(default)]
    flags: ModelFlags,
    #[serde(default)]
    subdivision_level: u32,
    mirror_normal: Vector3<Real>,
    mirror_distance: Real,
}

impl From<Model> for ModelArchive {
    fn from(model: Model) -> Self {
        let [base, _] = model.shelves;
        ModelArchive {
            polygons: base.into_iter().map(PolygonRecord::from).collect(),
            flags: model.flags,
            subdivision_level: model.subdivision_level,
            mirror_normal: model.mirror_plane.normal,
            mirror_distance: model.mirror_plane.w,
        }
    }
}

impl TryFrom<ModelArchive> for Model {
    type Error = ModelError;

    fn try_from(archive: ModelArchive) -> Result<Self, Self::Error> {
        let polygons = archive
            .polygons
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                Polygon::try_from(record).map_err(|source| ModelError::InvalidPolygon { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let mut model = Model::new();
        model.shelves[ShelfId::Base.index()] = polygons;
        model.flags = archive.flags;
        model.subdivision_level = archive.subdivision_level;
        let mirror = Plane {
            normal: archive.mirror_normal,
            w: archive.mirror_distance,
        };
        // stored planes are already unit length; only repair hand-edited ones
        model.mirror_plane = if (mirror.normal.norm() - 1.0).abs() < tolerance() {
            mirror
        } else {
            Plane::from_normal(mirror.normal, mirror.w)
        };
        Ok(model)
    }
}

impl Model {
    /// Serialize the Base shelf and model settings to JSON.
    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string(&ModelArchive::from(self.clone()))?)
    }

    /// Restore a model written by [`to_json`](Self::to_json).
    pub fn from_json(json: &str) -> Result<Model, ModelError> {
        let archive: ModelArchive = serde_json::from_str(json)?;
        Model::try_from(archive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ValidationError;
    use nalgebra::Point3;

    #[test]
    fn construction_shelf_is_not_persisted() {
        let square = Polygon::from_points(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]);
        let mut model = Model::from_polygons([square.clone()]);
        model.with_shelf(ShelfId::Construction, |m| m.add_polygon(square.flipped(), false));
        let restored = Model::from_json(&model.to_json().expect("serialize")).expect("deserialize");
        assert_eq!(restored.polygons_on(ShelfId::Base), model.polygons_on(ShelfId::Base));
        assert!(restored.is_empty(Some(ShelfId::Construction)));
    }

    #[test]
    fn non_planar_polygon_is_rejected() {
        let json = r#"{
            "polygons": [{
                "plane": {"normal": [0.0, 0.0, 1.0], "w": 0.0},
                "vertices": [
                    {"pos": [0.0, 0.0, 0.0], "uv": [0.0, 0.0]},
                    {"pos": [1.0, 0.0, 0.0], "uv": [0.0, 0.0]},
                    {"pos": [1.0, 1.0, 5.0], "uv": [0.0, 0.0]}
                ],
                "edges": [[0, 1], [1, 2], [2, 0]],
                "id": "0000000000000000000000000000002a"
            }],
            "mirror_normal": [1.0, 0.0, 0.0],
            "mirror_distance": 0.0
        }"#;
        match Model::from_json(json) {
            Err(ModelError::InvalidPolygon { index: 0, source }) => {
                assert!(matches!(source, ValidationError::NonPlanar { .. }));
            },
            other => panic!("unexpected {other:?}"),
        }
    }
}
