use super::{Model, ModelFlags};
use crate::model::plane::{FRONT, SPANNING};
use crate::model::polygon::{Polygon, PolygonFlags};

impl Model {
    /// Regenerate the reflected half of a mirrored model.
    ///
    /// Drops every [`PolygonFlags::MIRRORED`] polygon, then reflects the
    /// front side of each closed source polygon across the mirror plane.
    /// Source vertices are renumbered and each reflected vertex carries the
    /// [`Vertex::id`](crate::model::vertex::Vertex::id) of the vertex it was
    /// reflected from; vertices created on the mirror plane have none.
    /// Does nothing unless [`ModelFlags::MIRROR`] is set.
    pub fn update_mirrored_part(&mut self) {
        if !self.check_flags(ModelFlags::MIRROR) {
            return;
        }
        let plane = self.mirror_plane;
        self.remove_polygons_with_flags(PolygonFlags::MIRRORED);

        // a reflected vertex shares its source's tag
        let mut next = 0;
        for polygon in self.polygons_mut().iter_mut().filter(|p| !p.is_open()) {
            polygon.tag_vertices(&mut next);
        }

        let mut reflected = Vec::new();
        for polygon in self.polygons() {
            if polygon.is_open() {
                continue;
            }
            let sources: Vec<Polygon> = match polygon.classify(&plane) {
                FRONT => vec![polygon.clone()],
                SPANNING => polygon.clip_by_plane(&plane).front,
                _ => continue,
            };
            for mut piece in sources {
                piece.mirror(&plane);
                piece.new_id();
                reflected.push(piece);
            }
        }
        self.polygons_mut().extend(reflected);
    }
}
