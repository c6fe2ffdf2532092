//! Cutting a whole model with a plane, optionally capping the cut.

use super::Model;
use crate::model::edge::Edge3D;
use crate::model::plane::Plane;
use crate::model::polygon::Polygon;
use crate::model::trace::{EdgeGraph, assemble_regions, nesting_depth};
use crate::model::vertex::Vertex;
use tracing::{debug, warn};

/// Outcome of [`Model::clip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipResult {
    Succeeded,
    /// Both parts were produced but the cut could not be capped.
    SucceededButFailedFillFacet,
    /// Nothing ended up on either side.
    FailedClip,
}

/// The two halves of a clipped model. An empty half is `None`.
#[derive(Debug, Clone)]
pub struct ModelClip {
    pub result: ClipResult,
    pub front: Option<Model>,
    pub back: Option<Model>,
}

impl Model {
    /// Split the current shelf by `plane` into a front and a back model.
    ///
    /// Both halves inherit this model's flags. With `fill_facet` the
    /// cross-section is closed: the back half gets caps facing along the
    /// plane normal, the front half the same caps flipped.
    pub fn clip(&self, plane: &Plane, fill_facet: bool) -> ModelClip {
        let mut front = self.empty_like();
        let mut back = self.empty_like();
        let mut boundary: Vec<Edge3D> = Vec::new();

        for polygon in self.polygons() {
            let above = polygon.vertex_count_above_plane(plane);
            if above == polygon.vertex_count() {
                push_unique(&mut front, polygon.clone());
            } else if above == 0 {
                push_unique(&mut back, polygon.clone());
            } else {
                let pieces = polygon.clip_by_plane(plane);
                for piece in pieces.front {
                    push_unique(&mut front, piece);
                }
                for piece in pieces.back {
                    push_unique(&mut back, piece);
                }
                boundary.extend(pieces.boundary_edges);
            }
        }

        let mut result = ClipResult::Succeeded;
        if fill_facet && !boundary.is_empty() {
            match generate_polygons_from_edge_list(plane, &boundary) {
                Some(caps) => {
                    for cap in caps {
                        push_unique(&mut front, cap.flipped());
                        push_unique(&mut back, cap);
                    }
                },
                None => {
                    warn!(edges = boundary.len(), "could not cap the clipped cross-section");
                    result = ClipResult::SucceededButFailedFillFacet;
                },
            }
        }

        let front = (!front.is_empty(None)).then_some(front);
        let back = (!back.is_empty(None)).then_some(back);
        if front.is_none() && back.is_none() {
            result = ClipResult::FailedClip;
        }
        debug!(?result, front = front.is_some(), back = back.is_some(), "clipped model");
        ModelClip { result, front, back }
    }
}

fn push_unique(model: &mut Model, polygon: Polygon) {
    if !polygon.is_valid() || model.query_equivalent_polygon(&polygon).is_some() {
        return;
    }
    model.polygons_mut().push(polygon);
}

/// Close the cut outline traced by `edges` with polygons on `plane`.
///
/// Loops are found without regard to edge direction; nesting parity decides
/// which are outlines and which are holes. Returns `None` when the edges do
/// not form closed loops.
pub(crate) fn generate_polygons_from_edge_list(plane: &Plane, edges: &[Edge3D]) -> Option<Vec<Polygon>> {
    let mut graph = EdgeGraph::new(*plane);
    for edge in edges {
        graph.add_undirected(&plane.project(&edge.v[0]), &plane.project(&edge.v[1]));
    }
    if graph.is_empty() || !graph.is_balanced() {
        return None;
    }

    let rings: Vec<Vec<_>> = graph
        .cycles()
        .into_iter()
        .filter(|cycle| graph.cycle_area(cycle) > 0.0)
        .map(|cycle| graph.cycle_points(&cycle))
        .collect();
    let mut outers = Vec::new();
    let mut holes = Vec::new();
    for ring in &rings {
        if nesting_depth(plane, ring, &rings) % 2 == 0 {
            outers.push(ring.clone());
        } else {
            let mut hole = ring.clone();
            hole.reverse();
            holes.push(hole);
        }
    }

    let caps: Vec<Polygon> = assemble_regions(plane, outers, holes)
        .into_iter()
        .map(|region| {
            let loops = region
                .into_iter()
                .map(|ring| ring.into_iter().map(Vertex::new).collect())
                .collect();
            let mut cap = Polygon::from_loops(*plane, loops);
            cap.reset_uvs();
            cap
        })
        .filter(Polygon::is_valid)
        .collect();
    (!caps.is_empty()).then_some(caps)
}
