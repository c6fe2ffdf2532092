//! Splitter selection for [`BspTree3D`](super::BspTree3D) builds.

use crate::float_types::Real;
use crate::model::plane::{BACK, COPLANAR, FRONT};
use crate::model::polygon::Polygon;

/// Trait for picking the splitting polygon of a node
pub trait SplittingPolygonStrategy {
    /// Index into `polygons` of the polygon whose plane splits this node.
    /// `polygons` is never empty.
    fn choose_splitting_polygon(&self, polygons: &[Polygon]) -> usize;
}

/// Always split on the first polygon.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstPolygonStrategy;

impl SplittingPolygonStrategy for FirstPolygonStrategy {
    fn choose_splitting_polygon(&self, _polygons: &[Polygon]) -> usize {
        0
    }
}

/// Default strategy: penalise spanning polygons and front/back imbalance
/// over a bounded sample of candidates.
#[derive(Debug, Clone, Copy)]
pub struct BalancedSplittingStrategy {
    pub span_weight: Real,
    pub balance_weight: Real,
    pub sample_size: usize,
}

impl Default for BalancedSplittingStrategy {
    fn default() -> Self {
        Self {
            span_weight: 8.0,
            balance_weight: 1.0,
            sample_size: 20,
        }
    }
}

impl SplittingPolygonStrategy for BalancedSplittingStrategy {
    fn choose_splitting_polygon(&self, polygons: &[Polygon]) -> usize {
        let sample_size = polygons.len().min(self.sample_size.max(1));
        let stride = (polygons.len() / sample_size).max(1);

        let mut best = 0;
        let mut best_score = Real::MAX;
        for candidate in (0..polygons.len()).step_by(stride).take(sample_size) {
            let plane = polygons[candidate].plane();
            let (num_front, num_back, num_spanning) = polygons
                .iter()
                .map(|poly| match poly.classify(plane) {
                    COPLANAR => (0, 0, 0),
                    FRONT => (1, 0, 0),
                    BACK => (0, 1, 0),
                    _ => (0, 0, 1),
                })
                .fold((0i64, 0i64, 0i64), |acc, x| (acc.0 + x.0, acc.1 + x.1, acc.2 + x.2));

            let score = self.span_weight * num_spanning as Real
                + self.balance_weight * ((num_front - num_back) as Real).abs();
            if score < best_score {
                best_score = score;
                best = candidate;
            }
        }
        best
    }
}
