//! 2D k-d tree over sample locations.
//!
//! Nearest-neighbour queries break distance ties deterministically: among
//! samples at exactly the same distance the one with the lowest index wins,
//! i.e. the one encountered first in the input.

use survey_common::SamplePoint;

/// A 2D k-d tree for nearest-sample lookups.
#[derive(Debug)]
pub struct KdTree {
    nodes: Vec<KdNode>,
    points: Vec<SamplePoint>,
}

#[derive(Debug)]
struct KdNode {
    /// Index into `points`
    point_idx: usize,
    /// Split dimension: 0 = x, 1 = y
    split_dim: u8,
    left: Option<usize>,
    right: Option<usize>,
}

/// Result of a nearest-neighbour query.
#[derive(Debug, Clone, Copy)]
pub struct Nearest {
    pub point: SamplePoint,
    pub distance_sq: f64,
    /// Index of the sample in the slice the tree was built from.
    pub index: usize,
}

impl KdTree {
    /// Build a tree by median splitting, alternating X and Y.
    pub fn build(points: &[SamplePoint]) -> Self {
        let mut nodes = Vec::with_capacity(points.len());
        if !points.is_empty() {
            let mut indices: Vec<usize> = (0..points.len()).collect();
            build_recursive(points, &mut indices, 0, &mut nodes);
        }
        Self {
            nodes,
            points: points.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Closest sample to `(qx, qy)`; `None` if the tree is empty.
    pub fn nearest(&self, qx: f64, qy: f64) -> Option<Nearest> {
        if self.nodes.is_empty() {
            return None;
        }

        let mut best = (f64::INFINITY, usize::MAX);
        self.nearest_recursive(0, qx, qy, &mut best);

        let (distance_sq, index) = best;
        Some(Nearest {
            point: self.points[index],
            distance_sq,
            index,
        })
    }

    fn nearest_recursive(&self, node_idx: usize, qx: f64, qy: f64, best: &mut (f64, usize)) {
        let node = &self.nodes[node_idx];
        let p = &self.points[node.point_idx];

        let dx = qx - p.x;
        let dy = qy - p.y;
        let dist_sq = dx * dx + dy * dy;

        if dist_sq < best.0 || (dist_sq == best.0 && node.point_idx < best.1) {
            *best = (dist_sq, node.point_idx);
        }

        let diff = if node.split_dim == 0 { dx } else { dy };
        let (first, second) = if diff < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        if let Some(child) = first {
            self.nearest_recursive(child, qx, qy, best);
        }

        // `<=` so an equally distant sample with a lower index is still found.
        if diff * diff <= best.0 {
            if let Some(child) = second {
                self.nearest_recursive(child, qx, qy, best);
            }
        }
    }
}

fn build_recursive(
    points: &[SamplePoint],
    indices: &mut [usize],
    depth: usize,
    nodes: &mut Vec<KdNode>,
) -> usize {
    let split_dim = (depth % 2) as u8;
    let coord = |i: usize| if split_dim == 0 { points[i].x } else { points[i].y };

    indices.sort_by(|&a, &b| coord(a).total_cmp(&coord(b)));

    let median = indices.len() / 2;
    let node_idx = nodes.len();
    nodes.push(KdNode {
        point_idx: indices[median],
        split_dim,
        left: None,
        right: None,
    });

    let (left, rest) = indices.split_at_mut(median);
    let right = &mut rest[1..];

    if !left.is_empty() {
        let child = build_recursive(points, left, depth + 1, nodes);
        nodes[node_idx].left = Some(child);
    }
    if !right.is_empty() {
        let child = build_recursive(points, right, depth + 1, nodes);
        nodes[node_idx].right = Some(child);
    }

    node_idx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_force(points: &[SamplePoint], qx: f64, qy: f64) -> usize {
        let mut best = (f64::INFINITY, 0);
        for (i, p) in points.iter().enumerate() {
            let d = p.dist_sq(qx, qy);
            if d < best.0 {
                best = (d, i);
            }
        }
        best.1
    }

    #[test]
    fn test_empty_tree() {
        let tree = KdTree::build(&[]);
        assert!(tree.is_empty());
        assert!(tree.nearest(0.0, 0.0).is_none());
    }

    #[test]
    fn test_matches_brute_force() {
        let points: Vec<SamplePoint> = (0..97)
            .map(|i| {
                let t = i as f64;
                SamplePoint::new((t * 7.31).sin() * 50.0, (t * 3.17).cos() * 30.0, t)
            })
            .collect();
        let tree = KdTree::build(&points);
        assert_eq!(tree.len(), 97);

        for q in 0..50 {
            let qx = (q as f64 * 1.3).cos() * 55.0;
            let qy = (q as f64 * 0.7).sin() * 35.0;
            let found = tree.nearest(qx, qy).unwrap();
            assert_eq!(found.index, brute_force(&points, qx, qy));
        }
    }

    #[test]
    fn test_ties_resolve_to_lowest_index() {
        // Four samples at the same distance from the origin, listed so the
        // median split puts the lowest index deep in the tree.
        let points = vec![
            SamplePoint::new(0.0, -1.0, 10.0),
            SamplePoint::new(1.0, 0.0, 20.0),
            SamplePoint::new(-1.0, 0.0, 30.0),
            SamplePoint::new(0.0, 1.0, 40.0),
        ];
        let tree = KdTree::build(&points);
        let found = tree.nearest(0.0, 0.0).unwrap();
        assert_eq!(found.index, 0);
        assert_eq!(found.point.value, 10.0);
        assert_eq!(found.distance_sq, 1.0);
    }
}
