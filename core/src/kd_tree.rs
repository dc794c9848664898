//! Point k-d tree.

use crate::geometry::*;
use crate::pbrt::*;
use ordered_float::OrderedFloat;
use std::collections::BinaryHeap;

/// Interface for point records stored in a `KdTree`.
pub trait KdTreePoint {
    /// Returns the position of the record.
    fn position(&self) -> Point3f;
}

/// Axis values 0-2 mark an interior node; 3 marks a leaf.
const LEAF_FLAG: u32 = 3;

/// Bit 2 records whether the node has a left child (always at `index + 1`).
const HAS_LEFT_CHILD: u32 = 1 << 2;

/// The right child index occupies the remaining 29 bits.
const NO_RIGHT_CHILD: u32 = (1 << 29) - 1;

/// A tree node: the split coordinate plus packed flags. The node's own data
/// record lives at the same index in the data array.
#[derive(Copy, Clone)]
struct KdNode {
    split_pos: Float,
    flags: u32,
}

impl KdNode {
    /// Creates an interior node with no children linked yet.
    ///
    /// * `split_pos` - Coordinate of the splitting plane.
    /// * `axis`      - The split axis.
    fn interior(split_pos: Float, axis: Axis) -> Self {
        Self {
            split_pos,
            flags: usize::from(axis) as u32 | (NO_RIGHT_CHILD << 3),
        }
    }

    /// Creates a leaf node.
    fn leaf() -> Self {
        Self {
            split_pos: 0.0,
            flags: LEAF_FLAG | (NO_RIGHT_CHILD << 3),
        }
    }

    fn is_leaf(&self) -> bool {
        self.flags & 3 == LEAF_FLAG
    }

    fn split_axis(&self) -> Axis {
        Axis::from((self.flags & 3) as usize)
    }

    fn has_left_child(&self) -> bool {
        self.flags & HAS_LEFT_CHILD != 0
    }

    fn right_child(&self) -> u32 {
        self.flags >> 3
    }

    fn set_has_left_child(&mut self) {
        self.flags |= HAS_LEFT_CHILD;
    }

    fn set_right_child(&mut self, index: u32) {
        debug_assert!(index < NO_RIGHT_CHILD);
        self.flags = (self.flags & 7) | (index << 3);
    }
}

/// An immutable balanced k-d tree over point records, supporting
/// radius-bounded k-nearest-neighbor queries with a caller-supplied
/// acceptance predicate.
pub struct KdTree<P> {
    nodes: Vec<KdNode>,
    data: Vec<P>,
}

impl<P: KdTreePoint + Copy> KdTree<P> {
    /// Builds a tree over the given records. Splits at the median along the
    /// longest bounding-box axis.
    ///
    /// * `points` - The records to index.
    pub fn new(mut points: Vec<P>) -> Self {
        let n = points.len();
        let mut tree = Self {
            nodes: Vec::with_capacity(n),
            data: Vec::with_capacity(n),
        };
        if n > 0 {
            tree.recursive_build(&mut points[..]);
        }
        tree
    }

    /// Returns the number of stored records.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Returns all stored records in tree order.
    pub fn points(&self) -> &[P] {
        &self.data
    }

    /// Returns the record at the given index.
    ///
    /// * `i` - Index as returned by a lookup.
    pub fn point(&self, i: usize) -> &P {
        &self.data[i]
    }

    /// Returns a mutable reference to the record at the given index.
    ///
    /// * `i` - Index as returned by a lookup.
    pub fn point_mut(&mut self, i: usize) -> &mut P {
        &mut self.data[i]
    }

    /// Finds up to `k` nearest records around `p` that pass the filter and
    /// lie within the squared search radius. Returns the record indices with
    /// their squared distances, and the squared radius that bounds the
    /// result set (shrunk to the farthest accepted record when `k` were
    /// found, the initial radius otherwise).
    ///
    /// * `p`           - The query position.
    /// * `k`           - Number of neighbors wanted.
    /// * `max_dist_sq` - Initial squared search radius.
    /// * `filter`      - Acceptance predicate.
    pub fn lookup<F>(&self, p: &Point3f, k: usize, max_dist_sq: Float, filter: F) -> (Vec<(usize, Float)>, Float)
    where
        F: Fn(&P) -> bool,
    {
        if self.nodes.is_empty() || k == 0 || max_dist_sq <= 0.0 {
            return (Vec::new(), max_dist_sq);
        }

        let mut heap: BinaryHeap<(OrderedFloat<Float>, u32)> = BinaryHeap::with_capacity(k + 1);
        let mut md2 = max_dist_sq;
        self.lookup_node(0, p, k, &mut md2, &filter, &mut heap);

        let radius_sq = if heap.len() == k { md2 } else { max_dist_sq };
        let found = heap.into_iter().map(|(d, i)| (i as usize, d.0)).collect();
        (found, radius_sq)
    }

    /// Finds the single nearest record around `p` that passes the filter,
    /// within the squared search radius.
    ///
    /// * `p`           - The query position.
    /// * `max_dist_sq` - Squared search radius.
    /// * `filter`      - Acceptance predicate.
    pub fn nearest<F>(&self, p: &Point3f, max_dist_sq: Float, filter: F) -> Option<(usize, Float)>
    where
        F: Fn(&P) -> bool,
    {
        let (found, _) = self.lookup(p, 1, max_dist_sq, filter);
        found.into_iter().next()
    }

    /// Builds the subtree for the given records; the chosen median record
    /// becomes the node, left subtree immediately follows it in the arrays.
    ///
    /// * `items` - The records of this subtree.
    fn recursive_build(&mut self, items: &mut [P]) {
        if items.len() == 1 {
            self.nodes.push(KdNode::leaf());
            self.data.push(items[0]);
            return;
        }

        // Split along the longest axis of the records' bounding box.
        let bounds = items
            .iter()
            .fold(Bounds3f::default(), |b, p| b.union_point(&p.position()));
        let axis = bounds.maximum_extent();

        let median = items.len() / 2;
        order_stat::kth_by(items, median, |a, b| {
            OrderedFloat(a.position()[axis]).cmp(&OrderedFloat(b.position()[axis]))
        });

        let node_num = self.nodes.len();
        self.nodes.push(KdNode::interior(items[median].position()[axis], axis));
        self.data.push(items[median]);

        let (left, rest) = items.split_at_mut(median);
        let right = &mut rest[1..];

        if !left.is_empty() {
            self.nodes[node_num].set_has_left_child();
            self.recursive_build(left);
        }
        if !right.is_empty() {
            let right_num = self.nodes.len() as u32;
            self.nodes[node_num].set_right_child(right_num);
            self.recursive_build(right);
        }
    }

    fn lookup_node<F>(
        &self,
        node_num: usize,
        p: &Point3f,
        k: usize,
        max_dist_sq: &mut Float,
        filter: &F,
        heap: &mut BinaryHeap<(OrderedFloat<Float>, u32)>,
    ) where
        F: Fn(&P) -> bool,
    {
        // Process this node's own record.
        let d2 = self.data[node_num].position().distance_squared(p);
        if d2 < *max_dist_sq && filter(&self.data[node_num]) {
            heap.push((OrderedFloat(d2), node_num as u32));
            if heap.len() > k {
                heap.pop();
                // Once k records are held the search radius shrinks to the
                // farthest of them.
                if let Some(&(d, _)) = heap.peek() {
                    *max_dist_sq = d.0;
                }
            }
        }

        let node = &self.nodes[node_num];
        if node.is_leaf() {
            return;
        }

        let axis = node.split_axis();
        let plane_dist_sq = (p[axis] - node.split_pos) * (p[axis] - node.split_pos);

        // Descend the near side first; the far side only if the search
        // sphere still straddles the splitting plane.
        if p[axis] <= node.split_pos {
            if node.has_left_child() {
                self.lookup_node(node_num + 1, p, k, max_dist_sq, filter, heap);
            }
            if plane_dist_sq < *max_dist_sq && node.right_child() != NO_RIGHT_CHILD {
                self.lookup_node(node.right_child() as usize, p, k, max_dist_sq, filter, heap);
            }
        } else {
            if node.right_child() != NO_RIGHT_CHILD {
                self.lookup_node(node.right_child() as usize, p, k, max_dist_sq, filter, heap);
            }
            if plane_dist_sq < *max_dist_sq && node.has_left_child() {
                self.lookup_node(node_num + 1, p, k, max_dist_sq, filter, heap);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RNG;

    #[derive(Copy, Clone)]
    struct TestPoint {
        p: Point3f,
        tag: usize,
    }

    impl KdTreePoint for TestPoint {
        fn position(&self) -> Point3f {
            self.p
        }
    }

    fn random_points(n: usize, seed: u64) -> Vec<TestPoint> {
        let mut rng = RNG::new(seed);
        (0..n)
            .map(|tag| TestPoint {
                p: Point3f::new(rng.uniform_float(), rng.uniform_float(), rng.uniform_float()),
                tag,
            })
            .collect()
    }

    fn brute_force_knn(points: &[TestPoint], p: &Point3f, k: usize, max_dist_sq: Float) -> Vec<Float> {
        let mut dists: Vec<Float> = points
            .iter()
            .map(|tp| tp.p.distance_squared(p))
            .filter(|&d| d < max_dist_sq)
            .collect();
        dists.sort_by(|a, b| OrderedFloat(*a).cmp(&OrderedFloat(*b)));
        dists.truncate(k);
        dists
    }

    #[test]
    fn knn_matches_brute_force() {
        let points = random_points(500, 17);
        let tree = KdTree::new(points.clone());
        let mut rng = RNG::new(99);

        for _ in 0..50 {
            let q = Point3f::new(rng.uniform_float(), rng.uniform_float(), rng.uniform_float());
            let (found, _) = tree.lookup(&q, 8, INFINITY, |_| true);
            let mut got: Vec<Float> = found.iter().map(|&(_, d)| d).collect();
            got.sort_by(|a, b| OrderedFloat(*a).cmp(&OrderedFloat(*b)));

            let expected = brute_force_knn(&points, &q, 8, INFINITY);
            assert_eq!(got.len(), expected.len());
            for (g, e) in got.iter().zip(expected.iter()) {
                assert_eq!(g, e);
            }
        }
    }

    #[test]
    fn radius_bound_is_respected() {
        let points = random_points(200, 23);
        let tree = KdTree::new(points);
        let q = Point3f::new(0.5, 0.5, 0.5);
        let (found, radius_sq) = tree.lookup(&q, 1000, 0.01, |_| true);
        assert_eq!(radius_sq, 0.01);
        for (_, d2) in found {
            assert!(d2 < 0.01);
        }
    }

    #[test]
    fn predicate_filters_records() {
        let points = random_points(200, 31);
        let tree = KdTree::new(points);
        let q = Point3f::new(0.5, 0.5, 0.5);
        let (found, _) = tree.lookup(&q, 16, INFINITY, |tp| tp.tag % 2 == 0);
        assert!(!found.is_empty());
        for (i, _) in found {
            assert_eq!(tree.point(i).tag % 2, 0);
        }
    }

    #[test]
    fn nearest_returns_closest_record() {
        let points = random_points(300, 41);
        let tree = KdTree::new(points.clone());
        let q = Point3f::new(0.25, 0.75, 0.5);

        let expected = brute_force_knn(&points, &q, 1, INFINITY)[0];
        let (i, d2) = tree.nearest(&q, INFINITY, |_| true).unwrap();
        assert_eq!(d2, expected);
        assert_eq!(tree.point(i).p.distance_squared(&q), expected);
    }

    #[test]
    fn empty_tree_lookup_is_empty() {
        let tree: KdTree<TestPoint> = KdTree::new(Vec::new());
        let (found, _) = tree.lookup(&Point3f::ZERO, 4, INFINITY, |_| true);
        assert!(found.is_empty());
        assert_eq!(tree.size(), 0);
    }
}
