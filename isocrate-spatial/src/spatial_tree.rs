//! Median-split k-d tree over a caller-ordered collection
//!
//! Elements are appended to a backing collection and the tree is rebuilt
//! wholesale from it. Each level sorts its slice of elements along
//! `depth % max_dimensions`, stores the middle element in the node and
//! recurses on the elements strictly before and strictly after it.

use crate::compare::AxisCompare;
use isocrate_core::{Error, Result};

/// Default number of axes the tree cycles through
pub const DEFAULT_DIMENSIONS: usize = 3;

/// One node of a built tree
#[derive(Debug, Clone)]
pub struct TreeNode<T> {
    value: T,
    axis: usize,
    left: Option<Box<TreeNode<T>>>,
    right: Option<Box<TreeNode<T>>>,
}

impl<T> TreeNode<T> {
    /// The median element stored at this node
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Axis this node split its elements on
    pub fn axis(&self) -> usize {
        self.axis
    }

    /// Subtree of elements ordered at or before this node on `axis`
    pub fn left(&self) -> Option<&TreeNode<T>> {
        self.left.as_deref()
    }

    /// Subtree of elements ordered at or after this node on `axis`
    pub fn right(&self) -> Option<&TreeNode<T>> {
        self.right.as_deref()
    }

    fn depth(&self) -> usize {
        let left = self.left().map_or(0, TreeNode::depth);
        let right = self.right().map_or(0, TreeNode::depth);
        1 + left.max(right)
    }
}

/// Which children [`SpatialTree::walk`] should continue into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Descend {
    Both,
    Left,
    Right,
    Neither,
}

/// Generic k-d tree built from a backing collection with a per-axis comparator.
///
/// The tree starts unbuilt (no root). Adding elements never changes the built
/// tree unless a rebuild is requested; [`build_tree`](Self::build_tree)
/// discards any previous nodes and partitions the current collection.
#[derive(Debug, Clone)]
pub struct SpatialTree<T, C> {
    elements: Vec<T>,
    root: Option<Box<TreeNode<T>>>,
    comparator: C,
    max_dimensions: usize,
}

impl<T, C> SpatialTree<T, C>
where
    T: Clone,
    C: AxisCompare<T>,
{
    /// Create an empty tree cycling through three axes
    pub fn new(comparator: C) -> Self {
        Self {
            elements: Vec::new(),
            root: None,
            comparator,
            max_dimensions: DEFAULT_DIMENSIONS,
        }
    }

    /// Create an empty tree cycling through `max_dimensions` axes
    pub fn with_dimensions(comparator: C, max_dimensions: usize) -> Result<Self> {
        if max_dimensions == 0 {
            return Err(Error::InvalidData(
                "Spatial tree needs at least one axis".to_string(),
            ));
        }

        Ok(Self {
            max_dimensions,
            ..Self::new(comparator)
        })
    }

    /// Append one element, optionally rebuilding the tree
    pub fn add_element(&mut self, item: T, rebuild: bool) {
        self.elements.push(item);
        if rebuild {
            self.build_tree();
        }
    }

    /// Append many elements, optionally rebuilding the tree once at the end
    pub fn add_element_range<I>(&mut self, items: I, rebuild: bool)
    where
        I: IntoIterator<Item = T>,
    {
        self.elements.extend(items);
        if rebuild {
            self.build_tree();
        }
    }

    /// Rebuild the whole tree from the backing collection.
    ///
    /// An empty collection leaves the tree unbuilt.
    pub fn build_tree(&mut self) {
        self.root = self.build_node(self.elements.clone(), 0);
        log::debug!(
            "Built spatial tree over {} elements (depth {})",
            self.elements.len(),
            self.depth()
        );
    }

    fn build_node(&self, mut items: Vec<T>, depth: usize) -> Option<Box<TreeNode<T>>> {
        if items.is_empty() {
            return None;
        }

        let axis = depth % self.max_dimensions;
        // Stable, so equal keys keep insertion order around the median
        items.sort_by(|a, b| self.comparator.compare(a, b, axis));

        let median = items.len() / 2;
        let after = items.split_off(median + 1);
        let value = items.pop()?;

        Some(Box::new(TreeNode {
            value,
            axis,
            left: self.build_node(items, depth + 1),
            right: self.build_node(after, depth + 1),
        }))
    }
}

impl<T, C> SpatialTree<T, C> {
    /// Root of the built tree, `None` while unbuilt
    pub fn root(&self) -> Option<&TreeNode<T>> {
        self.root.as_deref()
    }

    /// Comparator the tree was built with
    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Number of axes the split cycles through
    pub fn max_dimensions(&self) -> usize {
        self.max_dimensions
    }

    /// Backing collection, including elements added since the last build
    pub fn elements(&self) -> &[T] {
        &self.elements
    }

    /// Number of elements in the backing collection
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Whether a root exists
    pub fn is_built(&self) -> bool {
        self.root.is_some()
    }

    /// Longest root-to-leaf path, zero while unbuilt
    pub fn depth(&self) -> usize {
        self.root().map_or(0, TreeNode::depth)
    }

    /// Number of nodes in the built tree
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Drop all elements and nodes
    pub fn clear(&mut self) {
        self.elements.clear();
        self.root = None;
    }

    /// Pre-order iteration over node values of the built tree
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            stack: self.root().into_iter().collect(),
        }
    }

    /// Pre-order traversal where `visit` decides which children to enter.
    ///
    /// This is the hook for range style queries: a visitor compares its query
    /// against `node.value()` on `node.axis()` and prunes the side that cannot
    /// contain matches.
    pub fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(&TreeNode<T>) -> Descend,
    {
        let mut stack: Vec<&TreeNode<T>> = self.root().into_iter().collect();

        while let Some(node) = stack.pop() {
            let descend = visit(node);
            if matches!(descend, Descend::Both | Descend::Right) {
                stack.extend(node.right());
            }
            if matches!(descend, Descend::Both | Descend::Left) {
                stack.extend(node.left());
            }
        }
    }
}

/// Iterator returned by [`SpatialTree::iter`]
pub struct Iter<'a, T> {
    stack: Vec<&'a TreeNode<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.right());
        self.stack.extend(node.left());
        Some(node.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::CoordinateCompare;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::cmp::Ordering;

    fn random_points(count: usize, seed: u64) -> Vec<[f32; 3]> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count)
            .map(|_| std::array::from_fn(|_| rng.gen_range(-10.0..10.0)))
            .collect()
    }

    fn collect_subtree<'a, T>(node: Option<&'a TreeNode<T>>, out: &mut Vec<&'a T>) {
        if let Some(node) = node {
            out.push(node.value());
            collect_subtree(node.left(), out);
            collect_subtree(node.right(), out);
        }
    }

    fn assert_partitioned<T, C: AxisCompare<T>>(node: &TreeNode<T>, cmp: &C) {
        let mut left = Vec::new();
        collect_subtree(node.left(), &mut left);
        for value in left {
            assert_ne!(cmp.compare(value, node.value(), node.axis()), Ordering::Greater);
        }

        let mut right = Vec::new();
        collect_subtree(node.right(), &mut right);
        for value in right {
            assert_ne!(cmp.compare(value, node.value(), node.axis()), Ordering::Less);
        }

        for child in node.left().into_iter().chain(node.right()) {
            assert_partitioned(child, cmp);
        }
    }

    #[test]
    fn test_empty_build_is_noop() {
        let mut tree: SpatialTree<[f32; 3], _> = SpatialTree::new(CoordinateCompare);
        tree.build_tree();

        assert!(!tree.is_built());
        assert!(tree.root().is_none());
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.node_count(), 0);
    }

    #[test]
    fn test_add_without_rebuild_stays_unbuilt() {
        let mut tree: SpatialTree<[f32; 3], _> = SpatialTree::new(CoordinateCompare);
        tree.add_element([1.0, 2.0, 3.0], false);

        assert_eq!(tree.len(), 1);
        assert!(!tree.is_built());

        tree.add_element([0.0, 0.0, 0.0], true);
        assert!(tree.is_built());
        assert_eq!(tree.node_count(), 2);
    }

    #[test]
    fn test_every_element_becomes_one_node() {
        let points = random_points(257, 7);
        let mut tree = SpatialTree::new(CoordinateCompare);
        tree.add_element_range(points.clone(), true);

        let mut visited: Vec<[f32; 3]> = tree.iter().copied().collect();
        let mut expected = points;
        let key = |p: &[f32; 3]| (p[0].to_bits(), p[1].to_bits(), p[2].to_bits());
        visited.sort_by_key(key);
        expected.sort_by_key(key);

        assert_eq!(visited, expected);
    }

    #[test]
    fn test_subtrees_respect_split_axis() {
        let mut tree = SpatialTree::new(CoordinateCompare);
        tree.add_element_range(random_points(200, 42), true);

        let root = tree.root().expect("tree should be built");
        assert_partitioned(root, tree.comparator());
    }

    #[test]
    fn test_ties_partition_correctly() {
        let points: Vec<[f32; 3]> = (0..31)
            .map(|i| [(i % 3) as f32, 1.0, (i % 2) as f32])
            .collect();
        let mut tree = SpatialTree::new(CoordinateCompare);
        tree.add_element_range(points, true);

        assert_eq!(tree.node_count(), 31);
        assert_partitioned(tree.root().expect("built"), tree.comparator());
    }

    #[test]
    fn test_median_is_middle_of_sorted_order() {
        let mut tree: SpatialTree<[f32; 3], _> = SpatialTree::new(CoordinateCompare);
        let xs = [4.0, 0.0, 3.0, 1.0, 2.0];
        tree.add_element_range(xs.map(|x| [x, 0.0, 0.0]), true);

        let root = tree.root().expect("built");
        assert_eq!(root.axis(), 0);
        assert_eq!(root.value()[0], 2.0);
        assert_eq!(root.left().map(|n| n.axis()), Some(1));
    }

    #[test]
    fn test_axes_cycle_with_depth() {
        let mut tree =
            SpatialTree::with_dimensions(CoordinateCompare, 2).expect("valid dimensions");
        tree.add_element_range(random_points(15, 3), true);

        let mut stack = vec![(tree.root().expect("built"), 0usize)];
        while let Some((node, depth)) = stack.pop() {
            assert_eq!(node.axis(), depth % 2);
            stack.extend(node.left().map(|n| (n, depth + 1)));
            stack.extend(node.right().map(|n| (n, depth + 1)));
        }
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(SpatialTree::<[f32; 3], _>::with_dimensions(CoordinateCompare, 0).is_err());
    }

    #[test]
    fn test_rebuild_uses_current_collection() {
        let mut tree = SpatialTree::new(CoordinateCompare);
        tree.add_element_range(random_points(10, 1), true);
        assert_eq!(tree.node_count(), 10);

        tree.add_element_range(random_points(5, 2), false);
        assert_eq!(tree.node_count(), 10);

        tree.build_tree();
        assert_eq!(tree.node_count(), 15);
        assert!(tree.depth() <= 4);

        tree.clear();
        assert!(tree.is_empty());
        assert!(!tree.is_built());
    }

    #[test]
    fn test_walk_prunes_subtrees() {
        let mut tree = SpatialTree::new(CoordinateCompare);
        tree.add_element_range((0..64).map(|i| [i as f32, 0.0, 0.0]), true);

        // Collect x < 10 using the split planes
        let mut found = Vec::new();
        tree.walk(|node| {
            let x = node.value()[0];
            if x < 10.0 {
                found.push(x);
            }
            if node.axis() != 0 || x < 10.0 {
                Descend::Both
            } else {
                Descend::Left
            }
        });
        found.sort_by(f32::total_cmp);

        assert_eq!(found, (0..10).map(|i| i as f32).collect::<Vec<_>>());
    }

    #[test]
    fn test_closure_tree() {
        let mut tree = SpatialTree::new(|a: &i32, b: &i32, _axis: usize| a.cmp(b));
        tree.add_element_range([5, 3, 9, 1, 7], true);

        assert_eq!(tree.root().map(|n| *n.value()), Some(5));
        assert_eq!(tree.node_count(), 5);
    }
}
