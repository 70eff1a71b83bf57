//! Edge to triangle adjacency built during extraction

use crate::edge::EdgeId;
use crate::triangle::SurfaceTriangle;
use itertools::Itertools;
use std::collections::HashMap;
use std::sync::Arc;

/// Triangles registered under each welded grid edge, in emission order
#[derive(Debug, Clone, Default)]
pub struct AdjacencyMap {
    buckets: HashMap<EdgeId, Vec<Arc<SurfaceTriangle>>>,
}

impl AdjacencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `triangle` to the bucket of `edge`, creating it on first use
    pub(crate) fn register(&mut self, edge: EdgeId, triangle: Arc<SurfaceTriangle>) {
        self.buckets.entry(edge).or_default().push(triangle);
    }

    /// Triangles welded on `edge`, empty when the edge has no vertex
    pub fn get(&self, edge: EdgeId) -> &[Arc<SurfaceTriangle>] {
        self.buckets.get(&edge).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_edge(&self, edge: EdgeId) -> bool {
        self.buckets.contains_key(&edge)
    }

    /// Number of distinct edge buckets
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.buckets.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EdgeId, &[Arc<SurfaceTriangle>])> + '_ {
        self.buckets.iter().map(|(edge, tris)| (*edge, tris.as_slice()))
    }

    /// Union of the buckets of `edges`, each triangle once, first-seen order
    pub fn triangles_on<I>(&self, edges: I) -> Vec<Arc<SurfaceTriangle>>
    where
        I: IntoIterator<Item = EdgeId>,
    {
        edges
            .into_iter()
            .flat_map(|edge| self.get(edge))
            .unique_by(|triangle| triangle.index())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use isocrate_core::Point3f;

    fn triangle(index: usize, indices: [u32; 3]) -> Arc<SurfaceTriangle> {
        Arc::new(SurfaceTriangle::new(
            index,
            indices,
            [Point3f::new(0.0, 0.0, 0.0), Point3f::new(1.0, 0.0, 0.0), Point3f::new(0.0, 1.0, 0.0)],
        ))
    }

    #[test]
    fn test_register_and_lookup() {
        let dims = [3, 3, 3];
        let a = EdgeId::new(dims, [0, 0, 0], 0);
        let b = EdgeId::new(dims, [0, 0, 0], 1);
        let missing = EdgeId::new(dims, [1, 1, 1], 2);

        let mut map = AdjacencyMap::new();
        map.register(a, triangle(0, [0, 1, 2]));
        map.register(a, triangle(1, [0, 2, 3]));
        map.register(b, triangle(1, [0, 2, 3]));

        assert_eq!(map.len(), 2);
        assert_eq!(map.get(a).len(), 2);
        assert_eq!(map.get(a)[1].index(), 1);
        assert!(map.get(missing).is_empty());
        assert!(!map.contains_edge(missing));

        let mut edges: Vec<u64> = map.edges().map(EdgeId::value).collect();
        edges.sort_unstable();
        let mut expected = vec![a.value(), b.value()];
        expected.sort_unstable();
        assert_eq!(edges, expected);
    }

    #[test]
    fn test_union_is_deduplicated() {
        let dims = [3, 3, 3];
        let a = EdgeId::new(dims, [0, 0, 0], 0);
        let b = EdgeId::new(dims, [0, 0, 0], 1);
        let shared = triangle(1, [0, 2, 3]);

        let mut map = AdjacencyMap::new();
        map.register(a, triangle(0, [0, 1, 2]));
        map.register(a, Arc::clone(&shared));
        map.register(b, shared);

        let union = map.triangles_on([a, b]);
        let indices: Vec<usize> = union.iter().map(|t| t.index()).collect();
        assert_eq!(indices, vec![0, 1]);
    }
}
