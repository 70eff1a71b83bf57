//! Extracted triangles with cached plane and containment state

use isocrate_core::{bounds_of, Bounded, Point3f, Vector3f};
use isocrate_spatial::AxisCompare;
use rand::Rng;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Slack allowed on barycentric coefficients so that vertices and edges test inside
pub const BARYCENTRIC_TOLERANCE: f32 = 1e-4;

/// Below this `|normal . direction|` a ray counts as parallel to the plane
pub const PARALLEL_EPSILON: f32 = 1e-6;

/// Projected doubled area below which a triangle is treated as degenerate
const DEGENERATE_EPSILON: f32 = 1e-10;

/// Coordinates kept when projecting along each dominant axis
const PROJECTION_AXES: [[usize; 2]; 3] = [[1, 2], [2, 0], [0, 1]];

/// A triangle of the extracted surface in the query frame.
///
/// Everything derived from the three positions is computed once in
/// [`SurfaceTriangle::new`]. Containment tests project onto the plane that
/// drops the dominant normal axis and evaluate two precomputed linear forms,
/// taken relative to the first vertex, giving the barycentric weights of the
/// second and third vertex.
#[derive(Debug, Clone)]
pub struct SurfaceTriangle {
    index: usize,
    indices: [u32; 3],
    positions: [Point3f; 3],
    normal: Vector3f,
    centroid: Point3f,
    plane_distance: f32,
    dominant_axis: usize,
    anchor: [f32; 2],
    beta: [f32; 2],
    gamma: [f32; 2],
    degenerate: bool,
}

impl SurfaceTriangle {
    /// Build a triangle from its vertex indices and transformed positions.
    ///
    /// `index` is the emission order within one extraction.
    pub fn new(index: usize, indices: [u32; 3], positions: [Point3f; 3]) -> Self {
        let [p0, p1, p2] = positions;
        let cross = (p1 - p0).cross(&(p2 - p0));
        let normal = cross.try_normalize(f32::MIN_POSITIVE).unwrap_or_else(Vector3f::z);
        let centroid = Point3f::from((p0.coords + p1.coords + p2.coords) / 3.0);
        let plane_distance = -normal.dot(&centroid.coords);

        let dominant_axis = normal.iamax();
        let [u, v] = PROJECTION_AXES[dominant_axis];

        let (u0, v0) = (p0[u], p0[v]);
        let (e1u, e1v) = (p1[u] - u0, p1[v] - v0);
        let (e2u, e2v) = (p2[u] - u0, p2[v] - v0);
        let det = e1u * e2v - e1v * e2u;

        let degenerate = det.abs() <= DEGENERATE_EPSILON;
        let (beta, gamma) = if degenerate {
            ([0.0; 2], [0.0; 2])
        } else {
            let inv = 1.0 / det;
            ([e2v * inv, -e2u * inv], [-e1v * inv, e1u * inv])
        };

        Self {
            index,
            indices,
            positions,
            normal,
            centroid,
            plane_distance,
            dominant_axis,
            anchor: [u0, v0],
            beta,
            gamma,
            degenerate,
        }
    }

    /// Identity packed from the low 16 bits of each vertex index.
    ///
    /// Meshes with more than 65536 vertices can alias; use
    /// [`index`](Self::index) to tell triangles of one extraction apart.
    pub fn id(&self) -> u64 {
        let [a, b, c] = self.indices.map(|i| u64::from(i) & 0xFFFF);
        a | (b << 16) | (c << 32)
    }

    /// Position of this triangle in the extraction's emission order
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn indices(&self) -> [u32; 3] {
        self.indices
    }

    pub fn positions(&self) -> &[Point3f; 3] {
        &self.positions
    }

    /// Unit normal following the winding order
    pub fn normal(&self) -> Vector3f {
        self.normal
    }

    pub fn centroid(&self) -> Point3f {
        self.centroid
    }

    /// `D` such that `normal . p + D == 0` on the plane
    pub fn plane_distance(&self) -> f32 {
        self.plane_distance
    }

    /// Axis with the largest absolute normal component
    pub fn dominant_axis(&self) -> usize {
        self.dominant_axis
    }

    /// Whether the vertices are (nearly) collinear
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    pub fn area(&self) -> f32 {
        let [p0, p1, p2] = self.positions;
        0.5 * (p1 - p0).cross(&(p2 - p0)).magnitude()
    }

    /// Signed distance from `point` to the triangle's plane
    pub fn signed_distance(&self, point: &Point3f) -> f32 {
        self.normal.dot(&point.coords) + self.plane_distance
    }

    /// Containment test in the dominant-axis projection.
    ///
    /// Points on edges and vertices count as inside. The test ignores the
    /// distance from the plane.
    pub fn point_in_triangle(&self, point: &Point3f) -> bool {
        if self.degenerate {
            return false;
        }

        let [u, v] = PROJECTION_AXES[self.dominant_axis];
        let (du, dv) = (point[u] - self.anchor[0], point[v] - self.anchor[1]);
        let range = -BARYCENTRIC_TOLERANCE..=1.0 + BARYCENTRIC_TOLERANCE;

        let beta = self.beta[0] * du + self.beta[1] * dv;
        if !range.contains(&beta) {
            return false;
        }

        let gamma = self.gamma[0] * du + self.gamma[1] * dv;
        if !range.contains(&gamma) {
            return false;
        }

        1.0 - beta - gamma >= -BARYCENTRIC_TOLERANCE
    }

    /// Ray parameter `t` where `origin + t * direction` hits the triangle.
    ///
    /// Returns `None` for rays parallel to the plane or missing the
    /// triangle. Negative `t` (hits behind the origin) is reported as is.
    pub fn ray_intersect(&self, origin: &Point3f, direction: &Vector3f) -> Option<f32> {
        let denom = self.normal.dot(direction);
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }

        let t = -(self.normal.dot(&origin.coords) + self.plane_distance) / denom;
        let hit = origin + direction * t;
        self.point_in_triangle(&hit).then_some(t)
    }

    /// Placement point on the triangle.
    ///
    /// Always the centroid; the generator is accepted so callers can switch
    /// to true area sampling without changing signatures.
    pub fn generate_random_point_in<R: Rng + ?Sized>(&self, _rng: &mut R) -> Point3f {
        self.centroid
    }
}

impl PartialEq for SurfaceTriangle {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for SurfaceTriangle {}

impl Hash for SurfaceTriangle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl Bounded for SurfaceTriangle {
    fn bounding_box(&self) -> (Point3f, Point3f) {
        bounds_of(self.positions)
    }
}

/// Orders shared triangles by centroid coordinate along an axis
#[derive(Debug, Clone, Copy, Default)]
pub struct CentroidCompare;

impl AxisCompare<Arc<SurfaceTriangle>> for CentroidCompare {
    #[inline]
    fn compare(&self, a: &Arc<SurfaceTriangle>, b: &Arc<SurfaceTriangle>, axis: usize) -> Ordering {
        a.centroid[axis].total_cmp(&b.centroid[axis])
    }
}
