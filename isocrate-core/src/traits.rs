//! Core traits for isocrate

use crate::{mesh::IndexedMesh, point::*};

/// Anything with an axis-aligned extent in 3D
pub trait Bounded {
    /// Get the (min, max) corners of the bounding box
    fn bounding_box(&self) -> (Point3f, Point3f);

    /// Get the center point of the bounding box
    fn center(&self) -> Point3f {
        let (min, max) = self.bounding_box();
        nalgebra::center(&min, &max)
    }
}

/// Bounding box of a set of points, or the origin twice when empty
pub fn bounds_of<I>(points: I) -> (Point3f, Point3f)
where
    I: IntoIterator<Item = Point3f>,
{
    let mut iter = points.into_iter();
    let Some(first) = iter.next() else {
        return (Point3f::origin(), Point3f::origin());
    };

    iter.fold((first, first), |(min, max), p| (min.inf(&p), max.sup(&p)))
}

impl Bounded for IndexedMesh {
    fn bounding_box(&self) -> (Point3f, Point3f) {
        bounds_of(self.vertices.iter().map(|v| v.position()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_of_points() {
        let (min, max) = bounds_of(vec![
            Point3f::new(1.0, -2.0, 3.0),
            Point3f::new(-1.0, 4.0, 0.5),
        ]);

        assert_eq!(min, Point3f::new(-1.0, -2.0, 0.5));
        assert_eq!(max, Point3f::new(1.0, 4.0, 3.0));
    }

    #[test]
    fn test_empty_mesh_bounds_at_origin() {
        let mesh = IndexedMesh::new();
        assert_eq!(mesh.bounding_box(), (Point3f::origin(), Point3f::origin()));
        assert_eq!(mesh.center(), Point3f::origin());
    }
}
