//! Per-axis ordering used to partition a [`SpatialTree`](crate::SpatialTree)

use std::cmp::Ordering;

/// Three-way comparison of two elements along one axis.
///
/// Implemented for any `Fn(&T, &T, usize) -> Ordering`, so a closure is enough
/// for one-off trees. A named type keeps the comparator nameable in struct
/// fields.
pub trait AxisCompare<T> {
    fn compare(&self, a: &T, b: &T, axis: usize) -> Ordering;
}

impl<T, F> AxisCompare<T> for F
where
    F: Fn(&T, &T, usize) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &T, b: &T, axis: usize) -> Ordering {
        self(a, b, axis)
    }
}

/// Orders fixed-size float coordinates by the component at `axis`
#[derive(Debug, Clone, Copy, Default)]
pub struct CoordinateCompare;

impl<const N: usize> AxisCompare<[f32; N]> for CoordinateCompare {
    #[inline]
    fn compare(&self, a: &[f32; N], b: &[f32; N], axis: usize) -> Ordering {
        a[axis].total_cmp(&b[axis])
    }
}
