// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of methods for three-dimensional vectors under periodic boundary conditions.

use std::ops::{Add, Deref, DerefMut, Mul, Sub};

use nalgebra::base::Vector3;

use crate::structures::simbox::SimBox;

/// Describes the length and orientation of a vector in space or the position
/// of a point in space. Implemented using `nalgebra`'s Vector3.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Vector3D(pub(crate) Vector3<f32>);

impl From<[f32; 3]> for Vector3D {
    #[inline]
    fn from(arr: [f32; 3]) -> Self {
        Vector3D(Vector3::new(arr[0], arr[1], arr[2]))
    }
}

impl Default for Vector3D {
    #[inline]
    fn default() -> Self {
        Vector3D(Vector3::new(0.0, 0.0, 0.0))
    }
}

/// Allows accessing fields of `Vector3D` as `.x`, `.y`, and `.z`.
pub struct Vector3Raw {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Deref for Vector3D {
    type Target = Vector3Raw;

    #[inline]
    fn deref(&self) -> &Self::Target {
        unsafe { &*(self.0.as_ptr() as *const Vector3Raw) }
    }
}

impl DerefMut for Vector3D {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        unsafe { &mut *(self.0.as_mut_ptr() as *mut Vector3Raw) }
    }
}

impl Add for Vector3D {
    type Output = Vector3D;

    #[inline]
    fn add(self, rhs: Vector3D) -> Self::Output {
        Vector3D(self.0 + rhs.0)
    }
}

impl Sub for Vector3D {
    type Output = Vector3D;

    #[inline]
    fn sub(self, rhs: Vector3D) -> Self::Output {
        Vector3D(self.0 - rhs.0)
    }
}

impl Mul<f32> for Vector3D {
    type Output = Vector3D;

    #[inline]
    fn mul(self, rhs: f32) -> Self::Output {
        Vector3D(self.0 * rhs)
    }
}

impl Vector3D {
    /// Create a new `Vector3D` structure.
    #[inline]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Vector3D(Vector3::new(x, y, z))
    }

    /// Calculate the length of the vector.
    ///
    /// ## Example
    /// ```
    /// # use evban_rs::prelude::*;
    /// # use float_cmp::assert_approx_eq;
    /// #
    /// let vector = Vector3D::new(1.0, 2.0, 3.0);
    /// assert_approx_eq!(f32, vector.len(), 3.741657);
    /// ```
    #[inline]
    pub fn len(&self) -> f32 {
        self.0.magnitude()
    }

    /// Calculate the dot product of two vectors.
    #[inline]
    pub fn dot(&self, vector: &Vector3D) -> f32 {
        self.0.dot(&vector.0)
    }

    /// Wrap an oriented one-dimensional separation into the minimum image.
    /// Scales the separation by the box length, rounds to the nearest integer
    /// and subtracts the corresponding number of box lengths.
    #[inline]
    fn min_image(dx: f32, box_len: f32) -> f32 {
        if box_len == 0.0 {
            panic!("FATAL EVBAN ERROR | Vector3D::min_image | Box len should not be zero.")
        }

        dx - box_len * (dx / box_len).round()
    }

    /// Calculate the distance between two points using the minimum image convention.
    ///
    /// ## Example
    /// The points straddle the periodic boundary along x,
    /// so the distance is much shorter than the naive one.
    /// ```
    /// # use evban_rs::prelude::*;
    /// # use float_cmp::assert_approx_eq;
    /// #
    /// let point1 = Vector3D::new(0.5, 2.0, 3.0);
    /// let point2 = Vector3D::new(9.5, 2.0, 3.0);
    /// let simbox = SimBox::from([10.0, 10.0, 10.0]);
    ///
    /// assert_approx_eq!(f32, point1.distance(&point2, &simbox), 1.0);
    /// assert_approx_eq!(f32, point2.distance(&point1, &simbox), 1.0);
    /// ```
    #[inline]
    pub fn distance(&self, point: &Vector3D, sbox: &SimBox) -> f32 {
        self.min_image_diff(point, sbox).len()
    }

    /// Calculate the minimum image vector from `point` to `self`, i.e. `self - point`.
    #[inline]
    pub fn min_image_diff(&self, point: &Vector3D, sbox: &SimBox) -> Vector3D {
        Vector3D::new(
            Vector3D::min_image(self.x - point.x, sbox.x),
            Vector3D::min_image(self.y - point.y, sbox.y),
            Vector3D::min_image(self.z - point.z, sbox.z),
        )
    }

    /// Calculate the midpoint of two points along the minimum image path between them.
    ///
    /// This is **not** the naive arithmetic mean of the two points: when the points
    /// straddle a periodic boundary, the midpoint lies near the boundary and not
    /// in the middle of the box.
    ///
    /// ## Example
    /// ```
    /// # use evban_rs::prelude::*;
    /// # use float_cmp::assert_approx_eq;
    /// #
    /// let point1 = Vector3D::new(9.5, 2.0, 3.0);
    /// let point2 = Vector3D::new(0.5, 2.0, 3.0);
    /// let simbox = SimBox::from([10.0, 10.0, 10.0]);
    ///
    /// let mid = point1.min_image_midpoint(&point2, &simbox);
    /// assert_approx_eq!(f32, mid.x, 10.0);
    /// assert_approx_eq!(f32, mid.y, 2.0);
    /// assert_approx_eq!(f32, mid.z, 3.0);
    /// ```
    #[inline]
    pub fn min_image_midpoint(&self, point: &Vector3D, sbox: &SimBox) -> Vector3D {
        *self + point.min_image_diff(self, sbox) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn distance_inside_box() {
        let point1 = Vector3D::new(1.0, 2.0, 3.0);
        let point2 = Vector3D::new(4.0, 6.0, 3.0);
        let simbox = SimBox::from([20.0, 20.0, 20.0]);

        assert_approx_eq!(f32, point1.distance(&point2, &simbox), 5.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let point1 = Vector3D::new(0.3, 9.8, 4.2);
        let point2 = Vector3D::new(9.7, 0.4, 4.9);
        let simbox = SimBox::from([10.0, 10.0, 10.0]);

        assert_approx_eq!(
            f32,
            point1.distance(&point2, &simbox),
            point2.distance(&point1, &simbox)
        );
    }

    #[test]
    fn distance_never_exceeds_half_box_diagonal() {
        let simbox = SimBox::from([8.0, 6.0, 4.0]);
        let half_diagonal = Vector3D::new(4.0, 3.0, 2.0).len();

        let points = [
            Vector3D::new(0.1, 0.1, 0.1),
            Vector3D::new(7.9, 5.9, 3.9),
            Vector3D::new(4.0, 3.0, 2.0),
            Vector3D::new(7.0, 0.5, 3.5),
        ];

        for a in &points {
            for b in &points {
                assert!(a.distance(b, &simbox) <= half_diagonal);
            }
        }
    }

    #[test]
    fn diff_wraps_across_boundary() {
        let point1 = Vector3D::new(0.5, 5.0, 5.0);
        let point2 = Vector3D::new(9.5, 5.0, 5.0);
        let simbox = SimBox::from([10.0, 10.0, 10.0]);

        let diff = point1.min_image_diff(&point2, &simbox);
        assert_approx_eq!(f32, diff.x, 1.0);
        assert_approx_eq!(f32, diff.y, 0.0);
        assert_approx_eq!(f32, diff.z, 0.0);
    }

    #[test]
    fn midpoint_no_boundary() {
        let point1 = Vector3D::new(2.0, 2.0, 2.0);
        let point2 = Vector3D::new(4.0, 4.0, 4.0);
        let simbox = SimBox::from([10.0, 10.0, 10.0]);

        let mid = point1.min_image_midpoint(&point2, &simbox);
        assert_approx_eq!(f32, mid.x, 3.0);
        assert_approx_eq!(f32, mid.y, 3.0);
        assert_approx_eq!(f32, mid.z, 3.0);
    }

    #[test]
    fn midpoint_across_boundary_is_not_naive_mean() {
        let point1 = Vector3D::new(9.6, 1.0, 1.0);
        let point2 = Vector3D::new(0.4, 1.0, 1.0);
        let simbox = SimBox::from([10.0, 10.0, 10.0]);

        let mid = point1.min_image_midpoint(&point2, &simbox);
        // the naive mean would be 5.0; the minimum image midpoint sits on the boundary
        assert_approx_eq!(f32, mid.x, 10.0);

        // midpoint computed from the other side must be the same point (modulo the box)
        let mid2 = point2.min_image_midpoint(&point1, &simbox);
        assert_approx_eq!(f32, Vector3D::min_image(mid.x - mid2.x, 10.0), 0.0);
    }

    #[test]
    #[should_panic]
    fn min_image_zero_box_panics() {
        Vector3D::min_image(1.0, 0.0);
    }
}
