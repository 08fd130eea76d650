// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of the SimBox structure and its methods.

/// Structure defining the dimensions of an orthorhombic simulation box.
/// All angles are assumed to be 90°; this is the only box shape produced
/// by the supported dump files.
#[derive(Debug, Clone, PartialEq)]
pub struct SimBox {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<[f32; 3]> for SimBox {
    /// Convert a 3-member array of box side lengths to a SimBox structure.
    #[inline]
    fn from(arr: [f32; 3]) -> Self {
        SimBox {
            x: arr[0],
            y: arr[1],
            z: arr[2],
        }
    }
}

impl SimBox {
    /// Construct a simulation box from three `(lo, hi)` bound pairs
    /// as provided by the `BOX BOUNDS` section of a dump file.
    /// The side length of each axis is `hi - lo`.
    #[inline]
    pub fn from_bounds(bounds: [(f32, f32); 3]) -> Self {
        SimBox {
            x: bounds[0].1 - bounds[0].0,
            y: bounds[1].1 - bounds[1].0,
            z: bounds[2].1 - bounds[2].0,
        }
    }

    /// Calculate the volume of the simulation box.
    ///
    /// ## Example
    /// ```
    /// # use evban_rs::prelude::*;
    /// # use float_cmp::assert_approx_eq;
    /// #
    /// let simbox = SimBox::from([2.0, 3.0, 4.0]);
    /// assert_approx_eq!(f32, simbox.volume(), 24.0);
    /// ```
    #[inline]
    pub fn volume(&self) -> f32 {
        self.x * self.y * self.z
    }
}
