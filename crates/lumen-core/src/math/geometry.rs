// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Bounding volumes used for light selection and depth sorting.

use glam::{Mat4, Vec3};

/// A bounding sphere.
///
/// Render queue entries store their sphere in object space; submitters move it
/// to world space with [`Sphere::transformed`] before selecting lights.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sphere {
    /// The center of the sphere.
    pub center: Vec3,
    /// The radius of the sphere. Never negative.
    pub radius: f32,
}

impl Sphere {
    /// Creates a new sphere. Negative radii are clamped to zero.
    #[inline]
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }

    /// Returns the squared radius.
    #[inline]
    pub fn squared_radius(&self) -> f32 {
        self.radius * self.radius
    }

    /// Returns this sphere moved by `matrix`.
    ///
    /// The center is fully transformed; the radius is scaled by the largest
    /// axis scale of the matrix so the result still encloses the object.
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        let center = matrix.transform_point3(self.center);
        let scale = matrix
            .x_axis
            .truncate()
            .length()
            .max(matrix.y_axis.truncate().length())
            .max(matrix.z_axis.truncate().length());
        Self::new(center, self.radius * scale)
    }

    /// Returns the squared distance from `point` to the surface of the sphere.
    ///
    /// Points inside the sphere are at distance zero.
    pub fn squared_distance_to(&self, point: Vec3) -> f32 {
        let distance = (point - self.center).length() - self.radius;
        if distance <= 0.0 {
            0.0
        } else {
            distance * distance
        }
    }

    /// Returns `true` if `point` lies inside or on the sphere.
    #[inline]
    pub fn contains(&self, point: Vec3) -> bool {
        (point - self.center).length_squared() <= self.squared_radius()
    }
}
