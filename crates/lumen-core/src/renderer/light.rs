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

//! Defines light types for the rendering system.
//!
//! The producer of the render queue resolves every light to world space before
//! pushing it, so these records carry final positions and directions. The forward
//! technique selects the relevant lights per object and sends these fields as shader
//! uniforms.

use crate::math::{LinearRgba, Mat4, Vec3};
use crate::renderer::api::TextureId;

/// The shader code of an unused light slot.
pub const DISABLED_LIGHT_CODE: i32 = -1;

/// The kind of a light source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LightKind {
    /// A directional light (sun-like, infinite distance, no falloff).
    Directional,
    /// A point light (omni-directional with distance falloff).
    Point,
    /// A spotlight (cone-shaped with distance and angular falloff).
    Spot,
}

impl LightKind {
    /// Returns the value written to the `type` field of a light uniform block.
    pub const fn shader_code(self) -> i32 {
        match self {
            LightKind::Directional => 0,
            LightKind::Point => 1,
            LightKind::Spot => 2,
        }
    }
}

/// A directional light source that illuminates from a uniform direction.
///
/// # Examples
///
/// ```
/// use lumen_core::renderer::light::DirectionalLight;
/// use lumen_core::math::{Vec3, LinearRgba};
///
/// let sun = DirectionalLight {
///     direction: Vec3::new(-0.5, -1.0, -0.3).normalize(),
///     color: LinearRgba::new(1.0, 0.95, 0.8, 1.0),
///     ..Default::default()
/// };
/// assert!(sun.shadow_map.is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// The color of the light in linear RGB space.
    pub color: LinearRgba,
    /// Contribution to the ambient term.
    pub ambient_factor: f32,
    /// Contribution to the diffuse term.
    pub diffuse_factor: f32,
    /// The direction the light is pointing (normalized).
    pub direction: Vec3,
    /// The shadow map rendered for this light, if any.
    pub shadow_map: Option<TextureId>,
    /// The light's view-projection matrix used to sample `shadow_map`.
    pub transform_matrix: Mat4,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            color: LinearRgba::WHITE,
            ambient_factor: 0.2,
            diffuse_factor: 1.0,
            direction: Vec3::new(0.0, -1.0, -0.5).normalize(),
            shadow_map: None,
            transform_matrix: Mat4::IDENTITY,
        }
    }
}

/// A point light source that emits light in all directions from a single point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    /// The color of the light in linear RGB space.
    pub color: LinearRgba,
    /// Contribution to the ambient term.
    pub ambient_factor: f32,
    /// Contribution to the diffuse term.
    pub diffuse_factor: f32,
    /// World-space position of the light.
    pub position: Vec3,
    /// Attenuation factor sent to the shader.
    pub attenuation: f32,
    /// The maximum range of the light in world units.
    ///
    /// Beyond this distance from an object's bounding sphere the light is not
    /// selected for that object.
    pub radius: f32,
    /// The cube shadow map rendered for this light, if any.
    pub shadow_map: Option<TextureId>,
}

impl PointLight {
    /// Returns `1 / radius`, or zero for a degenerate radius.
    pub fn inv_radius(&self) -> f32 {
        if self.radius > 0.0 {
            1.0 / self.radius
        } else {
            0.0
        }
    }
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            color: LinearRgba::WHITE,
            ambient_factor: 0.2,
            diffuse_factor: 1.0,
            position: Vec3::ZERO,
            attenuation: 0.9,
            radius: 5.0,
            shadow_map: None,
        }
    }
}

/// A spot light source that emits light in a cone from a single point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    /// The color of the light in linear RGB space.
    pub color: LinearRgba,
    /// Contribution to the ambient term.
    pub ambient_factor: f32,
    /// Contribution to the diffuse term.
    pub diffuse_factor: f32,
    /// World-space position of the light.
    pub position: Vec3,
    /// The direction the spotlight is pointing (normalized).
    pub direction: Vec3,
    /// Attenuation factor sent to the shader.
    pub attenuation: f32,
    /// The maximum range of the light in world units.
    pub radius: f32,
    /// Cosine of the angle at which the light begins to fall off.
    pub inner_angle_cosine: f32,
    /// Cosine of the angle at which the light is fully attenuated.
    pub outer_angle_cosine: f32,
    /// The shadow map rendered for this light, if any.
    pub shadow_map: Option<TextureId>,
    /// The light's view-projection matrix used to sample `shadow_map`.
    pub transform_matrix: Mat4,
}

impl SpotLight {
    /// Sets both cone angles, given in radians.
    pub fn with_cone(mut self, inner_angle: f32, outer_angle: f32) -> Self {
        self.inner_angle_cosine = inner_angle.cos();
        self.outer_angle_cosine = outer_angle.cos();
        self
    }

    /// Returns `1 / radius`, or zero for a degenerate radius.
    pub fn inv_radius(&self) -> f32 {
        if self.radius > 0.0 {
            1.0 / self.radius
        } else {
            0.0
        }
    }
}

impl Default for SpotLight {
    fn default() -> Self {
        Self {
            color: LinearRgba::WHITE,
            ambient_factor: 0.2,
            diffuse_factor: 1.0,
            position: Vec3::ZERO,
            direction: Vec3::new(0.0, -1.0, 0.0),
            attenuation: 0.9,
            radius: 5.0,
            inner_angle_cosine: 0.0,
            outer_angle_cosine: 0.0,
            shadow_map: None,
            transform_matrix: Mat4::IDENTITY,
        }
        .with_cone(15.0_f32.to_radians(), 45.0_f32.to_radians())
    }
}

/// The lights gathered for one render layer, grouped by kind.
#[derive(Debug, Clone, Default)]
pub struct LightLists {
    /// Directional lights, in insertion order.
    pub directional: Vec<DirectionalLight>,
    /// Point lights, in insertion order.
    pub point: Vec<PointLight>,
    /// Spot lights, in insertion order.
    pub spot: Vec<SpotLight>,
}

impl LightLists {
    /// Total number of lights of every kind.
    pub fn len(&self) -> usize {
        self.directional.len() + self.point.len() + self.spot.len()
    }

    /// Returns `true` if no light of any kind is present.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every light, keeping the allocations.
    pub fn clear(&mut self) {
        self.directional.clear();
        self.point.clear();
        self.spot.clear();
    }
}
