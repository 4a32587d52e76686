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

//! Defines data structures related to GPU texture and sampler resources.

use std::borrow::Cow;

/// An opaque handle to a GPU texture resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub usize);

/// An opaque handle to a GPU sampler resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SamplerId(pub usize);

/// The memory layout of texels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// Four 8-bit normalized channels.
    Rgba8Unorm,
    /// A single 32-bit float depth channel.
    Depth32Float,
}

impl TextureFormat {
    /// Size of one texel in bytes.
    pub const fn bytes_per_texel(self) -> u32 {
        match self {
            TextureFormat::Rgba8Unorm | TextureFormat::Depth32Float => 4,
        }
    }
}

/// A descriptor used to create a two-dimensional [`TextureId`].
#[derive(Debug, Clone)]
pub struct TextureDescriptor<'a> {
    /// An optional debug label for the texture.
    pub label: Option<Cow<'a, str>>,
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// The texel format.
    pub format: TextureFormat,
}

/// Defines how texture coordinates are handled when sampling outside the `[0, 1]` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressMode {
    /// Coordinates wrap around. `1.1` becomes `0.1`.
    Repeat,
    /// Coordinates are clamped to the edge. `1.1` becomes `1.0`.
    ClampToEdge,
}

/// Defines the filtering mode for texture sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    /// Point sampling. Returns the value of the nearest texel.
    Nearest,
    /// Linear interpolation between the four nearest texels.
    Bilinear,
}

/// A descriptor used to create a [`SamplerId`].
#[derive(Debug, Clone)]
pub struct SamplerDescriptor<'a> {
    /// An optional debug label for the sampler.
    pub label: Option<Cow<'a, str>>,
    /// The filter used for both magnification and minification.
    pub filter: FilterMode,
    /// The addressing mode for every axis.
    pub address_mode: AddressMode,
}

/// Spacing between the first texture unit of two shadow map families.
pub const SHADOW_UNIT_SPACING: u32 = 16;

/// A named texture unit used by the forward technique.
///
/// Units are stable across shaders so the technique can bind textures without
/// querying the shader for sampler locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureMap {
    /// The per-sprite overlay texture.
    Overlay,
    /// The 2D shadow map of the light in the given slot.
    Shadow2D(u32),
    /// The cube shadow map of the point light in the given slot.
    ShadowCube(u32),
}

impl TextureMap {
    /// Returns the texture unit index.
    pub const fn unit(self) -> u32 {
        match self {
            TextureMap::Overlay => 0,
            TextureMap::Shadow2D(slot) => SHADOW_UNIT_SPACING + slot,
            TextureMap::ShadowCube(slot) => 2 * SHADOW_UNIT_SPACING + slot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texture_units_do_not_overlap() {
        assert_eq!(TextureMap::Overlay.unit(), 0);
        assert_eq!(TextureMap::Shadow2D(0).unit(), 16);
        assert_eq!(TextureMap::Shadow2D(3).unit(), 19);
        assert_eq!(TextureMap::ShadowCube(0).unit(), 32);
        assert_ne!(
            TextureMap::Shadow2D(SHADOW_UNIT_SPACING - 1).unit(),
            TextureMap::ShadowCube(0).unit()
        );
    }
}
