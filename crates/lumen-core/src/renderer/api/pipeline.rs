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

//! Pipeline, material and shader handles plus the fixed-function state the technique toggles.

use bitflags::bitflags;

/// An opaque handle to a render pipeline (a shader permutation family plus its fixed-function state).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PipelineId(pub usize);

/// An opaque handle to a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub usize);

/// An opaque handle to a compiled shader instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderId(pub usize);

bitflags! {
    /// Feature flags selecting a shader permutation when a pipeline is applied.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ShaderFlags: u32 {
        /// Vertices are expanded as camera-facing billboards.
        const BILLBOARD = 1 << 0;
        /// Per-instance data comes from the instance buffer.
        const INSTANCING = 1 << 1;
        /// The overlay texture is sampled.
        const TEXTURE_OVERLAY = 1 << 2;
        /// Vertices carry a color.
        const VERTEX_COLOR = 1 << 3;
    }
}

/// The type of primitive assembled from the vertex stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveTopology {
    /// Each vertex is a point.
    PointList,
    /// Each pair of vertices is a line.
    LineList,
    /// Consecutive vertices form a connected line.
    LineStrip,
    /// Each triple of vertices is a triangle.
    TriangleList,
    /// Consecutive vertices form a strip of triangles.
    TriangleStrip,
}

/// A comparison function used for depth testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareFunction {
    /// The test never passes.
    Never,
    /// Passes if the new value is less than the existing value.
    Less,
    /// Passes if the new value is equal to the existing value.
    Equal,
    /// Passes if the new value is less than or equal to the existing value.
    LessEqual,
    /// Passes if the new value is greater than the existing value.
    Greater,
    /// Passes if the new value is not equal to the existing value.
    NotEqual,
    /// Passes if the new value is greater than or equal to the existing value.
    GreaterEqual,
    /// The test always passes.
    Always,
}

/// A factor applied to a color in the blend equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    /// `0.0`
    Zero,
    /// `1.0`
    One,
    /// The source alpha.
    SrcAlpha,
    /// `1.0 - source alpha`.
    OneMinusSrcAlpha,
}

/// The additive blend equation `src * src_factor + dst * dst_factor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendState {
    /// Whether blending is performed at all.
    pub enabled: bool,
    /// Factor applied to the incoming fragment.
    pub src_factor: BlendFactor,
    /// Factor applied to the value already in the target.
    pub dst_factor: BlendFactor,
}

impl BlendState {
    /// No blending: the fragment replaces the target.
    pub const DISABLED: Self = Self {
        enabled: false,
        src_factor: BlendFactor::One,
        dst_factor: BlendFactor::Zero,
    };

    /// `One + One`, used to accumulate extra lighting passes.
    pub const ADDITIVE: Self = Self {
        enabled: true,
        src_factor: BlendFactor::One,
        dst_factor: BlendFactor::One,
    };

    /// Classic alpha blending.
    pub const ALPHA: Self = Self {
        enabled: true,
        src_factor: BlendFactor::SrcAlpha,
        dst_factor: BlendFactor::OneMinusSrcAlpha,
    };
}

impl Default for BlendState {
    fn default() -> Self {
        Self::DISABLED
    }
}

/// An optional device feature the technique adapts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceCapability {
    /// Instanced draw calls with a per-instance vertex stream.
    Instancing,
}
