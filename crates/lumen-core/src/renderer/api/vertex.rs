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

//! Vertex formats, layout declarations and the plain-old-data vertex structs streamed by the technique.

use bytemuck::{Pod, Zeroable};
use std::mem::{offset_of, size_of};

/// The data type of one vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    /// Two 32-bit floats.
    Float32x2,
    /// Three 32-bit floats.
    Float32x3,
    /// Four 32-bit floats.
    Float32x4,
    /// Four 8-bit normalized unsigned integers.
    Unorm8x4,
}

impl VertexFormat {
    /// Size of the attribute in bytes.
    pub const fn size(self) -> u32 {
        match self {
            VertexFormat::Float32x2 => 8,
            VertexFormat::Float32x3 => 12,
            VertexFormat::Float32x4 => 16,
            VertexFormat::Unorm8x4 => 4,
        }
    }
}

/// The semantic of a vertex attribute, matched against shader inputs by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexComponent {
    /// Vertex position.
    Position,
    /// Vertex color.
    Color,
    /// Texture coordinates.
    TexCoord,
    /// Billboard size.
    Size,
    /// Billboard rotation as `(sin, cos)`.
    SinCos,
    /// Generic per-instance data at the given index.
    InstanceData(u8),
}

/// Whether an attribute advances per vertex or per instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexStepMode {
    /// Advances once per vertex.
    Vertex,
    /// Advances once per instance.
    Instance,
}

/// One attribute inside a [`VertexDeclaration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    /// Semantic of the attribute.
    pub component: VertexComponent,
    /// Data type of the attribute.
    pub format: VertexFormat,
    /// Byte offset from the start of the element.
    pub offset: u32,
}

/// Describes the memory layout of one element of a vertex or instance buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexDeclaration {
    /// Size of one element in bytes.
    pub stride: u32,
    /// How the attributes advance.
    pub step_mode: VertexStepMode,
    /// The attributes, in declaration order.
    pub attributes: Vec<VertexAttribute>,
}

impl VertexDeclaration {
    fn new(stride: usize, step_mode: VertexStepMode) -> Self {
        Self {
            stride: stride as u32,
            step_mode,
            attributes: Vec::new(),
        }
    }

    fn with(mut self, component: VertexComponent, format: VertexFormat, offset: usize) -> Self {
        self.attributes.push(VertexAttribute {
            component,
            format,
            offset: offset as u32,
        });
        self
    }
}

/// The well-known vertex layouts used by the forward technique.
///
/// Mesh producers may reference their own layouts through [`VertexLayout::Custom`];
/// those are declared to the device by whoever owns them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VertexLayout {
    /// A 2D position ([`QuadVertex`]).
    XY,
    /// Position, color and texture coordinates ([`SpriteVertex`]).
    XYZColorUV,
    /// An expanded billboard corner ([`BillboardVertex`]).
    BillboardPoint,
    /// Per-instance billboard data ([`BillboardData`]).
    BillboardInstance,
    /// A per-instance world matrix.
    Matrix4,
    /// A layout owned by the mesh producer.
    Custom(u32),
}

impl VertexLayout {
    /// Returns the declaration of a well-known layout, or `None` for custom layouts.
    pub fn declaration(self) -> Option<VertexDeclaration> {
        use VertexComponent as C;
        use VertexFormat as F;

        let declaration = match self {
            VertexLayout::XY => VertexDeclaration::new(size_of::<QuadVertex>(), VertexStepMode::Vertex)
                .with(C::Position, F::Float32x2, offset_of!(QuadVertex, position)),
            VertexLayout::XYZColorUV => {
                VertexDeclaration::new(size_of::<SpriteVertex>(), VertexStepMode::Vertex)
                    .with(C::Position, F::Float32x3, offset_of!(SpriteVertex, position))
                    .with(C::Color, F::Unorm8x4, offset_of!(SpriteVertex, color))
                    .with(C::TexCoord, F::Float32x2, offset_of!(SpriteVertex, uv))
            }
            VertexLayout::BillboardPoint => {
                VertexDeclaration::new(size_of::<BillboardVertex>(), VertexStepMode::Vertex)
                    .with(C::Color, F::Unorm8x4, offset_of!(BillboardVertex, color))
                    .with(C::Position, F::Float32x3, offset_of!(BillboardVertex, position))
                    .with(C::Size, F::Float32x2, offset_of!(BillboardVertex, size))
                    .with(C::SinCos, F::Float32x2, offset_of!(BillboardVertex, sin_cos))
                    .with(C::TexCoord, F::Float32x2, offset_of!(BillboardVertex, uv))
            }
            VertexLayout::BillboardInstance => {
                VertexDeclaration::new(size_of::<BillboardData>(), VertexStepMode::Instance)
                    .with(C::InstanceData(0), F::Float32x3, offset_of!(BillboardData, center))
                    .with(C::InstanceData(1), F::Float32x4, offset_of!(BillboardData, size))
                    .with(C::Color, F::Unorm8x4, offset_of!(BillboardData, color))
            }
            VertexLayout::Matrix4 => {
                let column = size_of::<[f32; 4]>();
                (0..4u8).fold(
                    VertexDeclaration::new(4 * column, VertexStepMode::Instance),
                    |decl, i| decl.with(C::InstanceData(i), F::Float32x4, i as usize * column),
                )
            }
            VertexLayout::Custom(_) => return None,
        };
        Some(declaration)
    }
}

/// A corner of the shared unit quad.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    /// Corner position in `[-0.5, 0.5]²`.
    pub position: [f32; 2],
}

/// A sprite vertex. Four consecutive vertices make one quad.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct SpriteVertex {
    /// World-space position.
    pub position: [f32; 3],
    /// Packed RGBA color.
    pub color: [u8; 4],
    /// Texture coordinates.
    pub uv: [f32; 2],
}

/// A billboard corner expanded on the CPU when instancing is unavailable.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct BillboardVertex {
    /// Packed RGBA color.
    pub color: [u8; 4],
    /// World-space center of the billboard.
    pub position: [f32; 3],
    /// Width and height.
    pub size: [f32; 2],
    /// Rotation as `(sin, cos)`.
    pub sin_cos: [f32; 2],
    /// Corner texture coordinates.
    pub uv: [f32; 2],
}

/// One billboard as queued by the producer. Copied verbatim into the instance buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct BillboardData {
    /// World-space center.
    pub center: [f32; 3],
    /// Width and height.
    pub size: [f32; 2],
    /// Rotation as `(sin, cos)`.
    pub sin_cos: [f32; 2],
    /// Packed RGBA color.
    pub color: [u8; 4],
}

impl BillboardData {
    /// Builds a billboard from its rotation angle in radians.
    pub fn new(center: glam::Vec3, size: glam::Vec2, rotation: f32, color: [u8; 4]) -> Self {
        let (sin, cos) = rotation.sin_cos();
        Self {
            center: center.to_array(),
            size: size.to_array(),
            sin_cos: [sin, cos],
            color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pod_structs_have_no_padding() {
        assert_eq!(size_of::<SpriteVertex>(), 24);
        assert_eq!(size_of::<BillboardVertex>(), 40);
        assert_eq!(size_of::<BillboardData>(), 32);
    }

    #[test]
    fn test_declarations_match_struct_sizes() {
        let sprite = VertexLayout::XYZColorUV.declaration().unwrap();
        assert_eq!(sprite.stride as usize, size_of::<SpriteVertex>());
        assert_eq!(sprite.attributes.len(), 3);

        let instance = VertexLayout::BillboardInstance.declaration().unwrap();
        assert_eq!(instance.step_mode, VertexStepMode::Instance);
        // Size and sin/cos are read together as one vec4.
        assert_eq!(instance.attributes[1].offset, 12);

        let matrix = VertexLayout::Matrix4.declaration().unwrap();
        assert_eq!(matrix.stride, 64);
        assert_eq!(matrix.attributes[3].offset, 48);

        assert!(VertexLayout::Custom(7).declaration().is_none());
    }

    #[test]
    fn test_billboard_rotation_is_stored_as_sin_cos() {
        let data = BillboardData::new(glam::Vec3::ZERO, glam::Vec2::ONE, 0.0, [255; 4]);
        assert_eq!(data.sin_cos, [0.0, 1.0]);
    }
}
