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

use crate::math::Mat4;
use crate::renderer::api::*;
use crate::renderer::error::ResourceError;
use std::fmt::Debug;

/// An immediate-mode graphics device.
///
/// Binding calls change the device state until overwritten; draw calls consume the
/// currently bound state. Buffers, textures and samplers are addressed by opaque ids.
pub trait GraphicsDevice: Debug {
    /// Creates a new GPU buffer.
    /// ## Arguments
    /// * `descriptor` - A reference to a `BufferDescriptor` containing the buffer configuration.
    /// ## Returns
    /// A `Result` containing the ID of the created buffer or an error if the creation fails.
    fn create_buffer(&mut self, descriptor: &BufferDescriptor) -> Result<BufferId, ResourceError>;

    /// Creates a new GPU buffer and initializes it with the provided data.
    /// ## Arguments
    /// * `descriptor` - A reference to a `BufferDescriptor` containing the buffer configuration.
    /// * `data` - A slice of bytes containing the initial data for the buffer.
    fn create_buffer_with_data(
        &mut self,
        descriptor: &BufferDescriptor,
        data: &[u8],
    ) -> Result<BufferId, ResourceError>;

    /// Writes data to a GPU buffer, replacing `data.len()` bytes starting at `offset`.
    fn write_buffer(&mut self, id: BufferId, offset: u64, data: &[u8])
        -> Result<(), ResourceError>;

    /// Destroys a GPU buffer.
    fn destroy_buffer(&mut self, id: BufferId) -> Result<(), ResourceError>;

    /// Creates a 2D texture initialized with `data` (tightly packed rows).
    fn create_texture(
        &mut self,
        descriptor: &TextureDescriptor,
        data: &[u8],
    ) -> Result<TextureId, ResourceError>;

    /// Destroys a texture.
    fn destroy_texture(&mut self, id: TextureId) -> Result<(), ResourceError>;

    /// Creates a sampler.
    fn create_sampler(&mut self, descriptor: &SamplerDescriptor)
        -> Result<SamplerId, ResourceError>;

    /// Destroys a sampler.
    fn destroy_sampler(&mut self, id: SamplerId) -> Result<(), ResourceError>;

    /// Registers the memory layout referenced by `layout`.
    fn declare_vertex_layout(
        &mut self,
        layout: VertexLayout,
        declaration: &VertexDeclaration,
    ) -> Result<(), ResourceError>;

    /// Returns `true` if the device supports `capability`.
    fn supports(&self, capability: DeviceCapability) -> bool;

    /// Binds the per-vertex stream.
    fn set_vertex_buffer(&mut self, buffer: BufferId, layout: VertexLayout);

    /// Binds the index buffer, or unbinds it with `None`.
    fn set_index_buffer(&mut self, binding: Option<IndexBinding>);

    /// Binds the per-instance stream used by instanced draws.
    fn set_instance_buffer(&mut self, buffer: BufferId, layout: VertexLayout);

    /// Binds `texture` on texture unit `unit`.
    fn set_texture(&mut self, unit: u32, texture: TextureId);

    /// Binds `sampler` on texture unit `unit`.
    fn set_sampler(&mut self, unit: u32, sampler: SamplerId);

    /// Sets the world matrix used by non-instanced draws.
    fn set_world_matrix(&mut self, matrix: &Mat4);

    /// Clears the depth buffer.
    fn clear_depth(&mut self);

    /// Enables or disables depth testing.
    fn set_depth_test(&mut self, enabled: bool);

    /// Enables or disables depth writes.
    fn set_depth_write(&mut self, enabled: bool);

    /// The current depth comparison function.
    fn depth_compare(&self) -> CompareFunction;

    /// Sets the depth comparison function.
    fn set_depth_compare(&mut self, compare: CompareFunction);

    /// The current blend state.
    fn blend_state(&self) -> BlendState;

    /// Sets the blend state.
    fn set_blend_state(&mut self, state: BlendState);

    /// Draws `vertex_count` vertices of the bound vertex buffer starting at `first_vertex`.
    fn draw(&mut self, topology: PrimitiveTopology, first_vertex: u32, vertex_count: u32);

    /// Draws `index_count` indices of the bound index buffer starting at `first_index`.
    fn draw_indexed(&mut self, topology: PrimitiveTopology, first_index: u32, index_count: u32);

    /// Draws `instance_count` instances of a non-indexed range.
    fn draw_instanced(
        &mut self,
        topology: PrimitiveTopology,
        first_vertex: u32,
        vertex_count: u32,
        instance_count: u32,
    );

    /// Draws `instance_count` instances of an indexed range.
    fn draw_indexed_instanced(
        &mut self,
        topology: PrimitiveTopology,
        first_index: u32,
        index_count: u32,
        instance_count: u32,
    );
}
