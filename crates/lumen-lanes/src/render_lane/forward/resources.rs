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

//! GPU resources shared by every forward technique instance.
//!
//! The quad index buffer, the unit quad, the fallback overlay texture, the shadow
//! sampler and the well-known vertex layouts are created once by
//! [`TechniqueResources::initialize`] and handed to each technique as an
//! `Rc<TechniqueResources>`. Whoever initialized them calls
//! [`TechniqueResources::destroy`] once no technique uses them anymore.

use super::settings::DEFAULT_MAX_QUADS;
use lumen_core::renderer::{
    api::{
        AddressMode, BufferDescriptor, BufferId, BufferUsage, FilterMode, IndexBinding,
        IndexFormat, QuadVertex, SamplerDescriptor, SamplerId, TextureDescriptor, TextureFormat,
        TextureId, VertexLayout,
    },
    error::{RenderError, ResourceError},
    traits::GraphicsDevice,
};
use std::borrow::Cow;

/// Layouts declared to the device at initialization.
pub const SHARED_LAYOUTS: [VertexLayout; 5] = [
    VertexLayout::XY,
    VertexLayout::XYZColorUV,
    VertexLayout::BillboardPoint,
    VertexLayout::BillboardInstance,
    VertexLayout::Matrix4,
];

/// Corners of the unit quad, in triangle strip order.
const QUAD_CORNERS: [QuadVertex; 4] = [
    QuadVertex {
        position: [-0.5, -0.5],
    },
    QuadVertex {
        position: [0.5, -0.5],
    },
    QuadVertex {
        position: [-0.5, 0.5],
    },
    QuadVertex {
        position: [0.5, 0.5],
    },
];

/// Builds the indices of `max_quads` quads: two triangles per 4 vertices.
pub fn quad_indices(max_quads: usize) -> Vec<u16> {
    let mut indices = Vec::with_capacity(max_quads * 6);
    for quad in 0..max_quads {
        let base = (quad * 4) as u16;
        indices.extend_from_slice(&[base, base + 2, base + 1, base + 2, base + 3, base + 1]);
    }
    indices
}

/// Resources shared by all forward technique instances.
#[derive(Debug)]
pub struct TechniqueResources {
    /// Indices of `max_quads` quads.
    pub quad_index_buffer: IndexBinding,
    /// The four corners of the unit quad (layout [`VertexLayout::XY`]).
    pub quad_vertex_buffer: BufferId,
    /// A 1x1 opaque white texture bound when a sprite has no overlay.
    pub white_texture: TextureId,
    /// Bilinear, clamped sampler used for shadow maps.
    pub shadow_sampler: SamplerId,
    /// Number of quads covered by `quad_index_buffer`.
    pub max_quads: usize,
}

#[derive(Default)]
struct PartialResources {
    quad_index_buffer: Option<BufferId>,
    quad_vertex_buffer: Option<BufferId>,
    white_texture: Option<TextureId>,
}

impl PartialResources {
    fn release(self, device: &mut dyn GraphicsDevice) {
        for buffer in [self.quad_index_buffer, self.quad_vertex_buffer]
            .into_iter()
            .flatten()
        {
            if let Err(e) = device.destroy_buffer(buffer) {
                log::warn!("TechniqueResources: Failed to destroy buffer: {:?}", e);
            }
        }
        if let Some(texture) = self.white_texture {
            if let Err(e) = device.destroy_texture(texture) {
                log::warn!("TechniqueResources: Failed to destroy texture: {:?}", e);
            }
        }
    }
}

impl TechniqueResources {
    /// Creates the shared resources for quads of at most `max_quads` per draw.
    ///
    /// `max_quads` is clamped to what 16-bit indices can address. On failure,
    /// everything created so far is released again.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InitializationFailed`] if any resource cannot be created.
    pub fn initialize(
        device: &mut dyn GraphicsDevice,
        max_quads: usize,
    ) -> Result<Self, RenderError> {
        log::info!("TechniqueResources: Initializing GPU resources...");
        let max_quads = max_quads.clamp(1, DEFAULT_MAX_QUADS);

        let mut partial = PartialResources::default();
        match Self::create(device, max_quads, &mut partial) {
            Ok(resources) => {
                log::info!(
                    "TechniqueResources: Ready ({} quads per draw).",
                    resources.max_quads
                );
                Ok(resources)
            }
            Err(e) => {
                log::error!("TechniqueResources: Failed to initialize: {}", e);
                partial.release(device);
                Err(RenderError::InitializationFailed(e.to_string()))
            }
        }
    }

    fn create(
        device: &mut dyn GraphicsDevice,
        max_quads: usize,
        partial: &mut PartialResources,
    ) -> Result<Self, ResourceError> {
        let indices = quad_indices(max_quads);
        let index_buffer = device.create_buffer_with_data(
            &BufferDescriptor {
                label: Some(Cow::Borrowed("Forward Quad Indices")),
                size: std::mem::size_of_val(indices.as_slice()) as u64,
                usage: BufferUsage::INDEX,
            },
            bytemuck::cast_slice(&indices),
        )?;
        partial.quad_index_buffer = Some(index_buffer);

        let vertex_buffer = device.create_buffer_with_data(
            &BufferDescriptor {
                label: Some(Cow::Borrowed("Forward Unit Quad")),
                size: std::mem::size_of_val(&QUAD_CORNERS) as u64,
                usage: BufferUsage::VERTEX,
            },
            bytemuck::cast_slice(&QUAD_CORNERS),
        )?;
        partial.quad_vertex_buffer = Some(vertex_buffer);

        let white_texture = device.create_texture(
            &TextureDescriptor {
                label: Some(Cow::Borrowed("Forward White Overlay")),
                width: 1,
                height: 1,
                format: TextureFormat::Rgba8Unorm,
            },
            &[255, 255, 255, 255],
        )?;
        partial.white_texture = Some(white_texture);

        for layout in SHARED_LAYOUTS {
            if let Some(declaration) = layout.declaration() {
                device.declare_vertex_layout(layout, &declaration)?;
            }
        }

        let shadow_sampler = device.create_sampler(&SamplerDescriptor {
            label: Some(Cow::Borrowed("Forward Shadow Sampler")),
            filter: FilterMode::Bilinear,
            address_mode: AddressMode::ClampToEdge,
        })?;

        Ok(Self {
            quad_index_buffer: IndexBinding {
                buffer: index_buffer,
                format: IndexFormat::Uint16,
                count: indices.len() as u32,
            },
            quad_vertex_buffer: vertex_buffer,
            white_texture,
            shadow_sampler,
            max_quads,
        })
    }

    /// Releases every shared resource. Failures are logged and skipped.
    pub fn destroy(&self, device: &mut dyn GraphicsDevice) {
        log::info!("TechniqueResources: Releasing GPU resources.");
        for buffer in [self.quad_index_buffer.buffer, self.quad_vertex_buffer] {
            if let Err(e) = device.destroy_buffer(buffer) {
                log::warn!("TechniqueResources: Failed to destroy buffer: {:?}", e);
            }
        }
        if let Err(e) = device.destroy_texture(self.white_texture) {
            log::warn!("TechniqueResources: Failed to destroy texture: {:?}", e);
        }
        if let Err(e) = device.destroy_sampler(self.shadow_sampler) {
            log::warn!("TechniqueResources: Failed to destroy sampler: {:?}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_indices_pattern() {
        let indices = quad_indices(2);
        assert_eq!(indices, vec![0, 2, 1, 2, 3, 1, 4, 6, 5, 6, 7, 5]);
    }

    #[test]
    fn test_max_quads_fit_in_u16() {
        let indices = quad_indices(DEFAULT_MAX_QUADS);
        assert_eq!(indices.len(), DEFAULT_MAX_QUADS * 6);
        let highest = *indices.iter().max().unwrap() as usize;
        assert_eq!(highest, DEFAULT_MAX_QUADS * 4 - 1);
    }
}
