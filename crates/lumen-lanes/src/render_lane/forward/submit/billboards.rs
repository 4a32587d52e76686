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

//! Camera-facing billboards.
//!
//! With instancing, the billboard records are copied as-is into the instance
//! buffer and the unit quad is instanced once per billboard. Without it, each
//! billboard is expanded into four vertices and streamed like a sprite.

use super::SubmitContext;
use lumen_core::renderer::api::{
    BillboardData, BillboardVertex, DeviceCapability, PrimitiveTopology, ShaderFlags,
    VertexLayout,
};
use lumen_core::renderer::error::ResourceError;
use lumen_data::render_queue::RenderQueueLayer;

/// Texture coordinates of the expanded corners, matching the unit quad order.
const CORNER_UVS: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [0.0, 0.0], [1.0, 0.0]];

fn expand(billboard: &BillboardData) -> [BillboardVertex; 4] {
    CORNER_UVS.map(|uv| BillboardVertex {
        color: billboard.color,
        position: billboard.center,
        size: billboard.size,
        sin_cos: billboard.sin_cos,
        uv,
    })
}

pub(crate) fn submit(
    ctx: &mut SubmitContext<'_>,
    layer: &RenderQueueLayer,
) -> Result<(), ResourceError> {
    let instancing =
        ctx.settings.instancing_enabled && ctx.device.supports(DeviceCapability::Instancing);

    let mut flags = ShaderFlags::BILLBOARD | ShaderFlags::VERTEX_COLOR;
    if instancing {
        flags |= ShaderFlags::INSTANCING;
        ctx.device.set_index_buffer(None);
        ctx.device
            .set_vertex_buffer(ctx.resources.quad_vertex_buffer, VertexLayout::XY);
        ctx.device
            .set_instance_buffer(ctx.instances.buffer(), VertexLayout::BillboardInstance);
    } else {
        ctx.device
            .set_index_buffer(Some(ctx.resources.quad_index_buffer));
        ctx.device
            .set_vertex_buffer(ctx.streaming.buffer(), VertexLayout::BillboardPoint);
    }

    let mut current_shader = None;
    for (&pipeline_id, pipeline) in &layer.billboards {
        if !pipeline.enabled {
            continue;
        }
        ctx.apply_pipeline(pipeline_id, flags, &mut current_shader);

        for (&material_id, batch) in &pipeline.materials {
            if !batch.enabled || batch.contents.is_empty() {
                continue;
            }
            ctx.apply_material(material_id, flags);

            if instancing {
                draw_instanced(ctx, &batch.contents)?;
            } else {
                draw_expanded(ctx, &batch.contents)?;
            }
        }
    }
    Ok(())
}

fn draw_instanced(
    ctx: &mut SubmitContext<'_>,
    billboards: &[BillboardData],
) -> Result<(), ResourceError> {
    let chunk_size = ctx.instances.capacity::<BillboardData>().max(1);
    for chunk in billboards.chunks(chunk_size) {
        ctx.instances.fill(&mut *ctx.device, chunk)?;
        ctx.stats.buffer_fills += 1;

        ctx.device
            .draw_instanced(PrimitiveTopology::TriangleStrip, 0, 4, chunk.len() as u32);
        ctx.stats.record_instanced_draw();
    }
    Ok(())
}

fn draw_expanded(
    ctx: &mut SubmitContext<'_>,
    billboards: &[BillboardData],
) -> Result<(), ResourceError> {
    let mut next = 0;
    while next < billboards.len() {
        let mut writer = ctx.streaming.map::<BillboardVertex>(&mut *ctx.device);
        let count = writer.capacity().min(billboards.len() - next);
        if count == 0 {
            log::warn!("ForwardRenderTechnique: Streaming buffer cannot hold a single billboard");
            writer.unmap()?;
            break;
        }
        for billboard in &billboards[next..next + count] {
            writer.write_quad(expand(billboard));
        }
        let quads = writer.unmap()?;
        next += count;
        ctx.stats.buffer_fills += 1;

        ctx.device
            .draw_indexed(PrimitiveTopology::TriangleList, 0, (quads * 6) as u32);
        ctx.stats.record_draw();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expansion_keeps_billboard_and_sets_uvs() {
        let billboard = BillboardData {
            center: [1.0, 2.0, 3.0],
            size: [4.0, 5.0],
            sin_cos: [0.0, 1.0],
            color: [10, 20, 30, 40],
        };
        let quad = expand(&billboard);

        assert!(quad.iter().all(|v| v.position == billboard.center
            && v.size == billboard.size
            && v.sin_cos == billboard.sin_cos
            && v.color == billboard.color));
        let uvs: Vec<[f32; 2]> = quad.iter().map(|v| v.uv).collect();
        assert_eq!(uvs, CORNER_UVS.to_vec());
    }
}
