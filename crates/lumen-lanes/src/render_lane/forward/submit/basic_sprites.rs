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

//! Batched sprites, streamed through the shared quad index buffer.

use super::SubmitContext;
use crate::render_lane::forward::packer::{pack_chains, ChainCursor};
use lumen_core::math::Mat4;
use lumen_core::renderer::api::{
    PrimitiveTopology, ShaderFlags, SpriteVertex, TextureMap, VertexLayout,
};
use lumen_core::renderer::error::ResourceError;
use lumen_data::render_queue::RenderQueueLayer;

/// Shader permutation used by every sprite.
pub(crate) const SPRITE_FLAGS: ShaderFlags =
    ShaderFlags::TEXTURE_OVERLAY.union(ShaderFlags::VERTEX_COLOR);

/// Binds the state every sprite draw shares.
pub(crate) fn bind_sprite_buffers(ctx: &mut SubmitContext<'_>) {
    ctx.device
        .set_index_buffer(Some(ctx.resources.quad_index_buffer));
    ctx.device.set_world_matrix(&Mat4::IDENTITY);
    ctx.device
        .set_vertex_buffer(ctx.streaming.buffer(), VertexLayout::XYZColorUV);
}

pub(crate) fn submit(
    ctx: &mut SubmitContext<'_>,
    layer: &RenderQueueLayer,
) -> Result<(), ResourceError> {
    bind_sprite_buffers(ctx);
    let mut current_shader = None;

    for (&pipeline_id, pipeline) in &layer.opaque_sprites {
        if !pipeline.enabled {
            continue;
        }
        ctx.apply_pipeline(pipeline_id, SPRITE_FLAGS, &mut current_shader);

        for (&material_id, batch) in &pipeline.materials {
            if !batch.enabled {
                continue;
            }
            ctx.apply_material(material_id, SPRITE_FLAGS);
            ctx.bind_overlay_sampler(material_id);

            for (overlay, chains) in &batch.contents {
                if chains.is_empty() {
                    continue;
                }
                let texture = overlay.unwrap_or(ctx.resources.white_texture);
                ctx.device.set_texture(TextureMap::Overlay.unit(), texture);

                let mut cursor = ChainCursor::default();
                while !cursor.is_done(chains.len()) {
                    let mut writer = ctx.streaming.map::<SpriteVertex>(&mut *ctx.device);
                    pack_chains(
                        &mut writer,
                        chains.len(),
                        |i| chains.chain(i),
                        &mut cursor,
                        ctx.segments,
                    );
                    let quads = writer.unmap()?;
                    if quads == 0 {
                        break;
                    }
                    ctx.stats.buffer_fills += 1;

                    ctx.device
                        .draw_indexed(PrimitiveTopology::TriangleList, 0, (quads * 6) as u32);
                    ctx.stats.record_draw();
                }
            }
        }
    }
    Ok(())
}
