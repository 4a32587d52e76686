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

//! Depth-sorted sprites.
//!
//! The sorted chains are packed back to back into the streaming buffer. Each
//! fill is drawn one segment at a time so the material and overlay can change
//! between two chains without breaking the back-to-front order.

use super::basic_sprites::{bind_sprite_buffers, SPRITE_FLAGS};
use super::SubmitContext;
use crate::render_lane::forward::packer::{pack_chains, ChainCursor};
use lumen_core::renderer::api::{
    MaterialId, PipelineId, PrimitiveTopology, SpriteVertex, TextureId, TextureMap,
};
use lumen_core::renderer::error::ResourceError;
use lumen_data::render_queue::RenderQueueLayer;

pub(crate) fn submit(
    ctx: &mut SubmitContext<'_>,
    layer: &RenderQueueLayer,
) -> Result<(), ResourceError> {
    let order = &layer.depth_sorted_sprites;
    let data = &layer.depth_sorted_sprite_data;
    debug_assert!(
        order.iter().all(|&i| i < data.len()),
        "depth-sorted sprite index out of range"
    );

    bind_sprite_buffers(ctx);
    let mut current_shader = None;
    let mut last_pipeline: Option<PipelineId> = None;
    let mut last_material: Option<MaterialId> = None;
    let mut last_overlay: Option<TextureId> = None;

    let mut cursor = ChainCursor::default();
    while !cursor.is_done(order.len()) {
        let mut writer = ctx.streaming.map::<SpriteVertex>(&mut *ctx.device);
        pack_chains(
            &mut writer,
            order.len(),
            |i| layer.sorted_sprite_vertices(&data[order[i]]),
            &mut cursor,
            ctx.segments,
        );
        if writer.unmap()? == 0 {
            break;
        }
        ctx.stats.buffer_fills += 1;

        for i in 0..ctx.segments.len() {
            let segment = ctx.segments[i];
            let entry = &data[order[segment.chain]];
            let material = entry.material;

            if last_pipeline != Some(material.pipeline) {
                ctx.apply_pipeline(material.pipeline, SPRITE_FLAGS, &mut current_shader);
                last_pipeline = Some(material.pipeline);
                // A material is bound per pipeline.
                last_material = None;
            }
            if last_material != Some(material.id) {
                ctx.apply_material(material.id, SPRITE_FLAGS);
                ctx.bind_overlay_sampler(material.id);
                last_material = Some(material.id);
                // The material may have touched the overlay unit.
                last_overlay = None;
            }

            let overlay = entry.overlay.unwrap_or(ctx.resources.white_texture);
            if last_overlay != Some(overlay) {
                ctx.device.set_texture(TextureMap::Overlay.unit(), overlay);
                last_overlay = Some(overlay);
            }

            ctx.device.draw_indexed(
                PrimitiveTopology::TriangleList,
                (segment.buffer_quad * 6) as u32,
                (segment.quad_count * 6) as u32,
            );
            ctx.stats.record_draw();
        }
    }
    Ok(())
}
