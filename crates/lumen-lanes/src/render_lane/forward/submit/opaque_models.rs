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

//! Batched meshes: pipeline → material → mesh → instances.

use super::{ActiveShader, SubmitContext};
use crate::render_lane::forward::draw_call::DrawCall;
use crate::render_lane::forward::light_pass::{draw_lit, LightUniformWriter};
use crate::render_lane::forward::stats::SubmissionStats;
use lumen_core::math::Mat4;
use lumen_core::renderer::api::{DeviceCapability, ShaderFlags, VertexLayout};
use lumen_core::renderer::error::ResourceError;
use lumen_core::renderer::traits::GraphicsDevice;
use lumen_data::render_queue::{MeshInstanceEntry, RenderQueueLayer};

pub(crate) fn submit(
    ctx: &mut SubmitContext<'_>,
    layer: &RenderQueueLayer,
) -> Result<(), ResourceError> {
    let instancing_available =
        ctx.settings.instancing_enabled && ctx.device.supports(DeviceCapability::Instancing);
    let mut current_shader = None;

    for (&pipeline_id, pipeline) in &layer.opaque_models {
        if !pipeline.enabled {
            continue;
        }

        let instancing = instancing_available
            && pipeline.max_instance_count > ctx.settings.min_instances_for_instancing;
        let flags = if instancing {
            ShaderFlags::INSTANCING
        } else {
            ShaderFlags::empty()
        };
        let (active, _) = ctx.apply_pipeline(pipeline_id, flags, &mut current_shader);

        for (&material_id, batch) in &pipeline.materials {
            if !batch.enabled {
                continue;
            }
            ctx.apply_material(material_id, flags);

            for (mesh, entry) in &batch.contents {
                // Left behind by a partial clear.
                if entry.instances.is_empty() {
                    continue;
                }
                ctx.device.set_index_buffer(mesh.index);
                ctx.device.set_vertex_buffer(mesh.vertex_buffer, mesh.vertex_layout);

                let call = DrawCall::for_mesh(mesh);
                if instancing {
                    draw_instanced(ctx, layer, &active, call, &entry.instances)?;
                } else {
                    draw_each(ctx, layer, &active, call, entry)?;
                }
            }
        }
    }
    Ok(())
}

/// Streams the instance matrices in chunks and draws each chunk once per light pass.
///
/// Instances share their light uniforms, so only directional lights can be applied.
fn draw_instanced(
    ctx: &mut SubmitContext<'_>,
    layer: &RenderQueueLayer,
    active: &ActiveShader,
    call: DrawCall,
    instances: &[Mat4],
) -> Result<(), ResourceError> {
    let buffer = ctx.instances;
    ctx.device
        .set_instance_buffer(buffer.buffer(), VertexLayout::Matrix4);
    let chunk_size = buffer.capacity::<Mat4>().max(1);

    let draw_chunks = |device: &mut dyn GraphicsDevice,
                       stats: &mut SubmissionStats|
     -> Result<(), ResourceError> {
        for chunk in instances.chunks(chunk_size) {
            buffer.fill(device, chunk)?;
            stats.buffer_fills += 1;
            call.instanced(device, chunk.len() as u32, stats);
        }
        Ok(())
    };

    match &active.uniforms.lights {
        Some(block) => {
            let selection = ctx.selector.select_directional(&layer.lights);
            let writer = LightUniformWriter {
                shader: active.shader.as_ref(),
                block,
                lights: &layer.lights,
                shadow_sampler: ctx.resources.shadow_sampler,
            };
            draw_lit(
                &mut *ctx.device,
                &writer,
                selection,
                ctx.settings.max_lights_per_pass,
                ctx.settings.max_light_passes_per_object,
                &mut *ctx.stats,
                draw_chunks,
            )
        }
        None => draw_chunks(&mut *ctx.device, &mut *ctx.stats),
    }
}

/// Draws every instance on its own, lit by the lights closest to it.
fn draw_each(
    ctx: &mut SubmitContext<'_>,
    layer: &RenderQueueLayer,
    active: &ActiveShader,
    call: DrawCall,
    entry: &MeshInstanceEntry,
) -> Result<(), ResourceError> {
    let Some(block) = &active.uniforms.lights else {
        for matrix in &entry.instances {
            ctx.device.set_world_matrix(matrix);
            call.single(&mut *ctx.device, &mut *ctx.stats);
        }
        return Ok(());
    };

    let writer = LightUniformWriter {
        shader: active.shader.as_ref(),
        block,
        lights: &layer.lights,
        shadow_sampler: ctx.resources.shadow_sampler,
    };

    for matrix in &entry.instances {
        let sphere = entry.bounding_sphere.transformed(matrix);
        let selection = ctx.selector.select(&layer.lights, &sphere, true);
        ctx.device.set_world_matrix(matrix);
        draw_lit(
            &mut *ctx.device,
            &writer,
            selection,
            ctx.settings.max_lights_per_pass,
            ctx.settings.max_light_passes_per_object,
            &mut *ctx.stats,
            |device, stats| {
                call.single(device, stats);
                Ok(())
            },
        )?;
    }
    Ok(())
}
