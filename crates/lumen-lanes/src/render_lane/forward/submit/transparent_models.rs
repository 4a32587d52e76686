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

//! Depth-sorted meshes, drawn back to front in a single pass each.
//!
//! Directional lights are sent once per shader into the first slots; every mesh
//! then fills the remaining slots with the positional lights nearest to it.

use super::SubmitContext;
use crate::render_lane::forward::draw_call::DrawCall;
use crate::render_lane::forward::light_pass::LightUniformWriter;
use crate::render_lane::forward::light_selector::LightIndex;
use lumen_core::renderer::api::{MaterialId, PipelineId, ShaderFlags};
use lumen_core::renderer::error::ResourceError;
use lumen_core::renderer::light::LightKind;
use lumen_data::render_queue::RenderQueueLayer;

pub(crate) fn submit(
    ctx: &mut SubmitContext<'_>,
    layer: &RenderQueueLayer,
) -> Result<(), ResourceError> {
    let lights_per_pass = ctx.settings.max_lights_per_pass;
    let mut current_shader = None;
    let mut last_pipeline: Option<PipelineId> = None;
    let mut last_material: Option<MaterialId> = None;
    let mut active = None;
    let mut directional_slots = 0;

    for &index in &layer.depth_sorted_meshes {
        debug_assert!(
            index < layer.depth_sorted_mesh_data.len(),
            "depth-sorted mesh index out of range"
        );
        let entry = &layer.depth_sorted_mesh_data[index];
        let material = entry.material;

        if last_pipeline != Some(material.pipeline) {
            let (shader, changed) =
                ctx.apply_pipeline(material.pipeline, ShaderFlags::empty(), &mut current_shader);
            if changed {
                directional_slots = 0;
                if let Some(block) = &shader.uniforms.lights {
                    directional_slots = layer.lights.directional.len().min(lights_per_pass);
                    let writer = LightUniformWriter {
                        shader: shader.shader.as_ref(),
                        block,
                        lights: &layer.lights,
                        shadow_sampler: ctx.resources.shadow_sampler,
                    };
                    for slot in 0..directional_slots {
                        let light = LightIndex {
                            kind: LightKind::Directional,
                            score: 0.0,
                            index: slot,
                        };
                        writer.write(&mut *ctx.device, slot, &light);
                    }
                }
            }
            last_pipeline = Some(material.pipeline);
            last_material = None;
            active = Some(shader);
        }

        if last_material != Some(material.id) {
            ctx.apply_material(material.id, ShaderFlags::empty());
            last_material = Some(material.id);
        }

        let mesh = &entry.mesh;
        ctx.device.set_index_buffer(mesh.index);
        ctx.device.set_vertex_buffer(mesh.vertex_buffer, mesh.vertex_layout);

        if let Some(shader) = &active {
            if let Some(block) = &shader.uniforms.lights {
                if directional_slots < lights_per_pass {
                    let selection = ctx.selector.select(&layer.lights, &entry.sphere, false);
                    let writer = LightUniformWriter {
                        shader: shader.shader.as_ref(),
                        block,
                        lights: &layer.lights,
                        shadow_sampler: ctx.resources.shadow_sampler,
                    };
                    writer.write_slots(
                        &mut *ctx.device,
                        selection,
                        directional_slots,
                        lights_per_pass - directional_slots,
                    );
                }
            }
        }

        ctx.device.set_world_matrix(&entry.transform);
        DrawCall::for_mesh(mesh).single(&mut *ctx.device, &mut *ctx.stats);
    }
    Ok(())
}
