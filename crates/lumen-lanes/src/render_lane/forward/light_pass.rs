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

//! Light uniforms and multi-pass lighting.
//!
//! A shader exposes a fixed number of light slots. An object lit by more lights
//! than that is drawn several times: the first pass with the current blend and
//! depth state, every later pass additively on top of it with an `Equal` depth
//! test, so only the surfaces laid down by the first pass receive more light.

use super::light_selector::LightIndex;
use super::stats::SubmissionStats;
use super::uniform_cache::LightUniformBlock;
use lumen_core::math::{Mat4, Vec2, Vec3};
use lumen_core::renderer::api::{BlendState, CompareFunction, SamplerId, TextureMap};
use lumen_core::renderer::error::ResourceError;
use lumen_core::renderer::light::{LightKind, LightLists, DISABLED_LIGHT_CODE};
use lumen_core::renderer::shader::{Shader, UniformLocation, UniformValue};
use lumen_core::renderer::traits::GraphicsDevice;

/// Number of passes needed to apply `light_count` lights `lights_per_pass` at a time.
///
/// Always at least one pass, so unlit objects still receive their ambient term,
/// and never more than `max_passes` when a cap is given.
pub fn pass_count(light_count: usize, lights_per_pass: usize, max_passes: Option<usize>) -> usize {
    let needed = light_count.div_ceil(lights_per_pass.max(1)).max(1);
    match max_passes {
        Some(max) => needed.min(max.max(1)),
        None => needed,
    }
}

/// The device state multi-pass drawing changes, captured before the first pass.
#[derive(Debug, Clone, Copy)]
pub struct PassState {
    blend: BlendState,
    depth_compare: CompareFunction,
    changed: bool,
}

impl PassState {
    /// Captures the current blend state and depth comparison of `device`.
    pub fn capture(device: &dyn GraphicsDevice) -> Self {
        Self {
            blend: device.blend_state(),
            depth_compare: device.depth_compare(),
            changed: false,
        }
    }

    /// Prepares the device for pass number `pass`.
    ///
    /// The additive state is set once, on the second pass, and stays in place
    /// for the following ones.
    pub fn begin_pass(&mut self, device: &mut dyn GraphicsDevice, pass: usize) {
        if pass == 1 {
            device.set_blend_state(BlendState::ADDITIVE);
            device.set_depth_compare(CompareFunction::Equal);
            self.changed = true;
        }
    }

    /// Puts back the captured state if a pass changed it.
    pub fn restore(self, device: &mut dyn GraphicsDevice) {
        if self.changed {
            device.set_blend_state(self.blend);
            device.set_depth_compare(self.depth_compare);
        }
    }
}

/// Writes lights into the light slots of one shader.
pub struct LightUniformWriter<'a> {
    /// The shader receiving the uniforms.
    pub shader: &'a dyn Shader,
    /// Its light array.
    pub block: &'a LightUniformBlock,
    /// The lights the selection indexes into.
    pub lights: &'a LightLists,
    /// Sampler bound with every shadow map.
    pub shadow_sampler: SamplerId,
}

impl LightUniformWriter<'_> {
    #[inline]
    fn field(&self, location: Option<UniformLocation>, slot: usize) -> Option<UniformLocation> {
        location.map(|l| l.offset(self.block.slot_offset(slot)))
    }

    #[inline]
    fn send(&self, location: Option<UniformLocation>, slot: usize, value: UniformValue) {
        if let Some(location) = self.field(location, slot) {
            self.shader.send_uniform(location, value);
        }
    }

    /// Marks `slot` as unused.
    pub fn disable(&self, slot: usize) {
        self.send(
            Some(self.block.kind),
            slot,
            UniformValue::Int(DISABLED_LIGHT_CODE),
        );
    }

    /// Sends the light referenced by `light` into `slot`, binding its shadow map if it has one.
    pub fn write(&self, device: &mut dyn GraphicsDevice, slot: usize, light: &LightIndex) {
        let block = self.block;
        self.send(
            Some(block.kind),
            slot,
            UniformValue::Int(light.kind.shader_code()),
        );

        let (color, ambient, diffuse, shadow_map) = match light.kind {
            LightKind::Directional => {
                let l = &self.lights.directional[light.index];
                self.send(
                    block.parameters1,
                    slot,
                    UniformValue::Vec4(l.direction.extend(0.0)),
                );
                self.send_view_proj(slot, l.shadow_map.is_some(), &l.transform_matrix);
                (l.color, l.ambient_factor, l.diffuse_factor, l.shadow_map)
            }
            LightKind::Point => {
                let l = &self.lights.point[light.index];
                self.send(
                    block.parameters1,
                    slot,
                    UniformValue::Vec4(l.position.extend(l.attenuation)),
                );
                self.send(
                    block.parameters2,
                    slot,
                    UniformValue::Vec4(Vec3::ZERO.extend(l.inv_radius())),
                );
                (l.color, l.ambient_factor, l.diffuse_factor, l.shadow_map)
            }
            LightKind::Spot => {
                let l = &self.lights.spot[light.index];
                self.send(
                    block.parameters1,
                    slot,
                    UniformValue::Vec4(l.position.extend(l.attenuation)),
                );
                self.send(
                    block.parameters2,
                    slot,
                    UniformValue::Vec4(l.direction.extend(l.inv_radius())),
                );
                self.send(
                    block.parameters3,
                    slot,
                    UniformValue::Vec2(Vec2::new(l.inner_angle_cosine, l.outer_angle_cosine)),
                );
                self.send_view_proj(slot, l.shadow_map.is_some(), &l.transform_matrix);
                (l.color, l.ambient_factor, l.diffuse_factor, l.shadow_map)
            }
        };

        self.send(block.color, slot, UniformValue::Color(color));
        self.send(
            block.factors,
            slot,
            UniformValue::Vec2(Vec2::new(ambient, diffuse)),
        );
        self.send(
            block.shadow_mapping,
            slot,
            UniformValue::Bool(shadow_map.is_some()),
        );

        if let Some(texture) = shadow_map {
            let unit = match light.kind {
                LightKind::Point => TextureMap::ShadowCube(slot as u32),
                LightKind::Directional | LightKind::Spot => TextureMap::Shadow2D(slot as u32),
            }
            .unit();
            device.set_texture(unit, texture);
            device.set_sampler(unit, self.shadow_sampler);
        }
    }

    fn send_view_proj(&self, slot: usize, shadowed: bool, matrix: &Mat4) {
        if !shadowed {
            return;
        }
        // Consecutive array, not part of the light struct.
        if let Some(location) = self.block.view_proj_matrix {
            self.shader
                .send_uniform(location.offset(slot as i32), UniformValue::Mat4(*matrix));
        }
    }

    /// Fills `slot_count` slots starting at `first_slot` with `selection`, disabling the leftover slots.
    pub fn write_slots(
        &self,
        device: &mut dyn GraphicsDevice,
        selection: &[LightIndex],
        first_slot: usize,
        slot_count: usize,
    ) {
        for i in 0..slot_count {
            match selection.get(i) {
                Some(light) => self.write(device, first_slot + i, light),
                None => self.disable(first_slot + i),
            }
        }
    }
}

/// Draws one object once per light pass.
///
/// Each pass fills all `lights_per_pass` slots with the next lights of
/// `selection` and calls `draw`. The device blend and depth state are restored
/// after the last pass, even when `draw` fails.
pub fn draw_lit<F>(
    device: &mut dyn GraphicsDevice,
    writer: &LightUniformWriter<'_>,
    selection: &[LightIndex],
    lights_per_pass: usize,
    max_passes: Option<usize>,
    stats: &mut SubmissionStats,
    mut draw: F,
) -> Result<(), ResourceError>
where
    F: FnMut(&mut dyn GraphicsDevice, &mut SubmissionStats) -> Result<(), ResourceError>,
{
    let lights_per_pass = lights_per_pass.max(1);
    let passes = pass_count(selection.len(), lights_per_pass, max_passes);
    let mut state = PassState::capture(device);

    let mut result = Ok(());
    for pass in 0..passes {
        state.begin_pass(device, pass);
        if pass > 0 {
            stats.extra_light_passes += 1;
        }

        let start = (pass * lights_per_pass).min(selection.len());
        let end = (start + lights_per_pass).min(selection.len());
        writer.write_slots(device, &selection[start..end], 0, lights_per_pass);

        result = draw(device, stats);
        if result.is_err() {
            break;
        }
    }

    state.restore(device);
    result
}
