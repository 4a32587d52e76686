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

//! The draw submitters, one per renderable class.
//!
//! Each submitter walks one category of a
//! [`RenderQueueLayer`](lumen_data::render_queue::RenderQueueLayer) and turns it into
//! device calls. They share a [`SubmitContext`] holding the frame's device,
//! material binder and the technique's scratch state.

pub(crate) mod basic_sprites;
pub(crate) mod billboards;
pub(crate) mod opaque_models;
pub(crate) mod ordered_sprites;
pub(crate) mod transparent_models;

use super::light_selector::LightSelector;
use super::packer::ChainSegment;
use super::settings::ForwardSettings;
use super::stats::SubmissionStats;
use super::streaming::{InstanceBuffer, StreamingVertexBuffer};
use super::uniform_cache::{ShaderUniformCache, ShaderUniforms};
use super::TechniqueResources;
use lumen_core::renderer::api::{MaterialId, PipelineId, ShaderFlags, ShaderId, TextureMap};
use lumen_core::renderer::scene::SceneData;
use lumen_core::renderer::shader::{Shader, UniformValue};
use lumen_core::renderer::traits::{GraphicsDevice, MaterialBinder};
use std::rc::Rc;

/// The shader bound by the last pipeline application, with its uniform locations.
pub(crate) struct ActiveShader {
    pub shader: Rc<dyn Shader>,
    pub uniforms: Rc<ShaderUniforms>,
}

/// Everything a submitter needs for one frame.
pub(crate) struct SubmitContext<'f> {
    pub device: &'f mut dyn GraphicsDevice,
    pub materials: &'f mut dyn MaterialBinder,
    pub scene: SceneData<'f>,
    pub resources: &'f TechniqueResources,
    pub settings: &'f ForwardSettings,
    pub cache: &'f ShaderUniformCache,
    pub selector: &'f mut LightSelector,
    pub streaming: &'f mut StreamingVertexBuffer,
    pub instances: &'f InstanceBuffer,
    pub segments: &'f mut Vec<ChainSegment>,
    pub stats: &'f mut SubmissionStats,
}

impl SubmitContext<'_> {
    /// Applies `pipeline` with `flags` and returns its shader.
    ///
    /// When the shader differs from `current`, the per-shader scene uniforms
    /// are sent and `current` is updated. The returned flag tells whether that
    /// happened.
    pub fn apply_pipeline(
        &mut self,
        pipeline: PipelineId,
        flags: ShaderFlags,
        current: &mut Option<ShaderId>,
    ) -> (ActiveShader, bool) {
        let shader = self
            .materials
            .apply_pipeline(&mut *self.device, pipeline, flags);
        self.stats.pipeline_applications += 1;
        let uniforms = self.cache.get(shader.as_ref());

        let changed = *current != Some(shader.id());
        if changed {
            *current = Some(shader.id());
            self.send_scene_uniforms(shader.as_ref(), &uniforms, flags);
        }
        (ActiveShader { shader, uniforms }, changed)
    }

    fn send_scene_uniforms(
        &self,
        shader: &dyn Shader,
        uniforms: &ShaderUniforms,
        flags: ShaderFlags,
    ) {
        if let Some(location) = uniforms.scene_ambient {
            shader.send_uniform(location, UniformValue::Color(self.scene.ambient_color));
        }
        if let Some(location) = uniforms.eye_position {
            shader.send_uniform(
                location,
                UniformValue::Vec3(self.scene.viewer.eye_position()),
            );
        }
        if flags.contains(ShaderFlags::TEXTURE_OVERLAY) {
            if let Some(location) = uniforms.texture_overlay {
                shader.send_uniform(
                    location,
                    UniformValue::Int(TextureMap::Overlay.unit() as i32),
                );
            }
        }
    }

    /// Applies `material` for the shader selected by `flags`.
    pub fn apply_material(&mut self, material: MaterialId, flags: ShaderFlags) {
        self.materials
            .apply_material(&mut *self.device, material, flags);
        self.stats.material_applications += 1;
    }

    /// Binds the diffuse sampler of `material` on the overlay unit.
    pub fn bind_overlay_sampler(&mut self, material: MaterialId) {
        let sampler = self.materials.diffuse_sampler(material);
        self.device.set_sampler(TextureMap::Overlay.unit(), sampler);
    }
}
