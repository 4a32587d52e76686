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

use crate::renderer::api::{MaterialId, PipelineId, SamplerId, ShaderFlags};
use crate::renderer::shader::Shader;
use crate::renderer::traits::GraphicsDevice;
use std::rc::Rc;

/// Binds pipelines and materials on the device.
///
/// Implemented by the material system. The technique calls it only when the
/// pipeline or material actually changes between two batches.
pub trait MaterialBinder {
    /// Binds the permutation of `pipeline` selected by `flags` and returns its shader.
    ///
    /// Applying the same pipeline with the same flags must return the same shader.
    fn apply_pipeline(
        &mut self,
        device: &mut dyn GraphicsDevice,
        pipeline: PipelineId,
        flags: ShaderFlags,
    ) -> Rc<dyn Shader>;

    /// Binds the textures and parameters of `material` for the shader selected by `flags`.
    fn apply_material(
        &mut self,
        device: &mut dyn GraphicsDevice,
        material: MaterialId,
        flags: ShaderFlags,
    );

    /// The sampler used for the diffuse map of `material`.
    ///
    /// Sprites sample their overlay texture with it.
    fn diffuse_sampler(&self, material: MaterialId) -> SamplerId;
}
