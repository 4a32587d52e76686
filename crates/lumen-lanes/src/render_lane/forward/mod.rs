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

//! The forward rendering technique.
//!
//! Every object is drawn once per light pass with its lights sent as shader
//! uniforms. Per layer, the categories are drawn in a fixed order: opaque
//! meshes, depth-sorted meshes, opaque sprites, depth-sorted sprites,
//! billboards, then the drawables that issue their own calls.

pub mod draw_call;
pub mod light_pass;
pub mod light_selector;
pub mod packer;
mod resources;
pub mod settings;
mod stats;
pub mod streaming;
mod submit;
pub mod uniform_cache;

#[cfg(test)]
mod test_device;

pub use self::resources::{quad_indices, TechniqueResources, SHARED_LAYOUTS};
pub use self::settings::{ForwardSettings, SettingsError};
pub use self::stats::SubmissionStats;

use self::light_selector::LightSelector;
use self::packer::ChainSegment;
use self::streaming::{InstanceBuffer, StreamingVertexBuffer};
use self::submit::{
    basic_sprites, billboards, opaque_models, ordered_sprites, transparent_models, SubmitContext,
};
use self::uniform_cache::ShaderUniformCache;
use super::{RenderTechnique, DRAW_CALL_COST, LIGHT_COST_FACTOR};
use lumen_core::renderer::error::RenderError;
use lumen_core::renderer::scene::SceneData;
use lumen_core::renderer::traits::{GraphicsDevice, MaterialBinder};
use lumen_data::render_queue::{ForwardRenderQueue, RenderQueueLayer};
use std::rc::Rc;

/// Forward rendering with per-object light selection, instancing and multi-pass lighting.
#[derive(Debug)]
pub struct ForwardRenderTechnique {
    resources: Rc<TechniqueResources>,
    settings: ForwardSettings,
    queue: ForwardRenderQueue,
    cache: ShaderUniformCache,
    selector: LightSelector,
    streaming: StreamingVertexBuffer,
    instances: InstanceBuffer,
    segments: Vec<ChainSegment>,
    stats: SubmissionStats,
}

impl ForwardRenderTechnique {
    /// Creates a technique drawing with the shared `resources`.
    ///
    /// Allocates the technique's own streaming and instance buffers.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InitializationFailed`] if `settings` are invalid or
    /// a buffer cannot be created. Nothing is left allocated in that case.
    pub fn new(
        resources: Rc<TechniqueResources>,
        device: &mut dyn GraphicsDevice,
        settings: ForwardSettings,
    ) -> Result<Self, RenderError> {
        log::info!("ForwardRenderTechnique: Initializing GPU resources...");

        if let Err(e) = settings.validate() {
            log::error!("ForwardRenderTechnique: Rejected settings: {}", e);
            return Err(RenderError::InitializationFailed(e.to_string()));
        }

        let max_quads = settings.max_quads.min(resources.max_quads);
        let streaming =
            StreamingVertexBuffer::new(device, settings.streaming_buffer_size, max_quads)
                .map_err(|e| {
                    log::error!("ForwardRenderTechnique: Failed to create streaming buffer: {}", e);
                    RenderError::InitializationFailed(e.to_string())
                })?;

        let instances = match InstanceBuffer::new(device, settings.instance_buffer_size) {
            Ok(instances) => instances,
            Err(e) => {
                log::error!("ForwardRenderTechnique: Failed to create instance buffer: {}", e);
                streaming.destroy(device);
                return Err(RenderError::InitializationFailed(e.to_string()));
            }
        };

        log::info!(
            "ForwardRenderTechnique: Ready ({} lights per pass, pass cap {:?}, instancing {}).",
            settings.max_lights_per_pass,
            settings.max_light_passes_per_object,
            if settings.instancing_enabled { "on" } else { "off" }
        );

        Ok(Self {
            resources,
            settings,
            queue: ForwardRenderQueue::new(),
            cache: ShaderUniformCache::new(),
            selector: LightSelector::new(),
            streaming,
            instances,
            segments: Vec::new(),
            stats: SubmissionStats::default(),
        })
    }

    /// Prepares the target for a new frame: enables depth testing and writes,
    /// clears the depth buffer and draws the scene background, if any.
    pub fn clear(&self, scene: &SceneData<'_>, device: &mut dyn GraphicsDevice) {
        device.set_depth_test(true);
        device.set_depth_write(true);
        device.clear_depth();

        if let Some(background) = scene.background {
            background.draw(device, scene.viewer);
        }
    }

    /// Sorts the render queue for the scene viewer and draws every layer.
    ///
    /// # Errors
    ///
    /// Returns the first device write failure. Layers drawn before it stay drawn.
    pub fn draw(
        &mut self,
        scene: &SceneData<'_>,
        device: &mut dyn GraphicsDevice,
        materials: &mut dyn MaterialBinder,
    ) -> Result<(), RenderError> {
        self.stats = SubmissionStats::default();
        self.queue.sort(scene.viewer);

        let Self {
            resources,
            settings,
            queue,
            cache,
            selector,
            streaming,
            instances,
            segments,
            stats,
        } = self;

        let mut ctx = SubmitContext {
            device: &mut *device,
            materials,
            scene: *scene,
            resources: &**resources,
            settings,
            cache,
            selector,
            streaming,
            instances,
            segments,
            stats,
        };

        for (order, layer) in queue.layers() {
            log::trace!("ForwardRenderTechnique: Drawing layer {}", order);
            draw_layer(&mut ctx, layer)?;
        }

        log::debug!("ForwardRenderTechnique: {}", self.stats);
        Ok(())
    }

    /// The queue the scene producer fills.
    pub fn render_queue(&self) -> &ForwardRenderQueue {
        &self.queue
    }

    /// Mutable access to the queue, for population.
    pub fn render_queue_mut(&mut self) -> &mut ForwardRenderQueue {
        &mut self.queue
    }

    /// Caps how many light passes an object may take, or lifts the cap with `None`.
    ///
    /// A cap below 1 is raised to 1. Lights beyond the cap are not drawn.
    pub fn set_max_light_pass_per_object(&mut self, passes: Option<usize>) {
        self.settings.max_light_passes_per_object = passes.map(|p| p.max(1));
    }

    /// The cap on light passes per object, if any.
    pub fn max_light_pass_per_object(&self) -> Option<usize> {
        self.settings.max_light_passes_per_object
    }

    /// Allows or forbids instanced submission.
    pub fn set_instancing_enabled(&mut self, enabled: bool) {
        self.settings.instancing_enabled = enabled;
    }

    /// Whether instanced submission may be used.
    pub fn instancing_enabled(&self) -> bool {
        self.settings.instancing_enabled
    }

    /// The active settings.
    pub fn settings(&self) -> &ForwardSettings {
        &self.settings
    }

    /// The shared resources this technique draws with.
    pub fn resources(&self) -> &Rc<TechniqueResources> {
        &self.resources
    }

    /// The uniform locations cached so far.
    pub fn uniform_cache(&self) -> &ShaderUniformCache {
        &self.cache
    }

    /// Counters of the last [`draw`](Self::draw).
    pub fn last_frame_stats(&self) -> SubmissionStats {
        self.stats
    }

    /// Releases the technique's own buffers. The shared resources are left alone.
    pub fn destroy(self, device: &mut dyn GraphicsDevice) {
        log::info!("ForwardRenderTechnique: Releasing GPU resources.");
        self.streaming.destroy(device);
        self.instances.destroy(device);
    }
}

fn draw_layer(ctx: &mut SubmitContext<'_>, layer: &RenderQueueLayer) -> Result<(), RenderError> {
    if layer.opaque_models.values().any(|p| p.enabled) {
        opaque_models::submit(ctx, layer)?;
    }
    if !layer.depth_sorted_meshes.is_empty() {
        transparent_models::submit(ctx, layer)?;
    }
    if layer.opaque_sprites.values().any(|p| p.enabled) {
        basic_sprites::submit(ctx, layer)?;
    }
    if !layer.depth_sorted_sprites.is_empty() {
        ordered_sprites::submit(ctx, layer)?;
    }
    if layer.billboards.values().any(|p| p.enabled) {
        billboards::submit(ctx, layer)?;
    }
    for drawable in &layer.other_drawables {
        drawable.draw(&mut *ctx.device);
    }
    Ok(())
}

/// Rough number of draw calls `layer` will produce.
fn estimate_layer_draws(layer: &RenderQueueLayer, settings: &ForwardSettings) -> usize {
    let mut draws = 0;
    for pipeline in layer.opaque_models.values().filter(|p| p.enabled) {
        let instanced = settings.instancing_enabled
            && pipeline.max_instance_count > settings.min_instances_for_instancing;
        for batch in pipeline.materials.values().filter(|b| b.enabled) {
            draws += if instanced {
                batch.contents.len()
            } else {
                batch.contents.values().map(|e| e.instances.len()).sum()
            };
        }
    }
    draws += layer.depth_sorted_meshes.len();
    for pipeline in layer.opaque_sprites.values().filter(|p| p.enabled) {
        for batch in pipeline.materials.values().filter(|b| b.enabled) {
            draws += batch
                .contents
                .values()
                .map(|chains| chains.quad_count().div_ceil(settings.max_quads))
                .sum::<usize>();
        }
    }
    draws += layer.depth_sorted_sprites.len();
    for pipeline in layer.billboards.values().filter(|p| p.enabled) {
        draws += pipeline.materials.values().filter(|b| b.enabled).count();
    }
    draws + layer.other_drawables.len()
}

impl RenderTechnique for ForwardRenderTechnique {
    fn strategy_name(&self) -> &'static str {
        "Forward"
    }

    fn clear(&self, scene: &SceneData<'_>, device: &mut dyn GraphicsDevice) {
        ForwardRenderTechnique::clear(self, scene, device);
    }

    fn draw(
        &mut self,
        scene: &SceneData<'_>,
        device: &mut dyn GraphicsDevice,
        materials: &mut dyn MaterialBinder,
    ) -> Result<(), RenderError> {
        ForwardRenderTechnique::draw(self, scene, device, materials)
    }

    fn estimate_cost(&self) -> f32 {
        let mut cost = 0.0;
        for (_, layer) in self.queue.layers() {
            let draws = estimate_layer_draws(layer, &self.settings) as f32;
            let light_factor = 1.0 + layer.lights.len() as f32 * LIGHT_COST_FACTOR;
            cost += draws * DRAW_CALL_COST * light_factor;
        }
        cost
    }
}
