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

//! Rendering lanes: the hot path turning a render queue into draw calls.

use lumen_core::renderer::error::RenderError;
use lumen_core::renderer::scene::SceneData;
use lumen_core::renderer::traits::{GraphicsDevice, MaterialBinder};

pub mod forward;

/// Abstract cost of one draw call.
pub(crate) const DRAW_CALL_COST: f32 = 0.1;
/// Cost multiplier per light in a layer.
pub(crate) const LIGHT_COST_FACTOR: f32 = 0.05;

/// A rendering strategy consuming its own render queue.
///
/// The frame loop calls [`clear`](Self::clear) once the target is bound, then
/// [`draw`](Self::draw) once the queue is populated. Different implementations
/// can be swapped without touching the scene producer.
pub trait RenderTechnique {
    /// Returns a human-readable identifier for this rendering strategy.
    fn strategy_name(&self) -> &'static str;

    /// Resets the depth state and draws the scene background.
    fn clear(&self, scene: &SceneData<'_>, device: &mut dyn GraphicsDevice);

    /// Draws the queued scene.
    ///
    /// # Errors
    ///
    /// Fails when a per-frame buffer upload fails. The frame is then incomplete.
    fn draw(
        &mut self,
        scene: &SceneData<'_>,
        device: &mut dyn GraphicsDevice,
        materials: &mut dyn MaterialBinder,
    ) -> Result<(), RenderError>;

    /// Estimates the GPU cost of drawing the current queue.
    ///
    /// The cost is measured in abstract units proportional to the number of draw
    /// calls, scaled up by the number of lights. Higher values indicate more
    /// expensive rendering.
    fn estimate_cost(&self) -> f32;
}
