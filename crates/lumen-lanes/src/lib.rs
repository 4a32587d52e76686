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

//! # Lumen Lanes
//!
//! Hot-path execution of the rendering techniques. The forward technique lives in
//! [`render_lane::forward`]; it consumes a
//! [`ForwardRenderQueue`](lumen_data::render_queue::ForwardRenderQueue) and emits
//! draw calls through the [`GraphicsDevice`](lumen_core::renderer::GraphicsDevice)
//! contract.

#![warn(missing_docs)]

pub mod render_lane;

pub use render_lane::forward::{
    ForwardRenderTechnique, ForwardSettings, SettingsError, SubmissionStats, TechniqueResources,
};
pub use render_lane::RenderTechnique;
