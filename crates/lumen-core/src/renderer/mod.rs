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

//! Provides the public, backend-agnostic rendering contracts used by the forward technique.
//!
//! This module defines the "common language" between the technique and its collaborators:
//! the abstract `traits` (like [`GraphicsDevice`] and [`MaterialBinder`]), the resource
//! handles and descriptors of the [`api`] module, the light records, the shader uniform
//! contract and the error types.
//!
//! The concrete graphics backend, shader compiler and material system live outside this
//! workspace and implement these traits.

pub mod api;
pub mod error;
pub mod light;
pub mod scene;
pub mod shader;
pub mod traits;

// Re-export the most important traits and types for easier use.
pub use self::api::*;
pub use self::error::{RenderError, ResourceError};
pub use self::light::{DirectionalLight, LightKind, LightLists, PointLight, SpotLight};
pub use self::scene::{Background, Drawable, SceneData, Viewer};
pub use self::shader::{
    Shader, ShaderEvent, ShaderObserver, ShaderSignals, UniformLocation, UniformValue,
};
pub use self::traits::{GraphicsDevice, MaterialBinder};
