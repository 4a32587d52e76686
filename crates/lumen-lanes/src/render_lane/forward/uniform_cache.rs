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

//! Per-shader cache of resolved uniform locations.
//!
//! Resolving a location is a string lookup in the shader, so the technique does
//! it once per shader and keeps the result until the shader reports that it was
//! released or that its locations changed.

use ahash::AHashMap;
use lumen_core::renderer::api::ShaderId;
use lumen_core::renderer::shader::{Shader, ShaderEvent, ShaderObserver, UniformLocation};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Locations of the light array of a shader, at element 0.
///
/// Element `n` of a field lives at `location + stride * n`. Light-space matrices
/// are a separate array whose elements are consecutive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightUniformBlock {
    /// Distance between two elements of the light array.
    pub stride: i32,
    /// `Lights[0].type`
    pub kind: UniformLocation,
    /// `Lights[0].color`
    pub color: Option<UniformLocation>,
    /// `Lights[0].factors`
    pub factors: Option<UniformLocation>,
    /// `Lights[0].parameters1`
    pub parameters1: Option<UniformLocation>,
    /// `Lights[0].parameters2`
    pub parameters2: Option<UniformLocation>,
    /// `Lights[0].parameters3`
    pub parameters3: Option<UniformLocation>,
    /// `Lights[0].shadowMapping`
    pub shadow_mapping: Option<UniformLocation>,
    /// `LightViewProjMatrix[0]`
    pub view_proj_matrix: Option<UniformLocation>,
}

impl LightUniformBlock {
    fn resolve(shader: &dyn Shader) -> Option<Self> {
        let first = shader.uniform_location("Lights[0].type")?;
        let second = shader.uniform_location("Lights[1].type")?;
        Some(Self {
            stride: second.0 - first.0,
            kind: first,
            color: shader.uniform_location("Lights[0].color"),
            factors: shader.uniform_location("Lights[0].factors"),
            parameters1: shader.uniform_location("Lights[0].parameters1"),
            parameters2: shader.uniform_location("Lights[0].parameters2"),
            parameters3: shader.uniform_location("Lights[0].parameters3"),
            shadow_mapping: shader.uniform_location("Lights[0].shadowMapping"),
            view_proj_matrix: shader.uniform_location("LightViewProjMatrix[0]"),
        })
    }

    /// Offset of light slot `slot` from element 0.
    #[inline]
    pub fn slot_offset(&self, slot: usize) -> i32 {
        self.stride * slot as i32
    }
}

/// The uniform locations the forward technique writes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShaderUniforms {
    /// `SceneAmbient`
    pub scene_ambient: Option<UniformLocation>,
    /// `EyePosition`
    pub eye_position: Option<UniformLocation>,
    /// `TextureOverlay`
    pub texture_overlay: Option<UniformLocation>,
    /// The light array, when the shader declares at least two light slots.
    pub lights: Option<LightUniformBlock>,
}

impl ShaderUniforms {
    /// Resolves every location from `shader`.
    pub fn resolve(shader: &dyn Shader) -> Self {
        Self {
            scene_ambient: shader.uniform_location("SceneAmbient"),
            eye_position: shader.uniform_location("EyePosition"),
            texture_overlay: shader.uniform_location("TextureOverlay"),
            lights: LightUniformBlock::resolve(shader),
        }
    }
}

#[derive(Default)]
struct CacheEntries {
    entries: RefCell<AHashMap<ShaderId, Rc<ShaderUniforms>>>,
    resolutions: Cell<usize>,
}

impl ShaderObserver for CacheEntries {
    fn on_shader_event(&self, event: ShaderEvent) {
        let id = match event {
            ShaderEvent::Released(id) | ShaderEvent::UniformsInvalidated(id) => id,
        };
        if self.entries.borrow_mut().remove(&id).is_some() {
            log::trace!("ShaderUniformCache: Dropped entry for {:?} ({:?})", id, event);
        }
    }
}

/// Caches [`ShaderUniforms`] by shader id.
///
/// The cache subscribes to the signals of every shader it resolves and forgets
/// the entry as soon as the shader is released or invalidated. The shader only
/// holds a weak reference back to the cache.
#[derive(Default)]
pub struct ShaderUniformCache {
    inner: Rc<CacheEntries>,
}

impl ShaderUniformCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the uniform locations of `shader`, resolving them on first use.
    pub fn get(&self, shader: &dyn Shader) -> Rc<ShaderUniforms> {
        let id = shader.id();
        let cached = self.inner.entries.borrow().get(&id).cloned();
        if let Some(uniforms) = cached {
            return uniforms;
        }

        let uniforms = Rc::new(ShaderUniforms::resolve(shader));
        self.inner.resolutions.set(self.inner.resolutions.get() + 1);

        let observer: Weak<dyn ShaderObserver> = Rc::downgrade(&self.inner) as Weak<dyn ShaderObserver>;
        shader.signals().subscribe(observer);

        self.inner
            .entries
            .borrow_mut()
            .insert(id, Rc::clone(&uniforms));
        uniforms
    }

    /// Returns `true` if `id` currently has a cached entry.
    pub fn contains(&self, id: ShaderId) -> bool {
        self.inner.entries.borrow().contains_key(&id)
    }

    /// Number of cached shaders.
    pub fn len(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of resolutions performed since creation.
    pub fn resolution_count(&self) -> usize {
        self.inner.resolutions.get()
    }
}

impl std::fmt::Debug for ShaderUniformCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderUniformCache")
            .field("entries", &self.len())
            .field("resolutions", &self.resolution_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::renderer::shader::{ShaderSignals, UniformValue};
    use std::collections::HashMap;

    struct NamedShader {
        id: ShaderId,
        locations: HashMap<&'static str, i32>,
        lookups: Cell<usize>,
        signals: ShaderSignals,
    }

    impl NamedShader {
        fn lit(id: usize) -> Self {
            let locations = HashMap::from([
                ("SceneAmbient", 1),
                ("EyePosition", 2),
                ("Lights[0].type", 10),
                ("Lights[0].color", 11),
                ("Lights[0].factors", 12),
                ("Lights[0].parameters1", 13),
                ("Lights[1].type", 20),
                ("LightViewProjMatrix[0]", 40),
            ]);
            Self {
                id: ShaderId(id),
                locations,
                lookups: Cell::new(0),
                signals: ShaderSignals::new(),
            }
        }
    }

    impl Shader for NamedShader {
        fn id(&self) -> ShaderId {
            self.id
        }

        fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
            self.lookups.set(self.lookups.get() + 1);
            self.locations.get(name).copied().map(UniformLocation)
        }

        fn send_uniform(&self, _location: UniformLocation, _value: UniformValue) {}

        fn signals(&self) -> &ShaderSignals {
            &self.signals
        }
    }

    #[test]
    fn test_light_block_stride() {
        let shader = NamedShader::lit(1);
        let uniforms = ShaderUniforms::resolve(&shader);
        let block = uniforms.lights.unwrap();
        assert_eq!(block.stride, 10);
        assert_eq!(block.slot_offset(2), 20);
        assert_eq!(block.parameters2, None);
        assert_eq!(uniforms.texture_overlay, None);
    }

    #[test]
    fn test_single_light_slot_has_no_block() {
        let mut shader = NamedShader::lit(1);
        shader.locations.remove("Lights[1].type");
        assert!(ShaderUniforms::resolve(&shader).lights.is_none());
    }

    #[test]
    fn test_get_is_idempotent() {
        let cache = ShaderUniformCache::new();
        let shader = NamedShader::lit(4);

        let first = cache.get(&shader);
        let lookups = shader.lookups.get();
        let second = cache.get(&shader);

        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(shader.lookups.get(), lookups);
        assert_eq!(cache.resolution_count(), 1);
        assert_eq!(shader.signals.observer_count(), 1);
    }

    #[test]
    fn test_invalidation_forces_resolution() {
        let cache = ShaderUniformCache::new();
        let shader = NamedShader::lit(4);
        cache.get(&shader);

        shader
            .signals
            .emit(ShaderEvent::UniformsInvalidated(ShaderId(4)));
        assert!(!cache.contains(ShaderId(4)));

        cache.get(&shader);
        assert_eq!(cache.resolution_count(), 2);
        assert_eq!(shader.signals.observer_count(), 1);
    }

    #[test]
    fn test_release_drops_only_that_shader() {
        let cache = ShaderUniformCache::new();
        let a = NamedShader::lit(1);
        let b = NamedShader::lit(2);
        cache.get(&a);
        cache.get(&b);

        a.signals.emit(ShaderEvent::Released(ShaderId(1)));
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(ShaderId(2)));
    }

    #[test]
    fn test_dropped_cache_is_not_notified() {
        let shader = NamedShader::lit(1);
        {
            let cache = ShaderUniformCache::new();
            cache.get(&shader);
        }
        assert_eq!(shader.signals.observer_count(), 0);
        shader.signals.emit(ShaderEvent::Released(ShaderId(1)));
    }
}
