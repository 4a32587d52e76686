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

//! A device and a material system that only log what they are asked to do.

use lumen_core::math::Mat4;
use lumen_core::renderer::{
    BlendState, BufferDescriptor, BufferId, CompareFunction, DeviceCapability, GraphicsDevice,
    IndexBinding, MaterialBinder, MaterialId, PipelineId, PrimitiveTopology, ResourceError,
    SamplerDescriptor, SamplerId, Shader, ShaderFlags, ShaderId, ShaderSignals,
    TextureDescriptor, TextureId, UniformLocation, UniformValue, VertexDeclaration, VertexLayout,
};
use std::collections::HashMap;
use std::rc::Rc;

/// Light slots exposed by [`LoggingShader`].
const LIGHT_SLOTS: i32 = 4;
/// Uniform locations between two light slots.
const LIGHT_STRIDE: i32 = 8;
const LIGHT_FIELDS: [&str; 7] = [
    "type",
    "color",
    "factors",
    "parameters1",
    "parameters2",
    "parameters3",
    "shadowMapping",
];

/// Counters kept by [`HeadlessDevice`] over its lifetime.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeviceCounters {
    pub draws: u64,
    pub bytes_written: u64,
    pub buffers_alive: i64,
}

/// A [`GraphicsDevice`] with no GPU behind it.
#[derive(Debug)]
pub struct HeadlessDevice {
    next_id: usize,
    instancing: bool,
    blend: BlendState,
    compare: CompareFunction,
    counters: DeviceCounters,
}

impl HeadlessDevice {
    pub fn new(instancing: bool) -> Self {
        Self {
            next_id: 0,
            instancing,
            blend: BlendState::DISABLED,
            compare: CompareFunction::Less,
            counters: DeviceCounters::default(),
        }
    }

    pub fn counters(&self) -> DeviceCounters {
        self.counters
    }

    fn next_id(&mut self) -> usize {
        self.next_id += 1;
        self.next_id
    }

    fn record_draw(&mut self, kind: &str, topology: PrimitiveTopology, count: u32, instances: u32) {
        self.counters.draws += 1;
        log::trace!(
            "HeadlessDevice: {} {:?} count={} instances={}",
            kind,
            topology,
            count,
            instances
        );
    }
}

impl GraphicsDevice for HeadlessDevice {
    fn create_buffer(&mut self, descriptor: &BufferDescriptor) -> Result<BufferId, ResourceError> {
        let id = BufferId(self.next_id());
        self.counters.buffers_alive += 1;
        log::debug!("HeadlessDevice: Created buffer {:?} ({:?})", id, descriptor.label);
        Ok(id)
    }

    fn create_buffer_with_data(
        &mut self,
        descriptor: &BufferDescriptor,
        data: &[u8],
    ) -> Result<BufferId, ResourceError> {
        let id = self.create_buffer(descriptor)?;
        self.counters.bytes_written += data.len() as u64;
        Ok(id)
    }

    fn write_buffer(&mut self, id: BufferId, offset: u64, data: &[u8]) -> Result<(), ResourceError> {
        log::trace!("HeadlessDevice: Write {} bytes to {:?} at {}", data.len(), id, offset);
        self.counters.bytes_written += data.len() as u64;
        Ok(())
    }

    fn destroy_buffer(&mut self, id: BufferId) -> Result<(), ResourceError> {
        log::debug!("HeadlessDevice: Destroyed buffer {:?}", id);
        self.counters.buffers_alive -= 1;
        Ok(())
    }

    fn create_texture(
        &mut self,
        descriptor: &TextureDescriptor,
        _data: &[u8],
    ) -> Result<TextureId, ResourceError> {
        let id = TextureId(self.next_id());
        log::debug!("HeadlessDevice: Created texture {:?} ({:?})", id, descriptor.label);
        Ok(id)
    }

    fn destroy_texture(&mut self, _id: TextureId) -> Result<(), ResourceError> {
        Ok(())
    }

    fn create_sampler(&mut self, _descriptor: &SamplerDescriptor) -> Result<SamplerId, ResourceError> {
        Ok(SamplerId(self.next_id()))
    }

    fn destroy_sampler(&mut self, _id: SamplerId) -> Result<(), ResourceError> {
        Ok(())
    }

    fn declare_vertex_layout(
        &mut self,
        layout: VertexLayout,
        declaration: &VertexDeclaration,
    ) -> Result<(), ResourceError> {
        log::debug!("HeadlessDevice: Declared {:?}: {:?}", layout, declaration);
        Ok(())
    }

    fn supports(&self, capability: DeviceCapability) -> bool {
        match capability {
            DeviceCapability::Instancing => self.instancing,
        }
    }

    fn set_vertex_buffer(&mut self, _buffer: BufferId, _layout: VertexLayout) {}

    fn set_index_buffer(&mut self, _binding: Option<IndexBinding>) {}

    fn set_instance_buffer(&mut self, _buffer: BufferId, _layout: VertexLayout) {}

    fn set_texture(&mut self, _unit: u32, _texture: TextureId) {}

    fn set_sampler(&mut self, _unit: u32, _sampler: SamplerId) {}

    fn set_world_matrix(&mut self, _matrix: &Mat4) {}

    fn clear_depth(&mut self) {}

    fn set_depth_test(&mut self, _enabled: bool) {}

    fn set_depth_write(&mut self, _enabled: bool) {}

    fn depth_compare(&self) -> CompareFunction {
        self.compare
    }

    fn set_depth_compare(&mut self, compare: CompareFunction) {
        self.compare = compare;
    }

    fn blend_state(&self) -> BlendState {
        self.blend
    }

    fn set_blend_state(&mut self, state: BlendState) {
        self.blend = state;
    }

    fn draw(&mut self, topology: PrimitiveTopology, _first_vertex: u32, vertex_count: u32) {
        self.record_draw("draw", topology, vertex_count, 1);
    }

    fn draw_indexed(&mut self, topology: PrimitiveTopology, _first_index: u32, index_count: u32) {
        self.record_draw("draw_indexed", topology, index_count, 1);
    }

    fn draw_instanced(
        &mut self,
        topology: PrimitiveTopology,
        _first_vertex: u32,
        vertex_count: u32,
        instance_count: u32,
    ) {
        self.record_draw("draw_instanced", topology, vertex_count, instance_count);
    }

    fn draw_indexed_instanced(
        &mut self,
        topology: PrimitiveTopology,
        _first_index: u32,
        index_count: u32,
        instance_count: u32,
    ) {
        self.record_draw("draw_indexed_instanced", topology, index_count, instance_count);
    }
}

/// A shader exposing the scene and light uniforms, discarding every value sent.
pub struct LoggingShader {
    id: ShaderId,
    locations: HashMap<String, i32>,
    signals: ShaderSignals,
}

impl LoggingShader {
    fn new(id: ShaderId) -> Self {
        let mut locations = HashMap::new();
        locations.insert("SceneAmbient".to_string(), 0);
        locations.insert("EyePosition".to_string(), 1);
        locations.insert("TextureOverlay".to_string(), 2);
        locations.insert("LightViewProjMatrix[0]".to_string(), 100);
        for slot in 0..LIGHT_SLOTS {
            for (offset, field) in (0..).zip(LIGHT_FIELDS) {
                let location = 10 + slot * LIGHT_STRIDE + offset;
                locations.insert(format!("Lights[{slot}].{field}"), location);
            }
        }
        Self {
            id,
            locations,
            signals: ShaderSignals::new(),
        }
    }
}

impl Shader for LoggingShader {
    fn id(&self) -> ShaderId {
        self.id
    }

    fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        self.locations.get(name).copied().map(UniformLocation)
    }

    fn send_uniform(&self, location: UniformLocation, value: UniformValue) {
        log::trace!("LoggingShader {:?}: {:?} = {:?}", self.id, location, value);
    }

    fn signals(&self) -> &ShaderSignals {
        &self.signals
    }
}

/// Hands out one [`LoggingShader`] per pipeline permutation.
#[derive(Default)]
pub struct HeadlessMaterials {
    shaders: HashMap<(PipelineId, ShaderFlags), Rc<LoggingShader>>,
}

impl HeadlessMaterials {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MaterialBinder for HeadlessMaterials {
    fn apply_pipeline(
        &mut self,
        _device: &mut dyn GraphicsDevice,
        pipeline: PipelineId,
        flags: ShaderFlags,
    ) -> Rc<dyn Shader> {
        let next_id = ShaderId(self.shaders.len() + 1);
        let shader = self.shaders.entry((pipeline, flags)).or_insert_with(|| {
            log::debug!(
                "HeadlessMaterials: Compiled {:?} with {:?} as {:?}",
                pipeline,
                flags,
                next_id
            );
            Rc::new(LoggingShader::new(next_id))
        });
        Rc::clone(shader) as Rc<dyn Shader>
    }

    fn apply_material(
        &mut self,
        _device: &mut dyn GraphicsDevice,
        material: MaterialId,
        flags: ShaderFlags,
    ) {
        log::trace!("HeadlessMaterials: Applied {:?} ({:?})", material, flags);
    }

    fn diffuse_sampler(&self, material: MaterialId) -> SamplerId {
        SamplerId(material.0)
    }
}
