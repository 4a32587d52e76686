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

//! In-memory device and shader for the unit tests of this module.

#![allow(dead_code)]

use lumen_core::math::Mat4;
use lumen_core::renderer::api::*;
use lumen_core::renderer::error::ResourceError;
use lumen_core::renderer::shader::{Shader, ShaderSignals, UniformLocation, UniformValue};
use lumen_core::renderer::traits::GraphicsDevice;
use std::cell::RefCell;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    SetTexture(u32, TextureId),
    SetSampler(u32, SamplerId),
    SetBlendState(BlendState),
    SetDepthCompare(CompareFunction),
    Write(BufferId, usize),
    Other(&'static str),
}

#[derive(Debug)]
pub struct RecordingDevice {
    pub calls: Vec<DeviceCall>,
    pub writes: Vec<Vec<u8>>,
    pub blend: BlendState,
    pub compare: CompareFunction,
    next_id: usize,
}

impl Default for RecordingDevice {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            writes: Vec::new(),
            blend: BlendState::DISABLED,
            compare: CompareFunction::Less,
            next_id: 1,
        }
    }
}

impl RecordingDevice {
    pub fn last_write(&self) -> &[u8] {
        self.writes.last().map(Vec::as_slice).unwrap_or(&[])
    }

    fn next(&mut self) -> usize {
        self.next_id += 1;
        self.next_id
    }
}

impl GraphicsDevice for RecordingDevice {
    fn create_buffer(&mut self, _descriptor: &BufferDescriptor) -> Result<BufferId, ResourceError> {
        Ok(BufferId(self.next()))
    }

    fn create_buffer_with_data(
        &mut self,
        _descriptor: &BufferDescriptor,
        _data: &[u8],
    ) -> Result<BufferId, ResourceError> {
        Ok(BufferId(self.next()))
    }

    fn write_buffer(&mut self, id: BufferId, _offset: u64, data: &[u8]) -> Result<(), ResourceError> {
        self.calls.push(DeviceCall::Write(id, data.len()));
        self.writes.push(data.to_vec());
        Ok(())
    }

    fn destroy_buffer(&mut self, _id: BufferId) -> Result<(), ResourceError> {
        Ok(())
    }

    fn create_texture(
        &mut self,
        _descriptor: &TextureDescriptor,
        _data: &[u8],
    ) -> Result<TextureId, ResourceError> {
        Ok(TextureId(self.next()))
    }

    fn destroy_texture(&mut self, _id: TextureId) -> Result<(), ResourceError> {
        Ok(())
    }

    fn create_sampler(&mut self, _descriptor: &SamplerDescriptor) -> Result<SamplerId, ResourceError> {
        Ok(SamplerId(self.next()))
    }

    fn destroy_sampler(&mut self, _id: SamplerId) -> Result<(), ResourceError> {
        Ok(())
    }

    fn declare_vertex_layout(
        &mut self,
        _layout: VertexLayout,
        _declaration: &VertexDeclaration,
    ) -> Result<(), ResourceError> {
        Ok(())
    }

    fn supports(&self, _capability: DeviceCapability) -> bool {
        true
    }

    fn set_vertex_buffer(&mut self, _buffer: BufferId, _layout: VertexLayout) {
        self.calls.push(DeviceCall::Other("set_vertex_buffer"));
    }

    fn set_index_buffer(&mut self, _binding: Option<IndexBinding>) {
        self.calls.push(DeviceCall::Other("set_index_buffer"));
    }

    fn set_instance_buffer(&mut self, _buffer: BufferId, _layout: VertexLayout) {
        self.calls.push(DeviceCall::Other("set_instance_buffer"));
    }

    fn set_texture(&mut self, unit: u32, texture: TextureId) {
        self.calls.push(DeviceCall::SetTexture(unit, texture));
    }

    fn set_sampler(&mut self, unit: u32, sampler: SamplerId) {
        self.calls.push(DeviceCall::SetSampler(unit, sampler));
    }

    fn set_world_matrix(&mut self, _matrix: &Mat4) {
        self.calls.push(DeviceCall::Other("set_world_matrix"));
    }

    fn clear_depth(&mut self) {
        self.calls.push(DeviceCall::Other("clear_depth"));
    }

    fn set_depth_test(&mut self, _enabled: bool) {}

    fn set_depth_write(&mut self, _enabled: bool) {}

    fn depth_compare(&self) -> CompareFunction {
        self.compare
    }

    fn set_depth_compare(&mut self, compare: CompareFunction) {
        self.compare = compare;
        self.calls.push(DeviceCall::SetDepthCompare(compare));
    }

    fn blend_state(&self) -> BlendState {
        self.blend
    }

    fn set_blend_state(&mut self, state: BlendState) {
        self.blend = state;
        self.calls.push(DeviceCall::SetBlendState(state));
    }

    fn draw(&mut self, _topology: PrimitiveTopology, _first_vertex: u32, _vertex_count: u32) {
        self.calls.push(DeviceCall::Other("draw"));
    }

    fn draw_indexed(&mut self, _topology: PrimitiveTopology, _first_index: u32, _index_count: u32) {
        self.calls.push(DeviceCall::Other("draw_indexed"));
    }

    fn draw_instanced(
        &mut self,
        _topology: PrimitiveTopology,
        _first_vertex: u32,
        _vertex_count: u32,
        _instance_count: u32,
    ) {
        self.calls.push(DeviceCall::Other("draw_instanced"));
    }

    fn draw_indexed_instanced(
        &mut self,
        _topology: PrimitiveTopology,
        _first_index: u32,
        _index_count: u32,
        _instance_count: u32,
    ) {
        self.calls.push(DeviceCall::Other("draw_indexed_instanced"));
    }
}

/// A shader remembering every uniform it received.
pub struct RecordingShader {
    id: ShaderId,
    pub locations: HashMap<&'static str, i32>,
    pub sent: RefCell<Vec<(UniformLocation, UniformValue)>>,
    signals: ShaderSignals,
}

impl RecordingShader {
    pub fn new(id: usize) -> Self {
        Self {
            id: ShaderId(id),
            locations: HashMap::new(),
            sent: RefCell::new(Vec::new()),
            signals: ShaderSignals::new(),
        }
    }

    /// The last value sent to `location`.
    pub fn value_at(&self, location: i32) -> Option<UniformValue> {
        self.sent
            .borrow()
            .iter()
            .rev()
            .find(|(l, _)| l.0 == location)
            .map(|(_, v)| *v)
    }
}

impl Shader for RecordingShader {
    fn id(&self) -> ShaderId {
        self.id
    }

    fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        self.locations.get(name).copied().map(UniformLocation)
    }

    fn send_uniform(&self, location: UniformLocation, value: UniformValue) {
        self.sent.borrow_mut().push((location, value));
    }

    fn signals(&self) -> &ShaderSignals {
        &self.signals
    }
}
