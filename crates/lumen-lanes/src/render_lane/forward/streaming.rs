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

//! Fixed-size GPU buffers refilled many times per frame.
//!
//! Neither buffer is ever resized: the submitters split their data into chunks
//! that fit and draw after every fill.

use bytemuck::Pod;
use lumen_core::renderer::{
    api::{BufferDescriptor, BufferId, BufferUsage},
    error::ResourceError,
    traits::GraphicsDevice,
};
use std::borrow::Cow;
use std::marker::PhantomData;
use std::mem::size_of;

/// The dynamic vertex buffer sprites and expanded billboards are streamed through.
///
/// Writing goes through a [`QuadWriter`] obtained from [`StreamingVertexBuffer::map`];
/// vertices are staged on the CPU and uploaded in one write when the writer is
/// closed.
#[derive(Debug)]
pub struct StreamingVertexBuffer {
    buffer: BufferId,
    size: u64,
    max_quads: usize,
    staging: Vec<u8>,
}

impl StreamingVertexBuffer {
    /// Allocates a buffer of `size` bytes. At most `max_quads` quads are written per fill.
    pub fn new(
        device: &mut dyn GraphicsDevice,
        size: u64,
        max_quads: usize,
    ) -> Result<Self, ResourceError> {
        let buffer = device.create_buffer(&BufferDescriptor {
            label: Some(Cow::Borrowed("Forward Streaming Vertices")),
            size,
            usage: BufferUsage::VERTEX | BufferUsage::COPY_DST | BufferUsage::DYNAMIC,
        })?;
        Ok(Self {
            buffer,
            size,
            max_quads,
            staging: Vec::with_capacity(size as usize),
        })
    }

    /// The GPU buffer.
    pub fn buffer(&self) -> BufferId {
        self.buffer
    }

    /// Number of quads of vertex type `V` one fill can hold.
    pub fn quad_capacity<V: Pod>(&self) -> usize {
        let vertex_capacity = self.size as usize / size_of::<V>();
        self.max_quads.min(vertex_capacity / 4)
    }

    /// Opens the buffer for a discard-and-write fill of quads of type `V`.
    pub fn map<'a, V: Pod>(&'a mut self, device: &'a mut dyn GraphicsDevice) -> QuadWriter<'a, V> {
        let capacity = self.quad_capacity::<V>();
        self.staging.clear();
        QuadWriter {
            device,
            buffer: self.buffer,
            staging: &mut self.staging,
            capacity,
            quads: 0,
            closed: false,
            _vertex: PhantomData,
        }
    }

    /// Releases the GPU buffer.
    pub fn destroy(&self, device: &mut dyn GraphicsDevice) {
        if let Err(e) = device.destroy_buffer(self.buffer) {
            log::warn!("StreamingVertexBuffer: Failed to destroy buffer: {:?}", e);
        }
    }
}

/// A scoped fill of a [`StreamingVertexBuffer`].
///
/// [`QuadWriter::unmap`] uploads the staged quads and reports the outcome. A
/// writer dropped without `unmap` still uploads, logging any failure.
pub struct QuadWriter<'a, V: Pod> {
    device: &'a mut dyn GraphicsDevice,
    buffer: BufferId,
    staging: &'a mut Vec<u8>,
    capacity: usize,
    quads: usize,
    closed: bool,
    _vertex: PhantomData<V>,
}

impl<V: Pod> QuadWriter<'_, V> {
    /// Maximum number of quads this fill can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Quads written so far.
    pub fn len(&self) -> usize {
        self.quads
    }

    /// Returns `true` if nothing was written.
    pub fn is_empty(&self) -> bool {
        self.quads == 0
    }

    /// Space left, in quads.
    pub fn remaining(&self) -> usize {
        self.capacity - self.quads
    }

    /// Appends whole quads (4 vertices each).
    pub fn write_quads(&mut self, vertices: &[V]) {
        debug_assert!(vertices.len() % 4 == 0, "quads are made of 4 vertices");
        debug_assert!(vertices.len() / 4 <= self.remaining(), "quad writer overflow");
        self.staging.extend_from_slice(bytemuck::cast_slice(vertices));
        self.quads += vertices.len() / 4;
    }

    /// Appends one quad.
    pub fn write_quad(&mut self, quad: [V; 4]) {
        self.write_quads(&quad);
    }

    fn flush(&mut self) -> Result<(), ResourceError> {
        self.closed = true;
        if self.staging.is_empty() {
            return Ok(());
        }
        self.device.write_buffer(self.buffer, 0, &self.staging[..])
    }

    /// Uploads the staged quads and returns how many were written.
    pub fn unmap(mut self) -> Result<usize, ResourceError> {
        self.flush()?;
        Ok(self.quads)
    }
}

impl<V: Pod> Drop for QuadWriter<'_, V> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.flush() {
            log::error!("QuadWriter: Failed to upload {} quads: {:?}", self.quads, e);
        }
    }
}

/// The per-instance data buffer used by instanced draws.
#[derive(Debug)]
pub struct InstanceBuffer {
    buffer: BufferId,
    size: u64,
}

impl InstanceBuffer {
    /// Allocates a buffer of `size` bytes.
    pub fn new(device: &mut dyn GraphicsDevice, size: u64) -> Result<Self, ResourceError> {
        let buffer = device.create_buffer(&BufferDescriptor {
            label: Some(Cow::Borrowed("Forward Instance Data")),
            size,
            usage: BufferUsage::INSTANCE | BufferUsage::COPY_DST | BufferUsage::DYNAMIC,
        })?;
        Ok(Self { buffer, size })
    }

    /// The GPU buffer.
    pub fn buffer(&self) -> BufferId {
        self.buffer
    }

    /// Number of elements of type `T` one fill can hold.
    pub fn capacity<T: Pod>(&self) -> usize {
        self.size as usize / size_of::<T>()
    }

    /// Replaces the buffer contents with `data`.
    pub fn fill<T: Pod>(
        &self,
        device: &mut dyn GraphicsDevice,
        data: &[T],
    ) -> Result<(), ResourceError> {
        debug_assert!(data.len() <= self.capacity::<T>(), "instance buffer overflow");
        device.write_buffer(self.buffer, 0, bytemuck::cast_slice(data))
    }

    /// Releases the GPU buffer.
    pub fn destroy(&self, device: &mut dyn GraphicsDevice) {
        if let Err(e) = device.destroy_buffer(self.buffer) {
            log::warn!("InstanceBuffer: Failed to destroy buffer: {:?}", e);
        }
    }
}
