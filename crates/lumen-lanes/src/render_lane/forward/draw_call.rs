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

//! The shape of a mesh draw, decided once per mesh.

use super::stats::SubmissionStats;
use lumen_core::renderer::api::PrimitiveTopology;
use lumen_core::renderer::traits::GraphicsDevice;
use lumen_data::render_queue::MeshData;

/// How the geometry of a mesh is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawCall {
    /// Through the bound index buffer.
    Indexed {
        /// Primitive assembly mode.
        topology: PrimitiveTopology,
        /// First index to read.
        first_index: u32,
        /// Number of indices.
        index_count: u32,
    },
    /// Straight from the bound vertex buffer.
    NonIndexed {
        /// Primitive assembly mode.
        topology: PrimitiveTopology,
        /// First vertex to read.
        first_vertex: u32,
        /// Number of vertices.
        vertex_count: u32,
    },
}

impl DrawCall {
    /// The draw covering the whole of `mesh`.
    pub fn for_mesh(mesh: &MeshData) -> Self {
        match mesh.index {
            Some(index) => Self::Indexed {
                topology: mesh.topology,
                first_index: 0,
                index_count: index.count,
            },
            None => Self::NonIndexed {
                topology: mesh.topology,
                first_vertex: 0,
                vertex_count: mesh.vertex_count,
            },
        }
    }

    /// Issues one draw.
    pub fn single(&self, device: &mut dyn GraphicsDevice, stats: &mut SubmissionStats) {
        match *self {
            Self::Indexed {
                topology,
                first_index,
                index_count,
            } => device.draw_indexed(topology, first_index, index_count),
            Self::NonIndexed {
                topology,
                first_vertex,
                vertex_count,
            } => device.draw(topology, first_vertex, vertex_count),
        }
        stats.record_draw();
    }

    /// Issues one draw of `instance_count` instances.
    pub fn instanced(
        &self,
        device: &mut dyn GraphicsDevice,
        instance_count: u32,
        stats: &mut SubmissionStats,
    ) {
        match *self {
            Self::Indexed {
                topology,
                first_index,
                index_count,
            } => device.draw_indexed_instanced(topology, first_index, index_count, instance_count),
            Self::NonIndexed {
                topology,
                first_vertex,
                vertex_count,
            } => device.draw_instanced(topology, first_vertex, vertex_count, instance_count),
        }
        stats.record_instanced_draw();
    }
}
