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

//! The pipeline → material → geometry batch tree.
//!
//! Batches are never removed by a partial clear: they are disabled and their
//! contents emptied, so the keys and allocations survive into the next frame.
//! Consumers must skip disabled batches.

use lumen_core::math::{Mat4, Sphere};
use lumen_core::renderer::api::{
    BillboardData, BufferId, IndexBinding, MaterialId, PipelineId, PrimitiveTopology,
    SpriteVertex, TextureId, VertexLayout,
};
use std::collections::BTreeMap;

/// How a renderable refers to its material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialRef {
    /// The material.
    pub id: MaterialId,
    /// The pipeline the material is rendered with.
    pub pipeline: PipelineId,
    /// Whether objects using this material must be drawn back to front.
    pub depth_sorted: bool,
}

impl MaterialRef {
    /// A material drawn in batches.
    pub const fn batched(id: MaterialId, pipeline: PipelineId) -> Self {
        Self {
            id,
            pipeline,
            depth_sorted: false,
        }
    }

    /// A material drawn back to front.
    pub const fn sorted(id: MaterialId, pipeline: PipelineId) -> Self {
        Self {
            id,
            pipeline,
            depth_sorted: true,
        }
    }
}

/// Immutable description of a mesh's geometry. Used as a batch key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshData {
    /// The vertex buffer.
    pub vertex_buffer: BufferId,
    /// The layout of `vertex_buffer`.
    pub vertex_layout: VertexLayout,
    /// Number of vertices in `vertex_buffer`.
    pub vertex_count: u32,
    /// The index buffer, for indexed meshes.
    pub index: Option<IndexBinding>,
    /// How vertices are assembled.
    pub topology: PrimitiveTopology,
}

/// All instances of one mesh sharing a material.
#[derive(Debug, Clone, Default)]
pub struct MeshInstanceEntry {
    /// Object-space bounding sphere of the mesh.
    pub bounding_sphere: Sphere,
    /// One world matrix per instance, in insertion order.
    pub instances: Vec<Mat4>,
}

/// A run of sprite quads stored in a [`SpriteChainList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteChain {
    /// Index of the first vertex in the owning list.
    pub first_vertex: usize,
    /// Number of quads (4 vertices each).
    pub quad_count: usize,
}

/// Sprite chains sharing one vertex arena.
///
/// Each chain is contiguous; chains are stored one after the other but are drawn
/// as independent runs.
#[derive(Debug, Clone, Default)]
pub struct SpriteChainList {
    vertices: Vec<SpriteVertex>,
    chains: Vec<SpriteChain>,
}

impl SpriteChainList {
    /// Appends the whole quads of `vertices` as a new chain.
    ///
    /// Returns the chain, or `None` when `vertices` holds no complete quad.
    pub fn push(&mut self, vertices: &[SpriteVertex]) -> Option<SpriteChain> {
        debug_assert!(
            vertices.len() % 4 == 0,
            "sprite chains must contain whole quads"
        );
        let quad_count = vertices.len() / 4;
        if quad_count == 0 {
            return None;
        }
        let chain = SpriteChain {
            first_vertex: self.vertices.len(),
            quad_count,
        };
        self.vertices.extend_from_slice(&vertices[..quad_count * 4]);
        self.chains.push(chain);
        Some(chain)
    }

    /// Number of chains.
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Returns `true` if the list holds no chain.
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// The vertices of chain `index`.
    pub fn chain(&self, index: usize) -> &[SpriteVertex] {
        self.vertices_of(&self.chains[index])
    }

    /// The vertices of `chain`, which must belong to this list.
    pub fn vertices_of(&self, chain: &SpriteChain) -> &[SpriteVertex] {
        &self.vertices[chain.first_vertex..chain.first_vertex + chain.quad_count * 4]
    }

    /// The chains in insertion order.
    pub fn chains(&self) -> &[SpriteChain] {
        &self.chains
    }

    /// Total number of quads across all chains.
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    /// Removes every chain, keeping the allocations.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.chains.clear();
    }
}

/// Contents that can be emptied while keeping their allocation.
pub trait BatchContents: Default {
    /// Empties the contents for the next frame.
    fn reset(&mut self);
}

impl BatchContents for BTreeMap<MeshData, MeshInstanceEntry> {
    fn reset(&mut self) {
        for entry in self.values_mut() {
            entry.instances.clear();
        }
    }
}

impl BatchContents for BTreeMap<Option<TextureId>, SpriteChainList> {
    fn reset(&mut self) {
        for chains in self.values_mut() {
            chains.clear();
        }
    }
}

impl BatchContents for Vec<BillboardData> {
    fn reset(&mut self) {
        self.clear();
    }
}

/// The objects of one material.
#[derive(Debug, Clone, Default)]
pub struct MaterialBatch<C> {
    /// `false` when nothing was queued for this material since the last clear.
    pub enabled: bool,
    /// The largest instance count of any geometry in this batch.
    pub max_instance_count: usize,
    /// The queued objects.
    pub contents: C,
}

/// The materials of one pipeline.
#[derive(Debug, Clone)]
pub struct PipelineBatch<C> {
    /// `false` when nothing was queued for this pipeline since the last clear.
    pub enabled: bool,
    /// The largest instance count of any material in this batch.
    pub max_instance_count: usize,
    /// Material batches, ordered by material id.
    pub materials: BTreeMap<MaterialId, MaterialBatch<C>>,
}

impl<C> Default for PipelineBatch<C> {
    fn default() -> Self {
        Self {
            enabled: false,
            max_instance_count: 0,
            materials: BTreeMap::new(),
        }
    }
}

/// Pipeline batches, ordered by pipeline id.
pub type BatchTree<C> = BTreeMap<PipelineId, PipelineBatch<C>>;

/// Mesh batches: mesh geometry → instances.
pub type MeshBatches = BatchTree<BTreeMap<MeshData, MeshInstanceEntry>>;

/// Sprite batches: overlay texture → chains.
pub type SpriteBatches = BatchTree<BTreeMap<Option<TextureId>, SpriteChainList>>;

/// Billboard batches.
pub type BillboardBatches = BatchTree<Vec<BillboardData>>;

/// Enables the batch of `material` (and its pipeline) and returns its contents.
pub(crate) fn enable<'a, C: Default>(
    tree: &'a mut BatchTree<C>,
    material: &MaterialRef,
) -> &'a mut MaterialBatch<C> {
    let pipeline = tree.entry(material.pipeline).or_default();
    pipeline.enabled = true;
    let batch = pipeline.materials.entry(material.id).or_default();
    batch.enabled = true;
    batch
}

/// Raises the running instance counters of `material` to at least `count`.
pub(crate) fn record_instances<C>(tree: &mut BatchTree<C>, material: &MaterialRef, count: usize) {
    if let Some(pipeline) = tree.get_mut(&material.pipeline) {
        pipeline.max_instance_count = pipeline.max_instance_count.max(count);
        if let Some(batch) = pipeline.materials.get_mut(&material.id) {
            batch.max_instance_count = batch.max_instance_count.max(count);
        }
    }
}

/// Disables every batch of `tree` and empties its contents.
pub(crate) fn disable_all<C: BatchContents>(tree: &mut BatchTree<C>) {
    for pipeline in tree.values_mut() {
        if !pipeline.enabled {
            continue;
        }
        pipeline.enabled = false;
        pipeline.max_instance_count = 0;
        for batch in pipeline.materials.values_mut() {
            if batch.enabled {
                batch.enabled = false;
                batch.max_instance_count = 0;
                batch.contents.reset();
            }
        }
    }
}
